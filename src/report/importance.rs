//! Feature importance ranking

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Table};
use console::style;
use serde::Serialize;

use crate::pipeline::{Classifier, ColumnOrder, Model};

use super::prediction_report::confidence_bar;

/// Importance of one model input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Importances paired with column names, most important first.
///
/// Returns `None` when the model carries no importances.
pub fn rank_feature_importances(model: &Model, columns: &ColumnOrder) -> Option<Vec<FeatureImportance>> {
    let importances = model.feature_importances()?;

    let mut ranked: Vec<FeatureImportance> = columns
        .columns()
        .iter()
        .zip(importances)
        .map(|(feature, importance)| FeatureImportance {
            feature: feature.clone(),
            importance,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Some(ranked)
}

/// Print the ranking with a relative bar per feature
pub fn display_feature_importances(ranked: &[FeatureImportance]) {
    println!();
    println!(
        "    {} {}",
        style("🌲").cyan(),
        style("FEATURE IMPORTANCE").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());

    let max = ranked
        .iter()
        .map(|f| f.importance)
        .fold(0.0f64, f64::max);

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Feature").add_attribute(Attribute::Bold),
        Cell::new("Importance").add_attribute(Attribute::Bold),
        Cell::new("").add_attribute(Attribute::Bold),
    ]);

    for entry in ranked {
        let relative = if max > 0.0 { entry.importance / max } else { 0.0 };
        table.add_row(vec![
            Cell::new(&entry.feature),
            Cell::new(format!("{:.4}", entry.importance)).set_alignment(CellAlignment::Right),
            Cell::new(confidence_bar(relative, 20)),
        ]);
    }

    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}
