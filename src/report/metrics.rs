//! Evaluation metrics against ground-truth risk labels
//!
//! BadRisk is the positive class throughout: precision and recall describe
//! how well the model finds bad-risk applicants.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;
use serde::Serialize;

use crate::pipeline::{PredictionResult, RiskLabel, RowResult};

/// Binary confusion matrix with BadRisk as the positive class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub true_good: usize,
    pub false_bad: usize,
    pub false_good: usize,
    pub true_bad: usize,
}

impl ConfusionMatrix {
    /// Count one actual/predicted pair
    pub fn record(&mut self, actual: RiskLabel, predicted: RiskLabel) {
        match (actual, predicted) {
            (RiskLabel::GoodRisk, RiskLabel::GoodRisk) => self.true_good += 1,
            (RiskLabel::GoodRisk, RiskLabel::BadRisk) => self.false_bad += 1,
            (RiskLabel::BadRisk, RiskLabel::GoodRisk) => self.false_good += 1,
            (RiskLabel::BadRisk, RiskLabel::BadRisk) => self.true_bad += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_good + self.false_bad + self.false_good + self.true_bad
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_good + self.true_bad, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_bad, self.true_bad + self.false_bad)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_bad, self.true_bad + self.false_good)
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

/// Zero denominators yield 0.0
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Headline metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Outcome of evaluating predictions against labels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub confusion_matrix: ConfusionMatrix,
    pub metrics: Metrics,
    /// Rows whose target did not map to a risk label
    pub unlabeled_rows: usize,
    /// Rows whose prediction failed
    pub failed_rows: usize,
}

impl EvaluationReport {
    /// Compare predictions with ground truth, row by row
    pub fn from_outcomes(
        actual: &[Option<RiskLabel>],
        predicted: &[RowResult<PredictionResult>],
    ) -> Self {
        let mut matrix = ConfusionMatrix::default();
        let mut unlabeled_rows = 0;
        let mut failed_rows = 0;

        for (truth, prediction) in actual.iter().zip(predicted) {
            match (truth, prediction) {
                (_, Err(_)) => failed_rows += 1,
                (None, Ok(_)) => unlabeled_rows += 1,
                (Some(truth), Ok(p)) => matrix.record(*truth, p.label),
            }
        }

        Self {
            metrics: Metrics {
                accuracy: matrix.accuracy(),
                precision: matrix.precision(),
                recall: matrix.recall(),
                f1: matrix.f1(),
            },
            confusion_matrix: matrix,
            unlabeled_rows,
            failed_rows,
        }
    }

    /// Print metrics and the confusion matrix
    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📈").cyan(),
            style("MODEL PERFORMANCE").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut metrics = Table::new();
        metrics.load_preset(UTF8_FULL_CONDENSED);
        metrics.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);
        for (name, value) in [
            ("Accuracy", self.metrics.accuracy),
            ("Precision", self.metrics.precision),
            ("Recall", self.metrics.recall),
            ("F1-Score", self.metrics.f1),
        ] {
            metrics.add_row(vec![
                Cell::new(name),
                Cell::new(format!("{:.2}", value)).set_alignment(CellAlignment::Right),
            ]);
        }
        for line in metrics.to_string().lines() {
            println!("    {}", line);
        }

        println!();
        println!("    {}", style("Confusion Matrix").white().bold());

        let cm = &self.confusion_matrix;
        let mut matrix = Table::new();
        matrix.load_preset(UTF8_FULL_CONDENSED);
        matrix.set_header(vec![
            Cell::new("Actual \\ Predicted").add_attribute(Attribute::Bold),
            Cell::new("Good").add_attribute(Attribute::Bold),
            Cell::new("Bad").add_attribute(Attribute::Bold),
        ]);
        matrix.add_row(vec![
            Cell::new("Good"),
            Cell::new(cm.true_good).fg(Color::Green),
            Cell::new(cm.false_bad).fg(Color::Red),
        ]);
        matrix.add_row(vec![
            Cell::new("Bad"),
            Cell::new(cm.false_good).fg(Color::Red),
            Cell::new(cm.true_bad).fg(Color::Green),
        ]);
        for line in matrix.to_string().lines() {
            println!("    {}", line);
        }

        if self.unlabeled_rows > 0 || self.failed_rows > 0 {
            println!();
            println!(
                "    {} {} unlabeled, {} failed (excluded from metrics)",
                style("⚠").yellow(),
                self.unlabeled_rows,
                self.failed_rows
            );
        }
    }
}

/// Metadata about the evaluation run
#[derive(Serialize)]
pub struct EvaluationMetadata {
    /// Timestamp of the evaluation (ISO 8601 format)
    pub timestamp: String,
    pub credrisk_version: String,
    pub input_file: String,
    pub target_column: String,
    pub model_kind: String,
}

#[derive(Serialize)]
struct EvaluationExport<'a> {
    metadata: EvaluationMetadata,
    #[serde(flatten)]
    report: &'a EvaluationReport,
}

/// Write an evaluation report as pretty JSON
pub fn export_evaluation(
    report: &EvaluationReport,
    input_file: &str,
    target_column: &str,
    model_kind: &str,
    output_path: &Path,
) -> Result<()> {
    let export = EvaluationExport {
        metadata: EvaluationMetadata {
            timestamp: Utc::now().to_rfc3339(),
            credrisk_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: input_file.to_string(),
            target_column: target_column.to_string(),
            model_kind: model_kind.to_string(),
        },
        report,
    };

    let json = serde_json::to_string_pretty(&export)
        .context("Failed to serialize evaluation report")?;
    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write evaluation report: {}", output_path.display()))?;

    Ok(())
}
