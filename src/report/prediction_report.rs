//! Rendering of a single prediction

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;
use serde::Serialize;

use crate::pipeline::{ApplicantRecord, ColumnOrder, FeatureVector, PredictionResult, RiskLabel};

/// Machine-readable output of one prediction
#[derive(Debug, Serialize)]
pub struct PredictionOutput<'a> {
    pub applicant: &'a ApplicantRecord,
    #[serde(flatten)]
    pub result: PredictionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<NamedFeature<'a>>>,
}

/// One feature vector entry with its column name
#[derive(Debug, Serialize)]
pub struct NamedFeature<'a> {
    pub column: &'a str,
    pub value: f64,
}

/// Zip a feature vector with its column names
pub fn named_features<'a>(features: &'a FeatureVector, columns: &'a ColumnOrder) -> Vec<NamedFeature<'a>> {
    features
        .named(columns)
        .map(|(column, value)| NamedFeature { column, value })
        .collect()
}

/// Print the applicant's inputs as a table
pub fn display_applicant(record: &ApplicantRecord) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Field").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);

    let rows = [
        ("Age", record.age.to_string()),
        ("Credit amount (€)", format!("{:.0}", record.credit_amount)),
        ("Duration (months)", record.duration_months.to_string()),
        ("Sex", record.sex.clone()),
        ("Housing", record.housing.clone()),
        ("Saving account", record.saving_account.clone()),
        ("Checking account", record.checking_account.clone()),
        ("Purpose", record.purpose.clone()),
    ];
    for (field, value) in rows {
        table.add_row(vec![Cell::new(field), Cell::new(value)]);
    }

    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

/// Print the model-ready feature vector
pub fn display_features(features: &FeatureVector, columns: &ColumnOrder) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Column").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);

    for (i, (column, value)) in features.named(columns).enumerate() {
        table.add_row(vec![
            Cell::new(i),
            Cell::new(column),
            Cell::new(format!("{:.6}", value)).set_alignment(CellAlignment::Right),
        ]);
    }

    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

/// Print the prediction headline
pub fn display_prediction(result: &PredictionResult) {
    let (icon, label) = match result.label {
        RiskLabel::GoodRisk => ("✅", style(result.label.to_string()).green().bold()),
        RiskLabel::BadRisk => ("⚠️ ", style(result.label.to_string()).red().bold()),
    };

    println!();
    println!("    {} Prediction: {}", icon, label);
    println!(
        "    {} Model confidence: {}",
        style("◆").cyan(),
        style(format!("{:.2}", result.confidence)).yellow().bold()
    );

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.add_row(vec![
        Cell::new("Confidence"),
        Cell::new(confidence_bar(result.confidence, 30)).fg(match result.label {
            RiskLabel::GoodRisk => Color::Green,
            RiskLabel::BadRisk => Color::Red,
        }),
    ]);
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

/// Horizontal bar of `width` cells filled in proportion to `value` in [0, 1]
pub fn confidence_bar(value: f64, width: usize) -> String {
    let filled = (value.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_bar() {
        assert_eq!(confidence_bar(0.5, 4), "██░░");
        assert_eq!(confidence_bar(1.0, 3), "███");
        assert_eq!(confidence_bar(0.0, 2), "░░");
        assert_eq!(confidence_bar(1.7, 2), "██");
    }

    #[test]
    fn test_prediction_output_json() {
        let record = ApplicantRecord {
            age: 30,
            credit_amount: 1000.0,
            duration_months: 12,
            sex: "male".to_string(),
            housing: "own".to_string(),
            saving_account: "little".to_string(),
            checking_account: "little".to_string(),
            purpose: "car".to_string(),
        };
        let output = PredictionOutput {
            applicant: &record,
            result: PredictionResult {
                label: RiskLabel::BadRisk,
                confidence: 0.75,
            },
            features: None,
        };

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["label"], "BadRisk");
        assert_eq!(json["confidence"], 0.75);
        assert_eq!(json["applicant"]["purpose"], "car");
        assert!(json.get("features").is_none());
    }
}
