//! Dataset scoring summary

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{PredictionResult, RiskLabel, RowResult};

/// Counts and timings of one `score` run
#[derive(Debug, Default)]
pub struct ScoringSummary {
    pub total_rows: usize,
    pub good_risk: usize,
    pub bad_risk: usize,
    pub failed: usize,
    /// Distinct error messages with their row counts, most frequent first
    pub failure_reasons: Vec<(String, usize)>,
    pub load_time: Option<Duration>,
    pub score_time: Option<Duration>,
    pub save_time: Option<Duration>,
}

impl ScoringSummary {
    pub fn from_results(results: &[RowResult<PredictionResult>]) -> Self {
        let mut summary = Self {
            total_rows: results.len(),
            ..Default::default()
        };

        for result in results {
            match result {
                Ok(p) if p.label == RiskLabel::GoodRisk => summary.good_risk += 1,
                Ok(_) => summary.bad_risk += 1,
                Err(err) => {
                    summary.failed += 1;
                    let reason = failure_kind(&err.to_string());
                    match summary.failure_reasons.iter_mut().find(|(r, _)| *r == reason) {
                        Some((_, count)) => *count += 1,
                        None => summary.failure_reasons.push((reason, 1)),
                    }
                }
            }
        }

        summary
            .failure_reasons
            .sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        summary
    }

    pub fn set_load_time(&mut self, duration: Duration) {
        self.load_time = Some(duration);
    }

    pub fn set_score_time(&mut self, duration: Duration) {
        self.score_time = Some(duration);
    }

    pub fn set_save_time(&mut self, duration: Duration) {
        self.save_time = Some(duration);
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("SCORING SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![Cell::new("📁 Rows"), Cell::new(self.total_rows)]);
        table.add_row(vec![
            Cell::new("✅ Good Risk"),
            Cell::new(self.good_risk).fg(Color::Green),
        ]);
        table.add_row(vec![
            Cell::new("⚠️  Bad Risk"),
            Cell::new(self.bad_risk).fg(Color::Yellow),
        ]);
        table.add_row(vec![
            Cell::new("❌ Failed"),
            Cell::new(self.failed).fg(if self.failed == 0 {
                Color::White
            } else {
                Color::Red
            }),
        ]);

        for (label, duration) in [
            ("⏱  Load", self.load_time),
            ("⏱  Score", self.score_time),
            ("⏱  Save", self.save_time),
        ] {
            if let Some(d) = duration {
                table.add_row(vec![Cell::new(label), Cell::new(format_duration(d))]);
            }
        }

        for line in table.to_string().lines() {
            println!("    {}", line);
        }

        if !self.failure_reasons.is_empty() {
            println!();
            println!("    {}", style("Failure reasons").white().bold());
            for (reason, count) in &self.failure_reasons {
                println!("      {} × {}", style(count).red().bold(), reason);
            }
        }
    }
}

/// Strip the row prefix so failures of the same kind group together
fn failure_kind(message: &str) -> String {
    match message.split_once(": row ") {
        Some((head, rest)) => match rest.split_once(": ") {
            Some((_, detail)) => format!("{}: {}", head, detail),
            None => message.to_string(),
        },
        None => message.to_string(),
    }
}

fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms < 1000 {
        format!("{}ms", ms)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineError;

    #[test]
    fn test_counts() {
        let results = vec![
            Ok(PredictionResult {
                label: RiskLabel::GoodRisk,
                confidence: 0.8,
            }),
            Ok(PredictionResult {
                label: RiskLabel::BadRisk,
                confidence: 0.7,
            }),
            Ok(PredictionResult {
                label: RiskLabel::GoodRisk,
                confidence: 0.55,
            }),
            Err(PipelineError::InvalidRecord("row 3: 'Age' is missing".to_string())),
            Err(PipelineError::InvalidRecord("row 7: 'Age' is missing".to_string())),
        ];

        let summary = ScoringSummary::from_results(&results);
        assert_eq!(summary.total_rows, 5);
        assert_eq!(summary.good_risk, 2);
        assert_eq!(summary.bad_risk, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(
            summary.failure_reasons,
            vec![("Invalid applicant record: 'Age' is missing".to_string(), 2)]
        );
    }

    #[test]
    fn test_failure_kind_keeps_unprefixed_messages() {
        assert_eq!(failure_kind("Invalid label 2"), "Invalid label 2");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
    }
}
