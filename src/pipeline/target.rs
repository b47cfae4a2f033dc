//! Ground-truth risk labels for evaluation
//!
//! Maps a dataset's target column onto `RiskLabel`s. Text targets such as the
//! German Credit `Risk` column ("good"/"bad") go through a `TargetMapping`.
//! Numeric targets follow the mapping when it names numeric codes; otherwise
//! 0/1 targets map directly onto class indices.

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::prediction::RiskLabel;

/// Tolerance for floating point comparison when checking binary 0/1 values
const TOLERANCE: f64 = 1e-9;

/// Which target values mean bad risk (event) and good risk (non-event)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetMapping {
    /// Value that maps to BadRisk
    pub event_value: String,
    /// Value that maps to GoodRisk
    pub non_event_value: String,
}

impl TargetMapping {
    pub fn new(event_value: impl Into<String>, non_event_value: impl Into<String>) -> Self {
        Self {
            event_value: event_value.into(),
            non_event_value: non_event_value.into(),
        }
    }
}

impl TargetMapping {
    /// Both values as numbers, when the mapping names numeric codes
    fn numeric_values(&self) -> Option<(f64, f64)> {
        let event = self.event_value.trim().parse::<f64>().ok()?;
        let non_event = self.non_event_value.trim().parse::<f64>().ok()?;
        Some((event, non_event))
    }
}

impl Default for TargetMapping {
    fn default() -> Self {
        Self::new("bad", "good")
    }
}

/// Read the target column as risk labels.
///
/// Values matching neither side of the mapping (and nulls) become `None` and
/// are left out of the evaluation.
pub fn risk_labels(df: &DataFrame, target: &str, mapping: &TargetMapping) -> Result<Vec<Option<RiskLabel>>> {
    let target_col = df
        .column(target)
        .with_context(|| format!("Target column '{}' not found", target))?;

    if target_col.len() == 0 {
        anyhow::bail!("Target column '{}' is empty", target);
    }

    if target_col.null_count() == target_col.len() {
        anyhow::bail!("Target column '{}' contains only null values", target);
    }

    if target_col.dtype().is_primitive_numeric() {
        let cast = target_col.cast(&DataType::Float64)?;
        let values = cast.f64()?;

        // A numeric mapping always wins; 0/1 maps directly only without one
        if let Some((event, non_event)) = mapping.numeric_values() {
            return Ok(values
                .into_iter()
                .map(|v| match v {
                    Some(n) if (n - event).abs() < TOLERANCE => Some(RiskLabel::BadRisk),
                    Some(n) if (n - non_event).abs() < TOLERANCE => Some(RiskLabel::GoodRisk),
                    _ => None,
                })
                .collect());
        }

        if is_binary(target_col)? {
            return Ok(values
                .into_iter()
                .map(|v| {
                    v.map(|n| {
                        if (n - 1.0).abs() < TOLERANCE {
                            RiskLabel::BadRisk
                        } else {
                            RiskLabel::GoodRisk
                        }
                    })
                })
                .collect());
        }
    }

    let labels = column_to_string_vec(target_col)?
        .into_iter()
        .map(|v| match v {
            Some(s) if s == mapping.event_value => Some(RiskLabel::BadRisk),
            Some(s) if s == mapping.non_event_value => Some(RiskLabel::GoodRisk),
            _ => None,
        })
        .collect();

    Ok(labels)
}

/// True if every non-null value is 0 or 1
fn is_binary(col: &Column) -> Result<bool> {
    let float_col = col.cast(&DataType::Float64)?;
    let binary = float_col
        .f64()?
        .into_iter()
        .flatten()
        .all(|v| v.abs() < TOLERANCE || (v - 1.0).abs() < TOLERANCE);
    Ok(binary)
}

/// Convert a column to a Vec of Option<String> for comparison
fn column_to_string_vec(col: &Column) -> Result<Vec<Option<String>>> {
    let values: Vec<Option<String>> = match col.dtype() {
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect(),
        DataType::Float32 | DataType::Float64 => {
            let cast = col.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| v.map(|n| format!("{}", n)))
                .collect()
        }
        _ => {
            let cast = col.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect()
        }
    };

    Ok(values)
}
