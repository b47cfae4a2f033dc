//! Dataset loading, row extraction and batch scoring for CSV and Parquet files
//!
//! Column names follow the German Credit dataset (`Age`, `Sex`, `Housing`,
//! `Saving accounts`, `Checking account`, `Credit amount`, `Duration`,
//! `Purpose`). Every row is scored on its own: a row with a missing or
//! invalid value fails without affecting the others.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use polars::prelude::*;
use rayon::prelude::*;

use super::artifacts::ArtifactBundle;
use super::encoder::CategoricalField;
use super::error::PipelineError;
use super::prediction::PredictionResult;
use super::record::ApplicantRecord;

/// Dataset column holding the applicant age
pub const AGE_COLUMN: &str = "Age";
/// Dataset column holding the credit amount
pub const CREDIT_AMOUNT_COLUMN: &str = "Credit amount";
/// Dataset column holding the duration in months
pub const DURATION_COLUMN: &str = "Duration";

/// Columns appended by `append_predictions`
pub const PREDICTION_COLUMN: &str = "prediction";
pub const CONFIDENCE_COLUMN: &str = "confidence";
pub const ERROR_COLUMN: &str = "error";

/// CSV cell value read as missing, as written by the public German Credit export
pub const CSV_NULL_VALUE: &str = "NA";

/// Per-row outcome of extraction or scoring
pub type RowResult<T> = std::result::Result<T, PipelineError>;

/// Load a dataset from a file (CSV or Parquet based on extension)
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    let extension = file_extension(path);

    let lf = match extension.as_str() {
        "csv" => {
            // 0 means full table scan
            let schema_length = if infer_schema_length == 0 {
                None
            } else {
                Some(infer_schema_length)
            };
            LazyCsvReader::new(path)
                .with_infer_schema_length(schema_length)
                .with_null_values(Some(NullValues::AllColumnsSingle(CSV_NULL_VALUE.into())))
                .finish()
                .with_context(|| format!("Failed to load CSV file: {}", path.display()))?
        }
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        _ => anyhow::bail!(
            "Unsupported file format: {}. Supported formats: csv, parquet",
            extension
        ),
    };

    lf.collect()
        .with_context(|| format!("Failed to read dataset: {}", path.display()))
}

/// Save dataset to file (CSV or Parquet based on extension)
pub fn save_dataset(df: &mut DataFrame, path: &Path) -> Result<()> {
    let extension = file_extension(path);

    match extension.as_str() {
        "csv" => {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            CsvWriter::new(&mut file)
                .finish(df)
                .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
        }
        "parquet" => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            ParquetWriter::new(file)
                .finish(df)
                .with_context(|| format!("Failed to write Parquet file: {}", path.display()))?;
        }
        _ => anyhow::bail!(
            "Unsupported output format: {}. Supported formats: csv, parquet",
            extension
        ),
    }

    Ok(())
}

/// Default output path for scored datasets: `<stem>_scored.<ext>` next to the input
pub fn scored_output_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("parquet");
    parent.join(format!("{}_scored.{}", stem, extension))
}

fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name).map_err(|_| {
        let available: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        anyhow::anyhow!(
            "Column '{}' not found in dataset. Available columns: {:?}",
            name,
            available
        )
    })
}

fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = require_column(df, name)?
        .cast(&DataType::Float64)
        .with_context(|| format!("Column '{}' is not numeric", name))?;
    Ok(column.f64()?.into_iter().collect())
}

fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = require_column(df, name)?
        .cast(&DataType::String)
        .with_context(|| format!("Column '{}' cannot be read as text", name))?;
    Ok(column
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

fn whole_number(value: Option<f64>, column: &str, row: usize) -> RowResult<u32> {
    match value {
        None => Err(PipelineError::InvalidRecord(format!(
            "row {}: '{}' is missing",
            row, column
        ))),
        Some(v) if v.fract() != 0.0 || v < 0.0 || v > f64::from(u32::MAX) => {
            Err(PipelineError::InvalidRecord(format!(
                "row {}: '{}' value {} is not a whole number",
                row, column, v
            )))
        }
        Some(v) => Ok(v as u32),
    }
}

/// Turn every dataset row into an applicant record.
///
/// Missing columns are a hard error; missing or malformed values only fail
/// their own row.
pub fn extract_records(df: &DataFrame) -> Result<Vec<RowResult<ApplicantRecord>>> {
    let ages = numeric_values(df, AGE_COLUMN)?;
    let amounts = numeric_values(df, CREDIT_AMOUNT_COLUMN)?;
    let durations = numeric_values(df, DURATION_COLUMN)?;

    let categorical = CategoricalField::ALL
        .iter()
        .map(|field| string_values(df, field.dataset_column()))
        .collect::<Result<Vec<_>>>()?;

    let records = (0..df.height())
        .map(|row| -> RowResult<ApplicantRecord> {
            let label = |idx: usize, field: CategoricalField| -> RowResult<String> {
                categorical[idx][row].clone().ok_or_else(|| {
                    PipelineError::InvalidRecord(format!(
                        "row {}: '{}' is missing",
                        row,
                        field.dataset_column()
                    ))
                })
            };

            let record = ApplicantRecord {
                age: whole_number(ages[row], AGE_COLUMN, row)?,
                credit_amount: amounts[row].ok_or_else(|| {
                    PipelineError::InvalidRecord(format!(
                        "row {}: '{}' is missing",
                        row, CREDIT_AMOUNT_COLUMN
                    ))
                })?,
                duration_months: whole_number(durations[row], DURATION_COLUMN, row)?,
                sex: label(0, CategoricalField::Sex)?,
                housing: label(1, CategoricalField::Housing)?,
                saving_account: label(2, CategoricalField::SavingAccount)?,
                checking_account: label(3, CategoricalField::CheckingAccount)?,
                purpose: label(4, CategoricalField::Purpose)?,
            };
            Ok(record)
        })
        .collect();

    Ok(records)
}

/// Score every record in parallel against the shared bundle.
///
/// Output order matches input order.
pub fn score_records(
    bundle: &ArtifactBundle,
    records: &[RowResult<ApplicantRecord>],
    progress: Option<&ProgressBar>,
) -> Vec<RowResult<PredictionResult>> {
    records
        .par_iter()
        .map(|record| {
            let result = match record {
                Ok(record) => bundle.predict(record),
                Err(err) => Err(err.clone()),
            };
            if let Some(pb) = progress {
                pb.inc(1);
            }
            result
        })
        .collect()
}

/// Append `prediction`, `confidence` and `error` columns to the dataset
pub fn append_predictions(df: &mut DataFrame, results: &[RowResult<PredictionResult>]) -> Result<()> {
    if results.len() != df.height() {
        anyhow::bail!(
            "Got {} predictions for {} rows",
            results.len(),
            df.height()
        );
    }

    let labels: Vec<Option<&str>> = results
        .iter()
        .map(|r| r.as_ref().ok().map(|p| p.label.as_dataset_value()))
        .collect();
    let confidences: Vec<Option<f64>> = results
        .iter()
        .map(|r| r.as_ref().ok().map(|p| p.confidence))
        .collect();
    let errors: Vec<Option<String>> = results
        .iter()
        .map(|r| r.as_ref().err().map(|e| e.to_string()))
        .collect();

    df.with_column(Column::new(PREDICTION_COLUMN.into(), labels))?;
    df.with_column(Column::new(CONFIDENCE_COLUMN.into(), confidences))?;
    df.with_column(Column::new(ERROR_COLUMN.into(), errors))?;

    Ok(())
}
