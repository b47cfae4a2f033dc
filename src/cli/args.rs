//! Command-line argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::pipeline::{
    dataset::scored_output_path, ApplicantRecord, AGE_RANGE, CREDIT_AMOUNT_RANGE, DURATION_RANGE,
};

/// credrisk - Predict loan applicant credit risk with pre-trained artifacts
#[derive(Parser, Debug)]
#[command(name = "credrisk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding model.json, scaler.json, feature_cols.json and the le_*.json encoders
    #[arg(short, long, default_value = "artifacts", global = true)]
    pub artifacts: PathBuf,

    /// Applicant age in years (18-100)
    #[arg(long, value_parser = validate_age)]
    pub age: Option<u32>,

    /// Requested credit amount (100-1000000)
    #[arg(long, value_parser = validate_credit_amount)]
    pub credit_amount: Option<f64>,

    /// Loan duration in months (1-100)
    #[arg(long, value_parser = validate_duration)]
    pub duration: Option<u32>,

    /// Applicant sex, as in the sex encoder vocabulary
    #[arg(long)]
    pub sex: Option<String>,

    /// Housing status, as in the housing encoder vocabulary
    #[arg(long)]
    pub housing: Option<String>,

    /// Saving account level, as in the saving encoder vocabulary
    #[arg(long)]
    pub saving_account: Option<String>,

    /// Checking account level, as in the checking encoder vocabulary
    #[arg(long)]
    pub checking_account: Option<String>,

    /// Credit purpose, as in the purpose encoder vocabulary
    #[arg(long)]
    pub purpose: Option<String>,

    /// Skip interactive prompts; every applicant field must be given as a flag
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,

    /// Print the prediction as JSON instead of styled output (implies --no-confirm)
    #[arg(long, default_value = "false")]
    pub json: bool,

    /// Also show the model-ready feature vector
    #[arg(long, default_value = "false")]
    pub show_features: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score every applicant in a CSV or Parquet dataset
    Score {
        /// Input file path (CSV or Parquet)
        input: PathBuf,

        /// Output file path (CSV or Parquet, determined by extension).
        /// Defaults to input directory with '_scored' suffix.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of rows to use for schema inference (CSV only).
        /// Use 0 for full table scan.
        #[arg(long, default_value = "10000")]
        infer_schema_length: usize,
    },

    /// Evaluate predictions against a labelled risk column
    Evaluate {
        /// Input file path (CSV or Parquet)
        input: PathBuf,

        /// Target column with the true risk
        #[arg(short, long, default_value = "Risk")]
        target: String,

        /// Target value that represents bad risk
        #[arg(long, default_value = "bad")]
        event_value: String,

        /// Target value that represents good risk
        #[arg(long, default_value = "good")]
        non_event_value: String,

        /// Write the evaluation report as JSON to this path
        #[arg(long)]
        export: Option<PathBuf>,

        /// Number of rows to use for schema inference (CSV only).
        /// Use 0 for full table scan.
        #[arg(long, default_value = "10000")]
        infer_schema_length: usize,
    },

    /// Show the loaded artifacts: column order, encoders, scaler and feature importances
    Inspect,
}

impl Cli {
    /// True when prompts must not be shown
    pub fn non_interactive(&self) -> bool {
        self.no_confirm || self.json
    }

    /// The applicant described by the flags, if every field was given
    pub fn record(&self) -> Option<ApplicantRecord> {
        Some(ApplicantRecord {
            age: self.age?,
            credit_amount: self.credit_amount?,
            duration_months: self.duration?,
            sex: self.sex.clone()?,
            housing: self.housing.clone()?,
            saving_account: self.saving_account.clone()?,
            checking_account: self.checking_account.clone()?,
            purpose: self.purpose.clone()?,
        })
    }

    /// Flag names of the applicant fields that were not given
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.age.is_none() {
            missing.push("--age");
        }
        if self.credit_amount.is_none() {
            missing.push("--credit-amount");
        }
        if self.duration.is_none() {
            missing.push("--duration");
        }
        for (value, flag) in [
            (&self.sex, "--sex"),
            (&self.housing, "--housing"),
            (&self.saving_account, "--saving-account"),
            (&self.checking_account, "--checking-account"),
            (&self.purpose, "--purpose"),
        ] {
            if value.is_none() {
                missing.push(flag);
            }
        }
        missing
    }
}

impl Commands {
    /// Output path of `score`, deriving it from the input if not given
    pub fn score_output_path(&self) -> Option<PathBuf> {
        match self {
            Commands::Score { input, output, .. } => {
                Some(output.clone().unwrap_or_else(|| scored_output_path(input)))
            }
            _ => None,
        }
    }
}

/// Validator for the age flag
fn validate_age(s: &str) -> Result<u32, String> {
    let value: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid whole number", s))?;

    if !AGE_RANGE.contains(&value) {
        Err(format!(
            "age must be between {} and {}, got {}",
            AGE_RANGE.start(),
            AGE_RANGE.end(),
            value
        ))
    } else {
        Ok(value)
    }
}

/// Validator for the credit amount flag
fn validate_credit_amount(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !CREDIT_AMOUNT_RANGE.contains(&value) {
        Err(format!(
            "credit amount must be between {} and {}, got {}",
            CREDIT_AMOUNT_RANGE.start(),
            CREDIT_AMOUNT_RANGE.end(),
            value
        ))
    } else {
        Ok(value)
    }
}

/// Validator for the duration flag
fn validate_duration(s: &str) -> Result<u32, String> {
    let value: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid whole number", s))?;

    if !DURATION_RANGE.contains(&value) {
        Err(format!(
            "duration must be between {} and {} months, got {}",
            DURATION_RANGE.start(),
            DURATION_RANGE.end(),
            value
        ))
    } else {
        Ok(value)
    }
}
