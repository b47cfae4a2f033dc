//! Applicant record - the raw form values for one loan application

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::error::PipelineError;

/// Allowed applicant age in years
pub const AGE_RANGE: RangeInclusive<u32> = 18..=100;

/// Allowed credit amount
pub const CREDIT_AMOUNT_RANGE: RangeInclusive<f64> = 100.0..=1_000_000.0;

/// Allowed loan duration in months
pub const DURATION_RANGE: RangeInclusive<u32> = 1..=100;

/// One loan applicant, exactly as entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub age: u32,
    pub credit_amount: f64,
    pub duration_months: u32,
    pub sex: String,
    pub housing: String,
    pub saving_account: String,
    pub checking_account: String,
    pub purpose: String,
}

impl ApplicantRecord {
    /// Check the numeric fields against their allowed ranges.
    ///
    /// Categorical fields are not checked here; their vocabulary lives in the
    /// encoders and is enforced when the feature vector is built.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !AGE_RANGE.contains(&self.age) {
            return Err(PipelineError::InvalidRecord(format!(
                "age {} is outside {}..={}",
                self.age,
                AGE_RANGE.start(),
                AGE_RANGE.end()
            )));
        }

        if !self.credit_amount.is_finite() || !CREDIT_AMOUNT_RANGE.contains(&self.credit_amount) {
            return Err(PipelineError::InvalidRecord(format!(
                "credit amount {} is outside {}..={}",
                self.credit_amount,
                CREDIT_AMOUNT_RANGE.start(),
                CREDIT_AMOUNT_RANGE.end()
            )));
        }

        if !DURATION_RANGE.contains(&self.duration_months) {
            return Err(PipelineError::InvalidRecord(format!(
                "duration {} months is outside {}..={}",
                self.duration_months,
                DURATION_RANGE.start(),
                DURATION_RANGE.end()
            )));
        }

        Ok(())
    }

    /// The three numeric inputs in scaler order: age, credit amount, duration
    pub fn numeric_values(&self) -> [f64; 3] {
        [
            f64::from(self.age),
            self.credit_amount,
            f64::from(self.duration_months),
        ]
    }
}
