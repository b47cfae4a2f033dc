//! Interactive applicant form using dialoguer

use anyhow::Result;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use crate::pipeline::{
    ApplicantRecord, CategoricalField, EncoderSet, LabelEncoder, AGE_RANGE, CREDIT_AMOUNT_RANGE,
    DURATION_RANGE,
};

use super::args::Cli;

/// Form defaults
const DEFAULT_AGE: u32 = 30;
const DEFAULT_CREDIT_AMOUNT: f64 = 1000.0;
const DEFAULT_DURATION: u32 = 12;

/// Prompt user to confirm proceeding with an action
pub fn confirm_step(message: &str) -> Result<bool> {
    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(message)
        .default(true)
        .interact()?;
    Ok(confirmed)
}

/// Fill the applicant form, asking only for fields not given on the command line.
///
/// Categorical fields are chosen from the encoder vocabularies, so an
/// interactive record can never carry an unknown category.
pub fn prompt_record(cli: &Cli, encoders: &EncoderSet) -> Result<ApplicantRecord> {
    println!(
        "    {}",
        style("Loan application details").white().bold()
    );
    let theme = ColorfulTheme::default();

    let age = match cli.age {
        Some(age) => age,
        None => Input::<u32>::with_theme(&theme)
            .with_prompt(format!("Age ({}-{})", AGE_RANGE.start(), AGE_RANGE.end()))
            .default(DEFAULT_AGE)
            .validate_with(|v: &u32| -> Result<(), String> {
                if AGE_RANGE.contains(v) {
                    Ok(())
                } else {
                    Err(format!("Age must be between {} and {}", AGE_RANGE.start(), AGE_RANGE.end()))
                }
            })
            .interact_text()?,
    };

    let credit_amount = match cli.credit_amount {
        Some(amount) => amount,
        None => Input::<f64>::with_theme(&theme)
            .with_prompt("Credit amount (€)")
            .default(DEFAULT_CREDIT_AMOUNT)
            .validate_with(|v: &f64| -> Result<(), String> {
                if CREDIT_AMOUNT_RANGE.contains(v) {
                    Ok(())
                } else {
                    Err(format!(
                        "Credit amount must be between {} and {}",
                        CREDIT_AMOUNT_RANGE.start(),
                        CREDIT_AMOUNT_RANGE.end()
                    ))
                }
            })
            .interact_text()?,
    };

    let duration_months = match cli.duration {
        Some(duration) => duration,
        None => Input::<u32>::with_theme(&theme)
            .with_prompt("Duration (months)")
            .default(DEFAULT_DURATION)
            .validate_with(|v: &u32| -> Result<(), String> {
                if DURATION_RANGE.contains(v) {
                    Ok(())
                } else {
                    Err(format!(
                        "Duration must be between {} and {} months",
                        DURATION_RANGE.start(),
                        DURATION_RANGE.end()
                    ))
                }
            })
            .interact_text()?,
    };

    let pick = |given: &Option<String>, field: CategoricalField, prompt: &str| -> Result<String> {
        match given {
            Some(value) => Ok(value.clone()),
            None => select_label(&theme, prompt, encoders.get(field)),
        }
    };

    Ok(ApplicantRecord {
        age,
        credit_amount,
        duration_months,
        sex: pick(&cli.sex, CategoricalField::Sex, "Sex")?,
        housing: pick(&cli.housing, CategoricalField::Housing, "Housing")?,
        saving_account: pick(&cli.saving_account, CategoricalField::SavingAccount, "Saving account")?,
        checking_account: pick(&cli.checking_account, CategoricalField::CheckingAccount, "Checking account")?,
        purpose: pick(&cli.purpose, CategoricalField::Purpose, "Purpose")?,
    })
}

fn select_label(theme: &ColorfulTheme, prompt: &str, encoder: &LabelEncoder) -> Result<String> {
    let index = Select::with_theme(theme)
        .with_prompt(prompt)
        .items(encoder.classes())
        .default(0)
        .interact()?;
    Ok(encoder.classes()[index].clone())
}
