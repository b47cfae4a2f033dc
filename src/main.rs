//! credrisk: Credit Risk Prediction CLI Tool
//!
//! Scores a loan applicant (or a whole dataset) with pre-trained artifacts
//! and reports the predicted risk with the model's confidence.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;

use credrisk::cli::{confirm_step, prompt_record, Cli, Commands};
use credrisk::pipeline::{
    append_predictions, extract_records, load_dataset, risk_labels, save_dataset, score_records,
    ArtifactBundle, Classifier, TargetMapping,
};
use credrisk::report::{
    display_applicant, display_artifacts, display_feature_importances, display_features,
    display_prediction, export_evaluation, named_features, rank_feature_importances,
    EvaluationReport, PredictionOutput, ScoringSummary,
};
use credrisk::utils::{
    create_progress_bar, create_spinner, finish_with_success, print_artifact_card, print_banner,
    print_completion, print_count, print_info, print_step_header, print_step_time, print_success,
    print_warning,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Artifacts are loaded once and shared read-only by every prediction
    if cli.json {
        if cli.command.is_some() {
            anyhow::bail!("--json applies to single predictions only");
        }
        let bundle = ArtifactBundle::load(&cli.artifacts)?;
        return run_predict_json(&cli, &bundle);
    }

    print_banner(env!("CARGO_PKG_VERSION"));
    let bundle = load_bundle(&cli.artifacts)?;

    match &cli.command {
        Some(
            command @ Commands::Score {
                input,
                infer_schema_length,
                ..
            },
        ) => {
            let output = command
                .score_output_path()
                .ok_or_else(|| anyhow::anyhow!("Output path could not be derived"))?;
            run_score(&bundle, input, &output, *infer_schema_length)
        }
        Some(Commands::Evaluate {
            input,
            target,
            event_value,
            non_event_value,
            export,
            infer_schema_length,
        }) => {
            let mapping = TargetMapping::new(event_value.as_str(), non_event_value.as_str());
            run_evaluate(
                &bundle,
                input,
                target,
                &mapping,
                export.as_deref(),
                *infer_schema_length,
            )
        }
        Some(Commands::Inspect) => {
            display_artifacts(&bundle);
            if let Some(ranked) = rank_feature_importances(bundle.model(), bundle.columns()) {
                display_feature_importances(&ranked);
            } else {
                print_info("Model does not provide feature importances");
            }
            println!();
            Ok(())
        }
        None => run_predict_interactive(&cli, &bundle),
    }
}

/// Load the artifact bundle with a spinner and print its card
fn load_bundle(dir: &Path) -> Result<ArtifactBundle> {
    let spinner = create_spinner("Loading artifacts...");
    let bundle = match ArtifactBundle::load(dir) {
        Ok(bundle) => bundle,
        Err(err) => {
            spinner.finish_and_clear();
            return Err(err);
        }
    };
    finish_with_success(&spinner, "Artifacts loaded and validated");
    println!();

    print_artifact_card(dir, bundle.model().kind(), bundle.model().n_features());
    for warning in bundle.warnings() {
        print_warning(&warning);
    }

    Ok(bundle)
}

/// Single prediction with JSON output; every field must come from flags
fn run_predict_json(cli: &Cli, bundle: &ArtifactBundle) -> Result<()> {
    let record = cli.record().ok_or_else(|| {
        anyhow::anyhow!(
            "Missing applicant fields for non-interactive prediction: {}",
            cli.missing_fields().join(", ")
        )
    })?;

    let result = bundle.predict(&record)?;
    let features = if cli.show_features {
        Some(bundle.features(&record)?)
    } else {
        None
    };

    let output = PredictionOutput {
        applicant: &record,
        result,
        features: features
            .as_ref()
            .map(|f| named_features(f, bundle.columns())),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

/// One prediction per form submission, repeated until the user stops
fn run_predict_interactive(cli: &Cli, bundle: &ArtifactBundle) -> Result<()> {
    loop {
        let record = match cli.record() {
            Some(record) => record,
            None if cli.non_interactive() => anyhow::bail!(
                "Missing applicant fields with --no-confirm: {}",
                cli.missing_fields().join(", ")
            ),
            None => prompt_record(cli, bundle.encoders())?,
        };

        print_step_header(1, "Applicant");
        display_applicant(&record);

        // A fully specified applicant is a one-shot run
        let one_shot = cli.non_interactive() || cli.record().is_some();

        print_step_header(2, "Prediction");
        match bundle.predict(&record) {
            Ok(result) => {
                if cli.show_features {
                    display_features(&bundle.features(&record)?, bundle.columns());
                }
                display_prediction(&result);
            }
            Err(err) if one_shot => return Err(err.into()),
            Err(err) => print_warning(&format!("Prediction failed: {}", err)),
        }

        if one_shot {
            break;
        }
        println!();
        if !confirm_step("Score another applicant?")? {
            break;
        }
    }

    print_completion("Prediction complete!");
    Ok(())
}

fn run_score(
    bundle: &ArtifactBundle,
    input: &Path,
    output: &Path,
    infer_schema_length: usize,
) -> Result<()> {
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let spinner = create_spinner("Reading dataset...");
    let mut df = load_dataset(input, infer_schema_length)?;
    let records = extract_records(&df)?;
    finish_with_success(&spinner, &format!("Loaded {} rows", df.height()));
    let load_elapsed = step_start.elapsed();
    print_step_time(load_elapsed);

    print_step_header(2, "Score Applicants");
    let step_start = Instant::now();
    let pb = create_progress_bar(records.len() as u64, "Scoring");
    let results = score_records(bundle, &records, Some(&pb));
    finish_with_success(&pb, "Scoring complete");
    let score_elapsed = step_start.elapsed();
    print_step_time(score_elapsed);

    let mut summary = ScoringSummary::from_results(&results);
    summary.set_load_time(load_elapsed);
    summary.set_score_time(score_elapsed);
    if summary.failed > 0 {
        print_count("row(s) that could not be scored", summary.failed, None);
    }

    print_step_header(3, "Save Results");
    let step_start = Instant::now();
    let spinner = create_spinner("Writing output file...");
    append_predictions(&mut df, &results)?;
    save_dataset(&mut df, output)?;
    finish_with_success(&spinner, &format!("Saved to {}", output.display()));
    let save_elapsed = step_start.elapsed();
    summary.set_save_time(save_elapsed);
    print_step_time(save_elapsed);

    summary.display();
    print_completion("Scoring complete!");
    Ok(())
}

fn run_evaluate(
    bundle: &ArtifactBundle,
    input: &Path,
    target: &str,
    mapping: &TargetMapping,
    export: Option<&Path>,
    infer_schema_length: usize,
) -> Result<()> {
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let spinner = create_spinner("Reading dataset...");
    let df = load_dataset(input, infer_schema_length)?;
    let records = extract_records(&df)?;
    let actual = risk_labels(&df, target, mapping)?;
    finish_with_success(&spinner, &format!("Loaded {} rows", df.height()));
    print_step_time(step_start.elapsed());

    print_step_header(2, "Score Applicants");
    let step_start = Instant::now();
    let pb = create_progress_bar(records.len() as u64, "Scoring");
    let predicted = score_records(bundle, &records, Some(&pb));
    finish_with_success(&pb, "Scoring complete");
    print_step_time(step_start.elapsed());

    let report = EvaluationReport::from_outcomes(&actual, &predicted);
    report.display();

    if let Some(path) = export {
        export_evaluation(
            &report,
            &input.display().to_string(),
            target,
            bundle.model().kind(),
            path,
        )?;
        println!();
        print_success(&format!("Evaluation exported to {}", path.display()));
    }

    print_completion("Evaluation complete!");
    Ok(())
}
