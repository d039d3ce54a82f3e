//! `train` — the `train(template_id, use_all_feedback)` inbound operation
//! (spec §6), running one gated retrain attempt (spec §4.9).

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use fieldforge::feedback::RetrainOutcome;
use fieldforge::types::TemplateConfig;
use std::path::{Path, PathBuf};

#[derive(ClapArgs)]
pub struct Args {
    #[arg(long)]
    template_id: String,
    /// TemplateConfig JSON; must match the one registered during `extract`.
    #[arg(long)]
    template: PathBuf,
}

pub fn run(data_dir: &Path, args: Args) -> Result<()> {
    let engine = super::open_engine(data_dir)?;

    let template_json = std::fs::read_to_string(&args.template)
        .with_context(|| format!("failed to read {}", args.template.display()))?;
    let template: TemplateConfig = serde_json::from_str(&template_json).context("template file is not a valid TemplateConfig")?;
    engine.register_template(args.template_id.clone(), template);

    match engine.train(&args.template_id)? {
        RetrainOutcome::Accepted { metrics_summary } => {
            println!("retrain accepted: {metrics_summary}");
        }
        RetrainOutcome::Rejected { previous_test_accuracy, candidate_test_accuracy } => {
            println!(
                "retrain rejected: candidate test_accuracy={candidate_test_accuracy:.4} regressed past previous={previous_test_accuracy:.4}"
            );
        }
        RetrainOutcome::Failed { error } => {
            println!("retrain failed: {error}");
        }
        RetrainOutcome::Skipped { reason } => {
            println!("retrain skipped: {reason}");
        }
    }
    Ok(())
}
