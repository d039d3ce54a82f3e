//! Command-line demo for the three inbound operations a surrounding
//! service would normally drive over HTTP: `extract`, `feedback`
//! (submit_corrections), and `train`. Ambient developer tooling around the
//! extraction core, not a new pipeline component (SPEC_FULL §10).

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Template-driven PDF field extraction")]
struct Cli {
    /// Directory holding the feedback store and trained model files,
    /// shared across invocations so `feedback`/`train` see what `extract`
    /// recorded.
    #[arg(long, global = true, default_value = "fieldforge-data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a sample document's tokenized words into a TemplateConfig.
    AnalyzeTemplate(commands::analyze_template::Args),
    /// Run extraction for one page of one document against a template.
    Extract(commands::extract::Args),
    /// Submit corrections for a previously extracted document.
    Feedback(commands::feedback::Args),
    /// Run one gated retrain attempt for a template.
    Train(commands::train::Args),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "fieldforge=info".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::AnalyzeTemplate(args) => commands::analyze_template::run(args),
        Commands::Extract(args) => commands::extract::run(&cli.data_dir, args),
        Commands::Feedback(args) => commands::feedback::run(&cli.data_dir, args),
        Commands::Train(args) => commands::train::run(&cli.data_dir, args),
    }
}
