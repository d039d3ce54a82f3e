//! `analyze-template` — runs the Template Analyzer (spec §4.1) over a
//! tokenized sample document and writes the resulting TemplateConfig.

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use fieldforge::template::TemplateAnalyzer;
use fieldforge::types::Word;
use std::path::PathBuf;

#[derive(ClapArgs)]
pub struct Args {
    /// JSON file containing a `Vec<Word>` for the sample document, with its
    /// field markers still present as literal `{field_name}` words.
    #[arg(long)]
    words: PathBuf,
    /// Where to write the produced TemplateConfig JSON.
    #[arg(long)]
    out: PathBuf,
}

pub fn run(args: Args) -> Result<()> {
    let words_json =
        std::fs::read_to_string(&args.words).with_context(|| format!("failed to read {}", args.words.display()))?;
    let words: Vec<Word> = serde_json::from_str(&words_json).context("words file is not a valid Word array")?;

    let template = TemplateAnalyzer::new().analyze(&words);
    let rendered = serde_json::to_string_pretty(&template).context("failed to serialize template config")?;

    std::fs::write(&args.out, rendered).with_context(|| format!("failed to write {}", args.out.display()))?;
    println!("wrote template config with {} fields to {}", template.fields.len(), args.out.display());
    Ok(())
}
