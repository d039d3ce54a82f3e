//! `feedback` — the `submit_corrections(document_id, corrections)` inbound
//! operation (spec §6).

use anyhow::{bail, Context, Result};
use clap::Args as ClapArgs;
use fieldforge::engine::Correction;
use std::path::Path;

#[derive(ClapArgs)]
pub struct Args {
    #[arg(long)]
    document_id: String,
    /// One correction per flag, as `field_name=corrected_value`.
    #[arg(long = "correction", required = true)]
    corrections: Vec<String>,
}

fn parse_corrections(raw: &[String]) -> Result<Vec<Correction>> {
    let corrections: Vec<Correction> = raw
        .iter()
        .map(|entry| {
            let (field_name, corrected_value) = entry
                .split_once('=')
                .with_context(|| format!("'{entry}' is not of the form field_name=corrected_value"))?;
            Ok(Correction { field_name: field_name.to_string(), corrected_value: corrected_value.to_string() })
        })
        .collect::<Result<Vec<_>>>()?;

    if corrections.is_empty() {
        bail!("at least one --correction is required");
    }
    Ok(corrections)
}

pub fn run(data_dir: &Path, args: Args) -> Result<()> {
    let engine = super::open_engine(data_dir)?;
    let corrections = parse_corrections(&args.corrections)?;

    let retrain_scheduled = engine.submit_corrections(&args.document_id, &corrections)?;
    println!(
        "recorded {} correction(s) for document '{}'; retrain_scheduled={retrain_scheduled}",
        corrections.len(),
        args.document_id
    );
    if retrain_scheduled {
        println!("unused feedback crossed the retrain threshold — run `fieldforge train` to act on it");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_field_equals_value_pairs() {
        let corrections = parse_corrections(&["date=31 May 2025".to_string(), "amount=100.00".to_string()]).unwrap();
        assert_eq!(corrections.len(), 2);
        assert_eq!(corrections[0].field_name, "date");
        assert_eq!(corrections[0].corrected_value, "31 May 2025");
        assert_eq!(corrections[1].field_name, "amount");
        assert_eq!(corrections[1].corrected_value, "100.00");
    }

    #[test]
    fn rejects_an_entry_without_an_equals_sign() {
        assert!(parse_corrections(&["not-a-pair".to_string()]).is_err());
    }

    #[test]
    fn rejects_an_empty_correction_list() {
        assert!(parse_corrections(&[]).is_err());
    }
}
