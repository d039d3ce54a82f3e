//! `extract` — the `extract(pdf_bytes, template_id)` inbound operation
//! (spec §6), driven from a pre-tokenized words file rather than raw PDF
//! bytes so the demo doesn't require a pdfium install by default. Pass
//! `--pdf` with the crate's `pdf` feature enabled to tokenize a real file
//! instead.

use anyhow::{bail, Context, Result};
use clap::Args as ClapArgs;
use fieldforge::types::{TemplateConfig, Word};
use std::path::{Path, PathBuf};

#[derive(ClapArgs)]
pub struct Args {
    /// Template id to register/extract against.
    #[arg(long)]
    template_id: String,
    /// TemplateConfig JSON produced by `analyze-template` (or hand-written).
    #[arg(long)]
    template: PathBuf,
    /// JSON file containing the page's tokenized `Vec<Word>`.
    #[arg(long, conflicts_with = "pdf")]
    words: Option<PathBuf>,
    /// Raw PDF to tokenize directly. Requires the crate's `pdf` feature.
    #[arg(long, conflicts_with = "words")]
    pdf: Option<PathBuf>,
    #[arg(long, default_value_t = 0)]
    page: usize,
    #[arg(long, default_value_t = 612.0)]
    page_width: f32,
    #[arg(long, default_value_t = 792.0)]
    page_height: f32,
    /// Defaults to a freshly generated UUID when omitted, so repeat demo
    /// runs don't collide on the same document record.
    #[arg(long)]
    document_id: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

fn load_words(args: &Args) -> Result<Vec<Word>> {
    if let Some(words_path) = &args.words {
        let raw = std::fs::read_to_string(words_path)
            .with_context(|| format!("failed to read {}", words_path.display()))?;
        return serde_json::from_str(&raw).context("words file is not a valid Word array");
    }
    if let Some(pdf_path) = &args.pdf {
        return tokenize_pdf(pdf_path);
    }
    bail!("one of --words or --pdf is required")
}

#[cfg(feature = "pdf")]
fn tokenize_pdf(pdf_path: &Path) -> Result<Vec<Word>> {
    use fieldforge::tokenizer::{PdfTokenizer, PdfiumTokenizer};
    let bytes = std::fs::read(pdf_path).with_context(|| format!("failed to read {}", pdf_path.display()))?;
    let tokenizer = PdfiumTokenizer::new().context("failed to initialize pdfium")?;
    Ok(tokenizer.tokenize(&bytes)?)
}

#[cfg(not(feature = "pdf"))]
fn tokenize_pdf(_pdf_path: &Path) -> Result<Vec<Word>> {
    bail!("--pdf requires building fieldforge-cli with the `pdf` feature enabled")
}

pub fn run(data_dir: &Path, args: Args) -> Result<()> {
    let words = load_words(&args)?;

    let engine = super::open_engine(data_dir)?;

    let template_json = std::fs::read_to_string(&args.template)
        .with_context(|| format!("failed to read {}", args.template.display()))?;
    let template: TemplateConfig = serde_json::from_str(&template_json).context("template file is not a valid TemplateConfig")?;
    engine.register_template(args.template_id.clone(), template);

    let document_id = args.document_id.clone().unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let result = engine.extract(&args.template_id, &document_id, args.page, words, args.page_width, args.page_height)?;

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&ExtractOutput::from(&result))?);
        }
        OutputFormat::Text => {
            println!("document_id: {}", result.document_id);
            let mut fields: Vec<&String> = result.extracted_data.keys().collect();
            fields.sort();
            for field in fields {
                let value = &result.extracted_data[field];
                let confidence = result.confidences[field];
                let method = result.methods[field];
                println!("{field}: {value}  (confidence={confidence:.2}, method={method})");
            }
        }
    }

    Ok(())
}

#[derive(serde::Serialize)]
struct ExtractOutput {
    document_id: String,
    extracted_data: std::collections::HashMap<String, String>,
    confidences: std::collections::HashMap<String, f64>,
    methods: std::collections::HashMap<String, String>,
}

impl From<&fieldforge::engine::ExtractionResult> for ExtractOutput {
    fn from(r: &fieldforge::engine::ExtractionResult) -> Self {
        Self {
            document_id: r.document_id.clone(),
            extracted_data: r.extracted_data.clone(),
            confidences: r.confidences.clone(),
            methods: r.methods.iter().map(|(k, v)| (k.clone(), v.to_string())).collect(),
        }
    }
}
