//! Template-driven structured field extraction for PDF documents.
//!
//! The crate implements the extraction *core* only: template analysis, the
//! lexical/positional/pattern/field-aware feature extractor, a linear-chain
//! CRF learner, three cooperating extraction strategies, the hybrid arbiter
//! that picks among them, the adaptive post-processor, and the
//! feedback-driven retraining loop with its safeguards. The HTTP surface,
//! authentication, the web UI, and database migrations are deliberately left
//! to the surrounding service; see [`tokenizer::PdfTokenizer`] for the one
//! external contract this crate does depend on.

pub mod arbiter;
pub mod config;
pub mod crf;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod features;
pub mod postprocess;
pub mod strategies;
pub mod template;
pub mod tokenizer;
pub mod types;

pub use config::Settings;
pub use engine::FieldforgeEngine;
pub use error::{FieldforgeError, Result};
