pub mod analyze_template;
pub mod extract;
pub mod feedback;
pub mod train;

use anyhow::{Context, Result};
use fieldforge::{FieldforgeEngine, Settings};
use std::path::Path;

/// Builds an engine backed by the on-disk feedback store under `data_dir`,
/// shared by every subcommand so state survives across invocations.
pub fn open_engine(data_dir: &Path) -> Result<FieldforgeEngine> {
    let store = fieldforge::feedback::FileBackedFeedbackStore::open(data_dir.join("store"))
        .with_context(|| format!("failed to open feedback store at {}", data_dir.display()))?;
    Ok(FieldforgeEngine::new(Settings::default(), Box::new(store), data_dir.join("models")))
}
