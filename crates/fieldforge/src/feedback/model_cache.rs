//! `(template_id, mtime)` keyed model cache (spec §5): the CRF Strategy
//! loads a model lazily and reloads it only when the backing file's mtime
//! changes, mirroring the teacher's `dashmap`-backed processor cache.

use crate::crf::CrfModel;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

struct Entry {
    mtime: SystemTime,
    model: Arc<CrfModel>,
}

#[derive(Default)]
pub struct ModelCache {
    entries: DashMap<String, Entry>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the model for `template_id`, reloading from `path` if the
    /// file's mtime has advanced past what's cached (or nothing is cached
    /// yet). Returns `Ok(None)` if no model file exists at `path` —
    /// spec §7's "missing/stale model" case, not an error.
    pub fn get_or_load(&self, template_id: &str, path: impl AsRef<Path>) -> crate::Result<Option<Arc<CrfModel>>> {
        let path = path.as_ref();
        let mtime = match std::fs::metadata(path).and_then(|m| m.modified()) {
            Ok(mtime) => mtime,
            Err(_) => return Ok(None),
        };

        if let Some(entry) = self.entries.get(template_id) {
            if entry.mtime == mtime {
                return Ok(Some(entry.model.clone()));
            }
        }

        let model = Arc::new(CrfModel::load(path)?);
        self.entries.insert(template_id.to_string(), Entry { mtime, model: model.clone() });
        Ok(Some(model))
    }

    /// Drops the cached entry for `template_id` outright — called by the
    /// Retrainer right after a model swap so the next extraction always
    /// re-reads from disk rather than racing the file-system mtime
    /// resolution (some filesystems only have second-granularity).
    pub fn invalidate(&self, template_id: &str) {
        self.entries.remove(template_id);
    }
}

/// Copy-then-rename model-file replacement (spec §5: "the model file ...
/// atomically replaced by Retrainer via copy-then-rename").
pub fn atomic_replace(new_model: &CrfModel, final_path: impl AsRef<Path>) -> crate::Result<()> {
    let final_path = final_path.as_ref();
    let tmp_path: PathBuf = final_path.with_extension("tmp");
    new_model.save(&tmp_path)?;
    std::fs::rename(&tmp_path, final_path)?;
    Ok(())
}
