//! A single user correction (spec §3, §6).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: u64,
    pub document_id: String,
    pub field_name: String,
    pub original_value: String,
    pub corrected_value: String,
    /// Flips to `true` only after a retrain that actually consumed this
    /// record (spec §3).
    pub used_for_training: bool,
    pub created_at: DateTime<Utc>,
}

impl FeedbackRecord {
    /// `true` when the user left the extracted value untouched — the
    /// "silent acceptance" case is determined at the confidence level
    /// elsewhere, but a correction record only exists when the value
    /// actually differs.
    pub fn was_correction(&self) -> bool {
        self.original_value != self.corrected_value
    }
}
