//! In-memory record of one extraction (spec §6's "Documents" persisted-state
//! layout). Keeps just enough per-document state — the page word list and
//! the extraction result — to let the Feedback Store rebuild CRF training
//! sequences later without re-tokenizing; raw PDF bytes and durable storage
//! remain the surrounding service's job (spec §1's "file storage" collaborator).

use super::extraction::StrategyAttempt;
use super::strategy::StrategyType;
use super::word::Word;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One entry of `metadata.strategies_used` (spec §6): everything the
/// arbiter decided for a single field of a single document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategiesUsedEntry {
    /// Never null (spec §6, §8): an entry with unknown field identity is
    /// not produced.
    pub field_name: String,
    pub method: StrategyType,
    pub confidence: f64,
    pub all_strategies_attempted: HashMap<StrategyType, StrategyAttempt>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub document_id: String,
    pub template_id: String,
    pub page: usize,
    /// The words of the page this extraction ran over, retained so a later
    /// correction can be relabeled into a training sequence (spec §4.3).
    pub page_words: Vec<Word>,
    pub page_width: f32,
    pub page_height: f32,
    pub extracted_data: HashMap<String, String>,
    pub confidences: HashMap<String, f64>,
    pub methods: HashMap<String, StrategyType>,
    pub strategies_used: Vec<StrategiesUsedEntry>,
    pub created_at: DateTime<Utc>,
}

impl DocumentRecord {
    pub fn strategies_used_for(&self, field_name: &str) -> Option<&StrategiesUsedEntry> {
        self.strategies_used.iter().find(|s| s.field_name == field_name)
    }
}
