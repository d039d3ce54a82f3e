//! Append-only record of every retrain attempt (spec §3, §6, §7).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStatus {
    Accepted,
    Rejected,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub template_id: String,
    pub trained_at: DateTime<Utc>,
    pub training_samples: usize,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    pub model_path: Option<String>,
    pub status: TrainingStatus,
    pub diversity_warning: Option<String>,
}
