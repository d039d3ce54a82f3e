//! The trained CRF: sparse feature weights keyed by a lazily built feature
//! index, plus the list of field names the model was trained on (spec §3's
//! `Model` type).

use crate::{FieldforgeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrfModel {
    /// The full BIO label set in textual form (`"O"`, `"B-DATE"`, ...),
    /// fixed order assigned at training time.
    pub labels: Vec<String>,
    pub field_names: Vec<String>,
    pub feature_index: HashMap<String, usize>,
    /// Flattened `[feature_id * num_labels + label_id]`.
    pub state_weights: Vec<f64>,
    /// Flattened `[prev_label_id * num_labels + label_id]`.
    pub trans_weights: Vec<f64>,
}

impl CrfModel {
    pub fn num_labels(&self) -> usize {
        self.labels.len()
    }

    pub fn label_id(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn feature_id(&self, key: &str) -> Option<usize> {
        self.feature_index.get(key).copied()
    }

    pub fn state_weight(&self, feature_id: usize, label_id: usize) -> f64 {
        self.state_weights[feature_id * self.num_labels() + label_id]
    }

    pub fn trans_weight(&self, prev_label_id: usize, label_id: usize) -> f64 {
        self.trans_weights[prev_label_id * self.num_labels() + label_id]
    }

    /// Sum of state-feature weights activated at one word, for each label.
    pub fn emission_scores(&self, features: &[(String, f64)]) -> Vec<f64> {
        let mut scores = vec![0.0; self.num_labels()];
        for (key, value) in features {
            if let Some(feat_id) = self.feature_id(key) {
                for (label_id, score) in scores.iter_mut().enumerate() {
                    *score += self.state_weight(feat_id, label_id) * value;
                }
            }
        }
        scores
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer(file, self)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let file = std::fs::File::open(&path_buf).map_err(|_| FieldforgeError::ModelNotFound { path: path_buf })?;
        let model = serde_json::from_reader(file)?;
        Ok(model)
    }
}
