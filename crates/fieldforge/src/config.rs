//! Tunable settings for the extraction and retraining pipeline.
//!
//! Every named default in spec §6 lives here; nothing downstream hardcodes
//! one of these values, so a deployment can override the whole set (e.g.
//! from a TOML file via the `toml` crate) without touching code.

use serde::{Deserialize, Serialize};

/// CRF training hyperparameters (spec §4.3 / §6).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrfHyperparameters {
    pub c1: f64,
    pub c2: f64,
    pub max_iterations: usize,
}

impl Default for CrfHyperparameters {
    fn default() -> Self {
        Self { c1: 0.1, c2: 0.2, max_iterations: 300 }
    }
}

/// Crate-wide tunable settings, all with the defaults documented in spec §6.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Unused-feedback count that triggers a retrain attempt.
    pub retrain_threshold: usize,
    /// Minimum seconds between two retrains of the same template.
    pub cooldown_secs: u64,
    /// A retrain is rejected if test accuracy drops more than this.
    pub max_accuracy_drop: f64,
    /// Base confidence-override margin (spec §4.7); scaled per field by
    /// `confidence_override_variance_factor` per the Open Question decision
    /// in DESIGN.md.
    pub confidence_override_margin: f64,
    /// How much the field's historical confidence variance widens the
    /// override margin. `0.0` reproduces the unscaled spec behavior.
    pub confidence_override_variance_factor: f64,
    /// Confidence at/above which an uncorrected extraction counts as
    /// "silent acceptance" ground truth for CRF training.
    pub silent_acceptance_cutoff: f64,
    /// Training weight applied to silent-acceptance sequences, relative to
    /// `1.0` for true corrections (DESIGN.md Open Question (a)).
    pub silent_acceptance_weight: f64,
    /// Minimum acceptable unique-sequence ratio in a training set.
    pub diversity_warning_threshold: f64,
    /// Minimum historical frequency a mined structural/prefix/suffix
    /// pattern needs before the Post-Processor applies it (spec §4.8).
    pub pattern_frequency_threshold: f64,
    pub crf: CrfHyperparameters,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            retrain_threshold: 100,
            cooldown_secs: 3_600,
            max_accuracy_drop: 0.05,
            confidence_override_margin: 0.1,
            confidence_override_variance_factor: 0.0,
            silent_acceptance_cutoff: 0.65,
            silent_acceptance_weight: 0.5,
            diversity_warning_threshold: 0.30,
            pattern_frequency_threshold: 0.10,
            crf: CrfHyperparameters::default(),
        }
    }
}

impl Settings {
    /// Parse settings from a TOML document, falling back to defaults for
    /// any field the document omits.
    pub fn from_toml_str(s: &str) -> crate::Result<Self> {
        toml::from_str(s).map_err(|e| crate::FieldforgeError::validation(e.to_string()))
    }
}
