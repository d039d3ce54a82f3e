//! Extraction output types (spec §3).

use super::strategy::StrategyType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What one strategy did for one field, whether or not it won.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyAttempt {
    pub success: bool,
    pub confidence: f64,
    pub value: Option<String>,
    pub error: Option<String>,
}

impl StrategyAttempt {
    pub fn success(confidence: f64, value: String) -> Self {
        Self { success: true, confidence, value: Some(value), error: None }
    }

    pub fn failure() -> Self {
        Self { success: false, confidence: 0.0, value: None, error: None }
    }

    pub fn errored(message: impl Into<String>) -> Self {
        Self { success: false, confidence: 0.0, value: None, error: Some(message.into()) }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldValueMetadata {
    /// Keys always equal the set of strategies the arbiter actually
    /// invoked for this field (spec §4.7, §8).
    pub all_strategies_attempted: HashMap<StrategyType, StrategyAttempt>,
    pub selected_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub value: String,
    pub confidence: f64,
    pub method: StrategyType,
    pub metadata: FieldValueMetadata,
}

impl FieldValue {
    pub fn new(value: impl Into<String>, confidence: f64, method: StrategyType) -> Self {
        Self { value: value.into(), confidence: confidence.clamp(0.0, 1.0), method, metadata: FieldValueMetadata::default() }
    }
}
