//! Per-template field configuration produced by the Template Analyzer and
//! consumed by every strategy (spec §3, §4.1).

use super::bbox::BoundingBox;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The context around one field's marker: its label, the words surrounding
/// it, and the boundary used by every downstream strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldContext {
    pub label: String,
    pub label_position: BoundingBox,
    pub words_before: Vec<String>,
    pub words_after: Vec<String>,
    /// Y coordinate of the nearest downstream field's label on the same
    /// page; the canonical stop-line for extraction of this field. `None`
    /// when this field is the last on its page.
    pub next_field_y: Option<f32>,
    /// Soft hint only, derived from the marker's bbox width.
    pub typical_length: Option<f32>,
}

/// Optional validation constraints for a field (spec §4.4's
/// `validation_rules.pattern`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldLocation {
    pub page: usize,
    pub marker_bbox: BoundingBox,
    pub context: FieldContext,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub field_name: String,
    pub pattern: Option<String>,
    pub validation_rules: Option<ValidationRules>,
    pub locations: Vec<FieldLocation>,
    /// Regexes mined from accepted rule-based extractions for this field,
    /// most effective first. Tried ahead of the fallback pattern (spec
    /// §4.4); empty until the post-processor has seen enough history.
    #[serde(default)]
    pub learned_patterns: Vec<String>,
}

impl FieldConfig {
    /// The effective pattern, preferring `validation_rules.pattern` over
    /// the bare `pattern` field, matching the Rule-Based Strategy's
    /// "adaptive default pattern policy" (spec §4.4).
    pub fn effective_pattern(&self) -> Option<&str> {
        self.validation_rules
            .as_ref()
            .and_then(|v| v.pattern.as_deref())
            .or(self.pattern.as_deref())
    }

    /// The location on a given page, if this field has one there.
    pub fn location_on_page(&self, page: usize) -> Option<&FieldLocation> {
        self.locations.iter().find(|loc| loc.page == page)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    pub fields: HashMap<String, FieldConfig>,
}

impl TemplateConfig {
    pub fn field(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.get(name)
    }
}
