//! Feature Extractor (spec §4.2).
//!
//! Every feature family below is language-agnostic — no hardcoded
//! vocabulary lists — and together they are the complete contract consumed
//! by both CRF training and inference. The field-aware family
//! ([`field_aware`]) is what lets a single model condition its output on
//! the field it is currently asked to extract; see its module doc for why
//! the training/inference asymmetry matters.

pub mod boundary;
pub mod boundary_next_field;
pub mod context;
pub mod field_aware;
pub mod lexical;
pub mod pattern;
pub mod positional;

use crate::types::{FieldContext, Word};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Bool(bool),
    Num(f64),
    Str(String),
}

impl FeatureValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Self::Num(n) => Some(*n),
            _ => None,
        }
    }
}

pub type FeatureDict = HashMap<String, FeatureValue>;

/// Builds the full feature dictionary for `page_words[idx]`.
///
/// `target_fields` is the field-name set fed to [`field_aware`]: during
/// training, every field the document has ground truth for; during
/// inference, exactly the one field the strategy is currently asked to
/// extract (spec §4.2).
pub fn extract_features(
    page_words: &[Word],
    idx: usize,
    page_width: f32,
    page_height: f32,
    context: Option<&FieldContext>,
    next_field_y: Option<f32>,
    target_fields: &[String],
) -> FeatureDict {
    let word = &page_words[idx];
    let mut dict = FeatureDict::new();

    lexical::extract_into(word, &mut dict);
    positional::extract_into(page_words, idx, page_width, page_height, &mut dict);
    boundary::extract_into(page_words, idx, &mut dict);
    pattern::extract_into(page_words, idx, &mut dict);
    if let Some(ctx) = context {
        context::extract_into(word, ctx, &mut dict);
    }
    if let Some(y) = next_field_y {
        boundary_next_field::extract_into(word, y, &mut dict);
    }
    field_aware::extract_into(target_fields, &mut dict);

    dict
}

/// Flattens a [`FeatureDict`] into the sparse `(key, weight)` pairs the CRF
/// parameterizes over: a `true` boolean fires its bare name at weight 1.0,
/// a string value fires `"{name}={value}"` at weight 1.0 (so distinct
/// string values get distinct learnable weights), and a numeric value fires
/// its bare name scaled by the value itself. `false` booleans are omitted —
/// an inactive feature contributes nothing, matching a sparse CRF's usual
/// all-zero-elsewhere convention.
pub fn flatten_features(dict: &FeatureDict) -> Vec<(String, f64)> {
    let mut flat = Vec::with_capacity(dict.len());
    for (name, value) in dict {
        match value {
            FeatureValue::Bool(true) => flat.push((name.clone(), 1.0)),
            FeatureValue::Bool(false) => {}
            FeatureValue::Str(s) => flat.push((format!("{name}={s}"), 1.0)),
            FeatureValue::Num(n) => flat.push((name.clone(), *n)),
        }
    }
    flat
}
