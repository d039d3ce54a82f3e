//! Context-relative features: computed when a context for this word's
//! intended field is known (spec §4.2).

use super::{FeatureDict, FeatureValue};
use crate::types::{FieldContext, Word};

/// Words within this many units of `Δy` from the label are "on the same
/// line" as it, per spec's `same_line_as_label`.
const SAME_LINE_Y: f32 = 10.0;
/// `near_label` threshold; spec leaves the exact band unspecified beyond
/// "near" — we use the same ±10 unit scale as the other line-level checks.
const NEAR_LABEL_DISTANCE: f32 = 50.0;

pub fn extract_into(word: &Word, context: &FieldContext, dict: &mut FeatureDict) {
    let has_label = !context.label.is_empty();
    dict.insert("has_label".into(), FeatureValue::Bool(has_label));
    dict.insert("label_text".into(), FeatureValue::Str(context.label.clone()));

    let label = &context.label_position;
    let dx = word.x0() - label.x0;
    let dy = word.y0() - label.y0;

    dict.insert("distance_from_label_x".into(), FeatureValue::Num(dx as f64));
    dict.insert("distance_from_label_y".into(), FeatureValue::Num((dy / 100.0) as f64));

    let after_label = word.x0() > label.x0;
    let above_label = word.y0() < label.y0;
    let below_label = word.y0() > label.y0;
    let same_line_as_label = dy.abs() < SAME_LINE_Y;
    let near_label = (dx * dx + dy * dy).sqrt() < NEAR_LABEL_DISTANCE;

    dict.insert("after_label".into(), FeatureValue::Bool(after_label));
    dict.insert("before_label".into(), FeatureValue::Bool(!after_label));
    dict.insert("above_label".into(), FeatureValue::Bool(above_label));
    dict.insert("below_label".into(), FeatureValue::Bool(below_label));
    dict.insert("same_line_as_label".into(), FeatureValue::Bool(same_line_as_label));
    dict.insert("near_label".into(), FeatureValue::Bool(near_label));
    dict.insert("valid_position".into(), FeatureValue::Bool(after_label && same_line_as_label));
}
