//! Boundary-from-next-field features, active only when `next_field_y` is
//! known (spec §4.2) — the primary signal that teaches the CRF the hard
//! stop-line a field's extraction may not cross.

use super::{FeatureDict, FeatureValue};
use crate::types::Word;

const NEAR_THRESHOLD: f32 = 20.0;
const FAR_THRESHOLD: f32 = 50.0;

pub fn extract_into(word: &Word, next_field_y: f32, dict: &mut FeatureDict) {
    let delta = next_field_y - word.y0();

    dict.insert("has_next_field".into(), FeatureValue::Bool(true));
    dict.insert("distance_to_next_field".into(), FeatureValue::Num((delta / 100.0) as f64));
    dict.insert("before_next_field".into(), FeatureValue::Bool(word.y0() < next_field_y));
    dict.insert("near_next_field".into(), FeatureValue::Bool(delta > 0.0 && delta < NEAR_THRESHOLD));
    dict.insert("far_from_next_field".into(), FeatureValue::Bool(delta > FAR_THRESHOLD));
}
