//! Field-aware features — CRITICAL (spec §4.2).
//!
//! A boolean `target_field_{name}` feature fires for each name in the set
//! the caller supplies. During training that set is every field the
//! document has ground truth for (so the model sees every field's name on
//! every word of the sequence); during inference it is exactly the one
//! field the strategy is currently asked to extract. This asymmetry is what
//! teaches the model to condition its BIO output on the requested field —
//! without it, the model collapses to predicting the longest field's labels
//! everywhere.

use super::{FeatureDict, FeatureValue};

pub fn extract_into(target_fields: &[String], dict: &mut FeatureDict) {
    for field in target_fields {
        dict.insert(format!("target_field_{field}"), FeatureValue::Bool(true));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_named_fields_are_set() {
        let mut d = FeatureDict::new();
        extract_into(&["DATE".to_string()], &mut d);
        assert_eq!(d.get("target_field_DATE").and_then(|v| v.as_bool()), Some(true));
        assert!(d.get("target_field_NAME").is_none());
    }

    #[test]
    fn training_set_includes_every_ground_truth_field() {
        let mut d = FeatureDict::new();
        extract_into(&["DATE".to_string(), "NAME".to_string()], &mut d);
        assert_eq!(d.len(), 2);
    }
}
