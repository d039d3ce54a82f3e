//! Assembles CRF [`TrainingSequence`]s from stored documents and feedback
//! (spec §2's "prepare training sets (corrections ∪ high-confidence
//! extractions)"). One sequence per document: every field with ground
//! truth — either a correction or a silent-acceptance extraction above the
//! confidence cutoff — is labeled into the same BIO sequence, since a page
//! carries every field's words at once.

use crate::config::Settings;
use crate::crf::{label_sequence, TrainingSequence};
use crate::features::{extract_features, flatten_features};
use crate::types::{BioLabel, DocumentRecord, FeedbackRecord};
use std::collections::{HashMap, HashSet};

fn merge_labels(acc: &mut [BioLabel], fresh: &[BioLabel]) {
    for (a, f) in acc.iter_mut().zip(fresh.iter()) {
        if matches!(a, BioLabel::O) && !matches!(f, BioLabel::O) {
            *a = f.clone();
        }
    }
}

fn build_one(document: &DocumentRecord, feedback: &[&FeedbackRecord], settings: &Settings) -> Option<TrainingSequence> {
    if document.page_words.is_empty() {
        return None;
    }

    let mut labels = vec![BioLabel::O; document.page_words.len()];
    let mut target_fields = Vec::new();
    let mut has_correction = false;
    let mut corrected_fields: HashSet<&str> = HashSet::new();

    for record in feedback {
        if !record.was_correction() {
            continue;
        }
        corrected_fields.insert(record.field_name.as_str());
        let Some(field_labels) = label_sequence(&document.page_words, &record.field_name, &record.corrected_value) else {
            continue;
        };
        merge_labels(&mut labels, &field_labels);
        target_fields.push(record.field_name.clone());
        has_correction = true;
    }

    for (field_name, value) in &document.extracted_data {
        if corrected_fields.contains(field_name.as_str()) {
            continue;
        }
        let confidence = document.confidences.get(field_name).copied().unwrap_or(0.0);
        if confidence < settings.silent_acceptance_cutoff {
            continue;
        }
        let Some(field_labels) = label_sequence(&document.page_words, field_name, value) else {
            continue;
        };
        merge_labels(&mut labels, &field_labels);
        target_fields.push(field_name.clone());
    }

    if labels.iter().all(|l| matches!(l, BioLabel::O)) {
        return None;
    }

    let weight = if has_correction { 1.0 } else { settings.silent_acceptance_weight };

    let features: Vec<Vec<(String, f64)>> = (0..document.page_words.len())
        .map(|idx| {
            let dict = extract_features(
                &document.page_words,
                idx,
                document.page_width,
                document.page_height,
                None,
                None,
                &target_fields,
            );
            flatten_features(&dict)
        })
        .collect();

    Some(TrainingSequence::new(features, labels, weight))
}

/// Builds one training sequence per document that has at least one field's
/// ground truth resolvable, from `documents` (already filtered to a single
/// template by the caller) and their `feedback`.
pub fn build_training_sequences(documents: &[DocumentRecord], feedback: &[FeedbackRecord], settings: &Settings) -> Vec<TrainingSequence> {
    let mut by_document: HashMap<&str, Vec<&FeedbackRecord>> = HashMap::new();
    for record in feedback {
        by_document.entry(record.document_id.as_str()).or_default().push(record);
    }

    documents
        .iter()
        .filter_map(|document| {
            let empty = Vec::new();
            let records = by_document.get(document.document_id.as_str()).unwrap_or(&empty);
            build_one(document, records, settings)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundingBox, StrategyType, Word};
    use chrono::Utc;

    fn doc(id: &str, words: Vec<&str>, extracted: &[(&str, &str, f64)]) -> DocumentRecord {
        let page_words = words.into_iter().map(|t| Word::new(t, 0, BoundingBox::new(0.0, 0.0, 1.0, 1.0))).collect();
        let mut extracted_data = HashMap::new();
        let mut confidences = HashMap::new();
        let mut methods = HashMap::new();
        for (field, value, conf) in extracted {
            extracted_data.insert(field.to_string(), value.to_string());
            confidences.insert(field.to_string(), *conf);
            methods.insert(field.to_string(), StrategyType::RuleBased);
        }
        DocumentRecord {
            document_id: id.to_string(),
            template_id: "t1".to_string(),
            page: 0,
            page_words,
            page_width: 600.0,
            page_height: 800.0,
            extracted_data,
            confidences,
            methods,
            strategies_used: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn correction_yields_full_weight_sequence() {
        let documents = vec![doc("d1", vec!["31", "May", "2025"], &[])];
        let feedback = vec![FeedbackRecord {
            id: 1,
            document_id: "d1".to_string(),
            field_name: "date".to_string(),
            original_value: "31/05/2025".to_string(),
            corrected_value: "31 May 2025".to_string(),
            used_for_training: false,
            created_at: Utc::now(),
        }];
        let settings = Settings::default();
        let sequences = build_training_sequences(&documents, &feedback, &settings);
        assert_eq!(sequences.len(), 1);
        assert_eq!(sequences[0].weight, 1.0);
        assert_eq!(sequences[0].labels[0], BioLabel::B("date".into()));
    }

    #[test]
    fn silent_acceptance_above_cutoff_yields_discounted_weight() {
        let documents = vec![doc("d1", vec!["31", "May", "2025"], &[("date", "31 May 2025", 0.9)])];
        let settings = Settings::default();
        let sequences = build_training_sequences(&documents, &[], &settings);
        assert_eq!(sequences.len(), 1);
        assert_eq!(sequences[0].weight, settings.silent_acceptance_weight);
    }

    #[test]
    fn silent_acceptance_below_cutoff_is_skipped() {
        let documents = vec![doc("d1", vec!["31", "May", "2025"], &[("date", "31 May 2025", 0.2)])];
        let settings = Settings::default();
        let sequences = build_training_sequences(&documents, &[], &settings);
        assert!(sequences.is_empty());
    }

    #[test]
    fn document_with_no_resolvable_ground_truth_is_dropped() {
        let documents = vec![doc("d1", vec!["hello", "world"], &[])];
        let sequences = build_training_sequences(&documents, &[], &Settings::default());
        assert!(sequences.is_empty());
    }

    #[test]
    fn multiple_fields_merge_into_one_sequence_without_clobbering() {
        let documents = vec![doc("d1", vec!["John", "Doe", "31", "May"], &[("date", "31 May", 0.9)])];
        let feedback = vec![FeedbackRecord {
            id: 1,
            document_id: "d1".to_string(),
            field_name: "name".to_string(),
            original_value: "J. Doe".to_string(),
            corrected_value: "John Doe".to_string(),
            used_for_training: false,
            created_at: Utc::now(),
        }];
        let sequences = build_training_sequences(&documents, &feedback, &Settings::default());
        assert_eq!(sequences.len(), 1);
        assert_eq!(sequences[0].labels[0], BioLabel::B("name".into()));
        assert_eq!(sequences[0].labels[2], BioLabel::B("date".into()));
    }
}
