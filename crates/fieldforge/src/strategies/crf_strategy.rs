//! CRF Strategy (spec §4.6): run inference for one target field, pick the
//! longest predicted span, then apply the two adaptive cleaning rules.

use super::diagnostics::log_no_value;
use super::{PageContext, Strategy};
use crate::crf::{infer, CrfModel};
use crate::features::{extract_features, flatten_features};
use crate::types::{BioLabel, FieldConfig, FieldLocation, FieldValue, StrategyType, Word};
use crate::Result;
use std::collections::HashMap;

pub struct CrfStrategy<'a> {
    model: &'a CrfModel,
}

impl<'a> CrfStrategy<'a> {
    pub fn new(model: &'a CrfModel) -> Self {
        Self { model }
    }
}

/// Maximal contiguous `B-F I-F …` spans as `(start, end_exclusive)`.
fn contiguous_spans(labels: &[BioLabel], field: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut i = 0;
    while i < labels.len() {
        if labels[i].is_begin_of(field) {
            let start = i;
            let mut end = i + 1;
            while end < labels.len() && labels[end].is_inside_of(field) {
                end += 1;
            }
            spans.push((start, end));
            i = end;
        } else {
            i += 1;
        }
    }
    spans
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl Strategy for CrfStrategy<'_> {
    fn strategy_type(&self) -> StrategyType {
        StrategyType::Crf
    }

    fn extract(&self, page: &PageContext<'_>, field: &FieldConfig, location: &FieldLocation) -> Result<Option<FieldValue>> {
        let page_words: Vec<Word> = page.words.iter().filter(|w| w.page_index == location.page).cloned().collect();
        if page_words.is_empty() {
            log_no_value(StrategyType::Crf, &field.field_name, "no words on page", "");
            return Ok(None);
        }

        let target_fields = vec![field.field_name.clone()];
        let features_seq: Vec<Vec<(String, f64)>> = (0..page_words.len())
            .map(|idx| {
                let dict = extract_features(
                    &page_words,
                    idx,
                    page.page_width,
                    page.page_height,
                    Some(&location.context),
                    location.context.next_field_y,
                    &target_fields,
                );
                flatten_features(&dict)
            })
            .collect();

        let (labels, confidences) = infer::predict(self.model, &features_seq);
        let spans = contiguous_spans(&labels, &field.field_name);

        let best = spans.into_iter().max_by(|a, b| {
            let len_a = a.1 - a.0;
            let len_b = b.1 - b.0;
            let mean_a = mean(&confidences[a.0..a.1]);
            let mean_b = mean(&confidences[b.0..b.1]);
            len_a.cmp(&len_b).then(mean_a.partial_cmp(&mean_b).unwrap())
        });

        let Some((start, end)) = best else {
            let mut kind_counts: HashMap<String, usize> = HashMap::new();
            for label in &labels {
                *kind_counts.entry(label.to_string()).or_insert(0) += 1;
            }
            let mentions_field = labels.iter().any(|l| l.field() == Some(field.field_name.as_str()));
            let sample: Vec<String> = labels.iter().take(10).map(|l| l.to_string()).collect();
            log_no_value(
                StrategyType::Crf,
                &field.field_name,
                "no predicted span",
                &format!("kind_counts={kind_counts:?} mentions_field={mentions_field} sample={sample:?}"),
            );
            return Ok(None);
        };

        let mean_marginal = mean(&confidences[start..end]);
        let next_field_y = location.context.next_field_y;

        let mut bounded_words = Vec::new();
        for idx in start..end {
            if let Some(y) = next_field_y {
                if page_words[idx].y0() >= y {
                    break;
                }
            }
            bounded_words.push(page_words[idx].text.as_str());
        }
        if bounded_words.is_empty() {
            return Ok(None);
        }

        let mut value = bounded_words.join(" ");
        let label_text = location.context.label.trim();
        if !label_text.is_empty() {
            if let Some(pos) = value.find(label_text) {
                value = value[pos + label_text.len()..].trim().to_string();
            }
        }
        if value.is_empty() {
            return Ok(None);
        }

        Ok(Some(FieldValue::new(value, mean_marginal, StrategyType::Crf)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    fn model_favoring_span() -> CrfModel {
        let labels = vec!["O".to_string(), "B-EVENT_NAME".to_string(), "I-EVENT_NAME".to_string()];
        let mut feature_index = HashMap::new();
        feature_index.insert("target_field_EVENT_NAME".to_string(), 0usize);
        feature_index.insert("word_is_title".to_string(), 1usize);

        let num_labels = labels.len();
        let mut state_weights = vec![0.0; feature_index.len() * num_labels];
        // Favor B/I-EVENT_NAME whenever the field-aware feature fires.
        state_weights[0 * num_labels + 1] = 2.0;
        state_weights[0 * num_labels + 2] = 2.0;
        let trans_weights = vec![0.0; num_labels * num_labels];

        CrfModel { labels, field_names: vec!["EVENT_NAME".into()], feature_index, state_weights, trans_weights }
    }

    #[test]
    fn extracts_the_longest_predicted_span() {
        let words = vec![
            Word::new("dalam", 0, BoundingBox::new(0.0, 200.0, 20.0, 210.0)),
            Word::new("kegiatan", 0, BoundingBox::new(22.0, 200.0, 50.0, 210.0)),
            Word::new("Training", 0, BoundingBox::new(52.0, 200.0, 80.0, 210.0)),
        ];
        let page = PageContext { words: &words, page_width: 600.0, page_height: 800.0 };
        let field = FieldConfig { field_name: "EVENT_NAME".into(), ..Default::default() };
        let location = FieldLocation {
            page: 0,
            marker_bbox: BoundingBox::new(52.0, 200.0, 80.0, 210.0),
            context: crate::types::FieldContext {
                label: "di".into(),
                label_position: BoundingBox::new(0.0, 200.0, 20.0, 210.0),
                words_before: vec![],
                words_after: vec![],
                next_field_y: None,
                typical_length: None,
            },
        };

        let model = model_favoring_span();
        let strategy = CrfStrategy::new(&model);
        let result = strategy.extract(&page, &field, &location);
        assert!(result.unwrap().is_some());
    }
}
