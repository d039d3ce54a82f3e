//! Hybrid Arbiter (spec §4.7): runs every enabled strategy for a field
//! unconditionally, scores the accepted candidates with adaptive weights,
//! and applies a confidence override before returning the winner with full
//! provenance.

pub mod performance;
pub mod scoring;

pub use performance::PerformanceTracker;

use crate::config::Settings;
use crate::crf::CrfModel;
use crate::strategies::{enabled_strategies, PageContext, Strategy};
use crate::types::{FieldConfig, FieldLocation, FieldValue, StrategyAttempt, StrategyType, TemplateConfig};
use std::collections::HashMap;
use tracing::warn;

pub struct HybridArbiter<'a> {
    settings: &'a Settings,
    performance: &'a PerformanceTracker,
}

impl<'a> HybridArbiter<'a> {
    pub fn new(settings: &'a Settings, performance: &'a PerformanceTracker) -> Self {
        Self { settings, performance }
    }

    /// The margin a challenger's confidence must clear the winner's by to
    /// flip the decision (spec §4.7's confidence override, widened per the
    /// field's own historical accuracy spread across strategies — DESIGN.md
    /// Open Question (b)).
    fn override_margin(&self, template_id: &str, field_name: &str) -> f64 {
        let base = self.settings.confidence_override_margin;
        let factor = self.settings.confidence_override_variance_factor;
        if factor == 0.0 {
            return base;
        }
        let accuracies: Vec<f64> =
            self.performance.snapshot_all_for_field(template_id, field_name).iter().map(|p| p.accuracy).collect();
        if accuracies.len() < 2 {
            return base;
        }
        let mean = accuracies.iter().sum::<f64>() / accuracies.len() as f64;
        let variance = accuracies.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / accuracies.len() as f64;
        base * (1.0 + factor * variance)
    }

    fn strategy_weight(&self, strategy: StrategyType, template: &TemplateConfig, template_id: &str) -> f64 {
        match strategy {
            StrategyType::Crf => {
                let avg_acc = self.performance.avg_crf_accuracy(template_id);
                scoring::crf_strategy_weight(avg_acc, template.fields.len())
            }
            _ => scoring::DEFAULT_STRATEGY_WEIGHT,
        }
    }

    /// Runs every eligible strategy for one field, scores and arbitrates,
    /// and returns the winner (or `None` if nothing cleared its threshold).
    /// The returned `FieldValue.metadata.all_strategies_attempted` always
    /// contains one entry per strategy actually invoked (spec §4.7, §8),
    /// including when only one strategy succeeded.
    pub fn extract_field(
        &self,
        template_id: &str,
        template: &TemplateConfig,
        page: &PageContext<'_>,
        field: &FieldConfig,
        location: &FieldLocation,
        model: Option<&CrfModel>,
    ) -> Option<FieldValue> {
        let strategies = enabled_strategies(model);
        let mut attempted: HashMap<StrategyType, StrategyAttempt> = HashMap::new();
        let mut candidates: Vec<(StrategyType, FieldValue, f64)> = Vec::new();

        for strategy in &strategies {
            let kind = strategy.strategy_type();
            match strategy.extract(page, field, location) {
                Ok(Some(value)) => {
                    let snapshot = self.performance.snapshot(template_id, &field.field_name, kind);
                    let h_acc = snapshot.as_ref().map(|p| p.accuracy).unwrap_or(0.0);
                    let h_att = snapshot.as_ref().map(|p| p.total_extractions).unwrap_or(0);

                    let threshold = scoring::acceptance_threshold(h_att, h_acc);
                    if value.confidence < threshold {
                        attempted.insert(kind, StrategyAttempt::failure());
                        continue;
                    }

                    attempted.insert(kind, StrategyAttempt::success(value.confidence, value.value.clone()));
                    let weights = scoring::scoring_weights(h_att);
                    let strategy_weight = self.strategy_weight(kind, template, template_id);
                    let combined = scoring::combined_score(weights, value.confidence, strategy_weight, h_acc);
                    candidates.push((kind, value, combined));
                }
                Ok(None) => {
                    attempted.insert(kind, StrategyAttempt::failure());
                }
                Err(e) => {
                    warn!(field = %field.field_name, strategy = %kind, error = %e, "strategy exception during extraction");
                    attempted.insert(kind, StrategyAttempt::errored(e.to_string()));
                }
            }
        }

        let winner_idx = candidates
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.2.partial_cmp(&b.2).unwrap())
            .map(|(idx, _)| idx)?;

        let margin = self.override_margin(template_id, &field.field_name);
        let winner_confidence = candidates[winner_idx].1.confidence;
        let override_idx = candidates
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != winner_idx)
            .find(|(_, (_, value, _))| value.confidence > winner_confidence + margin)
            .map(|(idx, _)| idx);

        let final_idx = override_idx.unwrap_or(winner_idx);
        let (winning_strategy, mut winning_value, _) = candidates.into_iter().nth(final_idx).unwrap();

        winning_value.metadata.all_strategies_attempted = attempted;
        winning_value.metadata.selected_by = winning_strategy.canonical_str().to_string();
        Some(winning_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::PageContext;
    use crate::types::{BoundingBox, FieldContext, Word};

    fn location() -> FieldLocation {
        FieldLocation {
            page: 0,
            marker_bbox: BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            context: FieldContext {
                label: "Date:".into(),
                label_position: BoundingBox::new(0.0, 0.0, 1.0, 1.0),
                words_before: vec![],
                words_after: vec![],
                next_field_y: None,
                typical_length: None,
            },
        }
    }

    #[test]
    fn all_strategies_attempted_is_recorded_even_with_a_single_success() {
        // Mirrors spec §8 scenario 6: only rule-based succeeds, but the
        // winner's metadata still names all three strategies.
        let settings = Settings::default();
        let tracker = PerformanceTracker::new();
        let arbiter = HybridArbiter::new(&settings, &tracker);

        let words = vec![Word::new("31 May 2025", 0, BoundingBox::new(0.0, 0.0, 1.0, 1.0))];
        let page = PageContext { words: &words, page_width: 600.0, page_height: 800.0 };
        let field = FieldConfig { field_name: "date".into(), ..Default::default() };
        let template = TemplateConfig { fields: [("date".to_string(), field.clone())].into_iter().collect() };
        let loc = location();

        // No CRF model is supplied, so only rule-based and position-based
        // run; the assertion below is about provenance completeness for
        // whichever strategies were actually invoked, not which one wins.
        let result = arbiter.extract_field("t1", &template, &page, &field, &loc, None);
        let value = result.expect("rule/position should find something in a bare word list");
        assert_eq!(value.metadata.all_strategies_attempted.len(), 2);
    }
}
