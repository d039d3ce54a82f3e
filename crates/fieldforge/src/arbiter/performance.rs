//! Strategy-Performance Tracker (spec §2, §3): per-`(template, field,
//! strategy)` running accuracy, read-snapshotted once per field by the
//! arbiter and written only from the feedback path (spec §9's "cyclic graph
//! avoidance" — extraction must never be influenced by its own output
//! within a single request).

use crate::types::{StrategyPerformance, StrategyType};
use dashmap::DashMap;

#[derive(Default)]
pub struct PerformanceTracker {
    rows: DashMap<(String, String, StrategyType), StrategyPerformance>,
}

impl PerformanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single read, taken once per field per arbiter pass — never
    /// re-read mid-request, so extraction cannot feed back on itself.
    pub fn snapshot(&self, template_id: &str, field_name: &str, strategy: StrategyType) -> Option<StrategyPerformance> {
        self.rows.get(&(template_id.to_string(), field_name.to_string(), strategy)).map(|r| r.clone())
    }

    pub fn snapshot_all_for_field(&self, template_id: &str, field_name: &str) -> Vec<StrategyPerformance> {
        StrategyType::ALL.iter().filter_map(|&s| self.snapshot(template_id, field_name, s)).collect()
    }

    /// Records one more (template, field, strategy) observation. Called
    /// only from the feedback path (spec §4.7's "Learning from
    /// corrections"), never from extraction.
    pub fn record(&self, template_id: &str, field_name: &str, strategy: StrategyType, was_correct: bool) {
        let mut entry = self
            .rows
            .entry((template_id.to_string(), field_name.to_string(), strategy))
            .or_insert_with(|| StrategyPerformance::new(template_id, field_name, strategy));
        entry.record(was_correct);
    }

    /// Average CRF accuracy across every field the tracker has seen for
    /// this template, used by the CRF strategy-weight formula (spec §4.7).
    pub fn avg_crf_accuracy(&self, template_id: &str) -> f64 {
        let accuracies: Vec<f64> = self
            .rows
            .iter()
            .filter(|entry| entry.key().0 == template_id && entry.key().2 == StrategyType::Crf)
            .map(|entry| entry.value().accuracy)
            .collect();
        if accuracies.is_empty() {
            0.0
        } else {
            accuracies.iter().sum::<f64>() / accuracies.len() as f64
        }
    }
}
