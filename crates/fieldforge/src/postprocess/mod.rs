//! Adaptive Post-Processor (spec §4.8): learns structural-noise patterns
//! from historical corrections, per `(template, field)`, and applies them
//! conditionally on the learned pattern's historical frequency.

pub mod apply;
pub mod catalogue;
pub mod mining;

pub use catalogue::{PatternCatalogue, StructuralPattern};

use dashmap::DashMap;

/// Registry of per-`(template_id, field_name)` catalogues, cached in
/// memory and invalidated on retrain (spec §5's "learned-pattern catalogue
/// ... updated on feedback, cached in memory, invalidated on retrain").
#[derive(Default)]
pub struct PostProcessor {
    catalogues: DashMap<(String, String), PatternCatalogue>,
    threshold: f64,
}

impl PostProcessor {
    /// `threshold` is the minimum historical frequency (spec default
    /// `0.10`) a learned pattern needs before it is applied.
    pub fn new(threshold: f64) -> Self {
        Self { catalogues: DashMap::new(), threshold }
    }

    /// Mines one `(original, corrected)` correction pair into the
    /// catalogue for `(template_id, field_name)`.
    pub fn learn(&self, template_id: &str, field_name: &str, original_value: &str, corrected_value: &str) {
        let delta = mining::mine(original_value, corrected_value);
        self.catalogues
            .entry((template_id.to_string(), field_name.to_string()))
            .or_default()
            .record(delta.as_ref());
    }

    /// Cleans `value` using whatever has been learned so far for this
    /// field; an unseen field cleans to a no-op (empty catalogue).
    pub fn clean(&self, template_id: &str, field_name: &str, value: &str) -> String {
        match self.catalogues.get(&(template_id.to_string(), field_name.to_string())) {
            Some(catalogue) => apply::apply(&catalogue, value, self.threshold),
            None => value.split_whitespace().collect::<Vec<_>>().join(" "),
        }
    }

    /// Drops every catalogue for `template_id` — called after a retrain
    /// swaps in a new model, since the learned wrapper/prefix/suffix
    /// patterns were mined against the old model's error distribution.
    pub fn invalidate(&self, template_id: &str) {
        self.catalogues.retain(|(t, _), _| t != template_id);
    }

    /// Snapshot of per-field frequent prefixes/suffixes, for diagnostics.
    pub fn learned_field_names(&self, template_id: &str) -> Vec<String> {
        self.catalogues
            .iter()
            .filter(|entry| entry.key().0 == template_id)
            .map(|entry| entry.key().1.clone())
            .collect()
    }

    /// Bulk-loads history, e.g. at startup from a persisted feedback log.
    pub fn learn_batch(&self, records: &[(String, String, String, String)]) {
        for (template_id, field_name, original, corrected) in records {
            self.learn(template_id, field_name, original, corrected);
        }
    }

    #[cfg(test)]
    fn frequent_prefixes_for(&self, template_id: &str, field_name: &str) -> Vec<String> {
        self.catalogues
            .get(&(template_id.to_string(), field_name.to_string()))
            .map(|c| c.frequent_prefixes(self.threshold))
            .unwrap_or_default()
    }
}
