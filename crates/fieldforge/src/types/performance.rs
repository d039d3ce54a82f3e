//! Per-(template, field, strategy) running accuracy (spec §3).

use super::strategy::StrategyType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyPerformance {
    pub template_id: String,
    /// Never null: rows with unknown field identity are discarded before
    /// insertion, not stored with a null key (spec §3, §7).
    pub field_name: String,
    pub strategy_type: StrategyType,
    pub total_extractions: u64,
    pub correct_extractions: u64,
    pub accuracy: f64,
    pub last_updated: DateTime<Utc>,
}

impl StrategyPerformance {
    pub fn new(template_id: impl Into<String>, field_name: impl Into<String>, strategy_type: StrategyType) -> Self {
        Self {
            template_id: template_id.into(),
            field_name: field_name.into(),
            strategy_type,
            total_extractions: 0,
            correct_extractions: 0,
            accuracy: 0.0,
            last_updated: Utc::now(),
        }
    }

    /// Records one more attempt and recomputes accuracy. Idempotent shape:
    /// calling this twice with the same observation just double-counts,
    /// replay-safety is the caller's responsibility (spec §5).
    pub fn record(&mut self, was_correct: bool) {
        self.total_extractions += 1;
        if was_correct {
            self.correct_extractions += 1;
        }
        self.accuracy = self.correct_extractions as f64 / self.total_extractions as f64;
        self.last_updated = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_tracks_ratio() {
        let mut p = StrategyPerformance::new("t1", "recipient_name", StrategyType::Crf);
        p.record(true);
        p.record(true);
        p.record(false);
        assert_eq!(p.total_extractions, 3);
        assert_eq!(p.correct_extractions, 2);
        assert!((p.accuracy - 2.0 / 3.0).abs() < 1e-9);
    }
}
