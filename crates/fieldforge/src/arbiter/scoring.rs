//! Pure scoring functions for the Hybrid Arbiter (spec §4.7): the adaptive
//! acceptance threshold, the adaptive scoring weights, and the adaptive CRF
//! strategy weight. Kept side-effect free and unit-testable against the
//! exact numbers spec §8's scenario 2 names.

/// Minimum confidence a candidate needs to be accepted at all, scaled by
/// how much history this `(template, field, strategy)` combination has.
pub fn acceptance_threshold(h_att: u64, h_acc: f64) -> f64 {
    if h_att >= 10 && h_acc >= 0.7 {
        0.3
    } else if h_att >= 5 && h_acc >= 0.5 {
        0.4
    } else {
        0.5
    }
}

/// `(w_conf, w_strat, w_perf)` for the combined-score formula, by data
/// maturity (spec §4.7's table).
pub fn scoring_weights(h_att: u64) -> (f64, f64, f64) {
    if h_att >= 10 {
        (0.20, 0.10, 0.70)
    } else if h_att >= 5 {
        (0.25, 0.15, 0.60)
    } else {
        (0.40, 0.30, 0.30)
    }
}

/// `combined = w_conf*confidence + w_strat*strategy_weight + w_perf*h_acc`.
pub fn combined_score(weights: (f64, f64, f64), confidence: f64, strategy_weight: f64, h_acc: f64) -> f64 {
    let (w_conf, w_strat, w_perf) = weights;
    w_conf * confidence + w_strat * strategy_weight + w_perf * h_acc
}

/// The CRF strategy's per-template adaptive weight (spec §4.7):
/// `clamp(0.3 + 0.6*avg_CRF_acc_over_fields, 0.3, 0.9)` blended with a
/// neutral `0.5` by a confidence factor `min(1, num_fields/10)`. Rule and
/// position strategies use a flat `0.5` (spec §4.7).
pub fn crf_strategy_weight(avg_crf_accuracy: f64, num_fields: usize) -> f64 {
    let adaptive = (0.3 + 0.6 * avg_crf_accuracy).clamp(0.3, 0.9);
    let confidence_factor = (num_fields as f64 / 10.0).min(1.0);
    adaptive * confidence_factor + 0.5 * (1.0 - confidence_factor)
}

pub const DEFAULT_STRATEGY_WEIGHT: f64 = 0.5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acceptance_threshold_matches_spec_table() {
        assert_eq!(acceptance_threshold(10, 0.7), 0.3);
        assert_eq!(acceptance_threshold(25, 0.76), 0.3);
        assert_eq!(acceptance_threshold(5, 0.5), 0.4);
        assert_eq!(acceptance_threshold(2, 0.9), 0.5);
    }

    #[test]
    fn scoring_weights_match_spec_table() {
        assert_eq!(scoring_weights(10), (0.20, 0.10, 0.70));
        assert_eq!(scoring_weights(7), (0.25, 0.15, 0.60));
        assert_eq!(scoring_weights(1), (0.40, 0.30, 0.30));
    }

    #[test]
    fn combined_score_matches_spec_scenario_2_when_weights_are_given() {
        // spec §8 scenario 2: h_att(crf)=25, h_acc=0.76, confidence=0.85
        // against h_att(rule)=150, h_acc=0.0, confidence=0.95, with the
        // documented weights 0.2/0.1/0.7 both sides.
        let weights = scoring_weights(25);
        let crf_score = combined_score(weights, 0.85, 0.8, 0.76);
        let rule_score = combined_score(weights, 0.95, 0.4, 0.0);
        assert!(crf_score > rule_score);
    }

    #[test]
    fn crf_strategy_weight_is_neutral_with_no_history() {
        assert_eq!(crf_strategy_weight(0.0, 0), 0.5);
    }

    #[test]
    fn crf_strategy_weight_rises_toward_adaptive_value_as_fields_accumulate() {
        let partial = crf_strategy_weight(0.8, 5);
        let full = crf_strategy_weight(0.8, 10);
        assert!(partial > 0.5 && partial < full);
        assert!((full - 0.78).abs() < 1e-9);
    }
}
