//! CRF parameter estimation (spec §4.3): weighted regularized maximum
//! likelihood via L-BFGS, with gradients from forward-backward.

use super::infer::{forward_backward, marginals};
use super::model::CrfModel;
use super::optim;
use crate::config::CrfHyperparameters;
use crate::types::BioLabel;
use std::collections::HashMap;

/// One page's worth of pre-featurized training data: a word-per-position
/// feature row, its BIO gold label, and a sample weight.
///
/// `weight` is `1.0` for a sequence built from a genuine user correction and
/// `Settings.silent_acceptance_weight` (default `0.5`) for one built from an
/// uncorrected, high-confidence extraction accepted silently — the Open
/// Question (a) resolution in DESIGN.md. Lower weight keeps silent
/// acceptances from dominating the gradient relative to confirmed corrections.
#[derive(Debug, Clone)]
pub struct TrainingSequence {
    pub features: Vec<Vec<(String, f64)>>,
    pub labels: Vec<BioLabel>,
    pub weight: f64,
}

impl TrainingSequence {
    pub fn new(features: Vec<Vec<(String, f64)>>, labels: Vec<BioLabel>, weight: f64) -> Self {
        debug_assert_eq!(features.len(), labels.len());
        Self { features, labels, weight }
    }
}

pub struct CrfTrainer {
    hyperparameters: CrfHyperparameters,
}

impl CrfTrainer {
    pub fn new(hyperparameters: CrfHyperparameters) -> Self {
        Self { hyperparameters }
    }

    /// Trains a model from scratch on every sequence given.
    pub fn train(&self, sequences: &[TrainingSequence], field_names: Vec<String>) -> CrfModel {
        let labels = build_label_set(&field_names);
        let feature_index = build_feature_index(sequences);
        let num_labels = labels.len();
        let num_features = feature_index.len();
        let num_state_params = num_features * num_labels;
        let num_trans_params = num_labels * num_labels;
        let total_params = num_state_params + num_trans_params;

        let label_ids: Vec<Vec<usize>> = sequences
            .iter()
            .map(|seq| seq.labels.iter().map(|l| label_index(&labels, l)).collect())
            .collect();

        let c1 = self.hyperparameters.c1;
        let c2 = self.hyperparameters.c2;

        let objective = |w: &[f64]| -> (f64, Vec<f64>) {
            let state_weights = &w[..num_state_params];
            let trans_weights = &w[num_state_params..];

            let mut grad = vec![0.0; total_params];
            let mut nll = 0.0;

            for (seq, gold_ids) in sequences.iter().zip(&label_ids) {
                let emissions = emissions_for_weights(&seq.features, &feature_index, state_weights, num_labels);
                let model_view = WeightView { trans_weights, num_labels };
                let fb = forward_backward_view(&emissions, &model_view);

                let gold_score: f64 = (0..seq.labels.len())
                    .map(|t| emissions[t][gold_ids[t]])
                    .sum::<f64>()
                    + (1..seq.labels.len()).map(|t| trans_weights[gold_ids[t - 1] * num_labels + gold_ids[t]]).sum::<f64>();

                nll += seq.weight * (fb.log_z - gold_score);

                let marg = marginals_view(&fb);
                for (t, feats) in seq.features.iter().enumerate() {
                    for (key, value) in feats {
                        if let Some(&feat_id) = feature_index.get(key) {
                            for label_id in 0..num_labels {
                                let expected = marg[t][label_id] * value;
                                let idx = feat_id * num_labels + label_id;
                                grad[idx] += seq.weight * expected;
                            }
                            let gold_idx = feat_id * num_labels + gold_ids[t];
                            grad[gold_idx] -= seq.weight * value;
                        }
                    }
                }

                if seq.labels.len() > 1 {
                    let pair_marg = pairwise_marginals_view(&fb, &emissions, &model_view);
                    for t in 1..seq.labels.len() {
                        for prev in 0..num_labels {
                            for cur in 0..num_labels {
                                let idx = num_state_params + prev * num_labels + cur;
                                grad[idx] += seq.weight * pair_marg[t - 1][prev * num_labels + cur];
                            }
                        }
                        let gold_idx = num_state_params + gold_ids[t - 1] * num_labels + gold_ids[t];
                        grad[gold_idx] -= seq.weight;
                    }
                }
            }

            // L2 (ridge) term, smooth everywhere.
            let l2_loss: f64 = w.iter().map(|v| v * v).sum::<f64>() * 0.5 * c2;
            for (gi, wi) in grad.iter_mut().zip(w) {
                *gi += c2 * wi;
            }

            // L1 term approximated with a smooth subgradient (sign of the
            // weight); a true OWL-QN step isn't worth the complexity here
            // since c1 defaults small relative to c2.
            let l1_loss: f64 = w.iter().map(|v| v.abs()).sum::<f64>() * c1;
            for (gi, wi) in grad.iter_mut().zip(w) {
                *gi += c1 * wi.signum();
            }

            (nll + l2_loss + l1_loss, grad)
        };

        let result = optim::minimize(vec![0.0; total_params], self.hyperparameters.max_iterations, 1e-4, objective);

        let state_weights = result.weights[..num_state_params].to_vec();
        let trans_weights = result.weights[num_state_params..].to_vec();

        CrfModel { labels, field_names, feature_index, state_weights, trans_weights }
    }
}

fn build_label_set(field_names: &[String]) -> Vec<String> {
    let mut labels = vec!["O".to_string()];
    for field in field_names {
        labels.push(format!("B-{field}"));
        labels.push(format!("I-{field}"));
    }
    labels
}

fn label_index(labels: &[String], label: &BioLabel) -> usize {
    let text = label.to_string();
    labels.iter().position(|l| l == &text).unwrap_or(0)
}

fn build_feature_index(sequences: &[TrainingSequence]) -> HashMap<String, usize> {
    let mut index = HashMap::new();
    for seq in sequences {
        for row in &seq.features {
            for (key, _) in row {
                if !index.contains_key(key) {
                    let next_id = index.len();
                    index.insert(key.clone(), next_id);
                }
            }
        }
    }
    index
}

fn emissions_for_weights(
    features_seq: &[Vec<(String, f64)>],
    feature_index: &HashMap<String, usize>,
    state_weights: &[f64],
    num_labels: usize,
) -> Vec<Vec<f64>> {
    features_seq
        .iter()
        .map(|features| {
            let mut scores = vec![0.0; num_labels];
            for (key, value) in features {
                if let Some(&feat_id) = feature_index.get(key) {
                    for (label_id, score) in scores.iter_mut().enumerate() {
                        *score += state_weights[feat_id * num_labels + label_id] * value;
                    }
                }
            }
            scores
        })
        .collect()
}

/// A view over transition weights only, shaped like `CrfModel` enough to
/// reuse `infer`'s forward-backward math during training without needing a
/// fully materialized `CrfModel` (whose `state_weights` would have to be
/// copied out of the flat parameter vector on every objective call).
struct WeightView<'a> {
    trans_weights: &'a [f64],
    num_labels: usize,
}

impl WeightView<'_> {
    fn trans_weight(&self, prev: usize, cur: usize) -> f64 {
        self.trans_weights[prev * self.num_labels + cur]
    }
}

fn forward_backward_view(emissions: &[Vec<f64>], model: &WeightView<'_>) -> super::infer::ForwardBackward {
    // Re-implemented against `WeightView` rather than `CrfModel` since the
    // trainer works with a flat weight slice mid-optimization.
    let t_len = emissions.len();
    let num_labels = model.num_labels;

    let mut alpha = vec![vec![0.0; num_labels]; t_len];
    alpha[0].clone_from(&emissions[0]);
    for t in 1..t_len {
        for cur in 0..num_labels {
            let scores: Vec<f64> = (0..num_labels).map(|prev| alpha[t - 1][prev] + model.trans_weight(prev, cur)).collect();
            alpha[t][cur] = emissions[t][cur] + log_sum_exp(&scores);
        }
    }

    let mut beta = vec![vec![0.0; num_labels]; t_len];
    for t in (0..t_len.saturating_sub(1)).rev() {
        for prev in 0..num_labels {
            let scores: Vec<f64> = (0..num_labels)
                .map(|cur| model.trans_weight(prev, cur) + emissions[t + 1][cur] + beta[t + 1][cur])
                .collect();
            beta[t][prev] = log_sum_exp(&scores);
        }
    }

    let log_z = log_sum_exp(&alpha[t_len - 1]);
    super::infer::ForwardBackward { alpha, beta, log_z }
}

fn marginals_view(fb: &super::infer::ForwardBackward) -> Vec<Vec<f64>> {
    marginals(fb)
}

fn pairwise_marginals_view(fb: &super::infer::ForwardBackward, emissions: &[Vec<f64>], model: &WeightView<'_>) -> Vec<Vec<f64>> {
    let num_labels = model.num_labels;
    (1..emissions.len())
        .map(|t| {
            let mut row = vec![0.0; num_labels * num_labels];
            for prev in 0..num_labels {
                for cur in 0..num_labels {
                    let score = fb.alpha[t - 1][prev] + model.trans_weight(prev, cur) + emissions[t][cur] + fb.beta[t][cur];
                    row[prev * num_labels + cur] = (score - fb.log_z).exp();
                }
            }
            row
        })
        .collect()
}

fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    let sum: f64 = values.iter().map(|v| (v - max).exp()).sum();
    max + sum.ln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BioLabel;

    #[test]
    fn learns_to_separate_a_trivially_linearly_separable_field() {
        let sequences = vec![
            TrainingSequence::new(
                vec![vec![("is_target".to_string(), 1.0)], vec![("is_target".to_string(), 0.0)]],
                vec![BioLabel::B("NAME".into()), BioLabel::O],
                1.0,
            ),
            TrainingSequence::new(
                vec![vec![("is_target".to_string(), 0.0)], vec![("is_target".to_string(), 1.0)]],
                vec![BioLabel::O, BioLabel::B("NAME".into())],
                1.0,
            ),
        ];

        let trainer = CrfTrainer::new(CrfHyperparameters { c1: 0.01, c2: 0.01, max_iterations: 200 });
        let model = trainer.train(&sequences, vec!["NAME".to_string()]);

        let (labels, _) = super::super::infer::predict(&model, &sequences[0].features);
        assert_eq!(labels[0], BioLabel::B("NAME".into()));
    }

    #[test]
    fn silent_acceptance_weight_is_applied_without_panicking() {
        let sequences = vec![TrainingSequence::new(
            vec![vec![("x".to_string(), 1.0)]],
            vec![BioLabel::O],
            0.5,
        )];
        let trainer = CrfTrainer::new(CrfHyperparameters { c1: 0.1, c2: 0.1, max_iterations: 10 });
        let model = trainer.train(&sequences, vec!["NAME".to_string()]);
        assert_eq!(model.labels.len(), 3);
    }
}
