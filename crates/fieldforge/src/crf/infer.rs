//! Forward-backward inference and Viterbi decoding for the linear-chain
//! CRF (spec §4.3's inference contract).

use super::model::CrfModel;
use crate::types::BioLabel;

fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    let sum: f64 = values.iter().map(|v| (v - max).exp()).sum();
    max + sum.ln()
}

/// Forward (`alpha`) and backward (`beta`) log-space lattices for one
/// sequence, plus the log partition function `log_z`.
pub struct ForwardBackward {
    pub alpha: Vec<Vec<f64>>,
    pub beta: Vec<Vec<f64>>,
    pub log_z: f64,
}

/// Runs forward-backward over a sequence of per-position emission scores
/// (`emissions[t][label_id]`).
pub fn forward_backward(emissions: &[Vec<f64>], model: &CrfModel) -> ForwardBackward {
    let t_len = emissions.len();
    let num_labels = model.num_labels();

    let mut alpha = vec![vec![0.0; num_labels]; t_len];
    alpha[0].clone_from(&emissions[0]);
    for t in 1..t_len {
        for cur in 0..num_labels {
            let scores: Vec<f64> = (0..num_labels).map(|prev| alpha[t - 1][prev] + model.trans_weight(prev, cur)).collect();
            alpha[t][cur] = emissions[t][cur] + log_sum_exp(&scores);
        }
    }

    let mut beta = vec![vec![0.0; num_labels]; t_len];
    for t in (0..t_len - 1).rev() {
        for prev in 0..num_labels {
            let scores: Vec<f64> = (0..num_labels)
                .map(|cur| model.trans_weight(prev, cur) + emissions[t + 1][cur] + beta[t + 1][cur])
                .collect();
            beta[t][prev] = log_sum_exp(&scores);
        }
    }

    let log_z = log_sum_exp(&alpha[t_len - 1]);
    ForwardBackward { alpha, beta, log_z }
}

/// Marginal label probability at every position: `marginals[t][label_id]`.
pub fn marginals(fb: &ForwardBackward) -> Vec<Vec<f64>> {
    fb.alpha
        .iter()
        .zip(&fb.beta)
        .map(|(a, b)| a.iter().zip(b).map(|(ai, bi)| (ai + bi - fb.log_z).exp()).collect())
        .collect()
}

/// Viterbi-decodes the single best label sequence.
pub fn viterbi_decode(emissions: &[Vec<f64>], model: &CrfModel) -> Vec<usize> {
    let t_len = emissions.len();
    let num_labels = model.num_labels();
    if t_len == 0 {
        return Vec::new();
    }

    let mut score = vec![vec![f64::NEG_INFINITY; num_labels]; t_len];
    let mut backptr = vec![vec![0usize; num_labels]; t_len];
    score[0].clone_from(&emissions[0]);

    for t in 1..t_len {
        for cur in 0..num_labels {
            let mut best_prev = 0;
            let mut best_score = f64::NEG_INFINITY;
            for prev in 0..num_labels {
                let candidate = score[t - 1][prev] + model.trans_weight(prev, cur);
                if candidate > best_score {
                    best_score = candidate;
                    best_prev = prev;
                }
            }
            score[t][cur] = best_score + emissions[t][cur];
            backptr[t][cur] = best_prev;
        }
    }

    let mut last = 0;
    let mut best_final = f64::NEG_INFINITY;
    for (label, &s) in score[t_len - 1].iter().enumerate() {
        if s > best_final {
            best_final = s;
            last = label;
        }
    }

    let mut path = vec![0usize; t_len];
    path[t_len - 1] = last;
    for t in (0..t_len - 1).rev() {
        path[t] = backptr[t + 1][path[t + 1]];
    }
    path
}

/// Computes per-word emission scores from pre-featurized rows.
pub fn emissions_for_sequence(model: &CrfModel, features_seq: &[Vec<(String, f64)>]) -> Vec<Vec<f64>> {
    features_seq.iter().map(|features| model.emission_scores(features)).collect()
}

/// Predicts BIO labels for one sequence, plus the marginal probability the
/// model assigned to each predicted label (used to compute a span's
/// confidence as their arithmetic mean, spec §4.3).
pub fn predict(model: &CrfModel, features_seq: &[Vec<(String, f64)>]) -> (Vec<BioLabel>, Vec<f64>) {
    if features_seq.is_empty() {
        return (Vec::new(), Vec::new());
    }
    let emissions = emissions_for_sequence(model, features_seq);
    let path = viterbi_decode(&emissions, model);
    let fb = forward_backward(&emissions, model);
    let marginal_table = marginals(&fb);

    let labels: Vec<BioLabel> = path.iter().map(|&id| BioLabel::parse(&model.labels[id]).unwrap_or(BioLabel::O)).collect();
    let confidences: Vec<f64> = path.iter().zip(&marginal_table).map(|(&id, row)| row[id]).collect();
    (labels, confidences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn tiny_model() -> CrfModel {
        // Two labels, O and B-X, one feature "present".
        let labels = vec!["O".to_string(), "B-X".to_string()];
        let mut feature_index = HashMap::new();
        feature_index.insert("present".to_string(), 0usize);
        // Favor B-X when "present" fires.
        let state_weights = vec![0.0, 2.0];
        let trans_weights = vec![0.0, 0.0, 0.0, 0.0];
        CrfModel { labels, field_names: vec!["X".into()], feature_index, state_weights, trans_weights }
    }

    #[test]
    fn viterbi_prefers_high_emission_label() {
        let model = tiny_model();
        let features_seq = vec![vec![("present".to_string(), 1.0)]];
        let emissions = emissions_for_sequence(&model, &features_seq);
        let path = viterbi_decode(&emissions, &model);
        assert_eq!(path, vec![1]);
    }

    #[test]
    fn marginals_sum_to_one_per_position() {
        let model = tiny_model();
        let features_seq = vec![vec![("present".to_string(), 1.0)], vec![]];
        let emissions = emissions_for_sequence(&model, &features_seq);
        let fb = forward_backward(&emissions, &model);
        let m = marginals(&fb);
        for row in &m {
            let sum: f64 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-6);
        }
    }
}
