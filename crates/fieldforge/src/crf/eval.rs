//! Train/test evaluation for a freshly trained CRF (spec §4.3's evaluation
//! contract): an 80/20 fixed-seed split, token-level accuracy, per-label
//! precision/recall, and a training-set diversity check.

use super::infer::predict;
use super::model::CrfModel;
use super::train::{CrfTrainer, TrainingSequence};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;

const SPLIT_SEED: u64 = 42;
const TRAIN_FRACTION: f64 = 0.8;

#[derive(Debug, Clone)]
pub struct TrainMetrics {
    pub training_samples: usize,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    pub per_label_precision: HashMap<String, f64>,
    pub per_label_recall: HashMap<String, f64>,
    pub diversity_ratio: f64,
    pub diversity_warning: Option<String>,
}

/// Trains on 80% of `sequences` (fixed seed, so repeated runs over the same
/// input split identically) and evaluates on the remainder, then retrains a
/// final model on the full set for production use. Returns the full-data
/// model alongside metrics computed from the held-out split.
pub fn train_and_evaluate(
    trainer: &CrfTrainer,
    sequences: Vec<TrainingSequence>,
    field_names: Vec<String>,
    diversity_warning_threshold: f64,
) -> (CrfModel, TrainMetrics) {
    let diversity_ratio = unique_sequence_ratio(&sequences);
    let diversity_warning = if diversity_ratio < diversity_warning_threshold {
        Some(format!(
            "training set diversity ratio {diversity_ratio:.2} is below the {diversity_warning_threshold:.2} warning threshold"
        ))
    } else {
        None
    };

    let (train_seqs, test_seqs) = split(sequences.clone());
    let split_model = trainer.train(&train_seqs, field_names.clone());

    let train_accuracy = token_accuracy(&split_model, &train_seqs);
    let test_accuracy = token_accuracy(&split_model, &test_seqs);
    let (per_label_precision, per_label_recall) = per_label_prf(&split_model, &test_seqs);

    let final_model = trainer.train(&sequences, field_names);

    let metrics = TrainMetrics {
        training_samples: sequences.len(),
        train_accuracy,
        test_accuracy,
        per_label_precision,
        per_label_recall,
        diversity_ratio,
        diversity_warning,
    };

    (final_model, metrics)
}

fn split(mut sequences: Vec<TrainingSequence>) -> (Vec<TrainingSequence>, Vec<TrainingSequence>) {
    if sequences.is_empty() {
        return (Vec::new(), Vec::new());
    }
    let mut rng = StdRng::seed_from_u64(SPLIT_SEED);
    sequences.shuffle(&mut rng);
    let split_at = ((sequences.len() as f64) * TRAIN_FRACTION).round() as usize;
    let split_at = split_at.clamp(1, sequences.len());
    let test = sequences.split_off(split_at);
    (sequences, test)
}

fn token_accuracy(model: &CrfModel, sequences: &[TrainingSequence]) -> f64 {
    let mut correct = 0usize;
    let mut total = 0usize;
    for seq in sequences {
        let (predicted, _) = predict(model, &seq.features);
        for (p, g) in predicted.iter().zip(&seq.labels) {
            total += 1;
            if p == g {
                correct += 1;
            }
        }
    }
    if total == 0 {
        return 1.0;
    }
    correct as f64 / total as f64
}

fn per_label_prf(model: &CrfModel, sequences: &[TrainingSequence]) -> (HashMap<String, f64>, HashMap<String, f64>) {
    let mut true_positive: HashMap<String, usize> = HashMap::new();
    let mut predicted_count: HashMap<String, usize> = HashMap::new();
    let mut gold_count: HashMap<String, usize> = HashMap::new();

    for seq in sequences {
        let (predicted, _) = predict(model, &seq.features);
        for (p, g) in predicted.iter().zip(&seq.labels) {
            let p_text = p.to_string();
            let g_text = g.to_string();
            *predicted_count.entry(p_text.clone()).or_insert(0) += 1;
            *gold_count.entry(g_text.clone()).or_insert(0) += 1;
            if p_text == g_text {
                *true_positive.entry(p_text).or_insert(0) += 1;
            }
        }
    }

    let labels: Vec<String> = model.labels.iter().filter(|l| *l != "O").cloned().collect();
    let mut precision = HashMap::new();
    let mut recall = HashMap::new();
    for label in labels {
        let tp = *true_positive.get(&label).unwrap_or(&0) as f64;
        let predicted = *predicted_count.get(&label).unwrap_or(&0) as f64;
        let gold = *gold_count.get(&label).unwrap_or(&0) as f64;
        precision.insert(label.clone(), if predicted > 0.0 { tp / predicted } else { 0.0 });
        recall.insert(label, if gold > 0.0 { tp / gold } else { 0.0 });
    }
    (precision, recall)
}

fn unique_sequence_ratio(sequences: &[TrainingSequence]) -> f64 {
    if sequences.is_empty() {
        return 1.0;
    }
    let mut seen = std::collections::HashSet::new();
    for seq in sequences {
        let signature: String = seq.labels.iter().map(|l| l.to_string()).collect::<Vec<_>>().join(",");
        seen.insert(signature);
    }
    seen.len() as f64 / sequences.len() as f64
}
