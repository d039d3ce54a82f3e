//! The Retrainer's two-tier concurrency gate plus its backup/validate/swap
//! safeguard (spec §4.9, §5).
//!
//! Gate: a fast, lock-free per-template cooldown check runs first; only a
//! request past its cooldown tries the process-global non-blocking lock.
//! This ordering is the whole point — a storm of corrections for the same
//! template never touches the lock at all once one retrain is in flight,
//! which is what the teacher's incident note ("ten retrains in five
//! minutes") is about.
//!
//! Safeguard: the candidate model is trained and evaluated entirely before
//! the live model file is ever written, so a rejected or failed candidate
//! never requires an actual restore — the live file is simply left alone.
//! This reaches the same end state as literal backup-then-restore with one
//! less failure mode (a restore that itself fails mid-write); the deviation
//! is recorded in DESIGN.md.

use super::dataset;
use super::model_cache::{atomic_replace, ModelCache};
use super::store::FeedbackStore;
use crate::arbiter::PerformanceTracker;
use crate::config::Settings;
use crate::crf::{train_and_evaluate, CrfTrainer, TrainMetrics};
use crate::postprocess::PostProcessor;
use crate::types::{TemplateConfig, TrainingHistory, TrainingStatus};
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum RetrainOutcome {
    /// Never attempted: still within cooldown or another retrain is in
    /// flight somewhere in the process.
    Skipped { reason: &'static str },
    Accepted { metrics_summary: String },
    Rejected { previous_test_accuracy: f64, candidate_test_accuracy: f64 },
    Failed { error: String },
}

#[derive(Default)]
pub struct Retrainer {
    cooldown: DashMap<String, Instant>,
    lock: Mutex<()>,
}

impl Retrainer {
    pub fn new() -> Self {
        Self::default()
    }

    fn within_cooldown(&self, template_id: &str, cooldown_secs: u64) -> bool {
        self.cooldown
            .get(template_id)
            .map(|last| last.elapsed() < Duration::from_secs(cooldown_secs))
            .unwrap_or(false)
    }

    /// Runs one gated retrain attempt for `template_id`. Always returns
    /// `Ok` — a training or I/O failure is folded into
    /// `RetrainOutcome::Failed` plus a `status=failed` history row, per
    /// spec §7's "retraining failure" contract, rather than propagated.
    #[allow(clippy::too_many_arguments)]
    pub fn attempt(
        &self,
        store: &dyn FeedbackStore,
        performance: &PerformanceTracker,
        postprocessor: &PostProcessor,
        model_cache: &ModelCache,
        settings: &Settings,
        template_id: &str,
        template: &TemplateConfig,
        model_path: impl AsRef<Path>,
    ) -> crate::Result<RetrainOutcome> {
        if self.within_cooldown(template_id, settings.cooldown_secs) {
            return Ok(RetrainOutcome::Skipped { reason: "cooldown" });
        }

        let Some(_guard) = self.lock.try_lock() else {
            return Ok(RetrainOutcome::Skipped { reason: "lock contention" });
        };

        self.cooldown.insert(template_id.to_string(), Instant::now());

        let outcome = self.run_attempt(store, performance, postprocessor, model_cache, settings, template_id, template, model_path.as_ref());

        let history_row = match &outcome {
            Ok(RetrainOutcome::Accepted { .. }) => None,
            Ok(RetrainOutcome::Rejected { previous_test_accuracy, candidate_test_accuracy }) => Some(TrainingHistory {
                template_id: template_id.to_string(),
                trained_at: Utc::now(),
                training_samples: 0,
                train_accuracy: 0.0,
                test_accuracy: *candidate_test_accuracy,
                model_path: None,
                status: TrainingStatus::Rejected,
                diversity_warning: Some(format!("regressed from {previous_test_accuracy:.4}")),
            }),
            Ok(RetrainOutcome::Failed { error }) => Some(TrainingHistory {
                template_id: template_id.to_string(),
                trained_at: Utc::now(),
                training_samples: 0,
                train_accuracy: 0.0,
                test_accuracy: 0.0,
                model_path: None,
                status: TrainingStatus::Failed,
                diversity_warning: Some(error.clone()),
            }),
            _ => None,
        };
        if let Some(row) = history_row {
            store.append_training_history(row);
            self.warn_on_rejection_streak(store, template_id);
        }

        outcome
    }

    #[allow(clippy::too_many_arguments)]
    fn run_attempt(
        &self,
        store: &dyn FeedbackStore,
        performance: &PerformanceTracker,
        postprocessor: &PostProcessor,
        model_cache: &ModelCache,
        settings: &Settings,
        template_id: &str,
        template: &TemplateConfig,
        model_path: &Path,
    ) -> crate::Result<RetrainOutcome> {
        let documents = store.documents_for_template(template_id);
        let feedback = store.unused_feedback_for_template(template_id);

        let sequences = dataset::build_training_sequences(&documents, &feedback, settings);
        if sequences.is_empty() {
            return Ok(RetrainOutcome::Failed { error: "no trainable sequences from current feedback/documents".to_string() });
        }

        let mut field_names: Vec<String> = template.fields.keys().cloned().collect();
        field_names.sort();

        let previous_test_accuracy = store.last_accepted_test_accuracy(template_id);

        let trainer = CrfTrainer::new(settings.crf);
        let (model, metrics) = train_and_evaluate(&trainer, sequences, field_names, settings.diversity_warning_threshold);

        if let Some(warning) = &metrics.diversity_warning {
            warn!(template_id, warning, "training set diversity below threshold");
        }

        if previous_test_accuracy > 0.0 && metrics.test_accuracy < previous_test_accuracy - settings.max_accuracy_drop {
            return Ok(RetrainOutcome::Rejected { previous_test_accuracy, candidate_test_accuracy: metrics.test_accuracy });
        }

        if let Some(parent) = model_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        atomic_replace(&model, model_path)?;
        model_cache.invalidate(template_id);
        postprocessor.invalidate(template_id);

        let used_ids: Vec<u64> = feedback.iter().map(|f| f.id).collect();
        store.mark_used(&used_ids);
        for record in &feedback {
            if record.was_correction() {
                performance.record(template_id, &record.field_name, crate::types::StrategyType::Crf, true);
            }
        }

        store.append_training_history(TrainingHistory {
            template_id: template_id.to_string(),
            trained_at: Utc::now(),
            training_samples: metrics.training_samples,
            train_accuracy: metrics.train_accuracy,
            test_accuracy: metrics.test_accuracy,
            model_path: Some(model_path.to_string_lossy().to_string()),
            status: TrainingStatus::Accepted,
            diversity_warning: metrics.diversity_warning.clone(),
        });

        info!(template_id, test_accuracy = metrics.test_accuracy, "retrain accepted");
        Ok(RetrainOutcome::Accepted { metrics_summary: summarize(&metrics) })
    }

    /// Three consecutive rejected/failed attempts raise an alert but never
    /// block future retrains (spec §7, SPEC_FULL §10).
    fn warn_on_rejection_streak(&self, store: &dyn FeedbackStore, template_id: &str) {
        let history = store.training_history_for(template_id);
        let streak = history.iter().rev().take_while(|row| row.status != TrainingStatus::Accepted).count();
        if streak >= 3 {
            error!(template_id, streak, "three or more consecutive retrain attempts failed or were rejected");
        }
    }
}

fn summarize(metrics: &TrainMetrics) -> String {
    format!(
        "train_accuracy={:.4} test_accuracy={:.4} samples={}",
        metrics.train_accuracy, metrics.test_accuracy, metrics.training_samples
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::store::InMemoryFeedbackStore;
    use crate::types::{BoundingBox, DocumentRecord, FieldConfig, Word};
    use serial_test::serial;
    use std::collections::HashMap;

    fn sample_template() -> TemplateConfig {
        TemplateConfig { fields: [("date".to_string(), FieldConfig { field_name: "date".into(), ..Default::default() })].into_iter().collect() }
    }

    fn sample_document(id: &str) -> DocumentRecord {
        DocumentRecord {
            document_id: id.to_string(),
            template_id: "t1".to_string(),
            page: 0,
            page_words: vec![
                Word::new("31", 0, BoundingBox::new(0.0, 0.0, 10.0, 10.0)),
                Word::new("May", 0, BoundingBox::new(12.0, 0.0, 22.0, 10.0)),
                Word::new("2025", 0, BoundingBox::new(24.0, 0.0, 34.0, 10.0)),
            ],
            page_width: 600.0,
            page_height: 800.0,
            extracted_data: HashMap::new(),
            confidences: HashMap::new(),
            methods: HashMap::new(),
            strategies_used: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    #[serial]
    fn second_attempt_within_cooldown_is_skipped() {
        let retrainer = Retrainer::new();
        let store = InMemoryFeedbackStore::new();
        let performance = PerformanceTracker::new();
        let settings = Settings { retrain_threshold: 1, ..Settings::default() };
        let postprocessor = PostProcessor::new(settings.pattern_frequency_threshold);
        let model_cache = ModelCache::new();
        let template = sample_template();

        store.record_document(sample_document("d1"));
        store.submit_feedback("d1", "date", "31/05/2025", "31 May 2025");

        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("t1.json");

        let first =
            retrainer.attempt(&store, &performance, &postprocessor, &model_cache, &settings, "t1", &template, &model_path).unwrap();
        assert!(matches!(first, RetrainOutcome::Accepted { .. }) || matches!(first, RetrainOutcome::Failed { .. }));

        let second =
            retrainer.attempt(&store, &performance, &postprocessor, &model_cache, &settings, "t1", &template, &model_path).unwrap();
        assert_eq!(second, RetrainOutcome::Skipped { reason: "cooldown" });
    }

    #[test]
    #[serial]
    fn lock_contention_skips_a_concurrent_attempt() {
        let retrainer = Retrainer::new();
        let _held = retrainer.lock.try_lock().unwrap();

        let store = InMemoryFeedbackStore::new();
        let performance = PerformanceTracker::new();
        let settings = Settings::default();
        let postprocessor = PostProcessor::new(settings.pattern_frequency_threshold);
        let model_cache = ModelCache::new();
        let template = sample_template();
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("t1.json");

        let result =
            retrainer.attempt(&store, &performance, &postprocessor, &model_cache, &settings, "t1", &template, &model_path).unwrap();
        assert_eq!(result, RetrainOutcome::Skipped { reason: "lock contention" });
    }

    #[test]
    #[serial]
    fn empty_training_data_is_reported_as_failed_not_panicking() {
        let retrainer = Retrainer::new();
        let store = InMemoryFeedbackStore::new();
        let performance = PerformanceTracker::new();
        let settings = Settings::default();
        let postprocessor = PostProcessor::new(settings.pattern_frequency_threshold);
        let model_cache = ModelCache::new();
        let template = sample_template();
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("t1.json");

        let result =
            retrainer.attempt(&store, &performance, &postprocessor, &model_cache, &settings, "t1", &template, &model_path).unwrap();
        assert!(matches!(result, RetrainOutcome::Failed { .. }));
        assert_eq!(store.training_history_for("t1").len(), 1);
    }
}
