//! `FieldforgeEngine` (spec §6): the facade bundling a [`FeedbackStore`], a
//! [`PerformanceTracker`], a [`PostProcessor`], a [`ModelCache`], and a
//! [`Retrainer`] behind the three inbound operations spec §6 names —
//! `extract`, `submit_corrections`, `train` — plus template registration.
//!
//! Blocking methods are the implementation; behind the default
//! `tokio-runtime` feature, `_async` wrappers run them on a blocking worker
//! (the teacher's `legacy.rs` sync/async split, `core/extractor/legacy.rs`),
//! and `submit_corrections_async` additionally detaches the retrain attempt
//! onto the same pool rather than awaiting it, matching spec §5's
//! "cooperatively concurrent" retraining.

use crate::arbiter::{HybridArbiter, PerformanceTracker};
use crate::config::Settings;
use crate::feedback::{FeedbackStore, ModelCache, RetrainOutcome, Retrainer};
use crate::postprocess::PostProcessor;
use crate::strategies::PageContext;
use crate::template::TemplateAnalyzer;
use crate::types::{DocumentRecord, StrategiesUsedEntry, StrategyType, TemplateConfig, Word};
use crate::{FieldforgeError, Result};
use dashmap::DashMap;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// One `extract` call's result (spec §6): the per-field values plus full
/// strategy provenance, ready for a caller to render or to later correct.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub document_id: String,
    pub extracted_data: HashMap<String, String>,
    pub confidences: HashMap<String, f64>,
    pub methods: HashMap<String, StrategyType>,
    pub strategies_used: Vec<StrategiesUsedEntry>,
}

/// A single field correction submitted for one document (spec §6's
/// `submit_corrections`). `corrected_value == original_value` is the
/// "silent acceptance" case — still recorded, but not as a `FeedbackRecord`
/// correction (spec §3's `FeedbackRecord` only models actual edits).
#[derive(Debug, Clone)]
pub struct Correction {
    pub field_name: String,
    pub corrected_value: String,
}

pub struct FieldforgeEngine {
    templates: DashMap<String, TemplateConfig>,
    settings: Settings,
    store: Box<dyn FeedbackStore>,
    performance: PerformanceTracker,
    postprocessor: PostProcessor,
    model_cache: ModelCache,
    retrainer: Retrainer,
    model_dir: PathBuf,
}

impl FieldforgeEngine {
    pub fn new(settings: Settings, store: Box<dyn FeedbackStore>, model_dir: impl Into<PathBuf>) -> Self {
        let postprocessor = PostProcessor::new(settings.pattern_frequency_threshold);
        Self {
            templates: DashMap::new(),
            settings,
            store,
            performance: PerformanceTracker::new(),
            postprocessor,
            model_cache: ModelCache::new(),
            retrainer: Retrainer::new(),
            model_dir: model_dir.into(),
        }
    }

    /// Registers a template produced by the Template Analyzer (or loaded
    /// from a saved configuration) under `template_id`.
    pub fn register_template(&self, template_id: impl Into<String>, template: TemplateConfig) {
        self.templates.insert(template_id.into(), template);
    }

    /// Analyzes a sample document's words into a `TemplateConfig` and
    /// registers it under `template_id` in one step (spec §4.1).
    pub fn analyze_and_register_template(&self, template_id: impl Into<String>, sample_words: &[Word]) {
        let template = TemplateAnalyzer::new().analyze(sample_words);
        self.register_template(template_id, template);
    }

    fn model_path(&self, template_id: &str) -> PathBuf {
        self.model_dir.join(format!("{template_id}.crf.json"))
    }

    /// Runs extraction for every field of `template_id` that has a location
    /// on `page`, then persists the result as a [`DocumentRecord`] so later
    /// corrections can be relabeled into training sequences.
    pub fn extract(
        &self,
        template_id: &str,
        document_id: impl Into<String>,
        page: usize,
        page_words: Vec<Word>,
        page_width: f32,
        page_height: f32,
    ) -> Result<ExtractionResult> {
        let document_id = document_id.into();
        let template = self
            .templates
            .get(template_id)
            .ok_or_else(|| FieldforgeError::configuration(template_id, "no template registered under this id"))?
            .clone();

        let model = self.model_cache.get_or_load(template_id, self.model_path(template_id))?;
        let page_context = PageContext { words: &page_words, page_width, page_height };
        let arbiter = HybridArbiter::new(&self.settings, &self.performance);

        let mut extracted_data = HashMap::new();
        let mut confidences = HashMap::new();
        let mut methods = HashMap::new();
        let mut strategies_used = Vec::new();

        let mut field_names: Vec<&String> = template.fields.keys().collect();
        field_names.sort();

        for field_name in field_names {
            let field = &template.fields[field_name];
            let Some(location) = field.location_on_page(page) else { continue };

            let Some(value) = arbiter.extract_field(template_id, &template, &page_context, field, location, model.as_deref()) else {
                continue;
            };

            let cleaned = self.postprocessor.clean(template_id, field_name, &value.value);

            extracted_data.insert(field_name.clone(), cleaned);
            confidences.insert(field_name.clone(), value.confidence);
            methods.insert(field_name.clone(), value.method);
            strategies_used.push(StrategiesUsedEntry {
                field_name: field_name.clone(),
                method: value.method,
                confidence: value.confidence,
                all_strategies_attempted: value.metadata.all_strategies_attempted,
            });
        }

        self.store.record_document(DocumentRecord {
            document_id: document_id.clone(),
            template_id: template_id.to_string(),
            page,
            page_words,
            page_width,
            page_height,
            extracted_data: extracted_data.clone(),
            confidences: confidences.clone(),
            methods: methods.clone(),
            strategies_used: strategies_used.clone(),
            created_at: chrono::Utc::now(),
        });

        Ok(ExtractionResult { document_id, extracted_data, confidences, methods, strategies_used })
    }

    /// Records `corrections` for `document_id`, updates the Post-Processor's
    /// pattern catalogue and the Strategy-Performance Tracker, and returns
    /// whether a retrain should be scheduled for this document's template
    /// (spec §4.9's trigger): the unused-feedback count crossed
    /// `retrain_threshold` *and* a model file already exists for this
    /// template. A template with no model yet only gets one via an explicit
    /// [`Self::train`] call, never an automatic feedback-triggered one —
    /// the caller decides whether to act on a `true` result by calling
    /// [`Self::train`] itself, or the `_async` wrapper schedules it
    /// automatically.
    pub fn submit_corrections(&self, document_id: &str, corrections: &[Correction]) -> Result<bool> {
        let document = self
            .store
            .document(document_id)
            .ok_or_else(|| FieldforgeError::validation(format!("unknown document_id '{document_id}'")))?;
        let template_id = document.template_id.clone();

        for correction in corrections {
            let Some(original) = document.extracted_data.get(&correction.field_name) else {
                tracing::warn!(field = %correction.field_name, "feedback for unknown field_name, skipped");
                continue;
            };
            let method = document.methods.get(&correction.field_name).copied();
            let was_correct = original == &correction.corrected_value;

            if !was_correct {
                self.store.submit_feedback(document_id, &correction.field_name, original, &correction.corrected_value);
                self.postprocessor.learn(&template_id, &correction.field_name, original, &correction.corrected_value);
            }
            if let Some(method) = method {
                self.performance.record(&template_id, &correction.field_name, method, was_correct);
            }
        }

        let unused = self.store.unused_feedback_for_template(&template_id).len();
        let threshold_crossed = unused >= self.settings.retrain_threshold;
        let model_exists = self.model_path(&template_id).is_file();
        Ok(threshold_crossed && model_exists)
    }

    /// Runs one gated retrain attempt for `template_id` (spec §4.9). Always
    /// returns `Ok` with the outcome rather than erroring — training
    /// failures are represented as `RetrainOutcome::Failed`. Unlike the
    /// feedback-triggered path (`submit_corrections`'s `retrain_scheduled`),
    /// this is callable directly (e.g. the CLI's `train` subcommand) and
    /// may legitimately bootstrap a template's first model from nothing.
    pub fn train(&self, template_id: &str) -> Result<RetrainOutcome> {
        let template = self
            .templates
            .get(template_id)
            .ok_or_else(|| FieldforgeError::configuration(template_id, "no template registered under this id"))?
            .clone();
        self.retrainer.attempt(
            self.store.as_ref(),
            &self.performance,
            &self.postprocessor,
            &self.model_cache,
            &self.settings,
            template_id,
            &template,
            self.model_path(template_id),
        )
    }
}

#[cfg(feature = "tokio-runtime")]
impl FieldforgeEngine {
    pub async fn extract_async(
        self: &Arc<Self>,
        template_id: &str,
        document_id: impl Into<String>,
        page: usize,
        page_words: Vec<Word>,
        page_width: f32,
        page_height: f32,
    ) -> Result<ExtractionResult> {
        let engine = self.clone();
        let template_id = template_id.to_string();
        let document_id = document_id.into();
        let span = tracing::Span::current();
        tokio::task::spawn_blocking(move || {
            let _guard = span.entered();
            engine.extract(&template_id, document_id, page, page_words, page_width, page_height)
        })
        .await
        .map_err(|e| FieldforgeError::Other(format!("extract task panicked: {e}")))?
    }

    /// Submits corrections synchronously, then — if the retrain threshold
    /// was crossed — detaches a retrain attempt onto the blocking pool
    /// without awaiting it, the way spec §5 describes: submission schedules
    /// an attempt on a background worker and returns immediately.
    pub async fn submit_corrections_async(self: &Arc<Self>, document_id: &str, corrections: Vec<Correction>) -> Result<bool> {
        let engine = self.clone();
        let document_id_owned = document_id.to_string();
        let span = tracing::Span::current();
        let should_retrain = tokio::task::spawn_blocking(move || {
            let _guard = span.entered();
            engine.submit_corrections(&document_id_owned, &corrections)
        })
        .await
        .map_err(|e| FieldforgeError::Other(format!("submit_corrections task panicked: {e}")))??;

        if should_retrain {
            let document_id = document_id.to_string();
            let engine = self.clone();
            let template_id = engine
                .store
                .document(&document_id)
                .map(|d| d.template_id)
                .unwrap_or_default();
            tokio::spawn(async move {
                let span = tracing::Span::current();
                let outcome = tokio::task::spawn_blocking(move || {
                    let _guard = span.entered();
                    engine.train(&template_id)
                })
                .await;
                match outcome {
                    Ok(Ok(outcome)) => tracing::info!(?outcome, "background retrain attempt finished"),
                    Ok(Err(e)) => tracing::warn!(error = %e, "background retrain attempt errored"),
                    Err(e) => tracing::warn!(error = %e, "background retrain task panicked"),
                }
            });
        }

        Ok(should_retrain)
    }

    pub async fn train_async(self: &Arc<Self>, template_id: &str) -> Result<RetrainOutcome> {
        let engine = self.clone();
        let template_id = template_id.to_string();
        let span = tracing::Span::current();
        tokio::task::spawn_blocking(move || {
            let _guard = span.entered();
            engine.train(&template_id)
        })
        .await
        .map_err(|e| FieldforgeError::Other(format!("train task panicked: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::InMemoryFeedbackStore;
    use crate::types::{BoundingBox, FieldConfig, FieldContext, FieldLocation};

    fn engine() -> FieldforgeEngine {
        let dir = tempfile::tempdir().unwrap();
        FieldforgeEngine::new(Settings::default(), Box::new(InMemoryFeedbackStore::new()), dir.keep())
    }

    fn sample_template() -> TemplateConfig {
        let location = FieldLocation {
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
        };
        TemplateConfig {
            fields: [("date".to_string(), FieldConfig { field_name: "date".into(), locations: vec![location], ..Default::default() })]
                .into_iter()
                .collect(),
        }
    }

    #[test]
    fn extract_then_correct_records_feedback_and_reports_threshold() {
        let engine = engine();
        engine.register_template("t1", sample_template());

        let words = vec![Word::new("31 May 2025", 0, BoundingBox::new(0.0, 0.0, 1.0, 1.0))];
        let result = engine.extract("t1", "d1", 0, words, 600.0, 800.0).unwrap();
        assert!(result.extracted_data.contains_key("date"));

        let crossed = engine
            .submit_corrections("d1", &[Correction { field_name: "date".into(), corrected_value: "31 May 2025, corrected".into() }])
            .unwrap();
        assert!(!crossed, "a single correction shouldn't cross the default threshold of 100");
    }

    #[test]
    fn extract_against_unregistered_template_is_a_configuration_error() {
        let engine = engine();
        let result = engine.extract("missing", "d1", 0, vec![], 600.0, 800.0);
        assert!(matches!(result, Err(FieldforgeError::Configuration { .. })));
    }

    #[test]
    fn correcting_an_unknown_document_is_a_validation_error() {
        let engine = engine();
        let result = engine.submit_corrections("ghost", &[]);
        assert!(matches!(result, Err(FieldforgeError::Validation { .. })));
    }
}
