//! Cross-module scenarios that don't belong to any single unit: strategy
//! arbitration weighed by strategy-performance history, and concurrent
//! retrain attempts collapsing to a single winner through `FieldforgeEngine`.
//! Colocated `#[test]` modules cover everything else; these two exercise the
//! full facade the way a caller actually would.

use fieldforge::arbiter::{HybridArbiter, PerformanceTracker};
use fieldforge::config::Settings;
use fieldforge::crf::CrfModel;
use fieldforge::feedback::{FeedbackStore, InMemoryFeedbackStore};
use fieldforge::strategies::PageContext;
use fieldforge::types::{BoundingBox, FieldConfig, FieldContext, FieldLocation, StrategyType, TemplateConfig, Word};
use fieldforge::FieldforgeEngine;
use std::collections::HashMap;
use std::sync::Arc;

fn event_name_model() -> CrfModel {
    let labels = vec!["O".to_string(), "B-EVENT_NAME".to_string(), "I-EVENT_NAME".to_string()];
    let mut feature_index = HashMap::new();
    feature_index.insert("target_field_EVENT_NAME".to_string(), 0usize);

    let num_labels = labels.len();
    let mut state_weights = vec![0.0; feature_index.len() * num_labels];
    state_weights[1] = 3.0;
    state_weights[2] = 3.0;
    let trans_weights = vec![0.0; num_labels * num_labels];

    CrfModel { labels, field_names: vec!["EVENT_NAME".into()], feature_index, state_weights, trans_weights }
}

fn words() -> Vec<Word> {
    vec![
        Word::new("dalam", 0, BoundingBox::new(0.0, 200.0, 20.0, 210.0)),
        Word::new("kegiatan", 0, BoundingBox::new(22.0, 200.0, 50.0, 210.0)),
        Word::new("Training", 0, BoundingBox::new(52.0, 200.0, 80.0, 210.0)),
        Word::new("Cabin", 0, BoundingBox::new(82.0, 200.0, 110.0, 210.0)),
        Word::new("crew", 0, BoundingBox::new(112.0, 200.0, 140.0, 210.0)),
    ]
}

fn field_and_location() -> (FieldConfig, FieldLocation) {
    let field = FieldConfig { field_name: "EVENT_NAME".into(), ..Default::default() };
    let location = FieldLocation {
        page: 0,
        marker_bbox: BoundingBox::new(0.0, 200.0, 20.0, 210.0),
        context: FieldContext {
            label: "di".into(),
            label_position: BoundingBox::new(0.0, 200.0, 20.0, 210.0),
            words_before: vec![],
            words_after: vec![],
            next_field_y: None,
            typical_length: None,
        },
    };
    (field, location)
}

/// Mirrors spec scenario 2 (strategy arbitration by maturity): a CRF
/// strategy with a long, accurate track record (`h_att=25, h_acc=0.76`)
/// outscores a rule-based strategy with a much longer but unreliable one
/// (`h_att=150, h_acc=0.0`), even though rule-based reports higher raw
/// confidence. Exercises `HybridArbiter` against real `PerformanceTracker`
/// history and a real CRF model, not the scoring formulas in isolation.
#[test]
fn strategy_arbitration_favors_the_strategy_with_a_proven_track_record() {
    let settings = Settings::default();
    let tracker = PerformanceTracker::new();

    for _ in 0..19 {
        tracker.record("t1", "EVENT_NAME", StrategyType::Crf, true);
    }
    for _ in 0..6 {
        tracker.record("t1", "EVENT_NAME", StrategyType::Crf, false);
    }
    for _ in 0..150 {
        tracker.record("t1", "EVENT_NAME", StrategyType::RuleBased, false);
    }

    let (field, location) = field_and_location();
    let template = TemplateConfig { fields: [("EVENT_NAME".to_string(), field.clone())].into_iter().collect() };
    let words = words();
    let page = PageContext { words: &words, page_width: 600.0, page_height: 800.0 };
    let model = event_name_model();

    let arbiter = HybridArbiter::new(&settings, &tracker);
    let result = arbiter
        .extract_field("t1", &template, &page, &field, &location, Some(&model))
        .expect("at least one strategy should produce a candidate");

    assert_eq!(result.method, StrategyType::Crf, "a proven CRF model should outscore an unreliable rule-based match");
    assert_eq!(
        result.metadata.all_strategies_attempted.len(),
        3,
        "all three enabled strategies (rule-based, position-based, CRF) must be in provenance, win or lose"
    );
}

fn seeded_store(n: usize) -> InMemoryFeedbackStore {
    let store = InMemoryFeedbackStore::new();
    for i in 0..n {
        store.submit_feedback(&format!("doc-{i}"), "EVENT_NAME", "Training", "Training Cabin crew");
    }
    store
}

/// Mirrors spec scenario 4 (concurrent retrain suppression): two retrain
/// attempts for the same template inside the cooldown window collapse to
/// exactly one that actually ran; the other returns immediately via lock
/// contention, never via the cooldown map (since both arrive before either
/// could have set it).
#[test]
fn concurrent_retrain_attempts_collapse_to_one_winner() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(5);
    let engine = Arc::new(FieldforgeEngine::new(Settings::default(), Box::new(store), dir.path().to_path_buf()));

    let (field, _location) = field_and_location();
    let template = TemplateConfig { fields: [("EVENT_NAME".to_string(), field)].into_iter().collect() };
    engine.register_template("t1", template);

    let engine_a = engine.clone();
    let engine_b = engine.clone();
    let handle_a = std::thread::spawn(move || engine_a.train("t1"));
    let handle_b = std::thread::spawn(move || engine_b.train("t1"));

    let outcome_a = handle_a.join().unwrap().unwrap();
    let outcome_b = handle_b.join().unwrap().unwrap();

    let skipped_count =
        [&outcome_a, &outcome_b].iter().filter(|o| matches!(o, fieldforge::feedback::RetrainOutcome::Skipped { .. })).count();
    assert_eq!(skipped_count, 1, "exactly one of the two concurrent attempts must be turned away by lock contention");
}
