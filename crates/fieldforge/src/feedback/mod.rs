//! Feedback Store + Retrainer (spec §4.9): persisting corrections,
//! assembling training sets from them, and the safeguarded, concurrency-gated
//! retrain procedure that consumes those sets.

pub mod dataset;
pub mod model_cache;
pub mod retrainer;
pub mod store;

pub use model_cache::ModelCache;
pub use retrainer::{RetrainOutcome, Retrainer};
pub use store::{FeedbackStore, FileBackedFeedbackStore, InMemoryFeedbackStore};
