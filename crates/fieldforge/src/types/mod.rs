//! Core data types shared across the pipeline.

pub mod bbox;
pub mod bio;
pub mod document;
pub mod extraction;
pub mod feedback;
pub mod performance;
pub mod strategy;
pub mod template;
pub mod training_history;
pub mod word;

pub use bbox::BoundingBox;
pub use bio::BioLabel;
pub use document::{DocumentRecord, StrategiesUsedEntry};
pub use extraction::{FieldValue, FieldValueMetadata, StrategyAttempt};
pub use feedback::FeedbackRecord;
pub use performance::StrategyPerformance;
pub use strategy::StrategyType;
pub use template::{FieldConfig, FieldContext, FieldLocation, TemplateConfig};
pub use training_history::{TrainingHistory, TrainingStatus};
pub use word::Word;
