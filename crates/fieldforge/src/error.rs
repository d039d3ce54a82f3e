//! Crate-wide error type.
//!
//! Mirrors the shape of the teacher's domain error enum: named struct
//! variants for errors with context, tuple variants for simple messages,
//! and `#[from]` conversions for the handful of external error types the
//! core pipeline actually touches.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FieldforgeError {
    #[error("tokenization failed: {message}")]
    Input { message: String },

    #[error("missing or invalid template configuration for '{template_id}': {message}")]
    Configuration { template_id: String, message: String },

    #[error("validation failed: {message}")]
    Validation { message: String },

    #[error("training failed: {message}")]
    Training { message: String },

    #[error("model file not found at {path:?}")]
    ModelNotFound { path: PathBuf },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("{0}")]
    Other(String),
}

impl FieldforgeError {
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input { message: message.into() }
    }

    pub fn configuration(template_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration { template_id: template_id.into(), message: message.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn training(message: impl Into<String>) -> Self {
        Self::Training { message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, FieldforgeError>;
