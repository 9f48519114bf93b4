//! Error types for pedalstream operations.

use thiserror::Error;

/// Result type for pedalstream operations.
pub type Result<T> = std::result::Result<T, PedalStreamError>;

/// Errors that can occur while streaming audio through a model.
#[derive(Error, Debug)]
pub enum PedalStreamError {
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Audio source error: {0}")]
    SourceError(String),

    #[error("Audio sink error: {0}")]
    SinkError(String),

    #[error("Model loading failed: {0}")]
    ModelError(String),

    #[error("Inference failed: {0}")]
    InferenceError(String),

    #[error("Model returned {got} samples, expected {expected}")]
    OutputLengthMismatch { expected: usize, got: usize },

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<candle_core::Error> for PedalStreamError {
    fn from(e: candle_core::Error) -> Self {
        PedalStreamError::InferenceError(e.to_string())
    }
}

impl From<hound::Error> for PedalStreamError {
    fn from(e: hound::Error) -> Self {
        PedalStreamError::IoError(e.to_string())
    }
}

impl From<std::io::Error> for PedalStreamError {
    fn from(e: std::io::Error) -> Self {
        PedalStreamError::IoError(e.to_string())
    }
}
