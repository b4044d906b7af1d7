use std::path::PathBuf;
use thiserror::Error;

use crate::embedding::EmbeddingError;

/// Main error type for ticket deduplication
#[derive(Error, Debug)]
pub enum DedupError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation errors
    #[error("Configuration validation failed: {errors:?}")]
    ConfigValidation { errors: Vec<ValidationError> },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Invalid configuration value
    #[error("Invalid configuration value at {path}: {message}")]
    InvalidConfigValue { path: String, message: String },

    /// No API key in any of the accepted environment variables
    #[error("Embedding API key not set (tried: {})", tried.join(", "))]
    MissingCredentials { tried: Vec<String> },

    /// Input file has a JSON shape we do not understand
    #[error("Unsupported input in {path}: {message}")]
    InputFormat { path: PathBuf, message: String },

    /// Merge threshold below the review floor
    #[error("Invalid thresholds: threshold_low ({low}) must not exceed threshold ({high})")]
    InvalidThresholds { high: f64, low: f64 },

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON errors
    #[error("JSON error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    /// Embedding service errors
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Fewer or more vectors than tickets after all batches
    #[error("Embedding count mismatch: expected {expected}, got {actual}")]
    EmbeddingCountMismatch { expected: usize, actual: usize },

    /// Vectors of different lengths in one run
    #[error("Dimension mismatch at vector {index}: expected {expected}, got {actual}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Path to the configuration key that failed validation
    pub path: String,
    /// Error message describing the validation failure
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for deduplication operations
pub type Result<T> = std::result::Result<T, DedupError>;
