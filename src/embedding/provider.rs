/// Embedding provider trait and error type
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("HTTP client setup failed: {0}")]
    Client(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid JSON in embeddings response: {0}")]
    InvalidJson(String),

    #[error("Unrecognized embeddings response format")]
    UnrecognizedFormat,

    #[error("Embeddings count mismatch (got {actual}, expected {expected})")]
    CountMismatch { expected: usize, actual: usize },

    #[error("No embedding endpoint succeeded after {endpoints} candidate(s): {last_error}")]
    Exhausted { endpoints: usize, last_error: String },
}

impl EmbeddingError {
    /// Whether the same endpoint may succeed on a later attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            EmbeddingError::Transport(_) => true,
            EmbeddingError::HttpStatus { status, .. } => {
                matches!(status, 429 | 500 | 502 | 503 | 504)
            }
            _ => false,
        }
    }
}

/// Trait for embedding providers
///
/// The pipeline only depends on this seam, so tests can substitute
/// precomputed vectors for the HTTP client.
pub trait EmbeddingProvider {
    /// Embed one batch; the result is index-aligned with `texts`
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Get the model name
    fn model_name(&self) -> &str;
}
