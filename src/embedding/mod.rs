mod batch;
mod client;
/// Embedding client for an external OpenAI-compatible service
///
/// Architecture:
/// - EmbeddingProvider trait: the seam the pipeline depends on
/// - EmbeddingClient: HTTP implementation with endpoint failover and retries
/// - EndpointResolver: ordered chain of URL-building strategies
/// - HttpTransport: blocking HTTP boundary (reqwest in production)
/// - Response parsing for the two accepted payload shapes
mod endpoints;
mod provider;
mod response;
mod transport;

pub use batch::embed_in_batches;
pub use client::EmbeddingClient;
pub use endpoints::{
    strip_chat_suffix, EndpointContext, EndpointResolver, EndpointStrategy, GenericEndpoint,
    ProviderCompatibleEndpoints, RegionScopedEndpoints, DEFAULT_REGIONS,
};
pub use provider::{EmbeddingError, EmbeddingProvider};
pub use response::{parse_embeddings, EmbeddingsPayload};
pub use transport::{HttpReply, HttpTransport, ReqwestTransport};

use std::fmt;
use std::time::Duration;

/// API credentials resolved once at startup
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub project_id: Option<String>,
    pub organization_id: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("project_id", &self.project_id)
            .field("organization_id", &self.organization_id)
            .finish()
    }
}

/// Retry policy applied to each candidate endpoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub backoff_cap: Duration,
}

impl RetryPolicy {
    /// Exponential backoff for a 1-based attempt, capped, plus up to 25% jitter
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let base = self
            .backoff_base
            .saturating_mul(1u32 << exponent)
            .min(self.backoff_cap);
        let jitter = rand::random::<f64>() * 0.25;
        base + base.mul_f64(jitter)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff_base: Duration::from_millis(1000),
            backoff_cap: Duration::from_millis(16000),
        }
    }
}

/// Everything the embedding client needs, passed explicitly to its constructor
#[derive(Debug, Clone)]
pub struct EmbeddingSettings {
    /// Configured base URL, before endpoint discovery
    pub api_base: String,
    pub model: String,
    pub region: Option<String>,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.scaleway.ai/v1".to_string(),
            model: "bge-multilingual-gemma2".to_string(),
            region: None,
            request_timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
        }
    }
}
