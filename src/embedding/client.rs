/// HTTP embedding client with endpoint failover
use super::{
    parse_embeddings, Credentials, EmbeddingError, EmbeddingProvider, EmbeddingSettings,
    EndpointResolver, HttpTransport, ReqwestTransport, RetryPolicy,
};
use serde::Serialize;
use std::thread;
use tracing::{debug, info, warn};

/// Body length kept in errors for retryable statuses
const RETRYABLE_BODY_CHARS: usize = 200;
/// Body length kept in errors for other statuses
const FATAL_BODY_CHARS: usize = 300;

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

/// OpenAI-compatible embeddings client
///
/// Tries each candidate endpoint in order. Within a candidate, transient
/// failures (network, 429, 5xx) are retried with capped exponential backoff.
/// Any other failure, including a well-formed response with the wrong
/// number of vectors, moves on to the next candidate. The batch fails only
/// once every candidate is exhausted.
pub struct EmbeddingClient<T: HttpTransport = ReqwestTransport> {
    transport: T,
    endpoints: Vec<String>,
    headers: Vec<(String, String)>,
    model: String,
    retry: RetryPolicy,
}

impl EmbeddingClient<ReqwestTransport> {
    /// Build a client backed by reqwest
    pub fn new(
        settings: &EmbeddingSettings,
        credentials: &Credentials,
    ) -> Result<Self, EmbeddingError> {
        if credentials.api_key.trim().is_empty() {
            return Err(EmbeddingError::Client("missing API key".to_string()));
        }
        reqwest::header::HeaderValue::from_str(&format!("Bearer {}", credentials.api_key.trim()))
            .map_err(|_| EmbeddingError::Client("API key is not a valid header value".to_string()))?;

        let transport = ReqwestTransport::new(settings.request_timeout)?;
        Ok(Self::with_transport(settings, credentials, transport))
    }
}

impl<T: HttpTransport> EmbeddingClient<T> {
    /// Build a client over any transport
    pub fn with_transport(
        settings: &EmbeddingSettings,
        credentials: &Credentials,
        transport: T,
    ) -> Self {
        let endpoints =
            EndpointResolver::new(settings.region.as_deref()).resolve(&settings.api_base);

        info!(
            "Embedding client ready: model={}, {} candidate endpoint(s)",
            settings.model,
            endpoints.len()
        );
        for endpoint in &endpoints {
            debug!("Candidate endpoint: {}", endpoint);
        }

        Self {
            transport,
            endpoints,
            headers: build_headers(credentials),
            model: settings.model.clone(),
            retry: settings.retry,
        }
    }

    /// Candidate endpoints in the order they are tried
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run one candidate until success or a reason to move on
    fn try_endpoint(
        &self,
        endpoint: &str,
        body: &[u8],
        expected: usize,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let max_attempts = self.retry.max_retries.saturating_add(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let error = match self.transport.post_json(endpoint, &self.headers, body) {
                Ok(reply) if reply.is_success() => {
                    let vectors = parse_embeddings(&reply.body)?.into_vectors();
                    if vectors.len() != expected {
                        return Err(EmbeddingError::CountMismatch {
                            expected,
                            actual: vectors.len(),
                        });
                    }
                    return Ok(vectors);
                }
                Ok(reply) => {
                    let status_error = EmbeddingError::HttpStatus {
                        status: reply.status,
                        body: String::new(),
                    };
                    let limit = if status_error.is_retryable() {
                        RETRYABLE_BODY_CHARS
                    } else {
                        FATAL_BODY_CHARS
                    };
                    EmbeddingError::HttpStatus {
                        status: reply.status,
                        body: truncate_chars(&reply.body, limit),
                    }
                }
                Err(e) => e,
            };

            if !error.is_retryable() || attempt >= max_attempts {
                return Err(error);
            }

            let delay = self.retry.delay(attempt);
            warn!(
                "Embedding attempt {}/{} at {} failed: {}; retrying in {:?}",
                attempt, max_attempts, endpoint, error, delay
            );
            thread::sleep(delay);
        }
    }
}

impl<T: HttpTransport> EmbeddingProvider for EmbeddingClient<T> {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };
        let body = serde_json::to_vec(&request)
            .map_err(|e| EmbeddingError::Client(format!("failed to encode request: {}", e)))?;

        let mut last_error: Option<EmbeddingError> = None;
        for endpoint in &self.endpoints {
            match self.try_endpoint(endpoint, &body, texts.len()) {
                Ok(vectors) => {
                    debug!("Embedded {} texts via {}", vectors.len(), endpoint);
                    return Ok(vectors);
                }
                Err(e) => {
                    warn!("Embedding endpoint {} failed: {}", endpoint, e);
                    last_error = Some(e);
                }
            }
        }

        Err(EmbeddingError::Exhausted {
            endpoints: self.endpoints.len(),
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no candidate endpoints".to_string()),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn build_headers(credentials: &Credentials) -> Vec<(String, String)> {
    let key = credentials.api_key.trim();
    let mut headers = vec![
        ("Authorization".to_string(), format!("Bearer {}", key)),
        ("X-Auth-Token".to_string(), key.to_string()),
        ("Content-Type".to_string(), "application/json".to_string()),
    ];
    if let Some(project) = credentials.project_id.as_deref().filter(|p| !p.is_empty()) {
        headers.push(("X-Project-Id".to_string(), project.to_string()));
    }
    if let Some(org) = credentials
        .organization_id
        .as_deref()
        .filter(|o| !o.is_empty())
    {
        headers.push(("X-Organization-Id".to_string(), org.to_string()));
    }
    headers
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
