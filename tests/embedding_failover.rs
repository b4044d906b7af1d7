/// Embedding client behaviour through the public API, with a scripted transport
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use ticket_dedup::embedding::{
    Credentials, EmbeddingClient, EmbeddingError, EmbeddingProvider, EmbeddingSettings,
    HttpReply, HttpTransport, RetryPolicy,
};
use ticket_dedup::pipeline::{run, DedupOptions};
use ticket_dedup::ticket::TicketRecord;

/// Replies per URL in order; unknown URLs get a 404
#[derive(Default)]
struct ScriptedTransport {
    replies: RefCell<HashMap<String, VecDeque<Result<HttpReply, EmbeddingError>>>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedTransport {
    fn script(self, url: &str, reply: Result<HttpReply, EmbeddingError>) -> Self {
        self.replies
            .borrow_mut()
            .entry(url.to_string())
            .or_default()
            .push_back(reply);
        self
    }
}

impl HttpTransport for ScriptedTransport {
    fn post_json(
        &self,
        url: &str,
        _headers: &[(String, String)],
        _body: &[u8],
    ) -> Result<HttpReply, EmbeddingError> {
        self.calls.borrow_mut().push(url.to_string());
        self.replies
            .borrow_mut()
            .get_mut(url)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Ok(HttpReply::new(404, "not found")))
    }
}

fn settings(api_base: &str) -> EmbeddingSettings {
    EmbeddingSettings {
        api_base: api_base.to_string(),
        model: "bge-multilingual-gemma2".to_string(),
        region: None,
        request_timeout: Duration::from_secs(5),
        retry: RetryPolicy {
            max_retries: 2,
            backoff_base: Duration::from_millis(1),
            backoff_cap: Duration::from_millis(2),
        },
    }
}

fn credentials() -> Credentials {
    Credentials {
        api_key: "test-key".to_string(),
        project_id: None,
        organization_id: None,
    }
}

const FIRST: &str = "https://embed.test/openai/v1/embeddings";
const SECOND: &str = "https://embed.test/v1/embeddings";

#[test]
fn test_pipeline_survives_failing_first_endpoint() {
    let body = r#"{"data": [
        {"index": 1, "embedding": [1.0, 0.0]},
        {"index": 0, "embedding": [1.0, 0.0]},
        {"index": 2, "embedding": [0.0, 1.0]}
    ]}"#;
    let transport = ScriptedTransport::default()
        .script(FIRST, Ok(HttpReply::new(503, "busy")))
        .script(FIRST, Ok(HttpReply::new(503, "busy")))
        .script(FIRST, Ok(HttpReply::new(503, "busy")))
        .script(SECOND, Ok(HttpReply::new(200, body)));
    let client = EmbeddingClient::with_transport(&settings("https://embed.test"), &credentials(), transport);

    let tickets = vec![
        TicketRecord::new(1, "2024-01-01", "VPN", "", ""),
        TicketRecord::new(2, "2024-01-02", "VPN again", "", ""),
        TicketRecord::new(3, "2024-01-03", "Printer", "", ""),
    ];
    let report = run(&tickets, &client, &DedupOptions::default()).unwrap();

    assert_eq!(report.summary.clusters, 2);
    assert_eq!(report.clusters[0].members, vec![0, 1]);
    assert_eq!(report.summary.model, "bge-multilingual-gemma2");
    assert_eq!(
        *client.transport().calls.borrow(),
        vec![FIRST, FIRST, FIRST, SECOND]
    );
}

#[test]
fn test_every_endpoint_failing_is_fatal() {
    let client = EmbeddingClient::with_transport(
        &settings("https://embed.test"),
        &credentials(),
        ScriptedTransport::default(),
    );
    let err = client
        .embed_batch(&["printer jam".to_string()])
        .unwrap_err();
    assert!(matches!(err, EmbeddingError::Exhausted { .. }));

    let tickets = vec![TicketRecord::new(1, "", "Printer", "", "")];
    assert!(run(&tickets, &client, &DedupOptions::default()).is_err());
}

#[test]
fn test_explicit_embeddings_url_is_only_candidate() {
    let client = EmbeddingClient::with_transport(
        &settings("https://gateway.test/custom/embeddings"),
        &credentials(),
        ScriptedTransport::default(),
    );
    assert_eq!(client.endpoints(), ["https://gateway.test/custom/embeddings"]);
}

#[test]
fn test_scaleway_base_tries_regions_first() {
    let client = EmbeddingClient::with_transport(
        &settings("https://api.scaleway.ai/v1/chat/completions"),
        &credentials(),
        ScriptedTransport::default(),
    );
    let endpoints = client.endpoints();
    assert!(endpoints[0].contains("fr-par"));
    assert!(endpoints.iter().any(|e| e.ends_with("/v1/embeddings")));
    assert!(endpoints.iter().all(|e| !e.contains("chat/completions")));

    let unique: std::collections::HashSet<&String> = endpoints.iter().collect();
    assert_eq!(unique.len(), endpoints.len());
}
