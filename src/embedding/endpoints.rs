/// Candidate endpoint discovery
///
/// One configured base URL fans out into an ordered list of candidate
/// `/embeddings` URLs. Each strategy contributes its variants; the client
/// tries them in order until one returns a well-formed response.
use std::collections::HashSet;

/// Regions tried when none is configured
pub const DEFAULT_REGIONS: &[&str] = &["fr-par", "nl-ams", "pl-waw"];

/// Chat endpoint suffixes removed from the configured base
const CHAT_SUFFIXES: &[&str] = &[
    "/chat/completions",
    "/v1/chat/completions",
    "/openai/v1/chat/completions",
    "/providers/openai/chat/completions",
];

/// Inputs shared by all strategies
#[derive(Debug, Clone)]
pub struct EndpointContext<'a> {
    /// Base URL with trailing slash and chat suffix removed
    pub base: &'a str,
    pub regions: &'a [String],
}

/// One link in the endpoint chain
pub trait EndpointStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn candidates(&self, ctx: &EndpointContext<'_>) -> Vec<String>;
}

/// Region-scoped paths, only for hosts that look like Scaleway
pub struct RegionScopedEndpoints;

impl EndpointStrategy for RegionScopedEndpoints {
    fn name(&self) -> &'static str {
        "region-scoped"
    }

    fn candidates(&self, ctx: &EndpointContext<'_>) -> Vec<String> {
        let lower = ctx.base.to_lowercase();
        if !lower.contains("scaleway") && !lower.contains("/ai/") {
            return Vec::new();
        }

        ctx.regions
            .iter()
            .flat_map(|region| {
                [
                    format!("{}/regions/{}/embeddings", ctx.base, region),
                    format!("{}/regions/{}/providers/openai/embeddings", ctx.base, region),
                ]
            })
            .collect()
    }
}

/// OpenAI-compatible provider paths
pub struct ProviderCompatibleEndpoints;

impl EndpointStrategy for ProviderCompatibleEndpoints {
    fn name(&self) -> &'static str {
        "provider-compatible"
    }

    fn candidates(&self, ctx: &EndpointContext<'_>) -> Vec<String> {
        vec![
            format!("{}/openai/v1/embeddings", ctx.base),
            format!("{}/v1/embeddings", ctx.base),
            format!("{}/providers/openai/embeddings", ctx.base),
        ]
    }
}

/// Plain `<base>/embeddings`
pub struct GenericEndpoint;

impl EndpointStrategy for GenericEndpoint {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn candidates(&self, ctx: &EndpointContext<'_>) -> Vec<String> {
        vec![format!("{}/embeddings", ctx.base)]
    }
}

/// Remove a trailing slash and any known chat-completions suffix
pub fn strip_chat_suffix(raw: &str) -> String {
    let mut base = raw.trim().trim_end_matches('/').to_string();
    for suffix in CHAT_SUFFIXES {
        if let Some(stripped) = base.strip_suffix(suffix) {
            base = stripped.trim_end_matches('/').to_string();
        }
    }
    base
}

/// Ordered chain of endpoint strategies
pub struct EndpointResolver {
    strategies: Vec<Box<dyn EndpointStrategy>>,
    regions: Vec<String>,
}

impl EndpointResolver {
    /// Default chain: region-scoped, provider-compatible, generic
    pub fn new(region: Option<&str>) -> Self {
        let strategies: Vec<Box<dyn EndpointStrategy>> = vec![
            Box::new(RegionScopedEndpoints),
            Box::new(ProviderCompatibleEndpoints),
            Box::new(GenericEndpoint),
        ];
        Self::with_strategies(region, strategies)
    }

    pub fn with_strategies(
        region: Option<&str>,
        strategies: Vec<Box<dyn EndpointStrategy>>,
    ) -> Self {
        let regions = match region.map(str::trim).filter(|r| !r.is_empty()) {
            Some(r) => vec![r.to_string()],
            None => DEFAULT_REGIONS.iter().map(|r| r.to_string()).collect(),
        };
        Self {
            strategies,
            regions,
        }
    }

    /// Candidate URLs for a configured base, deduplicated in order
    pub fn resolve(&self, raw_base: &str) -> Vec<String> {
        let base = strip_chat_suffix(raw_base);

        // An explicit embeddings endpoint is used as-is
        if base.ends_with("/embeddings") {
            return vec![base];
        }

        let ctx = EndpointContext {
            base: &base,
            regions: &self.regions,
        };

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for strategy in &self.strategies {
            let candidates = strategy.candidates(&ctx);
            tracing::debug!(
                "Endpoint strategy {} produced {} candidate(s)",
                strategy.name(),
                candidates.len()
            );
            for candidate in candidates {
                let candidate = candidate.trim().trim_end_matches('/').to_string();
                if seen.insert(candidate.clone()) {
                    out.push(candidate);
                }
            }
        }
        out
    }
}
