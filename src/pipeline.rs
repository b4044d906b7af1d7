// Deduplication pipeline: normalize, embed, score, cluster, select, assemble

use crate::cluster::{connected_components, Cluster};
use crate::embedding::{embed_in_batches, EmbeddingProvider};
use crate::error::{DedupError, Result};
use crate::graph::{unit_normalize, SimilarityGraph, Thresholds};
use crate::normalize::TextNormalizer;
use crate::output::{
    build_records, build_review_rows, CanonicalTicket, ClusterRecord, ReviewRow, RunSummary,
};
use crate::representative::pick_representative;
use crate::ticket::TicketRecord;
use std::time::Instant;

/// Knobs for one run
#[derive(Debug, Clone)]
pub struct DedupOptions {
    pub thresholds: Thresholds,
    pub batch_size: usize,
    /// Cap on review rows; `None` keeps all
    pub max_pairs: Option<usize>,
    pub subject_max_chars: usize,
    /// Reported in the summary only
    pub api_base: String,
}

impl Default for DedupOptions {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            batch_size: 64,
            max_pairs: None,
            subject_max_chars: 120,
            api_base: String::new(),
        }
    }
}

/// Everything a run produces, ready to print or write
#[derive(Debug, Clone)]
pub struct DedupReport {
    pub clusters: Vec<Cluster>,
    pub representatives: Vec<usize>,
    pub canonical: Vec<CanonicalTicket>,
    pub records: Vec<ClusterRecord>,
    pub review_rows: Vec<ReviewRow>,
    pub summary: RunSummary,
}

/// Run the full pipeline over `tickets`
///
/// Nothing is written here; a failure anywhere leaves no partial output.
pub fn run<P: EmbeddingProvider + ?Sized>(
    tickets: &[TicketRecord],
    provider: &P,
    options: &DedupOptions,
) -> Result<DedupReport> {
    let start = Instant::now();

    let normalizer = TextNormalizer::new()?;
    let texts: Vec<String> = tickets.iter().map(|t| normalizer.ticket_text(t)).collect();

    let vectors = embed_in_batches(provider, &texts, options.batch_size)?;
    if vectors.len() != tickets.len() {
        return Err(DedupError::EmbeddingCountMismatch {
            expected: tickets.len(),
            actual: vectors.len(),
        });
    }

    let unit_vectors = unit_normalize(&vectors);
    let graph = SimilarityGraph::build(&unit_vectors, options.thresholds)?;
    let clusters = connected_components(tickets.len(), graph.merge_pairs());

    let representatives = clusters
        .iter()
        .map(|cluster| {
            pick_representative(&cluster.members, tickets).ok_or_else(|| {
                DedupError::Other(anyhow::anyhow!("Cluster {} has no members", cluster.id))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let (canonical, records) = build_records(&clusters, &representatives, tickets);
    let review_rows = build_review_rows(
        graph.review_candidates.values(),
        tickets,
        options.subject_max_chars,
        options.max_pairs,
    );

    let summary = RunSummary {
        input_tickets: tickets.len(),
        threshold: options.thresholds.merge,
        threshold_low: options.thresholds.review_floor,
        clusters: clusters.len(),
        multi_member_clusters: clusters.iter().filter(|c| !c.is_singleton()).count(),
        canonical_tickets: canonical.len(),
        review_pairs: review_rows.len(),
        model: provider.model_name().to_string(),
        api_base: options.api_base.clone(),
    };

    tracing::info!(
        "Deduplicated {} tickets into {} clusters in {}ms",
        tickets.len(),
        clusters.len(),
        start.elapsed().as_millis()
    );

    Ok(DedupReport {
        clusters,
        representatives,
        canonical,
        records,
        review_rows,
        summary,
    })
}
