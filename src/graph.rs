//! Similarity graph over unit-normalized embeddings
//!
//! Every pair `i < j` is compared once (O(n²)). Pairs at or above the merge
//! threshold become merge edges; for each `i`, the best forward neighbour in
//! the review zone `[threshold_low, threshold)` is kept as a review
//! candidate, which bounds review output to one row per ticket.
//!
//! The brute-force pass is exact and deterministic, which suits corpora of a
//! few thousand tickets. Larger corpora would need an approximate
//! nearest-neighbour search behind `SimilarityGraph::build`; the cluster
//! engine only consumes the merge edge list and would not change.

use crate::error::{DedupError, Result};
use std::collections::BTreeMap;

/// Merge threshold and review floor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Pairs with similarity >= this merge
    pub merge: f64,
    /// Pairs in [review_floor, merge) are surfaced for review
    pub review_floor: f64,
}

impl Thresholds {
    pub fn new(merge: f64, review_floor: f64) -> Result<Self> {
        if review_floor > merge || merge.is_nan() || review_floor.is_nan() {
            return Err(DedupError::InvalidThresholds {
                high: merge,
                low: review_floor,
            });
        }
        Ok(Self {
            merge,
            review_floor,
        })
    }

    pub fn merges(&self, score: f64) -> bool {
        score >= self.merge
    }

    pub fn needs_review(&self, score: f64) -> bool {
        score >= self.review_floor && score < self.merge
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            merge: 0.84,
            review_floor: 0.78,
        }
    }
}

/// Scored pair of ticket indices, always `i < j`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityEdge {
    pub i: usize,
    pub j: usize,
    pub score: f64,
}

/// L2-normalize each vector in f64; all-zero vectors are left as they are
///
/// Widening happens before squaring so large components cannot overflow and
/// identical inputs keep a self-similarity of 1 to within f64 rounding.
pub fn unit_normalize(vectors: &[Vec<f32>]) -> Vec<Vec<f64>> {
    vectors
        .iter()
        .map(|v| {
            let wide: Vec<f64> = v.iter().map(|&x| f64::from(x)).collect();
            let norm = wide.iter().map(|x| x * x).sum::<f64>().sqrt();
            let norm = if norm == 0.0 { 1.0 } else { norm };
            wide.into_iter().map(|x| x / norm).collect()
        })
        .collect()
}

/// Cosine similarity of two unit vectors (plain dot product)
pub fn cosine(u: &[f64], v: &[f64]) -> f64 {
    u.iter().zip(v.iter()).map(|(a, b)| a * b).sum()
}

/// Check that every vector shares the first vector's dimension
pub fn check_dimensions<T>(vectors: &[Vec<T>]) -> Result<()> {
    let Some(first) = vectors.first() else {
        return Ok(());
    };
    let expected = first.len();
    for (index, v) in vectors.iter().enumerate() {
        if v.len() != expected {
            return Err(DedupError::DimensionMismatch {
                index,
                expected,
                actual: v.len(),
            });
        }
    }
    Ok(())
}

/// Merge edges and review candidates for one set of vectors
#[derive(Debug, Clone, Default)]
pub struct SimilarityGraph {
    /// Number of vectors the graph was built from
    pub n: usize,
    pub merge_edges: Vec<SimilarityEdge>,
    /// Best review-zone neighbour per index, keyed by the lower index
    pub review_candidates: BTreeMap<usize, SimilarityEdge>,
}

impl SimilarityGraph {
    /// Build the graph from unit vectors
    pub fn build(unit_vectors: &[Vec<f64>], thresholds: Thresholds) -> Result<Self> {
        check_dimensions(unit_vectors)?;

        let n = unit_vectors.len();
        let mut merge_edges = Vec::new();
        let mut review_candidates = BTreeMap::new();

        for i in 0..n {
            let mut best: Option<SimilarityEdge> = None;
            for j in (i + 1)..n {
                let score = cosine(&unit_vectors[i], &unit_vectors[j]);
                if thresholds.merges(score) {
                    merge_edges.push(SimilarityEdge { i, j, score });
                } else if thresholds.needs_review(score)
                    && best.map_or(true, |b| score > b.score)
                {
                    best = Some(SimilarityEdge { i, j, score });
                }
            }
            if let Some(edge) = best {
                review_candidates.insert(i, edge);
            }
        }

        tracing::info!(
            "Similarity graph: {} vectors, {} pairs compared, {} merge edges, {} review candidates",
            n,
            n * n.saturating_sub(1) / 2,
            merge_edges.len(),
            review_candidates.len()
        );

        Ok(Self {
            n,
            merge_edges,
            review_candidates,
        })
    }

    /// Merge edges as index pairs
    pub fn merge_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.merge_edges.iter().map(|e| (e.i, e.j))
    }
}
