//! Duplicate clusters as connected components of the merge graph
//!
//! Merging is transitive: if A–B and B–C both clear the merge threshold,
//! A, B and C share a cluster even when A–C does not. Chains through a
//! bridging ticket are kept as-is and surface in the cluster membership
//! output for audit.

use serde::{Deserialize, Serialize};

/// Disjoint-set forest with path compression and union by rank
#[derive(Debug, Clone)]
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, mut a: usize) -> usize {
        while self.parent[a] != a {
            self.parent[a] = self.parent[self.parent[a]];
            a = self.parent[a];
        }
        a
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] = self.rank[ra].saturating_add(1);
            }
        }
    }
}

/// One cluster of ticket indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// Position in cluster output order
    pub id: usize,
    /// Member indices in ascending order
    pub members: Vec<usize>,
}

impl Cluster {
    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }
}

/// Partition `[0, n)` into clusters joined by `edges`
///
/// Clusters are ordered by their smallest member and members are ascending,
/// so output is deterministic for a given edge set. Edges with an endpoint
/// outside `[0, n)` are ignored.
pub fn connected_components(
    n: usize,
    edges: impl IntoIterator<Item = (usize, usize)>,
) -> Vec<Cluster> {
    let mut forest = UnionFind::new(n);
    for (a, b) in edges {
        if a < n && b < n {
            forest.union(a, b);
        } else {
            tracing::warn!("Ignoring edge ({}, {}) outside of {} tickets", a, b, n);
        }
    }

    // root -> position in output, assigned on first sighting
    let mut slot_of_root: Vec<Option<usize>> = vec![None; n];
    let mut clusters: Vec<Cluster> = Vec::new();

    for i in 0..n {
        let root = forest.find(i);
        let slot = match slot_of_root[root] {
            Some(slot) => slot,
            None => {
                let slot = clusters.len();
                slot_of_root[root] = Some(slot);
                clusters.push(Cluster {
                    id: slot,
                    members: Vec::new(),
                });
                slot
            }
        };
        clusters[slot].members.push(i);
    }

    tracing::debug!(
        "Clustered {} items into {} clusters ({} multi-member)",
        n,
        clusters.len(),
        clusters.iter().filter(|c| !c.is_singleton()).count()
    );

    clusters
}
