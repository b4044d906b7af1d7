//! Output artifacts
//!
//! - canonical list: one record per cluster (the representative plus the ids
//!   of its duplicates)
//! - cluster membership: full audit trail of every cluster
//! - review CSV: borderline pairs for manual review
//! - summary sidecar next to the canonical list
//!
//! Files are only written once the whole run succeeded, each through a
//! temporary file in the target directory that is renamed into place.

use crate::cluster::Cluster;
use crate::error::{DedupError, Result};
use crate::graph::SimilarityEdge;
use crate::ticket::TicketRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Header row of the review CSV
pub const REVIEW_HEADER: [&str; 5] = [
    "ticket_id_A",
    "ticket_id_B",
    "similarity",
    "subject_A",
    "subject_B",
];

const CSV_DELIMITER: char = ';';

/// Clusters listed in a dry run
const DRY_RUN_TOP_CLUSTERS: usize = 5;

/// Representative ticket with its cluster's duplicates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalTicket {
    #[serde(flatten)]
    pub ticket: TicketRecord,
    pub duplicates: Vec<String>,
    pub cluster_id: usize,
}

/// Complete membership of one cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub cluster_id: usize,
    pub representative_index: usize,
    pub representative_ticket_id: String,
    pub member_indices: Vec<usize>,
    pub member_ticket_ids: Vec<String>,
    pub size: usize,
}

/// One borderline pair
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRow {
    pub ticket_id_a: String,
    pub ticket_id_b: String,
    pub similarity: f64,
    pub subject_a: String,
    pub subject_b: String,
}

/// Run statistics, printed and written to the summary sidecar
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub input_tickets: usize,
    pub threshold: f64,
    pub threshold_low: f64,
    pub clusters: usize,
    pub multi_member_clusters: usize,
    pub canonical_tickets: usize,
    pub review_pairs: usize,
    pub model: String,
    pub api_base: String,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Deduplication summary:")?;
        writeln!(f, "- Input tickets: {}", self.input_tickets)?;
        writeln!(f, "- Threshold (auto-merge): {:?}", self.threshold)?;
        writeln!(f, "- Threshold low (needs review): {:?}", self.threshold_low)?;
        writeln!(
            f,
            "- Clusters found: {} (with size>1: {})",
            self.clusters, self.multi_member_clusters
        )?;
        writeln!(f, "- Canonical tickets after dedup: {}", self.canonical_tickets)?;
        writeln!(f, "- Borderline review pairs: {}", self.review_pairs)?;
        writeln!(f, "- Embedding model: {}", self.model)?;
        writeln!(f, "- API base: {}", self.api_base)
    }
}

/// Where the artifacts go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub canonical: PathBuf,
    pub clusters: PathBuf,
    pub review: PathBuf,
}

impl OutputPaths {
    /// `<canonical>.summary.txt`
    pub fn summary(&self) -> PathBuf {
        let mut name = self.canonical.clone().into_os_string();
        name.push(".summary.txt");
        PathBuf::from(name)
    }
}

/// Build canonical and cluster records from clusters and their representatives
///
/// `representatives[k]` is the representative index of `clusters[k]`.
/// Canonical records are sorted by cluster size descending, then date
/// ascending; the sort is stable so cluster order breaks remaining ties.
pub fn build_records(
    clusters: &[Cluster],
    representatives: &[usize],
    tickets: &[TicketRecord],
) -> (Vec<CanonicalTicket>, Vec<ClusterRecord>) {
    let mut canonical = Vec::with_capacity(clusters.len());
    let mut records = Vec::with_capacity(clusters.len());

    for (cluster, &rep_idx) in clusters.iter().zip(representatives) {
        let mut ticket = tickets[rep_idx].clone();
        ticket.extra.remove("duplicates");
        ticket.extra.remove("cluster_id");

        let duplicates = cluster
            .members
            .iter()
            .filter(|&&k| k != rep_idx)
            .map(|&k| tickets[k].id_string())
            .collect();

        canonical.push(CanonicalTicket {
            ticket,
            duplicates,
            cluster_id: cluster.id,
        });

        records.push(ClusterRecord {
            cluster_id: cluster.id,
            representative_index: rep_idx,
            representative_ticket_id: tickets[rep_idx].id_string(),
            member_indices: cluster.members.clone(),
            member_ticket_ids: cluster.members.iter().map(|&k| tickets[k].id_string()).collect(),
            size: cluster.size(),
        });
    }

    canonical.sort_by_key(|c| (Reverse(c.duplicates.len() + 1), c.ticket.date().to_string()));

    (canonical, records)
}

/// Review rows in ascending order of the first index, optionally capped
pub fn build_review_rows<'a>(
    candidates: impl IntoIterator<Item = &'a SimilarityEdge>,
    tickets: &[TicketRecord],
    subject_max_chars: usize,
    max_pairs: Option<usize>,
) -> Vec<ReviewRow> {
    let rows = candidates.into_iter().map(|edge| {
        let (a, b) = (&tickets[edge.i], &tickets[edge.j]);
        ReviewRow {
            ticket_id_a: a.id_string(),
            ticket_id_b: b.id_string(),
            similarity: edge.score,
            subject_a: truncate_chars(a.subject(), subject_max_chars),
            subject_b: truncate_chars(b.subject(), subject_max_chars),
        }
    });

    match max_pairs {
        Some(cap) => rows.take(cap).collect(),
        None => rows.collect(),
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn csv_field(field: &str) -> String {
    if field.contains([CSV_DELIMITER, '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn csv_line(fields: &[&str]) -> String {
    let mut line = fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(&CSV_DELIMITER.to_string());
    line.push_str("\r\n");
    line
}

/// Render the review CSV (semicolon-delimited, CRLF line endings)
pub fn render_review_csv(rows: &[ReviewRow]) -> String {
    let mut out = csv_line(&REVIEW_HEADER);
    for row in rows {
        let similarity = format!("{:.4}", row.similarity);
        out.push_str(&csv_line(&[
            row.ticket_id_a.as_str(),
            row.ticket_id_b.as_str(),
            similarity.as_str(),
            row.subject_a.as_str(),
            row.subject_b.as_str(),
        ]));
    }
    out
}

/// Summary plus the largest clusters, as printed by a dry run
pub fn render_dry_run(summary: &RunSummary, records: &[ClusterRecord]) -> String {
    let mut largest: Vec<&ClusterRecord> = records.iter().collect();
    largest.sort_by_key(|r| Reverse(r.size));

    let mut out = summary.to_string();
    out.push('\n');
    for (rank, record) in largest.iter().take(DRY_RUN_TOP_CLUSTERS).enumerate() {
        out.push_str(&format!(
            "Top#{} cluster size={} members={:?}\n",
            rank + 1,
            record.size,
            record.member_ticket_ids
        ));
    }
    out
}

/// Write bytes through a temp file in the same directory, then rename
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| DedupError::Io {
        source: e,
        context: format!("Failed to create temporary file in {:?}", dir),
    })?;
    tmp.write_all(contents).map_err(|e| DedupError::Io {
        source: e,
        context: format!("Failed to write {:?}", path),
    })?;
    tmp.persist(path).map_err(|e| DedupError::Io {
        source: e.error,
        context: format!("Failed to move output into place: {:?}", path),
    })?;

    tracing::debug!("Wrote {} bytes to {:?}", contents.len(), path);
    Ok(())
}

/// Pretty-printed JSON, UTF-8, non-ASCII kept as-is
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value).map_err(|e| DedupError::Json {
        source: e,
        context: format!("Failed to serialize {:?}", path),
    })?;
    json.push('\n');
    write_atomic(path, json.as_bytes())
}

/// Write all four artifacts
pub fn write_outputs(
    paths: &OutputPaths,
    canonical: &[CanonicalTicket],
    records: &[ClusterRecord],
    review_rows: &[ReviewRow],
    summary: &RunSummary,
) -> Result<()> {
    write_json(&paths.canonical, canonical)?;
    write_json(&paths.clusters, records)?;
    write_atomic(&paths.review, render_review_csv(review_rows).as_bytes())?;
    write_atomic(&paths.summary(), summary.to_string().as_bytes())?;

    tracing::info!(
        "Wrote {} canonical tickets, {} clusters, {} review pairs",
        canonical.len(),
        records.len(),
        review_rows.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tickets() -> Vec<TicketRecord> {
        vec![
            TicketRecord::new(10, "2024-03-01", "VPN drops", "disconnects", "update client"),
            TicketRecord::new("11", "2024-01-15", "VPN drops hourly", "drops", "reinstall the client"),
            TicketRecord::new(12, "2024-02-01", "Printer; jammed", "jam", ""),
        ]
    }

    fn clusters() -> Vec<Cluster> {
        vec![
            Cluster {
                id: 0,
                members: vec![0, 1],
            },
            Cluster {
                id: 1,
                members: vec![2],
            },
        ]
    }

    fn summary() -> RunSummary {
        RunSummary {
            input_tickets: 3,
            threshold: 0.84,
            threshold_low: 0.78,
            clusters: 2,
            multi_member_clusters: 1,
            canonical_tickets: 2,
            review_pairs: 1,
            model: "bge-multilingual-gemma2".to_string(),
            api_base: "https://api.scaleway.ai/v1".to_string(),
        }
    }

    #[test]
    fn test_build_records() {
        let tickets = tickets();
        let (canonical, records) = build_records(&clusters(), &[1, 2], &tickets);

        assert_eq!(canonical[0].cluster_id, 0);
        assert_eq!(canonical[0].ticket.id_string(), "11");
        assert_eq!(canonical[0].duplicates, vec!["10".to_string()]);
        assert!(canonical[1].duplicates.is_empty());

        assert_eq!(records[0].member_ticket_ids, vec!["10", "11"]);
        assert_eq!(records[0].representative_index, 1);
        assert_eq!(records[1].size, 1);
    }

    #[test]
    fn test_canonical_sorted_by_size_then_date() {
        let tickets = vec![
            TicketRecord::new(1, "2024-05-01", "a", "", ""),
            TicketRecord::new(2, "2024-01-01", "b", "", ""),
            TicketRecord::new(3, "2024-09-01", "c", "", ""),
            TicketRecord::new(4, "2024-09-02", "d", "", ""),
        ];
        let clusters = vec![
            Cluster {
                id: 0,
                members: vec![0],
            },
            Cluster {
                id: 1,
                members: vec![1],
            },
            Cluster {
                id: 2,
                members: vec![2, 3],
            },
        ];
        let (canonical, _) = build_records(&clusters, &[0, 1, 2], &tickets);
        let order: Vec<usize> = canonical.iter().map(|c| c.cluster_id).collect();
        assert_eq!(order, vec![2, 1, 0]);
    }

    #[test]
    fn test_canonical_json_shape() {
        let tickets = tickets();
        let (canonical, _) = build_records(&clusters(), &[1, 2], &tickets);
        let value = serde_json::to_value(&canonical[0]).unwrap();
        assert_eq!(value["ticket_id"], "11");
        assert_eq!(value["duplicates"], serde_json::json!(["10"]));
        assert_eq!(value["cluster_id"], 0);
    }

    #[test]
    fn test_review_rows_truncate_and_cap() {
        let tickets = tickets();
        let edges = [
            SimilarityEdge {
                i: 0,
                j: 2,
                score: 0.8,
            },
            SimilarityEdge {
                i: 1,
                j: 2,
                score: 0.79,
            },
        ];

        let rows = build_review_rows(edges.iter(), &tickets, 3, None);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].subject_a, "VPN");
        assert_eq!(rows[0].subject_b, "Pri");

        let capped = build_review_rows(edges.iter(), &tickets, 120, Some(1));
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].ticket_id_a, "10");

        assert!(build_review_rows(edges.iter(), &tickets, 120, Some(0)).is_empty());
    }

    #[test]
    fn test_review_csv_format() {
        let rows = vec![ReviewRow {
            ticket_id_a: "10".to_string(),
            ticket_id_b: "12".to_string(),
            similarity: 0.812345,
            subject_a: "VPN drops".to_string(),
            subject_b: "Printer; \"jammed\"".to_string(),
        }];
        let csv = render_review_csv(&rows);
        assert_eq!(
            csv,
            "ticket_id_A;ticket_id_B;similarity;subject_A;subject_B\r\n\
             10;12;0.8123;VPN drops;\"Printer; \"\"jammed\"\"\"\r\n"
        );
    }

    #[test]
    fn test_summary_text() {
        let text = summary().to_string();
        assert!(text.starts_with("Deduplication summary:\n"));
        assert!(text.contains("- Threshold (auto-merge): 0.84\n"));
        assert!(text.contains("- Clusters found: 2 (with size>1: 1)\n"));
        assert!(text.contains("- API base: https://api.scaleway.ai/v1\n"));
    }

    #[test]
    fn test_summary_path() {
        let paths = OutputPaths {
            canonical: PathBuf::from("out/tickets_dedup.json"),
            clusters: PathBuf::from("out/groups.json"),
            review: PathBuf::from("out/review.csv"),
        };
        assert_eq!(paths.summary(), PathBuf::from("out/tickets_dedup.json.summary.txt"));
    }

    #[test]
    fn test_dry_run_listing() {
        let tickets = tickets();
        let (_, records) = build_records(&clusters(), &[1, 2], &tickets);
        let text = render_dry_run(&summary(), &records);
        assert!(text.contains("Top#1 cluster size=2 members=[\"10\", \"11\"]"));
        assert!(text.contains("Top#2 cluster size=1"));
    }

    #[test]
    fn test_write_outputs() {
        let temp = TempDir::new().unwrap();
        let paths = OutputPaths {
            canonical: temp.path().join("canonical.json"),
            clusters: temp.path().join("clusters.json"),
            review: temp.path().join("review.csv"),
        };
        let tickets = tickets();
        let (canonical, records) = build_records(&clusters(), &[1, 2], &tickets);

        write_outputs(&paths, &canonical, &records, &[], &summary()).unwrap();

        let written: Vec<ClusterRecord> =
            serde_json::from_str(&std::fs::read_to_string(&paths.clusters).unwrap()).unwrap();
        assert_eq!(written, records);
        assert!(std::fs::read_to_string(&paths.review)
            .unwrap()
            .starts_with("ticket_id_A;"));
        assert!(paths.summary().exists());
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 4);
    }

    #[test]
    fn test_non_ascii_not_escaped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("u.json");
        write_json(&path, &vec!["Drucker läuft nicht"]).unwrap();
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .contains("Drucker läuft nicht"));
    }
}
