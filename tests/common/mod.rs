//! Shared fixtures: a tag-keyed fake embedding service and sample tickets
#![allow(dead_code)]

use ticket_dedup::embedding::{EmbeddingError, EmbeddingProvider};
use ticket_dedup::ticket::TicketRecord;

/// `topicN ...` embeds as the N-th basis vector, `angleD ...` as a unit
/// vector at D degrees in the plane
pub struct TagProvider;

impl TagProvider {
    fn vector(text: &str) -> Vec<f32> {
        let tag = text.split_whitespace().next().unwrap_or("");
        let mut v = vec![0.0f32; 16];
        if let Some(n) = tag.strip_prefix("topic").and_then(|n| n.parse::<usize>().ok()) {
            v[n] = 1.0;
        } else if let Some(d) = tag.strip_prefix("angle").and_then(|d| d.parse::<f64>().ok()) {
            let rad = d.to_radians();
            v[0] = rad.cos() as f32;
            v[1] = rad.sin() as f32;
        } else {
            v[15] = 1.0;
        }
        v
    }
}

impl EmbeddingProvider for TagProvider {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn model_name(&self) -> &str {
        "tag-provider"
    }
}

pub fn ticket(id: u64, date: &str, subject: &str, solution: &str) -> TicketRecord {
    TicketRecord::new(id, date, subject, "", solution)
}

/// Ten tickets, two duplicate pairs
pub fn ten_tickets() -> Vec<TicketRecord> {
    vec![
        ticket(100, "2024-02-01", "topic0 VPN disconnects", "reinstall client"),
        ticket(101, "2024-02-03", "topic0 VPN keeps dropping", "update the VPN client"),
        ticket(102, "2024-01-10", "topic1 Printer jammed", ""),
        ticket(103, "2024-01-12", "topic1 Printer paper jam", "clear tray 2"),
        ticket(104, "2024-03-01", "topic2 Mailbox full", ""),
        ticket(105, "2024-03-02", "topic3 Password reset", ""),
        ticket(106, "2024-03-03", "topic4 Teams audio", ""),
        ticket(107, "2024-03-04", "topic5 SAP login", ""),
        ticket(108, "2024-03-05", "topic6 Laptop battery", ""),
        ticket(109, "2024-03-06", "topic7 Monitor flicker", ""),
    ]
}
