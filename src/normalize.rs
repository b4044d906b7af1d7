//! Text normalization for embedding input
//!
//! Lowercases, strips URLs and transient identifiers (helpdesk file links,
//! personnel numbers, reference codes) that would otherwise pull genuine
//! duplicates apart, and collapses whitespace. Output is deterministic.

use crate::error::{DedupError, Result};
use crate::ticket::TicketRecord;
use regex::Regex;

/// Patterns removed from the lowercased text, applied in order
const STRIP_PATTERNS: &[(&str, &str)] = &[
    ("url", r"https?://\S+"),
    ("file_link", r"\bfile/get/\d+\b"),
    ("nn_code", r"\bnn\d+\b"),
    ("personnel_number", r"\bpers?nr?\s*[:#-]?\s*\d+\b"),
    ("per_reference", r"\bper\.\d+\b"),
];

/// Separator placed between subject, problem and solution
const FIELD_SEPARATOR: &str = " . ";

/// Compiled normalizer
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    strip: Vec<Regex>,
    whitespace: Regex,
}

impl TextNormalizer {
    /// Compile the normalization patterns
    pub fn new() -> Result<Self> {
        let strip = STRIP_PATTERNS
            .iter()
            .map(|(name, pattern)| {
                Regex::new(pattern).map_err(|e| {
                    DedupError::Config(format!("Invalid normalization pattern '{}': {}", name, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let whitespace = Regex::new(r"\s+")
            .map_err(|e| DedupError::Config(format!("Invalid whitespace pattern: {}", e)))?;

        Ok(Self { strip, whitespace })
    }

    /// Normalize a single piece of text
    pub fn normalize(&self, text: &str) -> String {
        let mut t = text.to_lowercase();
        for regex in &self.strip {
            t = regex.replace_all(&t, " ").into_owned();
        }
        self.whitespace.replace_all(&t, " ").trim().to_string()
    }

    /// Build the string submitted for embedding
    pub fn ticket_text(&self, ticket: &TicketRecord) -> String {
        let joined = [ticket.subject(), ticket.problem(), ticket.solution()].join(FIELD_SEPARATOR);
        self.normalize(&joined)
    }
}
