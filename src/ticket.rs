//! Ticket records and input loading
//!
//! Input is either a top-level JSON array of tickets or an object with a
//! `tickets` array. Fields other than the five the engine reads are kept
//! verbatim so canonical output can echo the full record.

use crate::error::{DedupError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// One normalized support ticket
///
/// Never mutated by the pipeline; stages address tickets by index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketRecord {
    /// String or integer id, echoed back as-is
    #[serde(default)]
    pub ticket_id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    /// Any further fields present in the input
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TicketRecord {
    /// Build a ticket from its core fields
    pub fn new(
        ticket_id: impl Into<Value>,
        date: &str,
        subject: &str,
        problem: &str,
        solution: &str,
    ) -> Self {
        Self {
            ticket_id: ticket_id.into(),
            date: Some(date.to_string()),
            subject: Some(subject.to_string()),
            problem: Some(problem.to_string()),
            solution: Some(solution.to_string()),
            extra: Map::new(),
        }
    }

    /// Ticket id rendered as a string (`"123"` for both `123` and `"123"`)
    pub fn id_string(&self) -> String {
        match &self.ticket_id {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    pub fn subject(&self) -> &str {
        self.subject.as_deref().unwrap_or("")
    }

    pub fn problem(&self) -> &str {
        self.problem.as_deref().unwrap_or("")
    }

    pub fn solution(&self) -> &str {
        self.solution.as_deref().unwrap_or("")
    }

    pub fn date(&self) -> &str {
        self.date.as_deref().unwrap_or("")
    }
}

/// Accepted top-level input shapes
#[derive(Deserialize)]
#[serde(untagged)]
enum TicketFile {
    List(Vec<TicketRecord>),
    Wrapped { tickets: Vec<TicketRecord> },
}

/// Parse tickets from a JSON string
pub fn parse_tickets(content: &str, origin: &Path) -> Result<Vec<TicketRecord>> {
    let value: Value = serde_json::from_str(content).map_err(|e| DedupError::Json {
        source: e,
        context: format!("Failed to parse input file: {:?}", origin),
    })?;

    match serde_json::from_value::<TicketFile>(value) {
        Ok(TicketFile::List(tickets)) | Ok(TicketFile::Wrapped { tickets }) => Ok(tickets),
        Err(e) => Err(DedupError::InputFormat {
            path: origin.to_path_buf(),
            message: format!(
                "expected a top-level array or {{\"tickets\": [...]}} of ticket objects ({})",
                e
            ),
        }),
    }
}

/// Load tickets from a JSON file
pub fn load_tickets(path: &Path) -> Result<Vec<TicketRecord>> {
    let content = std::fs::read_to_string(path).map_err(|e| DedupError::Io {
        source: e,
        context: format!("Failed to read input file: {:?}", path),
    })?;

    let tickets = parse_tickets(&content, path)?;
    tracing::info!("Loaded {} tickets from {:?}", tickets.len(), path);
    Ok(tickets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn origin() -> PathBuf {
        PathBuf::from("tickets.json")
    }

    #[test]
    fn test_top_level_array() {
        let json = r#"[{"ticket_id": 1, "subject": "Printer", "problem": "jam", "solution": ""}]"#;
        let tickets = parse_tickets(json, &origin()).unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].id_string(), "1");
        assert_eq!(tickets[0].subject(), "Printer");
        assert_eq!(tickets[0].date(), "");
    }

    #[test]
    fn test_wrapped_tickets() {
        let json = r#"{"tickets": [{"ticket_id": "A-7", "date": "2024-01-02"}]}"#;
        let tickets = parse_tickets(json, &origin()).unwrap();
        assert_eq!(tickets[0].id_string(), "A-7");
        assert_eq!(tickets[0].date(), "2024-01-02");
    }

    #[test]
    fn test_unsupported_shape() {
        let json = r#"{"items": []}"#;
        let err = parse_tickets(json, &origin()).unwrap_err();
        assert!(matches!(err, DedupError::InputFormat { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_tickets("not json", &origin()).unwrap_err();
        assert!(matches!(err, DedupError::Json { .. }));
    }

    #[test]
    fn test_null_fields_and_extras() {
        let json = r#"[{"ticket_id": 5, "solution": null, "category": "HR"}]"#;
        let tickets = parse_tickets(json, &origin()).unwrap();
        assert_eq!(tickets[0].solution(), "");
        assert_eq!(tickets[0].extra.get("category"), Some(&Value::from("HR")));
    }
}
