//! ticket-dedup - semantic duplicate detection for support tickets
//!
//! Embeds normalized ticket text through an OpenAI-compatible service, links
//! pairs whose cosine similarity clears a threshold, groups them with
//! union-find, and emits one canonical ticket per group plus borderline pairs
//! for manual review.

pub mod cli;
pub mod cluster;
pub mod command;
pub mod config;
pub mod embedding;
pub mod error;
pub mod graph;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod representative;
pub mod ticket;

pub use error::{DedupError, Result};
