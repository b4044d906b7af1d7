//! CLI definition and parsing
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "dedupe",
    version,
    about = "Find semantic duplicates among support tickets",
    long_about = "Embeds every ticket through an OpenAI-compatible embeddings service, merges tickets \
                  whose cosine similarity clears the threshold, and writes one canonical ticket per \
                  duplicate group plus a CSV of borderline pairs for manual review."
)]
pub struct Cli {
    /// Config file path (defaults to ~/.config/ticket-dedup/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Input tickets JSON (array or {"tickets": [...]})
    #[arg(short, long, value_name = "FILE", default_value = "tickets.json")]
    pub input: PathBuf,

    /// Canonical tickets output
    #[arg(short, long, value_name = "FILE", default_value = "tickets_dedup.json")]
    pub out: PathBuf,

    /// Cluster membership output
    #[arg(long, value_name = "FILE", default_value = "duplicate_groups.json")]
    pub groups_out: PathBuf,

    /// Borderline pairs CSV output
    #[arg(long, value_name = "FILE", default_value = "needs_review.csv")]
    pub review_out: PathBuf,

    /// Cosine similarity at or above which tickets are merged
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Lower bound of the needs-review band
    #[arg(long)]
    pub threshold_low: Option<f64>,

    /// Keep at most this many review pairs
    #[arg(long)]
    pub max_pairs: Option<usize>,

    /// Texts per embedding request
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Print the summary and largest clusters without writing files
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
