//! The `dedupe` command: configuration layering, the run, and what gets printed

use crate::cli::Cli;
use crate::config::{Config, ConfigValidator, Environment};
use crate::embedding::{Credentials, EmbeddingProvider, EmbeddingSettings};
use crate::error::{DedupError, Result};
use crate::output::{render_dry_run, write_outputs, OutputPaths};
use crate::pipeline::{self, DedupOptions};
use crate::ticket::load_tickets;
use std::io::Write;
use std::path::PathBuf;

/// Run the command, printing user-facing output to `out`
///
/// `connect` builds the embedding provider once configuration and
/// credentials are resolved. Credentials are checked before the input is
/// read, and nothing is written for an empty input or a dry run.
pub fn cmd_dedupe<P, C, W>(cli: &Cli, env: &Environment, connect: C, out: &mut W) -> Result<()>
where
    P: EmbeddingProvider,
    C: FnOnce(&EmbeddingSettings, &Credentials) -> Result<P>,
    W: Write,
{
    let config = load_config(cli, env)?;
    let credentials = config.credentials(|name| env.get(name))?;

    let tickets = load_tickets(&cli.input)?;
    if tickets.is_empty() {
        emit(out, "No tickets in input.\n")?;
        return Ok(());
    }

    let settings = config.embedding_settings();
    let provider = connect(&settings, &credentials)?;

    let options = DedupOptions {
        thresholds: config.thresholds()?,
        batch_size: config.dedup.batch_size,
        max_pairs: config.dedup.max_pairs,
        subject_max_chars: config.dedup.subject_max_chars,
        api_base: settings.api_base.clone(),
    };
    let report = pipeline::run(&tickets, &provider, &options)?;

    if cli.dry_run {
        return emit(out, &render_dry_run(&report.summary, &report.records));
    }

    let paths = OutputPaths {
        canonical: cli.out.clone(),
        clusters: cli.groups_out.clone(),
        review: cli.review_out.clone(),
    };
    write_outputs(
        &paths,
        &report.canonical,
        &report.records,
        &report.review_rows,
        &report.summary,
    )?;

    emit(
        out,
        &format!(
            "{}Wrote canonical tickets: {}\nWrote cluster breakdown: {}\nWrote needs-review pairs: {}\n",
            report.summary,
            paths.canonical.display(),
            paths.clusters.display(),
            paths.review.display()
        ),
    )
}

/// Defaults, then the config file, then environment, then flags
pub fn load_config(cli: &Cli, env: &Environment) -> Result<Config> {
    let mut config = match config_path(cli.config.clone()) {
        Some(path) => {
            tracing::debug!("Loading configuration from {:?}", path);
            Config::load(&path)?
        }
        None => Config::default(),
    };

    config.apply_env_overrides(|name| env.get(name));
    config.apply_prefixed_overrides(env.pairs());

    if let Some(threshold) = cli.threshold {
        config.dedup.threshold = threshold;
    }
    if let Some(threshold_low) = cli.threshold_low {
        config.dedup.threshold_low = threshold_low;
    }
    if let Some(max_pairs) = cli.max_pairs {
        config.dedup.max_pairs = Some(max_pairs);
    }
    if let Some(batch_size) = cli.batch_size {
        config.dedup.batch_size = batch_size;
    }

    ConfigValidator::validate(&config)?;
    Ok(config)
}

/// An explicit path must exist; the default path is optional
fn config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }
    match Config::default_path() {
        Ok(path) if path.exists() => Some(path),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("No default config location: {}", e);
            None
        }
    }
}

fn emit<W: Write>(out: &mut W, text: &str) -> Result<()> {
    out.write_all(text.as_bytes())
        .and_then(|_| out.flush())
        .map_err(|e| DedupError::Io {
            source: e,
            context: "Failed to write to stdout".to_string(),
        })
}
