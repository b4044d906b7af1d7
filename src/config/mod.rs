//! Configuration management
//!
//! Settings come from, in increasing priority: built-in defaults, an optional
//! TOML file, environment variables, and command-line flags. The environment
//! is read once at startup; the resulting values are handed to the embedding
//! client and pipeline explicitly.

use crate::embedding::{Credentials, EmbeddingSettings, RetryPolicy};
use crate::error::{DedupError, Result};
use crate::graph::Thresholds;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod validator;

pub use validator::ConfigValidator;

/// Accepted API key variables, first non-empty wins
pub const API_KEY_VARS: &[&str] = &["SCW_API_KEY", "SCW_SECRET_KEY"];
const API_BASE_VARS: &[&str] = &["SCW_OPENAI_BASE_URL", "OPENAI_BASE_URL", "OPENAI_API_BASE"];
const PROJECT_VARS: &[&str] = &["SCW_PROJECT_ID", "SCW_DEFAULT_PROJECT_ID"];
const ORGANIZATION_VARS: &[&str] = &["SCW_ORGANIZATION_ID", "SCW_DEFAULT_ORGANIZATION_ID"];
const REGION_VARS: &[&str] = &["SCW_REGION"];
const MODEL_VARS: &[&str] = &["SCW_EMBEDDING_MODEL", "EMBEDDING_MODEL"];

/// Prefix for generic `DEDUP_SECTION__KEY` overrides
const ENV_PREFIX: &str = "DEDUP_";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub dedup: DedupConfig,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
}

/// Embedding service configuration (credentials live in the environment only)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub api_base: String,
    pub region: Option<String>,
    pub project_id: Option<String>,
    pub organization_id: Option<String>,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub backoff_cap_ms: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "bge-multilingual-gemma2".to_string(),
            api_base: "https://api.scaleway.ai/v1".to_string(),
            region: None,
            project_id: None,
            organization_id: None,
            request_timeout_secs: 60,
            max_retries: 5,
            backoff_base_ms: 1000,
            backoff_cap_ms: 16000,
        }
    }
}

/// Clustering and output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub threshold: f64,
    pub threshold_low: f64,
    pub batch_size: usize,
    pub max_pairs: Option<usize>,
    pub subject_max_chars: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            threshold: 0.84,
            threshold_low: 0.78,
            batch_size: 64,
            max_pairs: None,
            subject_max_chars: 120,
        }
    }
}

impl Config {
    /// Load configuration from a file
    ///
    /// Not validated; callers validate after applying overrides.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DedupError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| DedupError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment variable overrides from a variable lookup
    ///
    /// Provider variables (`SCW_*`, `OPENAI_*`, `EMBEDDING_MODEL`) win over
    /// file values; `DEDUP_SECTION__KEY` covers the remaining settings.
    pub fn apply_env_overrides<F>(&mut self, vars: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base) = first_set(&vars, API_BASE_VARS) {
            self.embedding.api_base = base;
        }
        if let Some(project) = first_set(&vars, PROJECT_VARS) {
            self.embedding.project_id = Some(project);
        }
        if let Some(org) = first_set(&vars, ORGANIZATION_VARS) {
            self.embedding.organization_id = Some(org);
        }
        if let Some(region) = first_set(&vars, REGION_VARS) {
            self.embedding.region = Some(region);
        }
        if let Some(model) = first_set(&vars, MODEL_VARS) {
            self.embedding.model = model;
        }
    }

    /// Apply `DEDUP_SECTION__KEY=value` overrides from the process environment
    pub fn apply_prefixed_overrides(&mut self, vars: impl IntoIterator<Item = (String, String)>) {
        for (key, value) in vars {
            if let Some(config_key) = key.strip_prefix(ENV_PREFIX) {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "DEDUP__THRESHOLD" => self.dedup.threshold = parse_value(path, value)?,
            "DEDUP__THRESHOLD_LOW" => self.dedup.threshold_low = parse_value(path, value)?,
            "DEDUP__BATCH_SIZE" => self.dedup.batch_size = parse_value(path, value)?,
            "DEDUP__MAX_PAIRS" => self.dedup.max_pairs = Some(parse_value(path, value)?),
            "EMBEDDING__MODEL" => self.embedding.model = value.to_string(),
            "EMBEDDING__API_BASE" => self.embedding.api_base = value.to_string(),
            "EMBEDDING__REQUEST_TIMEOUT_SECS" => {
                self.embedding.request_timeout_secs = parse_value(path, value)?
            }
            "EMBEDDING__MAX_RETRIES" => self.embedding.max_retries = parse_value(path, value)?,
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Thresholds as a validated pair
    pub fn thresholds(&self) -> Result<Thresholds> {
        Thresholds::new(self.dedup.threshold, self.dedup.threshold_low)
    }

    /// Settings for the embedding client
    pub fn embedding_settings(&self) -> EmbeddingSettings {
        EmbeddingSettings {
            api_base: self.embedding.api_base.clone(),
            model: self.embedding.model.clone(),
            region: self.embedding.region.clone(),
            request_timeout: Duration::from_secs(self.embedding.request_timeout_secs),
            retry: RetryPolicy {
                max_retries: self.embedding.max_retries,
                backoff_base: Duration::from_millis(self.embedding.backoff_base_ms),
                backoff_cap: Duration::from_millis(self.embedding.backoff_cap_ms),
            },
        }
    }

    /// Resolve credentials; a missing API key is fatal
    pub fn credentials<F>(&self, vars: F) -> Result<Credentials>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = first_set(&vars, API_KEY_VARS).ok_or_else(|| DedupError::MissingCredentials {
            tried: API_KEY_VARS.iter().map(|v| v.to_string()).collect(),
        })?;

        Ok(Credentials {
            api_key,
            project_id: self.embedding.project_id.clone(),
            organization_id: self.embedding.organization_id.clone(),
        })
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| DedupError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("ticket-dedup").join("config.toml"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: "1.0.0".to_string(),
            },
            embedding: EmbeddingConfig::default(),
            dedup: DedupConfig::default(),
        }
    }
}

/// Environment variables captured once at startup
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Snapshot of the process environment
    pub fn from_process() -> Self {
        Self::from_pairs(std::env::vars())
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }

    /// All variables, in name order
    pub fn pairs(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.vars.iter().map(|(k, v)| (k.clone(), v.clone()))
    }
}

fn first_set<F>(vars: &F, names: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    names
        .iter()
        .filter_map(|name| vars(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

fn parse_value<T: std::str::FromStr>(path: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| DedupError::InvalidConfigValue {
            path: path.to_string(),
            message: format!("Cannot parse '{}'", value),
        })
}
