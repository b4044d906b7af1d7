use crate::config::Config;
use crate::error::{DedupError, Result, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration, collecting every problem found
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_embedding(config, &mut errors);
        Self::validate_dedup(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DedupError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_embedding(config: &Config, errors: &mut Vec<ValidationError>) {
        let embedding = &config.embedding;

        if embedding.model.trim().is_empty() {
            errors.push(ValidationError::new(
                "embedding.model",
                "Model name cannot be empty",
            ));
        }

        if embedding.api_base.trim().is_empty() {
            errors.push(ValidationError::new(
                "embedding.api_base",
                "API base URL cannot be empty",
            ));
        } else if !embedding.api_base.trim().starts_with("http://")
            && !embedding.api_base.trim().starts_with("https://")
        {
            errors.push(ValidationError::new(
                "embedding.api_base",
                format!("API base must be an http(s) URL, got '{}'", embedding.api_base),
            ));
        }

        if embedding.request_timeout_secs == 0 {
            errors.push(ValidationError::new(
                "embedding.request_timeout_secs",
                "Request timeout must be greater than 0",
            ));
        }

        if embedding.backoff_base_ms > embedding.backoff_cap_ms {
            errors.push(ValidationError::new(
                "embedding.backoff_base_ms",
                format!(
                    "Backoff base ({}ms) exceeds backoff cap ({}ms)",
                    embedding.backoff_base_ms, embedding.backoff_cap_ms
                ),
            ));
        }
    }

    fn validate_dedup(config: &Config, errors: &mut Vec<ValidationError>) {
        let dedup = &config.dedup;

        for (path, value) in [
            ("dedup.threshold", dedup.threshold),
            ("dedup.threshold_low", dedup.threshold_low),
        ] {
            if !(-1.0..=1.0).contains(&value) {
                errors.push(ValidationError::new(
                    path,
                    format!("Similarity threshold must be between -1.0 and 1.0, got {}", value),
                ));
            }
        }

        if dedup.threshold_low > dedup.threshold {
            errors.push(ValidationError::new(
                "dedup.threshold_low",
                format!(
                    "Review floor ({}) must not exceed merge threshold ({})",
                    dedup.threshold_low, dedup.threshold
                ),
            ));
        }

        if dedup.batch_size == 0 {
            errors.push(ValidationError::new(
                "dedup.batch_size",
                "Batch size must be greater than 0",
            ));
        }

        if dedup.subject_max_chars == 0 {
            errors.push(ValidationError::new(
                "dedup.subject_max_chars",
                "Subject length limit must be greater than 0",
            ));
        }
    }
}
