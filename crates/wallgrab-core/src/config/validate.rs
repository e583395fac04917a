//! Configuration validation with range checks.
//!
//! Runs eagerly before any network activity; a failure here is the only
//! error that aborts a run.

use std::collections::HashSet;

use crate::error::ConfigError;
use crate::types::Category;

use super::{Config, MAX_CONCURRENCY};

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let download = &self.download;
        if download.concurrency == 0 || download.concurrency > MAX_CONCURRENCY {
            return Err(ConfigError::ValidationError(format!(
                "download.concurrency must be between 1 and {MAX_CONCURRENCY} (got {})",
                download.concurrency
            )));
        }
        if download.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "download.timeout_secs must be > 0".into(),
            ));
        }
        if download.max_size_bytes == Some(0) {
            return Err(ConfigError::ValidationError(
                "download.max_size_bytes must be > 0 when set".into(),
            ));
        }

        let filter = &self.filter;
        if !filter.min_aspect.is_finite() || filter.min_aspect <= 0.0 {
            return Err(ConfigError::ValidationError(
                "filter.min_aspect must be a positive number".into(),
            ));
        }
        if !filter.max_aspect.is_finite() {
            return Err(ConfigError::ValidationError(
                "filter.max_aspect must be a finite number".into(),
            ));
        }
        if filter.min_aspect > filter.max_aspect {
            return Err(ConfigError::ValidationError(format!(
                "filter.min_aspect ({}) must be <= filter.max_aspect ({})",
                filter.min_aspect, filter.max_aspect
            )));
        }

        let mut seen = HashSet::new();
        for rule in &self.categories.rules {
            if rule.category == Category::Uncategorized {
                return Err(ConfigError::ValidationError(
                    "categories.rules cannot target \"uncategorized\"".into(),
                ));
            }
            if !seen.insert(rule.category) {
                return Err(ConfigError::ValidationError(format!(
                    "categories.rules lists \"{}\" more than once",
                    rule.category
                )));
            }
            if rule.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(ConfigError::ValidationError(format!(
                    "categories.rules for \"{}\" contains an empty keyword",
                    rule.category
                )));
            }
        }
        Ok(())
    }
}
