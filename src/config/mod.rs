//! Runtime configuration.
//!
//! All knobs have defaults tuned for interactive use; a TOML file can
//! override any subset of them. Missing fields fall back to defaults.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::app::error::{EmberError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Overall deadline for one aggregation call, in seconds.
    pub aggregate_timeout_secs: u64,

    /// Per-source fetch timeout, in seconds. Kept below the aggregation
    /// deadline so one slow upstream cannot consume the whole budget.
    pub source_timeout_secs: u64,

    /// Timeout for a full article-page fetch, in seconds.
    pub article_timeout_secs: u64,

    /// Maximum redirects followed on article-page fetches.
    pub max_redirects: usize,

    /// Cache TTL for a fully-completed aggregation, in seconds.
    pub full_ttl_secs: u64,

    /// Cache TTL for a deadline-truncated aggregation, in seconds.
    pub partial_ttl_secs: u64,

    /// Interval between background cache sweeps, in seconds.
    pub cache_sweep_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            aggregate_timeout_secs: 8,
            source_timeout_secs: 6,
            article_timeout_secs: 15,
            max_redirects: 5,
            full_ttl_secs: 300,
            partial_ttl_secs: 120,
            cache_sweep_interval_secs: 60,
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, or defaults when the file is absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| EmberError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn aggregate_timeout(&self) -> Duration {
        Duration::from_secs(self.aggregate_timeout_secs)
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }

    pub fn article_timeout(&self) -> Duration {
        Duration::from_secs(self.article_timeout_secs)
    }

    pub fn full_ttl(&self) -> Duration {
        Duration::from_secs(self.full_ttl_secs)
    }

    pub fn partial_ttl(&self) -> Duration {
        Duration::from_secs(self.partial_ttl_secs)
    }

    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_interval_secs)
    }
}
