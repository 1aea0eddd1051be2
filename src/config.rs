//! Configuration for the graph store connection.
//!
//! Loaded from a TOML file; every field has a default so an empty file (or
//! no file at all) yields a working local setup.
//!
//! ```toml
//! [store]
//! endpoint = "http://dgraph-alpha:8080"
//! timeout_ms = 5000
//! max_retries = 5
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{AnalyzerError, Result};
use crate::store::RetryPolicy;

/// Environment variable that overrides `store.endpoint`.
pub const ENDPOINT_ENV: &str = "ANALYZER_DGRAPH_ENDPOINT";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the Dgraph alpha HTTP endpoint.
    pub endpoint: String,
    /// Per-request timeout.
    pub timeout_ms: u64,
    /// Retries after the first attempt for transient failures.
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080".to_string(),
            timeout_ms: 10_000,
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 2_000,
        }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        }
    }
}

impl AnalyzerConfig {
    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        debug!(path = %path.display(), endpoint = %config.store.endpoint, "loaded config");
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| AnalyzerError::Config(e.to_string()))
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_endpoint_override(std::env::var(ENDPOINT_ENV).ok())
    }

    fn with_endpoint_override(mut self, endpoint: Option<String>) -> Self {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            debug!(%endpoint, "endpoint overridden from environment");
            self.store.endpoint = endpoint;
        }
        self
    }
}
