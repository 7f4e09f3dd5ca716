//! Observability configuration parsing from environment variables.

use anyhow::{Context, Result};
use std::env;

/// Observability environment configuration
#[derive(Debug, Clone)]
pub struct ObservabilityEnvConfig {
    /// Serve Prometheus text on `GET /metrics`
    pub metrics_enabled: bool,
}

impl Default for ObservabilityEnvConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

impl ObservabilityEnvConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            metrics_enabled: env::var("METRICS_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .parse::<bool>()
                .context("Failed to parse METRICS_ENABLED")?,
        })
    }
}
