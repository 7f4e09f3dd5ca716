//! Configuration module for solarcast.
//!
//! Structured configuration loaded from environment variables, organized by
//! concern: Artifacts, Server, and Observability.

mod artifact_config;
mod observability_config;
mod server_config;

pub use artifact_config::ArtifactEnvConfig;
pub use observability_config::ObservabilityEnvConfig;
pub use server_config::ServerEnvConfig;

use anyhow::{Context, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub artifacts: ArtifactEnvConfig,
    pub server: ServerEnvConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let artifacts = ArtifactEnvConfig::from_env();
        let server = ServerEnvConfig::from_env().context("Failed to load server config")?;
        let observability =
            ObservabilityEnvConfig::from_env().context("Failed to load observability config")?;

        Ok(Self {
            artifacts,
            server,
            observability,
        })
    }
}
