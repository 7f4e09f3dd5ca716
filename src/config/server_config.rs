//! HTTP server configuration parsing from environment variables.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServerEnvConfig {
    pub bind_address: String,
    pub port: u16,
    pub request_timeout: Duration,
}

impl Default for ServerEnvConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8000,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ServerEnvConfig {
    pub fn from_env() -> Result<Self> {
        let port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .context("Failed to parse SERVER_PORT")?;
        let timeout_secs = env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .context("Failed to parse REQUEST_TIMEOUT_SECS")?;

        Ok(Self {
            bind_address: env::var("SERVER_BIND_ADDRESS")
                .unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
