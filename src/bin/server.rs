//! solarcast HTTP server
//!
//! Loads the model bundle and weather table once, then serves predictions.
//!
//! # Usage
//! ```sh
//! SOLARCAST_MODELS_DIR=models cargo run --bin server
//! ```
//!
//! # Environment Variables
//! - `SOLARCAST_MODELS_DIR` - Model bundle directory (default: models)
//! - `SOLARCAST_WEATHER_CSV` - City weather table (default: data/city_weather.csv)
//! - `SERVER_BIND_ADDRESS` / `SERVER_PORT` - Listen address (default: 127.0.0.1:8000)
//! - `METRICS_ENABLED` - Serve `/metrics` (default: true)

use anyhow::{Context, Result};
use solarcast::application::ServiceBootstrap;
use solarcast::config::Config;
use solarcast::infrastructure::Metrics;
use solarcast::interfaces::api::{AppState, create_router};
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("solarcast server {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: models={:?}, weather={:?}",
        config.artifacts.models_dir, config.artifacts.weather_csv
    );

    let service = ServiceBootstrap::init(&config.artifacts).context("Failed to load artifacts")?;

    let metrics = if config.observability.metrics_enabled {
        Some(Metrics::new()?)
    } else {
        info!("Metrics disabled.");
        None
    };

    let state = Arc::new(AppState::new(service, metrics));
    let app = create_router(state, config.server.request_timeout);

    let address = config.server.socket_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received. Exiting...");
        })
        .await?;

    Ok(())
}
