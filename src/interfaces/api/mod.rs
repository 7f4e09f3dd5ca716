//! HTTP front-end over the prediction service.

pub mod error;
pub mod handlers;

use crate::application::PredictionService;
use crate::infrastructure::observability::Metrics;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Shared, read-only server state
pub struct AppState {
    pub service: PredictionService,
    pub metrics: Option<Metrics>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(service: PredictionService, metrics: Option<Metrics>) -> Self {
        if let Some(m) = &metrics {
            m.cities_loaded.set(service.weather().len() as f64);
        }
        Self {
            service,
            metrics,
            started_at: Instant::now(),
        }
    }
}

pub fn create_router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/metadata", get(handlers::metadata))
        .route("/predict", post(handlers::predict))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}
