use super::AppState;
use super::error::ApiError;
use crate::domain::solar::TILT_RANGE_DEG;
use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
pub struct PredictBody {
    pub city: String,
    pub building_type: String,
    pub tilt: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub city: String,
    pub building_type: String,
    pub tilt: f64,
    #[serde(rename = "predicted_kWh_per_m2")]
    pub predicted_kwh_per_m2: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MetadataResponse {
    pub cities: Vec<String>,
    pub building_types: Vec<String>,
    pub tilt_range: [f64; 2],
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub cities: usize,
    pub uptime_seconds: u64,
}

pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "Solar prediction API is running" }))
}

pub async fn metadata(State(state): State<Arc<AppState>>) -> Json<MetadataResponse> {
    Json(MetadataResponse {
        cities: state.service.cities(),
        building_types: state.service.building_types().to_vec(),
        tilt_range: TILT_RANGE_DEG,
    })
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PredictBody>,
) -> Result<Json<PredictResponse>, ApiError> {
    let started = Instant::now();
    // Ensemble evaluation is CPU-bound; keep it off the async workers
    let worker = Arc::clone(&state);
    let (city, building_type, tilt) = (body.city.clone(), body.building_type.clone(), body.tilt);
    let result = tokio::task::spawn_blocking(move || {
        worker.service.predict(&city, &building_type, tilt)
    })
    .await
    .map_err(|e| {
        warn!("Prediction task failed: {}", e);
        ApiError::Internal(format!("Internal error: prediction task failed: {}", e))
    })?;

    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    if let Some(metrics) = &state.metrics {
        metrics.record_prediction(outcome, started.elapsed().as_secs_f64());
    }

    match result {
        Ok(value) => {
            debug!("{} / {} / {} -> {}", body.city, body.building_type, body.tilt, value);
            Ok(Json(PredictResponse {
                city: body.city,
                building_type: body.building_type,
                tilt: body.tilt,
                predicted_kwh_per_m2: value,
            }))
        }
        Err(e) => {
            if !e.is_client_fault() {
                warn!("Prediction failed: {}", e);
            }
            Err(e.into())
        }
    }
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let uptime = state.started_at.elapsed().as_secs();
    if let Some(metrics) = &state.metrics {
        metrics.uptime_seconds.set(uptime as f64);
    }
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cities: state.service.weather().len(),
        uptime_seconds: uptime,
    })
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let metrics = state
        .metrics
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("Metrics are disabled".to_string()))?;
    metrics
        .uptime_seconds
        .set(state.started_at.elapsed().as_secs_f64());
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics.render(),
    ))
}
