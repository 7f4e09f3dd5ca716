use crate::application::ml::EnsembleArtifacts;
use crate::domain::errors::PredictionError;
use crate::domain::ml::FeatureVector;
use crate::domain::solar::types::tilt_in_documented_range;
use crate::domain::solar::{PredictionRequest, WeatherTable, round_prediction};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;

/// Entry point for rooftop solar predictions.
///
/// Holds the loaded artifacts and weather table behind `Arc`s; cloning is
/// cheap and every clone reads the same immutable state.
#[derive(Clone)]
pub struct PredictionService {
    artifacts: Arc<EnsembleArtifacts>,
    weather: Arc<WeatherTable>,
}

impl PredictionService {
    pub fn new(artifacts: Arc<EnsembleArtifacts>, weather: Arc<WeatherTable>) -> Self {
        Self { artifacts, weather }
    }

    /// Predicted annual yield in kWh/m²/year, rounded to 3 decimals.
    ///
    /// City and building type are validated before any feature is computed.
    pub fn predict(&self, city: &str, building_type: &str, tilt: f64) -> Result<f64, PredictionError> {
        let weather = self
            .weather
            .get(city)
            .ok_or_else(|| PredictionError::UnknownCity {
                city: city.to_string(),
            })?;

        let code = self
            .artifacts
            .categories()
            .code_of(building_type)
            .ok_or_else(|| PredictionError::UnknownBuildingType {
                building_type: building_type.to_string(),
            })?;

        if !tilt.is_finite() {
            return Err(PredictionError::InvalidTilt { tilt });
        }
        if !tilt_in_documented_range(tilt) {
            debug!(tilt, "Tilt outside documented 0-60 degree range");
        }

        let features = FeatureVector::new(weather, tilt, code);
        let raw = self.artifacts.evaluate(&features)?;
        let rounded = round_prediction(raw);

        debug!(city, building_type, tilt, raw, rounded, "Prediction computed");
        Ok(rounded)
    }

    pub fn predict_request(&self, request: &PredictionRequest) -> Result<f64, PredictionError> {
        self.predict(&request.city, &request.building_type, request.tilt)
    }

    /// Independent predictions evaluated in parallel; output order matches input.
    pub fn predict_batch(&self, requests: &[PredictionRequest]) -> Vec<Result<f64, PredictionError>> {
        requests
            .par_iter()
            .map(|request| self.predict_request(request))
            .collect()
    }

    pub fn cities(&self) -> Vec<String> {
        self.weather.cities()
    }

    pub fn building_types(&self) -> &[String] {
        self.artifacts.categories().labels()
    }

    pub fn artifacts(&self) -> &EnsembleArtifacts {
        &self.artifacts
    }

    pub fn weather(&self) -> &WeatherTable {
        &self.weather
    }
}
