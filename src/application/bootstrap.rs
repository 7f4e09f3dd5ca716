use crate::application::PredictionService;
use crate::config::ArtifactEnvConfig;
use crate::domain::errors::ArtifactError;
use crate::infrastructure::{ArtifactStore, load_weather_table};
use std::sync::Arc;
use tracing::info;

pub struct ServiceBootstrap;

impl ServiceBootstrap {
    /// Loads artifacts and the weather table once. Any failure aborts
    /// startup; there is no partially loaded service.
    pub fn init(config: &ArtifactEnvConfig) -> Result<PredictionService, ArtifactError> {
        let artifacts = ArtifactStore::new(&config.models_dir).load()?;
        let weather = load_weather_table(&config.weather_csv)?;

        info!(
            "Prediction service ready ({} cities, {} building types)",
            weather.len(),
            artifacts.categories().len()
        );
        Ok(PredictionService::new(Arc::new(artifacts), Arc::new(weather)))
    }
}
