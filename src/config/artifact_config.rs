//! Artifact locations parsed from environment variables.

use std::env;
use std::path::PathBuf;

/// Where the model bundle and the weather table live
#[derive(Debug, Clone)]
pub struct ArtifactEnvConfig {
    pub models_dir: PathBuf,
    pub weather_csv: PathBuf,
}

impl Default for ArtifactEnvConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("models"),
            weather_csv: PathBuf::from("data/city_weather.csv"),
        }
    }
}

impl ArtifactEnvConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            models_dir: env::var("SOLARCAST_MODELS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.models_dir),
            weather_csv: env::var("SOLARCAST_WEATHER_CSV")
                .map(PathBuf::from)
                .unwrap_or(defaults.weather_csv),
        }
    }
}
