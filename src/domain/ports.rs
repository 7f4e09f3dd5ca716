use crate::domain::solar::{CityLocation, WeatherRecord};
use async_trait::async_trait;

/// Source of annual weather statistics for a coordinate
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch_annual_weather(
        &self,
        location: &CityLocation,
        year: i32,
    ) -> anyhow::Result<WeatherRecord>;
}

/// Resolves a free-text place name to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the service has no match for the query
    async fn geocode(&self, query: &str) -> anyhow::Result<Option<CityLocation>>;
}
