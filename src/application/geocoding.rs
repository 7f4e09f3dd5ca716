use crate::domain::ports::Geocoder;
use crate::domain::solar::CityLocation;
use std::time::Duration;
use tracing::{info, warn};

/// Resolves each name in order, waiting `pause` between requests.
/// Names with no match or a failed lookup are logged and skipped.
pub async fn resolve_cities(
    geocoder: &dyn Geocoder,
    cities: &[String],
    pause: Duration,
) -> Vec<CityLocation> {
    let mut locations = Vec::with_capacity(cities.len());

    for (i, city) in cities.iter().enumerate() {
        match geocoder.geocode(city).await {
            Ok(Some(location)) => {
                info!("{} -> ({}, {})", city, location.latitude, location.longitude);
                locations.push(location);
            }
            Ok(None) => warn!("No match for {}", city),
            Err(e) => warn!("Geocoding failed for {}: {:#}", city, e),
        }
        if i + 1 < cities.len() && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }
    locations
}
