use crate::domain::ports::Geocoder;
use crate::domain::solar::CityLocation;
use crate::infrastructure::core::{HttpClientFactory, build_url_with_query};
use anyhow::Context;
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Nominatim returns coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

fn parse_first_place(query: &str, places: &[NominatimPlace]) -> anyhow::Result<Option<CityLocation>> {
    let Some(place) = places.first() else {
        return Ok(None);
    };
    Ok(Some(CityLocation {
        city: query.to_string(),
        latitude: place.lat.parse().context("Failed to parse latitude")?,
        longitude: place.lon.parse().context("Failed to parse longitude")?,
    }))
}

pub struct NominatimClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl NominatimClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: HttpClientFactory::create_client(timeout),
            base_url: NOMINATIM_SEARCH_URL.to_string(),
        }
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn geocode(&self, query: &str) -> anyhow::Result<Option<CityLocation>> {
        let url = build_url_with_query(
            &self.base_url,
            &[("q", query), ("format", "json"), ("limit", "1")],
        )?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request to Nominatim")?;

        if !response.status().is_success() {
            anyhow::bail!("Nominatim returned status: {}", response.status());
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .context("Failed to parse Nominatim response")?;

        let location = parse_first_place(query, &places)?;
        match &location {
            Some(loc) => info!("{}: {:.4}, {:.4}", query, loc.latitude, loc.longitude),
            None => warn!("No geocoding match for '{}'", query),
        }
        Ok(location)
    }
}
