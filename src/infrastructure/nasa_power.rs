use crate::domain::ports::WeatherProvider;
use crate::domain::solar::{CityLocation, WeatherRecord};
use crate::infrastructure::core::{HttpClientFactory, build_url_with_query};
use anyhow::Context;
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::{debug, info};

pub const NASA_POWER_MONTHLY_URL: &str = "https://power.larc.nasa.gov/api/temporal/monthly/point";

const GHI: &str = "ALLSKY_SFC_SW_DWN";
const TEMPERATURE: &str = "T2M";
const CLEARNESS: &str = "ALLSKY_KT";
const PRECIPITATION: &str = "PRECTOTCORR";

/// Values at or below this are POWER fill markers (-999).
const FILL_VALUE: f64 = -990.0;

#[derive(Debug, Deserialize)]
struct PowerResponse {
    properties: PowerProperties,
}

#[derive(Debug, Deserialize)]
struct PowerProperties {
    /// parameter -> "YYYYMM" -> value; month "13" is the annual figure
    parameter: HashMap<String, BTreeMap<String, f64>>,
}

/// Mean of the first 12 (monthly) entries in key order, ignoring fill values.
pub fn annual_mean(series: &BTreeMap<String, f64>) -> Option<f64> {
    let values: Vec<f64> = series
        .values()
        .take(12)
        .copied()
        .filter(|v| v.is_finite() && *v > FILL_VALUE)
        .collect();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn parameter_mean(
    parameters: &HashMap<String, BTreeMap<String, f64>>,
    name: &str,
) -> anyhow::Result<f64> {
    let series = parameters
        .get(name)
        .with_context(|| format!("Parameter {} missing from NASA POWER response", name))?;
    annual_mean(series).with_context(|| format!("No valid monthly values for {}", name))
}

pub struct NasaPowerClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl NasaPowerClient {
    pub fn new(timeout: Duration) -> Self {
        Self::with_base_url(NASA_POWER_MONTHLY_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: HttpClientFactory::create_client(timeout),
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl WeatherProvider for NasaPowerClient {
    async fn fetch_annual_weather(
        &self,
        location: &CityLocation,
        year: i32,
    ) -> anyhow::Result<WeatherRecord> {
        info!(
            "Fetching weather for {} ({:.2}, {:.2})...",
            location.city, location.latitude, location.longitude
        );

        let year = year.to_string();
        let url = build_url_with_query(
            &self.base_url,
            &[
                ("parameters", [GHI, TEMPERATURE, CLEARNESS, PRECIPITATION].join(",")),
                ("community", "RE".to_string()),
                ("longitude", location.longitude.to_string()),
                ("latitude", location.latitude.to_string()),
                ("start", year.clone()),
                ("end", year),
                ("format", "JSON".to_string()),
            ],
        )?;
        debug!("NASA POWER request: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request to NASA POWER")?;

        if !response.status().is_success() {
            anyhow::bail!("NASA POWER API returned status: {}", response.status());
        }

        let body: PowerResponse = response
            .json()
            .await
            .context("Failed to parse NASA POWER response")?;
        let parameters = &body.properties.parameter;

        Ok(WeatherRecord {
            city: location.city.clone(),
            avg_ghi: parameter_mean(parameters, GHI)?,
            avg_temp: parameter_mean(parameters, TEMPERATURE)?,
            clearness_index: parameter_mean(parameters, CLEARNESS)?,
            avg_precip: parameter_mean(parameters, PRECIPITATION)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> BTreeMap<String, f64> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("2024{:02}", i + 1), *v))
            .collect()
    }

    #[test]
    fn test_annual_mean_drops_thirteenth_entry() {
        let mut months = vec![2.0; 12];
        months.push(100.0);
        assert_eq!(annual_mean(&series(&months)), Some(2.0));
    }

    #[test]
    fn test_annual_mean_ignores_fill_values() {
        let mut months = vec![4.0; 11];
        months.push(-999.0);
        assert_eq!(annual_mean(&series(&months)), Some(4.0));
        assert_eq!(annual_mean(&series(&[-999.0; 12])), None);
    }

    #[test]
    fn test_parse_power_response() {
        let json = r#"{
            "properties": {"parameter": {
                "T2M": {"202401": 26.0, "202402": 28.0}
            }}
        }"#;
        let body: PowerResponse = serde_json::from_str(json).unwrap();
        let mean = parameter_mean(&body.properties.parameter, TEMPERATURE).unwrap();
        assert!((mean - 27.0).abs() < 1e-12);
        assert!(parameter_mean(&body.properties.parameter, GHI).is_err());
    }
}
