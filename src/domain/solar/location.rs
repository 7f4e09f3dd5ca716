use serde::{Deserialize, Serialize};

/// A geocoded city, as stored in the coordinates CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityLocation {
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
}
