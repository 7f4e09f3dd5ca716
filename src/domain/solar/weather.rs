use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Annual weather statistics for one city.
///
/// Field names on disk follow the weather CSV header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    #[serde(rename = "City")]
    pub city: String,
    /// Global horizontal irradiance, kWh/m²/day
    #[serde(rename = "avg_GHI_kWhm2_day")]
    pub avg_ghi: f64,
    /// °C
    #[serde(rename = "avg_temp_C")]
    pub avg_temp: f64,
    #[serde(rename = "clearness_index")]
    pub clearness_index: f64,
    /// mm/day
    #[serde(rename = "precip_mm_day")]
    pub avg_precip: f64,
}

/// Immutable city -> weather lookup, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct WeatherTable {
    records: Vec<WeatherRecord>,
    index: HashMap<String, usize>,
}

impl WeatherTable {
    /// Builds the table keeping file order. When a city appears more than
    /// once the first row wins.
    pub fn from_records(records: Vec<WeatherRecord>) -> Self {
        let mut kept = Vec::with_capacity(records.len());
        let mut index = HashMap::with_capacity(records.len());

        for record in records {
            if index.contains_key(&record.city) {
                warn!(
                    "Duplicate weather row for city '{}' ignored (first row kept)",
                    record.city
                );
                continue;
            }
            index.insert(record.city.clone(), kept.len());
            kept.push(record);
        }

        Self {
            records: kept,
            index,
        }
    }

    pub fn get(&self, city: &str) -> Option<&WeatherRecord> {
        self.index.get(city).map(|&i| &self.records[i])
    }

    pub fn contains(&self, city: &str) -> bool {
        self.index.contains_key(city)
    }

    pub fn records(&self) -> &[WeatherRecord] {
        &self.records
    }

    /// City names sorted alphabetically (as shown in front-end pickers)
    pub fn cities(&self) -> Vec<String> {
        let mut cities: Vec<String> = self.records.iter().map(|r| r.city.clone()).collect();
        cities.sort();
        cities
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
