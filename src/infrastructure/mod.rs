pub mod artifact_store;
pub mod core;
pub mod nasa_power;
pub mod nominatim;
pub mod observability;
pub mod weather_csv;

pub use artifact_store::{ArtifactStore, FeatureConfig};
pub use nasa_power::NasaPowerClient;
pub use nominatim::NominatimClient;
pub use observability::Metrics;
pub use weather_csv::load_weather_table;
