pub mod building;
pub mod location;
pub mod types;
pub mod weather;

pub use building::BuildingCategories;
pub use location::CityLocation;
pub use types::{PredictionRequest, TILT_RANGE_DEG, round_prediction};
pub use weather::{WeatherRecord, WeatherTable};
