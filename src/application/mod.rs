// Model families, stacked ensemble
pub mod ml;

// Validated predictions over the loaded artifacts
pub mod prediction_service;

// Startup wiring: artifacts + weather table -> service
pub mod bootstrap;

// Name -> coordinates resolution for the offline tools
pub mod geocoding;

// Offline dataset preparation (splits, standardization)
pub mod dataset;

pub use bootstrap::ServiceBootstrap;
pub use prediction_service::PredictionService;
