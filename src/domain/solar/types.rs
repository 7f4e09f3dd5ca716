use serde::{Deserialize, Serialize};

/// Documented tilt domain in degrees. Requests outside it are still
/// evaluated; the bounds are advertised to front-ends.
pub const TILT_RANGE_DEG: [f64; 2] = [0.0, 60.0];

/// Decimal places kept in a returned prediction
pub const PREDICTION_DECIMALS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub city: String,
    pub building_type: String,
    /// Roof tilt in degrees from horizontal
    pub tilt: f64,
}

impl PredictionRequest {
    pub fn new(city: impl Into<String>, building_type: impl Into<String>, tilt: f64) -> Self {
        Self {
            city: city.into(),
            building_type: building_type.into(),
            tilt,
        }
    }
}

/// Rounds a raw meta-model output (kWh/m²/year) to the published precision.
///
/// Goes through the formatter, which rounds the exact binary value. Scaling
/// by 1000 first would round `1.2345` (stored as 1.23449999...) up.
pub fn round_prediction(raw: f64) -> f64 {
    if !raw.is_finite() {
        return raw;
    }
    format!("{:.*}", PREDICTION_DECIMALS, raw)
        .parse()
        .unwrap_or(raw)
}

pub fn tilt_in_documented_range(tilt: f64) -> bool {
    tilt >= TILT_RANGE_DEG[0] && tilt <= TILT_RANGE_DEG[1]
}
