use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a single prediction call
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("City '{city}' not found in weather reference table")]
    UnknownCity { city: String },

    #[error("BuildingType '{building_type}' not recognized")]
    UnknownBuildingType { building_type: String },

    #[error("Tilt must be a finite number of degrees, got {tilt}")]
    InvalidTilt { tilt: f64 },

    #[error("Model stage '{stage}' failed: {reason}")]
    ArtifactFailure { stage: String, reason: String },
}

impl PredictionError {
    /// True when the caller supplied bad input (as opposed to a model fault).
    pub fn is_client_fault(&self) -> bool {
        !matches!(self, PredictionError::ArtifactFailure { .. })
    }

    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        if self.is_client_fault() {
            "invalid_input"
        } else {
            "artifact_failure"
        }
    }
}

/// Errors raised while loading the model bundle or the weather table
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid weather table {path:?}: {reason}")]
    WeatherTable { path: PathBuf, reason: String },

    #[error("Unknown feature name in feature config: {name}")]
    UnknownFeature { name: String },

    #[error("Feature listed twice in feature config: {name}")]
    DuplicateFeature { name: String },

    #[error("Building type category list is empty")]
    EmptyCategories,

    #[error("Building type category listed twice: {label}")]
    DuplicateCategory { label: String },

    #[error("Model family '{stage}' has no members")]
    EmptyFamily { stage: String },

    #[error("Model family '{stage}' placed in slot for '{slot}'")]
    MisplacedFamily { stage: String, slot: String },

    #[error("Meta-model expects {actual} inputs, ensemble provides {expected}")]
    MetaShape { expected: usize, actual: usize },

    #[error("Invalid model in family '{stage}': {reason}")]
    InvalidModel { stage: String, reason: String },
}

/// Errors raised by the offline dataset tools
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    #[error("Test size must be in (0, 1), got {value}")]
    InvalidTestSize { value: f64 },

    #[error("Dataset too small to split: {rows} rows with test size {test_size}")]
    TooFewRows { rows: usize, test_size: f64 },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}
