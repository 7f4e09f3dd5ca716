pub mod feature_registry;

pub use feature_registry::{
    Encoding, FEATURE_NAMES, Feature, FeatureColumns, FeatureRow, FeatureValue, FeatureVector,
};
