use crate::domain::ml::FeatureRow;

/// Interface for pre-fitted regression models
pub trait Regressor: Send + Sync {
    /// Raw model output for one row. Tree families were fitted on
    /// log1p(target), so this value is still in log space.
    fn predict(&self, row: &FeatureRow) -> Result<f64, String>;

    /// Check the model against the column count it will be fed.
    fn validate(&self, _n_features: usize) -> Result<(), String> {
        Ok(())
    }

    /// Get model name/type
    fn name(&self) -> &str;
}
