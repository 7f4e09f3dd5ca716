use serde::{Deserialize, Serialize};

/// Linear meta-model (ridge regression weights) stacked on top of the
/// tree families.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LinearModel {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }

    pub fn n_inputs(&self) -> usize {
        self.coefficients.len()
    }

    pub fn predict(&self, inputs: &[f64]) -> Result<f64, String> {
        if inputs.len() != self.coefficients.len() {
            return Err(format!(
                "Expected {} inputs, got {}",
                self.coefficients.len(),
                inputs.len()
            ));
        }

        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(inputs)
                .map(|(w, x)| w * x)
                .sum::<f64>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_sum() {
        let model = LinearModel::new(vec![0.5, 0.25, 0.125, 0.125], 2.0);
        assert_eq!(model.predict(&[100.0, 200.0, 80.0, 80.0]), Ok(2.0 + 50.0 + 50.0 + 20.0));
    }

    #[test]
    fn test_shape_mismatch() {
        let model = LinearModel::new(vec![1.0, 1.0], 0.0);
        assert!(model.predict(&[1.0]).is_err());
    }

    #[test]
    fn test_intercept_defaults_to_zero() {
        let model: LinearModel = serde_json::from_str(r#"{"coefficients":[1.0]}"#).unwrap();
        assert_eq!(model.intercept, 0.0);
    }
}
