use super::predictor::Regressor;
use crate::domain::ml::FeatureRow;
use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;

pub type SmartCoreForestModel = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Random forest fitted and serialized with smartcore.
///
/// smartcore does not record the fitted width and indexes the input matrix
/// without bounds checks, so the width travels with the artifact.
pub struct SmartCorePredictor {
    model: SmartCoreForestModel,
    n_features: usize,
    name: String,
}

impl SmartCorePredictor {
    pub fn new(name: impl Into<String>, model: SmartCoreForestModel, n_features: usize) -> Self {
        Self {
            model,
            n_features,
            name: name.into(),
        }
    }
}

impl Regressor for SmartCorePredictor {
    fn predict(&self, row: &FeatureRow) -> Result<f64, String> {
        if row.len() != self.n_features {
            return Err(format!(
                "Row has {} columns; forest was fitted on {}",
                row.len(),
                self.n_features
            ));
        }
        let input_vec = row.to_dense()?;
        let input_matrix = DenseMatrix::from_2d_vec(&vec![input_vec])
            .map_err(|e| format!("Matrix creation failed: {}", e))?;

        let predictions = self
            .model
            .predict(&input_matrix)
            .map_err(|e| format!("Prediction failed: {}", e))?;

        predictions
            .first()
            .copied()
            .ok_or_else(|| "No prediction returned".to_string())
    }

    fn validate(&self, n_features: usize) -> Result<(), String> {
        if n_features != self.n_features {
            return Err(format!(
                "Forest fitted on {} columns, feature config lists {}",
                self.n_features, n_features
            ));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ml::{Encoding, FeatureColumns, FeatureVector};
    use crate::domain::solar::WeatherRecord;
    use smartcore::ensemble::random_forest_regressor::RandomForestRegressorParameters;

    fn fit_tiny_forest(n_features: usize) -> SmartCoreForestModel {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..40 {
            let t = i as f64 * 1.5;
            let mut row = vec![0.0; n_features];
            row[0] = t;
            x.push(row);
            y.push(if t < 30.0 { 5.0 } else { 6.0 });
        }
        let x = DenseMatrix::from_2d_vec(&x).unwrap();
        let params = RandomForestRegressorParameters::default()
            .with_n_trees(5)
            .with_max_depth(3)
            .with_m(n_features);
        RandomForestRegressor::fit(&x, &y, params).unwrap()
    }

    fn row(tilt: f64, encoding: Encoding) -> FeatureRow {
        let weather = WeatherRecord {
            city: "Accra".to_string(),
            avg_ghi: 5.0,
            avg_temp: 27.0,
            clearness_index: 0.5,
            avg_precip: 3.0,
        };
        FeatureColumns::canonical().row(&FeatureVector::new(&weather, tilt, 2), encoding)
    }

    #[test]
    fn test_predicts_from_encoded_row() {
        let predictor = SmartCorePredictor::new("rf", fit_tiny_forest(13), 13);
        let low = predictor.predict(&row(5.0, Encoding::Encoded)).unwrap();
        let high = predictor.predict(&row(55.0, Encoding::Encoded)).unwrap();
        assert!(low.is_finite() && high.is_finite());
        assert!(high > low);
    }

    #[test]
    fn test_rejects_categorical_row() {
        let predictor = SmartCorePredictor::new("rf", fit_tiny_forest(13), 13);
        assert!(predictor.predict(&row(5.0, Encoding::Categorical)).is_err());
    }

    #[test]
    fn test_width_mismatch_is_an_error() {
        let predictor = SmartCorePredictor::new("rf", fit_tiny_forest(20), 20);
        assert!(predictor.validate(13).is_err());
        assert!(predictor.validate(20).is_ok());
        let err = predictor.predict(&row(5.0, Encoding::Encoded)).unwrap_err();
        assert!(err.contains("fitted on 20"));
    }

    #[test]
    fn test_serde_roundtrip_keeps_predictions() {
        let model = fit_tiny_forest(13);
        let json = serde_json::to_string(&model).unwrap();
        let restored: SmartCoreForestModel = serde_json::from_str(&json).unwrap();

        let a = SmartCorePredictor::new("a", model, 13);
        let b = SmartCorePredictor::new("b", restored, 13);
        let r = row(42.0, Encoding::Encoded);
        assert_eq!(a.predict(&r), b.predict(&r));
    }
}
