//! Portable decision-tree ensembles.
//!
//! Boosted models (LightGBM, XGBoost) and bagged forests (random forest,
//! extra trees) are exported to one JSON tree format. Boosted ensembles sum
//! their trees on top of a base score; forests average them.

use super::predictor::Regressor;
use crate::domain::ml::{FeatureRow, FeatureValue};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    #[default]
    Sum,
    Mean,
}

/// Comparison used by a numeric split to send a row left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// `value <= threshold` (LightGBM, scikit-learn)
    #[default]
    LessOrEqual,
    /// `value < threshold` (XGBoost)
    Less,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Leaf {
        value: f64,
    },
    Numeric {
        feature: usize,
        threshold: f64,
        #[serde(default)]
        decision: Decision,
        /// Direction taken by NaN inputs
        #[serde(default)]
        default_left: bool,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    /// Rows whose category code is in `categories` go left.
    Categorical {
        feature: usize,
        categories: Vec<u32>,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    pub fn leaf(value: f64) -> Self {
        TreeNode::Leaf { value }
    }

    pub fn numeric(feature: usize, threshold: f64, left: TreeNode, right: TreeNode) -> Self {
        TreeNode::Numeric {
            feature,
            threshold,
            decision: Decision::default(),
            default_left: false,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn categorical(feature: usize, categories: Vec<u32>, left: TreeNode, right: TreeNode) -> Self {
        TreeNode::Categorical {
            feature,
            categories,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn evaluate(&self, row: &FeatureRow) -> Result<f64, String> {
        let mut node = self;
        loop {
            node = match node {
                TreeNode::Leaf { value } => return Ok(*value),
                TreeNode::Numeric {
                    feature,
                    threshold,
                    decision,
                    default_left,
                    left,
                    right,
                } => {
                    let value = match row.get(*feature) {
                        Some(FeatureValue::Numeric(v)) => v,
                        Some(FeatureValue::Category(_)) => {
                            return Err(format!(
                                "Numeric split on categorical column {}",
                                feature
                            ));
                        }
                        None => return Err(format!("Column {} out of range", feature)),
                    };
                    let go_left = if value.is_nan() {
                        *default_left
                    } else {
                        match decision {
                            Decision::LessOrEqual => value <= *threshold,
                            Decision::Less => value < *threshold,
                        }
                    };
                    if go_left { left.as_ref() } else { right.as_ref() }
                }
                TreeNode::Categorical {
                    feature,
                    categories,
                    left,
                    right,
                } => {
                    let code = match row.get(*feature) {
                        Some(FeatureValue::Category(c)) => c,
                        Some(FeatureValue::Numeric(_)) => {
                            return Err(format!(
                                "Categorical split on numeric column {}",
                                feature
                            ));
                        }
                        None => return Err(format!("Column {} out of range", feature)),
                    };
                    if categories.contains(&code) {
                        left.as_ref()
                    } else {
                        right.as_ref()
                    }
                }
            };
        }
    }

    fn max_feature(&self) -> Option<usize> {
        match self {
            TreeNode::Leaf { .. } => None,
            TreeNode::Numeric {
                feature,
                left,
                right,
                ..
            }
            | TreeNode::Categorical {
                feature,
                left,
                right,
                ..
            } => [Some(*feature), left.max_feature(), right.max_feature()]
                .into_iter()
                .flatten()
                .max(),
        }
    }
}

fn default_name() -> String {
    "tree_ensemble".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub aggregation: Aggregation,
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<TreeNode>,
}

impl TreeEnsemble {
    pub fn new(name: impl Into<String>, aggregation: Aggregation, base_score: f64, trees: Vec<TreeNode>) -> Self {
        Self {
            name: name.into(),
            aggregation,
            base_score,
            trees,
        }
    }
}

impl Regressor for TreeEnsemble {
    fn predict(&self, row: &FeatureRow) -> Result<f64, String> {
        if self.trees.is_empty() {
            return Err("Ensemble has no trees".to_string());
        }

        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.evaluate(row)?;
        }

        Ok(match self.aggregation {
            Aggregation::Sum => self.base_score + total,
            Aggregation::Mean => self.base_score + total / self.trees.len() as f64,
        })
    }

    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err(format!("{}: ensemble has no trees", self.name));
        }
        let max = self.trees.iter().filter_map(TreeNode::max_feature).max();
        match max {
            Some(idx) if idx >= n_features => Err(format!(
                "{}: split on column {} but only {} columns configured",
                self.name, idx, n_features
            )),
            _ => Ok(()),
        }
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

    fn row(tilt: f64, code: u32, encoding: Encoding) -> FeatureRow {
        let weather = WeatherRecord {
            city: "Accra".to_string(),
            avg_ghi: 5.0,
            avg_temp: 27.0,
            clearness_index: 0.5,
            avg_precip: 3.0,
        };
        FeatureColumns::canonical().row(&FeatureVector::new(&weather, tilt, code), encoding)
    }

    #[test]
    fn test_numeric_split_boundaries() {
        let tree = TreeNode::numeric(0, 30.0, TreeNode::leaf(1.0), TreeNode::leaf(2.0));
        assert_eq!(tree.evaluate(&row(30.0, 0, Encoding::Encoded)), Ok(1.0));
        assert_eq!(tree.evaluate(&row(30.1, 0, Encoding::Encoded)), Ok(2.0));

        let strict = TreeNode::Numeric {
            feature: 0,
            threshold: 30.0,
            decision: Decision::Less,
            default_left: false,
            left: Box::new(TreeNode::leaf(1.0)),
            right: Box::new(TreeNode::leaf(2.0)),
        };
        assert_eq!(strict.evaluate(&row(30.0, 0, Encoding::Encoded)), Ok(2.0));
    }

    #[test]
    fn test_nan_follows_default_direction() {
        let tree = TreeNode::Numeric {
            feature: 0,
            threshold: 30.0,
            decision: Decision::LessOrEqual,
            default_left: true,
            left: Box::new(TreeNode::leaf(1.0)),
            right: Box::new(TreeNode::leaf(2.0)),
        };
        assert_eq!(tree.evaluate(&row(f64::NAN, 0, Encoding::Encoded)), Ok(1.0));
    }

    #[test]
    fn test_categorical_split_requires_categorical_row() {
        let tree = TreeNode::categorical(12, vec![1, 4], TreeNode::leaf(1.0), TreeNode::leaf(2.0));
        assert_eq!(tree.evaluate(&row(10.0, 4, Encoding::Categorical)), Ok(1.0));
        assert_eq!(tree.evaluate(&row(10.0, 0, Encoding::Categorical)), Ok(2.0));
        assert!(tree.evaluate(&row(10.0, 4, Encoding::Encoded)).is_err());

        let numeric = TreeNode::numeric(12, 0.5, TreeNode::leaf(1.0), TreeNode::leaf(2.0));
        assert!(numeric.evaluate(&row(10.0, 4, Encoding::Categorical)).is_err());
    }

    #[test]
    fn test_aggregation() {
        let trees = vec![TreeNode::leaf(1.0), TreeNode::leaf(3.0)];
        let boosted = TreeEnsemble::new("b", Aggregation::Sum, 0.5, trees.clone());
        let forest = TreeEnsemble::new("f", Aggregation::Mean, 0.0, trees);
        let r = row(10.0, 0, Encoding::Encoded);
        assert_eq!(boosted.predict(&r), Ok(4.5));
        assert_eq!(forest.predict(&r), Ok(2.0));
    }

    #[test]
    fn test_validate_column_bounds() {
        let ens = TreeEnsemble::new(
            "wide",
            Aggregation::Sum,
            0.0,
            vec![TreeNode::numeric(13, 1.0, TreeNode::leaf(0.0), TreeNode::leaf(1.0))],
        );
        assert!(ens.validate(13).is_err());
        assert!(ens.validate(14).is_ok());

        let empty = TreeEnsemble::new("empty", Aggregation::Sum, 0.0, vec![]);
        assert!(empty.validate(13).is_err());
    }

    #[test]
    fn test_deserialize_dump() {
        let json = r#"{
            "name": "lgb_fold_0",
            "base_score": 5.0,
            "trees": [
                {"type": "numeric", "feature": 0, "threshold": 20.0,
                 "left": {"type": "leaf", "value": 0.25},
                 "right": {"type": "leaf", "value": -0.25}}
            ]
        }"#;
        let ens: TreeEnsemble = serde_json::from_str(json).unwrap();
        assert_eq!(ens.aggregation, Aggregation::Sum);
        assert_eq!(ens.predict(&row(10.0, 0, Encoding::Encoded)), Ok(5.25));
    }
}
