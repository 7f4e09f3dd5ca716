//! Stacked ensemble: four regressor families feeding a linear meta-model.
//!
//! Stage order is data, not convention: [`Stage::META_ORDER`] fixes which
//! family output lands in which meta-model input, and [`StageOutputs`] names
//! each slot.

use super::linear::LinearModel;
use super::predictor::Regressor;
use crate::domain::errors::{ArtifactError, PredictionError};
use crate::domain::ml::{Encoding, FeatureColumns, FeatureRow, FeatureVector};
use crate::domain::solar::BuildingCategories;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// LightGBM folds, native categorical support
    LightGbm,
    /// XGBoost folds, integer-coded building type
    XgBoost,
    RandomForest,
    ExtraTrees,
}

/// How a family collapses its members into one output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberReduction {
    /// Unweighted mean over every fold model
    MeanOfAll,
    /// Only the first stored model is used; the meta-model was fitted this way.
    FirstOnly,
}

impl Stage {
    pub const META_ORDER: [Stage; 4] = [
        Stage::LightGbm,
        Stage::XgBoost,
        Stage::RandomForest,
        Stage::ExtraTrees,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::LightGbm => "lgb",
            Stage::XgBoost => "xgb",
            Stage::RandomForest => "rf",
            Stage::ExtraTrees => "et",
        }
    }

    pub fn encoding(&self) -> Encoding {
        match self {
            Stage::LightGbm => Encoding::Categorical,
            Stage::XgBoost | Stage::RandomForest | Stage::ExtraTrees => Encoding::Encoded,
        }
    }

    pub fn reduction(&self) -> MemberReduction {
        match self {
            Stage::LightGbm | Stage::XgBoost => MemberReduction::MeanOfAll,
            Stage::RandomForest | Stage::ExtraTrees => MemberReduction::FirstOnly,
        }
    }

    /// File name inside the artifact directory
    pub fn artifact_file(&self) -> String {
        format!("{}_models.json", self.name())
    }
}

/// The fitted members of one stage.
pub struct ModelFamily {
    stage: Stage,
    members: Vec<Box<dyn Regressor>>,
}

impl ModelFamily {
    pub fn new(stage: Stage, members: Vec<Box<dyn Regressor>>) -> Result<Self, ArtifactError> {
        if members.is_empty() {
            return Err(ArtifactError::EmptyFamily {
                stage: stage.name().to_string(),
            });
        }
        Ok(Self { stage, members })
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn validate(&self, n_features: usize) -> Result<(), ArtifactError> {
        for member in &self.members {
            member
                .validate(n_features)
                .map_err(|reason| ArtifactError::InvalidModel {
                    stage: self.stage.name().to_string(),
                    reason,
                })?;
        }
        Ok(())
    }

    /// Family output on the original target scale (expm1 applied per member).
    pub fn evaluate(&self, row: &FeatureRow) -> Result<f64, PredictionError> {
        let run = |member: &Box<dyn Regressor>| -> Result<f64, PredictionError> {
            member
                .predict(row)
                .map(f64::exp_m1)
                .map_err(|reason| PredictionError::ArtifactFailure {
                    stage: format!("{}/{}", self.stage.name(), member.name()),
                    reason,
                })
        };

        match self.stage.reduction() {
            MemberReduction::MeanOfAll => {
                let mut total = 0.0;
                for member in &self.members {
                    total += run(member)?;
                }
                Ok(total / self.members.len() as f64)
            }
            MemberReduction::FirstOnly => run(&self.members[0]),
        }
    }
}

/// Per-family outputs, named by meta-model slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageOutputs {
    pub lightgbm: f64,
    pub xgboost: f64,
    pub random_forest: f64,
    pub extra_trees: f64,
}

impl StageOutputs {
    pub fn get(&self, stage: Stage) -> f64 {
        match stage {
            Stage::LightGbm => self.lightgbm,
            Stage::XgBoost => self.xgboost,
            Stage::RandomForest => self.random_forest,
            Stage::ExtraTrees => self.extra_trees,
        }
    }

    /// Meta-model input row in [`Stage::META_ORDER`]
    pub fn meta_row(&self) -> [f64; 4] {
        Stage::META_ORDER.map(|stage| self.get(stage))
    }
}

pub struct StageFamilies {
    pub lightgbm: ModelFamily,
    pub xgboost: ModelFamily,
    pub random_forest: ModelFamily,
    pub extra_trees: ModelFamily,
}

impl StageFamilies {
    fn get(&self, stage: Stage) -> &ModelFamily {
        match stage {
            Stage::LightGbm => &self.lightgbm,
            Stage::XgBoost => &self.xgboost,
            Stage::RandomForest => &self.random_forest,
            Stage::ExtraTrees => &self.extra_trees,
        }
    }
}

/// Process-wide model bundle. Immutable after construction and shared
/// read-only between prediction calls.
pub struct EnsembleArtifacts {
    columns: FeatureColumns,
    categories: BuildingCategories,
    families: StageFamilies,
    meta: LinearModel,
}

impl EnsembleArtifacts {
    pub fn new(
        columns: FeatureColumns,
        categories: BuildingCategories,
        families: StageFamilies,
        meta: LinearModel,
    ) -> Result<Self, ArtifactError> {
        for stage in Stage::META_ORDER {
            let family = families.get(stage);
            if family.stage() != stage {
                return Err(ArtifactError::MisplacedFamily {
                    stage: family.stage().name().to_string(),
                    slot: stage.name().to_string(),
                });
            }
            family.validate(columns.len())?;
        }

        if meta.n_inputs() != Stage::META_ORDER.len() {
            return Err(ArtifactError::MetaShape {
                expected: Stage::META_ORDER.len(),
                actual: meta.n_inputs(),
            });
        }

        Ok(Self {
            columns,
            categories,
            families,
            meta,
        })
    }

    pub fn columns(&self) -> &FeatureColumns {
        &self.columns
    }

    pub fn categories(&self) -> &BuildingCategories {
        &self.categories
    }

    pub fn family(&self, stage: Stage) -> &ModelFamily {
        self.families.get(stage)
    }

    pub fn stage_outputs(&self, features: &FeatureVector) -> Result<StageOutputs, PredictionError> {
        let categorical = self.columns.row(features, Encoding::Categorical);
        let encoded = self.columns.row(features, Encoding::Encoded);
        let row_for = |stage: Stage| match stage.encoding() {
            Encoding::Categorical => &categorical,
            Encoding::Encoded => &encoded,
        };

        Ok(StageOutputs {
            lightgbm: self.families.lightgbm.evaluate(row_for(Stage::LightGbm))?,
            xgboost: self.families.xgboost.evaluate(row_for(Stage::XgBoost))?,
            random_forest: self
                .families
                .random_forest
                .evaluate(row_for(Stage::RandomForest))?,
            extra_trees: self
                .families
                .extra_trees
                .evaluate(row_for(Stage::ExtraTrees))?,
        })
    }

    /// Unrounded meta-model output in kWh/m²/year.
    pub fn evaluate(&self, features: &FeatureVector) -> Result<f64, PredictionError> {
        let outputs = self.stage_outputs(features)?;
        debug!(?outputs, "Stage outputs");

        let raw = self
            .meta
            .predict(&outputs.meta_row())
            .map_err(|reason| PredictionError::ArtifactFailure {
                stage: "meta".to_string(),
                reason,
            })?;

        if !raw.is_finite() {
            return Err(PredictionError::ArtifactFailure {
                stage: "meta".to_string(),
                reason: format!("Non-finite output {}", raw),
            });
        }
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ml::tree_ensemble::{Aggregation, TreeEnsemble, TreeNode};
    use crate::domain::solar::WeatherRecord;

    fn leaf_model(value: f64) -> Box<dyn Regressor> {
        Box::new(TreeEnsemble::new(
            "leaf",
            Aggregation::Sum,
            0.0,
            vec![TreeNode::leaf(value)],
        ))
    }

    fn family(stage: Stage, values: &[f64]) -> ModelFamily {
        ModelFamily::new(stage, values.iter().map(|&v| leaf_model(v)).collect()).unwrap()
    }

    fn features() -> FeatureVector {
        let weather = WeatherRecord {
            city: "Accra".to_string(),
            avg_ghi: 5.0,
            avg_temp: 27.0,
            clearness_index: 0.5,
            avg_precip: 3.0,
        };
        FeatureVector::new(&weather, 20.0, 0)
    }

    fn categories() -> BuildingCategories {
        BuildingCategories::new(vec!["commercial".to_string(), "hotels".to_string()]).unwrap()
    }

    fn families() -> StageFamilies {
        StageFamilies {
            lightgbm: family(Stage::LightGbm, &[1.0, 3.0]),
            xgboost: family(Stage::XgBoost, &[2.0]),
            random_forest: family(Stage::RandomForest, &[0.5, 100.0]),
            extra_trees: family(Stage::ExtraTrees, &[1.5, 100.0]),
        }
    }

    #[test]
    fn test_boosted_mean_after_expm1() {
        let fam = family(Stage::LightGbm, &[1.0, 3.0]);
        let row = FeatureColumns::canonical().row(&features(), Encoding::Categorical);
        let expected = (1f64.exp_m1() + 3f64.exp_m1()) / 2.0;
        assert!((fam.evaluate(&row).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_forest_uses_first_member_only() {
        let fam = family(Stage::RandomForest, &[0.5, 100.0]);
        let row = FeatureColumns::canonical().row(&features(), Encoding::Encoded);
        assert!((fam.evaluate(&row).unwrap() - 0.5f64.exp_m1()).abs() < 1e-12);
    }

    #[test]
    fn test_meta_row_order() {
        let outputs = StageOutputs {
            lightgbm: 1.0,
            xgboost: 2.0,
            random_forest: 3.0,
            extra_trees: 4.0,
        };
        assert_eq!(outputs.meta_row(), [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_stage_encodings() {
        assert_eq!(Stage::LightGbm.encoding(), Encoding::Categorical);
        for stage in [Stage::XgBoost, Stage::RandomForest, Stage::ExtraTrees] {
            assert_eq!(stage.encoding(), Encoding::Encoded);
        }
        assert_eq!(Stage::RandomForest.artifact_file(), "rf_models.json");
    }

    #[test]
    fn test_end_to_end_combination() {
        let meta = LinearModel::new(vec![1.0, 10.0, 100.0, 1000.0], 0.5);
        let artifacts =
            EnsembleArtifacts::new(FeatureColumns::canonical(), categories(), families(), meta).unwrap();

        let outputs = artifacts.stage_outputs(&features()).unwrap();
        let expected = 0.5
            + outputs.lightgbm
            + 10.0 * outputs.xgboost
            + 100.0 * outputs.random_forest
            + 1000.0 * outputs.extra_trees;
        assert!((artifacts.evaluate(&features()).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_empty_family_and_bad_meta() {
        assert!(matches!(
            ModelFamily::new(Stage::XgBoost, vec![]),
            Err(ArtifactError::EmptyFamily { .. })
        ));

        let meta = LinearModel::new(vec![1.0, 1.0, 1.0], 0.0);
        assert!(matches!(
            EnsembleArtifacts::new(FeatureColumns::canonical(), categories(), families(), meta),
            Err(ArtifactError::MetaShape { expected: 4, actual: 3 })
        ));
    }

    #[test]
    fn test_rejects_misplaced_family() {
        let mut fams = families();
        fams.xgboost = family(Stage::RandomForest, &[1.0]);
        let meta = LinearModel::new(vec![1.0; 4], 0.0);
        assert!(matches!(
            EnsembleArtifacts::new(FeatureColumns::canonical(), categories(), fams, meta),
            Err(ArtifactError::MisplacedFamily { .. })
        ));
    }

    #[test]
    fn test_model_error_becomes_artifact_failure() {
        // Categorical split fed to an encoded-row family
        let bad = Box::new(TreeEnsemble::new(
            "bad",
            Aggregation::Sum,
            0.0,
            vec![TreeNode::categorical(12, vec![0], TreeNode::leaf(1.0), TreeNode::leaf(2.0))],
        ));
        let mut fams = families();
        fams.extra_trees = ModelFamily::new(Stage::ExtraTrees, vec![bad]).unwrap();
        let meta = LinearModel::new(vec![1.0; 4], 0.0);
        let artifacts =
            EnsembleArtifacts::new(FeatureColumns::canonical(), categories(), fams, meta).unwrap();

        match artifacts.evaluate(&features()) {
            Err(PredictionError::ArtifactFailure { stage, .. }) => assert!(stage.starts_with("et")),
            other => panic!("expected artifact failure, got {:?}", other),
        }
    }
}
