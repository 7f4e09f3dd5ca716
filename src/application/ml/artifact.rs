use super::predictor::Regressor;
use super::smartcore_predictor::{SmartCoreForestModel, SmartCorePredictor};
use super::tree_ensemble::TreeEnsemble;
use serde::{Deserialize, Serialize};

fn default_forest_name() -> String {
    "smartcore_forest".to_string()
}

/// One serialized family member, as stored in `<family>_models.json`.
#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    TreeEnsemble(TreeEnsemble),
    SmartcoreForest {
        #[serde(default = "default_forest_name")]
        name: String,
        /// Column count the forest was fitted on
        n_features: usize,
        model: SmartCoreForestModel,
    },
}

impl ModelArtifact {
    pub fn into_regressor(self) -> Box<dyn Regressor> {
        match self {
            ModelArtifact::TreeEnsemble(ensemble) => Box::new(ensemble),
            ModelArtifact::SmartcoreForest {
                name,
                n_features,
                model,
            } => Box::new(SmartCorePredictor::new(name, model, n_features)),
        }
    }
}

impl From<TreeEnsemble> for ModelArtifact {
    fn from(ensemble: TreeEnsemble) -> Self {
        ModelArtifact::TreeEnsemble(ensemble)
    }
}
