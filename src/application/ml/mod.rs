pub mod artifact;
pub mod ensemble;
pub mod linear;
pub mod predictor;
pub mod smartcore_predictor;
pub mod tree_ensemble;

pub use artifact::ModelArtifact;
pub use ensemble::{EnsembleArtifacts, ModelFamily, Stage, StageFamilies, StageOutputs};
pub use linear::LinearModel;
pub use predictor::Regressor;
pub use smartcore_predictor::{SmartCoreForestModel, SmartCorePredictor};
pub use tree_ensemble::{Aggregation, TreeEnsemble, TreeNode};
