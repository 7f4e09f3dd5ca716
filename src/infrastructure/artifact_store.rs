use crate::application::ml::{
    EnsembleArtifacts, LinearModel, ModelArtifact, ModelFamily, Stage, StageFamilies,
};
use crate::domain::errors::ArtifactError;
use crate::domain::ml::FeatureColumns;
use crate::domain::solar::BuildingCategories;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const FEATURE_CONFIG_FILE: &str = "feature_config.json";
pub const META_MODEL_FILE: &str = "meta_model.json";

/// Column layout and category list saved next to the fitted models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    #[serde(rename = "NUM", alias = "num")]
    pub numeric: Vec<String>,
    #[serde(rename = "CAT", alias = "cat")]
    pub categorical: Vec<String>,
    #[serde(rename = "BuildingType_categories", alias = "building_type_categories")]
    pub building_type_categories: Vec<String>,
}

impl FeatureConfig {
    /// Model input order: numeric columns, then categorical ones.
    pub fn column_names(&self) -> Vec<&str> {
        self.numeric
            .iter()
            .chain(self.categorical.iter())
            .map(String::as_str)
            .collect()
    }
}

/// Reads and writes the model bundle directory.
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_json<T: DeserializeOwned>(&self, file: &str) -> Result<T, ArtifactError> {
        let path = self.dir.join(file);
        let content = fs::read_to_string(&path).map_err(|source| ArtifactError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ArtifactError::Parse { path, source })
    }

    fn write_json<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> Result<(), ArtifactError> {
        let path = self.dir.join(file);
        let io_err = |source| ArtifactError::Io {
            path: path.clone(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let content = serde_json::to_string_pretty(value).map_err(|source| ArtifactError::Parse {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, content).map_err(io_err)
    }

    fn load_family(&self, stage: Stage) -> Result<ModelFamily, ArtifactError> {
        let artifacts: Vec<ModelArtifact> = self.read_json(&stage.artifact_file())?;
        info!("Loaded {} '{}' model(s)", artifacts.len(), stage.name());
        let members = artifacts.into_iter().map(ModelArtifact::into_regressor).collect();
        ModelFamily::new(stage, members)
    }

    /// Loads and validates the full bundle. Any missing or malformed file
    /// fails the whole load.
    pub fn load(&self) -> Result<EnsembleArtifacts, ArtifactError> {
        info!("Loading model artifacts from {:?}", self.dir);

        let config: FeatureConfig = self.read_json(FEATURE_CONFIG_FILE)?;
        let columns = FeatureColumns::from_names(&config.column_names())?;
        let categories = BuildingCategories::new(config.building_type_categories)?;

        let families = StageFamilies {
            lightgbm: self.load_family(Stage::LightGbm)?,
            xgboost: self.load_family(Stage::XgBoost)?,
            random_forest: self.load_family(Stage::RandomForest)?,
            extra_trees: self.load_family(Stage::ExtraTrees)?,
        };
        let meta: LinearModel = self.read_json(META_MODEL_FILE)?;

        let artifacts = EnsembleArtifacts::new(columns, categories, families, meta)?;
        info!(
            "Artifacts ready: {} features, {} building types",
            artifacts.columns().len(),
            artifacts.categories().len()
        );
        Ok(artifacts)
    }

    pub fn save_feature_config(&self, config: &FeatureConfig) -> Result<(), ArtifactError> {
        self.write_json(FEATURE_CONFIG_FILE, config)
    }

    pub fn save_family(&self, stage: Stage, members: &[ModelArtifact]) -> Result<(), ArtifactError> {
        self.write_json(&stage.artifact_file(), members)
    }

    pub fn save_meta(&self, meta: &LinearModel) -> Result<(), ArtifactError> {
        self.write_json(META_MODEL_FILE, meta)
    }
}
