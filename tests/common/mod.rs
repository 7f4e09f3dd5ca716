#![allow(dead_code)]

use solarcast::application::PredictionService;
use solarcast::application::ml::{
    Aggregation, EnsembleArtifacts, LinearModel, ModelArtifact, ModelFamily, Stage, StageFamilies,
    TreeEnsemble, TreeNode,
};
use solarcast::domain::ml::{FEATURE_NAMES, FeatureColumns};
use solarcast::domain::solar::{BuildingCategories, WeatherRecord, WeatherTable};
use solarcast::infrastructure::{ArtifactStore, FeatureConfig};
use std::path::Path;
use std::sync::Arc;

// Column positions in the canonical layout
pub const TILT: usize = 0;
pub const GHI: usize = 4;
pub const BUILDING_TYPE: usize = 12;

pub const BUILDING_TYPES: &[&str] = &["commercial", "hotels", "schools"];

pub const WEATHER_CSV: &str = "City,avg_GHI_kWhm2_day,avg_temp_C,clearness_index,precip_mm_day\n\
                               Accra,5.1,27.3,0.52,3.1\n\
                               Manila,4.9,28.0,0.49,6.2\n\
                               Nairobi,5.8,19.0,0.58,2.4\n";

fn weather(city: &str, ghi: f64, temp: f64, clearness: f64, precip: f64) -> WeatherRecord {
    WeatherRecord {
        city: city.to_string(),
        avg_ghi: ghi,
        avg_temp: temp,
        clearness_index: clearness,
        avg_precip: precip,
    }
}

pub fn weather_table() -> WeatherTable {
    WeatherTable::from_records(vec![
        weather("Accra", 5.1, 27.3, 0.52, 3.1),
        weather("Manila", 4.9, 28.0, 0.49, 6.2),
        weather("Nairobi", 5.8, 19.0, 0.58, 2.4),
    ])
}

pub fn categories() -> BuildingCategories {
    BuildingCategories::new(BUILDING_TYPES.iter().map(|s| s.to_string()).collect()).unwrap()
}

pub fn default_meta() -> LinearModel {
    LinearModel::new(vec![0.25, 0.25, 0.25, 0.25], 2.0)
}

fn boosted(name: &str, base_score: f64, trees: Vec<TreeNode>) -> ModelArtifact {
    TreeEnsemble::new(name, Aggregation::Sum, base_score, trees).into()
}

fn forest(name: &str, trees: Vec<TreeNode>) -> ModelArtifact {
    TreeEnsemble::new(name, Aggregation::Mean, 0.0, trees).into()
}

/// Small hand-built families. Leaves are on the log1p scale.
pub fn family_artifacts(stage: Stage) -> Vec<ModelArtifact> {
    match stage {
        Stage::LightGbm => vec![
            boosted(
                "lgb_0",
                0.0,
                vec![TreeNode::categorical(
                    BUILDING_TYPE,
                    vec![0],
                    TreeNode::leaf(5.0),
                    TreeNode::leaf(4.6),
                )],
            ),
            boosted(
                "lgb_1",
                0.1,
                vec![TreeNode::numeric(
                    TILT,
                    30.0,
                    TreeNode::leaf(4.9),
                    TreeNode::leaf(4.7),
                )],
            ),
        ],
        Stage::XgBoost => vec![boosted(
            "xgb_0",
            0.5,
            vec![
                TreeNode::numeric(BUILDING_TYPE, 0.5, TreeNode::leaf(4.4), TreeNode::leaf(4.2)),
                TreeNode::numeric(GHI, 5.0, TreeNode::leaf(0.0), TreeNode::leaf(0.1)),
            ],
        )],
        Stage::RandomForest => vec![
            forest(
                "rf_0",
                vec![
                    TreeNode::numeric(GHI, 5.0, TreeNode::leaf(5.1), TreeNode::leaf(5.3)),
                    TreeNode::leaf(5.2),
                ],
            ),
            // Never consulted: forests only use their first member
            forest("rf_1", vec![TreeNode::leaf(100.0)]),
        ],
        Stage::ExtraTrees => vec![forest(
            "et_0",
            vec![TreeNode::numeric(TILT, 45.0, TreeNode::leaf(5.0), TreeNode::leaf(4.9))],
        )],
    }
}

fn family(stage: Stage) -> ModelFamily {
    let members = family_artifacts(stage)
        .into_iter()
        .map(ModelArtifact::into_regressor)
        .collect();
    ModelFamily::new(stage, members).unwrap()
}

pub fn bundle(meta: LinearModel) -> EnsembleArtifacts {
    EnsembleArtifacts::new(
        FeatureColumns::canonical(),
        categories(),
        StageFamilies {
            lightgbm: family(Stage::LightGbm),
            xgboost: family(Stage::XgBoost),
            random_forest: family(Stage::RandomForest),
            extra_trees: family(Stage::ExtraTrees),
        },
        meta,
    )
    .unwrap()
}

pub fn service_with_meta(meta: LinearModel) -> PredictionService {
    PredictionService::new(Arc::new(bundle(meta)), Arc::new(weather_table()))
}

pub fn service() -> PredictionService {
    service_with_meta(default_meta())
}

pub fn feature_config() -> FeatureConfig {
    let (num, cat) = FEATURE_NAMES.split_at(FEATURE_NAMES.len() - 1);
    FeatureConfig {
        numeric: num.iter().map(|s| s.to_string()).collect(),
        categorical: cat.iter().map(|s| s.to_string()).collect(),
        building_type_categories: BUILDING_TYPES.iter().map(|s| s.to_string()).collect(),
    }
}

/// Writes the fixture bundle as JSON files into `dir`.
pub fn write_bundle(dir: &Path) {
    let store = ArtifactStore::new(dir);
    store.save_feature_config(&feature_config()).unwrap();
    for stage in Stage::META_ORDER {
        store.save_family(stage, &family_artifacts(stage)).unwrap();
    }
    store.save_meta(&default_meta()).unwrap();
}
