mod common;

use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use solarcast::application::ServiceBootstrap;
use solarcast::application::ml::{LinearModel, ModelArtifact, SmartCoreForestModel, Stage};
use solarcast::config::ArtifactEnvConfig;
use solarcast::domain::errors::ArtifactError;
use solarcast::domain::ml::FEATURE_NAMES;
use solarcast::infrastructure::ArtifactStore;
use std::fs;
use tempfile::TempDir;

fn bundle_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    common::write_bundle(dir.path());
    dir
}

#[test]
fn test_loaded_bundle_matches_in_memory_bundle() {
    let dir = bundle_dir();
    let loaded = ArtifactStore::new(dir.path()).load().unwrap();
    let in_memory = common::bundle(common::default_meta());

    let table = common::weather_table();
    for city in ["Accra", "Manila", "Nairobi"] {
        for code in 0..3 {
            let fv = solarcast::domain::ml::FeatureVector::new(table.get(city).unwrap(), 22.0, code);
            assert_eq!(loaded.evaluate(&fv).unwrap(), in_memory.evaluate(&fv).unwrap());
        }
    }
    assert_eq!(loaded.categories().labels(), common::BUILDING_TYPES);
    assert_eq!(loaded.family(Stage::RandomForest).len(), 2);
}

#[test]
fn test_bootstrap_from_directory() {
    let dir = bundle_dir();
    let weather_csv = dir.path().join("city_weather.csv");
    fs::write(&weather_csv, common::WEATHER_CSV).unwrap();

    let service = ServiceBootstrap::init(&ArtifactEnvConfig {
        models_dir: dir.path().to_path_buf(),
        weather_csv,
    })
    .unwrap();

    assert_eq!(service.cities().len(), 3);
    assert_eq!(
        service.predict("Accra", "commercial", 20.0).unwrap(),
        common::service().predict("Accra", "commercial", 20.0).unwrap()
    );
}

#[test]
fn test_missing_family_file_fails_load() {
    let dir = bundle_dir();
    fs::remove_file(dir.path().join("et_models.json")).unwrap();
    assert!(matches!(
        ArtifactStore::new(dir.path()).load(),
        Err(ArtifactError::Io { .. })
    ));
}

#[test]
fn test_corrupt_file_fails_load() {
    let dir = bundle_dir();
    fs::write(dir.path().join("xgb_models.json"), "[{\"kind\": \"pickle\"}]").unwrap();
    assert!(matches!(
        ArtifactStore::new(dir.path()).load(),
        Err(ArtifactError::Parse { .. })
    ));
}

#[test]
fn test_empty_family_fails_load() {
    let dir = bundle_dir();
    fs::write(dir.path().join("lgb_models.json"), "[]").unwrap();
    assert!(matches!(
        ArtifactStore::new(dir.path()).load(),
        Err(ArtifactError::EmptyFamily { .. })
    ));
}

#[test]
fn test_meta_shape_mismatch_fails_load() {
    let dir = bundle_dir();
    let store = ArtifactStore::new(dir.path());
    store.save_meta(&LinearModel::new(vec![1.0, 1.0, 1.0], 0.0)).unwrap();
    assert!(matches!(
        store.load(),
        Err(ArtifactError::MetaShape {
            expected: 4,
            actual: 3
        })
    ));
}

#[test]
fn test_unknown_feature_name_fails_load() {
    let dir = bundle_dir();
    let store = ArtifactStore::new(dir.path());
    let mut config = common::feature_config();
    config.numeric.push("wind_speed".to_string());
    store.save_feature_config(&config).unwrap();
    assert!(matches!(
        store.load(),
        Err(ArtifactError::UnknownFeature { ref name }) if name == "wind_speed"
    ));
}

#[test]
fn test_duplicate_category_fails_load() {
    let dir = bundle_dir();
    let store = ArtifactStore::new(dir.path());
    let mut config = common::feature_config();
    config.building_type_categories.push("hotels".to_string());
    store.save_feature_config(&config).unwrap();
    assert!(matches!(
        store.load(),
        Err(ArtifactError::DuplicateCategory { .. })
    ));
}

#[test]
fn test_split_beyond_configured_columns_fails_load() {
    let dir = bundle_dir();
    let store = ArtifactStore::new(dir.path());
    let mut config = common::feature_config();
    // Drop every engineered column; fixture trees split on column 12
    config.numeric.truncate(4);
    store.save_feature_config(&config).unwrap();
    assert!(matches!(
        store.load(),
        Err(ArtifactError::InvalidModel { .. })
    ));
}

/// Forest whose target grows with the value in `informative`.
fn fit_forest(n_features: usize, informative: usize) -> SmartCoreForestModel {
    let x: Vec<Vec<f64>> = (0..40)
        .map(|i| {
            let mut row = vec![1.0; n_features];
            row[informative] = i as f64;
            row
        })
        .collect();
    let y: Vec<f64> = (0..40).map(|i| if i < 20 { 5.0 } else { 5.5 }).collect();
    let matrix = DenseMatrix::from_2d_vec(&x).unwrap();
    let params = RandomForestRegressorParameters::default()
        .with_n_trees(5)
        .with_max_depth(3)
        .with_m(n_features);
    RandomForestRegressor::fit(&matrix, &y, params).unwrap()
}

fn save_forest(store: &ArtifactStore, n_features: usize, model: SmartCoreForestModel) {
    store
        .save_family(
            Stage::RandomForest,
            &[ModelArtifact::SmartcoreForest {
                name: "rf_smartcore".to_string(),
                n_features,
                model,
            }],
        )
        .unwrap();
}

#[test]
fn test_smartcore_forest_member_loads() {
    let n_features = FEATURE_NAMES.len();
    let dir = bundle_dir();
    let store = ArtifactStore::new(dir.path());
    save_forest(&store, n_features, fit_forest(n_features, common::TILT));

    let artifacts = store.load().unwrap();
    let table = common::weather_table();
    let accra = table.get("Accra").unwrap();

    let low = artifacts
        .stage_outputs(&solarcast::domain::ml::FeatureVector::new(accra, 2.0, 0))
        .unwrap();
    let high = artifacts
        .stage_outputs(&solarcast::domain::ml::FeatureVector::new(accra, 38.0, 0))
        .unwrap();
    assert!(high.random_forest > low.random_forest);
}

#[test]
fn test_smartcore_forest_wider_than_config_fails_load() {
    // Fitted on 20 columns, only the last one informative
    let dir = bundle_dir();
    let store = ArtifactStore::new(dir.path());
    save_forest(&store, 20, fit_forest(20, 19));

    assert!(matches!(
        store.load(),
        Err(ArtifactError::InvalidModel { ref stage, .. }) if stage == Stage::RandomForest.name()
    ));
}
