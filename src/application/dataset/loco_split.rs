use super::stratified_split::CITY_COLUMN;
use super::table::{CsvTable, sha256_file};
use crate::domain::errors::DatasetError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct LocoCityEntry {
    pub city: String,
    pub train_rows: usize,
    pub test_rows: usize,
    pub train_csv_sha256: String,
    pub test_csv_sha256: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocoManifest {
    pub source_file: String,
    pub strategy: String,
    pub cities: Vec<LocoCityEntry>,
    pub generated_at: DateTime<Utc>,
}

/// Directory-safe form of a city name.
pub fn city_safe(city: &str) -> String {
    city.replace(['/', '\\'], "-").replace(' ', "_")
}

/// Writes one leave-one-city-out train/test pair per city (sorted by name)
/// under `outdir/<city_safe>/`, plus `manifest_loco.json`.
pub fn run_loco_split(input: &Path, outdir: &Path) -> Result<LocoManifest, DatasetError> {
    let table = CsvTable::read(input)?;
    let cities = table.column(table.column_index(CITY_COLUMN)?);
    let unique: BTreeSet<&str> = cities.iter().map(String::as_str).collect();

    fs::create_dir_all(outdir)?;
    let mut entries = Vec::with_capacity(unique.len());

    for city in unique {
        let (test, train): (Vec<usize>, Vec<usize>) =
            (0..table.len()).partition(|&i| cities[i] == city);

        let safe = city_safe(city);
        let city_dir = outdir.join(&safe);
        fs::create_dir_all(&city_dir)?;

        let train_path = city_dir.join(format!("train_LOCO_{}.csv", safe));
        let test_path = city_dir.join(format!("test_LOCO_{}.csv", safe));
        table.write_rows(&train_path, &train)?;
        table.write_rows(&test_path, &test)?;

        entries.push(LocoCityEntry {
            city: city.to_string(),
            train_rows: train.len(),
            test_rows: test.len(),
            train_csv_sha256: sha256_file(&train_path)?,
            test_csv_sha256: sha256_file(&test_path)?,
        });
    }

    let manifest = LocoManifest {
        source_file: input.display().to_string(),
        strategy: "LOCO".to_string(),
        cities: entries,
        generated_at: Utc::now(),
    };
    fs::write(
        outdir.join("manifest_loco.json"),
        serde_json::to_string_pretty(&manifest)?,
    )?;

    info!("LOCO done: {} city folds written to {:?}", manifest.cities.len(), outdir);
    Ok(manifest)
}
