//! One global train/test split stratified by `City | Assumed_building_type`.
//!
//! Strata too small to appear on both sides are folded into a per-city
//! `RARE` bucket; if that still leaves undersized buckets the split falls
//! back to plain random sampling.

use super::table::{CsvTable, sha256_file};
use crate::domain::errors::DatasetError;
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;
use statrs::statistics::{Data, Median};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub const CITY_COLUMN: &str = "City";
pub const BUILDING_TYPE_COLUMN: &str = "Assumed_building_type";

#[derive(Debug, Clone, Copy)]
pub struct StratifiedSplitOptions {
    pub test_size: f64,
    pub seed: u64,
}

impl Default for StratifiedSplitOptions {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            seed: 404,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StratifyKey {
    CityType,
    CollapsedRare,
    FallbackRandom,
}

impl StratifyKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StratifyKey::CityType => "_city_type",
            StratifyKey::CollapsedRare => "_strat",
            StratifyKey::FallbackRandom => "FALLBACK_RANDOM",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SplitIndices {
    /// Row indices in input order
    pub train: Vec<usize>,
    pub test: Vec<usize>,
    pub key: StratifyKey,
    /// Stratum label per input row (None for the random fallback)
    pub strata: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SplitManifest {
    pub source_file: String,
    pub strategy: String,
    pub test_size: f64,
    pub seed: u64,
    pub rows_total: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub stratify_key: String,
    pub train_csv_sha256: String,
    pub test_csv_sha256: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median_abs_diff_share: Option<f64>,
    pub generated_at: DateTime<Utc>,
}

/// Smallest stratum that can contribute at least one row to each side.
pub fn min_stratum_count(test_size: f64) -> usize {
    let a = (1.0 / test_size).ceil() as usize;
    let b = (1.0 / (1.0 - test_size)).ceil() as usize;
    a.max(b)
}

fn counts(labels: &[String]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for label in labels {
        *counts.entry(label.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Chooses the stratification labels: the raw `city | type` key, the
/// rare-collapsed key, or none.
pub fn choose_strata(cities: &[String], types: &[String], test_size: f64) -> (StratifyKey, Option<Vec<String>>) {
    let min_count = min_stratum_count(test_size);
    let city_type: Vec<String> = cities
        .iter()
        .zip(types)
        .map(|(c, t)| format!("{} | {}", c, t))
        .collect();

    let rare: HashSet<String> = counts(&city_type)
        .into_iter()
        .filter(|(_, n)| *n < min_count)
        .map(|(k, _)| k.to_string())
        .collect();

    if rare.is_empty() {
        return (StratifyKey::CityType, Some(city_type));
    }

    let collapsed: Vec<String> = city_type
        .iter()
        .zip(cities)
        .map(|(key, city)| {
            if rare.contains(key) {
                format!("{} | RARE", city)
            } else {
                key.clone()
            }
        })
        .collect();

    if counts(&collapsed).values().all(|&n| n >= min_count) {
        (StratifyKey::CollapsedRare, Some(collapsed))
    } else {
        warn!("Rare strata remain after collapsing; falling back to random split");
        (StratifyKey::FallbackRandom, None)
    }
}

/// Deterministic split of `n` rows.
///
/// The test side gets `ceil(test_size * n)` rows. With strata, each
/// stratum receives a proportional share (largest remainder), sampled
/// with a seeded shuffle.
pub fn split_indices(
    n: usize,
    strata: Option<&[String]>,
    options: StratifiedSplitOptions,
) -> Result<(Vec<usize>, Vec<usize>), DatasetError> {
    let test_size = options.test_size;
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(DatasetError::InvalidTestSize { value: test_size });
    }

    let n_test = (test_size * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(DatasetError::TooFewRows { rows: n, test_size });
    }

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut test = Vec::with_capacity(n_test);

    match strata {
        None => {
            let mut order: Vec<usize> = (0..n).collect();
            order.shuffle(&mut rng);
            test.extend_from_slice(&order[..n_test]);
        }
        Some(labels) => {
            let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
            for (i, label) in labels.iter().enumerate() {
                groups.entry(label.as_str()).or_default().push(i);
            }

            // Largest-remainder allocation of n_test across strata
            let mut alloc: Vec<(usize, f64)> = groups
                .values()
                .map(|rows| {
                    let exact = n_test as f64 * rows.len() as f64 / n as f64;
                    (exact.floor() as usize, exact - exact.floor())
                })
                .collect();
            let assigned: usize = alloc.iter().map(|(k, _)| k).sum();
            let mut by_remainder: Vec<usize> = (0..alloc.len()).collect();
            by_remainder.sort_by(|&a, &b| alloc[b].1.total_cmp(&alloc[a].1).then(a.cmp(&b)));
            for &g in by_remainder.iter().take(n_test.saturating_sub(assigned)) {
                alloc[g].0 += 1;
            }

            for ((_, rows), (k, _)) in groups.iter().zip(&alloc) {
                let mut rows = rows.clone();
                rows.shuffle(&mut rng);
                test.extend_from_slice(&rows[..(*k).min(rows.len())]);
            }
        }
    }

    test.sort_unstable();
    let in_test: HashSet<usize> = test.iter().copied().collect();
    let train = (0..n).filter(|i| !in_test.contains(i)).collect();
    Ok((train, test))
}

fn stratum_shares<'a>(strata: &'a [String], idx: &[usize]) -> HashMap<&'a str, f64> {
    let mut shares: HashMap<&str, f64> = HashMap::new();
    for &i in idx {
        *shares.entry(strata[i].as_str()).or_insert(0.0) += 1.0;
    }
    let total = idx.len() as f64;
    shares.values_mut().for_each(|c| *c /= total);
    shares
}

/// Median absolute difference between train and test stratum shares, over
/// strata present on both sides.
pub fn median_abs_diff_share(strata: &[String], train: &[usize], test: &[usize]) -> Option<f64> {
    let train_share = stratum_shares(strata, train);
    let test_share = stratum_shares(strata, test);
    let diffs: Vec<f64> = train_share
        .iter()
        .filter_map(|(k, tr)| test_share.get(k).map(|te| (tr - te).abs()))
        .collect();

    if diffs.is_empty() {
        return None;
    }
    Some(Data::new(diffs).median())
}

pub fn stratified_split(table: &CsvTable, options: StratifiedSplitOptions) -> Result<SplitIndices, DatasetError> {
    let cities = table.column(table.column_index(CITY_COLUMN)?);
    let types = table.column(table.column_index(BUILDING_TYPE_COLUMN)?);

    let (key, strata) = choose_strata(&cities, &types, options.test_size);
    let (train, test) = split_indices(table.len(), strata.as_deref(), options)?;

    Ok(SplitIndices {
        train,
        test,
        key,
        strata,
    })
}

/// Reads `input`, splits it, and writes `train_combined.csv`,
/// `test_combined.csv` and `manifest_combined.json` into `outdir`.
pub fn run_stratified_split(
    input: &Path,
    outdir: &Path,
    options: StratifiedSplitOptions,
) -> Result<SplitManifest, DatasetError> {
    let table = CsvTable::read(input)?;
    let split = stratified_split(&table, options)?;

    fs::create_dir_all(outdir)?;
    let train_path = outdir.join("train_combined.csv");
    let test_path = outdir.join("test_combined.csv");
    table.write_rows(&train_path, &split.train)?;
    table.write_rows(&test_path, &split.test)?;

    let manifest = SplitManifest {
        source_file: input.display().to_string(),
        strategy: "combined_stratified_city_type".to_string(),
        test_size: options.test_size,
        seed: options.seed,
        rows_total: table.len(),
        train_rows: split.train.len(),
        test_rows: split.test.len(),
        stratify_key: split.key.as_str().to_string(),
        train_csv_sha256: sha256_file(&train_path)?,
        test_csv_sha256: sha256_file(&test_path)?,
        median_abs_diff_share: split
            .strata
            .as_deref()
            .and_then(|s| median_abs_diff_share(s, &split.train, &split.test)),
        generated_at: Utc::now(),
    };

    let manifest_path = outdir.join("manifest_combined.json");
    fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)?;

    info!(
        "Combined stratified split done: {} train / {} test rows, stratify key {}",
        manifest.train_rows, manifest.test_rows, manifest.stratify_key
    );
    Ok(manifest)
}
