use super::stratified_split::{BUILDING_TYPE_COLUMN, CITY_COLUMN};
use super::table::CsvTable;
use crate::domain::errors::DatasetError;
use csv::StringRecord;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Columns kept from the raw rooftop surveys, when present.
pub const COMMON_COLUMNS: &[&str] = &[
    "City",
    "Surface_area",
    "Potential_installable_area",
    "Peak_installable_capacity",
    "Energy_potential_per_year",
    "Assumed_building_type",
    "Estimated_tilt",
    "Estimated_building_height",
    "Estimated_capacity_factor",
];

/// First letter upper-case, rest lower-case.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn file_prefix(file_name: &str) -> &str {
    file_name.split('_').next().unwrap_or(file_name)
}

/// Sorted-label encoder: each distinct label maps to its rank.
pub fn label_encode(values: &[String]) -> Vec<usize> {
    let classes: Vec<&str> = values
        .iter()
        .map(String::as_str)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    values
        .iter()
        .map(|v| classes.binary_search(&v.as_str()).unwrap_or_default())
        .collect()
}

/// Standardizes one raw survey table in memory.
pub fn standardize_table(table: &CsvTable, file_name: &str) -> CsvTable {
    let kept: Vec<(usize, &str)> = COMMON_COLUMNS
        .iter()
        .filter_map(|&name| table.headers.iter().position(|h| h == name).map(|i| (i, name)))
        .collect();

    let city_guess = capitalize(file_prefix(file_name));
    let encoded = table
        .column_index(BUILDING_TYPE_COLUMN)
        .ok()
        .map(|i| label_encode(&table.column(i)));

    let rows = table
        .rows
        .iter()
        .enumerate()
        .map(|(row_idx, row)| {
            kept.iter()
                .map(|&(i, name)| {
                    let value = row.get(i).unwrap_or("");
                    match name {
                        CITY_COLUMN if value.is_empty() => city_guess.clone(),
                        BUILDING_TYPE_COLUMN => encoded
                            .as_ref()
                            .map(|codes| codes[row_idx].to_string())
                            .unwrap_or_else(|| value.to_string()),
                        _ => value.to_string(),
                    }
                })
                .collect::<StringRecord>()
        })
        .collect();

    CsvTable {
        headers: kept.iter().map(|&(_, name)| name).collect(),
        rows,
    }
}

/// Processes every `*.csv` in `input_dir` whose name contains "rooftop"
/// and writes `<prefix>.csv` files into `output_dir`.
pub fn run_standardize(input_dir: &Path, output_dir: &Path) -> Result<Vec<PathBuf>, DatasetError> {
    fs::create_dir_all(output_dir)?;

    let mut inputs: Vec<PathBuf> = fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with(".csv") && n.to_lowercase().contains("rooftop"))
                .unwrap_or(false)
        })
        .collect();
    inputs.sort();

    let mut written = Vec::with_capacity(inputs.len());
    for path in inputs {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        info!("Processing: {}", file_name);

        let table = CsvTable::read(&path)?;
        let standardized = standardize_table(&table, &file_name);

        let output = output_dir.join(format!("{}.csv", file_prefix(&file_name).to_lowercase()));
        let all: Vec<usize> = (0..standardized.len()).collect();
        standardized.write_rows(&output, &all)?;

        info!("Saved standardized file: {:?}", output);
        written.push(output);
    }

    Ok(written)
}
