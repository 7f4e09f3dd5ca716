use crate::domain::errors::ArtifactError;
use crate::domain::solar::{CityLocation, WeatherRecord, WeatherTable};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

fn weather_error(path: &Path, reason: impl ToString) -> ArtifactError {
    ArtifactError::WeatherTable {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Parses weather rows. `path` is only used in error messages.
pub fn read_weather_table<R: Read>(reader: R, path: &Path) -> Result<WeatherTable, ArtifactError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let records = rdr
        .deserialize::<WeatherRecord>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| weather_error(path, e))?;
    if records.is_empty() {
        return Err(weather_error(path, "no rows"));
    }
    Ok(WeatherTable::from_records(records))
}

pub fn load_weather_table(path: &Path) -> Result<WeatherTable, ArtifactError> {
    let file = File::open(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_weather_table(file, path)?;
    info!("Loaded weather for {} cities from {:?}", table.len(), path);
    Ok(table)
}

pub fn write_weather_records<W: Write>(writer: W, records: &[WeatherRecord]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_city_locations<R: Read>(reader: R) -> anyhow::Result<Vec<CityLocation>> {
    let mut rdr = csv::Reader::from_reader(reader);
    Ok(rdr.deserialize().collect::<Result<Vec<_>, _>>()?)
}

pub fn write_city_locations<W: Write>(writer: W, locations: &[CityLocation]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for location in locations {
        wtr.serialize(location)?;
    }
    wtr.flush()?;
    Ok(())
}
