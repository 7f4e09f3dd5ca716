use crate::domain::errors::DatasetError;
use csv::StringRecord;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Untyped CSV table: header plus raw rows.
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl CsvTable {
    pub fn read(path: &Path) -> Result<Self, DatasetError> {
        let file = File::open(path)?;
        let mut rdr = csv::Reader::from_reader(BufReader::new(file));
        let headers = rdr.headers()?.clone();
        let rows = rdr.records().collect::<Result<Vec<_>, _>>()?;
        Ok(Self { headers, rows })
    }

    pub fn column_index(&self, name: &str) -> Result<usize, DatasetError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DatasetError::MissingColumn {
                column: name.to_string(),
            })
    }

    /// Values of one column, empty string for short rows.
    pub fn column(&self, index: usize) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.get(index).unwrap_or("").to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes the header and the selected rows, in the given order.
    pub fn write_rows(&self, path: &Path, indices: &[usize]) -> Result<(), DatasetError> {
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(&self.headers)?;
        for &i in indices {
            wtr.write_record(&self.rows[i])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Hex SHA-256 of a file's bytes.
pub fn sha256_file(path: &Path) -> Result<String, DatasetError> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 1 << 20];
    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
