//! Row loading from the product CSV export.
//!
//! The first line is the header; every following record becomes a [`Row`]
//! mapping column names to raw string values. Column presence is not
//! validated here, the payload builders report missing columns when they
//! need them.

use std::io;
use std::path::Path;

use log::{debug, info};

use crate::error::{ImportError, Result};

/// One CSV record: column name to raw value, in header order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    line: u64,
    fields: Vec<(String, String)>,
}

impl Row {
    pub fn new<K, V>(line: u64, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            line,
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// 1-based line number in the source file.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Value of `column`. With repeated header names the last one wins.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Like [`Row::get`] but fails with `MissingField` when the column is absent.
    pub fn require(&self, column: &str) -> Result<&str> {
        self.get(column).ok_or_else(|| ImportError::MissingField {
            column: column.to_string(),
            line: self.line,
        })
    }

    /// The value only when the column exists and is not empty.
    pub fn non_empty(&self, column: &str) -> Option<&str> {
        self.get(column).filter(|value| !value.is_empty())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// Loads all rows from the CSV file at `path`, preserving file order.
pub fn load_rows<P: AsRef<Path>>(path: P) -> Result<Vec<Row>> {
    let path = path.as_ref();
    info!("Loading rows from CSV file: {}", path.display());

    let reader = reader_builder()
        .from_path(path)
        .map_err(|source| ImportError::File {
            path: path.to_path_buf(),
            source,
        })?;

    let rows = read_rows(reader)?;
    info!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Parses rows from any reader holding CSV text.
pub fn parse_rows<R: io::Read>(input: R) -> Result<Vec<Row>> {
    read_rows(reader_builder().from_reader(input))
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    // Short records keep only the columns they have.
    builder.flexible(true);
    builder
}

fn read_rows<R: io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<Row>> {
    let headers = reader.headers().map_err(csv_error)?.clone();
    debug!("CSV header: {:?}", headers.iter().collect::<Vec<_>>());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_error)?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        rows.push(Row::new(line, headers.iter().zip(record.iter())));
    }

    Ok(rows)
}

fn csv_error(source: csv::Error) -> ImportError {
    let line = source.position().map(|p| p.line());
    ImportError::Csv { line, source }
}

#[cfg(test)]
#[path = "rows_tests.rs"]
mod tests;
