//! Error types for catalog_importer

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Failure reported by a catalog backend
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog already holds an entity with this identity (HTTP 409)
    #[error("Conflict: entity already exists ({body})")]
    Conflict { body: String },
    /// Any other non-success HTTP status
    #[error("HTTP error {status}: {body}")]
    Status { status: StatusCode, body: String },
    /// HTTP request failed (network error, timeout, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Request body could not be serialized
    #[error("Serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CatalogError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, CatalogError::Conflict { .. })
    }
}

/// Unified error type for an import run
#[derive(Debug, Error)]
pub enum ImportError {
    /// Input file missing or unreadable
    #[error("Failed to open input file {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    /// Malformed CSV record
    #[error("Failed to read CSV record{}: {source}", line_suffix(*line))]
    Csv {
        line: Option<u64>,
        #[source]
        source: csv::Error,
    },
    /// A row lacks a column the payload builders need
    #[error("Missing column '{column}' on line {line}")]
    MissingField { column: String, line: u64 },
    /// A numeric column could not be parsed
    #[error("Invalid number '{value}' in column '{column}' on line {line}")]
    InvalidNumber {
        column: String,
        value: String,
        line: u64,
    },
    /// No API key configured for a live run
    #[error("No API key configured (set KLAVIYO_PRIVATE_KEY or pass --api-key)")]
    MissingApiKey,
    /// Building the request body failed
    #[error("Failed to build payload: {0}")]
    Payload(#[from] serde_json::Error),
    /// The catalog rejected a request for a reason other than a conflict
    #[error("{label}: {source}")]
    Catalog {
        label: String,
        #[source]
        source: CatalogError,
    },
}

fn line_suffix(line: Option<u64>) -> String {
    line.map(|l| format!(" on line {l}")).unwrap_or_default()
}

/// Result alias for import operations
pub type Result<T> = std::result::Result<T, ImportError>;
