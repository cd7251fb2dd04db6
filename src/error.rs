//! Error taxonomy for the normalization pipeline.
//!
//! Each stage owns one error type so the batch driver can decide, per
//! variant, whether a failure stays local to one file or stops the run:
//!
//! - [`LoadError`] and [`PersistenceError`] fail the current file only.
//! - [`FactorizationError`] fails the current file, except for
//!   [`FactorizationError::UnmappedValue`], which means the lookup built from
//!   a column disagrees with that same column and stops the batch.
//! - [`ConfigurationError`] is raised before any file is touched.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Column '{0}' already exists")]
    DuplicateColumn(String),
    #[error("Column '{name}' has {actual} row(s) but the table has {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse delimited data in {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Failed to open workbook {path:?}: {message}")]
    Workbook { path: PathBuf, message: String },
    #[error("No reader available for '{format}' sources ({path:?})")]
    NoAdapter { path: PathBuf, format: String },
    #[error("Unknown input encoding '{0}'")]
    Encoding(String),
    #[error("Header row {row} is outside the {rows} row(s) read from the source")]
    HeaderOutOfRange { row: usize, rows: usize },
    #[error("Source contains no tables")]
    Empty,
    #[error(transparent)]
    Table(#[from] TableError),
}

#[derive(Debug, Error)]
pub enum FactorizationError {
    #[error("Categorical column '{0}' is not present in the table")]
    UnknownColumn(String),
    #[error("Row {row} of column '{column}' holds '{value}', which has no lookup entry")]
    UnmappedValue {
        column: String,
        row: usize,
        value: String,
    },
    #[error("Key '{key}' in column '{column}' maps to both '{first}' and '{second}'")]
    ConflictingLabel {
        column: String,
        key: String,
        first: String,
        second: String,
    },
    #[error(transparent)]
    Table(#[from] TableError),
}

impl FactorizationError {
    /// True when the lookup disagrees with the column it was built from.
    pub fn is_invariant_breach(&self) -> bool {
        matches!(self, FactorizationError::UnmappedValue { .. })
    }
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Database error on table '{table}': {source}")]
    Database {
        table: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("Table '{table}' references '{referenced}', which has not been persisted")]
    MissingReference { table: String, referenced: String },
    #[error("Table '{0}' does not exist in the destination")]
    UnknownTable(String),
    #[error(transparent)]
    Table(#[from] TableError),
}

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error(
        "No destination database configured; pass --database or set TABLE_NORMALIZE_DATABASE"
    )]
    MissingDestination,
    #[error("Destination {path:?} is unreachable: {source}")]
    Unreachable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("Failed to read dataset config {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid dataset config {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Invalid dataset config: {0}")]
    Invalid(String),
}
