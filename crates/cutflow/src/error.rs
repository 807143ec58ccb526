//! Error types for the cutflow library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for cutflow operations.
#[derive(Debug, Error)]
pub enum CutflowError {
    /// A cut referenced a column absent from the dataset.
    ///
    /// This indicates a schema mismatch between the cut definition and the
    /// event table; it is never retried.
    #[error("missing column '{column}'")]
    MissingColumn { column: String },

    /// A column exists but does not have the type the operation needs.
    #[error("column '{column}' is not {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
    },

    /// A column insert did not match the dataset's row count.
    #[error("column '{column}' has {actual} rows, dataset has {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// A cut expression failed to parse or type-check.
    #[error("invalid expression '{expression}': {message}")]
    InvalidExpression { expression: String, message: String },

    /// A cut or selection was constructed with inconsistent configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A cut was requested at a version with no known implementation.
    #[error("cut '{cut}' has no implementation for version {version}")]
    UnsupportedVersion { cut: String, version: u32 },

    /// The run-info service has no end time for a run in the dataset.
    #[error("no end time known for run {run}")]
    RunInfo { run: i64 },

    /// Error parsing a cell while loading an event table.
    #[error("parse error at row {row}, column '{column}': {message}")]
    Parse {
        row: usize,
        column: String,
        message: String,
    },

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for cutflow operations.
pub type Result<T> = std::result::Result<T, CutflowError>;
