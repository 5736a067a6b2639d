//! Error types for loading and exporting sales data.
//!
//! Fatal problems surface as [`LoadError`] / [`ExportError`]. Problems with a
//! single record are not errors: they become [`RowIssue`]s attached to the
//! loaded dataset and the record is skipped.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Fatal load errors
// ---------------------------------------------------------------------------

/// Errors that abort a load before any record is produced.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The input file does not exist.
    #[error("File not found: {}", .path.display())]
    SourceNotFound { path: PathBuf },

    /// One or more required columns are absent from the header.
    #[error("The dataset is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// The source has no header row at all.
    #[error("The data source is empty")]
    EmptySource,

    /// Failed to read the source.
    #[error("Failed to read data source: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV (bad quoting, invalid UTF-8, ...).
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed JSON or a document that is not an array of objects.
    #[error("Invalid JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Json(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors while serializing a filtered view.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Per-record issues
// ---------------------------------------------------------------------------

/// Why a single source record was dropped during load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowIssue {
    /// A column had no value.
    MissingValue { column: String },
    /// The `Date` value did not match `MM/DD/YYYY`.
    DateParse { value: String },
    /// A numeric column held something that is not a number of the right kind.
    InvalidNumber { column: String, value: String },
    /// A numeric column held a negative number.
    Negative { column: String, value: String },
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowIssue::MissingValue { column } => write!(f, "missing value in '{column}'"),
            RowIssue::DateParse { value } => {
                write!(f, "date '{value}' does not match MM/DD/YYYY")
            }
            RowIssue::InvalidNumber { column, value } => {
                write!(f, "'{value}' is not a valid {column}")
            }
            RowIssue::Negative { column, value } => {
                write!(f, "{column} must not be negative, got '{value}'")
            }
        }
    }
}

/// A record that was skipped during load. `row` is the 1-based position of
/// the record among the data rows (the header is not counted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub row: u64,
    pub issue: RowIssue,
}

pub type LoadResult<T> = Result<T, LoadError>;

pub type ExportResult<T> = Result<T, ExportError>;
