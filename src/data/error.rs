use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading the countries-aggregated table.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV is missing the '{0}' column")]
    MissingColumn(&'static str),

    #[error("row {row}: '{value}' is not a YYYY-MM-DD date")]
    BadDate { row: usize, value: String },

    #[error("row {row}, column {column}: '{value}' is not a count")]
    BadCount {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("the table contains no rows")]
    Empty,
}

/// Errors raised while writing the filtered view.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("flush failed: {0}")]
    Flush(#[from] io::Error),
}
