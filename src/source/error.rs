//! Table reading errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading the export tables. All of them are fatal.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("malformed table `{0}`")]
    Csv(PathBuf, #[source] csv::Error),

    #[error("`{path}` line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("node {id}: created timestamp `{value}` is not an integer")]
    InvalidTimestamp { id: String, value: String },
}
