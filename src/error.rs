use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a whole run. Per-row failures are reported through
/// `models::RowOutcome` instead.
#[derive(Error, Debug)]
pub enum RenameError {
    #[error("CSV must contain 'File name' and 'Start date' columns (missing: {})", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("failed to read CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report: {0}")]
    Report(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateParseError {
    #[error("empty date value")]
    Empty,

    #[error("unrecognised date/time '{0}'")]
    Unrecognised(String),
}

pub type RenameResult<T> = Result<T, RenameError>;
