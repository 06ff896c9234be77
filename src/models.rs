use std::fmt;
use std::path::PathBuf;

/// One recording's metadata, values already trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingRow {
    /// 1-based data row number (header excluded).
    pub line: usize,
    pub file_name: String,
    pub start_date: String,
}

/// Source/destination pair computed for a single row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameTask {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub new_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Copied { original: String, new_name: String, destination: PathBuf },
    /// Dry run: the task was computed but nothing was written.
    Planned { original: String, new_name: String, destination: PathBuf },
    NotFound { original: String, source: PathBuf },
    DateParse { original: String, error: String },
    Copy { original: String, error: String },
}

impl RowOutcome {
    pub fn original(&self) -> &str {
        match self {
            RowOutcome::Copied { original, .. }
            | RowOutcome::Planned { original, .. }
            | RowOutcome::NotFound { original, .. }
            | RowOutcome::DateParse { original, .. }
            | RowOutcome::Copy { original, .. } => original,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RowOutcome::DateParse { .. } | RowOutcome::Copy { .. })
    }
}

impl fmt::Display for RowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowOutcome::Copied { original, new_name, .. } => {
                write!(f, "Renamed: {} -> {}", original, new_name)
            }
            RowOutcome::Planned { original, new_name, .. } => {
                write!(f, "Would rename: {} -> {}", original, new_name)
            }
            RowOutcome::NotFound { source, .. } => {
                write!(f, "File not found: {}", source.display())
            }
            RowOutcome::DateParse { original, error } | RowOutcome::Copy { original, error } => {
                write!(f, "Error processing {}: {}", original, error)
            }
        }
    }
}

/// Everything a run produced, in table order.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub output_dir: PathBuf,
    pub outcomes: Vec<RowOutcome>,
    /// Destination names written by more than one row; the last row wins.
    pub duplicates: Vec<String>,
}

impl RunReport {
    pub fn copied(&self) -> usize {
        self.outcomes.iter().filter(|o| matches!(o, RowOutcome::Copied { .. })).count()
    }

    pub fn not_found(&self) -> usize {
        self.outcomes.iter().filter(|o| matches!(o, RowOutcome::NotFound { .. })).count()
    }

    pub fn errors(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_error()).count()
    }
}
