use crate::config::Config;
use crate::datetime::{format_timestamp, DateTimeParser};
use crate::error::{DateParseError, RenameError, RenameResult};
use crate::models::{RecordingRow, RenameTask, RowOutcome, RunReport};
use crate::table::MetadataTable;
use crate::util;
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Extension appended to every renamed recording. Always uppercase.
pub const DESTINATION_EXTENSION: &str = "WAV";

#[derive(Debug, Clone)]
pub struct RenameOptions {
    pub csv_path: PathBuf,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Compute tasks and report them without creating or copying anything.
    pub dry_run: bool,
}

impl RenameOptions {
    /// Options with the default `./input` and `./output` folders.
    pub fn new(csv_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            dry_run: false,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self {
            csv_path: cfg.csv_path.clone(),
            input_dir: cfg.input_dir.clone(),
            output_dir: cfg.output_dir.clone(),
            dry_run: false,
        }
    }

    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = dir.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// `YYYYMMDD_HHMMSS.WAV` for a parsed start date.
pub fn destination_name(start: &chrono::NaiveDateTime) -> String {
    format!("{}.{}", format_timestamp(start), DESTINATION_EXTENSION)
}

/// Compute the source/destination pair for one row.
pub fn plan_task(
    row: &RecordingRow,
    parser: &dyn DateTimeParser,
    opts: &RenameOptions,
) -> Result<RenameTask, DateParseError> {
    let start = parser.parse(&row.start_date)?;
    let new_name = destination_name(&start);
    Ok(RenameTask {
        source: opts.input_dir.join(&row.file_name),
        destination: opts.output_dir.join(&new_name),
        new_name,
    })
}

/// Handle a single row. Never fails: every problem becomes an outcome.
pub fn process_row(row: &RecordingRow, parser: &dyn DateTimeParser, opts: &RenameOptions) -> RowOutcome {
    let original = row.file_name.clone();

    let task = match plan_task(row, parser, opts) {
        Ok(t) => t,
        Err(e) => {
            error!(line = row.line, file = %original, "unparseable start date: {}", e);
            return RowOutcome::DateParse { original, error: e.to_string() };
        }
    };

    if !task.source.exists() {
        warn!(line = row.line, "source not found: {}", task.source.display());
        return RowOutcome::NotFound { original, source: task.source };
    }

    if opts.dry_run {
        return RowOutcome::Planned { original, new_name: task.new_name, destination: task.destination };
    }

    match util::copy_with_metadata(&task.source, &task.destination) {
        Ok(bytes) => {
            debug!(line = row.line, bytes, "copied {} -> {}", task.source.display(), task.destination.display());
            RowOutcome::Copied { original, new_name: task.new_name, destination: task.destination }
        }
        Err(e) => {
            error!(line = row.line, file = %original, "copy failed: {}", e);
            RowOutcome::Copy { original, error: e.to_string() }
        }
    }
}

/// Copy every recording listed in the CSV to its timestamped name.
///
/// Fails only when the CSV cannot be read, lacks a required column, or the
/// output directory cannot be created; all of that happens before any row is
/// touched. Row-level problems are written to `out` and collected in the
/// returned report.
pub fn rename_recordings<W: Write>(
    opts: &RenameOptions,
    parser: &dyn DateTimeParser,
    out: &mut W,
) -> RenameResult<RunReport> {
    let table = MetadataTable::from_path(&opts.csv_path)?;
    let rows = table.recording_rows()?;
    info!(rows = table.len(), csv = %opts.csv_path.display(), "loaded metadata table");
    debug!(columns = ?table.headers(), "table columns");
    if table.is_empty() {
        warn!("{} has no data rows", opts.csv_path.display());
    }

    if !opts.dry_run {
        std::fs::create_dir_all(&opts.output_dir).map_err(|source| RenameError::OutputDir {
            path: opts.output_dir.clone(),
            source,
        })?;
    }

    let mut report = RunReport { output_dir: opts.output_dir.clone(), ..Default::default() };
    // destination name -> first row that produced it
    let mut written: HashMap<String, usize> = HashMap::new();

    for row in &rows {
        let outcome = process_row(row, parser, opts);

        if let RowOutcome::Copied { new_name, .. } | RowOutcome::Planned { new_name, .. } = &outcome {
            if let Some(first) = written.get(new_name) {
                warn!(line = row.line, first_line = *first, "{} is produced by more than one row; last one wins", new_name);
                if !report.duplicates.contains(new_name) {
                    report.duplicates.push(new_name.clone());
                }
            } else {
                written.insert(new_name.clone(), row.line);
            }
        }

        writeln!(out, "{}", outcome)?;
        report.outcomes.push(outcome);
    }

    writeln!(out, "\nDone! Renamed files saved in: {}", opts.output_dir.display())?;
    info!(
        copied = report.copied(),
        not_found = report.not_found(),
        errors = report.errors(),
        "run finished"
    );
    Ok(report)
}

/// Recordings in `input_dir` (recursive) that no row of the report refers to.
pub fn unreferenced_inputs(input_dir: &Path, report: &RunReport, file_extensions: &[String]) -> Vec<PathBuf> {
    let referenced: HashSet<PathBuf> = report
        .outcomes
        .iter()
        .map(|o| input_dir.join(o.original()))
        .collect();

    let mut files: Vec<PathBuf> = WalkDir::new(input_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| util::path_matches_extensions(p, file_extensions))
        .filter(|p| !referenced.contains(p))
        .collect();
    files.sort();
    files
}
