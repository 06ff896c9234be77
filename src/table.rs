use crate::error::{RenameError, RenameResult};
use crate::models::RecordingRow;
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;

pub const FILE_NAME_COLUMN: &str = "File name";
pub const START_DATE_COLUMN: &str = "Start date";

/// Parsed CSV content: trimmed header names and the raw rows.
#[derive(Debug, Clone)]
pub struct MetadataTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl MetadataTable {
    pub fn from_path(path: &Path) -> RenameResult<Self> {
        let file = std::fs::File::open(path).map_err(|e| RenameError::Csv {
            path: path.to_path_buf(),
            source: csv::Error::from(e),
        })?;
        Self::from_reader(file).map_err(|source| RenameError::Csv {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // recorder exports sometimes drop trailing empty cells
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h };
                h.trim().to_string()
            })
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            // the reader already drops empty lines; a row of bare delimiters is still a row
            rows.push(record.iter().map(|v| v.to_string()).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Extract the recording rows. Fails before yielding anything if either
    /// required column is absent.
    pub fn recording_rows(&self) -> RenameResult<Vec<RecordingRow>> {
        let file_idx = self.column_index(FILE_NAME_COLUMN);
        let date_idx = self.column_index(START_DATE_COLUMN);

        let (file_idx, date_idx) = match (file_idx, date_idx) {
            (Some(f), Some(d)) => (f, d),
            (f, d) => {
                let mut missing = Vec::new();
                if f.is_none() {
                    missing.push(FILE_NAME_COLUMN.to_string());
                }
                if d.is_none() {
                    missing.push(START_DATE_COLUMN.to_string());
                }
                return Err(RenameError::MissingColumns { missing });
            }
        };

        let cell = |row: &Vec<String>, idx: usize| row.get(idx).map(|v| v.trim().to_string()).unwrap_or_default();

        Ok(self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| RecordingRow {
                line: i + 1,
                file_name: cell(row, file_idx),
                start_date: cell(row, date_idx),
            })
            .collect())
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}
