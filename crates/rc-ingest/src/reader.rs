//! Header and row access for record files.

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::format::{FileKind, detect_kind, is_blank, normalize_cell};

enum RowSource {
    Delimited(csv::StringRecordsIntoIter<File>),
    Materialized(std::vec::IntoIter<Vec<String>>),
}

/// Data rows of a record file, header excluded.
///
/// Completely blank rows are skipped. Rows are truncated to the column
/// limit given when opening but never padded, so a short row stays short.
/// The reader cannot be rewound; reopen the file to start again.
pub struct RowReader {
    path: PathBuf,
    source: RowSource,
    max_columns: usize,
    blank_rows: usize,
}

impl RowReader {
    /// Number of blank rows skipped so far.
    pub fn blank_rows(&self) -> usize {
        self.blank_rows
    }

    fn next_raw(&mut self) -> Option<Result<Vec<String>>> {
        match &mut self.source {
            RowSource::Delimited(records) => Some(
                records
                    .next()?
                    .map(|record| record.iter().map(normalize_cell).collect())
                    .map_err(|error| IngestError::from_csv(&self.path, error)),
            ),
            RowSource::Materialized(rows) => rows.next().map(Ok),
        }
    }
}

impl Iterator for RowReader {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut row = match self.next_raw()? {
                Ok(row) => row,
                Err(error) => return Some(Err(error)),
            };
            row.truncate(self.max_columns);
            if is_blank(&row) {
                self.blank_rows += 1;
                continue;
            }
            return Some(Ok(row));
        }
    }
}

/// Open `path`, returning its header and a reader over the remaining rows.
fn open(path: &Path, max_columns: usize) -> Result<(Vec<String>, RowReader)> {
    let kind = detect_kind(path)?;
    debug!(path = %path.display(), ?kind, "opening record file");
    let source = match kind {
        FileKind::Delimited { delimiter } => {
            let reader = ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .delimiter(delimiter)
                .from_path(path)
                .map_err(|error| IngestError::from_csv(path, error))?;
            RowSource::Delimited(reader.into_records())
        }
        FileKind::Workbook => RowSource::Materialized(read_workbook(path)?.into_iter()),
    };
    let mut rows = RowReader {
        path: path.to_path_buf(),
        source,
        max_columns,
        blank_rows: 0,
    };
    let header = match rows.next_raw() {
        Some(header) => header?,
        None => Vec::new(),
    };
    if is_blank(&header) {
        return Err(IngestError::EmptyFile {
            path: path.to_path_buf(),
        });
    }
    Ok((header, rows))
}

#[cfg(feature = "excel")]
fn read_workbook(path: &Path) -> Result<Vec<Vec<String>>> {
    crate::workbook::read_first_sheet(path)
}

#[cfg(not(feature = "excel"))]
fn read_workbook(path: &Path) -> Result<Vec<Vec<String>>> {
    Err(IngestError::format(
        path,
        "workbook support requires the `excel` feature",
    ))
}

/// Ordered column names from the first row of `path`.
pub fn read_header(path: &Path) -> Result<Vec<String>> {
    let (header, _) = open(path, usize::MAX)?;
    Ok(header)
}

/// Data rows of `path`, skipping the first `start_row` non-blank data rows.
///
/// `max_columns` is normally the header length.
pub fn iterate_rows(path: &Path, start_row: usize, max_columns: usize) -> Result<RowReader> {
    let (_, mut rows) = open(path, max_columns)?;
    for _ in 0..start_row {
        match rows.next() {
            Some(row) => {
                row?;
            }
            None => break,
        }
    }
    if start_row > 0 {
        debug!(path = %path.display(), start_row, "resumed record file");
    }
    Ok(rows)
}

/// Number of non-blank data rows in `path`.
pub fn count_rows(path: &Path) -> Result<usize> {
    let (_, rows) = open(path, usize::MAX)?;
    let mut count = 0;
    for row in rows {
        row?;
        count += 1;
    }
    Ok(count)
}
