//! CSV result files.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use rc_model::{Action, OutputColumnPlan};
use tracing::debug;

use crate::error::{ReportError, Result};
use crate::row::header_row;

/// Append-only CSV sink for one result file.
///
/// The header is written once when the file is created; rows are added in
/// processing order and flushed per batch.
pub struct OutputWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
    width: usize,
    rows_written: usize,
}

impl OutputWriter {
    /// Create (or truncate) `path` and write the header of `plan`.
    pub fn create(path: impl Into<PathBuf>, plan: &OutputColumnPlan) -> Result<Self> {
        let path = path.into();
        let file = File::create(&path).map_err(|err| ReportError::io(&path, err))?;
        let mut output = Self::from_file(path, file, plan.len());
        let header = header_row(plan);
        output
            .writer
            .write_record(&header)
            .map_err(|err| ReportError::csv(&output.path, err))?;
        output.flush()?;
        debug!(path = %output.path.display(), columns = output.width, "created output file");
        Ok(output)
    }

    /// Reopen an existing result file to continue a resumed run.
    pub fn append(path: impl Into<PathBuf>, plan: &OutputColumnPlan) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|err| ReportError::io(&path, err))?;
        debug!(path = %path.display(), "appending to output file");
        Ok(Self::from_file(path, file, plan.len()))
    }

    fn from_file(path: PathBuf, file: File, width: usize) -> Self {
        let writer = csv::WriterBuilder::new()
            .flexible(false)
            .from_writer(file);
        Self {
            path,
            writer,
            width,
            rows_written: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of columns every row must have.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Data rows written through this writer.
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn write_row(&mut self, row: &[String]) -> Result<()> {
        self.writer
            .write_record(row)
            .map_err(|err| ReportError::csv(&self.path, err))?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|err| ReportError::io(&self.path, err))
    }
}

/// Path for the result of running `action` on `input`.
///
/// `<stem>_<action>.csv` next to the input; `_1`, `_2`, ... are added when
/// the name is taken so earlier results are never overwritten.
pub fn output_path_for(input: &Path, action: Action) -> PathBuf {
    let dir = input.parent().unwrap_or_else(|| Path::new(""));
    let stem = input
        .file_stem()
        .map_or_else(|| "records".into(), |stem| stem.to_string_lossy());
    let base = format!("{stem}_{action}");

    let mut candidate = dir.join(format!("{base}.csv"));
    let mut suffix = 1;
    while candidate.exists() {
        candidate = dir.join(format!("{base}_{suffix}.csv"));
        suffix += 1;
    }
    candidate
}
