//! Destinations for output rows.

use std::path::{Path, PathBuf};

use rc_model::{OutputColumnPlan, RecordId, ServiceResult};
use rc_report::{OutputWriter, ReportError, RowContext, row_for_local_failure, row_for_result};
use rc_transform::PassthroughEntry;

/// Receives output rows in processing order.
pub trait ResultSink {
    /// Write the row for one service result joined with its passthrough data.
    fn write_result(
        &mut self,
        result: &ServiceResult,
        passthrough: &PassthroughEntry,
    ) -> Result<(), ReportError>;

    /// Write the row for an input row that could not be submitted.
    fn write_local_failure(
        &mut self,
        row: &[String],
        id: &RecordId,
        message: &str,
    ) -> Result<(), ReportError>;

    /// Called after every batch.
    fn flush(&mut self) -> Result<(), ReportError>;
}

/// Result file laid out by an output column plan.
pub struct CsvSink {
    writer: OutputWriter,
    plan: OutputColumnPlan,
    context: RowContext,
}

impl CsvSink {
    /// Create the result file and write its header.
    pub fn create(
        path: impl Into<PathBuf>,
        plan: OutputColumnPlan,
        context: RowContext,
    ) -> Result<Self, ReportError> {
        let writer = OutputWriter::create(path, &plan)?;
        Ok(Self {
            writer,
            plan,
            context,
        })
    }

    /// Reopen a result file written by an interrupted run.
    pub fn append(
        path: impl Into<PathBuf>,
        plan: OutputColumnPlan,
        context: RowContext,
    ) -> Result<Self, ReportError> {
        let writer = OutputWriter::append(path, &plan)?;
        Ok(Self {
            writer,
            plan,
            context,
        })
    }

    pub fn path(&self) -> &Path {
        self.writer.path()
    }
}

impl ResultSink for CsvSink {
    fn write_result(
        &mut self,
        result: &ServiceResult,
        passthrough: &PassthroughEntry,
    ) -> Result<(), ReportError> {
        let row = row_for_result(result, passthrough, &self.plan, &self.context);
        self.writer.write_row(&row)
    }

    fn write_local_failure(
        &mut self,
        row: &[String],
        id: &RecordId,
        message: &str,
    ) -> Result<(), ReportError> {
        let row = row_for_local_failure(row, id, message, &self.plan);
        self.writer.write_row(&row)
    }

    fn flush(&mut self) -> Result<(), ReportError> {
        self.writer.flush()
    }
}

impl<K: ResultSink + ?Sized> ResultSink for &mut K {
    fn write_result(
        &mut self,
        result: &ServiceResult,
        passthrough: &PassthroughEntry,
    ) -> Result<(), ReportError> {
        (**self).write_result(result, passthrough)
    }

    fn write_local_failure(
        &mut self,
        row: &[String],
        id: &RecordId,
        message: &str,
    ) -> Result<(), ReportError> {
        (**self).write_local_failure(row, id, message)
    }

    fn flush(&mut self) -> Result<(), ReportError> {
        (**self).flush()
    }
}
