//! Result sink that traces every row it writes.

use rc_core::ResultSink;
use rc_model::{RecordId, ServiceResult};
use rc_report::ReportError;
use rc_transform::PassthroughEntry;
use tracing::trace;

use crate::logging::redact_value;

/// Wraps a sink, logging each row at trace level.
///
/// Record values are redacted unless `--log-data` was given.
pub struct TracedSink<K> {
    inner: K,
    rows: usize,
}

impl<K> TracedSink<K> {
    pub fn new(inner: K) -> Self {
        Self { inner, rows: 0 }
    }

    /// Rows written through this sink.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn inner(&self) -> &K {
        &self.inner
    }
}

impl<K: ResultSink> ResultSink for TracedSink<K> {
    fn write_result(
        &mut self,
        result: &ServiceResult,
        passthrough: &PassthroughEntry,
    ) -> Result<(), ReportError> {
        trace!(
            id = %result.id,
            result = %result.result,
            messages = redact_value(&result.messages.join("; ")),
            "result row"
        );
        self.inner.write_result(result, passthrough)?;
        self.rows += 1;
        Ok(())
    }

    fn write_local_failure(
        &mut self,
        row: &[String],
        id: &RecordId,
        message: &str,
    ) -> Result<(), ReportError> {
        trace!(
            id = %id,
            row = redact_value(&row.join(",")),
            "local failure row"
        );
        self.inner.write_local_failure(row, id, message)?;
        self.rows += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ReportError> {
        self.inner.flush()
    }
}
