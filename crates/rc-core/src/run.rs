//! One validation or verification run over an input file.
//!
//! A run moves `Idle -> HeaderRead -> Processing -> Finalized`, or to
//! `Aborted` on the first fatal error. Each call to [`FileRun::step`]
//! submits at most one batch, so callers can report progress between
//! batches, stop early, or persist a [`RunCursor`] and resume later.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rc_client::RecordService;
use rc_ingest::{RowReader, iterate_rows, read_header};
use rc_map::check_width;
use rc_model::{
    Action, FieldMapping, Outcome, OutputColumnPlan, Record, RecordId, RuleSelection,
    SrefDescriptor, TaxonKind,
};
use rc_transform::{
    PassthroughEntry, PassthroughStore, RecordError, build_record, is_validation_failure,
    passthrough_entry, record_id,
};
use serde::{Deserialize, Serialize};
use tracing::{Span, debug, info, info_span, warn};

use crate::aggregate::{RunAggregate, RunSummary};
use crate::batch::{BatchOutcome, BatchSubmitter, DEFAULT_BATCH_SIZE, warn_unanswered};
use crate::error::{Result, RunError};
use crate::sink::ResultSink;

/// Everything a run needs to know about the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub action: Action,
    /// Mapping of the input file's columns.
    pub mapping: FieldMapping,
    /// Columns of the output file.
    pub plan: OutputColumnPlan,
    pub sref: SrefDescriptor,
    /// Taxon kind of the original upload, for organism columns.
    pub taxon_kind: TaxonKind,
    pub batch_size: usize,
    /// Rules applied when verifying.
    pub rules: RuleSelection,
    /// Ask the service for detailed verification messages.
    pub verbose: bool,
}

impl RunSettings {
    pub fn new(
        action: Action,
        mapping: FieldMapping,
        plan: OutputColumnPlan,
        sref: SrefDescriptor,
        taxon_kind: TaxonKind,
    ) -> Self {
        Self {
            action,
            mapping,
            plan,
            sref,
            taxon_kind,
            batch_size: DEFAULT_BATCH_SIZE,
            rules: RuleSelection::All,
            verbose: false,
        }
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[must_use]
    pub fn with_rules(mut self, rules: RuleSelection, verbose: bool) -> Self {
        self.rules = rules;
        self.verbose = verbose;
        self
    }
}

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    HeaderRead,
    Processing,
    Finalized,
    Aborted,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunState::Idle => "idle",
            RunState::HeaderRead => "header read",
            RunState::Processing => "processing",
            RunState::Finalized => "finalized",
            RunState::Aborted => "aborted",
        };
        f.write_str(label)
    }
}

/// Position of a run within its input, for resuming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCursor {
    /// Non-blank data rows consumed, skipped ones included.
    pub rows_read: usize,
    /// Auto id of the next processed row.
    pub next_id: u64,
    pub aggregate: RunAggregate,
    /// False once any record has failed.
    pub success: bool,
}

impl Default for RunCursor {
    fn default() -> Self {
        Self {
            rows_read: 0,
            next_id: 1,
            aggregate: RunAggregate::default(),
            success: true,
        }
    }
}

/// Result of one [`FileRun::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The header was read; no rows were processed.
    Started,
    /// One batch was processed.
    Batch {
        /// Records submitted to the service.
        submitted: usize,
        /// Rows that failed before submission.
        local_failures: usize,
        /// Rows skipped because they failed validation.
        skipped: usize,
    },
    /// The input is exhausted.
    Finished,
}

/// A row that failed before submission, written after its batch.
struct LocalFailure {
    row: Vec<String>,
    id: RecordId,
    message: String,
}

/// A resumable run over one input file.
pub struct FileRun<S, K> {
    input: PathBuf,
    settings: RunSettings,
    submitter: BatchSubmitter<S>,
    sink: K,
    state: RunState,
    header: Vec<String>,
    rows: Option<RowReader>,
    cursor: RunCursor,
    /// Rows of a failed batch that reached the sink past the cursor.
    uncommitted: Option<BatchOutcome>,
    span: Span,
}

impl<S: RecordService, K: ResultSink> FileRun<S, K> {
    /// Prepare a run from the first data row.
    pub fn new(input: impl Into<PathBuf>, settings: RunSettings, service: S, sink: K) -> Self {
        Self::resume(input, settings, service, sink, RunCursor::default())
    }

    /// Prepare a run continuing from `cursor`.
    ///
    /// `sink` must append to the output written before the cursor was taken.
    pub fn resume(
        input: impl Into<PathBuf>,
        settings: RunSettings,
        service: S,
        sink: K,
        cursor: RunCursor,
    ) -> Self {
        let input = input.into();
        let submitter = match settings.action {
            Action::Validate => BatchSubmitter::validation(service),
            Action::Verify => BatchSubmitter::verification(service, &settings.rules, settings.verbose),
        };
        let span = info_span!(
            "run",
            action = %settings.action,
            input = %input.display()
        );
        Self {
            input,
            settings,
            submitter,
            sink,
            state: RunState::Idle,
            header: Vec::new(),
            rows: None,
            cursor,
            uncommitted: None,
            span,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Header of the input file, once read.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Snapshot of the run position after the last completed batch.
    ///
    /// `None` when a failed batch wrote rows past that point, since a
    /// resumed run would write them again.
    pub fn cursor(&self) -> Option<RunCursor> {
        self.uncommitted.is_none().then(|| self.cursor.clone())
    }

    /// Data rows consumed by completed batches, skipped ones included.
    pub fn rows_read(&self) -> usize {
        self.cursor.rows_read
    }

    /// Counts and messages of every row written so far.
    pub fn aggregate(&self) -> RunAggregate {
        let mut aggregate = self.cursor.aggregate.clone();
        if let Some(partial) = &self.uncommitted {
            aggregate.accumulate(partial.counts);
            aggregate.accumulate_messages(&partial.messages);
        }
        aggregate
    }

    /// Summary of the run so far.
    pub fn summary(&self) -> RunSummary {
        let success = self.cursor.success && self.state != RunState::Aborted;
        self.aggregate().finalize(success)
    }

    /// Advance the run by one stage or one batch.
    pub fn step(&mut self) -> Result<StepOutcome> {
        let span = self.span.clone();
        let _guard = span.enter();
        let outcome = match self.state {
            RunState::Idle => self.start(),
            RunState::HeaderRead => self.open_rows().and_then(|()| self.next_batch()),
            RunState::Processing => self.next_batch(),
            RunState::Finalized => Ok(StepOutcome::Finished),
            RunState::Aborted => Err(RunError::Aborted),
        };
        if let Err(err) = &outcome
            && self.state != RunState::Aborted
        {
            warn!(error = %err, rows_read = self.cursor.rows_read, "run aborted");
            self.state = RunState::Aborted;
            self.cursor.success = false;
        }
        outcome
    }

    /// Step until the input is exhausted.
    pub fn run_to_end(&mut self) -> Result<RunSummary> {
        while self.step()? != StepOutcome::Finished {}
        Ok(self.summary())
    }

    fn start(&mut self) -> Result<StepOutcome> {
        let header = read_header(&self.input)?;
        check_width(&self.settings.mapping, header.len())?;
        info!(
            columns = header.len(),
            resume_from = self.cursor.rows_read,
            "header read"
        );
        self.header = header;
        self.state = RunState::HeaderRead;
        Ok(StepOutcome::Started)
    }

    fn open_rows(&mut self) -> Result<()> {
        let rows = iterate_rows(&self.input, self.cursor.rows_read, self.header.len())?;
        self.rows = Some(rows);
        self.state = RunState::Processing;
        Ok(())
    }

    /// Build, submit and write one batch.
    ///
    /// The cursor only moves once every row of the batch is written, so a
    /// failed batch is read again on resume.
    fn next_batch(&mut self) -> Result<StepOutcome> {
        let start = Instant::now();
        let action = self.settings.action;
        let mut rows_read = self.cursor.rows_read;
        let mut next_id = self.cursor.next_id;
        let mut records: Vec<Record> = Vec::with_capacity(self.settings.batch_size);
        let mut passthrough = PassthroughStore::new();
        let mut failures = Vec::new();
        let mut skipped = 0;
        let mut exhausted = false;

        while records.len() < self.settings.batch_size {
            let Some(rows) = self.rows.as_mut() else {
                exhausted = true;
                break;
            };
            let Some(row) = rows.next() else {
                exhausted = true;
                break;
            };
            let row = row?;
            rows_read += 1;

            // Short rows fall through and fail in `prepare`.
            if matches!(
                is_validation_failure(&row, &self.settings.mapping, action),
                Ok(true)
            ) {
                skipped += 1;
                continue;
            }

            let count = next_id;
            next_id += 1;
            match self.prepare(&row, count) {
                Ok((record, entry)) => {
                    passthrough.insert(&record.id, entry);
                    records.push(record);
                }
                Err(err) => failures.push(self.local_failure(row, count, &err)),
            }
        }

        let submitted = records.len();
        let local_failures = failures.len();
        let mut outcome = BatchOutcome::new();
        let written = self
            .submitter
            .submit_batch(records, &mut passthrough, &mut self.sink, &mut outcome)
            .and_then(|()| self.write_local_failures(failures, &mut outcome));
        if let Err(err) = written {
            if outcome.counts.total > 0 {
                self.uncommitted = Some(outcome);
            }
            return Err(err);
        }
        warn_unanswered(&passthrough);

        self.cursor.rows_read = rows_read;
        self.cursor.next_id = next_id;
        self.cursor.success &= outcome.success;
        self.cursor.aggregate.accumulate(outcome.counts);
        self.cursor.aggregate.accumulate_messages(&outcome.messages);
        debug!(
            submitted,
            local_failures,
            skipped,
            rows_read,
            duration_ms = start.elapsed().as_millis(),
            "batch processed"
        );

        if exhausted {
            self.finish();
            if submitted == 0 && local_failures == 0 && skipped == 0 {
                return Ok(StepOutcome::Finished);
            }
        }
        Ok(StepOutcome::Batch {
            submitted,
            local_failures,
            skipped,
        })
    }

    fn prepare(
        &self,
        row: &[String],
        count: u64,
    ) -> std::result::Result<(Record, PassthroughEntry), RecordError> {
        let settings = &self.settings;
        let record = build_record(row, count, &settings.mapping, &settings.sref, settings.action)?;
        let entry = passthrough_entry(row, &settings.plan, settings.action)?;
        Ok((record, entry))
    }

    fn local_failure(&self, row: Vec<String>, count: u64, err: &RecordError) -> LocalFailure {
        let id = record_id(&row, count, &self.settings.mapping).unwrap_or(RecordId::Number(count));
        let message = err.to_string();
        warn!(id = %id, error = %message, "row not submitted");
        LocalFailure { row, id, message }
    }

    fn write_local_failures(
        &mut self,
        failures: Vec<LocalFailure>,
        outcome: &mut BatchOutcome,
    ) -> Result<()> {
        if failures.is_empty() {
            return Ok(());
        }
        for failure in failures {
            self.sink
                .write_local_failure(&failure.row, &failure.id, &failure.message)?;
            outcome.record(Outcome::Fail, &[failure.message]);
        }
        self.sink.flush()?;
        Ok(())
    }

    fn finish(&mut self) {
        self.rows = None;
        self.state = RunState::Finalized;
        let counts = self.cursor.aggregate.counts;
        info!(
            total = counts.total,
            pass = counts.pass,
            warn = counts.warn,
            fail = counts.fail,
            "run complete"
        );
    }
}
