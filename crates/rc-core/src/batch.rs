//! Submitting records to the service in batches.

use std::time::Instant;

use rc_client::RecordService;
use rc_model::{Action, Counts, OrgGroupRules, Outcome, Record, RuleSelection, VerifyRequest};
use rc_transform::PassthroughStore;
use tracing::{debug, warn};

use crate::error::{CorrelationError, Result};
use crate::sink::ResultSink;

/// Default number of records per service call.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// What one or more batches returned.
///
/// Only rows that reached the sink are counted, so after a failed batch
/// the outcome still agrees with the output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// No written result was `fail`.
    pub success: bool,
    pub counts: Counts,
    pub messages: Vec<String>,
}

impl BatchOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one written row.
    pub fn record<S: AsRef<str>>(&mut self, outcome: Outcome, messages: &[S]) {
        if outcome == Outcome::Fail {
            self.success = false;
        }
        self.counts.record(outcome);
        self.messages
            .extend(messages.iter().map(|message| message.as_ref().to_string()));
    }
}

impl Default for BatchOutcome {
    fn default() -> Self {
        Self {
            success: true,
            counts: Counts::default(),
            messages: Vec::new(),
        }
    }
}

/// Sends batches to the service and writes a row per result.
pub struct BatchSubmitter<S> {
    service: S,
    action: Action,
    rules: Vec<OrgGroupRules>,
    verbose: bool,
}

impl<S: RecordService> BatchSubmitter<S> {
    pub fn validation(service: S) -> Self {
        Self {
            service,
            action: Action::Validate,
            rules: Vec::new(),
            verbose: false,
        }
    }

    pub fn verification(service: S, rules: &RuleSelection, verbose: bool) -> Self {
        Self {
            service,
            action: Action::Verify,
            rules: rules.to_request_list(),
            verbose,
        }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// Submit one batch, counting written rows into `outcome`.
    ///
    /// Results are written to `sink` in the order the service returns them,
    /// each joined with the passthrough entry of its id. A result whose id
    /// has no entry is a [`CorrelationError`]; rows written before it stay
    /// counted.
    pub fn submit_batch<K: ResultSink>(
        &self,
        records: Vec<Record>,
        passthrough: &mut PassthroughStore,
        sink: &mut K,
        outcome: &mut BatchOutcome,
    ) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let submitted = records.len();
        let start = Instant::now();
        let results = match self.action {
            Action::Validate => self.service.validate(&records)?,
            Action::Verify => {
                let request = VerifyRequest {
                    org_group_rules_list: self.rules.clone(),
                    records,
                };
                self.service.verify(&request, self.verbose)?
            }
        };
        debug!(
            action = %self.action,
            submitted,
            returned = results.len(),
            duration_ms = start.elapsed().as_millis(),
            "batch returned"
        );

        for result in &results {
            let entry = passthrough.take(&result.id).ok_or_else(|| CorrelationError {
                id: result.id.key(),
            })?;
            sink.write_result(result, &entry)?;
            outcome.record(result.result, &result.messages);
        }
        sink.flush()?;
        Ok(())
    }

    /// Submit `records` in batches of `batch_size`, counting into `outcome`.
    ///
    /// Stops at the first failing batch; rows of earlier batches stay written.
    pub fn submit<K: ResultSink>(
        &self,
        records: Vec<Record>,
        mut passthrough: PassthroughStore,
        batch_size: usize,
        sink: &mut K,
        outcome: &mut BatchOutcome,
    ) -> Result<()> {
        let batch_size = batch_size.max(1);
        let mut records = records.into_iter().peekable();
        while records.peek().is_some() {
            let batch: Vec<Record> = records.by_ref().take(batch_size).collect();
            self.submit_batch(batch, &mut passthrough, sink, outcome)?;
        }
        warn_unanswered(&passthrough);
        Ok(())
    }
}

/// Log records the service returned no result for.
pub(crate) fn warn_unanswered(passthrough: &PassthroughStore) {
    if !passthrough.is_empty() {
        warn!(
            missing = passthrough.len(),
            ids = ?passthrough.remaining_ids(),
            "service returned no result for some records"
        );
    }
}
