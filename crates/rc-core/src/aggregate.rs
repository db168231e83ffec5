//! Run-wide tallies.

use std::collections::BTreeMap;

use rc_model::Counts;
use rc_report::message_summary;
use serde::{Deserialize, Serialize};

/// Counts and summarized messages across every batch of a run.
///
/// Messages are summarized as they arrive, so the aggregate stays small
/// enough to persist in a run cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunAggregate {
    pub counts: Counts,
    pub messages: BTreeMap<String, usize>,
}

impl RunAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulate(&mut self, counts: Counts) {
        self.counts.merge(counts);
    }

    pub fn accumulate_messages<S: AsRef<str>>(&mut self, messages: &[S]) {
        for (message, count) in message_summary(messages) {
            *self.messages.entry(message).or_default() += count;
        }
    }

    /// Final summary; `success` is false if the run hit a fatal error.
    pub fn finalize(&self, success: bool) -> RunSummary {
        RunSummary {
            success: success && !self.counts.has_failures(),
            counts: self.counts,
            message_summary: self
                .messages
                .iter()
                .map(|(message, count)| (message.clone(), *count))
                .collect(),
        }
    }
}

/// What a finished run reports to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// No record failed and no fatal error occurred.
    pub success: bool,
    pub counts: Counts,
    /// Distinct messages and how often each occurred, sorted by text.
    pub message_summary: Vec<(String, usize)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_model::Outcome;

    #[test]
    fn messages_merge_across_batches() {
        let mut aggregate = RunAggregate::new();
        aggregate.accumulate_messages(&["Rules run: 2", "A:B:difficulty:1:x"]);
        aggregate.accumulate_messages(&["A:B:difficulty:1:y", "Bad date"]);
        let summary = aggregate.finalize(true);
        assert_eq!(
            summary.message_summary,
            vec![
                ("A:B:difficulty:1".to_string(), 2),
                ("Bad date".to_string(), 1)
            ]
        );
        assert!(summary.success);
    }

    #[test]
    fn any_failure_fails_the_run() {
        let mut counts = Counts::default();
        counts.record(Outcome::Pass);
        counts.record(Outcome::Fail);
        let mut aggregate = RunAggregate::new();
        aggregate.accumulate(counts);
        assert!(!aggregate.finalize(true).success);
        assert_eq!(aggregate.finalize(true).counts.total, 2);
    }
}
