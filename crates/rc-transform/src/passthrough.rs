//! Row data carried around the service call.
//!
//! The service only echoes the fields it was sent. Everything else the
//! output needs from the input row (additional columns, and whichever of
//! stage or vice county the service does not return for the action) is
//! kept here, keyed by record id, and joined back when results arrive.

use std::collections::{BTreeMap, HashMap, VecDeque};

use rc_model::{Action, ColumnFunction, FieldMapping, OutputColumnPlan, Outcome, RecordId};

use crate::error::Result;
use crate::record::cell;

/// Passthrough values of one row, keyed by output plan position.
pub type PassthroughEntry = BTreeMap<usize, String>;

/// Whether the output column with `function` is filled from the input row.
pub fn is_passthrough(function: ColumnFunction, action: Action) -> bool {
    match function {
        ColumnFunction::Additional => true,
        ColumnFunction::Stage => action == Action::Validate,
        ColumnFunction::Vc => action == Action::Verify,
        _ => false,
    }
}

/// Passthrough values of `row` for every plan column that needs one.
///
/// Derived columns without a source are skipped.
pub fn passthrough_entry(
    row: &[String],
    plan: &OutputColumnPlan,
    action: Action,
) -> Result<PassthroughEntry> {
    let mut entry = PassthroughEntry::new();
    for (position, column) in plan.iter().enumerate() {
        if !is_passthrough(column.function, action) {
            continue;
        }
        let Some(source) = column.source else {
            continue;
        };
        entry.insert(position, cell(row, source)?.to_string());
    }
    Ok(entry)
}

/// Whether a verify input row already failed validation.
///
/// Always false when validating or when the mapping has no result column.
pub fn is_validation_failure(row: &[String], mapping: &FieldMapping, action: Action) -> Result<bool> {
    if action == Action::Validate {
        return Ok(false);
    }
    let Some(column) = mapping.result else {
        return Ok(false);
    };
    let value = cell(row, column)?;
    Ok(value.trim().eq_ignore_ascii_case(Outcome::Fail.as_str()))
}

/// Passthrough entries of one batch, keyed by record id.
///
/// Each entry is taken exactly once. Rows sharing an id are queued and
/// handed out in insertion order.
#[derive(Debug, Default)]
pub struct PassthroughStore {
    entries: HashMap<String, VecDeque<PassthroughEntry>>,
    len: usize,
}

impl PassthroughStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: &RecordId, entry: PassthroughEntry) {
        self.entries.entry(id.key()).or_default().push_back(entry);
        self.len += 1;
    }

    /// Remove and return the entry for `id`.
    pub fn take(&mut self, id: &RecordId) -> Option<PassthroughEntry> {
        let key = id.key();
        let queue = self.entries.get_mut(&key)?;
        let entry = queue.pop_front();
        if queue.is_empty() {
            self.entries.remove(&key);
        }
        if entry.is_some() {
            self.len -= 1;
        }
        entry
    }

    /// Entries not yet taken.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Ids of entries not yet taken, sorted.
    pub fn remaining_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entries.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_and_vc_swap_between_actions() {
        assert!(is_passthrough(ColumnFunction::Stage, Action::Validate));
        assert!(!is_passthrough(ColumnFunction::Stage, Action::Verify));
        assert!(is_passthrough(ColumnFunction::Vc, Action::Verify));
        assert!(!is_passthrough(ColumnFunction::Vc, Action::Validate));
        assert!(is_passthrough(ColumnFunction::Additional, Action::Verify));
        assert!(!is_passthrough(ColumnFunction::Date, Action::Validate));
    }

    #[test]
    fn store_hands_out_each_entry_once() {
        let mut store = PassthroughStore::new();
        let first: PassthroughEntry = [(1, "a".to_string())].into();
        let second: PassthroughEntry = [(1, "b".to_string())].into();
        store.insert(&RecordId::Text("7".into()), first.clone());
        store.insert(&RecordId::Number(7), second.clone());
        assert_eq!(store.len(), 2);
        assert_eq!(store.take(&RecordId::Number(7)), Some(first));
        assert_eq!(store.take(&RecordId::Text("7".into())), Some(second));
        assert_eq!(store.take(&RecordId::Number(7)), None);
        assert!(store.is_empty());
    }
}
