//! Identifier newtypes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Zero-based position of a column in an input file's header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnIndex(pub usize);

impl ColumnIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

impl From<usize> for ColumnIndex {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

impl fmt::Display for ColumnIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a submitted record.
///
/// Auto-numbered records carry their running count; records keyed by an
/// input column carry the cell text unchanged. The service may echo either
/// form back, so correlation always goes through [`RecordId::key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(u64),
    Text(String),
}

impl RecordId {
    /// String form used to correlate service results with passthrough data.
    pub fn key(&self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::Text(value) => value.clone(),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}
