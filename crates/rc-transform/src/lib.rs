//! Row transformation for the record cleaner.
//!
//! Turns input rows into the records submitted to the service, extracts the
//! values that travel around the service call, and decides which verify
//! input rows are skipped.
//!
//! All functions are pure: the same row, count and mapping always produce
//! the same record.

mod error;
mod passthrough;
mod record;

// Error type
pub use error::{RecordError, Result};

// Record building
pub use record::{build_record, build_sref, cell, record_id, split_coordinates};

// Passthrough data and skip policy
pub use passthrough::{
    PassthroughEntry, PassthroughStore, is_passthrough, is_validation_failure, passthrough_entry,
};
