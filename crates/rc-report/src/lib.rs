//! Result files and summaries for record cleaner runs.
//!
//! Rows are laid out by the session's output column plan: each column's
//! function decides whether its value comes from the service result or
//! from the data passed around the service call.

mod error;
mod row;
mod summary;
mod writer;

// Error type
pub use error::{ReportError, Result};

// Rows
pub use row::{RowContext, header_row, row_for_local_failure, row_for_result};

// Files
pub use writer::{OutputWriter, output_path_for};

// Summaries
pub use summary::message_summary;
