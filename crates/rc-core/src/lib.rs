//! Record cleaner run loop.
//!
//! Reads an input file row by row, builds service records, submits them in
//! batches, joins the results with the row data held back from the
//! service, and writes one output row per record while keeping run-wide
//! counts and a message summary.
//!
//! # Example
//!
//! ```ignore
//! let sink = CsvSink::create(output_path, settings.plan.clone(), context)?;
//! let mut run = FileRun::new(input_path, settings, &client, sink);
//! let summary = run.run_to_end()?;
//! ```

mod aggregate;
mod batch;
mod error;
mod run;
mod sink;

// Error types
pub use error::{CorrelationError, Result, RunError};

// Batching
pub use batch::{BatchOutcome, BatchSubmitter, DEFAULT_BATCH_SIZE};

// Aggregation
pub use aggregate::{RunAggregate, RunSummary};

// Runs
pub use run::{FileRun, RunCursor, RunSettings, RunState, StepOutcome};
pub use sink::{CsvSink, ResultSink};
