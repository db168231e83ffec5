//! Run-level errors.

use rc_client::ServiceError;
use rc_ingest::IngestError;
use rc_map::MappingError;
use rc_report::ReportError;
use thiserror::Error;

/// A service result whose id matches no submitted record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("service returned result for unknown record id '{id}'")]
pub struct CorrelationError {
    pub id: String,
}

/// Errors that abort a run.
///
/// Rows already written stay in the output file and the partial
/// aggregate remains readable from the run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Correlation(#[from] CorrelationError),

    #[error(transparent)]
    Report(#[from] ReportError),

    /// `step` called on a run that already failed.
    #[error("run was aborted")]
    Aborted,
}

/// Result type for run operations.
pub type Result<T> = std::result::Result<T, RunError>;
