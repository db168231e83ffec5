//! The seam between the run loop and the remote service.

use rc_model::{Record, ServiceResult, VerifyRequest};

use crate::error::Result;

/// Operations a run needs from the record cleaning service.
///
/// [`crate::ApiClient`] talks to the real service; tests substitute an
/// in-memory implementation.
pub trait RecordService {
    /// Validate one batch of records.
    fn validate(&self, records: &[Record]) -> Result<Vec<ServiceResult>>;

    /// Verify one batch of records against the requested rules.
    fn verify(&self, request: &VerifyRequest, verbose: bool) -> Result<Vec<ServiceResult>>;
}

impl<S: RecordService + ?Sized> RecordService for &S {
    fn validate(&self, records: &[Record]) -> Result<Vec<ServiceResult>> {
        (**self).validate(records)
    }

    fn verify(&self, request: &VerifyRequest, verbose: bool) -> Result<Vec<ServiceResult>> {
        (**self).verify(request, verbose)
    }
}
