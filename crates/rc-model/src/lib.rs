//! Shared data model for the record cleaner pipeline.
//!
//! Everything that crosses a crate boundary lives here: which column serves
//! which semantic role, the record shape sent to the remote service, the
//! result shape it returns, and the output column plan that drives how
//! result files are written.

pub mod counts;
pub mod enums;
pub mod ids;
pub mod lenient;
pub mod mapping;
pub mod plan;
pub mod record;
pub mod rules;
pub mod service;
pub mod sref;

pub use counts::Counts;
pub use enums::{Action, Outcome, TaxonKind};
pub use ids::{ColumnIndex, RecordId};
pub use mapping::{FieldMapping, IdSource, PrecisionSource, TaxonColumn};
pub use plan::{ColumnFunction, OutputColumn, OutputColumnPlan};
pub use record::{Record, Sref};
pub use rules::{OrgGroupCatalogue, OrgGroupRules, RuleSelection};
pub use service::{ServiceResult, VerifyRequest, VerifyResponse};
pub use sref::{CoordinateColumns, SrefDescriptor, SrefKind};
