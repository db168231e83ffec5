//! Field mapping for record files.
//!
//! Turns user selections into an immutable [`rc_model::FieldMapping`],
//! derives the output column plans for validation and verification files,
//! and suggests selections from header names.

pub mod error;
pub mod plan;
pub mod selection;
pub mod state;
pub mod suggest;

pub use error::MappingError;
pub use plan::{validate_plan, validate_plan_from_output, verify_mapping, verify_plan};
pub use selection::{Field, FieldSelections, Selection, Sentinel, build_mapping, check_width};
pub use state::MappingState;
pub use suggest::suggest_selections;
