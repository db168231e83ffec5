//! Client for the remote record cleaning service.
//!
//! Wraps the service's REST endpoints: token login, status, validation,
//! verification, and the organisation group rule listings.

mod client;
mod config;
mod error;
mod rules;
mod service;
mod status;

// Client
pub use client::ApiClient;
pub use config::{DEFAULT_TIMEOUT_SECS, ServiceConfig};
pub use service::RecordService;

// Error type
pub use error::{Result, ServiceError};

// Responses
pub use rules::{OrgGroup, OrgGroupDetail, RuleEntry, build_catalogue, rule_label};
pub use status::{ServiceStatus, StatusResponse};
