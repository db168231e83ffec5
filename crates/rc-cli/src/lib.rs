//! Library components of the record-cleaner CLI.

pub mod config;
pub mod logging;
pub mod session;
pub mod traced;
