//! Service availability.

use std::fmt;

use serde::Deserialize;

/// Body of `GET /`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub maintenance_mode: bool,
    #[serde(default)]
    pub maintenance_message: Option<String>,
}

/// Whether a run can start against the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceStatus {
    Ok,
    /// Reachable but in maintenance mode.
    Maintenance(String),
    /// Unreachable or answering with errors.
    Offline(String),
}

impl ServiceStatus {
    pub fn from_response(response: &StatusResponse) -> Self {
        if response.maintenance_mode {
            let message = response
                .maintenance_message
                .clone()
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| "The service is undergoing maintenance.".to_string());
            Self::Maintenance(message)
        } else {
            Self::Ok
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.write_str("online"),
            Self::Maintenance(message) => write!(f, "maintenance: {message}"),
            Self::Offline(reason) => write!(f, "offline: {reason}"),
        }
    }
}
