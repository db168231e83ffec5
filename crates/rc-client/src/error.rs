//! Error types for service calls.

use thiserror::Error;

/// Errors talking to the record cleaning service.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServiceError {
    /// The service could not be reached, or the request timed out.
    #[error("could not connect to service: {0}")]
    Connect(String),

    /// The service answered with a non-success status.
    #[error("service returned HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, usually a JSON error detail.
        body: String,
    },

    /// The response body was not the expected JSON.
    #[error("could not decode service response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Returns a user-friendly error message suitable for display.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Connect(_) => "Could not connect to service. Please try again later.",
            Self::Http { status: 401 | 403, .. } => {
                "The service rejected the configured credentials."
            }
            Self::Http { status, .. } if *status >= 500 => {
                "The service failed to process the request. Please try again later."
            }
            Self::Http { .. } => "The service rejected the request.",
            Self::Decode(_) => "The service returned an unexpected response.",
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        if let Some(status) = err.status() {
            return Self::Http {
                status: status.as_u16(),
                body: err.to_string(),
            };
        }
        Self::Connect(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
