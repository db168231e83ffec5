//! Error types for record file ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading an input file.
#[derive(Debug, Error)]
pub enum IngestError {
    /// File missing or unreadable.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No supported reader can parse the file.
    #[error("cannot parse {path}: {reason}")]
    FileFormat { path: PathBuf, reason: String },

    /// File parsed but has no header row.
    #[error("file has no header row: {path}")]
    EmptyFile { path: PathBuf },
}

impl IngestError {
    pub(crate) fn format(path: &std::path::Path, reason: impl Into<String>) -> Self {
        Self::FileFormat {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// True for errors caused by the file's content rather than storage.
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::FileFormat { .. } | Self::EmptyFile { .. })
    }
}

impl IngestError {
    pub(crate) fn from_csv(path: &std::path::Path, error: csv::Error) -> Self {
        if !error.is_io_error() {
            return Self::format(path, error.to_string());
        }
        match error.into_kind() {
            csv::ErrorKind::Io(source) => Self::io(path, source),
            other => Self::format(path, format!("{other:?}")),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
