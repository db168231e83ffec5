//! Reading record files.
//!
//! Delimited text is parsed with `csv`; workbooks (behind the default
//! `excel` feature) with `calamine`. Either way the caller sees the header
//! as a list of names and the data as rows of trimmed strings.

pub mod error;
pub mod format;
pub mod reader;
#[cfg(feature = "excel")]
mod workbook;

pub use error::{IngestError, Result};
pub use format::{FileKind, detect_kind};
pub use reader::{RowReader, count_rows, iterate_rows, read_header};
