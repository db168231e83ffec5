//! Input format detection.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{IngestError, Result};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Delimited text with the given field delimiter.
    Delimited { delimiter: u8 },
    /// Spreadsheet workbook; only the first worksheet is read.
    Workbook,
}

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Detect the format of `path` from its extension.
///
/// `.txt` files are sniffed: a tab in the first line selects tab delimiting.
pub fn detect_kind(path: &Path) -> Result<FileKind> {
    std::fs::metadata(path).map_err(|source| IngestError::io(path, source))?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "csv" => Ok(FileKind::Delimited { delimiter: b',' }),
        "tsv" | "tab" => Ok(FileKind::Delimited { delimiter: b'\t' }),
        "txt" => sniff_delimiter(path).map(|delimiter| FileKind::Delimited { delimiter }),
        ext if WORKBOOK_EXTENSIONS.contains(&ext) => Ok(FileKind::Workbook),
        "" => Err(IngestError::format(path, "file has no extension")),
        other => Err(IngestError::format(
            path,
            format!("unsupported extension '{other}'"),
        )),
    }
}

fn sniff_delimiter(path: &Path) -> Result<u8> {
    let file = File::open(path).map_err(|source| IngestError::io(path, source))?;
    let mut first_line = String::new();
    BufReader::new(file)
        .read_line(&mut first_line)
        .map_err(|source| IngestError::io(path, source))?;
    Ok(if first_line.contains('\t') { b'\t' } else { b',' })
}

/// Trim whitespace and byte-order marks from a cell.
pub(crate) fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').trim().to_string()
}

pub(crate) fn is_blank(row: &[String]) -> bool {
    row.iter().all(String::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_bom_and_whitespace() {
        assert_eq!(normalize_cell("\u{feff} Date "), "Date");
        assert_eq!(normalize_cell("  "), "");
    }

    #[test]
    fn blank_rows_have_only_empty_cells() {
        assert!(is_blank(&[String::new(), String::new()]));
        assert!(!is_blank(&[String::new(), "x".to_string()]));
    }
}
