//! Workbook reading via `calamine`.

use std::path::Path;

use calamine::{Data, DataType, Reader, open_workbook_auto};
use chrono::NaiveDate;

use crate::error::{IngestError, Result};
use crate::format::normalize_cell;

/// Display format for date cells.
const DATE_FORMAT: &str = "%d/%m/%Y";

/// Read every row of the first worksheet as text.
///
/// Columns left of the sheet's used range are restored as empty cells so
/// that column positions match what a spreadsheet application shows.
pub(crate) fn read_first_sheet(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto(path).map_err(|error| map_error(path, error))?;
    let Some(range) = workbook.worksheet_range_at(0) else {
        return Err(IngestError::EmptyFile {
            path: path.to_path_buf(),
        });
    };
    let range = range.map_err(|error| map_error(path, error))?;
    let leading = range
        .start()
        .map_or(0, |(_, column)| usize::try_from(column).unwrap_or(0));
    let rows = range
        .rows()
        .map(|cells| {
            let mut row = vec![String::new(); leading];
            row.extend(cells.iter().map(cell_text));
            row
        })
        .collect();
    Ok(rows)
}

fn map_error(path: &Path, error: calamine::Error) -> IngestError {
    match error {
        calamine::Error::Io(source) => IngestError::io(path, source),
        other => IngestError::format(path, other.to_string()),
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => normalize_cell(text),
        Data::Int(value) => value.to_string(),
        Data::Float(value) => value.to_string(),
        Data::Bool(value) => value.to_string().to_uppercase(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_date()
            .map_or_else(|| cell.to_string(), date_text),
        Data::DurationIso(text) => text.clone(),
        Data::Error(_) => String::new(),
    }
}

fn date_text(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_floats_have_no_fraction() {
        assert_eq!(cell_text(&Data::Float(612300.0)), "612300");
        assert_eq!(cell_text(&Data::Float(-3.833)), "-3.833");
    }

    #[test]
    fn dates_are_day_first() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date");
        assert_eq!(date_text(date), "01/06/2024");
    }

    #[test]
    fn strings_are_trimmed() {
        assert_eq!(cell_text(&Data::String(" SM1234 ".into())), "SM1234");
        assert_eq!(cell_text(&Data::Empty), "");
    }
}
