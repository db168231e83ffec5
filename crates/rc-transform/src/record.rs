//! Building service records from input rows.

use rc_model::{
    Action, ColumnIndex, FieldMapping, IdSource, PrecisionSource, Record, RecordId, Sref,
    SrefDescriptor, SrefKind, TaxonKind,
};

use crate::error::{RecordError, Result};

/// Separators tried, in order, when both coordinates share one cell.
const COORDINATE_SEPARATORS: [&str; 2] = [",", " "];

/// Value of `column` in `row`.
pub fn cell(row: &[String], column: ColumnIndex) -> Result<&str> {
    row.get(column.get())
        .map(String::as_str)
        .ok_or(RecordError::ColumnOutOfRange {
            column,
            width: row.len(),
        })
}

/// Id of the record built from `row`.
///
/// `running_count` is the 1-based number of rows processed so far,
/// including this one.
pub fn record_id(row: &[String], running_count: u64, mapping: &FieldMapping) -> Result<RecordId> {
    match mapping.id {
        IdSource::Auto => Ok(RecordId::Number(running_count)),
        IdSource::Column(column) => Ok(RecordId::Text(cell(row, column)?.to_string())),
    }
}

/// Split a cell holding both coordinates.
///
/// The first separator that yields exactly two non-empty values wins.
pub fn split_coordinates(value: &str) -> Result<(String, String)> {
    let trimmed = value.trim();
    for separator in COORDINATE_SEPARATORS {
        let parts: Vec<&str> = trimmed.split(separator).map(str::trim).collect();
        if let [first, second] = parts.as_slice()
            && !first.is_empty()
            && !second.is_empty()
        {
            return Ok(((*first).to_string(), (*second).to_string()));
        }
    }
    Err(RecordError::SrefParse {
        value: value.to_string(),
    })
}

/// Spatial reference of `row` in the shape the service expects.
pub fn build_sref(row: &[String], mapping: &FieldMapping, sref: &SrefDescriptor) -> Result<Sref> {
    let first = cell(row, mapping.coord1)?;
    if sref.kind == SrefKind::Grid {
        return Ok(Sref::gridref(sref.srid, first));
    }

    let (dim1, dim2) = match mapping.coord2 {
        Some(column) => (first.to_string(), cell(row, column)?.to_string()),
        None => split_coordinates(first)?,
    };
    let accuracy = match &mapping.precision {
        Some(PrecisionSource::Manual(value)) => Some(value.clone()),
        Some(PrecisionSource::Column(column)) => Some(cell(row, *column)?.to_string()),
        None => None,
    };

    let mut built = Sref {
        srid: sref.srid,
        accuracy,
        ..Sref::default()
    };
    if sref.kind == SrefKind::EastingNorthing {
        built.easting = Some(dim1);
        built.northing = Some(dim2);
    } else {
        built.longitude = Some(dim1);
        built.latitude = Some(dim2);
    }
    Ok(built)
}

/// Build the record submitted for `row`.
///
/// Exactly one of `tvk` and `name` is set, following the mapping's taxon
/// kind. The life stage is only sent for verification.
pub fn build_record(
    row: &[String],
    running_count: u64,
    mapping: &FieldMapping,
    sref: &SrefDescriptor,
    action: Action,
) -> Result<Record> {
    let id = record_id(row, running_count, mapping)?;
    let date = cell(row, mapping.date)?.to_string();
    let sref = build_sref(row, mapping, sref)?;

    let taxon = cell(row, mapping.taxon.column)?.to_string();
    let (tvk, name) = match mapping.taxon.kind {
        TaxonKind::Tvk => (Some(taxon), None),
        TaxonKind::Name => (None, Some(taxon)),
    };
    let vc = mapping
        .vc
        .map(|column| cell(row, column).map(str::to_string))
        .transpose()?;
    let stage = match (action, mapping.stage) {
        (Action::Verify, Some(column)) => Some(cell(row, column)?.to_string()),
        _ => None,
    };

    Ok(Record {
        id,
        date,
        sref,
        tvk,
        name,
        vc,
        stage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_comma_before_space() {
        assert_eq!(
            split_coordinates("12.3, 45.6"),
            Ok(("12.3".to_string(), "45.6".to_string()))
        );
        assert_eq!(
            split_coordinates("12.3 45.6"),
            Ok(("12.3".to_string(), "45.6".to_string()))
        );
    }

    #[test]
    fn rejects_cells_that_do_not_split_in_two() {
        for value in ["12.3;45.6", "12.3", "1,2,3", "12.3,", " , "] {
            assert_eq!(
                split_coordinates(value),
                Err(RecordError::SrefParse {
                    value: value.to_string()
                }),
                "{value}"
            );
        }
    }

    #[test]
    fn cell_reports_row_width() {
        let row = vec!["a".to_string()];
        assert_eq!(cell(&row, ColumnIndex(0)), Ok("a"));
        assert_eq!(
            cell(&row, ColumnIndex(2)),
            Err(RecordError::ColumnOutOfRange {
                column: ColumnIndex(2),
                width: 1
            })
        );
    }
}
