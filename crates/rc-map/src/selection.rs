//! User selections and the pure mapping builder.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rc_model::sref::DEFAULT_PRECISION;
use rc_model::{
    ColumnIndex, CoordinateColumns, FieldMapping, IdSource, PrecisionSource, SrefDescriptor,
    SrefKind, TaxonColumn, TaxonKind,
};
use serde::{Deserialize, Serialize};

use crate::error::MappingError;

/// Semantic fields a selection can be made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Id,
    Date,
    Taxon,
    Vc,
    Stage,
    Coord1,
    Coord2,
    Precision,
    Result,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Date => "date",
            Field::Taxon => "taxon",
            Field::Vc => "vice county",
            Field::Stage => "life stage",
            Field::Coord1 => "coordinate 1",
            Field::Coord2 => "coordinate 2",
            Field::Precision => "precision",
            Field::Result => "result",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-column selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentinel {
    /// Number rows as they are processed (id only).
    Auto,
    /// Use the manual precision value (precision only).
    Manual,
}

impl Sentinel {
    fn as_str(self) -> &'static str {
        match self {
            Sentinel::Auto => "auto",
            Sentinel::Manual => "manual",
        }
    }
}

/// One field's selection: a column position, a header name, or a sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selection {
    Index(usize),
    Sentinel(Sentinel),
    /// Header name, resolved against the file's columns before building.
    Header(String),
}

impl Selection {
    pub fn column(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Everything the user chose across the mapping steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelections {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Selection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Selection>,
    pub taxon_kind: TaxonKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxon: Option<Selection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vc: Option<Selection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Selection>,
    pub sref: SrefDescriptor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coord1: Option<Selection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coord2: Option<Selection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<Selection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Selection>,
    #[serde(default)]
    pub additional: Vec<Selection>,
}

impl FieldSelections {
    /// Empty selections for a taxon kind and spatial reference.
    pub fn new(taxon_kind: TaxonKind, sref: SrefDescriptor) -> Self {
        Self {
            id: None,
            date: None,
            taxon_kind,
            taxon: None,
            vc: None,
            stage: None,
            sref,
            coord1: None,
            coord2: None,
            precision: None,
            precision_value: None,
            result: None,
            additional: Vec::new(),
        }
    }

    /// Replace header-name selections with column positions.
    pub fn resolve(&self, columns: &[String]) -> Result<FieldSelections, MappingError> {
        let lookup = |selection: &Option<Selection>| -> Result<Option<Selection>, MappingError> {
            selection
                .as_ref()
                .map(|selection| resolve_one(selection, columns))
                .transpose()
        };
        Ok(FieldSelections {
            id: lookup(&self.id)?,
            date: lookup(&self.date)?,
            taxon_kind: self.taxon_kind,
            taxon: lookup(&self.taxon)?,
            vc: lookup(&self.vc)?,
            stage: lookup(&self.stage)?,
            sref: self.sref,
            coord1: lookup(&self.coord1)?,
            coord2: lookup(&self.coord2)?,
            precision: lookup(&self.precision)?,
            precision_value: self.precision_value.clone(),
            result: lookup(&self.result)?,
            additional: self
                .additional
                .iter()
                .map(|selection| resolve_one(selection, columns))
                .collect::<Result<_, _>>()?,
        })
    }
}

fn resolve_one(selection: &Selection, columns: &[String]) -> Result<Selection, MappingError> {
    match selection {
        Selection::Header(name) => columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(name.trim()))
            .map(Selection::Index)
            .ok_or_else(|| MappingError::ColumnNotFound(name.clone())),
        other => Ok(other.clone()),
    }
}

fn column_of(field: Field, selection: &Selection) -> Result<ColumnIndex, MappingError> {
    match selection {
        Selection::Index(index) => Ok(ColumnIndex(*index)),
        Selection::Sentinel(sentinel) => Err(MappingError::InvalidSentinel {
            field,
            sentinel: sentinel.as_str(),
        }),
        Selection::Header(name) => Err(MappingError::ColumnNotFound(name.clone())),
    }
}

fn required(field: Field, selection: Option<&Selection>) -> Result<ColumnIndex, MappingError> {
    let selection = selection.ok_or(MappingError::MissingField(field))?;
    column_of(field, selection)
}

fn optional(field: Field, selection: Option<&Selection>) -> Result<Option<ColumnIndex>, MappingError> {
    selection.map(|selection| column_of(field, selection)).transpose()
}

fn manual_precision(value: Option<&str>) -> Result<PrecisionSource, MappingError> {
    let value = value.unwrap_or(DEFAULT_PRECISION).trim();
    let valid = !value.is_empty() && value.len() <= 6 && value.bytes().all(|b| b.is_ascii_digit());
    if valid {
        Ok(PrecisionSource::Manual(value.to_string()))
    } else {
        Err(MappingError::InvalidPrecision(value.to_string()))
    }
}

/// Build a [`FieldMapping`] from user selections.
///
/// Pure and deterministic. Header-name selections must be resolved first
/// with [`FieldSelections::resolve`].
pub fn build_mapping(selections: &FieldSelections) -> Result<FieldMapping, MappingError> {
    let sref = selections.sref;
    if !sref.is_known_system() {
        return Err(MappingError::UnknownSystem {
            kind: sref.kind,
            srid: sref.srid,
        });
    }

    let id = match &selections.id {
        None | Some(Selection::Sentinel(Sentinel::Auto)) => IdSource::Auto,
        Some(selection) => IdSource::Column(column_of(Field::Id, selection)?),
    };
    let date = required(Field::Date, selections.date.as_ref())?;
    let taxon = TaxonColumn {
        kind: selections.taxon_kind,
        column: required(Field::Taxon, selections.taxon.as_ref())?,
    };
    let vc = optional(Field::Vc, selections.vc.as_ref())?;
    let stage = optional(Field::Stage, selections.stage.as_ref())?;
    let coord1 = required(Field::Coord1, selections.coord1.as_ref())?;
    let result = optional(Field::Result, selections.result.as_ref())?;

    let (coord2, precision) = match sref.kind {
        SrefKind::Grid => {
            if sref.nr_coords == CoordinateColumns::Two || selections.coord2.is_some() {
                return Err(MappingError::InconsistentCoordinates(
                    "grid references are held in a single column".to_string(),
                ));
            }
            (None, None)
        }
        SrefKind::EastingNorthing | SrefKind::LonLat => {
            let coord2 = match (sref.nr_coords, selections.coord2.as_ref()) {
                (CoordinateColumns::Two, Some(selection)) => Some(column_of(Field::Coord2, selection)?),
                (CoordinateColumns::Two, None) => {
                    return Err(MappingError::InconsistentCoordinates(
                        "two coordinate columns requested but only one supplied".to_string(),
                    ));
                }
                (CoordinateColumns::One, Some(_)) => {
                    return Err(MappingError::InconsistentCoordinates(
                        "one coordinate column requested but two supplied".to_string(),
                    ));
                }
                (CoordinateColumns::One, None) => None,
            };
            let precision = match selections.precision.as_ref() {
                None => return Err(MappingError::MissingField(Field::Precision)),
                Some(Selection::Sentinel(Sentinel::Manual)) => {
                    manual_precision(selections.precision_value.as_deref())?
                }
                Some(selection) => PrecisionSource::Column(column_of(Field::Precision, selection)?),
            };
            (coord2, Some(precision))
        }
    };

    let mut used: BTreeMap<ColumnIndex, Field> = BTreeMap::new();
    let mut claim = |field: Field, column: Option<ColumnIndex>| -> Result<(), MappingError> {
        let Some(column) = column else {
            return Ok(());
        };
        if let Some(first) = used.insert(column, field) {
            return Err(MappingError::ColumnAlreadyUsed {
                column,
                first,
                second: field,
            });
        }
        Ok(())
    };
    claim(Field::Id, match id {
        IdSource::Auto => None,
        IdSource::Column(column) => Some(column),
    })?;
    claim(Field::Date, Some(date))?;
    claim(Field::Taxon, Some(taxon.column))?;
    claim(Field::Vc, vc)?;
    claim(Field::Stage, stage)?;
    claim(Field::Coord1, Some(coord1))?;
    claim(Field::Coord2, coord2)?;
    claim(Field::Precision, match &precision {
        Some(PrecisionSource::Column(column)) => Some(*column),
        _ => None,
    })?;
    claim(Field::Result, result)?;

    let mut additional = BTreeSet::new();
    for selection in &selections.additional {
        let column = match selection {
            Selection::Index(index) => ColumnIndex(*index),
            Selection::Header(name) => return Err(MappingError::ColumnNotFound(name.clone())),
            Selection::Sentinel(_) => continue,
        };
        if let Some(field) = used.get(&column) {
            return Err(MappingError::AdditionalConflict {
                column,
                field: *field,
            });
        }
        additional.insert(column);
    }

    Ok(FieldMapping {
        id,
        date,
        taxon,
        vc,
        stage,
        coord1,
        coord2,
        precision,
        result,
        additional,
    })
}

/// Reject mappings that reference columns past the end of the header.
pub fn check_width(mapping: &FieldMapping, width: usize) -> Result<(), MappingError> {
    match mapping.referenced_columns().last() {
        Some(column) if column.get() >= width => Err(MappingError::ColumnOutOfRange {
            column: *column,
            width,
        }),
        _ => Ok(()),
    }
}
