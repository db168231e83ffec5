//! Field mapping: which input column serves which semantic role.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::enums::TaxonKind;
use crate::ids::ColumnIndex;
use crate::plan::ColumnFunction;

/// Source of the record id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdSource {
    /// The running count of processed rows.
    Auto,
    /// The text of an input column.
    Column(ColumnIndex),
}

/// The column identifying the organism, and how it identifies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonColumn {
    pub kind: TaxonKind,
    pub column: ColumnIndex,
}

/// Source of coordinate precision (metres).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrecisionSource {
    Column(ColumnIndex),
    /// A constant applied to every record.
    Manual(String),
}

/// Immutable mapping from semantic fields to input columns.
///
/// Built by the field mapper, which guarantees that no column serves two
/// standard fields and that no standard column is also additional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub id: IdSource,
    pub date: ColumnIndex,
    pub taxon: TaxonColumn,
    pub vc: Option<ColumnIndex>,
    pub stage: Option<ColumnIndex>,
    pub coord1: ColumnIndex,
    pub coord2: Option<ColumnIndex>,
    /// Absent for grid references, which carry their own precision.
    pub precision: Option<PrecisionSource>,
    /// Column holding a prior validation verdict; only set for verify input.
    pub result: Option<ColumnIndex>,
    /// Columns copied through to the output unchanged.
    pub additional: BTreeSet<ColumnIndex>,
}

impl FieldMapping {
    /// Column backing the id, if the id is not auto-numbered.
    pub fn id_column(&self) -> Option<ColumnIndex> {
        match self.id {
            IdSource::Auto => None,
            IdSource::Column(column) => Some(column),
        }
    }

    /// Column backing the precision, if it is not a manual constant.
    pub fn precision_column(&self) -> Option<ColumnIndex> {
        match &self.precision {
            Some(PrecisionSource::Column(column)) => Some(*column),
            _ => None,
        }
    }

    /// Standard fields mapped to input columns, tagged with their output function.
    ///
    /// The taxon column is tagged `Tvk` or `Name` according to its kind.
    /// Ordered by field, not by column.
    pub fn standard_columns(&self) -> Vec<(ColumnFunction, ColumnIndex)> {
        let taxon_function = match self.taxon.kind {
            TaxonKind::Tvk => ColumnFunction::Tvk,
            TaxonKind::Name => ColumnFunction::Name,
        };
        let mut columns = Vec::with_capacity(8);
        if let Some(column) = self.id_column() {
            columns.push((ColumnFunction::Id, column));
        }
        columns.push((ColumnFunction::Date, self.date));
        if let Some(column) = self.vc {
            columns.push((ColumnFunction::Vc, column));
        }
        if let Some(column) = self.stage {
            columns.push((ColumnFunction::Stage, column));
        }
        columns.push((taxon_function, self.taxon.column));
        columns.push((ColumnFunction::Coord1, self.coord1));
        if let Some(column) = self.coord2 {
            columns.push((ColumnFunction::Coord2, column));
        }
        if let Some(column) = self.precision_column() {
            columns.push((ColumnFunction::Precision, column));
        }
        columns
    }

    /// Every column the record builder or passthrough may read.
    pub fn referenced_columns(&self) -> BTreeSet<ColumnIndex> {
        let mut columns: BTreeSet<ColumnIndex> = self
            .standard_columns()
            .into_iter()
            .map(|(_, column)| column)
            .collect();
        columns.extend(self.result);
        columns.extend(self.additional.iter().copied());
        columns
    }

    /// Number of leading columns a row must have for every mapped field.
    pub fn required_width(&self) -> usize {
        self.referenced_columns()
            .last()
            .map_or(0, |column| column.get() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> FieldMapping {
        FieldMapping {
            id: IdSource::Auto,
            date: ColumnIndex(0),
            taxon: TaxonColumn {
                kind: TaxonKind::Name,
                column: ColumnIndex(3),
            },
            vc: None,
            stage: Some(ColumnIndex(5)),
            coord1: ColumnIndex(1),
            coord2: Some(ColumnIndex(2)),
            precision: Some(PrecisionSource::Manual("100".into())),
            result: None,
            additional: BTreeSet::from([ColumnIndex(7)]),
        }
    }

    #[test]
    fn standard_columns_tag_taxon_by_kind() {
        let columns = mapping().standard_columns();
        assert!(columns.contains(&(ColumnFunction::Name, ColumnIndex(3))));
        assert!(!columns.iter().any(|(f, _)| *f == ColumnFunction::Precision));
    }

    #[test]
    fn required_width_covers_additional_columns() {
        assert_eq!(mapping().required_width(), 8);
    }
}
