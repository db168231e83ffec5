//! Mapping state for step-by-step column selection.
//!
//! Holds the header of the uploaded file alongside the selections made so
//! far, answers which columns are still free, and summarises the settings
//! for display before a run.

use rc_model::{
    ColumnIndex, CoordinateColumns, FieldMapping, IdSource, PrecisionSource, SrefKind, TaxonKind,
};

use crate::error::MappingError;
use crate::selection::{FieldSelections, Selection, build_mapping, check_width};

/// Selections in progress for one input file.
#[derive(Debug, Clone)]
pub struct MappingState {
    /// Header names of the input file.
    pub columns: Vec<String>,
    pub selections: FieldSelections,
}

impl MappingState {
    pub fn new(columns: Vec<String>, selections: FieldSelections) -> Self {
        Self {
            columns,
            selections,
        }
    }

    fn column_name(&self, column: ColumnIndex) -> &str {
        self.columns
            .get(column.get())
            .map_or("(missing column)", String::as_str)
    }

    /// Column positions chosen for standard fields so far.
    fn standard_positions(&self) -> Vec<usize> {
        let s = &self.selections;
        [
            &s.id, &s.date, &s.taxon, &s.vc, &s.stage, &s.coord1, &s.coord2, &s.precision,
            &s.result,
        ]
        .into_iter()
        .filter_map(|selection| match selection {
            Some(Selection::Index(index)) => Some(*index),
            Some(Selection::Header(name)) => self
                .columns
                .iter()
                .position(|column| column.eq_ignore_ascii_case(name)),
            _ => None,
        })
        .collect()
    }

    /// Columns not selected for any standard field.
    ///
    /// Columns already marked additional are hidden unless
    /// `include_additional` is set, which the additional-columns step uses
    /// to show its own choices.
    pub fn available_columns(&self, include_additional: bool) -> Vec<(ColumnIndex, &str)> {
        let used = self.standard_positions();
        let additional: Vec<usize> = self
            .selections
            .additional
            .iter()
            .filter_map(|selection| match selection {
                Selection::Index(index) => Some(*index),
                _ => None,
            })
            .collect();
        self.columns
            .iter()
            .enumerate()
            .filter(|(index, _)| !used.contains(index))
            .filter(|(index, _)| include_additional || !additional.contains(index))
            .map(|(index, name)| (ColumnIndex(index), name.as_str()))
            .collect()
    }

    /// Resolve, build, and check the mapping against the header width.
    pub fn finish(&self) -> Result<FieldMapping, MappingError> {
        let resolved = self.selections.resolve(&self.columns)?;
        let mapping = build_mapping(&resolved)?;
        check_width(&mapping, self.columns.len())?;
        Ok(mapping)
    }

    /// Human-readable `(setting, value)` pairs for a finished mapping.
    pub fn settings_summary(&self, mapping: &FieldMapping) -> Vec<(String, String)> {
        let mut summary = Vec::new();
        let mut push = |title: &str, value: &str| summary.push((title.to_string(), value.to_string()));

        match mapping.id {
            IdSource::Auto => push("Unique Record Key Field", "Auto Row Number"),
            IdSource::Column(column) => push("Unique Record Key Field", self.column_name(column)),
        }
        push("Date Field", self.column_name(mapping.date));
        if let Some(column) = mapping.vc {
            push("Vice County Field", self.column_name(column));
        }
        if let Some(column) = mapping.stage {
            push("Life Stage Field", self.column_name(column));
        }

        push("Organism Field Type", mapping.taxon.kind.label());
        let taxon_title = match mapping.taxon.kind {
            TaxonKind::Tvk => "TVK Field",
            TaxonKind::Name => "Taxon Name Field",
        };
        push(taxon_title, self.column_name(mapping.taxon.column));

        let sref = self.selections.sref;
        push("Spatial Reference Type", sref.kind.label());
        let system_title = match sref.kind {
            SrefKind::Grid => "Grid Reference System",
            SrefKind::EastingNorthing | SrefKind::LonLat => "Coordinate System",
        };
        push(system_title, sref.kind.system_label(sref.srid).unwrap_or("Unknown"));
        let (first_title, second_title) = match (sref.kind, sref.nr_coords) {
            (SrefKind::Grid, _) => ("Grid Reference Field", ""),
            (_, CoordinateColumns::One) => ("Coordinate Field", ""),
            (SrefKind::EastingNorthing, CoordinateColumns::Two) => ("Easting Field", "Northing Field"),
            (SrefKind::LonLat, CoordinateColumns::Two) => ("Longitude Field", "Latitude Field"),
        };
        push(first_title, self.column_name(mapping.coord1));
        if let Some(column) = mapping.coord2 {
            push(second_title, self.column_name(column));
        }
        match &mapping.precision {
            Some(PrecisionSource::Manual(value)) => push("Manual Precision", value),
            Some(PrecisionSource::Column(column)) => push("Precision Field", self.column_name(*column)),
            None => {}
        }

        let additional: Vec<&str> = mapping
            .additional
            .iter()
            .map(|column| self.column_name(*column))
            .collect();
        if !additional.is_empty() {
            push("Additional Fields", &additional.join(", "));
        }
        summary
    }
}
