//! Output column plans for validation and verification files.
//!
//! A validation file echoes every mapped input column in input order, then
//! appends the columns only the service can fill. A verification file is
//! read from a validation file, so its plan is derived from the validation
//! plan and its sources are positions in that file.

use std::collections::BTreeMap;

use rc_model::{
    ColumnFunction, ColumnIndex, FieldMapping, IdSource, OutputColumn, OutputColumnPlan,
    PrecisionSource, TaxonColumn, TaxonKind,
};

use crate::error::MappingError;
use crate::selection::Field;

/// Columns of the validation output for an input file with `headers`.
pub fn validate_plan(headers: &[String], mapping: &FieldMapping) -> OutputColumnPlan {
    let mut by_column: BTreeMap<ColumnIndex, ColumnFunction> = mapping
        .standard_columns()
        .into_iter()
        .map(|(function, column)| (column, function))
        .collect();
    for column in &mapping.additional {
        by_column.insert(*column, ColumnFunction::Additional);
    }

    let mut columns = Vec::with_capacity(by_column.len() + 5);
    if mapping.id == IdSource::Auto {
        columns.push(OutputColumn::derived("Id", ColumnFunction::Id));
    }
    for (column, function) in by_column {
        let name = headers
            .get(column.get())
            .cloned()
            .unwrap_or_else(|| format!("Column {}", column.get() + 1));
        columns.push(OutputColumn::new(name, function, Some(column)));
    }
    match mapping.taxon.kind {
        TaxonKind::Tvk => columns.push(OutputColumn::derived("Name", ColumnFunction::Name)),
        TaxonKind::Name => columns.push(OutputColumn::derived("TVK", ColumnFunction::Tvk)),
    }
    if mapping.vc.is_none() {
        columns.push(OutputColumn::derived("VC Estimate", ColumnFunction::Vc));
    }
    columns.push(OutputColumn::derived("Result", ColumnFunction::Result));
    columns.push(OutputColumn::derived("Messages", ColumnFunction::Messages));
    OutputColumnPlan::new(columns)
}

/// Validation plan for a file that has already been written.
///
/// Column names are taken from `output_header`, which must have exactly
/// one entry per planned column.
pub fn validate_plan_from_output(
    output_header: &[String],
    mapping: &FieldMapping,
) -> Result<OutputColumnPlan, MappingError> {
    let plan = validate_plan(&[], mapping);
    if plan.len() != output_header.len() {
        return Err(MappingError::PlanMismatch {
            expected: plan.len(),
            found: output_header.len(),
        });
    }
    Ok(plan
        .iter()
        .zip(output_header)
        .map(|(column, name)| OutputColumn::new(name.clone(), column.function, column.source))
        .collect())
}

/// Columns of the verification output, read from a validation file.
///
/// Everything except the trailing result and messages is echoed by
/// position; the identification difficulty goes before the new verdict.
pub fn verify_plan(validate_plan: &OutputColumnPlan) -> OutputColumnPlan {
    let echoed = validate_plan.len().saturating_sub(2);
    let mut columns: Vec<OutputColumn> = validate_plan
        .iter()
        .take(echoed)
        .enumerate()
        .map(|(position, column)| {
            OutputColumn::new(column.name.clone(), column.function, Some(ColumnIndex(position)))
        })
        .collect();
    columns.push(OutputColumn::derived("Id Difficulty", ColumnFunction::IdDifficulty));
    columns.push(OutputColumn::derived("Result", ColumnFunction::Result));
    columns.push(OutputColumn::derived("Messages", ColumnFunction::Messages));
    OutputColumnPlan::new(columns)
}

/// Mapping for reading a validation file back for verification.
///
/// Fields are located by their function in the validation plan. The taxon
/// is always read as a TVK, which validation guarantees is present.
pub fn verify_mapping(
    validate_mapping: &FieldMapping,
    validate_plan: &OutputColumnPlan,
) -> Result<FieldMapping, MappingError> {
    let mut positions: BTreeMap<ColumnFunction, ColumnIndex> = BTreeMap::new();
    let mut additional = std::collections::BTreeSet::new();
    for (position, column) in validate_plan.iter().enumerate() {
        match column.function {
            ColumnFunction::Additional => {
                additional.insert(ColumnIndex(position));
            }
            function => {
                positions.insert(function, ColumnIndex(position));
            }
        }
    }
    let find = |function: ColumnFunction, field: Field| {
        positions
            .get(&function)
            .copied()
            .ok_or(MappingError::MissingField(field))
    };

    let precision = match &validate_mapping.precision {
        None => None,
        Some(PrecisionSource::Manual(value)) => Some(PrecisionSource::Manual(value.clone())),
        Some(PrecisionSource::Column(_)) => Some(PrecisionSource::Column(find(
            ColumnFunction::Precision,
            Field::Precision,
        )?)),
    };
    let coord2 = match validate_mapping.coord2 {
        Some(_) => Some(find(ColumnFunction::Coord2, Field::Coord2)?),
        None => None,
    };

    Ok(FieldMapping {
        id: IdSource::Column(find(ColumnFunction::Id, Field::Id)?),
        date: find(ColumnFunction::Date, Field::Date)?,
        taxon: TaxonColumn {
            kind: TaxonKind::Tvk,
            column: find(ColumnFunction::Tvk, Field::Taxon)?,
        },
        vc: positions.get(&ColumnFunction::Vc).copied(),
        stage: positions.get(&ColumnFunction::Stage).copied(),
        coord1: find(ColumnFunction::Coord1, Field::Coord1)?,
        coord2,
        precision,
        result: Some(find(ColumnFunction::Result, Field::Result)?),
        additional,
    })
}
