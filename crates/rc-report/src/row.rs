//! Output rows in plan order.

use std::collections::BTreeMap;

use rc_model::{
    Action, ColumnFunction, CoordinateColumns, OutputColumnPlan, Outcome, RecordId, ServiceResult,
    Sref, SrefDescriptor, SrefKind, TaxonKind,
};

/// Session settings that shape how result fields are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowContext {
    pub action: Action,
    pub taxon_kind: TaxonKind,
    pub sref: SrefDescriptor,
}

/// Header names of a result file.
pub fn header_row(plan: &OutputColumnPlan) -> Vec<String> {
    plan.iter().map(|column| column.name.clone()).collect()
}

fn text(value: Option<&String>) -> String {
    value.cloned().unwrap_or_default()
}

fn first_coordinate(sref: &Sref, descriptor: &SrefDescriptor) -> String {
    let (first, second) = match descriptor.kind {
        SrefKind::Grid => return text(sref.gridref.as_ref()),
        SrefKind::EastingNorthing => (&sref.easting, &sref.northing),
        SrefKind::LonLat => (&sref.longitude, &sref.latitude),
    };
    match descriptor.nr_coords {
        CoordinateColumns::One => format!("{} {}", text(first.as_ref()), text(second.as_ref())),
        CoordinateColumns::Two => text(first.as_ref()),
    }
}

fn second_coordinate(sref: &Sref, descriptor: &SrefDescriptor) -> String {
    match descriptor.kind {
        SrefKind::EastingNorthing => text(sref.northing.as_ref()),
        SrefKind::Grid | SrefKind::LonLat => text(sref.latitude.as_ref()),
    }
}

/// One output row for a service result.
///
/// Values come from the result, except where the plan column is filled
/// from the row's passthrough entry (keyed by plan position).
pub fn row_for_result(
    result: &ServiceResult,
    passthrough: &BTreeMap<usize, String>,
    plan: &OutputColumnPlan,
    context: &RowContext,
) -> Vec<String> {
    let passed = |position: usize| text(passthrough.get(&position));
    let sref = result.sref.as_ref();

    plan.iter()
        .enumerate()
        .map(|(position, column)| match column.function {
            ColumnFunction::Id => result.id.to_string(),
            ColumnFunction::Date => text(result.date.as_ref()),
            ColumnFunction::Tvk => text(result.tvk.as_ref()),
            ColumnFunction::Name => text(result.name.as_ref()),
            ColumnFunction::Organism => match context.taxon_kind {
                TaxonKind::Tvk => text(result.tvk.as_ref()),
                TaxonKind::Name => text(result.name.as_ref()),
            },
            ColumnFunction::Vc => match context.action {
                Action::Validate => text(result.vc.as_ref()),
                Action::Verify => passed(position),
            },
            ColumnFunction::Stage => match context.action {
                Action::Validate => passed(position),
                Action::Verify => text(result.stage.as_ref()),
            },
            ColumnFunction::Coord1 => sref
                .map(|sref| first_coordinate(sref, &context.sref))
                .unwrap_or_default(),
            ColumnFunction::Coord2 => sref
                .map(|sref| second_coordinate(sref, &context.sref))
                .unwrap_or_default(),
            ColumnFunction::Precision => sref
                .and_then(|sref| sref.accuracy.clone())
                .unwrap_or_default(),
            ColumnFunction::Additional => passed(position),
            ColumnFunction::Result => result.result.as_str().to_string(),
            ColumnFunction::Messages => result.messages.join("\n"),
            ColumnFunction::IdDifficulty => result.id_difficulty.join("\n"),
        })
        .collect()
}

/// Output row for an input row that never reached the service.
///
/// Source columns are echoed from the input, the id and verdict are filled
/// in, and `message` explains the failure.
pub fn row_for_local_failure(
    row: &[String],
    id: &RecordId,
    message: &str,
    plan: &OutputColumnPlan,
) -> Vec<String> {
    plan.iter()
        .map(|column| match (column.function, column.source) {
            (_, Some(source)) => row.get(source.get()).cloned().unwrap_or_default(),
            (ColumnFunction::Id, None) => id.to_string(),
            (ColumnFunction::Result, None) => Outcome::Fail.as_str().to_string(),
            (ColumnFunction::Messages, None) => message.to_string(),
            (_, None) => String::new(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_column_coordinates_are_space_joined() {
        let sref = Sref {
            srid: 27700,
            easting: Some("612300".into()),
            northing: Some("545600".into()),
            ..Sref::default()
        };
        let one = SrefDescriptor {
            kind: SrefKind::EastingNorthing,
            srid: 27700,
            nr_coords: CoordinateColumns::One,
        };
        let two = SrefDescriptor {
            nr_coords: CoordinateColumns::Two,
            ..one
        };
        assert_eq!(first_coordinate(&sref, &one), "612300 545600");
        assert_eq!(first_coordinate(&sref, &two), "612300");
        assert_eq!(second_coordinate(&sref, &two), "545600");
    }
}
