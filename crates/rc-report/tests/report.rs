//! Tests for result rows, files, and message summaries.

use std::collections::BTreeMap;
use std::fs;

use rc_model::{
    Action, ColumnFunction, ColumnIndex, CoordinateColumns, OutputColumn, OutputColumnPlan,
    Outcome, RecordId, ServiceResult, Sref, SrefDescriptor, SrefKind, TaxonKind,
};
use rc_report::{
    OutputWriter, RowContext, header_row, message_summary, output_path_for,
    row_for_local_failure, row_for_result,
};
use tempfile::TempDir;

fn validate_plan() -> OutputColumnPlan {
    OutputColumnPlan::new(vec![
        OutputColumn::derived("Id", ColumnFunction::Id),
        OutputColumn::new("Notes", ColumnFunction::Additional, Some(ColumnIndex(0))),
        OutputColumn::new("Date", ColumnFunction::Date, Some(ColumnIndex(1))),
        OutputColumn::new("Species", ColumnFunction::Name, Some(ColumnIndex(2))),
        OutputColumn::new("East", ColumnFunction::Coord1, Some(ColumnIndex(3))),
        OutputColumn::new("North", ColumnFunction::Coord2, Some(ColumnIndex(4))),
        OutputColumn::new("Precision", ColumnFunction::Precision, Some(ColumnIndex(5))),
        OutputColumn::new("Stage", ColumnFunction::Stage, Some(ColumnIndex(6))),
        OutputColumn::derived("TVK", ColumnFunction::Tvk),
        OutputColumn::derived("VC Estimate", ColumnFunction::Vc),
        OutputColumn::derived("Result", ColumnFunction::Result),
        OutputColumn::derived("Messages", ColumnFunction::Messages),
    ])
}

fn context(action: Action) -> RowContext {
    RowContext {
        action,
        taxon_kind: TaxonKind::Name,
        sref: SrefDescriptor {
            kind: SrefKind::EastingNorthing,
            srid: 27700,
            nr_coords: CoordinateColumns::Two,
        },
    }
}

fn result() -> ServiceResult {
    let mut result = ServiceResult::new(RecordId::Number(1), Outcome::Warn);
    result.date = Some("01/06/2024".into());
    result.name = Some("Bufo bufo".into());
    result.tvk = Some("NBNSYS0000001633".into());
    result.vc = Some("46".into());
    result.stage = Some("ignored when validating".into());
    result.sref = Some(Sref {
        srid: 27700,
        easting: Some("612300".into()),
        northing: Some("545600".into()),
        accuracy: Some("100".into()),
        ..Sref::default()
    });
    result.messages = vec!["first".into(), "second".into()];
    result
}

#[test]
fn header_matches_plan_order() {
    let plan = validate_plan();
    let header = header_row(&plan);
    assert_eq!(header.len(), plan.len());
    insta::assert_snapshot!(
        header.join(","),
        @"Id,Notes,Date,Species,East,North,Precision,Stage,TVK,VC Estimate,Result,Messages"
    );
}

#[test]
fn validate_row_mixes_result_and_passthrough() {
    let passthrough = BTreeMap::from([(1, "seen twice".to_string()), (7, "adult".to_string())]);
    let row = row_for_result(&result(), &passthrough, &validate_plan(), &context(Action::Validate));
    assert_eq!(
        row,
        vec![
            "1",
            "seen twice",
            "01/06/2024",
            "Bufo bufo",
            "612300",
            "545600",
            "100",
            "adult",
            "NBNSYS0000001633",
            "46",
            "warn",
            "first\nsecond",
        ]
    );
}

#[test]
fn verify_row_takes_vc_from_passthrough_and_stage_from_result() {
    let plan = OutputColumnPlan::new(vec![
        OutputColumn::new("VC", ColumnFunction::Vc, Some(ColumnIndex(0))),
        OutputColumn::new("Stage", ColumnFunction::Stage, Some(ColumnIndex(1))),
        OutputColumn::derived("Id Difficulty", ColumnFunction::IdDifficulty),
    ]);
    let mut result = result();
    result.id_difficulty = vec!["UKCEH:Ladybirds:difficulty:2".into(), "BSBI:Plants:difficulty:1".into()];
    let passthrough = BTreeMap::from([(0, "47".to_string())]);
    let row = row_for_result(&result, &passthrough, &plan, &context(Action::Verify));
    assert_eq!(
        row,
        vec![
            "47",
            "ignored when validating",
            "UKCEH:Ladybirds:difficulty:2\nBSBI:Plants:difficulty:1",
        ]
    );
}

#[test]
fn local_failure_echoes_the_input_row() {
    let input: Vec<String> = ["note", "01/06/2024", "Bufo bufo", "12.3;45.6"]
        .into_iter()
        .map(String::from)
        .collect();
    let row = row_for_local_failure(
        &input,
        &RecordId::Number(4),
        "could not split '12.3;45.6' into two coordinates",
        &validate_plan(),
    );
    assert_eq!(row[0], "4");
    assert_eq!(row[1], "note");
    assert_eq!(row[4], "12.3;45.6");
    assert_eq!(row[5], "");
    assert_eq!(row[10], "fail");
    assert!(row[11].contains("12.3;45.6"));
    assert_eq!(row.len(), validate_plan().len());
}

#[test]
fn summary_collapses_difficulty_and_drops_rules_run() {
    let messages = [
        "Rules run: 3",
        "A:B:difficulty:2:some long detail",
        "A:B:difficulty:2:other detail",
        "X failed",
    ];
    assert_eq!(
        message_summary(&messages),
        vec![
            ("A:B:difficulty:2".to_string(), 2),
            ("X failed".to_string(), 1),
        ]
    );
}

#[test]
fn summary_collapses_phenology_ranges() {
    let messages = [
        "Org:Group:period:Date is CLOSE TO the expected period (Jun-Aug)",
        "Org:Group:period:Date is CLOSE TO the expected period (May-Jul)",
        "Org:Group:period:Date is FAR FROM the expected period (May-Jul)",
    ];
    let summary = message_summary(&messages);
    assert_eq!(summary.len(), 2);
    assert_eq!(
        summary[0],
        (
            "Org:Group:period:Date is CLOSE TO the expected period.".to_string(),
            2
        )
    );
}

#[test]
fn writer_creates_then_appends() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("out.csv");
    let plan = OutputColumnPlan::new(vec![
        OutputColumn::derived("Id", ColumnFunction::Id),
        OutputColumn::derived("Messages", ColumnFunction::Messages),
    ]);

    let mut writer = OutputWriter::create(&path, &plan).expect("create");
    writer
        .write_row(&["1".to_string(), "a\nb".to_string()])
        .expect("row");
    writer.flush().expect("flush");
    assert_eq!(writer.rows_written(), 1);
    drop(writer);

    let mut writer = OutputWriter::append(&path, &plan).expect("append");
    writer
        .write_row(&["2".to_string(), String::new()])
        .expect("row");
    writer.flush().expect("flush");
    drop(writer);

    let content = fs::read_to_string(&path).expect("read output");
    assert_eq!(content, "Id,Messages\n1,\"a\nb\"\n2,\n");
}

#[test]
fn output_paths_never_overwrite() {
    let dir = TempDir::new().expect("temp dir");
    let input = dir.path().join("records.xlsx");
    let first = output_path_for(&input, Action::Validate);
    assert_eq!(first, dir.path().join("records_validate.csv"));

    fs::write(&first, "").expect("write");
    let second = output_path_for(&input, Action::Validate);
    assert_eq!(second, dir.path().join("records_validate_1.csv"));

    assert_eq!(
        output_path_for(&input, Action::Verify),
        dir.path().join("records_verify.csv")
    );
}
