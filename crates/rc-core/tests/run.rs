//! End-to-end runs against an in-memory service.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use proptest::prelude::*;
use rc_client::{RecordService, ServiceError};
use rc_core::{
    BatchOutcome, BatchSubmitter, CsvSink, FileRun, ResultSink, RunError, RunSettings, RunState,
    StepOutcome,
};
use rc_map::{
    FieldSelections, Selection, build_mapping, validate_plan, validate_plan_from_output,
    verify_mapping, verify_plan,
};
use rc_model::{
    Action, CoordinateColumns, FieldMapping, OrgGroupRules, Outcome, OutputColumnPlan, Record,
    RecordId, RuleSelection, ServiceResult, SrefDescriptor, SrefKind, TaxonKind, VerifyRequest,
};
use rc_report::{ReportError, RowContext};
use rc_transform::{PassthroughEntry, PassthroughStore};
use tempfile::TempDir;

/// Echoes records back; dates of `bad` fail. TVK lookups all resolve to
/// the common toad.
#[derive(Default)]
struct EchoService {
    batches: RefCell<Vec<Vec<String>>>,
    rules: RefCell<Vec<Vec<OrgGroupRules>>>,
    wrong_ids: bool,
}

impl EchoService {
    fn echo(&self, records: &[Record]) -> Vec<ServiceResult> {
        self.batches
            .borrow_mut()
            .push(records.iter().map(|record| record.id.key()).collect());
        records
            .iter()
            .map(|record| {
                let bad = record.date == "bad";
                let outcome = if bad { Outcome::Fail } else { Outcome::Pass };
                let id = if self.wrong_ids {
                    RecordId::Number(999)
                } else {
                    record.id.clone()
                };
                let mut result = ServiceResult::new(id, outcome);
                result.date = Some(record.date.clone());
                result.tvk = record.tvk.clone().or_else(|| Some(format!("T{}", record.id)));
                result.name = record.name.clone().or_else(|| Some("Bufo bufo".to_string()));
                result.sref = Some(record.sref.clone());
                result.vc = record.vc.clone().or_else(|| Some("46".to_string()));
                result.stage = record.stage.clone();
                result.messages = vec!["Rules run: 1".to_string()];
                if bad {
                    result.messages.push("Date is bad".to_string());
                }
                result
            })
            .collect()
    }

    fn batch_sizes(&self) -> Vec<usize> {
        self.batches.borrow().iter().map(Vec::len).collect()
    }

    fn ids(&self) -> Vec<String> {
        self.batches.borrow().iter().flatten().cloned().collect()
    }
}

impl RecordService for EchoService {
    fn validate(&self, records: &[Record]) -> rc_client::Result<Vec<ServiceResult>> {
        Ok(self.echo(records))
    }

    fn verify(&self, request: &VerifyRequest, _verbose: bool) -> rc_client::Result<Vec<ServiceResult>> {
        self.rules
            .borrow_mut()
            .push(request.org_group_rules_list.clone());
        Ok(self.echo(&request.records))
    }
}

/// Always fails to connect.
struct OfflineService;

impl RecordService for OfflineService {
    fn validate(&self, _records: &[Record]) -> rc_client::Result<Vec<ServiceResult>> {
        Err(ServiceError::Connect("connection refused".to_string()))
    }

    fn verify(&self, _request: &VerifyRequest, _verbose: bool) -> rc_client::Result<Vec<ServiceResult>> {
        Err(ServiceError::Connect("connection refused".to_string()))
    }
}

/// Keeps output rows in memory as (id or message, result) pairs.
#[derive(Default)]
struct MemorySink {
    rows: Vec<(String, String)>,
    flushes: usize,
}

impl ResultSink for MemorySink {
    fn write_result(&mut self, result: &ServiceResult, _passthrough: &PassthroughEntry) -> Result<(), ReportError> {
        self.rows.push((result.id.key(), result.result.as_str().to_string()));
        Ok(())
    }

    fn write_local_failure(&mut self, _row: &[String], id: &RecordId, _message: &str) -> Result<(), ReportError> {
        self.rows.push((id.key(), "fail".to_string()));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ReportError> {
        self.flushes += 1;
        Ok(())
    }
}

const HEADER: &str = "Date,Species,Grid Ref,Notes";

fn write_input(dir: &Path, rows: &[&str]) -> PathBuf {
    let path = dir.join("records.csv");
    let mut content = format!("{HEADER}\n");
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(&path, content).expect("write input");
    path
}

fn header() -> Vec<String> {
    HEADER.split(',').map(String::from).collect()
}

fn grid_mapping() -> FieldMapping {
    let mut selections = FieldSelections::new(TaxonKind::Name, SrefDescriptor::grid(0));
    selections.date = Some(Selection::column(0));
    selections.taxon = Some(Selection::column(1));
    selections.coord1 = Some(Selection::column(2));
    selections.additional = vec![Selection::column(3)];
    build_mapping(&selections).expect("mapping")
}

fn validate_settings(batch_size: usize) -> RunSettings {
    let mapping = grid_mapping();
    let plan = validate_plan(&header(), &mapping);
    RunSettings::new(
        Action::Validate,
        mapping,
        plan,
        SrefDescriptor::grid(0),
        TaxonKind::Name,
    )
    .with_batch_size(batch_size)
}

fn context(action: Action) -> RowContext {
    RowContext {
        action,
        taxon_kind: TaxonKind::Name,
        sref: SrefDescriptor::grid(0),
    }
}

fn three_rows() -> [&'static str; 3] {
    [
        "01/06/2024,Bufo bufo,SM123456,first",
        "02/06/2024,Rana temporaria,SM123457,second",
        "03/06/2024,Bufo bufo,SM123458,third",
    ]
}

#[test]
fn three_rows_in_batches_of_two() {
    let dir = TempDir::new().expect("temp dir");
    let input = write_input(dir.path(), &three_rows());
    let output = dir.path().join("records_validate.csv");
    let settings = validate_settings(2);
    let sink = CsvSink::create(&output, settings.plan.clone(), context(Action::Validate))
        .expect("sink");
    let service = EchoService::default();

    let mut run = FileRun::new(&input, settings, &service, sink);
    assert_eq!(run.step().expect("header"), StepOutcome::Started);
    assert_eq!(run.state(), RunState::HeaderRead);
    let summary = run.run_to_end().expect("run");

    assert_eq!(service.batch_sizes(), vec![2, 1]);
    assert_eq!(summary.counts.total, 3);
    assert_eq!(summary.counts.pass, 3);
    assert!(summary.success);
    assert!(summary.message_summary.is_empty());
    assert_eq!(run.state(), RunState::Finalized);

    let content = fs::read_to_string(&output).expect("read output");
    assert_eq!(content.lines().count(), 4);
    insta::assert_snapshot!(content, @r"
    Id,Date,Species,Grid Ref,Notes,TVK,VC Estimate,Result,Messages
    1,01/06/2024,Bufo bufo,SM123456,first,T1,46,pass,Rules run: 1
    2,02/06/2024,Rana temporaria,SM123457,second,T2,46,pass,Rules run: 1
    3,03/06/2024,Bufo bufo,SM123458,third,T3,46,pass,Rules run: 1
    ");
}

#[test]
fn failed_records_fail_the_run_and_are_summarized() {
    let dir = TempDir::new().expect("temp dir");
    let input = write_input(
        dir.path(),
        &["bad,Bufo bufo,SM123456,x", "01/06/2024,Bufo bufo,SM123456,y"],
    );
    let service = EchoService::default();
    let mut run = FileRun::new(&input, validate_settings(100), &service, MemorySink::default());
    let summary = run.run_to_end().expect("run");
    assert!(!summary.success);
    assert_eq!(summary.counts.fail, 1);
    assert_eq!(summary.counts.pass, 1);
    assert_eq!(summary.message_summary, vec![("Date is bad".to_string(), 1)]);
}

#[test]
fn ids_do_not_depend_on_batch_size() {
    let dir = TempDir::new().expect("temp dir");
    let rows: Vec<String> = (0..250)
        .map(|n| format!("01/06/2024,Bufo bufo,SM{n:06},note {n}"))
        .collect();
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    let input = write_input(dir.path(), &rows);

    let service = EchoService::default();
    let mut run = FileRun::new(&input, validate_settings(100), &service, MemorySink::default());
    let summary = run.run_to_end().expect("run");
    assert_eq!(service.batch_sizes(), vec![100, 100, 50]);
    assert_eq!(summary.counts.total, 250);
    let expected: Vec<String> = (1..=250).map(|id: u64| id.to_string()).collect();
    assert_eq!(service.ids(), expected);
}

#[test]
fn unsplittable_coordinates_are_local_failures() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("lonlat.csv");
    fs::write(
        &path,
        "Date,Species,LonLat\n01/06/2024,Bufo bufo,\"-1.5, 52.1\"\n01/06/2024,Bufo bufo,-1.5;52.1\n01/06/2024,Bufo bufo,-1.5 52.1\n",
    )
    .expect("write input");

    let sref = SrefDescriptor {
        kind: SrefKind::LonLat,
        srid: 4326,
        nr_coords: CoordinateColumns::One,
    };
    let mut selections = FieldSelections::new(TaxonKind::Name, sref);
    selections.date = Some(Selection::column(0));
    selections.taxon = Some(Selection::column(1));
    selections.coord1 = Some(Selection::column(2));
    selections.precision = Some(Selection::Sentinel(rc_map::Sentinel::Manual));
    let mapping = build_mapping(&selections).expect("mapping");
    let columns: Vec<String> = ["Date", "Species", "LonLat"].map(String::from).to_vec();
    let plan = validate_plan(&columns, &mapping);
    let settings = RunSettings::new(Action::Validate, mapping, plan.clone(), sref, TaxonKind::Name);

    let output = dir.path().join("out.csv");
    let row_context = RowContext {
        action: Action::Validate,
        taxon_kind: TaxonKind::Name,
        sref,
    };
    let sink = CsvSink::create(&output, plan, row_context).expect("sink");
    let service = EchoService::default();
    let mut run = FileRun::new(&path, settings, &service, sink);
    let summary = run.run_to_end().expect("run");

    assert_eq!(service.ids(), vec!["1", "3"]);
    assert_eq!(summary.counts.total, 3);
    assert_eq!(summary.counts.fail, 1);
    assert!(!summary.success);
    assert_eq!(summary.message_summary.len(), 1);
    assert!(summary.message_summary[0].0.contains("-1.5;52.1"));

    let content = fs::read_to_string(&output).expect("read output");
    let failure = content
        .lines()
        .find(|line| line.starts_with("2,"))
        .expect("failure row");
    assert!(failure.contains(",fail,"));
    assert!(content.lines().any(|line| line.contains("-1.5 52.1")));
}

#[test]
fn verify_skips_rows_that_failed_validation() {
    let dir = TempDir::new().expect("temp dir");
    let validate_mapping = grid_mapping();
    let validated_header = "Id,Date,Species,Grid Ref,Notes,TVK,VC Estimate,Result,Messages";
    let path = dir.path().join("records_validate.csv");
    fs::write(
        &path,
        format!(
            "{validated_header}\n\
             1,01/06/2024,Bufo bufo,SM123456,first,T1,46,pass,\n\
             2,bad,Bufo bufo,SM123456,second,T2,46,fail,Date is bad\n\
             3,03/06/2024,Bufo bufo,SM123458,third,T3,47,warn,\n"
        ),
    )
    .expect("write validated");

    let output_header: Vec<String> = validated_header.split(',').map(String::from).collect();
    let validated_plan =
        validate_plan_from_output(&output_header, &validate_mapping).expect("validated plan");
    let mapping = verify_mapping(&validate_mapping, &validated_plan).expect("verify mapping");
    let plan: OutputColumnPlan = verify_plan(&validated_plan);
    let rules = RuleSelection::Selected {
        groups: vec![OrgGroupRules {
            organisation: "UKCEH".into(),
            group: "Amphibians".into(),
            rules: vec!["Period Rule".into()],
        }],
    };
    let settings = RunSettings::new(
        Action::Verify,
        mapping,
        plan.clone(),
        SrefDescriptor::grid(0),
        TaxonKind::Name,
    )
    .with_rules(rules, true);

    let output = dir.path().join("records_verify.csv");
    let sink = CsvSink::create(&output, plan, context(Action::Verify)).expect("sink");
    let service = EchoService::default();
    let mut run = FileRun::new(&path, settings, &service, sink);
    let summary = run.run_to_end().expect("run");

    assert_eq!(service.ids(), vec!["1", "3"]);
    assert_eq!(summary.counts.total, 2);
    assert_eq!(service.rules.borrow()[0][0].rules, vec!["period"]);

    let content = fs::read_to_string(&output).expect("read output");
    insta::assert_snapshot!(content, @r"
    Id,Date,Species,Grid Ref,Notes,TVK,VC Estimate,Id Difficulty,Result,Messages
    1,01/06/2024,Bufo bufo,SM123456,first,T1,46,,pass,Rules run: 1
    3,03/06/2024,Bufo bufo,SM123458,third,T3,47,,pass,Rules run: 1
    ");
}

#[test]
fn unknown_result_id_aborts_the_run() {
    let dir = TempDir::new().expect("temp dir");
    let input = write_input(dir.path(), &three_rows());
    let service = EchoService {
        wrong_ids: true,
        ..EchoService::default()
    };
    let mut run = FileRun::new(&input, validate_settings(2), &service, MemorySink::default());
    let err = run.run_to_end().expect_err("correlation error");
    assert!(matches!(err, RunError::Correlation(ref e) if e.id == "999"));
    assert_eq!(run.state(), RunState::Aborted);
    assert!(!run.summary().success);
    assert!(matches!(run.step(), Err(RunError::Aborted)));
}

#[test]
fn failed_batch_is_read_again_on_resume() {
    let dir = TempDir::new().expect("temp dir");
    let input = write_input(dir.path(), &three_rows());
    let mut run = FileRun::new(&input, validate_settings(2), OfflineService, MemorySink::default());
    let err = run.run_to_end().expect_err("service error");
    assert!(matches!(err, RunError::Service(ServiceError::Connect(_))));
    assert_eq!(run.state(), RunState::Aborted);
    assert!(run.sink().rows.is_empty());
    let cursor = run.cursor().expect("nothing written past the cursor");
    assert_eq!(cursor.rows_read, 0);
    assert_eq!(cursor.next_id, 1);

    let service = EchoService::default();
    let mut run = FileRun::resume(
        &input,
        validate_settings(2),
        &service,
        MemorySink::default(),
        cursor,
    );
    let summary = run.run_to_end().expect("resumed run");
    assert_eq!(service.ids(), vec!["1", "2", "3"]);
    assert_eq!(summary.counts.total, 3);
}

/// Answers the first record of each batch correctly and the rest with
/// an id nobody sent.
struct HalfWrongService;

impl RecordService for HalfWrongService {
    fn validate(&self, records: &[Record]) -> rc_client::Result<Vec<ServiceResult>> {
        Ok(records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let id = if index == 0 {
                    record.id.clone()
                } else {
                    RecordId::Number(999)
                };
                let mut result = ServiceResult::new(id, Outcome::Warn);
                result.messages = vec!["Tenkm square is new".to_string()];
                result
            })
            .collect())
    }

    fn verify(&self, request: &VerifyRequest, _verbose: bool) -> rc_client::Result<Vec<ServiceResult>> {
        self.validate(&request.records)
    }
}

#[test]
fn rows_written_before_an_unknown_id_are_counted() {
    let dir = TempDir::new().expect("temp dir");
    let input = write_input(dir.path(), &three_rows());
    let mut run = FileRun::new(&input, validate_settings(2), HalfWrongService, MemorySink::default());
    let err = run.run_to_end().expect_err("correlation error");
    assert!(matches!(err, RunError::Correlation(ref e) if e.id == "999"));

    assert_eq!(run.sink().rows, vec![("1".to_string(), "warn".to_string())]);
    let summary = run.summary();
    assert!(!summary.success);
    assert_eq!(summary.counts.total, 1);
    assert_eq!(summary.counts.warn, 1);
    assert_eq!(
        summary.message_summary,
        vec![("Tenkm square is new".to_string(), 1)]
    );
    assert!(run.cursor().is_none());
    assert_eq!(run.rows_read(), 0);
}

#[test]
fn resumed_run_appends_the_remaining_rows() {
    let dir = TempDir::new().expect("temp dir");
    let input = write_input(dir.path(), &three_rows());
    let output = dir.path().join("records_validate.csv");

    let settings = validate_settings(2);
    let sink = CsvSink::create(&output, settings.plan.clone(), context(Action::Validate))
        .expect("sink");
    let first = EchoService::default();
    let mut run = FileRun::new(&input, settings.clone(), &first, sink);
    run.step().expect("header");
    run.step().expect("first batch");
    let cursor = run.cursor().expect("cursor");
    drop(run);

    let json = serde_json::to_string(&cursor).expect("serialize cursor");
    let cursor = serde_json::from_str(&json).expect("parse cursor");
    let sink = CsvSink::append(&output, settings.plan.clone(), context(Action::Validate))
        .expect("sink");
    let second = EchoService::default();
    let mut run = FileRun::resume(&input, settings, &second, sink, cursor);
    let summary = run.run_to_end().expect("resumed run");

    assert_eq!(first.ids(), vec!["1", "2"]);
    assert_eq!(second.ids(), vec!["3"]);
    assert_eq!(summary.counts.total, 3);
    let content = fs::read_to_string(&output).expect("read output");
    assert_eq!(content.lines().count(), 4);
}

#[test]
fn submitter_partitions_prepared_records() {
    let mapping = grid_mapping();
    let plan = validate_plan(&header(), &mapping);
    let mut records = Vec::new();
    let mut passthrough = PassthroughStore::new();
    for count in 1..=5u64 {
        let row: Vec<String> = ["01/06/2024", "Bufo bufo", "SM123456", "n"]
            .map(String::from)
            .to_vec();
        let record = rc_transform::build_record(
            &row,
            count,
            &mapping,
            &SrefDescriptor::grid(0),
            Action::Validate,
        )
        .expect("record");
        let entry = rc_transform::passthrough_entry(&row, &plan, Action::Validate).expect("entry");
        passthrough.insert(&record.id, entry);
        records.push(record);
    }

    let service = EchoService::default();
    let submitter = BatchSubmitter::validation(&service);
    let mut sink = MemorySink::default();
    let mut outcome = BatchOutcome::new();
    submitter
        .submit(records, passthrough, 2, &mut sink, &mut outcome)
        .expect("submit");
    assert_eq!(service.batch_sizes(), vec![2, 2, 1]);
    assert!(outcome.success);
    assert_eq!(outcome.counts.total, 5);
    assert_eq!(sink.rows.len(), 5);
    assert_eq!(sink.flushes, 3);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn auto_ids_are_sequential_for_any_batch_size(batch_size in 1usize..300) {
        let dir = TempDir::new().expect("temp dir");
        let rows: Vec<String> = (0..250)
            .map(|n| format!("01/06/2024,Bufo bufo,SM{n:06},"))
            .collect();
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        let input = write_input(dir.path(), &rows);

        let service = EchoService::default();
        let mut run = FileRun::new(&input, validate_settings(batch_size), &service, MemorySink::default());
        let summary = run.run_to_end().expect("run");

        let expected: Vec<String> = (1..=250u64).map(|id| id.to_string()).collect();
        prop_assert_eq!(service.ids(), expected);
        prop_assert_eq!(summary.counts.total, 250);
        prop_assert_eq!(service.batch_sizes().len(), 250usize.div_ceil(batch_size));
    }
}
