use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, info_span, warn};

use rc_cli::config::AppConfig;
use rc_cli::session::Session;
use rc_cli::traced::TracedSink;
use rc_client::{ApiClient, ServiceStatus};
use rc_core::{CsvSink, FileRun, RunSummary, StepOutcome};
use rc_ingest::{count_rows, read_header};
use rc_model::{Action, RuleSelection};
use rc_report::{RowContext, output_path_for};

use crate::cli::RunArgs;
use crate::summary::{
    apply_table_style, catalogue_table, columns_table, print_run_summary, settings_table,
};

pub fn run_columns(file: &Path) -> Result<()> {
    let header = read_header(file).with_context(|| format!("read {}", file.display()))?;
    println!("{}", columns_table(&header));
    Ok(())
}

pub fn run_session_init(file: &Path, out: &Path, force: bool) -> Result<()> {
    let header = read_header(file).with_context(|| format!("read {}", file.display()))?;
    let session = Session::from_header(header);
    session.save(out, force)?;
    println!("Session written to {}", out.display());
    match session.mapping() {
        Ok(mapping) => {
            let settings = session.mapping_state().settings_summary(&mapping);
            println!("{}", settings_table(&settings));
        }
        Err(error) => println!("Review the session before running: {error:#}"),
    }
    Ok(())
}

pub fn run_session_show(path: &Path) -> Result<()> {
    let session = Session::load(path)?;
    let mapping = session.mapping()?;
    let settings = session.mapping_state().settings_summary(&mapping);
    println!("{}", settings_table(&settings));
    match &session.rules {
        RuleSelection::All => println!("Verification rules: all"),
        RuleSelection::Selected { groups } => {
            let mut table = comfy_table::Table::new();
            table.set_header(vec!["Organisation", "Group", "Rules"]);
            apply_table_style(&mut table);
            for group in groups {
                table.add_row(vec![
                    group.organisation.clone(),
                    group.group.clone(),
                    group.rules.join(", "),
                ]);
            }
            println!("Verification rules:");
            println!("{table}");
        }
    }
    Ok(())
}

/// Print the service status; returns whether it is available.
pub fn run_status(config: &AppConfig) -> Result<bool> {
    let client = ApiClient::new(config.service.clone()).context("create service client")?;
    let status = client.status();
    println!("{}: {status}", config.service.service_url);
    Ok(status.is_ok())
}

pub fn run_rules(config: &AppConfig, refresh: bool) -> Result<()> {
    let client = ApiClient::new(config.service.clone()).context("create service client")?;
    let catalogue = client
        .org_group_catalogue(refresh)
        .context("fetch verification rules")?;
    if catalogue.is_empty() {
        println!("The service offers no verification rules.");
    } else {
        println!("{}", catalogue_table(&catalogue));
    }
    Ok(())
}

pub fn run_validate(args: &RunArgs, config: &AppConfig) -> Result<RunSummary> {
    run_file(Action::Validate, args, config)
}

pub fn run_verify(args: &RunArgs, config: &AppConfig) -> Result<RunSummary> {
    run_file(Action::Verify, args, config)
}

fn run_file(action: Action, args: &RunArgs, config: &AppConfig) -> Result<RunSummary> {
    let input = args.file.as_path();
    let span = info_span!("command", action = %action, input = %input.display());
    let _guard = span.enter();
    let start = Instant::now();

    let session = Session::load(&args.session)?;
    let header = read_header(input).with_context(|| format!("read {}", input.display()))?;
    let settings = match action {
        Action::Validate => {
            session.check_header(&header, input)?;
            session.validate_settings()?
        }
        Action::Verify => session.verify_settings(&header)?,
    }
    .with_batch_size(args.batch_size.unwrap_or(config.batch_size));

    let client = ApiClient::new(config.service.clone()).context("create service client")?;
    match client.status() {
        ServiceStatus::Ok => {}
        status => bail!("service unavailable: {status}"),
    }

    let output = output_path_for(input, action);
    let context = RowContext {
        action,
        taxon_kind: settings.taxon_kind,
        sref: settings.sref,
    };
    let sink = CsvSink::create(&output, settings.plan.clone(), context)
        .with_context(|| format!("create {}", output.display()))?;
    let total = count_rows(input).with_context(|| format!("count rows of {}", input.display()))?;
    let bar = progress_bar(total as u64, action, args.no_progress);

    let mut run = FileRun::new(input, settings, &client, TracedSink::new(sink));
    loop {
        match run.step() {
            Ok(StepOutcome::Finished) => break,
            Ok(_) => bar.set_position(run.rows_read() as u64),
            Err(error) => {
                bar.abandon();
                warn!(rows_read = run.rows_read(), "partial results kept");
                return Err(error).with_context(|| {
                    format!(
                        "{action} stopped after {} rows; partial results in {}",
                        run.rows_read(),
                        output.display()
                    )
                });
            }
        }
    }
    bar.finish_and_clear();

    let summary = run.summary();
    info!(
        rows = run.sink().rows(),
        output = %run.sink().inner().path().display(),
        duration_ms = start.elapsed().as_millis(),
        "{action} finished"
    );
    print_run_summary(action, &output, &summary);
    Ok(summary)
}

fn progress_bar(total: u64, action: Action, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rows ({percent}%) {msg}",
    ) {
        bar.set_style(style.progress_chars("#>-"));
    }
    bar.set_message(action.to_string());
    bar
}
