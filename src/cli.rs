//! Command-line orchestration for dirsort.
//!
//! Wires the pipeline together (scan, classify, plan, execute), renders the
//! outcome and maps it to a process exit code.

use crate::config::OrganizerConfig;
use crate::error::OrganizeResult;
use crate::executor::{ExecutionReport, Executor};
use crate::file_category::CategoryTable;
use crate::output::{OutputFormatter, category_counts};
use crate::planner::{self, PlannedMove};
use crate::scanner;
use clap::ValueEnum;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Exit code for a run where every planned move succeeded.
pub const EXIT_OK: u8 = 0;
/// Exit code for fatal errors raised before any mutation.
pub const EXIT_FATAL: u8 = 1;
/// Exit code when at least one file failed to move.
pub const EXIT_PARTIAL: u8 = 2;

/// How the report is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Everything a single run needs.
#[derive(Debug, Clone, Default)]
pub struct OrganizeOptions {
    pub target_dir: PathBuf,
    pub dry_run: bool,
    pub config_path: Option<PathBuf>,
    pub format: OutputFormat,
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunOutcome {
    /// Number of files the scanner handed to the planner.
    pub scanned: usize,
    pub report: ExecutionReport,
}

impl RunOutcome {
    /// `0` when nothing failed, `2` when one or more moves failed.
    pub fn exit_code(&self) -> u8 {
        if self.report.has_failures() {
            EXIT_PARTIAL
        } else {
            EXIT_OK
        }
    }
}

/// Scans, classifies and plans without touching the filesystem.
///
/// # Examples
///
/// ```no_run
/// use dirsort::cli::build_plan;
/// use dirsort::config::OrganizerConfig;
/// use std::path::Path;
///
/// let plan = build_plan(Path::new("/home/user/Downloads"), &OrganizerConfig::default())?;
/// for planned in &plan {
///     println!("{} -> {}", planned.source.display(), planned.destination.display());
/// }
/// # Ok::<(), dirsort::OrganizeError>(())
/// ```
pub fn build_plan(target_dir: &Path, config: &OrganizerConfig) -> OrganizeResult<Vec<PlannedMove>> {
    let table = CategoryTable::from_rules(&config.categories)?;
    plan_with_table(target_dir, config, &table)
}

fn plan_with_table(
    target_dir: &Path,
    config: &OrganizerConfig,
    table: &CategoryTable,
) -> OrganizeResult<Vec<PlannedMove>> {
    let filters = config.compile_filters()?;

    let classified = scanner::scan(target_dir, &filters)?.map(|entry| {
        let category = table.classify(&entry).clone();
        (entry, category)
    });

    Ok(planner::plan(classified, target_dir))
}

/// Runs the whole pipeline and prints the outcome.
///
/// Fatal errors (missing target, bad configuration) are returned before any
/// file is touched. Per-file failures are part of the returned outcome.
pub fn run_cli(options: &OrganizeOptions) -> OrganizeResult<RunOutcome> {
    let config = OrganizerConfig::load(options.config_path.as_deref())?;
    let target = options.target_dir.as_path();
    let text = options.format == OutputFormat::Text;

    if text {
        if options.dry_run {
            OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", target.display()));
        } else {
            OutputFormatter::info(&format!("Organizing contents of: {}", target.display()));
        }
    }

    let table = CategoryTable::from_rules(&config.categories)?;
    let plan = plan_with_table(target, &config, &table)?;
    let scanned = plan.len();
    debug!(scanned, "plan built");

    if text {
        OutputFormatter::plain(&format!("Files scanned: {}", scanned));
        for planned in &plan {
            OutputFormatter::planned_move(planned, target);
        }
    }

    let mut executor = Executor::new();
    let report = if text && !options.dry_run && !plan.is_empty() {
        let pb = OutputFormatter::create_progress_bar(plan.len() as u64);
        let report = executor.execute_with_observer(plan, false, |_, _| pb.inc(1));
        pb.finish_and_clear();
        report
    } else {
        executor.execute(plan, options.dry_run)
    };

    let outcome = RunOutcome { scanned, report };
    if text {
        print_text_summary(&outcome, &table);
    } else {
        OutputFormatter::json(&outcome.report, target, outcome.scanned);
    }

    Ok(outcome)
}

fn print_text_summary(outcome: &RunOutcome, table: &CategoryTable) {
    let report = &outcome.report;
    OutputFormatter::failures(report);

    if !report.moved.is_empty() {
        OutputFormatter::summary_table(&category_counts(report, table), report.moved.len());
    }

    println!();
    if report.has_failures() {
        OutputFormatter::warning(&format!(
            "{} ({} failed)",
            report.summary_line(),
            report.failed.len()
        ));
    } else if report.dry_run {
        OutputFormatter::dry_run_notice(&report.summary_line());
    } else {
        OutputFormatter::success(&report.summary_line());
    }
}
