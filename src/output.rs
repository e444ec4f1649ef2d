//! Output formatting and styling module.
//!
//! All user-facing CLI output goes through here: colored status lines, the
//! progress bar, the per-category summary table and the JSON report.
//! Diagnostics go through `tracing` instead.

use crate::executor::ExecutionReport;
use crate::file_category::CategoryTable;
use crate::planner::PlannedMove;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::Path;

/// Manages CLI output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// OutputFormatter::success("3 files organized.");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red to stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar for `total` moves.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints one planned move as `name → folder/name`.
    pub fn planned_move(planned: &PlannedMove, base: &Path) {
        let name = display_name(&planned.source);
        let destination = planned
            .destination
            .strip_prefix(base)
            .unwrap_or(&planned.destination);
        println!(" - {} → {}", name, destination.display().to_string().green());
        if planned.is_renamed() {
            println!(
                "   {} renamed to {}",
                "⚠".yellow(),
                display_name(&planned.destination)
            );
        }
    }

    /// Prints a summary table with file counts per category folder, in the
    /// order given.
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    ///
    /// let counts = vec![("images".to_string(), 8), ("documents".to_string(), 15)];
    /// OutputFormatter::summary_table(&counts, 23);
    /// ```
    pub fn summary_table(categories: &[(String, usize)], total_files: usize) {
        Self::header("SUMMARY");

        let width = categories
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!("{:<width$} | {}", "Category".bold(), "Files".bold());
        println!("{}", "-".repeat(width + 10));

        for (category, count) in categories {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                plural(*count)
            );
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files)
        );
    }

    /// Prints every failed move with its reason.
    pub fn failures(report: &ExecutionReport) {
        if report.failed.is_empty() {
            return;
        }
        Self::header("FAILED");
        for failed in &report.failed {
            Self::error(&format!(
                "{}: {}",
                failed.planned.source.display(),
                failed.error
            ));
        }
    }

    /// Prints the report as pretty JSON.
    pub fn json(report: &ExecutionReport, target: &Path, scanned: usize) {
        match report_json(report, target, scanned).and_then(|v| serde_json::to_string_pretty(&v)) {
            Ok(text) => println!("{}", text),
            Err(e) => Self::error(&format!("Could not serialize report: {}", e)),
        }
    }
}

/// Counts moved files per category folder, in table priority order.
///
/// Folders without moves are left out. Folders the table does not know come
/// last, sorted by name.
pub fn category_counts(report: &ExecutionReport, table: &CategoryTable) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for planned in &report.moved {
        *counts.entry(planned.category.folder_name.as_str()).or_insert(0) += 1;
    }

    let mut ordered = Vec::with_capacity(counts.len());
    for category in table.categories() {
        if let Some(count) = counts.remove(category.folder_name.as_str()) {
            ordered.push((category.folder_name.clone(), count));
        }
    }

    let mut rest: Vec<_> = counts
        .into_iter()
        .map(|(folder, count)| (folder.to_string(), count))
        .collect();
    rest.sort();
    ordered.extend(rest);
    ordered
}

/// Machine-readable view of a report.
pub fn report_json(report: &ExecutionReport, target: &Path, scanned: usize) -> serde_json::Result<Value> {
    let moved = report
        .moved
        .iter()
        .map(serde_json::to_value)
        .collect::<serde_json::Result<Vec<_>>>()?;

    let failed = report
        .failed
        .iter()
        .map(|failed| {
            let mut value = serde_json::to_value(&failed.planned)?;
            value["reason"] = json!(failed.error.to_string());
            Ok(value)
        })
        .collect::<serde_json::Result<Vec<_>>>()?;

    Ok(json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "target": target.to_string_lossy(),
        "dry_run": report.dry_run,
        "scanned": scanned,
        "moved": moved,
        "failed": failed,
    }))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
