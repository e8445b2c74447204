//! test-report: interactive viewer for grouped test-execution reports.
//!
//! Loads a report document and shows it in a TUI where groups expand into
//! their test cases and cases expand into their console output.
//! Default: TUI mode | --summary: headless colored listing | --html: static snapshot

mod dom;
mod html;
mod logging;
mod model;
mod tui;
mod view;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;

use crate::logging::LogTarget;
use crate::model::{load_store, ResultStore, TestCase};
use crate::view::{ClickEvent, IndicatorSize, ReportView, ViewConfig};

// ─────────────────────────────────────────────────────────────────────────────
// CLI
// ─────────────────────────────────────────────────────────────────────────────

/// CLI arguments for test-report.
#[derive(Parser, Debug)]
#[command(name = "test-report")]
#[command(about = "Interactive viewer for grouped test-execution reports")]
#[command(version)]
struct Cli {
    /// Report document (.json, .yaml or .yml).
    input: PathBuf,

    /// Title shown in the HTML snapshot.
    #[arg(short, long, default_value = "test-report")]
    title: String,

    /// Size in pixels of the group indicators: N, or WxH.
    #[arg(short, long, default_value = "24")]
    size: String,

    /// Write a static HTML snapshot to this file instead of starting the TUI.
    #[arg(long)]
    html: Option<PathBuf>,

    /// Group to select on start; also receives clicks that carry no target.
    #[arg(long)]
    select: Option<usize>,

    /// Shift-click the selected group (expand all of its cases).
    #[arg(long, requires = "select")]
    shift: bool,

    /// Print a colored summary of every case and exit.
    #[arg(long, conflicts_with = "html")]
    summary: bool,

    /// Write logs to this file (the TUI only logs when this is set).
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    const fn is_headless(&self) -> bool {
        self.summary || self.html.is_some()
    }

    fn log_target(&self) -> LogTarget<'_> {
        match &self.log_file {
            Some(path) => LogTarget::File(path),
            None if self.is_headless() => LogTarget::Stderr,
            None => LogTarget::Off,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.log_target(), cli.verbose) {
        eprintln!("{} Failed to open log file: {e}", "ERROR:".red().bold());
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {e:#}", "ERROR:".red().bold());
            ExitCode::FAILURE
        }
    }
}

/// Runs the selected mode. Returns `Ok(false)` when the summary or the TUI
/// shows failed cases; writing a snapshot succeeds regardless.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let size = IndicatorSize::parse(&cli.size)?;
    let store = load_store(&cli.input)
        .with_context(|| format!("cannot load report {}", cli.input.display()))?;

    if cli.summary {
        return Ok(print_summary(&store));
    }
    if let Some(n) = cli.select {
        if store.group(n).is_none() {
            anyhow::bail!("group {n} is not in the report ({} groups)", store.groups().len());
        }
    }

    let config = ViewConfig {
        default_group: cli.select,
        indicator_size: size,
        ..ViewConfig::default()
    };
    let mut view = ReportView::mount(store, config);
    tracing::debug!(nodes = view.document().len(), "view mounted");
    if cli.select.is_some() {
        // No target: the view falls back to the configured default group.
        let outcome = view.dispatch(ClickEvent {
            target: None,
            shift_key: cli.shift,
        });
        tracing::debug!(?outcome, "initial selection");
    }

    match &cli.html {
        Some(path) => {
            let stamp = chrono::Local::now().naive_local();
            let page = html::render_page(&view, &cli.title, stamp);
            fs::write(path, page).with_context(|| format!("cannot write {}", path.display()))?;
            println!("{} {}", "Wrote".green().bold(), path.display());
            Ok(true)
        }
        None => tui::run(view),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Summary Mode
// ─────────────────────────────────────────────────────────────────────────────

/// Prints every case grouped by group. Returns `true` when nothing failed.
fn print_summary(store: &ResultStore) -> bool {
    println!();
    println!("{}", "═".repeat(70).cyan());
    for group in store.groups() {
        println!("{}", format!("┌─ {} ", group.label()).cyan().bold());
        for case in &group.cases {
            print_case(case);
        }
    }

    let summary = store.summary();
    println!("{}", "═".repeat(70).cyan());
    println!(
        "  {} passed, {} failed, {} skipped ({} total)",
        summary.passed.to_string().green(),
        summary.failed.to_string().red(),
        summary.skipped.to_string().yellow(),
        summary.total()
    );
    println!();
    summary.failed == 0
}

fn print_case(case: &TestCase) {
    let duration = view::render::duration_text(case.elapsed_seconds);
    if case.passed {
        println!(
            "  {} {} {}",
            "✓".green().bold(),
            case.name.white(),
            duration.dimmed()
        );
    } else if case.skipped {
        println!("  {} {}", "⊘".yellow().bold(), case.name.white());
    } else {
        println!(
            "  {} {} {}",
            "✗".red().bold(),
            case.name.white(),
            duration.dimmed()
        );
        for line in case.console_text().lines() {
            println!("      {}", line.red());
        }
    }
}
