//! Console output for pipeline runs.
//!
//! Informational lines go to stdout. Warnings, errors and verbose stage
//! tracing go to stderr so stdout stays clean for `--json`.

use crate::clangd_config::ClangdReport;
use crate::error::PioError;
use crate::pipeline::{Event, RunReport};
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

/// How much to print.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verbosity {
    pub verbose: bool,
    pub quiet: bool,
}

/// Prints a progress event.
pub fn print_event(event: &Event, verbosity: Verbosity) {
    match event {
        Event::TargetFallback { requested, chosen } => {
            warn(&format!("Environment '{requested}' not found in platformio.ini"));
            warn(&format!("Falling back to environment '{chosen}'"));
        }
        Event::Stage(stage) if verbosity.verbose => {
            eprintln!("{}", format!("[stage] {stage}").dimmed());
        }
        Event::EnvironmentLoaded { env, count } if verbosity.verbose => {
            eprintln!("{}", format!("  {env}: {count} commands").dimmed());
        }
        _ => {}
    }
}

pub fn warn(message: &str) {
    eprintln!("{} {message}", "warning:".yellow().bold());
}

/// Prints a fatal pipeline error, including every failed environment.
pub fn print_error(err: &PioError) {
    if let PioError::LoadFailures { failures, .. } = err {
        for failure in failures {
            eprintln!("{} {failure}", "error:".red().bold());
        }
    }
    eprintln!("{} {err}", "error:".red().bold());
}

/// Prints the human-readable summary of a successful run.
pub fn print_summary(report: &RunReport, verbosity: Verbosity) {
    if verbosity.quiet {
        return;
    }
    let stats = &report.stats;
    println!(
        "Loaded {} environment(s) with {} total compile commands",
        stats.environment_count(),
        stats.total_before
    );
    println!(
        "Target environment: '{}' ({} commands)",
        report.target.cyan(),
        stats.target_count
    );
    println!("Deduplicated to {} unique source files", stats.unique_after);

    let name = report
        .output
        .file_name()
        .map_or_else(|| report.output.display().to_string(), |n| n.to_string_lossy().into_owned());
    if report.written {
        println!(
            "{}",
            format!("Successfully wrote {name} with {} entries", stats.unique_after)
                .green()
                .bold()
        );
    } else {
        println!(
            "{}",
            format!("Dry run: would write {name} with {} entries", stats.unique_after).yellow()
        );
    }
    println!(
        "Reduction: {} -> {} commands ({:.1}%)",
        stats.total_before,
        stats.unique_after,
        report.reduction_percent()
    );
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    #[serde(flatten)]
    report: &'a RunReport,
    reduction_percent: f64,
}

/// Prints the run summary as JSON on stdout.
///
/// # Errors
/// Returns error if serialization fails.
pub fn print_json(report: &RunReport) -> Result<()> {
    let summary = JsonSummary {
        report,
        reduction_percent: report.reduction_percent(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Prints the human-readable summary of a `.clangd` run.
pub fn print_clangd_summary(report: &ClangdReport, verbosity: Verbosity) {
    if verbosity.quiet {
        return;
    }
    if report.auto_selected && report.available.len() > 1 {
        println!("Multiple environments found: {}", report.available.join(", "));
        println!("Using '{}' (pass --env to use another)", report.environment.cyan());
    }
    println!("Generating .clangd for environment: {}", report.environment.cyan());

    let path = report.output.display();
    if report.written {
        println!("{}", format!("Generated {path}").green().bold());
    } else {
        println!("{}", format!("Dry run: would write {path}").yellow());
    }
    let stats = &report.stats;
    println!("  - {} defines", stats.defines);
    println!("  - {} include paths (build + compatlib + toolchain)", stats.includes);
    println!(
        "  - {} compiler flags (filtered {} GCC-specific)",
        stats.flags, stats.filtered_flags
    );
}

/// Prints a `.clangd` run summary as JSON on stdout.
///
/// # Errors
/// Returns error if serialization fails.
pub fn print_clangd_json(report: &ClangdReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
