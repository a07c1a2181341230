// src/cli/handlers.rs
use crate::clangd_config::{ClangdGenerator, MetadataSource};
use crate::cli::args::Cli;
use crate::config::Config;
use crate::error::PioError;
use crate::exit::PioClangdExit;
use crate::pipeline::{Event, Pipeline};
use crate::reporting::{self, Verbosity};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Resolves the project directory, defaulting to the working directory.
///
/// # Errors
/// Returns error if the working directory cannot be determined.
pub fn project_root(path: Option<&PathBuf>) -> Result<PathBuf> {
    let raw = match path {
        Some(p) if !p.as_os_str().is_empty() => p.clone(),
        _ => std::env::current_dir().context("Failed to determine working directory")?,
    };
    std::path::absolute(&raw).with_context(|| format!("Failed to resolve {}", raw.display()))
}

/// Builds the effective config: `pioclangd.toml` first, then CLI overrides.
/// `--output` is applied by each handler.
///
/// # Errors
/// Returns error if `pioclangd.toml` exists but is invalid.
pub fn build_config(cli: &Cli, root: &std::path::Path) -> Result<Config, PioError> {
    let mut config = Config::load(root)?;
    if let Some(jobs) = cli.jobs {
        config.load.jobs = jobs;
    }
    config.verbose = cli.verbose;
    config.quiet = cli.quiet || cli.json;
    config.dry_run = cli.dry_run;
    Ok(config)
}

/// Handles a full generate run.
///
/// # Errors
/// Returns error only for failures outside the pipeline (working directory,
/// JSON summary output). Pipeline failures are reported and mapped to an
/// exit code.
pub fn handle_generate(cli: &Cli) -> Result<PioClangdExit> {
    let root = project_root(cli.path.as_ref())?;

    let mut config = match build_config(cli, &root) {
        Ok(c) => c,
        Err(e) => {
            reporting::print_error(&e);
            return Ok(PioClangdExit::from(&e));
        }
    };
    if let Some(output) = &cli.output {
        config.paths.output.clone_from(output);
    }
    let verbosity = Verbosity {
        verbose: config.verbose,
        quiet: config.quiet,
    };

    let pipeline = Pipeline::new(root, config).with_target(Some(cli.env.clone()));
    let result = pipeline.run_with_progress(&|event: &Event| reporting::print_event(event, verbosity));

    match result {
        Ok(report) => {
            if cli.json {
                reporting::print_json(&report)?;
            } else {
                reporting::print_summary(&report, verbosity);
            }
            Ok(PioClangdExit::Success)
        }
        Err(e) => {
            reporting::print_error(&e);
            Ok(PioClangdExit::from(&e))
        }
    }
}

/// Handles `pioclangd clangd`.
///
/// # Errors
/// Returns error only for failures outside generation (working directory,
/// JSON summary output).
pub fn handle_clangd(cli: &Cli, metadata: Option<&PathBuf>, skip: &[String]) -> Result<PioClangdExit> {
    let root = project_root(cli.path.as_ref())?;

    let mut config = match build_config(cli, &root) {
        Ok(c) => c,
        Err(e) => {
            reporting::print_error(&e);
            return Ok(PioClangdExit::from(&e));
        }
    };
    if let Some(output) = &cli.output {
        config.clangd.output.clone_from(output);
    }
    config.clangd.skip_flags.extend_from_slice(skip);
    let verbosity = Verbosity {
        verbose: config.verbose,
        quiet: config.quiet,
    };

    let source = metadata.map_or(MetadataSource::Pio, |path| MetadataSource::File(path.clone()));
    if source == MetadataSource::Pio && !verbosity.quiet {
        println!("Fetching PlatformIO project metadata...");
    }

    let generator = ClangdGenerator::new(root, config)
        .with_target(Some(cli.env.clone()))
        .with_source(source);

    match generator.run() {
        Ok(report) => {
            if cli.json {
                reporting::print_clangd_json(&report)?;
            } else {
                reporting::print_clangd_summary(&report, verbosity);
            }
            Ok(PioClangdExit::Success)
        }
        Err(e) => {
            reporting::print_error(&e);
            Ok(PioClangdExit::from(&e))
        }
    }
}
