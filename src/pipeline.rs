// src/pipeline.rs
//! Load -> merge -> filter -> write.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::Config;
use crate::error::{PioError, Result};
use crate::filter::filter_command;
use crate::loader;
use crate::merge::merge;
use crate::project::{self, TargetSelection};
use crate::types::{CompileCommand, MergeStats};

/// Pipeline stages, in order. A failure aborts before the stage it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Init,
    EnvironmentsResolved,
    Loaded,
    Merged,
    Filtered,
    Written,
    Done,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::EnvironmentsResolved => "environments",
            Self::Loaded => "load",
            Self::Merged => "merge",
            Self::Filtered => "filter",
            Self::Written => "write",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Progress notifications emitted while the pipeline runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Stage(Stage),
    TargetFallback { requested: String, chosen: String },
    EnvironmentLoaded { env: String, count: usize },
}

/// Result of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub environments: Vec<String>,
    pub target: String,
    pub fallback_from: Option<String>,
    pub stats: MergeStats,
    pub output: PathBuf,
    pub written: bool,
}

impl RunReport {
    #[must_use]
    pub fn reduction_percent(&self) -> f64 {
        self.stats.reduction_percent()
    }
}

pub struct Pipeline {
    root: PathBuf,
    config: Config,
    target: Option<String>,
}

impl Pipeline {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            root: root.into(),
            config,
            target: None,
        }
    }

    /// Requests a target environment. Empty means "first declared".
    #[must_use]
    pub fn with_target(mut self, target: Option<String>) -> Self {
        self.target = target.filter(|t| !t.is_empty());
        self
    }

    /// Runs the pipeline without progress reporting.
    ///
    /// # Errors
    /// See [`Pipeline::run_with_progress`].
    pub fn run(&self) -> Result<RunReport> {
        self.run_with_progress(&|_: &Event| {})
    }

    /// Runs every stage, reporting progress through `on_event`.
    ///
    /// # Errors
    /// Returns error if the environment list cannot be read, any environment's
    /// database fails to load, or the output cannot be written. Nothing is
    /// written unless every environment loaded.
    pub fn run_with_progress<F>(&self, on_event: &F) -> Result<RunReport>
    where
        F: Fn(&Event),
    {
        on_event(&Event::Stage(Stage::Init));

        let envs = project::environments(&self.root)?;
        let selection = self.resolve_target(&envs)?;
        if let Some(requested) = &selection.missing {
            on_event(&Event::TargetFallback {
                requested: requested.clone(),
                chosen: selection.name.clone(),
            });
        }
        on_event(&Event::Stage(Stage::EnvironmentsResolved));

        let outcome = loader::load_all(&envs, &self.root, &self.config)?;
        if !outcome.is_complete() {
            return Err(PioError::LoadFailures {
                failures: outcome.errors,
                total: envs.len(),
            });
        }
        for env in &envs {
            if let Some(cmds) = outcome.databases.get(env) {
                on_event(&Event::EnvironmentLoaded {
                    env: env.clone(),
                    count: cmds.len(),
                });
            }
        }
        on_event(&Event::Stage(Stage::Loaded));

        let (merged, stats) = merge(
            outcome.databases,
            &selection.name,
            &self.config.paths.libdeps_marker,
        );
        on_event(&Event::Stage(Stage::Merged));

        let records: Vec<CompileCommand> = merged.values().map(filter_command).collect();
        on_event(&Event::Stage(Stage::Filtered));

        let output = self.config.output_path(&self.root);
        if !self.config.dry_run {
            write_database(&output, &records)?;
            on_event(&Event::Stage(Stage::Written));
        }

        on_event(&Event::Stage(Stage::Done));
        Ok(RunReport {
            environments: envs,
            target: selection.name,
            fallback_from: selection.missing,
            stats,
            output,
            written: !self.config.dry_run,
        })
    }

    fn resolve_target(&self, envs: &[String]) -> Result<TargetSelection> {
        project::select_target(envs, self.target.as_deref()).ok_or_else(|| {
            PioError::NoEnvironmentsDeclared {
                path: self.root.join(project::PROJECT_FILE),
            }
        })
    }
}

/// Serializes `records` as compact JSON to `path`.
///
/// # Errors
/// Returns `OutputWriteFailure` if serialization or the write fails.
pub fn write_database(path: &Path, records: &[CompileCommand]) -> Result<()> {
    let to_err = |source: std::io::Error| PioError::OutputWriteFailure {
        path: path.to_path_buf(),
        source,
    };
    let json = serde_json::to_vec(records).map_err(|e| to_err(e.into()))?;
    fs::write(path, json).map_err(to_err)
}
