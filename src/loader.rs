// src/loader.rs
//! Parallel loading of per-environment compilation databases.
//!
//! Each environment is read by its own rayon task. Tasks return their result
//! instead of writing to shared state, and the collect is a full barrier: the
//! caller sees every outcome, success or failure, before anything is merged.

use std::fs;
use std::path::Path;

use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

use crate::config::Config;
use crate::error::{LoadError, Result};
use crate::types::{CompileCommand, EnvDatabases};

/// Everything the load phase produced.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub databases: EnvDatabases,
    pub errors: Vec<LoadError>,
}

impl LoadOutcome {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Reads one database file.
///
/// # Errors
/// Returns a `LoadError` tagged with `env` and `path` if the file cannot be
/// read or is not a list of compile commands.
pub fn load_database(env: &str, path: &Path) -> std::result::Result<Vec<CompileCommand>, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Read {
        env: env.to_string(),
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| LoadError::Parse {
        env: env.to_string(),
        path: path.to_path_buf(),
        source,
    })
}

/// Loads every environment's database under `root`.
///
/// Runs on the global rayon pool, or on a dedicated pool when
/// `config.load.jobs` is non-zero.
///
/// # Errors
/// Returns error only if a dedicated worker pool cannot be built. Per-environment
/// failures are reported in [`LoadOutcome::errors`].
pub fn load_all(envs: &[String], root: &Path, config: &Config) -> Result<LoadOutcome> {
    if config.load.jobs == 0 {
        return Ok(load_parallel(envs, root, config));
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.load.jobs)
        .thread_name(|i| format!("pioclangd-load-{i}"))
        .build()?;
    Ok(pool.install(|| load_parallel(envs, root, config)))
}

fn load_parallel(envs: &[String], root: &Path, config: &Config) -> LoadOutcome {
    let results: Vec<(String, std::result::Result<Vec<CompileCommand>, LoadError>)> = envs
        .par_iter()
        .map(|env| {
            let path = config.database_path(root, env);
            (env.clone(), load_database(env, &path))
        })
        .collect();

    let mut outcome = LoadOutcome::default();
    for (env, result) in results {
        match result {
            Ok(commands) => {
                outcome.databases.insert(env, commands);
            }
            Err(e) => outcome.errors.push(e),
        }
    }
    outcome
}
