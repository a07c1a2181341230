// src/error.rs
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::pipeline::Stage;

#[derive(Debug, Error)]
pub enum PioError {
    #[error("{} not found", .path.display())]
    EnvironmentSourceMissing { path: PathBuf },

    #[error("Failed to open {}: {source}", .path.display())]
    EnvironmentSourceUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No environments found in {}", .path.display())]
    NoEnvironmentsDeclared { path: PathBuf },

    #[error("Failed to process {}/{total} environment(s)", .failures.len())]
    LoadFailures {
        failures: Vec<LoadError>,
        total: usize,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    OutputWriteFailure {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    ConfigUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid configuration in {}: {source}", .path.display())]
    InvalidConfig {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to start load workers: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Failed to run `pio project metadata`: {source}")]
    MetadataCommand { source: std::io::Error },

    #[error("`pio project metadata` exited with {status}: {stderr}")]
    MetadataCommandFailed { status: String, stderr: String },

    #[error("Failed to read {}: {source}", .path.display())]
    MetadataUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse project metadata: {source}")]
    InvalidMetadata { source: serde_json::Error },

    #[error("Environment '{name}' not found. Available: {}", .available.join(", "))]
    MetadataEnvironmentNotFound { name: String, available: Vec<String> },

    #[error("Project metadata lists no environments")]
    NoMetadataEnvironments,
}

impl PioError {
    /// The pipeline stage that was being entered when this error occurred.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::EnvironmentSourceMissing { .. }
            | Self::EnvironmentSourceUnreadable { .. }
            | Self::NoEnvironmentsDeclared { .. }
            | Self::ConfigUnreadable { .. }
            | Self::InvalidConfig { .. }
            | Self::MetadataEnvironmentNotFound { .. }
            | Self::NoMetadataEnvironments => Stage::EnvironmentsResolved,
            Self::LoadFailures { .. }
            | Self::WorkerPool(_)
            | Self::MetadataCommand { .. }
            | Self::MetadataCommandFailed { .. }
            | Self::MetadataUnreadable { .. }
            | Self::InvalidMetadata { .. } => Stage::Loaded,
            Self::OutputWriteFailure { .. } => Stage::Written,
        }
    }
}

/// A single environment whose database could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        env: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        env: String,
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl LoadError {
    #[must_use]
    pub fn env(&self) -> &str {
        match self {
            Self::Read { env, .. } | Self::Parse { env, .. } => env,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } => path,
        }
    }
}

pub type Result<T> = std::result::Result<T, PioError>;
