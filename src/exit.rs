// src/exit.rs
//! Process exit codes for `pioclangd`.
//!
//! Scripts and editor tasks can rely on 0 vs non-0; the specific codes tell
//! which stage failed.

use std::process::Termination;

use crate::error::PioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum PioClangdExit {
    /// Output written (or dry run completed).
    Success = 0,
    /// Generic error (argument handling, JSON summary output).
    Error = 1,
    /// `platformio.ini` or `pioclangd.toml` missing, unreadable or empty.
    ProjectConfig = 2,
    /// At least one environment's database could not be loaded.
    LoadFailure = 3,
    /// The merged database or `.clangd` could not be written.
    WriteFailure = 4,
    /// `pio project metadata` could not be run, read or parsed.
    MetadataFailure = 5,
}

impl PioClangdExit {
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl Termination for PioClangdExit {
    fn report(self) -> std::process::ExitCode {
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        std::process::ExitCode::from(self.code() as u8)
    }
}

impl From<&PioError> for PioClangdExit {
    fn from(err: &PioError) -> Self {
        match err {
            PioError::EnvironmentSourceMissing { .. }
            | PioError::EnvironmentSourceUnreadable { .. }
            | PioError::NoEnvironmentsDeclared { .. }
            | PioError::ConfigUnreadable { .. }
            | PioError::InvalidConfig { .. }
            | PioError::MetadataEnvironmentNotFound { .. }
            | PioError::NoMetadataEnvironments => Self::ProjectConfig,
            PioError::LoadFailures { .. } => Self::LoadFailure,
            PioError::OutputWriteFailure { .. } => Self::WriteFailure,
            PioError::MetadataCommand { .. }
            | PioError::MetadataCommandFailed { .. }
            | PioError::MetadataUnreadable { .. }
            | PioError::InvalidMetadata { .. } => Self::MetadataFailure,
            PioError::WorkerPool(_) => Self::Error,
        }
    }
}
