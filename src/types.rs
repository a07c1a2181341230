// src/types.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry of a `compile_commands.json` database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileCommand {
    pub directory: String,
    pub file: String,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub arguments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl CompileCommand {
    #[must_use]
    pub fn new(directory: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            file: file.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }
}

/// Per-environment databases, keyed by environment name.
pub type EnvDatabases = std::collections::HashMap<String, Vec<CompileCommand>>;

/// Deduplicated records keyed by normalized path.
pub type MergedDatabase = BTreeMap<String, CompileCommand>;

/// Counts gathered while merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub total_before: usize,
    pub unique_after: usize,
    pub per_environment: BTreeMap<String, usize>,
    pub target: String,
    pub target_count: usize,
}

impl MergeStats {
    /// Percentage of records removed by deduplication. Zero for an empty input.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn reduction_percent(&self) -> f64 {
        if self.total_before == 0 {
            return 0.0;
        }
        100.0 - (self.unique_after as f64 * 100.0) / self.total_before as f64
    }

    /// Number of environments that contributed a database.
    #[must_use]
    pub fn environment_count(&self) -> usize {
        self.per_environment.len()
    }
}
