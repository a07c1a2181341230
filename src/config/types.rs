use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,
    #[serde(default = "default_database")]
    pub database: PathBuf,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default = "default_libdeps_marker")]
    pub libdeps_marker: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            build_dir: default_build_dir(),
            database: default_database(),
            output: default_output(),
            libdeps_marker: default_libdeps_marker(),
        }
    }
}

fn default_build_dir() -> PathBuf { PathBuf::from(".pio/build") }
fn default_database() -> PathBuf { PathBuf::from("compile_commands.json") }
fn default_output() -> PathBuf { PathBuf::from("compile_commands.json") }
fn default_libdeps_marker() -> String { ".pio/libdeps/".to_string() }

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadConfig {
    /// Worker threads for the load phase. 0 uses the global pool.
    #[serde(default)]
    pub jobs: usize,
}

/// Settings for the `.clangd` generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClangdConfig {
    #[serde(default = "default_clangd_output")]
    pub output: PathBuf,
    /// Extra flags to drop, on top of the built-in GCC list.
    #[serde(default)]
    pub skip_flags: Vec<String>,
    /// Exact-match flag rewrites, applied after skipping.
    #[serde(default)]
    pub transforms: BTreeMap<String, String>,
}

impl Default for ClangdConfig {
    fn default() -> Self {
        Self {
            output: default_clangd_output(),
            skip_flags: Vec::new(),
            transforms: BTreeMap::new(),
        }
    }
}

fn default_clangd_output() -> PathBuf { PathBuf::from(".clangd") }

/// Contents of `pioclangd.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PioClangdToml {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub load: LoadConfig,
    #[serde(default)]
    pub clangd: ClangdConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub paths: PathsConfig,
    pub load: LoadConfig,
    pub clangd: ClangdConfig,
    pub verbose: bool,
    pub quiet: bool,
    pub dry_run: bool,
}
