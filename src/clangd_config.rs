// src/clangd_config.rs
//! `.clangd` generation from `pio project metadata --json-output`.
//!
//! The merged database covers every compiled file. `.clangd` carries one
//! environment's defines, include paths and compiler flags for files the
//! database does not list (new headers, sources not built yet).

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::config::{ClangdConfig, Config};
use crate::error::{PioError, Result};
use crate::project;

pub const METADATA_PROGRAM: &str = "pio";
pub const METADATA_ARGS: [&str; 3] = ["project", "metadata", "--json-output"];

/// GCC flags clangd rejects or misreads. Sorted.
pub const DEFAULT_FLAGS_TO_SKIP: [&str; 9] = [
    "-MMD",
    "-Wno-error=unused-but-set-variable",
    "-Wno-old-style-declaration",
    "-fno-jump-tables",
    "-fno-rtti",
    "-fno-tree-switch-conversion",
    "-freorder-blocks",
    "-fstrict-volatile-bitfields",
    "-mlongcalls",
];

/// Include paths grouped the way PlatformIO reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IncludeGroups {
    #[serde(default)]
    pub build: Vec<String>,
    #[serde(default)]
    pub compatlib: Vec<String>,
    #[serde(default)]
    pub toolchain: Vec<String>,
}

impl IncludeGroups {
    /// Build, then compatlib, then toolchain paths.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.build
            .iter()
            .chain(&self.compatlib)
            .chain(&self.toolchain)
    }

    fn count(&self) -> usize {
        self.build.len() + self.compatlib.len() + self.toolchain.len()
    }
}

/// The part of one environment's metadata that `.clangd` needs. Other keys
/// PlatformIO emits are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnvMetadata {
    pub cxx_path: String,
    #[serde(default)]
    pub cxx_flags: Vec<String>,
    #[serde(default)]
    pub defines: Vec<String>,
    #[serde(default)]
    pub includes: IncludeGroups,
}

pub type ProjectMetadata = BTreeMap<String, EnvMetadata>;

/// Parses the JSON object `pio project metadata --json-output` prints.
///
/// # Errors
/// Returns the JSON error if `json` is not an object of environment metadata.
pub fn parse_metadata(json: &str) -> std::result::Result<ProjectMetadata, serde_json::Error> {
    serde_json::from_str(json)
}

/// Which compiler flags are dropped and which are rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagRules {
    skip: BTreeSet<String>,
    transforms: BTreeMap<String, String>,
}

impl Default for FlagRules {
    fn default() -> Self {
        Self {
            skip: DEFAULT_FLAGS_TO_SKIP.iter().map(ToString::to_string).collect(),
            transforms: BTreeMap::new(),
        }
    }
}

impl FlagRules {
    /// Built-in rules extended by the `[clangd]` config section.
    #[must_use]
    pub fn from_config(config: &ClangdConfig) -> Self {
        Self::default()
            .with_skipped(config.skip_flags.iter().cloned())
            .with_transforms(config.transforms.clone())
    }

    #[must_use]
    pub fn with_skipped<I>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.skip.extend(flags);
        self
    }

    /// Later rewrites for the same flag replace earlier ones.
    #[must_use]
    pub fn with_transforms<I>(mut self, transforms: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.transforms.extend(transforms);
        self
    }

    #[must_use]
    pub fn skips(&self, flag: &str) -> bool {
        self.skip.contains(flag)
    }

    /// The flag as it should appear in `.clangd`, or `None` if it is dropped.
    #[must_use]
    pub fn apply<'a>(&'a self, flag: &'a str) -> Option<&'a str> {
        if self.skips(flag) {
            return None;
        }
        Some(self.transforms.get(flag).map_or(flag, String::as_str))
    }
}

/// Entry counts for a generated `.clangd`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClangdStats {
    pub defines: usize,
    pub includes: usize,
    pub flags: usize,
    pub filtered_flags: usize,
}

#[must_use]
pub fn stats(env: &EnvMetadata, rules: &FlagRules) -> ClangdStats {
    let flags = env.cxx_flags.iter().filter(|f| !rules.skips(f)).count();
    ClangdStats {
        defines: env.defines.len(),
        includes: env.includes.count(),
        flags,
        filtered_flags: env.cxx_flags.len() - flags,
    }
}

/// Renders the `.clangd` YAML for one environment.
///
/// `Add` lists defines, then include paths, then the surviving compiler
/// flags, each verbatim. `Compiler` is the environment's C++ compiler.
#[must_use]
pub fn render(env: &EnvMetadata, rules: &FlagRules) -> String {
    let defines = env.defines.iter().map(|d| format!("-D{d}"));
    let includes = env.includes.iter().map(|i| format!("-I{i}"));
    let flags = env
        .cxx_flags
        .iter()
        .filter_map(|f| rules.apply(f))
        .map(ToString::to_string);

    let mut out = String::from("CompileFlags:\n  Add:\n");
    for entry in defines.chain(includes).chain(flags) {
        out.push_str("    - ");
        out.push_str(&entry);
        out.push('\n');
    }
    out.push_str("  Compiler: ");
    out.push_str(&env.cxx_path);
    out.push('\n');
    out
}

/// Picks the environment to generate for.
///
/// A non-empty `requested` must exist in `metadata`. Otherwise the first name
/// in `declared` that has metadata wins, then the first metadata key.
///
/// # Errors
/// Returns `MetadataEnvironmentNotFound` for an unknown request and
/// `NoMetadataEnvironments` when `metadata` is empty.
pub fn select_environment<'a>(
    metadata: &'a ProjectMetadata,
    declared: &[String],
    requested: Option<&str>,
) -> Result<(&'a str, &'a EnvMetadata)> {
    if let Some(name) = requested.filter(|n| !n.is_empty()) {
        return metadata
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| PioError::MetadataEnvironmentNotFound {
                name: name.to_string(),
                available: metadata.keys().cloned().collect(),
            });
    }

    declared
        .iter()
        .find_map(|name| metadata.get_key_value(name.as_str()))
        .or_else(|| metadata.iter().next())
        .map(|(k, v)| (k.as_str(), v))
        .ok_or(PioError::NoMetadataEnvironments)
}

/// Where project metadata comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MetadataSource {
    /// Run `pio project metadata --json-output` in the project root.
    #[default]
    Pio,
    /// Read previously captured metadata JSON.
    File(PathBuf),
}

/// Returns the raw metadata JSON.
///
/// # Errors
/// Returns error if `pio` cannot be started or fails, or the file cannot be read.
pub fn fetch_metadata(source: &MetadataSource, root: &Path) -> Result<String> {
    match source {
        MetadataSource::File(path) => {
            fs::read_to_string(path).map_err(|source| PioError::MetadataUnreadable {
                path: path.clone(),
                source,
            })
        }
        MetadataSource::Pio => run_pio_metadata(root),
    }
}

fn run_pio_metadata(root: &Path) -> Result<String> {
    let output = Command::new(METADATA_PROGRAM)
        .args(METADATA_ARGS)
        .current_dir(root)
        .output()
        .map_err(|source| PioError::MetadataCommand { source })?;

    if !output.status.success() {
        return Err(PioError::MetadataCommandFailed {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Result of a `.clangd` generation run.
#[derive(Debug, Clone, Serialize)]
pub struct ClangdReport {
    pub environment: String,
    pub available: Vec<String>,
    /// True when no environment was requested and one was picked.
    pub auto_selected: bool,
    pub stats: ClangdStats,
    pub output: PathBuf,
    pub written: bool,
}

pub struct ClangdGenerator {
    root: PathBuf,
    config: Config,
    target: Option<String>,
    source: MetadataSource,
}

impl ClangdGenerator {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            root: root.into(),
            config,
            target: None,
            source: MetadataSource::default(),
        }
    }

    /// Requests an environment. Empty means "first declared".
    #[must_use]
    pub fn with_target(mut self, target: Option<String>) -> Self {
        self.target = target.filter(|t| !t.is_empty());
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: MetadataSource) -> Self {
        self.source = source;
        self
    }

    /// Fetches metadata, renders `.clangd` and writes it unless dry-running.
    ///
    /// # Errors
    /// Returns error if metadata cannot be fetched or parsed, the requested
    /// environment is unknown, or the output cannot be written.
    pub fn run(&self) -> Result<ClangdReport> {
        let raw = fetch_metadata(&self.source, &self.root)?;
        let metadata = parse_metadata(&raw).map_err(|source| PioError::InvalidMetadata { source })?;

        // platformio.ini only orders the default choice; metadata alone is enough.
        let declared = project::environments(&self.root).unwrap_or_default();
        let (name, env) = select_environment(&metadata, &declared, self.target.as_deref())?;

        let rules = FlagRules::from_config(&self.config.clangd);
        let content = render(env, &rules);
        let output = self.config.clangd_output_path(&self.root);
        if !self.config.dry_run {
            fs::write(&output, content).map_err(|source| PioError::OutputWriteFailure {
                path: output.clone(),
                source,
            })?;
        }

        Ok(ClangdReport {
            environment: name.to_string(),
            available: metadata.keys().cloned().collect(),
            auto_selected: self.target.is_none(),
            stats: stats(env, &rules),
            output,
            written: !self.config.dry_run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "esp32dev": {
            "env_name": "esp32dev",
            "cc_path": "/tc/bin/xtensa-esp32-elf-gcc",
            "cxx_path": "/tc/bin/xtensa-esp32-elf-g++",
            "cxx_flags": ["-std=gnu++17", "-mlongcalls", "-fno-rtti", "-Os", "-MMD"],
            "defines": ["ARDUINO=10812", "ESP32", "BOARD_NAME=\"dev\""],
            "includes": {
                "build": ["/p/include", "/p/src"],
                "compatlib": ["/p/.pio/libdeps/esp32dev/Lib/src"],
                "toolchain": ["/tc/include"]
            },
            "svd_path": null
        },
        "native": {
            "cxx_path": "g++",
            "defines": [],
            "includes": {}
        }
    }"#;

    fn fixture() -> ProjectMetadata {
        parse_metadata(FIXTURE).unwrap()
    }

    #[test]
    fn parses_metadata_and_ignores_unknown_keys() {
        let meta = fixture();
        assert_eq!(meta.len(), 2);
        let dev = &meta["esp32dev"];
        assert_eq!(dev.includes.iter().count(), 4);
        assert!(meta["native"].cxx_flags.is_empty());
        assert_eq!(meta["native"].includes, IncludeGroups::default());
    }

    #[test]
    fn missing_compiler_is_a_parse_error() {
        assert!(parse_metadata(r#"{"e": {"defines": []}}"#).is_err());
        assert!(parse_metadata("[]").is_err());
    }

    #[test]
    fn renders_defines_includes_flags_then_compiler() {
        let meta = fixture();
        let yaml = render(&meta["esp32dev"], &FlagRules::default());
        let expected = "CompileFlags:\n  Add:\n    - -DARDUINO=10812\n    - -DESP32\n    - -DBOARD_NAME=\"dev\"\n    - -I/p/include\n    - -I/p/src\n    - -I/p/.pio/libdeps/esp32dev/Lib/src\n    - -I/tc/include\n    - -std=gnu++17\n    - -Os\n  Compiler: /tc/bin/xtensa-esp32-elf-g++\n";
        assert_eq!(yaml, expected);
    }

    #[test]
    fn renders_empty_add_list() {
        let meta = fixture();
        let yaml = render(&meta["native"], &FlagRules::default());
        assert_eq!(yaml, "CompileFlags:\n  Add:\n  Compiler: g++\n");
    }

    #[test]
    fn default_skip_list_is_sorted() {
        assert!(DEFAULT_FLAGS_TO_SKIP.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn extra_skips_and_transforms() {
        let rules = FlagRules::default()
            .with_skipped(["-Os".to_string()])
            .with_transforms([("-std=gnu++17".to_string(), "-std=c++17".to_string())]);
        assert_eq!(rules.apply("-Os"), None);
        assert_eq!(rules.apply("-mlongcalls"), None);
        assert_eq!(rules.apply("-std=gnu++17"), Some("-std=c++17"));
        assert_eq!(rules.apply("-Wall"), Some("-Wall"));

        let yaml = render(&fixture()["esp32dev"], &rules);
        assert!(yaml.contains("    - -std=c++17\n"));
        assert!(!yaml.contains("-Os"));
    }

    #[test]
    fn skip_wins_over_transform() {
        let rules = FlagRules::default()
            .with_transforms([("-MMD".to_string(), "-MD".to_string())]);
        assert_eq!(rules.apply("-MMD"), None);
    }

    #[test]
    fn rules_from_config() {
        let mut config = ClangdConfig::default();
        config.skip_flags.push("-Os".into());
        config.transforms.insert("-a".into(), "-b".into());
        let rules = FlagRules::from_config(&config);
        assert!(rules.skips("-Os"));
        assert!(rules.skips("-MMD"));
        assert_eq!(rules.apply("-a"), Some("-b"));
    }

    #[test]
    fn counts_entries() {
        let meta = fixture();
        let s = stats(&meta["esp32dev"], &FlagRules::default());
        assert_eq!(
            s,
            ClangdStats {
                defines: 3,
                includes: 4,
                flags: 2,
                filtered_flags: 3,
            }
        );
    }

    #[test]
    fn requested_environment_must_exist() {
        let meta = fixture();
        let (name, _) = select_environment(&meta, &[], Some("native")).unwrap();
        assert_eq!(name, "native");

        let err = select_environment(&meta, &[], Some("nope")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Environment 'nope' not found. Available: esp32dev, native"
        );
    }

    #[test]
    fn default_follows_declaration_order() {
        let meta = fixture();
        let declared = vec!["missing".to_string(), "native".to_string(), "esp32dev".to_string()];
        let (name, _) = select_environment(&meta, &declared, None).unwrap();
        assert_eq!(name, "native");

        let (name, _) = select_environment(&meta, &[], Some("")).unwrap();
        assert_eq!(name, "esp32dev");
    }

    #[test]
    fn empty_metadata_has_no_environment() {
        let meta = ProjectMetadata::new();
        assert!(matches!(
            select_environment(&meta, &[], None),
            Err(PioError::NoMetadataEnvironments)
        ));
    }
}
