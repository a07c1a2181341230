// src/project.rs
//! Reads the environment list from `platformio.ini`.

use crate::error::{PioError, Result};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

pub const PROJECT_FILE: &str = "platformio.ini";

static ENV_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[env:([a-zA-Z0-9_\-]+)\]").unwrap_or_else(|_| panic!("Invalid Regex"))
});

/// Returns environment names in the order they are declared.
///
/// # Errors
/// Returns error if `platformio.ini` is missing or unreadable, or declares no
/// `[env:NAME]` sections.
pub fn environments(root: &Path) -> Result<Vec<String>> {
    let ini_path = root.join(PROJECT_FILE);
    if !ini_path.is_file() {
        return Err(PioError::EnvironmentSourceMissing { path: ini_path });
    }

    let content = fs::read_to_string(&ini_path).map_err(|source| {
        PioError::EnvironmentSourceUnreadable {
            path: ini_path.clone(),
            source,
        }
    })?;

    let envs = parse_environments(&content);
    if envs.is_empty() {
        return Err(PioError::NoEnvironmentsDeclared { path: ini_path });
    }
    Ok(envs)
}

/// Extracts `[env:NAME]` headers from ini text, first match per line.
#[must_use]
pub fn parse_environments(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| ENV_RE.captures(line))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// The environment whose records win during merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSelection {
    pub name: String,
    /// Set when the requested environment was not declared.
    pub missing: Option<String>,
}

/// Picks the target environment.
///
/// An empty or absent request selects the first declared environment. An
/// unknown request also falls back to the first one and records the miss.
/// Returns `None` only when `envs` is empty.
#[must_use]
pub fn select_target(envs: &[String], requested: Option<&str>) -> Option<TargetSelection> {
    let first = envs.first()?;
    let selection = match requested.filter(|name| !name.is_empty()) {
        None => TargetSelection { name: first.clone(), missing: None },
        Some(name) if envs.iter().any(|env| env == name) => TargetSelection {
            name: name.to_string(),
            missing: None,
        },
        Some(name) => TargetSelection {
            name: first.clone(),
            missing: Some(name.to_string()),
        },
    };
    Some(selection)
}
