// src/merge.rs
//! Deduplication of compile commands across environments.
//!
//! PlatformIO installs library dependencies per environment
//! (`.pio/libdeps/<env>/<Lib>/...`), so the same library source shows up once
//! per environment under a different absolute path. Collapsing the
//! environment segment after the libdeps marker makes those copies share a key.

use std::path::{Component, Path, PathBuf};

use crate::types::{CompileCommand, EnvDatabases, MergeStats, MergedDatabase};

/// Resolves `.` and `..` without touching the filesystem.
#[must_use]
pub fn lexically_normal(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                // ".." above the root stays at the root
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(comp),
            },
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

/// Key under which `directory`/`file` is deduplicated.
///
/// The path is normalized with forward slashes, then the segment right after
/// the first `marker` occurrence is removed.
#[must_use]
pub fn dedup_key(directory: &str, file: &str, marker: &str) -> String {
    let full = lexically_normal(&Path::new(directory).join(file));
    let mut key = full.to_string_lossy().replace('\\', "/");

    if marker.is_empty() {
        return key;
    }
    if let Some(pos) = key.find(marker) {
        let after = pos + marker.len();
        if let Some(slash) = key[after..].find('/') {
            key.replace_range(after..=after + slash, "");
        }
    }
    key
}

fn key_of(cmd: &CompileCommand, marker: &str) -> String {
    dedup_key(&cmd.directory, &cmd.file, marker)
}

/// Merges per-environment databases into one record per key.
///
/// Records from `target` always win. Within `target`, a repeated key keeps the
/// last record. Other environments only fill keys nobody has claimed yet, in
/// whatever order the map yields them.
#[must_use]
pub fn merge(mut databases: EnvDatabases, target: &str, marker: &str) -> (MergedDatabase, MergeStats) {
    let mut stats = MergeStats {
        total_before: databases.values().map(Vec::len).sum(),
        per_environment: databases
            .iter()
            .map(|(env, cmds)| (env.clone(), cmds.len()))
            .collect(),
        target: target.to_string(),
        ..MergeStats::default()
    };

    let mut merged = MergedDatabase::new();

    if let Some(commands) = databases.remove(target) {
        stats.target_count = commands.len();
        for cmd in commands {
            merged.insert(key_of(&cmd, marker), cmd);
        }
    }

    for commands in databases.into_values() {
        for cmd in commands {
            merged.entry(key_of(&cmd, marker)).or_insert(cmd);
        }
    }

    stats.unique_after = merged.len();
    (merged, stats)
}
