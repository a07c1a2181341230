//! Merges per-environment PlatformIO compilation databases into a single
//! `compile_commands.json` that clangd can use.

pub mod clangd_config;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod exit;
pub mod filter;
pub mod flags;
pub mod loader;
pub mod merge;
pub mod pipeline;
pub mod project;
pub mod reporting;
pub mod types;
