// src/cli/mod.rs
//! Command-line entry points.

pub mod args;
pub mod dispatch;
pub mod handlers;

pub use args::{Cli, Commands};
