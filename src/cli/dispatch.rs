//! Routes a parsed command line to its handler.

use super::args::{Cli, Commands};
use super::handlers::{handle_clangd, handle_generate};
use crate::exit::PioClangdExit;
use anyhow::Result;

/// Executes the parsed command. No subcommand means a merge run.
///
/// # Errors
/// Returns error if the handler fails outside its own error reporting.
pub fn execute(cli: &Cli) -> Result<PioClangdExit> {
    match &cli.command {
        None => handle_generate(cli),
        Some(Commands::Clangd { metadata, skip }) => handle_clangd(cli, metadata.as_ref(), skip),
    }
}
