use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pioclangd",
    version,
    about = "Optimizes PlatformIO compile_commands.json for clangd"
)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    /// Directory containing platformio.ini. Defaults to the working directory.
    #[arg(long, short, global = true, value_name = "DIR")]
    pub path: Option<PathBuf>,
    /// Environment whose flags take priority. Defaults to the first environment.
    #[arg(long, short, global = true, value_name = "NAME", default_value = "")]
    pub env: String,
    /// Output file, relative to the project directory.
    #[arg(long, short, global = true, value_name = "FILE")]
    pub output: Option<PathBuf>,
    /// Worker threads for loading databases (0 = one per CPU).
    #[arg(long, short, value_name = "N")]
    pub jobs: Option<usize>,
    /// Run every stage except writing the output file.
    #[arg(long, global = true)]
    pub dry_run: bool,
    /// Print the run summary as JSON.
    #[arg(long, global = true)]
    pub json: bool,
    /// Trace pipeline stages on stderr.
    #[arg(long, short, global = true, conflicts_with = "quiet")]
    pub verbose: bool,
    /// Only print warnings and errors.
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a .clangd file from one environment's project metadata
    Clangd {
        /// Read metadata JSON from FILE instead of running `pio project metadata`
        #[arg(long, value_name = "FILE")]
        metadata: Option<PathBuf>,
        /// Drop this compiler flag too (repeatable)
        #[arg(long = "skip", value_name = "FLAG", allow_hyphen_values = true)]
        skip: Vec<String>,
    },
}
