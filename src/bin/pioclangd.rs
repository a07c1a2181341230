use clap::Parser;
use colored::Colorize;
use pioclangd_core::cli::{dispatch, Cli};
use pioclangd_core::exit::PioClangdExit;

fn main() -> PioClangdExit {
    let cli = Cli::parse();

    match dispatch::execute(&cli) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            PioClangdExit::Error
        }
    }
}
