//! path-sync CLI
//!
//! Copies files from a source repository into destination repositories and
//! opens pull requests for the result.

mod cli;
mod commands;
mod error;
mod interactive;

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::Outcome;
use error::Result;

/// Exit code for any error, regardless of `--detailed-exit-code`.
const ERROR_EXIT_CODE: i32 = 2;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let detailed = cli.detailed_exit_code;
    let code = match run(cli) {
        Ok(outcome) => outcome.exit_code(detailed),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            ERROR_EXIT_CODE
        }
    };
    std::process::exit(code);
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!("Verbose mode enabled");
}

fn run(cli: Cli) -> Result<Outcome> {
    let root = src_root(cli.src_root)?;
    match cli.command {
        Commands::Copy(args) => commands::run_copy_command(&root, &args),
        Commands::DepUpdate(args) => commands::run_dep_update_command(&root, &args),
        Commands::ValidateNoChanges(args) => commands::run_validate_command(&root, &args),
    }
}

fn src_root(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => {
            let cwd = std::env::current_dir()?;
            Ok(path_sync_core::find_repo_root(&cwd)?)
        }
    }
}
