//! `path-sync validate-no-changes`

use std::path::Path;

use colored::Colorize;
use path_sync_core::{ValidateOutcome, parse_skip_sections, validate_no_changes};
use path_sync_git::GitRepo;

use super::Outcome;
use crate::cli::ValidateArgs;
use crate::error::{CliError, Result};

pub fn run_validate_command(root: &Path, args: &ValidateArgs) -> Result<Outcome> {
    let skip = parse_skip_sections(&args.skip_sections)?;
    let repo = GitRepo::discover(root)?;

    match validate_no_changes(&repo, &args.remote, &args.branch, &skip)? {
        ValidateOutcome::Skipped { reason } => {
            println!("{} Skipping validation: {reason}", "=>".blue().bold());
            Ok(Outcome::NoChanges)
        }
        ValidateOutcome::Checked { violations } if violations.is_empty() => {
            println!("{} No unauthorized changes", "OK".green().bold());
            Ok(Outcome::NoChanges)
        }
        ValidateOutcome::Checked { violations } => {
            println!("{} Synced content was modified:", "CHANGED".red().bold());
            for violation in &violations {
                println!("   {} {}", "!".red(), violation);
            }
            Err(CliError::user(format!(
                "Found {} unauthorized change(s)",
                violations.len()
            )))
        }
    }
}
