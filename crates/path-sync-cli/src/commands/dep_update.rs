//! `path-sync dep-update`

use std::path::Path;

use colored::Colorize;
use path_sync_core::{DepConfig, DepStatus, DepUpdateOptions, dep_config_path, run_dep_update};
use path_sync_forge::GhCli;

use super::Outcome;
use crate::cli::DepUpdateArgs;
use crate::error::Result;
use crate::interactive::confirmer;

pub fn run_dep_update_command(src_root: &Path, args: &DepUpdateArgs) -> Result<Outcome> {
    let config = DepConfig::load(&dep_config_path(src_root, &args.name))?;
    let opts = DepUpdateOptions {
        dry_run: args.dry_run,
        skip_verify: args.skip_verify,
        no_pr: args.no_pr,
        no_wait: args.no_wait,
        dest_filter: args.dest.clone(),
        work_dir: args.work_dir.clone(),
    };
    let host = GhCli::new();
    let confirm = confirmer(args.no_prompt);

    let report = run_dep_update(&config, src_root, &host, confirm.as_ref(), &opts)?;

    for result in &report.results {
        let status = result.status.to_string();
        let status = match result.status {
            DepStatus::Passed => status.green(),
            DepStatus::Warn | DepStatus::Skipped => status.yellow(),
            DepStatus::NoChanges => status.dimmed(),
            DepStatus::Failed => status.red(),
        };
        println!("   {} {}", result.dest.name.bold(), status);
    }
    for pr in report.prs.iter().filter_map(|pr| pr.url.as_ref()) {
        println!("   {} {}", "+".green(), pr.cyan());
    }
    Ok(Outcome::from_count(report.changed()))
}
