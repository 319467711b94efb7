//! `path-sync copy`

use std::path::Path;

use colored::Colorize;
use path_sync_core::{CopyOptions, CopyReport, SrcConfig, run_copy, src_config_path};
use path_sync_forge::GhCli;

use super::Outcome;
use crate::cli::CopyArgs;
use crate::error::{CliError, Result};
use crate::interactive::confirmer;

impl From<&CopyArgs> for CopyOptions {
    fn from(args: &CopyArgs) -> Self {
        Self {
            dry_run: args.dry_run,
            force_overwrite: args.force_overwrite,
            no_checkout: args.no_checkout,
            checkout_from_default: args.checkout_from_default,
            skip_commit: args.skip_commit,
            no_prompt: args.no_prompt,
            no_pr: args.no_pr,
            skip_orphan_cleanup: args.skip_orphan_cleanup,
            skip_verify: args.skip_verify,
            no_wait: args.no_wait,
            no_auto_merge: args.no_auto_merge,
            keep_going: args.keep_going,
            pr_title: args.pr_title.clone(),
            labels: args.labels.clone(),
            reviewers: args.reviewers.clone(),
            assignees: args.assignees.clone(),
            dest_filter: args.dest.clone(),
            work_dir: args.work_dir.clone(),
        }
    }
}

pub fn run_copy_command(src_root: &Path, args: &CopyArgs) -> Result<Outcome> {
    let config = SrcConfig::load(&src_config_path(src_root, &args.name))?;
    let opts = CopyOptions::from(args);
    let host = GhCli::new();
    let confirm = confirmer(args.no_prompt);

    let report = run_copy(&config, src_root, &host, confirm.as_ref(), &opts)?;
    print_report(&report, args.dry_run);

    if !report.is_success() {
        return Err(CliError::user(format!(
            "{} destination(s) failed",
            report.failures.len()
        )));
    }
    Ok(Outcome::from_count(report.total_changes))
}

fn print_report(report: &CopyReport, dry_run: bool) {
    let prefix = if dry_run { "[DRY RUN] " } else { "" };
    if report.total_changes == 0 {
        println!("{} {prefix}No changes", "OK".green().bold());
    } else {
        println!(
            "{} {prefix}{} file change(s)",
            "=>".blue().bold(),
            report.total_changes
        );
    }
    for pr in &report.prs {
        match &pr.url {
            Some(url) => println!("   {} {}: {}", "+".green(), pr.dest_name, url.cyan()),
            None => println!("   {} {}: {}", "+".green(), pr.dest_name, pr.branch),
        }
    }
    for failure in &report.failures {
        println!(
            "   {} {}: {}",
            "!".red(),
            failure.dest.bold(),
            failure.error
        );
    }
}
