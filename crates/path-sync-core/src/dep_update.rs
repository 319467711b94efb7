//! The `dep-update` run: execute update commands in each destination and
//! open PRs for the ones that changed.

use std::fmt;
use std::path::{Path, PathBuf};

use path_sync_forge::{PrRequest, ReviewHost};
use path_sync_git::{GitRepo, Vcs};

use crate::automerge::{MergeResult, handle_auto_merge};
use crate::cmd::run_command;
use crate::config::{AutoMergeConfig, DepConfig, Destination, OnFail};
use crate::log::SyncLog;
use crate::pr::{PrRef, close_stale_pr, push_and_pr, truncate_body};
use crate::prompt::Confirm;
use crate::verify::{VerifyOptions, VerifyOutcome, VerifyStatus, log_verify_summary, run_verify_steps};
use crate::workspace::{ensure_repo, reset_branch_from_default, resolve_dest_root};
use crate::{Error, Result};

/// Remote that destination branches are pushed to.
const REMOTE: &str = "origin";

/// Per-destination result of an update run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepStatus {
    Passed,
    Warn,
    /// An update command or a `skip` verification step failed
    Skipped,
    NoChanges,
    Failed,
}

impl DepStatus {
    /// Whether a PR should be pushed for this status
    pub fn wants_pr(self) -> bool {
        matches!(self, Self::Passed | Self::Warn)
    }
}

impl fmt::Display for DepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Passed => "passed",
            Self::Warn => "warn",
            Self::Skipped => "skipped",
            Self::NoChanges => "no changes",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

impl From<VerifyStatus> for DepStatus {
    fn from(status: VerifyStatus) -> Self {
        match status {
            VerifyStatus::Passed => Self::Passed,
            VerifyStatus::Warn => Self::Warn,
            VerifyStatus::Skipped => Self::Skipped,
            VerifyStatus::Failed => Self::Failed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DepRepoResult {
    pub dest: Destination,
    pub repo_path: PathBuf,
    pub status: DepStatus,
    /// Combined output of the update commands
    pub command_output: String,
    pub verify: VerifyOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct DepUpdateOptions {
    pub dry_run: bool,
    pub skip_verify: bool,
    pub no_pr: bool,
    pub no_wait: bool,
    /// Only these destinations; all when empty
    pub dest_filter: Vec<String>,
    pub work_dir: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct DepUpdateReport {
    pub results: Vec<DepRepoResult>,
    pub prs: Vec<PrRef>,
    pub merge_results: Vec<MergeResult>,
}

impl DepUpdateReport {
    /// Destinations that produced a PR-worthy change
    pub fn changed(&self) -> usize {
        self.results.iter().filter(|r| r.status.wants_pr()).count()
    }
}

/// Render the PR description for one updated destination.
pub fn render_dep_body(result: &DepRepoResult) -> String {
    let mut body = String::from("Automated dependency update.");
    if !result.command_output.trim().is_empty() {
        body.push_str("\n\n## Command Output\n\n```\n");
        body.push_str(result.command_output.trim_end());
        body.push_str("\n```");
    }
    if !result.verify.failures.is_empty() {
        body.push_str("\n\n## Verification Issues\n");
        for failure in &result.verify.failures {
            body.push_str(&format!(
                "\n- `{}` failed (exit code {}, strategy: {})",
                failure.step, failure.exit_code, failure.on_fail
            ));
        }
    }
    truncate_body(&body)
}

/// Run every update for the selected destinations, then push PRs.
///
/// # Errors
///
/// Any destination ending in [`DepStatus::Failed`] aborts the run before a
/// single branch is pushed.
pub fn run_dep_update(
    config: &DepConfig,
    src_root: &Path,
    host: &dyn ReviewHost,
    confirm: &dyn Confirm,
    opts: &DepUpdateOptions,
) -> Result<DepUpdateReport> {
    let mut destinations = config.load_destinations(src_root)?;
    if !opts.dest_filter.is_empty() {
        for name in &opts.dest_filter {
            if !destinations.iter().any(|d| &d.name == name) {
                return Err(Error::DestinationNotFound { name: name.clone() });
            }
        }
        destinations.retain(|d| opts.dest_filter.contains(&d.name));
    }

    let mut report = DepUpdateReport::default();
    for dest in destinations {
        let mut log = SyncLog::new(&dest.name);
        let result = update_destination(config, dest, src_root, host, confirm, opts, &mut log)?;
        log.info(format!("Status: {}", result.status));
        report.results.push(result);
    }

    if let Some(failed) = report.results.iter().find(|r| r.status == DepStatus::Failed) {
        return Err(Error::VerificationFailed {
            dest: failed.dest.name.clone(),
        });
    }
    if opts.dry_run || opts.no_pr {
        return Ok(report);
    }

    for result in report.results.iter().filter(|r| r.status.wants_pr()) {
        let repo = GitRepo::open(&result.repo_path)?;
        let mut log = SyncLog::new(&result.dest.name);
        let request = PrRequest {
            head: config.pr.branch.clone(),
            title: config.pr.title.clone(),
            body: render_dep_body(result),
            labels: config.pr.labels.clone(),
            reviewers: config.pr.reviewers.clone(),
            assignees: config.pr.assignees.clone(),
        };
        if let Some(pr) = push_and_pr(&repo, host, REMOTE, &result.dest.name, &request, &mut log)? {
            report.prs.push(pr);
        }
    }

    if config.pr.auto_merge && !report.prs.is_empty() {
        report.merge_results =
            handle_auto_merge(host, &report.prs, &AutoMergeConfig::default(), opts.no_wait);
    }
    Ok(report)
}

fn update_destination(
    config: &DepConfig,
    dest: Destination,
    src_root: &Path,
    host: &dyn ReviewHost,
    confirm: &dyn Confirm,
    opts: &DepUpdateOptions,
    log: &mut SyncLog,
) -> Result<DepRepoResult> {
    let dest_root = resolve_dest_root(&dest, src_root, opts.work_dir.as_deref());
    let repo = ensure_repo(&dest, &dest_root, opts.dry_run, confirm)?;
    let mut result = DepRepoResult {
        repo_path: repo.root().to_path_buf(),
        dest,
        status: DepStatus::Passed,
        command_output: String::new(),
        verify: VerifyOutcome::passed(),
    };

    if opts.dry_run {
        for update in &config.updates {
            log.info(format!("[DRY RUN] Would run in {}: {}", update.workdir, update.command));
        }
        result.status = DepStatus::NoChanges;
        return Ok(result);
    }

    reset_branch_from_default(
        &repo,
        REMOTE,
        &result.dest.default_branch,
        &config.pr.branch,
    )?;

    let mut output = Vec::new();
    for update in &config.updates {
        let cwd = repo.root().join(&update.workdir);
        let out = run_command(&update.command, &cwd, "update", log)?;
        output.push(out.text());
        if !out.success() {
            log.warn(format!("Update command failed, skipping: {}", update.command));
            result.status = DepStatus::Skipped;
            result.command_output = output.join("\n");
            return Ok(result);
        }
    }
    result.command_output = output.join("\n");

    if !repo.is_dirty()? {
        log.info("No changes");
        result.status = DepStatus::NoChanges;
        if !config.keep_pr_on_no_changes {
            close_stale_pr(host, repo.root(), &config.pr.branch, log)?;
        }
        return Ok(result);
    }
    repo.stage_all()?;
    repo.commit(&config.pr.title)?;

    if !opts.skip_verify && !config.verify.steps.is_empty() {
        result.verify =
            run_verify_steps(&repo, &config.verify, OnFail::Skip, VerifyOptions::default(), log)?;
        log_verify_summary(&result.verify, log);
        result.status = result.verify.status.into();
    }
    Ok(result)
}
