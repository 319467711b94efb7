//! The `copy` run: sync a source configuration into each destination
//!
//! Per destination: open or clone the working tree, consult the idempotency
//! gate, prepare the sync branch, sync files and clean up orphans, commit,
//! verify, push and open or refresh the PR. After all destinations,
//! auto-merge is enabled and PRs are polled.

use std::path::{Path, PathBuf};

use path_sync_forge::{PrRequest, ReviewHost};
use path_sync_git::{CommitStamp, GitRepo, Vcs};

use crate::automerge::{MergeResult, format_summary, handle_auto_merge};
use crate::config::{Destination, OnFail, SrcConfig};
use crate::gate::pr_already_synced;
use crate::log::SyncLog;
use crate::pr::{BodyContext, PrRef, close_stale_pr, format_title, push_and_pr, render_body};
use crate::prompt::{AutoConfirm, Confirm};
use crate::sync::{SyncOptions, sync_paths};
use crate::verify::{VerifyOptions, VerifyOutcome, VerifyStatus, log_verify_summary, run_verify_steps};
use crate::workspace::{checkout_or_create, ensure_repo, reset_branch_from_default, resolve_dest_root};
use crate::{Error, Result};

/// Flags for a copy run
#[derive(Debug, Clone, Default)]
pub struct CopyOptions {
    pub dry_run: bool,
    pub force_overwrite: bool,
    /// Leave the destination on whatever branch it is on
    pub no_checkout: bool,
    /// Recreate the sync branch from the freshly fetched default branch
    pub checkout_from_default: bool,
    pub skip_commit: bool,
    pub no_prompt: bool,
    pub no_pr: bool,
    pub skip_orphan_cleanup: bool,
    pub skip_verify: bool,
    pub no_wait: bool,
    pub no_auto_merge: bool,
    /// Continue with the next destination after a failure
    pub keep_going: bool,
    pub pr_title: Option<String>,
    pub labels: Option<Vec<String>>,
    pub reviewers: Option<Vec<String>>,
    pub assignees: Option<Vec<String>>,
    /// Only these destinations; all when empty
    pub dest_filter: Vec<String>,
    /// Parent directory for destination working trees
    pub work_dir: Option<PathBuf>,
}

impl CopyOptions {
    fn gate_enabled(&self, config: &SrcConfig) -> bool {
        !(self.skip_commit || self.dry_run || self.no_pr || config.force_resync)
    }

    fn closes_stale_prs(&self, config: &SrcConfig) -> bool {
        !(config.keep_pr_on_no_changes || self.dry_run || self.skip_commit || self.no_pr)
    }
}

/// A destination that failed
#[derive(Debug)]
pub struct DestFailure {
    pub dest: String,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct CopyReport {
    /// File writes plus orphan deletions across all destinations
    pub total_changes: usize,
    pub failures: Vec<DestFailure>,
    pub prs: Vec<PrRef>,
    pub merge_results: Vec<MergeResult>,
}

impl CopyReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

enum DestOutcome {
    /// Open PR already covers the source commit
    AlreadySynced,
    Synced { changes: usize, pr: Option<PrRef> },
}

struct CopyRun<'a> {
    config: &'a SrcConfig,
    src_root: &'a Path,
    src: CommitStamp,
    src_repo_url: String,
    host: &'a dyn ReviewHost,
    confirm: &'a dyn Confirm,
    opts: &'a CopyOptions,
}

/// Run a copy for every selected destination.
///
/// Configuration problems and unknown destination names fail before any
/// destination is touched. Per-destination failures are collected in the
/// report; without `keep_going` the first one stops the loop.
pub fn run_copy(
    config: &SrcConfig,
    src_root: &Path,
    host: &dyn ReviewHost,
    confirm: &dyn Confirm,
    opts: &CopyOptions,
) -> Result<CopyReport> {
    config.validate()?;
    let destinations = select_destinations(config, &opts.dest_filter)?;

    let src_repo = GitRepo::discover(src_root)?;
    let src = src_repo.head_commit()?;
    let src_repo_url = if config.src_repo_url.is_empty() {
        src_repo.remote_url(&config.git_remote)?.unwrap_or_default()
    } else {
        config.src_repo_url.clone()
    };
    tracing::info!(config = %config.name, sha = %src.short_sha(), "Starting copy");

    let confirm: &dyn Confirm = if opts.no_prompt { &AutoConfirm } else { confirm };
    let run = CopyRun {
        config,
        src_root,
        src,
        src_repo_url,
        host,
        confirm,
        opts,
    };

    let mut report = CopyReport::default();
    for dest in destinations {
        let mut log = SyncLog::new(&dest.name);
        match run.sync_destination(dest, &mut log) {
            Ok(DestOutcome::AlreadySynced) => {}
            Ok(DestOutcome::Synced { changes, pr }) => {
                report.total_changes += changes;
                report.prs.extend(pr);
            }
            Err(error) => {
                log.error(format!("Failed: {error}"));
                report.failures.push(DestFailure {
                    dest: dest.name.clone(),
                    error,
                });
                if !opts.keep_going {
                    break;
                }
            }
        }
    }

    if let Some(auto_merge) = &config.auto_merge
        && !(opts.no_auto_merge || opts.dry_run || opts.no_pr)
        && !report.prs.is_empty()
    {
        report.merge_results = handle_auto_merge(host, &report.prs, auto_merge, opts.no_wait);
        if !report.merge_results.is_empty() {
            tracing::info!("Auto-merge summary:\n{}", format_summary(&report.merge_results));
        }
    }
    Ok(report)
}

fn select_destinations<'a>(config: &'a SrcConfig, filter: &[String]) -> Result<Vec<&'a Destination>> {
    if filter.is_empty() {
        return Ok(config.destinations.iter().collect());
    }
    filter.iter().map(|name| config.find_destination(name)).collect()
}

impl CopyRun<'_> {
    fn sync_destination(&self, dest: &Destination, log: &mut SyncLog) -> Result<DestOutcome> {
        let (config, opts) = (self.config, self.opts);
        let dest_root = resolve_dest_root(dest, self.src_root, opts.work_dir.as_deref());
        let repo = ensure_repo(dest, &dest_root, opts.dry_run, self.confirm)?;
        let branch = dest.resolved_copy_branch(&config.name);
        let remote = config.git_remote.as_str();

        if opts.gate_enabled(config) {
            let body = self.host.open_pr_body(repo.root(), &branch)?;
            if let Some(metadata) = pr_already_synced(body.as_deref(), self.src.timestamp) {
                log.info(format!(
                    "Skipping: open PR already synced at {} ({})",
                    metadata.sha, metadata.ts
                ));
                return Ok(DestOutcome::AlreadySynced);
            }
        }

        if opts.no_checkout {
            log.debug("Leaving current branch checked out");
        } else if opts.dry_run {
            log.info(format!("[DRY RUN] Would check out {branch}"));
        } else if !self.confirm.confirm(&format!("Switch {} to {branch}?", dest.name)) {
            log.info("Staying on the current branch");
        } else if opts.checkout_from_default {
            reset_branch_from_default(&repo, remote, &dest.default_branch, &branch)?;
        } else {
            checkout_or_create(&repo, &branch)?;
        }

        let sync_opts = SyncOptions {
            dry_run: opts.dry_run,
            force_overwrite: opts.force_overwrite,
            skip_orphan_cleanup: opts.skip_orphan_cleanup,
        };
        let result = sync_paths(config, dest, self.src_root, repo.root(), sync_opts, log)?;
        let changes = result.total();

        if changes == 0 {
            log.info("No changes");
            if opts.closes_stale_prs(config) {
                close_stale_pr(self.host, repo.root(), &branch, log)?;
            }
            return Ok(DestOutcome::Synced { changes, pr: None });
        }
        log.info(format!(
            "{} files written, {} orphans deleted",
            result.content_changes, result.orphans_deleted
        ));

        let commits = !(opts.dry_run || opts.skip_commit);
        if commits && self.confirm.confirm(&format!("Commit changes to {}?", dest.name)) {
            repo.stage_all()?;
            repo.commit(&format!("chore: sync {} from {}", config.name, self.src.short_sha()))?;
        }

        let verify = if opts.skip_verify {
            VerifyOutcome::passed()
        } else {
            self.verify(&repo, dest, log)?
        };
        if verify.status == VerifyStatus::Skipped {
            log.warn("Verification skipped this destination, no PR");
            return Ok(DestOutcome::Synced { changes, pr: None });
        }
        if !commits {
            log.info("Skipping push/PR (--skip-commit or --dry-run)");
            return Ok(DestOutcome::Synced { changes, pr: None });
        }

        if repo.is_dirty()? {
            if !self.confirm.confirm(&format!("Commit remaining changes to {}?", dest.name)) {
                log.info("Leaving changes uncommitted, no push");
                return Ok(DestOutcome::Synced { changes, pr: None });
            }
            repo.stage_all()?;
            if repo
                .commit(&format!("chore: post-sync changes for {}", config.name))?
                .is_some()
            {
                log.info("Committed post-sync changes");
            }
        }

        if opts.no_pr {
            return Ok(DestOutcome::Synced { changes, pr: None });
        }
        if !self.confirm.confirm(&format!("Push {} to {remote}?", dest.name)) {
            log.info("Push declined");
            return Ok(DestOutcome::Synced { changes, pr: None });
        }
        if !self.confirm.confirm(&format!("Create PR for {}?", dest.name)) {
            repo.push(remote, &branch, true)?;
            log.info(format!("Pushed {branch} without a PR"));
            return Ok(DestOutcome::Synced { changes, pr: None });
        }
        let request = self.pr_request(dest, &branch, log, &verify);
        let pr = push_and_pr(&repo, self.host, remote, &dest.name, &request, log)?;
        Ok(DestOutcome::Synced { changes, pr })
    }

    fn verify(&self, repo: &GitRepo, dest: &Destination, log: &mut SyncLog) -> Result<VerifyOutcome> {
        let verify = dest.resolve_verify(self.config.verify.as_ref());
        if verify.steps.is_empty() {
            return Ok(VerifyOutcome::passed());
        }
        let verify_opts = VerifyOptions {
            dry_run: self.opts.dry_run,
            skip_commit: self.opts.skip_commit,
        };
        let outcome = run_verify_steps(repo, &verify, OnFail::Warn, verify_opts, log)?;
        log_verify_summary(&outcome, log);
        if outcome.status == VerifyStatus::Failed {
            return Err(Error::VerificationFailed {
                dest: dest.name.clone(),
            });
        }
        Ok(outcome)
    }

    fn pr_request(
        &self,
        dest: &Destination,
        branch: &str,
        log: &SyncLog,
        verify: &VerifyOutcome,
    ) -> PrRequest {
        let defaults = &self.config.pr_defaults;
        let opts = self.opts;
        let title = opts.pr_title.as_deref().unwrap_or(&defaults.title);
        let sync_log = log.contents();
        let ctx = BodyContext {
            src_repo_url: &self.src_repo_url,
            src: &self.src,
            dest_name: &dest.name,
            sync_log: &sync_log,
        };
        PrRequest {
            head: branch.to_string(),
            title: format_title(title, &self.config.name, &dest.name),
            body: render_body(defaults, ctx, verify),
            labels: opts.labels.clone().unwrap_or_else(|| defaults.labels.clone()),
            reviewers: opts
                .reviewers
                .clone()
                .unwrap_or_else(|| defaults.reviewers.clone()),
            assignees: opts
                .assignees
                .clone()
                .unwrap_or_else(|| defaults.assignees.clone()),
        }
    }
}
