//! Verification pipeline
//!
//! Steps run in order inside the destination working tree. A failing step
//! resolves its policy (step override, then pipeline default, then the
//! caller's fallback):
//!
//! * [`OnFail::Fail`] stops with [`VerifyStatus::Failed`]
//! * [`OnFail::Skip`] stops with [`VerifyStatus::Skipped`]
//! * [`OnFail::Warn`] records the failure and moves on
//!
//! A step whose `workdir` is missing counts as a failed step. A passing step
//! with a `commit` entry stages its paths and commits them.

use std::fmt;

use path_sync_git::Vcs;

use crate::Result;
use crate::cmd::run_command;
use crate::config::{CommitConfig, OnFail, VerifyConfig};
use crate::log::SyncLog;

/// Recorded for a step whose working directory does not exist.
pub const MISSING_WORKDIR_EXIT_CODE: i32 = -1;

/// Final state of a verification run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyStatus {
    Passed,
    Warn,
    Skipped,
    Failed,
}

impl fmt::Display for VerifyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Passed => "passed",
            Self::Warn => "warn",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One failed step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub step: String,
    pub exit_code: i32,
    pub on_fail: OnFail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyOutcome {
    pub status: VerifyStatus,
    pub failures: Vec<StepFailure>,
}

impl VerifyOutcome {
    pub fn passed() -> Self {
        Self {
            status: VerifyStatus::Passed,
            failures: Vec::new(),
        }
    }

    /// Failures recorded under the `warn` policy
    pub fn warnings(&self) -> impl Iterator<Item = &StepFailure> {
        self.failures.iter().filter(|f| f.on_fail == OnFail::Warn)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VerifyOptions {
    /// Log the steps without running them
    pub dry_run: bool,
    /// Run steps but ignore their `commit` entries
    pub skip_commit: bool,
}

pub fn run_verify_steps(
    vcs: &dyn Vcs,
    verify: &VerifyConfig,
    fallback: OnFail,
    opts: VerifyOptions,
    log: &mut SyncLog,
) -> Result<VerifyOutcome> {
    let mut outcome = VerifyOutcome::passed();

    for step in &verify.steps {
        if opts.dry_run {
            log.info(format!("[DRY RUN] Would run: {}", step.run));
            continue;
        }
        let cwd = match &step.workdir {
            Some(dir) => vcs.root().join(dir),
            None => vcs.root().to_path_buf(),
        };
        let exit_code = if cwd.is_dir() {
            let output = run_command(&step.run, &cwd, "verify", log)?;
            if output.success() {
                if let Some(commit) = &step.commit
                    && !opts.skip_commit
                {
                    commit_step(vcs, commit, log)?;
                }
                continue;
            }
            output.exit_code
        } else {
            log.error(format!("Workdir not found: {}", cwd.display()));
            MISSING_WORKDIR_EXIT_CODE
        };

        let on_fail = verify.policy_for(step, fallback);
        outcome.failures.push(StepFailure {
            step: step.run.clone(),
            exit_code,
            on_fail,
        });
        match on_fail {
            OnFail::Fail => {
                outcome.status = VerifyStatus::Failed;
                return Ok(outcome);
            }
            OnFail::Skip => {
                outcome.status = VerifyStatus::Skipped;
                return Ok(outcome);
            }
            OnFail::Warn => outcome.status = VerifyStatus::Warn,
        }
    }
    Ok(outcome)
}

fn commit_step(vcs: &dyn Vcs, commit: &CommitConfig, log: &mut SyncLog) -> Result<()> {
    vcs.stage_paths(&commit.add_paths)?;
    if let Some(sha) = vcs.commit(&commit.message)? {
        log.info(format!("Committed '{}' ({})", commit.message, &sha[..sha.len().min(8)]));
    }
    Ok(())
}

/// Log one line per failure and the final status.
pub fn log_verify_summary(outcome: &VerifyOutcome, log: &mut SyncLog) {
    for failure in &outcome.failures {
        log.warn(format!(
            "Verification step `{}` failed (exit code {}, strategy: {})",
            failure.step, failure.exit_code, failure.on_fail
        ));
    }
    log.info(format!("Verification {}", outcome.status));
}
