//! Auto-merge enablement and merge polling

use std::thread;
use std::time::{Duration, Instant};

use path_sync_forge::{CheckRun, PrState, ReviewHost};

use crate::config::AutoMergeConfig;
use crate::pr::PrRef;

/// Where a destination's PR ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    pub dest_name: String,
    pub pr_url: String,
    pub branch: String,
    pub state: PrState,
    /// Check runs fetched after a close or timeout; empty when merged
    pub checks: Vec<CheckRun>,
}

impl MergeResult {
    pub fn failed_checks(&self) -> Vec<&str> {
        self.checks
            .iter()
            .filter(|c| c.is_failed())
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn pending_checks(&self) -> Vec<&str> {
        self.checks
            .iter()
            .filter(|c| c.is_pending())
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// Poll the PR state until it is merged, closed, or `timeout_seconds`
/// elapse. Closed and timed-out PRs carry their check runs.
///
/// Lookup failures are logged and treated as "still open".
pub fn wait_for_merge(host: &dyn ReviewHost, pr: &PrRef, config: &AutoMergeConfig) -> MergeResult {
    let reference = pr.reference();
    let pr_url = match host.pr_url(&pr.repo_path, reference) {
        Ok(Some(url)) => url,
        Ok(None) => reference.to_string(),
        Err(e) => {
            tracing::warn!(dest = %pr.dest_name, error = %e, "Could not look up PR URL");
            reference.to_string()
        }
    };
    let interval = Duration::from_secs(config.poll_interval_seconds);
    let deadline = Instant::now() + Duration::from_secs(config.timeout_seconds);

    let mut state = PrState::Open;
    while Instant::now() < deadline {
        state = match host.pr_state(&pr.repo_path, reference) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(dest = %pr.dest_name, error = %e, "Could not read PR state");
                PrState::Open
            }
        };
        match state {
            PrState::Merged => {
                tracing::info!(dest = %pr.dest_name, url = %pr_url, "PR merged");
                return MergeResult {
                    dest_name: pr.dest_name.clone(),
                    pr_url,
                    branch: pr.branch.clone(),
                    state,
                    checks: Vec::new(),
                };
            }
            PrState::Closed => break,
            PrState::Open => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                thread::sleep(interval.min(remaining));
            }
        }
    }

    let checks = host
        .pr_checks(&pr.repo_path, reference)
        .unwrap_or_else(|e| {
            tracing::warn!(dest = %pr.dest_name, error = %e, "Could not read PR checks");
            Vec::new()
        });
    tracing::warn!(dest = %pr.dest_name, url = %pr_url, state = %state, "PR not merged");
    MergeResult {
        dest_name: pr.dest_name.clone(),
        pr_url,
        branch: pr.branch.clone(),
        state,
        checks,
    }
}

/// Enable auto-merge on every open PR, then poll each one in turn unless
/// `no_wait` is set. PRs that are already merged are neither enabled nor
/// polled. Enable failures are logged and do not stop polling.
pub fn handle_auto_merge(
    host: &dyn ReviewHost,
    prs: &[PrRef],
    config: &AutoMergeConfig,
    no_wait: bool,
) -> Vec<MergeResult> {
    let merged: Vec<bool> = prs.iter().map(|pr| is_merged(host, pr)).collect();
    for (pr, _) in prs.iter().zip(&merged).filter(|(_, merged)| !**merged) {
        if let Err(e) = host.enable_auto_merge(
            &pr.repo_path,
            pr.reference(),
            config.method,
            config.delete_branch,
        ) {
            tracing::warn!(dest = %pr.dest_name, error = %e, "Failed to enable auto-merge");
        } else {
            tracing::info!(dest = %pr.dest_name, method = %config.method, "Auto-merge enabled");
        }
    }
    if no_wait {
        return Vec::new();
    }
    prs.iter()
        .zip(merged)
        .map(|(pr, merged)| {
            if merged {
                MergeResult {
                    dest_name: pr.dest_name.clone(),
                    pr_url: pr.reference().to_string(),
                    branch: pr.branch.clone(),
                    state: PrState::Merged,
                    checks: Vec::new(),
                }
            } else {
                wait_for_merge(host, pr, config)
            }
        })
        .collect()
}

fn is_merged(host: &dyn ReviewHost, pr: &PrRef) -> bool {
    match host.pr_state(&pr.repo_path, pr.reference()) {
        Ok(PrState::Merged) => {
            tracing::info!(dest = %pr.dest_name, "Already merged");
            true
        }
        Ok(_) => false,
        Err(e) => {
            tracing::warn!(dest = %pr.dest_name, error = %e, "Could not read PR state");
            false
        }
    }
}

/// Plain-text table of merge outcomes.
pub fn format_summary(results: &[MergeResult]) -> String {
    let rows: Vec<[String; 3]> = results
        .iter()
        .map(|r| {
            let failed = r.failed_checks();
            [
                r.dest_name.clone(),
                r.state.to_string(),
                if failed.is_empty() {
                    "-".to_string()
                } else {
                    failed.join(", ")
                },
            ]
        })
        .collect();

    let header = ["Repo", "State", "Failed Checks"];
    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let line = |cells: [&str; 3]| {
        format!(
            "{:<w0$} | {:<w1$} | {}",
            cells[0],
            cells[1],
            cells[2],
            w0 = widths[0],
            w1 = widths[1]
        )
    };
    let mut out = vec![
        line(header),
        format!("{}-+-{}-+-{}", "-".repeat(widths[0]), "-".repeat(widths[1]), "-".repeat(widths[2])),
    ];
    out.extend(rows.iter().map(|r| line([&r[0], &r[1], &r[2]])));
    out.join("\n")
}
