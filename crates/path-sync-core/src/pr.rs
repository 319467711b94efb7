//! PR body rendering and the push / create-or-update flow

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use path_sync_forge::{CreateOutcome, PrRequest, ReviewHost};
use path_sync_git::{CommitStamp, Vcs};
use regex::{Captures, Regex};

use crate::Result;
use crate::config::PrDefaults;
use crate::log::SyncLog;
use crate::verify::VerifyOutcome;

/// Longest body the hosting service accepts.
pub const MAX_BODY_CHARS: usize = 65536;

pub const TRUNCATION_NOTE: &str = "... (truncated, output too long for PR body)";

/// Comment left on a PR closed because the destination needs no changes.
pub const NO_CHANGES_COMMENT: &str =
    "Closing: source and destination are in sync, no changes needed";

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("valid placeholder regex"));

/// Identifies a PR opened (or refreshed) for a destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrRef {
    pub dest_name: String,
    /// Destination working tree the `gh` calls run in
    pub repo_path: PathBuf,
    pub branch: String,
    pub url: Option<String>,
}

impl PrRef {
    /// URL when known, otherwise the head branch
    pub fn reference(&self) -> &str {
        self.url.as_deref().unwrap_or(&self.branch)
    }
}

/// Replace `{key}` placeholders. Unknown keys are left untouched.
pub fn render_template(template: &str, vars: &BTreeMap<&str, String>) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            vars.get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Last path segment of a repository URL, without `.git`.
pub fn repo_name_from_url(url: &str) -> &str {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed);
    last.strip_suffix(".git").unwrap_or(last)
}

pub fn format_title(template: &str, config_name: &str, dest_name: &str) -> String {
    let vars = BTreeMap::from([("name", config_name.to_string()), ("dest_name", dest_name.to_string())]);
    render_template(template, &vars)
}

/// Inputs for a sync PR description
#[derive(Debug, Clone, Copy)]
pub struct BodyContext<'a> {
    pub src_repo_url: &'a str,
    pub src: &'a CommitStamp,
    pub dest_name: &'a str,
    pub sync_log: &'a str,
}

/// Render the configured template with its suffix, append verification
/// warnings, and cap the result at [`MAX_BODY_CHARS`].
pub fn render_body(defaults: &PrDefaults, ctx: BodyContext<'_>, verify: &VerifyOutcome) -> String {
    let vars = BTreeMap::from([
        ("src_repo_url", ctx.src_repo_url.to_string()),
        ("src_repo_name", repo_name_from_url(ctx.src_repo_url).to_string()),
        ("src_sha", ctx.src.sha.clone()),
        ("src_sha_short", ctx.src.short_sha().to_string()),
        ("src_commit_ts", ctx.src.timestamp_rfc3339()),
        ("sync_log", ctx.sync_log.to_string()),
        ("dest_name", ctx.dest_name.to_string()),
    ]);
    let mut body = render_template(&defaults.body_template, &vars);
    if !defaults.body_suffix.is_empty() {
        body.push_str("\n---\n");
        body.push_str(&defaults.body_suffix);
    }
    append_verify_warnings(&mut body, verify);
    truncate_body(&body)
}

pub fn append_verify_warnings(body: &mut String, verify: &VerifyOutcome) {
    let mut warnings = verify.warnings().peekable();
    if warnings.peek().is_none() {
        return;
    }
    body.push_str("\n\n---\n## Verification Warnings\n");
    for failure in warnings {
        body.push_str(&format!(
            "\n- `{}` failed (exit code {}, strategy: warn)",
            failure.step, failure.exit_code
        ));
    }
}

/// Keep the head of an oversized body, closing an unterminated code fence.
pub fn truncate_body(body: &str) -> String {
    if body.chars().count() <= MAX_BODY_CHARS {
        return body.to_string();
    }
    // Room for "\n```\n" and the note
    let budget = MAX_BODY_CHARS - TRUNCATION_NOTE.len() - 5;
    let cut = body.char_indices().nth(budget).map_or(body.len(), |(idx, _)| idx);
    let mut out = body[..cut].to_string();
    let fences = out
        .lines()
        .filter(|line| line.trim_start().starts_with("```"))
        .count();
    if fences % 2 == 1 {
        out.push_str("\n```");
    }
    out.push('\n');
    out.push_str(TRUNCATION_NOTE);
    out
}

/// Force-push the branch and create its PR, or refresh the body of the
/// existing one.
///
/// When the remote branch already matches HEAD nothing is pushed and only
/// the body of an open PR is updated. Returns `None` when there is no PR
/// to track afterwards.
pub fn push_and_pr(
    vcs: &dyn Vcs,
    host: &dyn ReviewHost,
    remote: &str,
    dest_name: &str,
    request: &PrRequest,
    log: &mut SyncLog,
) -> Result<Option<PrRef>> {
    let repo = vcs.root();
    let branch = request.head.as_str();

    if vcs.remote_branch_matches_head(remote, branch)? {
        log.info(format!("Remote branch {branch} already up to date, skipping push"));
        if !host.has_open_pr(repo, branch)? {
            return Ok(None);
        }
        host.update_pr_body(repo, branch, &request.body)?;
        log.info("Refreshed PR description");
        return Ok(Some(pr_ref(host, repo, dest_name, branch, None)));
    }

    vcs.push(remote, branch, true)?;
    log.info(format!("Pushed {branch} to {remote}"));

    let url = match host.create_pr(repo, request)? {
        CreateOutcome::Created { url } => {
            log.info(format!("Created PR: {url}"));
            Some(url)
        }
        CreateOutcome::AlreadyExists => {
            host.update_pr_body(repo, branch, &request.body)?;
            log.info("PR already exists, updated description");
            None
        }
    };
    Ok(Some(pr_ref(host, repo, dest_name, branch, url)))
}

fn pr_ref(
    host: &dyn ReviewHost,
    repo: &Path,
    dest_name: &str,
    branch: &str,
    url: Option<String>,
) -> PrRef {
    let url = url.or_else(|| match host.pr_url(repo, branch) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(dest = %dest_name, error = %e, "Could not look up PR URL");
            None
        }
    });
    PrRef {
        dest_name: dest_name.to_string(),
        repo_path: repo.to_path_buf(),
        branch: branch.to_string(),
        url,
    }
}

/// Close the open PR for `branch`, if any. Returns whether one was closed.
pub fn close_stale_pr(
    host: &dyn ReviewHost,
    repo: &Path,
    branch: &str,
    log: &mut SyncLog,
) -> Result<bool> {
    if !host.has_open_pr(repo, branch)? {
        return Ok(false);
    }
    host.close_pr(repo, branch, NO_CHANGES_COMMENT)?;
    log.info(format!("Closed stale PR for {branch}"));
    Ok(true)
}
