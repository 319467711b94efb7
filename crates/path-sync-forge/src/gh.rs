//! GitHub CLI backed [`ReviewHost`]

use std::path::Path;
use std::process::Command;

use serde::Deserialize;

use crate::checks::CheckRun;
use crate::host::{CreateOutcome, MergeMethod, PrRequest, PrState, ReviewHost};
use crate::{Error, Result};

/// Parsed reference to a hosted pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

/// Parse `https://github.com/{owner}/{repo}/pull/{number}`.
pub fn parse_pull_url(url: &str) -> Option<PullRef> {
    let url = url.split(['?', '#']).next().unwrap_or(url);
    let url = url.trim().trim_end_matches('/');
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let (_host, path) = rest.split_once('/')?;
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() >= 4 && segments[2] == "pull" {
        Some(PullRef {
            owner: segments[0].to_string(),
            repo: segments[1].to_string(),
            number: segments[3].parse().ok()?,
        })
    } else {
        None
    }
}

struct Output {
    success: bool,
    code: Option<i32>,
    stdout: String,
    stderr: String,
}

#[derive(Deserialize)]
struct ViewFields {
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Review host driven through the `gh` executable.
#[derive(Debug, Clone)]
pub struct GhCli {
    program: String,
}

impl Default for GhCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GhCli {
    pub fn new() -> Self {
        Self {
            program: "gh".to_string(),
        }
    }

    /// Use a different executable, e.g. a wrapper script.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, repo: &Path, args: &[&str]) -> Result<Output> {
        tracing::debug!(program = %self.program, args = ?args.first(), "Running review host command");
        let output = Command::new(&self.program)
            .args(args)
            .current_dir(repo)
            .output()
            .map_err(|source| Error::Spawn {
                program: self.program.clone(),
                source,
            })?;
        Ok(Output {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    fn run_checked(&self, repo: &Path, args: &[&str]) -> Result<String> {
        let output = self.run(repo, args)?;
        if output.success {
            Ok(output.stdout)
        } else {
            Err(failed(args, &output))
        }
    }

    fn view(&self, repo: &Path, pr_ref: &str, fields: &str) -> Result<Option<ViewFields>> {
        let output = self.run(repo, &["pr", "view", pr_ref, "--json", fields])?;
        if !output.success {
            // gh exits non-zero when no pull request matches the ref
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&output.stdout)?))
    }
}

fn failed(args: &[&str], output: &Output) -> Error {
    Error::CommandFailed {
        command: format!("gh {}", args.iter().take(2).copied().collect::<Vec<_>>().join(" ")),
        code: output.code,
        stderr: output.stderr.trim().to_string(),
    }
}

impl ReviewHost for GhCli {
    fn create_pr(&self, repo: &Path, request: &PrRequest) -> Result<CreateOutcome> {
        let labels = request.labels.join(",");
        let reviewers = request.reviewers.join(",");
        let assignees = request.assignees.join(",");

        let mut args = vec![
            "pr",
            "create",
            "--head",
            request.head.as_str(),
            "--title",
            request.title.as_str(),
            "--body",
            request.body.as_str(),
        ];
        if !labels.is_empty() {
            args.extend(["--label", labels.as_str()]);
        }
        if !reviewers.is_empty() {
            args.extend(["--reviewer", reviewers.as_str()]);
        }
        if !assignees.is_empty() {
            args.extend(["--assignee", assignees.as_str()]);
        }

        let output = self.run(repo, &args)?;
        if output.success {
            return Ok(CreateOutcome::Created {
                url: output.stdout.trim().to_string(),
            });
        }
        if output.stderr.contains("already exists") {
            return Ok(CreateOutcome::AlreadyExists);
        }
        Err(failed(&args, &output))
    }

    fn update_pr_body(&self, repo: &Path, head: &str, body: &str) -> Result<()> {
        let url = self
            .pr_url(repo, head)?
            .ok_or_else(|| Error::PullRequestNotFound {
                head: head.to_string(),
            })?;
        let pull = parse_pull_url(&url).ok_or_else(|| Error::UnexpectedOutput {
            command: "gh pr view".to_string(),
            message: format!("not a pull request URL: {url}"),
        })?;
        // REST update leaves reviewers, labels and projects untouched
        let endpoint = format!("repos/{}/{}/pulls/{}", pull.owner, pull.repo, pull.number);
        let field = format!("body={body}");
        self.run_checked(repo, &["api", "-X", "PATCH", &endpoint, "-f", &field])?;
        Ok(())
    }

    fn open_pr_body(&self, repo: &Path, head: &str) -> Result<Option<String>> {
        Ok(self.view(repo, head, "body,state")?.and_then(|fields| {
            match fields.state.as_deref().and_then(PrState::parse) {
                Some(PrState::Open) => Some(fields.body.unwrap_or_default()),
                _ => None,
            }
        }))
    }

    fn close_pr(&self, repo: &Path, head: &str, comment: &str) -> Result<()> {
        self.run_checked(repo, &["pr", "close", head, "--comment", comment])?;
        Ok(())
    }

    fn pr_state(&self, repo: &Path, pr_ref: &str) -> Result<PrState> {
        let stdout = self.run_checked(repo, &["pr", "view", pr_ref, "--json", "state"])?;
        let fields: ViewFields = serde_json::from_str(&stdout)?;
        fields
            .state
            .as_deref()
            .and_then(PrState::parse)
            .ok_or_else(|| Error::UnexpectedOutput {
                command: "gh pr view".to_string(),
                message: format!("unknown state in {}", stdout.trim()),
            })
    }

    fn pr_url(&self, repo: &Path, pr_ref: &str) -> Result<Option<String>> {
        Ok(self.view(repo, pr_ref, "url")?.and_then(|fields| fields.url))
    }

    fn pr_checks(&self, repo: &Path, pr_ref: &str) -> Result<Vec<CheckRun>> {
        let args = ["pr", "checks", pr_ref, "--json", "name,state"];
        let output = self.run(repo, &args)?;
        // gh exits non-zero while checks are pending but still prints them
        if let Ok(checks) = serde_json::from_str::<Vec<CheckRun>>(output.stdout.trim()) {
            return Ok(checks);
        }
        if output.stderr.contains("no checks reported") {
            return Ok(Vec::new());
        }
        Err(failed(&args, &output))
    }

    fn enable_auto_merge(
        &self,
        repo: &Path,
        pr_ref: &str,
        method: MergeMethod,
        delete_branch: bool,
    ) -> Result<()> {
        let method_flag = format!("--{method}");
        let mut args = vec!["pr", "merge", "--auto", method_flag.as_str(), pr_ref];
        if delete_branch {
            args.push("--delete-branch");
        }
        self.run_checked(repo, &args)?;
        Ok(())
    }
}
