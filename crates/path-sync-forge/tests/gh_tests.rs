//! Drives [`GhCli`] against a stand-in `gh` script that records its
//! arguments and prints canned output.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use path_sync_forge::{CreateOutcome, GhCli, MergeMethod, PrRequest, PrState, ReviewHost};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

struct FakeGh {
    dir: TempDir,
    script: PathBuf,
}

impl FakeGh {
    /// `behaviour` is shell run after the arguments are logged.
    fn new(behaviour: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("gh");
        fs::write(
            &script,
            format!("#!/bin/sh\nprintf '%s\\n' \"$*\" >> \"$0.calls\"\n{behaviour}\n"),
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        Self { dir, script }
    }

    fn host(&self) -> GhCli {
        GhCli::with_program(self.script.to_string_lossy())
    }

    fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.script.with_extension("calls"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

fn request() -> PrRequest {
    PrRequest {
        head: "sync/cfg".into(),
        title: "chore: sync".into(),
        body: "body".into(),
        labels: vec!["sync".into(), "bot".into()],
        ..PrRequest::default()
    }
}

#[test]
fn test_create_returns_printed_url() {
    let gh = FakeGh::new("echo https://github.com/org/dest/pull/5");

    let outcome = gh.host().create_pr(gh.dir.path(), &request()).unwrap();

    assert_eq!(
        outcome,
        CreateOutcome::Created {
            url: "https://github.com/org/dest/pull/5".into()
        }
    );
    assert_eq!(
        gh.calls(),
        vec!["pr create --head sync/cfg --title chore: sync --body body --label sync,bot"]
    );
}

#[test]
fn test_create_detects_existing_pr() {
    let gh = FakeGh::new(
        "echo 'a pull request for branch \"sync/cfg\" into branch \"main\" already exists' >&2; exit 1",
    );

    let outcome = gh.host().create_pr(gh.dir.path(), &request()).unwrap();

    assert_eq!(outcome, CreateOutcome::AlreadyExists);
}

#[test]
fn test_create_failure_is_an_error() {
    let gh = FakeGh::new("echo 'HTTP 401' >&2; exit 1");

    let err = gh.host().create_pr(gh.dir.path(), &request()).unwrap_err();

    assert!(err.to_string().contains("HTTP 401"));
}

#[test]
fn test_open_pr_body_only_for_open_prs() {
    let open = FakeGh::new(r#"echo '{"body":"hello","state":"OPEN"}'"#);
    let merged = FakeGh::new(r#"echo '{"body":"hello","state":"MERGED"}'"#);
    let missing = FakeGh::new("echo 'no pull requests found' >&2; exit 1");

    assert_eq!(
        open.host().open_pr_body(open.dir.path(), "sync/cfg").unwrap(),
        Some("hello".to_string())
    );
    assert_eq!(
        merged.host().open_pr_body(merged.dir.path(), "sync/cfg").unwrap(),
        None
    );
    assert!(!missing.host().has_open_pr(missing.dir.path(), "sync/cfg").unwrap());
}

#[test]
fn test_pr_state_parses_json() {
    let gh = FakeGh::new(r#"echo '{"state":"MERGED"}'"#);

    let state = gh.host().pr_state(gh.dir.path(), "sync/cfg").unwrap();

    assert_eq!(state, PrState::Merged);
    assert_eq!(gh.calls(), vec!["pr view sync/cfg --json state"]);
}

#[test]
fn test_pending_checks_are_read_despite_exit_code() {
    let gh = FakeGh::new(r#"echo '[{"name":"lint","state":"PENDING"}]'; exit 8"#);

    let checks = gh.host().pr_checks(gh.dir.path(), "sync/cfg").unwrap();

    assert_eq!(checks.len(), 1);
    assert!(checks[0].is_pending());
}

#[test]
fn test_no_checks_reported_is_empty() {
    let gh = FakeGh::new("echo \"no checks reported on the 'sync/cfg' branch\" >&2; exit 1");

    let checks = gh.host().pr_checks(gh.dir.path(), "sync/cfg").unwrap();

    assert!(checks.is_empty());
}

#[test]
fn test_enable_auto_merge_arguments() {
    let gh = FakeGh::new("true");
    let url = "https://github.com/org/dest/pull/5";

    gh.host()
        .enable_auto_merge(gh.dir.path(), url, MergeMethod::Squash, true)
        .unwrap();

    assert_eq!(
        gh.calls(),
        vec![format!("pr merge --auto --squash {url} --delete-branch")]
    );
}

#[test]
fn test_update_body_patches_by_number() {
    let gh = FakeGh::new(
        r#"case "$1" in
  pr) echo '{"url":"https://github.com/org/dest/pull/9"}' ;;
  api) ;;
esac"#,
    );

    gh.host()
        .update_pr_body(gh.dir.path(), "sync/cfg", "new body")
        .unwrap();

    assert_eq!(
        gh.calls(),
        vec![
            "pr view sync/cfg --json url".to_string(),
            "api -X PATCH repos/org/dest/pulls/9 -f body=new body".to_string(),
        ]
    );
}
