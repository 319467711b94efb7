use path_sync_core::{
    AutoConfirm, DepConfig, DepStatus, DepUpdateOptions, DepUpdateReport, Error, dep_config_path,
    run_dep_update,
};
use path_sync_test_utils::git::{RemotePair, git};
use path_sync_test_utils::{FakeHost, TestRepo};
use pretty_assertions::assert_eq;

const BRANCH: &str = "deps/up";

struct Fixture {
    src: TestRepo,
    dest: RemotePair,
    host: FakeHost,
}

impl Fixture {
    fn new(host: FakeHost) -> Self {
        let src = TestRepo::new();
        let dest = RemotePair::new();
        src.write(
            ".github/cfg.src.yaml",
            &format!(
                "name: cfg\ndestinations:\n  - name: dest\n    dest_path_relative: {}\n  - name: legacy\n",
                dest.work.display()
            ),
        );
        Self { src, dest, host }
    }

    fn config(&self, extra: &str) -> DepConfig {
        self.src.write(
            ".github/up.dep.yaml",
            &format!(
                "\
name: up
from_config: cfg
exclude_destinations: [legacy]
updates:
  - command: echo v2 > uv.lock
pr:
  branch: {BRANCH}
  title: 'chore: update deps'
{extra}"
            ),
        );
        DepConfig::load(&dep_config_path(self.src.root(), "up")).unwrap()
    }

    fn run(&self, config: &DepConfig) -> path_sync_core::Result<DepUpdateReport> {
        run_dep_update(
            config,
            self.src.root(),
            &self.host,
            &AutoConfirm,
            &DepUpdateOptions::default(),
        )
    }
}

#[test]
fn test_changed_destination_gets_pr() {
    let fx = Fixture::new(FakeHost::new());

    let report = fx.run(&fx.config("")).unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].status, DepStatus::Passed);
    assert_eq!(report.changed(), 1);
    assert_eq!(fx.dest.remote_file(BRANCH, "uv.lock").as_deref(), Some("v2\n"));
    assert_eq!(
        git(&fx.dest.work, &["log", "-1", "--format=%s"]),
        "chore: update deps"
    );

    let pr = fx.host.open_pr(BRANCH).unwrap();
    assert_eq!(pr.title, "chore: update deps");
    assert!(pr.body.starts_with("Automated dependency update."));
}

#[test]
fn test_failed_command_skips_destination() {
    let fx = Fixture::new(FakeHost::new());
    let mut config = fx.config("");
    config.updates[0].command = "echo broken; exit 1".into();

    let report = fx.run(&config).unwrap();

    assert_eq!(report.results[0].status, DepStatus::Skipped);
    assert_eq!(report.results[0].command_output, "broken");
    assert!(report.prs.is_empty());
    assert_eq!(fx.dest.remote_sha(BRANCH), None);
}

#[test]
fn test_no_changes_closes_stale_pr() {
    let fx = Fixture::new(FakeHost::new().with_open_pr(BRANCH, "old"));
    let mut config = fx.config("");
    config.updates[0].command = "true".into();

    let report = fx.run(&config).unwrap();

    assert_eq!(report.results[0].status, DepStatus::NoChanges);
    assert!(fx.host.open_pr(BRANCH).is_none());
}

#[test]
fn test_failing_verification_defaults_to_skip() {
    let fx = Fixture::new(FakeHost::new());
    let config = fx.config("verify:\n  steps:\n    - run: exit 2\n");

    let report = fx.run(&config).unwrap();

    assert_eq!(report.results[0].status, DepStatus::Skipped);
    assert!(fx.host.prs().is_empty());
}

#[test]
fn test_failed_verification_aborts_before_push() {
    let fx = Fixture::new(FakeHost::new());
    let config = fx.config("verify:\n  on_fail: fail\n  steps:\n    - run: exit 2\n");

    let err = fx.run(&config).unwrap_err();

    assert!(matches!(err, Error::VerificationFailed { ref dest } if dest == "dest"));
    assert_eq!(fx.dest.remote_sha(BRANCH), None);
}

#[test]
fn test_verification_issues_are_listed() {
    let fx = Fixture::new(FakeHost::new());
    let config = fx.config("verify:\n  on_fail: warn\n  steps:\n    - run: exit 5\n");

    fx.run(&config).unwrap();

    let pr = fx.host.open_pr(BRANCH).unwrap();
    assert!(pr.body.contains("## Verification Issues"));
    assert!(pr.body.contains("- `exit 5` failed (exit code 5, strategy: warn)"));
}

#[test]
fn test_auto_merge_is_enabled_when_configured() {
    let fx = Fixture::new(FakeHost::new());
    let mut config = fx.config("");
    config.pr.auto_merge = true;

    let report = run_dep_update(
        &config,
        fx.src.root(),
        &fx.host,
        &AutoConfirm,
        &DepUpdateOptions {
            no_wait: true,
            ..DepUpdateOptions::default()
        },
    )
    .unwrap();

    assert_eq!(report.prs.len(), 1);
    assert_eq!(fx.host.auto_merge_requests().len(), 1);
    assert!(report.merge_results.is_empty());
}
