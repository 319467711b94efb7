use path_sync_core::config::{OnFail, VerifyConfig, VerifyStep};
use path_sync_core::verify::{
    MISSING_WORKDIR_EXIT_CODE, VerifyOptions, VerifyStatus, run_verify_steps,
};
use path_sync_core::SyncLog;
use path_sync_git::GitRepo;
use path_sync_test_utils::TestRepo;
use path_sync_test_utils::git::git;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn run(
    repo: &TestRepo,
    verify: &VerifyConfig,
    opts: VerifyOptions,
) -> (path_sync_core::VerifyOutcome, SyncLog) {
    let vcs = GitRepo::open(repo.root()).unwrap();
    let mut log = SyncLog::new("dest");
    let outcome = run_verify_steps(&vcs, verify, OnFail::Warn, opts, &mut log).unwrap();
    (outcome, log)
}

#[rstest]
#[case::skip(OnFail::Skip, VerifyStatus::Skipped, false)]
#[case::fail(OnFail::Fail, VerifyStatus::Failed, false)]
#[case::warn(OnFail::Warn, VerifyStatus::Warn, true)]
fn test_failing_step_policy(
    #[case] policy: OnFail,
    #[case] expected: VerifyStatus,
    #[case] later_steps_run: bool,
) {
    let repo = TestRepo::with_git();
    let verify = VerifyConfig::new(
        policy,
        vec![VerifyStep::new("exit 4"), VerifyStep::new("touch after.txt")],
    );

    let (outcome, _) = run(&repo, &verify, VerifyOptions::default());

    assert_eq!(outcome.status, expected);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].exit_code, 4);
    assert_eq!(outcome.failures[0].on_fail, policy);
    assert_eq!(repo.path("after.txt").exists(), later_steps_run);
}

#[test]
fn test_all_steps_pass() {
    let repo = TestRepo::with_git();
    let verify = VerifyConfig::new(
        OnFail::Fail,
        vec![VerifyStep::new("echo one"), VerifyStep::new("echo two")],
    );

    let (outcome, log) = run(&repo, &verify, VerifyOptions::default());

    assert_eq!(outcome.status, VerifyStatus::Passed);
    assert!(outcome.failures.is_empty());
    assert_eq!(log.contents(), "[verify] one\n[verify] two");
}

#[test]
fn test_step_policy_overrides_default() {
    let repo = TestRepo::with_git();
    let verify = VerifyConfig::new(
        OnFail::Fail,
        vec![
            VerifyStep::new("false").with_on_fail(OnFail::Warn),
            VerifyStep::new("touch after.txt"),
        ],
    );

    let (outcome, _) = run(&repo, &verify, VerifyOptions::default());

    assert_eq!(outcome.status, VerifyStatus::Warn);
    repo.assert_file_exists("after.txt");
}

#[test]
fn test_warnings_accumulate() {
    let repo = TestRepo::with_git();
    let verify = VerifyConfig::new(
        OnFail::Warn,
        vec![VerifyStep::new("exit 1"), VerifyStep::new("exit 2")],
    );

    let (outcome, _) = run(&repo, &verify, VerifyOptions::default());

    assert_eq!(outcome.status, VerifyStatus::Warn);
    assert_eq!(outcome.warnings().count(), 2);
}

#[test]
fn test_commit_entry_stages_declared_paths() {
    let repo = TestRepo::with_git();
    let verify = VerifyConfig::new(
        OnFail::Fail,
        vec![
            VerifyStep::new("echo gen > gen.txt && echo local > local.txt")
                .with_commit("chore: regenerate", &[".", "!local.txt"]),
        ],
    );

    let (outcome, _) = run(&repo, &verify, VerifyOptions::default());

    assert_eq!(outcome.status, VerifyStatus::Passed);
    assert_eq!(git(repo.root(), &["log", "-1", "--format=%s"]), "chore: regenerate");
    let committed = git(repo.root(), &["show", "--name-only", "--format=", "HEAD"]);
    assert_eq!(committed, "gen.txt");
    assert!(git(repo.root(), &["status", "--porcelain"]).contains("?? local.txt"));
}

#[test]
fn test_skip_commit_leaves_changes_uncommitted() {
    let repo = TestRepo::with_git();
    let verify = VerifyConfig::new(
        OnFail::Fail,
        vec![VerifyStep::new("echo gen > gen.txt").with_commit("chore: regenerate", &["."])],
    );
    let opts = VerifyOptions {
        skip_commit: true,
        ..VerifyOptions::default()
    };

    run(&repo, &verify, opts);

    assert_eq!(git(repo.root(), &["log", "-1", "--format=%s"]), "Initial commit");
    repo.assert_file_exists("gen.txt");
}

#[test]
fn test_dry_run_only_logs() {
    let repo = TestRepo::with_git();
    let verify = VerifyConfig::new(OnFail::Fail, vec![VerifyStep::new("touch ran.txt")]);
    let opts = VerifyOptions {
        dry_run: true,
        ..VerifyOptions::default()
    };

    let (outcome, log) = run(&repo, &verify, opts);

    assert_eq!(outcome.status, VerifyStatus::Passed);
    repo.assert_file_not_exists("ran.txt");
    assert_eq!(log.contents(), "[DRY RUN] Would run: touch ran.txt");
}

#[test]
fn test_step_workdir_is_relative_to_repo() {
    let repo = TestRepo::with_git();
    repo.write("sub/keep.txt", "");
    let mut step = VerifyStep::new("touch here.txt");
    step.workdir = Some("sub".into());
    let verify = VerifyConfig::new(OnFail::Fail, vec![step]);

    run(&repo, &verify, VerifyOptions::default());

    repo.assert_file_exists("sub/here.txt");
}

#[rstest]
#[case::warn(OnFail::Warn, VerifyStatus::Warn, true)]
#[case::fail(OnFail::Fail, VerifyStatus::Failed, false)]
fn test_missing_workdir_is_a_step_failure(
    #[case] policy: OnFail,
    #[case] expected: VerifyStatus,
    #[case] later_steps_run: bool,
) {
    let repo = TestRepo::with_git();
    let mut step = VerifyStep::new("touch there.txt");
    step.workdir = Some("absent".into());
    let verify = VerifyConfig::new(policy, vec![step, VerifyStep::new("touch after.txt")]);

    let (outcome, log) = run(&repo, &verify, VerifyOptions::default());

    assert_eq!(outcome.status, expected);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].exit_code, MISSING_WORKDIR_EXIT_CODE);
    assert!(log.contents().contains("Workdir not found"));
    assert_eq!(repo.path("after.txt").exists(), later_steps_run);
}
