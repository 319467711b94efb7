//! Tests that run the compiled `path-sync` binary against real repositories.
//!
//! Copy runs use `--no-pr` so no review host is contacted.

use std::fs;

use assert_cmd::Command;
use path_sync_test_utils::TestRepo;
use path_sync_test_utils::git::{RemotePair, commit_all, git};
use predicates::prelude::*;

fn path_sync() -> Command {
    let mut cmd = Command::cargo_bin("path-sync").expect("Failed to find path-sync binary");
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Source repo with one template and a config pointing at `dest`.
fn source_for(dest: &RemotePair) -> TestRepo {
    let src = TestRepo::with_git();
    src.write("file.py", "print('a')\n").write(
        ".github/cfg.src.yaml",
        &format!(
            "name: cfg\npaths:\n  - src_path: file.py\ndestinations:\n  - name: dest\n    dest_path_relative: {}\n",
            dest.work.display()
        ),
    );
    commit_all(src.root(), "add templates");
    src
}

#[test]
fn test_help_lists_subcommands() {
    path_sync()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("copy"))
        .stdout(predicate::str::contains("dep-update"))
        .stdout(predicate::str::contains("validate-no-changes"));
}

#[test]
fn test_copy_reports_changes_then_nothing() {
    let dest = RemotePair::new();
    let src = source_for(&dest);
    let args = [
        "copy",
        "-n",
        "cfg",
        "--no-pr",
        "--detailed-exit-code",
        "--src-root",
    ];

    path_sync()
        .args(args)
        .arg(src.root())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("1 file change(s)"));

    assert_eq!(
        fs::read_to_string(dest.work.join("file.py")).unwrap(),
        "# path-sync copy -n cfg\nprint('a')\n"
    );
    assert_eq!(git(&dest.work, &["branch", "--show-current"]), "sync/cfg");
    assert!(git(&dest.work, &["log", "-1", "--format=%s"]).starts_with("chore: sync cfg from "));

    path_sync()
        .args(args)
        .arg(src.root())
        .assert()
        .code(0)
        .stdout(predicate::str::contains("No changes"));
}

#[test]
fn test_changes_exit_zero_without_detailed_codes() {
    let dest = RemotePair::new();
    let src = source_for(&dest);

    path_sync()
        .args(["copy", "-n", "cfg", "--no-pr", "--src-root"])
        .arg(src.root())
        .assert()
        .success();
}

#[test]
fn test_unknown_destination_exits_two() {
    let dest = RemotePair::new();
    let src = source_for(&dest);

    path_sync()
        .args(["copy", "-n", "cfg", "--dest", "nope", "--dry-run", "--src-root"])
        .arg(src.root())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Destination not found: nope"));
}

#[test]
fn test_missing_config_exits_two() {
    let src = TestRepo::with_git();

    path_sync()
        .args(["copy", "-n", "absent", "--src-root"])
        .arg(src.root())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Configuration not found"));
}

#[test]
fn test_validate_flags_section_edits() {
    let pair = RemotePair::new();
    let justfile = "\
# path-sync copy -n cfg
# === DO_NOT_EDIT: path-sync lint ===
lint:
    ruff check
# === OK_EDIT: path-sync lint ===
";
    fs::write(pair.work.join("justfile"), justfile).unwrap();
    commit_all(&pair.work, "sync");
    git(&pair.work, &["push", "origin", "main"]);
    git(&pair.work, &["checkout", "-b", "feature"]);
    fs::write(
        pair.work.join("justfile"),
        justfile.replace("ruff check", "ruff format"),
    )
    .unwrap();

    path_sync()
        .args(["validate-no-changes", "--src-root"])
        .arg(&pair.work)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("justfile: section 'lint' was modified"))
        .stderr(predicate::str::contains("Found 1 unauthorized change(s)"));

    path_sync()
        .args(["validate-no-changes", "--skip-sections", "justfile:lint", "--src-root"])
        .arg(&pair.work)
        .assert()
        .success()
        .stdout(predicate::str::contains("No unauthorized changes"));
}

#[test]
fn test_validate_rejects_malformed_skip_sections() {
    let pair = RemotePair::new();

    path_sync()
        .args(["validate-no-changes", "--skip-sections", "justfile", "--src-root"])
        .arg(&pair.work)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid format 'justfile'"));
}
