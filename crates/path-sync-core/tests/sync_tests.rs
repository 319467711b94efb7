use path_sync_core::{SrcConfig, SyncLog, SyncOptions, SyncResult, sync_paths};
use path_sync_test_utils::TestRepo;
use pretty_assertions::assert_eq;

fn config(paths: &str) -> SrcConfig {
    SrcConfig::parse(&format!(
        "name: cfg\npaths:\n{paths}destinations:\n  - name: dest\n"
    ))
    .unwrap()
}

fn run_with(
    config: &SrcConfig,
    src: &TestRepo,
    dest: &TestRepo,
    opts: SyncOptions,
) -> (SyncResult, SyncLog) {
    let target = &config.destinations[0];
    let mut log = SyncLog::new(&target.name);
    let result = sync_paths(config, target, src.root(), dest.root(), opts, &mut log).unwrap();
    (result, log)
}

fn run(config: &SrcConfig, src: &TestRepo, dest: &TestRepo) -> SyncResult {
    run_with(config, src, dest, SyncOptions::default()).0
}

#[test]
fn test_scaffold_writes_new_file_without_header() {
    let src = TestRepo::new();
    let dest = TestRepo::new();
    src.write("file.py", "print('hello')\n");
    let cfg = config("  - src_path: file.py\n    sync_mode: scaffold\n");

    let result = run(&cfg, &src, &dest);

    assert_eq!(result.content_changes, 1);
    assert_eq!(dest.read("file.py"), "print('hello')\n");
}

#[test]
fn test_scaffold_never_overwrites() {
    let src = TestRepo::new();
    let dest = TestRepo::new();
    src.write("file.py", "print('hello')\n");
    dest.write("file.py", "custom\n");
    let cfg = config("  - src_path: file.py\n    sync_mode: scaffold\n");

    let result = run(&cfg, &src, &dest);

    assert_eq!(result.total(), 0);
    assert_eq!(dest.read("file.py"), "custom\n");
}

#[test]
fn test_sync_stamps_ownership_header() {
    let src = TestRepo::new();
    let dest = TestRepo::new();
    src.write("file.py", "print('hello')\n");
    let cfg = config("  - src_path: file.py\n");

    let (result, log) = run_with(&cfg, &src, &dest, SyncOptions::default());

    assert_eq!(result.content_changes, 1);
    assert_eq!(dest.read("file.py"), "# path-sync copy -n cfg\nprint('hello')\n");
    assert!(log.contents().contains("Wrote: file.py"));
}

#[test]
fn test_replace_overwrites_only_when_different() {
    let src = TestRepo::new();
    let dest = TestRepo::new();
    src.write("data.json", "{\"a\": 1}\n");
    dest.write("data.json", "{\"a\": 0}\n");
    let cfg = config("  - src_path: data.json\n    sync_mode: replace\n");

    assert_eq!(run(&cfg, &src, &dest).content_changes, 1);
    assert_eq!(dest.read("data.json"), "{\"a\": 1}\n");
    assert_eq!(run(&cfg, &src, &dest).content_changes, 0);
}

#[test]
fn test_section_update_keeps_user_edits() {
    let src = TestRepo::new();
    let dest = TestRepo::new();
    dest.write(
        "file.sh",
        "\
#!/bin/bash
# path-sync copy -n cfg
echo user-before
# === DO_NOT_EDIT: path-sync standard ===
echo old
# === OK_EDIT: path-sync standard ===
echo user-after
",
    );
    src.write(
        "file.sh",
        "\
#!/bin/bash
# === DO_NOT_EDIT: path-sync standard ===
echo new
# === OK_EDIT: path-sync standard ===
",
    );
    let cfg = config("  - src_path: file.sh\n");

    let result = run(&cfg, &src, &dest);

    assert_eq!(result.content_changes, 1);
    assert_eq!(
        dest.read("file.sh"),
        "\
#!/bin/bash
# path-sync copy -n cfg
echo user-before
# === DO_NOT_EDIT: path-sync standard ===
echo new
# === OK_EDIT: path-sync standard ===
echo user-after
"
    );
}

#[test]
fn test_resumable_section_gap_is_preserved() {
    let src = TestRepo::new();
    let dest = TestRepo::new();
    dest.write(
        "deps.toml",
        "\
# path-sync copy -n cfg
# === DO_NOT_EDIT: path-sync deps ===
old-1
# === OK_EDIT: path-sync deps ===
user gap
# === DO_NOT_EDIT: path-sync deps ===
old-2
# === OK_EDIT: path-sync deps ===
",
    );
    src.write(
        "deps.toml",
        "\
# === DO_NOT_EDIT: path-sync deps ===
new-1
# === OK_EDIT: path-sync deps ===
source gap
# === DO_NOT_EDIT: path-sync deps ===
new-2
# === OK_EDIT: path-sync deps ===
",
    );
    let cfg = config("  - src_path: deps.toml\n");

    run(&cfg, &src, &dest);

    assert_eq!(
        dest.read("deps.toml"),
        "\
# path-sync copy -n cfg
# === DO_NOT_EDIT: path-sync deps ===
new-1
# === OK_EDIT: path-sync deps ===
user gap
# === DO_NOT_EDIT: path-sync deps ===
new-2
# === OK_EDIT: path-sync deps ===
"
    );
}

#[test]
fn test_second_run_writes_nothing() {
    let src = TestRepo::new();
    let dest = TestRepo::new();
    src.write("file.py", "print('hello')\n")
        .write(
            "file.sh",
            "# === DO_NOT_EDIT: path-sync standard ===\necho hi\n# === OK_EDIT: path-sync standard ===\n",
        )
        .write("docs/guide.md", "# Guide\n");
    std::fs::write(src.path("logo.png"), [0x89, b'P', b'N', b'G', 0xff, 0xfe]).unwrap();
    let cfg = config(
        "  - src_path: file.py\n  - src_path: file.sh\n  - src_path: docs\n    wrap: true\n  - src_path: logo.png\n",
    );

    assert_eq!(run(&cfg, &src, &dest).content_changes, 4);
    let second = run(&cfg, &src, &dest);

    assert_eq!(second.total(), 0);
}

#[test]
fn test_removed_header_opts_out() {
    let src = TestRepo::new();
    let dest = TestRepo::new();
    src.write("file.py", "print('v1')\n");
    let cfg = config("  - src_path: file.py\n");
    run(&cfg, &src, &dest);

    dest.write("file.py", "print('mine')\n");
    src.write("file.py", "print('v2')\n");
    let (result, log) = run_with(&cfg, &src, &dest, SyncOptions::default());

    assert_eq!(result.total(), 0);
    assert_eq!(dest.read("file.py"), "print('mine')\n");
    assert!(log.contents().contains("Skipping file.py (header removed - opted out)"));

    let forced = SyncOptions {
        force_overwrite: true,
        ..SyncOptions::default()
    };
    let (result, _) = run_with(&cfg, &src, &dest, forced);
    assert_eq!(result.content_changes, 1);
    assert_eq!(dest.read("file.py"), "# path-sync copy -n cfg\nprint('v2')\n");
}

#[test]
fn test_removed_mapping_deletes_orphans_only() {
    let src = TestRepo::new();
    let dest = TestRepo::new();
    src.write("a.py", "a = 1\n").write("b.py", "b = 1\n");
    dest.write("other.py", "# path-sync copy -n other\nx = 1\n")
        .write("local.py", "y = 1\n");

    let both = config("  - src_path: a.py\n  - src_path: b.py\n");
    let first = run(&both, &src, &dest);
    assert_eq!(first.orphans_deleted, 0);
    dest.assert_file_exists("b.py");

    let only_a = config("  - src_path: a.py\n");
    let (second, log) = run_with(&only_a, &src, &dest, SyncOptions::default());

    assert_eq!(second.orphans_deleted, 1);
    dest.assert_file_not_exists("b.py");
    dest.assert_file_exists("a.py");
    dest.assert_file_exists("other.py");
    dest.assert_file_exists("local.py");
    assert!(log.contents().contains("Deleted orphan: b.py"));
}

#[test]
fn test_orphan_cleanup_can_be_skipped() {
    let src = TestRepo::new();
    let dest = TestRepo::new();
    dest.write("stale.py", "# path-sync copy -n cfg\nx = 1\n");
    let cfg = config("  - src_path: missing.py\n");
    let opts = SyncOptions {
        skip_orphan_cleanup: true,
        ..SyncOptions::default()
    };

    let (result, log) = run_with(&cfg, &src, &dest, opts);

    assert_eq!(result.total(), 0);
    dest.assert_file_exists("stale.py");
    assert!(log.contents().contains("Source not found: missing.py"));
}

#[test]
fn test_dry_run_counts_without_writing() {
    let src = TestRepo::new();
    let dest = TestRepo::new();
    src.write("file.py", "print('hello')\n");
    dest.write("stale.py", "# path-sync copy -n cfg\nx = 1\n");
    let cfg = config("  - src_path: file.py\n");
    let opts = SyncOptions {
        dry_run: true,
        ..SyncOptions::default()
    };

    let (result, log) = run_with(&cfg, &src, &dest, opts);

    assert_eq!(result.content_changes, 1);
    assert_eq!(result.orphans_deleted, 1);
    dest.assert_file_not_exists("file.py");
    dest.assert_file_exists("stale.py");
    assert!(log.contents().contains("[DRY RUN] Would write: file.py"));
}

#[test]
fn test_unknown_file_type_is_refused() {
    let src = TestRepo::new();
    let dest = TestRepo::new();
    src.write("data.weird", "content\n");
    let cfg = config("  - src_path: data.weird\n");

    let (result, log) = run_with(&cfg, &src, &dest, SyncOptions::default());

    assert_eq!(result.total(), 0);
    dest.assert_file_not_exists("data.weird");
    assert_eq!(log.warnings().count(), 1);
}

#[test]
fn test_wrap_creates_synced_section() {
    let src = TestRepo::new();
    let dest = TestRepo::new();
    src.write("justfile", "lint:\n    ruff check\n");
    let cfg = config("  - src_path: justfile\n    wrap: true\n");

    run(&cfg, &src, &dest);

    assert_eq!(
        dest.read("justfile"),
        "\
# path-sync copy -n cfg
# === DO_NOT_EDIT: path-sync synced ===
lint:
    ruff check
# === OK_EDIT: path-sync synced ===
"
    );
}

#[test]
fn test_skip_sections_on_new_file_builds_remaining_sections() {
    let src = TestRepo::new();
    let dest = TestRepo::new();
    src.write(
        "justfile",
        "\
# === DO_NOT_EDIT: path-sync lint ===
lint:
# === OK_EDIT: path-sync lint ===
# === DO_NOT_EDIT: path-sync coverage ===
coverage:
# === OK_EDIT: path-sync coverage ===
",
    );
    let cfg = SrcConfig::parse(
        "\
name: cfg
paths:
  - src_path: justfile
destinations:
  - name: dest
    skip_sections:
      justfile: [coverage]
",
    )
    .unwrap();

    let (_, log) = run_with(&cfg, &src, &dest, SyncOptions::default());

    assert_eq!(
        dest.read("justfile"),
        "\
# path-sync copy -n cfg
# === DO_NOT_EDIT: path-sync lint ===
lint:
# === OK_EDIT: path-sync lint ===
"
    );
    assert!(log.contents().contains("without skipped sections: coverage"));
}

#[test]
fn test_skip_sections_leave_destination_content() {
    let src = TestRepo::new();
    let dest = TestRepo::new();
    src.write(
        "justfile",
        "\
# === DO_NOT_EDIT: path-sync lint ===
lint: new
# === OK_EDIT: path-sync lint ===
# === DO_NOT_EDIT: path-sync coverage ===
coverage: new
# === OK_EDIT: path-sync coverage ===
",
    );
    dest.write(
        "justfile",
        "\
# path-sync copy -n cfg
# === DO_NOT_EDIT: path-sync lint ===
lint: old
# === OK_EDIT: path-sync lint ===
# === DO_NOT_EDIT: path-sync coverage ===
coverage: custom
# === OK_EDIT: path-sync coverage ===
",
    );
    let cfg = SrcConfig::parse(
        "\
name: cfg
paths:
  - src_path: justfile
destinations:
  - name: dest
    skip_sections:
      justfile: [coverage]
",
    )
    .unwrap();

    run(&cfg, &src, &dest);

    let body = dest.read("justfile");
    assert!(body.contains("lint: new"));
    assert!(body.contains("coverage: custom"));
}

#[test]
fn test_skip_file_patterns_exclude_destination_keys() {
    let src = TestRepo::new();
    let dest = TestRepo::new();
    src.write("tpl/.github/workflows/ci.yaml", "on: push\n")
        .write("tpl/README.md", "# Readme\n");
    let cfg = SrcConfig::parse(
        "\
name: cfg
paths:
  - src_path: tpl
destinations:
  - name: dest
    skip_file_patterns: ['tpl/.github/*']
",
    )
    .unwrap();

    let result = run(&cfg, &src, &dest);

    assert_eq!(result.content_changes, 1);
    assert_eq!(result.synced.len(), 1);
}

#[test]
fn test_glob_mapping_rebuilds_relative_paths() {
    let src = TestRepo::new();
    let dest = TestRepo::new();
    src.write("configs/app.yaml", "a: 1\n")
        .write("configs/nested/db.yaml", "b: 2\n")
        .write("configs/notes.txt", "skip\n");
    let cfg = config("  - src_path: configs/**/*.yaml\n    dest_path: .config\n");

    let result = run(&cfg, &src, &dest);

    assert_eq!(result.content_changes, 2);
    dest.assert_file_contains(".config/app.yaml", "a: 1");
    dest.assert_file_contains(".config/nested/db.yaml", "b: 2");
    dest.assert_file_not_exists(".config/notes.txt");
}

#[test]
fn test_directory_mapping_honours_exclusions() {
    let src = TestRepo::new();
    let dest = TestRepo::new();
    src.write("pkg/mod.py", "x = 1\n")
        .write("pkg/__pycache__/mod.pyc", "cache")
        .write("pkg/scratch.tmp", "tmp\n");
    let cfg = config("  - src_path: pkg\n    exclude_file_patterns: ['*.tmp']\n");

    let result = run(&cfg, &src, &dest);

    assert_eq!(result.content_changes, 1);
    dest.assert_file_exists("pkg/mod.py");
    dest.assert_file_not_exists("pkg/__pycache__/mod.pyc");
    dest.assert_file_not_exists("pkg/scratch.tmp");
}

#[test]
fn test_unclosed_section_is_a_file_error() {
    let src = TestRepo::new();
    let dest = TestRepo::new();
    src.write("file.sh", "# === DO_NOT_EDIT: path-sync standard ===\necho hi\n");
    let cfg = config("  - src_path: file.sh\n");
    let target = &cfg.destinations[0];
    let mut log = SyncLog::new("dest");

    let err = sync_paths(&cfg, target, src.root(), dest.root(), SyncOptions::default(), &mut log)
        .unwrap_err();

    assert!(matches!(err, path_sync_core::Error::Section { .. }));
    assert!(err.to_string().contains("file.sh"));
}
