//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// path-sync - Keep files in many repositories in step with one source repository
#[derive(Parser, Debug)]
#[command(name = "path-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Source repository root (default: git root above the current directory)
    #[arg(long, global = true, env = "PATH_SYNC_SRC_ROOT")]
    pub src_root: Option<PathBuf>,

    /// Exit 0 when nothing changed, 1 when something changed, 2 on error
    #[arg(long, global = true)]
    pub detailed_exit_code: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Sync files from the source repository into its destinations
    ///
    /// Examples:
    ///   path-sync copy -n python-template
    ///   path-sync copy -n python-template --dest api,web --dry-run
    ///   path-sync copy -n python-template --no-pr --skip-verify
    Copy(CopyArgs),

    /// Run dependency update commands in every destination and open PRs
    DepUpdate(DepUpdateArgs),

    /// Fail when a feature branch edits synced content it does not own
    ValidateNoChanges(ValidateArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct CopyArgs {
    /// Source config name (`.github/<name>.src.yaml`)
    #[arg(short, long)]
    pub name: String,

    /// Only these destinations
    #[arg(short, long, value_delimiter = ',')]
    pub dest: Vec<String>,

    /// Parent directory for destination working trees
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Show what would change without writing, committing or pushing
    #[arg(long)]
    pub dry_run: bool,

    /// Overwrite files whose ownership header was removed
    #[arg(long)]
    pub force_overwrite: bool,

    /// Sync into whatever branch the destination has checked out
    #[arg(long)]
    pub no_checkout: bool,

    /// Recreate the sync branch from the default branch
    #[arg(long, conflicts_with = "no_checkout")]
    pub checkout_from_default: bool,

    /// Write files but do not commit
    #[arg(long)]
    pub skip_commit: bool,

    /// Answer yes to every confirmation
    #[arg(long)]
    pub no_prompt: bool,

    /// Commit but do not push or open PRs
    #[arg(long)]
    pub no_pr: bool,

    #[arg(long)]
    pub skip_orphan_cleanup: bool,

    #[arg(long)]
    pub skip_verify: bool,

    /// Enable auto-merge without waiting for the result
    #[arg(long)]
    pub no_wait: bool,

    #[arg(long)]
    pub no_auto_merge: bool,

    /// Continue with the remaining destinations after a failure
    #[arg(long)]
    pub keep_going: bool,

    /// PR title template (`{name}`, `{dest_name}`)
    #[arg(long)]
    pub pr_title: Option<String>,

    #[arg(long, value_delimiter = ',')]
    pub labels: Option<Vec<String>>,

    #[arg(long, value_delimiter = ',')]
    pub reviewers: Option<Vec<String>>,

    #[arg(long, value_delimiter = ',')]
    pub assignees: Option<Vec<String>>,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct DepUpdateArgs {
    /// Dependency config name (`.github/<name>.dep.yaml`)
    #[arg(short, long)]
    pub name: String,

    /// Only these destinations
    #[arg(short, long, value_delimiter = ',')]
    pub dest: Vec<String>,

    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    #[arg(long)]
    pub dry_run: bool,

    #[arg(long)]
    pub skip_verify: bool,

    #[arg(long)]
    pub no_prompt: bool,

    #[arg(long)]
    pub no_pr: bool,

    #[arg(long)]
    pub no_wait: bool,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ValidateArgs {
    /// Branch the feature branch is compared against
    #[arg(short = 'b', long, default_value = "main")]
    pub branch: String,

    #[arg(long, default_value = "origin")]
    pub remote: String,

    /// Sections allowed to change, `path:section_id,path:section_id`
    #[arg(long, default_value = "")]
    pub skip_sections: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_copy_with_lists() {
        let cli = Cli::parse_from([
            "path-sync",
            "copy",
            "-n",
            "tpl",
            "--dest",
            "api,web",
            "--labels",
            "sync,bot",
            "--dry-run",
        ]);
        let Commands::Copy(args) = cli.command else {
            panic!("expected copy");
        };
        assert_eq!(args.name, "tpl");
        assert_eq!(args.dest, vec!["api", "web"]);
        assert_eq!(args.labels, Some(vec!["sync".to_string(), "bot".to_string()]));
        assert_eq!(args.reviewers, None);
        assert!(args.dry_run);
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "path-sync",
            "validate-no-changes",
            "-v",
            "--detailed-exit-code",
            "--src-root",
            "/tmp/repo",
        ]);
        assert!(cli.verbose);
        assert!(cli.detailed_exit_code);
        assert_eq!(cli.src_root, Some(PathBuf::from("/tmp/repo")));
        let Commands::ValidateNoChanges(args) = cli.command else {
            panic!("expected validate-no-changes");
        };
        assert_eq!(args.branch, "main");
        assert_eq!(args.skip_sections, "");
    }

    #[test]
    fn checkout_flags_conflict() {
        let parsed = Cli::try_parse_from([
            "path-sync",
            "copy",
            "-n",
            "tpl",
            "--no-checkout",
            "--checkout-from-default",
        ]);
        assert!(parsed.is_err());
    }
}
