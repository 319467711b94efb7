//! Shell command execution for verification and update steps

use std::path::Path;
use std::process::Command;

use crate::log::SyncLog;
use crate::{Error, Result};

/// Lines of output kept in the log for a failed command.
pub const FAILURE_TAIL_LINES: usize = 50;

/// Exit status and combined output of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `-1` when killed by a signal
    pub exit_code: i32,
    /// Stdout lines followed by stderr lines
    pub lines: Vec<String>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Run `command` through `sh -c` in `cwd`.
///
/// Output lines are logged as `[prefix] line`. For a failing command only
/// the last [`FAILURE_TAIL_LINES`] lines reach the log.
pub fn run_command(
    command: &str,
    cwd: &Path,
    prefix: &str,
    log: &mut SyncLog,
) -> Result<CommandOutput> {
    tracing::debug!(command = %command, cwd = %cwd.display(), "Running command");
    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(cwd)
        .output()
        .map_err(|source| Error::CommandSpawn {
            command: command.to_string(),
            source,
        })?;

    let lines: Vec<String> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .chain(String::from_utf8_lossy(&output.stderr).lines())
        .map(str::to_string)
        .collect();
    let result = CommandOutput {
        exit_code: output.status.code().unwrap_or(-1),
        lines,
    };

    if result.success() {
        for line in &result.lines {
            log.info(format!("[{prefix}] {line}"));
        }
    } else {
        let omitted = result.lines.len().saturating_sub(FAILURE_TAIL_LINES);
        if omitted > 0 {
            log.error(format!("[{prefix}] ... ({omitted} lines omitted)"));
        }
        for line in &result.lines[omitted..] {
            log.error(format!("[{prefix}] {line}"));
        }
        log.error(format!(
            "Command failed with exit code {}: {command}",
            result.exit_code
        ));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn captures_output_and_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = SyncLog::new("dest");

        let out = run_command("echo hello; echo oops >&2", dir.path(), "check", &mut log).unwrap();

        assert!(out.success());
        assert_eq!(out.lines, vec!["hello", "oops"]);
        assert_eq!(log.contents(), "[check] hello\n[check] oops");
    }

    #[test]
    fn runs_in_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "").unwrap();
        let mut log = SyncLog::new("dest");

        let out = run_command("ls", dir.path(), "ls", &mut log).unwrap();

        assert!(out.lines.contains(&"marker.txt".to_string()));
    }

    #[test]
    fn failure_keeps_only_trailing_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = SyncLog::new("dest");

        let out = run_command("seq 1 120; exit 3", dir.path(), "seq", &mut log).unwrap();

        assert_eq!(out.exit_code, 3);
        assert_eq!(out.lines.len(), 120);
        let logged: Vec<&str> = log.lines().collect();
        assert_eq!(logged[0], "[seq] ... (70 lines omitted)");
        assert_eq!(logged[1], "[seq] 71");
        assert_eq!(logged[50], "[seq] 120");
        assert!(logged[51].starts_with("Command failed with exit code 3"));
    }
}
