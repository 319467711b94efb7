//! Terminal confirmations
//!
//! Uses dialoguer when stdin is a terminal. Piped or CI runs, and runs with
//! `--no-prompt`, answer yes without asking.

use std::io::IsTerminal;

use dialoguer::Confirm as Prompt;
use path_sync_core::{AutoConfirm, Confirm};

/// Asks on the terminal, defaulting to no.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        match Prompt::new().with_prompt(prompt).default(false).interact() {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "Prompt failed, treating as no");
                false
            }
        }
    }
}

/// Pick the confirmation strategy for this run.
pub fn confirmer(no_prompt: bool) -> Box<dyn Confirm> {
    if no_prompt || !std::io::stdin().is_terminal() {
        Box::new(AutoConfirm)
    } else {
        Box::new(TerminalConfirm)
    }
}
