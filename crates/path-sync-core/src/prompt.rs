//! Confirmation prompts

/// Asks the operator a yes/no question.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Answers yes to everything. Used for `--no-prompt` and non-interactive runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        tracing::debug!(prompt = %prompt, "Auto-confirmed");
        true
    }
}
