//! Check-run states reported by the review host

use serde::{Deserialize, Serialize};

/// Raw states that mean a check failed.
pub const FAILED_STATES: &[&str] = &[
    "FAILURE",
    "ERROR",
    "TIMED_OUT",
    "STARTUP_FAILURE",
    "STALE",
    "ACTION_REQUIRED",
];

/// Raw states that mean a check finished without failing.
pub const PASSED_STATES: &[&str] = &["SUCCESS", "NEUTRAL", "SKIPPED", "CANCELLED"];

/// Classification of a raw check state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Failed,
    Passed,
    Pending,
}

/// A named check on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRun {
    pub name: String,
    pub state: String,
}

impl CheckRun {
    pub fn new(name: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: state.into(),
        }
    }

    pub fn status(&self) -> CheckStatus {
        let state = self.state.to_uppercase();
        if FAILED_STATES.contains(&state.as_str()) {
            CheckStatus::Failed
        } else if PASSED_STATES.contains(&state.as_str()) {
            CheckStatus::Passed
        } else {
            CheckStatus::Pending
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status() == CheckStatus::Failed
    }

    pub fn is_completed(&self) -> bool {
        self.status() != CheckStatus::Pending
    }

    pub fn is_pending(&self) -> bool {
        self.status() == CheckStatus::Pending
    }
}
