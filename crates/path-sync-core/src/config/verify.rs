use serde::{Deserialize, Serialize};

/// What a failing verification or update step does to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnFail {
    /// Stop and treat the destination as a hard error
    Fail,
    /// Stop and drop the destination's changes from PR handling
    Skip,
    /// Record the failure and keep going
    Warn,
}

impl std::fmt::Display for OnFail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fail => write!(f, "fail"),
            Self::Skip => write!(f, "skip"),
            Self::Warn => write!(f, "warn"),
        }
    }
}

fn default_add_paths() -> Vec<String> {
    vec![".".to_string()]
}

/// Commit made after a successful step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitConfig {
    pub message: String,
    /// Path specs to stage; entries prefixed with `!` are left unstaged
    #[serde(default = "default_add_paths")]
    pub add_paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyStep {
    /// Shell command
    pub run: String,
    /// Directory relative to the destination root
    #[serde(default)]
    pub workdir: Option<String>,
    #[serde(default)]
    pub commit: Option<CommitConfig>,
    /// Overrides the pipeline default
    #[serde(default)]
    pub on_fail: Option<OnFail>,
}

impl VerifyStep {
    pub fn new(run: impl Into<String>) -> Self {
        Self {
            run: run.into(),
            workdir: None,
            commit: None,
            on_fail: None,
        }
    }

    pub fn with_on_fail(mut self, on_fail: OnFail) -> Self {
        self.on_fail = Some(on_fail);
        self
    }

    pub fn with_commit(mut self, message: &str, add_paths: &[&str]) -> Self {
        self.commit = Some(CommitConfig {
            message: message.to_string(),
            add_paths: add_paths.iter().map(|p| p.to_string()).collect(),
        });
        self
    }
}

/// Ordered verification steps with a pipeline-level failure policy.
///
/// An unset `on_fail` falls back to the run's default: `warn` for copy runs,
/// `skip` for dependency updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyConfig {
    #[serde(default)]
    pub on_fail: Option<OnFail>,
    #[serde(default)]
    pub steps: Vec<VerifyStep>,
}

impl VerifyConfig {
    pub fn new(on_fail: OnFail, steps: Vec<VerifyStep>) -> Self {
        Self {
            on_fail: Some(on_fail),
            steps,
        }
    }

    /// Effective policy for `step`: its own override, else the pipeline
    /// policy, else `fallback`.
    pub fn policy_for(&self, step: &VerifyStep, fallback: OnFail) -> OnFail {
        step.on_fail.or(self.on_fail).unwrap_or(fallback)
    }
}
