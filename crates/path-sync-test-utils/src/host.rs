//! In-memory [`ReviewHost`] for engine tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::Path;

use path_sync_forge::{
    CheckRun, CreateOutcome, Error, MergeMethod, PrRequest, PrState, Result, ReviewHost,
};

/// A pull request held by [`FakeHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakePr {
    pub head: String,
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub reviewers: Vec<String>,
    pub assignees: Vec<String>,
    pub state: PrState,
    pub url: String,
}

/// Review host that records every call and keeps PRs in memory.
///
/// `pr_state` first drains the scripted states, then reports the stored
/// state of the matching PR.
#[derive(Debug, Default)]
pub struct FakeHost {
    prs: RefCell<Vec<FakePr>>,
    scripted_states: RefCell<VecDeque<Result<PrState>>>,
    checks: RefCell<Vec<CheckRun>>,
    calls: RefCell<Vec<String>>,
    fail_auto_merge: Cell<bool>,
    auto_merge: RefCell<Vec<(String, MergeMethod, bool)>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an open PR for `head`.
    pub fn with_open_pr(self, head: &str, body: &str) -> Self {
        self.push_pr(head, "Existing PR", body);
        self
    }

    /// Queue a state for the next `pr_state` call.
    pub fn script_state(&self, state: PrState) {
        self.scripted_states.borrow_mut().push_back(Ok(state));
    }

    /// Queue a failure for the next `pr_state` call.
    pub fn script_state_error(&self, message: &str) {
        self.scripted_states
            .borrow_mut()
            .push_back(Err(Error::UnexpectedOutput {
                command: "fake pr view".to_string(),
                message: message.to_string(),
            }));
    }

    pub fn set_checks(&self, checks: Vec<CheckRun>) {
        *self.checks.borrow_mut() = checks;
    }

    pub fn fail_auto_merge(&self) {
        self.fail_auto_merge.set(true);
    }

    /// Every PR ever created or seeded.
    pub fn prs(&self) -> Vec<FakePr> {
        self.prs.borrow().clone()
    }

    /// Open PR for `head`, if any.
    pub fn open_pr(&self, head: &str) -> Option<FakePr> {
        self.prs
            .borrow()
            .iter()
            .find(|pr| pr.head == head && pr.state == PrState::Open)
            .cloned()
    }

    /// Method names in call order, e.g. `["create_pr", "pr_state"]`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls.borrow().iter().filter(|c| *c == method).count()
    }

    /// Auto-merge requests as `(pr_ref, method, delete_branch)`.
    pub fn auto_merge_requests(&self) -> Vec<(String, MergeMethod, bool)> {
        self.auto_merge.borrow().clone()
    }

    fn record(&self, method: &str) {
        self.calls.borrow_mut().push(method.to_string());
    }

    fn push_pr(&self, head: &str, title: &str, body: &str) -> String {
        let mut prs = self.prs.borrow_mut();
        let url = format!("https://github.com/org/dest/pull/{}", prs.len() + 1);
        prs.push(FakePr {
            head: head.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            labels: Vec::new(),
            reviewers: Vec::new(),
            assignees: Vec::new(),
            state: PrState::Open,
            url: url.clone(),
        });
        url
    }

    fn find(&self, pr_ref: &str) -> Option<usize> {
        let prs = self.prs.borrow();
        prs.iter()
            .rposition(|pr| pr.url == pr_ref || (pr.head == pr_ref && pr.state == PrState::Open))
            .or_else(|| prs.iter().rposition(|pr| pr.head == pr_ref))
    }

    fn not_found(pr_ref: &str) -> Error {
        Error::PullRequestNotFound {
            head: pr_ref.to_string(),
        }
    }
}

impl ReviewHost for FakeHost {
    fn create_pr(&self, _repo: &Path, request: &PrRequest) -> Result<CreateOutcome> {
        self.record("create_pr");
        if self.open_pr(&request.head).is_some() {
            return Ok(CreateOutcome::AlreadyExists);
        }
        let url = self.push_pr(&request.head, &request.title, &request.body);
        if let Some(pr) = self.prs.borrow_mut().last_mut() {
            pr.labels = request.labels.clone();
            pr.reviewers = request.reviewers.clone();
            pr.assignees = request.assignees.clone();
        }
        Ok(CreateOutcome::Created { url })
    }

    fn update_pr_body(&self, _repo: &Path, head: &str, body: &str) -> Result<()> {
        self.record("update_pr_body");
        let mut prs = self.prs.borrow_mut();
        let pr = prs
            .iter_mut()
            .find(|pr| pr.head == head && pr.state == PrState::Open)
            .ok_or_else(|| Self::not_found(head))?;
        pr.body = body.to_string();
        Ok(())
    }

    fn open_pr_body(&self, _repo: &Path, head: &str) -> Result<Option<String>> {
        self.record("open_pr_body");
        Ok(self.open_pr(head).map(|pr| pr.body))
    }

    fn close_pr(&self, _repo: &Path, head: &str, comment: &str) -> Result<()> {
        self.record("close_pr");
        let mut prs = self.prs.borrow_mut();
        let pr = prs
            .iter_mut()
            .find(|pr| pr.head == head && pr.state == PrState::Open)
            .ok_or_else(|| Self::not_found(head))?;
        pr.state = PrState::Closed;
        pr.body.push_str(&format!("\n\n> {comment}"));
        Ok(())
    }

    fn pr_state(&self, _repo: &Path, pr_ref: &str) -> Result<PrState> {
        self.record("pr_state");
        if let Some(scripted) = self.scripted_states.borrow_mut().pop_front() {
            return scripted;
        }
        let idx = self.find(pr_ref).ok_or_else(|| Self::not_found(pr_ref))?;
        Ok(self.prs.borrow()[idx].state)
    }

    fn pr_url(&self, _repo: &Path, pr_ref: &str) -> Result<Option<String>> {
        self.record("pr_url");
        Ok(self.find(pr_ref).map(|idx| self.prs.borrow()[idx].url.clone()))
    }

    fn pr_checks(&self, _repo: &Path, _pr_ref: &str) -> Result<Vec<CheckRun>> {
        self.record("pr_checks");
        Ok(self.checks.borrow().clone())
    }

    fn enable_auto_merge(
        &self,
        _repo: &Path,
        pr_ref: &str,
        method: MergeMethod,
        delete_branch: bool,
    ) -> Result<()> {
        self.record("enable_auto_merge");
        if self.fail_auto_merge.get() {
            return Err(Error::CommandFailed {
                command: "fake pr merge".to_string(),
                code: Some(1),
                stderr: "auto-merge is not allowed for this repository".to_string(),
            });
        }
        self.auto_merge
            .borrow_mut()
            .push((pr_ref.to_string(), method, delete_branch));
        Ok(())
    }
}
