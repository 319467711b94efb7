//! Pull-request hosting backend for path-sync
//!
//! [`ReviewHost`] is the boundary to the code-review service. [`GhCli`]
//! implements it by shelling out to the GitHub CLI, which picks up
//! authentication from `GH_TOKEN` or its own login state.

pub mod checks;
pub mod error;
pub mod gh;
pub mod host;

pub use checks::{CheckRun, CheckStatus};
pub use error::{Error, Result};
pub use gh::{GhCli, PullRef, parse_pull_url};
pub use host::{CreateOutcome, MergeMethod, PrRequest, PrState, ReviewHost};
