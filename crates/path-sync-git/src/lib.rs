//! Version-control operations for path-sync
//!
//! The sync engine talks to destination and source repositories through the
//! [`Vcs`] trait. [`GitRepo`] implements it on top of `git2`.

pub mod auth;
pub mod commits;
pub mod error;
pub mod repo;
pub mod vcs;

pub use commits::CommitStamp;
pub use error::{Error, Result};
pub use repo::GitRepo;
pub use vcs::{BOT_EMAIL, BOT_NAME, Vcs};
