//! Shared test utilities for the path-sync workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: repository fixtures, including a bare remote with a clone
//! - [`host`]: [`FakeHost`], an in-memory review host
//! - [`repo`]: [`TestRepo`] for writing and asserting on working-tree files

pub mod git;
pub mod host;
pub mod repo;

pub use host::FakeHost;
pub use repo::TestRepo;
