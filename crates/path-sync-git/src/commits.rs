//! Commit identity and timestamp extraction.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use git2::Commit;

use crate::{Error, Result};

/// Identity of a commit as recorded in pull-request metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitStamp {
    /// Full hex object id
    pub sha: String,
    /// Committer timestamp in the committer's offset
    pub timestamp: DateTime<FixedOffset>,
}

impl CommitStamp {
    pub fn from_commit(commit: &Commit<'_>) -> Result<Self> {
        let sha = commit.id().to_string();
        let time = commit.time();
        let offset = FixedOffset::east_opt(time.offset_minutes() * 60).unwrap_or_else(|| Utc.fix());
        let timestamp = DateTime::from_timestamp(time.seconds(), 0)
            .ok_or_else(|| Error::InvalidTimestamp { sha: sha.clone() })?
            .with_timezone(&offset);
        Ok(Self { sha, timestamp })
    }

    /// First 8 hex characters of the sha.
    pub fn short_sha(&self) -> &str {
        &self.sha[..self.sha.len().min(8)]
    }

    /// RFC 3339 rendering used in PR metadata.
    pub fn timestamp_rfc3339(&self) -> String {
        self.timestamp.to_rfc3339()
    }
}
