//! Idempotency gate
//!
//! Every PR body carries a hidden `<!-- path-sync: sha=<hex> ts=<time> -->`
//! line. When the open PR for a sync branch already reflects a source commit
//! at least as recent as the current one, the destination is skipped.

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use regex::Regex;

static METADATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<!-- path-sync: sha=([0-9a-f]+) ts=(\S+) -->").expect("valid metadata regex")
});

/// Metadata embedded in a PR description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncMetadata {
    pub sha: String,
    /// Timestamp exactly as written in the body
    pub ts: String,
}

impl SyncMetadata {
    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.ts)
    }
}

/// Render the metadata comment line.
pub fn format_sync_metadata(sha: &str, ts: &str) -> String {
    format!("<!-- path-sync: sha={sha} ts={ts} -->")
}

pub fn parse_sync_metadata(body: &str) -> Option<SyncMetadata> {
    let caps = METADATA_RE.captures(body)?;
    Some(SyncMetadata {
        sha: caps[1].to_string(),
        ts: caps[2].to_string(),
    })
}

/// RFC 3339 with offset, or a naive ISO 8601 timestamp taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Metadata of the open PR when it already covers `commit_ts`.
///
/// Missing bodies, missing metadata and unparseable timestamps all mean
/// "not synced yet".
pub fn pr_already_synced(
    body: Option<&str>,
    commit_ts: DateTime<FixedOffset>,
) -> Option<SyncMetadata> {
    let metadata = parse_sync_metadata(body?)?;
    let Some(pr_ts) = metadata.timestamp() else {
        tracing::warn!(ts = %metadata.ts, "Unparseable sync timestamp in PR body");
        return None;
    };
    (pr_ts >= commit_ts).then_some(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn commit_ts() -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2026, 3, 4, 10, 0, 0)
            .unwrap()
            .fixed_offset()
    }

    fn body_with(ts: &str) -> String {
        format!("{}\nSynced from x\n", format_sync_metadata("abc12345", ts))
    }

    #[test]
    fn parses_metadata_line() {
        let body = body_with("2026-03-04T10:00:00+00:00");
        assert_eq!(
            parse_sync_metadata(&body),
            Some(SyncMetadata {
                sha: "abc12345".into(),
                ts: "2026-03-04T10:00:00+00:00".into(),
            })
        );
    }

    #[test]
    fn equal_timestamp_counts_as_synced() {
        let body = body_with(&commit_ts().to_rfc3339());
        assert!(pr_already_synced(Some(&body), commit_ts()).is_some());
    }

    #[test]
    fn one_microsecond_earlier_is_not_synced() {
        let earlier = commit_ts() - Duration::microseconds(1);
        let body = body_with(&earlier.to_rfc3339());
        assert!(pr_already_synced(Some(&body), commit_ts()).is_none());
    }

    #[test]
    fn compares_instants_across_offsets() {
        let body = body_with("2026-03-04T12:00:00+02:00");
        assert!(pr_already_synced(Some(&body), commit_ts()).is_some());
    }

    #[rstest]
    #[case::no_body(None)]
    #[case::no_metadata(Some("plain description"))]
    #[case::bad_timestamp(Some("<!-- path-sync: sha=abc ts=yesterday -->"))]
    fn not_synced(#[case] body: Option<&str>) {
        assert!(pr_already_synced(body, commit_ts()).is_none());
    }

    #[test]
    fn naive_timestamps_are_utc() {
        assert_eq!(
            parse_timestamp("2026-03-04T10:00:00.000001"),
            Some(commit_ts() + Duration::microseconds(1))
        );
    }
}
