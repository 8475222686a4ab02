//! Deadline marker embedded in PR comments.
//!
//! The marker is the only durable record of a grace period, so its textual shape
//! `<!-- low-effort-deadline:<RFC 3339 timestamp> -->` must stay stable across releases.

use crate::domain::model::IssueComment;
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use std::sync::LazyLock;

pub const MARKER_KEY: &str = "low-effort-deadline";

static MARKER_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<!--\s*low-effort-deadline:").expect("marker prefix pattern is valid")
});

/// Renders the marker for `deadline`, keeping millisecond precision.
pub fn embed(deadline: DateTime<Utc>) -> String {
    format!(
        "<!-- {}:{} -->",
        MARKER_KEY,
        deadline.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

/// Last marker in `body`: its raw value and whether it was closed by `-->`.
///
/// A marker is recognised by its opening `<!-- low-effort-deadline:` alone; the value
/// runs to the closing `-->` or the end of the line, whichever comes first.
fn marker_value(body: &str) -> Option<(&str, bool)> {
    let prefix = MARKER_PREFIX.find_iter(body).last()?;
    let rest = &body[prefix.end()..];
    let line = rest.split('\n').next().unwrap_or_default();

    Some(match line.find("-->") {
        Some(end) => (line[..end].trim(), true),
        None => (line.trim(), false),
    })
}

/// Raw timestamp text of the last marker in `body`, if any.
pub fn find_marker(body: &str) -> Option<&str> {
    marker_value(body).map(|(raw, _)| raw)
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// What the comment log says about a PR's deadline.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedDeadline {
    /// No comment carries a marker.
    Absent,
    /// The newest marker holds a valid timestamp.
    Valid(DateTime<Utc>),
    /// The newest marker exists but is unterminated or its timestamp does not parse.
    Malformed(String),
}

/// Scans newest to oldest; the most recent marker is authoritative, older ones are ignored
/// even when the newest is malformed.
pub fn latest_deadline(comments: &[IssueComment]) -> RecordedDeadline {
    let Some((raw, closed)) = comments.iter().rev().find_map(|c| marker_value(&c.body)) else {
        return RecordedDeadline::Absent;
    };

    match parse_timestamp(raw) {
        Some(deadline) if closed => RecordedDeadline::Valid(deadline),
        _ => RecordedDeadline::Malformed(raw.to_string()),
    }
}
