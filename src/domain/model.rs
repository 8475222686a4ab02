use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub labels: Vec<String>,
}

impl PullRequest {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    pub additions: u64,
    pub deletions: u64,
    pub changes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
    pub authored_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Everything the classifier looks at, captured once per evaluation.
#[derive(Debug, Clone)]
pub struct PullRequestSnapshot {
    pub pull_request: PullRequest,
    pub files: Vec<ChangedFile>,
    pub commits: Vec<CommitInfo>,
}

impl PullRequestSnapshot {
    pub fn total_additions(&self) -> u64 {
        self.files.iter().map(|f| f.additions).sum()
    }

    pub fn total_deletions(&self) -> u64 {
        self.files.iter().map(|f| f.deletions).sum()
    }

    pub fn total_changes(&self) -> u64 {
        self.files.iter().map(|f| f.changes).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
}

impl Severity {
    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Critical => "🔴",
            Severity::Warning => "🟡",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    MissingIssueLink,
    UnfilledTemplate,
    MissingExplanation,
    GenericExplanation,
    LockfileOnly,
    TrivialDocsChange,
    WhitespaceOnly,
    SingleWordChange,
    GenericTitle,
    BurstAuthoring,
}

impl IndicatorKind {
    /// Kinds that mark a PR low-effort on their own.
    pub fn is_low_effort_trigger(&self) -> bool {
        matches!(
            self,
            IndicatorKind::LockfileOnly
                | IndicatorKind::TrivialDocsChange
                | IndicatorKind::WhitespaceOnly
                | IndicatorKind::SingleWordChange
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub kind: IndicatorKind,
    pub severity: Severity,
    pub message: String,
}

impl Indicator {
    pub fn new(kind: IndicatorKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.severity.icon(), self.message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub indicators: Vec<Indicator>,
    pub is_low_effort: bool,
    pub needs_justification: bool,
}

impl Verdict {
    pub fn has(&self, kind: IndicatorKind) -> bool {
        self.indicators.iter().any(|i| i.kind == kind)
    }

    pub fn critical_count(&self) -> usize {
        self.indicators
            .iter()
            .filter(|i| i.severity == Severity::Critical)
            .count()
    }
}
