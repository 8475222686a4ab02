//! Periodic sweep that closes flagged pull requests whose grace period ran out.
//!
//! There is no store: each PR's deadline is recovered from its comment log on every
//! sweep, so running the sweep twice in a row is harmless.

use crate::config::grace::GraceHours;
use crate::core::classifier::NEEDS_JUSTIFICATION_LABEL;
use crate::core::comments;
use crate::core::deadline::{self, RecordedDeadline};
use crate::domain::model::{CommitInfo, IssueComment, PullRequest};
use crate::domain::ports::PullRequestPlatform;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};

pub const CLOSED_LABEL: &str = "closed-low-effort";

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NotFlagged,
    /// The newest marker holds a future deadline.
    DeadlinePending(DateTime<Utc>),
    /// No marker; `updated_at + grace` is still ahead.
    FallbackPending(DateTime<Utc>),
    /// A commit authored inside the grace window.
    RecentActivity(DateTime<Utc>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReapDecision {
    Skip(SkipReason),
    Close,
}

/// Deadline check alone. `None` means no valid future deadline exists and the
/// PR is eligible pending the activity check. Malformed markers count as expired.
pub fn pending_deadline(
    pull_request: &PullRequest,
    comments: &[IssueComment],
    now: DateTime<Utc>,
    grace: GraceHours,
) -> Option<SkipReason> {
    match deadline::latest_deadline(comments) {
        RecordedDeadline::Valid(deadline) if deadline > now => {
            Some(SkipReason::DeadlinePending(deadline))
        }
        RecordedDeadline::Valid(_) => None,
        RecordedDeadline::Malformed(raw) => {
            tracing::warn!(
                "PR #{} has an unreadable deadline marker '{}', treating it as expired",
                pull_request.number,
                raw
            );
            None
        }
        RecordedDeadline::Absent => {
            let fallback = pull_request.updated_at + grace.as_duration();
            (fallback > now).then_some(SkipReason::FallbackPending(fallback))
        }
    }
}

/// Newest commit authored strictly after `now - grace`.
pub fn recent_activity(
    commits: &[CommitInfo],
    now: DateTime<Utc>,
    grace: GraceHours,
) -> Option<DateTime<Utc>> {
    let cutoff = now - grace.as_duration();
    commits
        .iter()
        .filter_map(|c| c.authored_at)
        .filter(|at| *at > cutoff)
        .max()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepSummary {
    pub examined: usize,
    pub closed: Vec<u64>,
    pub skipped: Vec<(u64, SkipReason)>,
}

impl SweepSummary {
    /// Flagged PRs looked at, excluding the ones without the label.
    pub fn flagged(&self) -> usize {
        self.closed.len()
            + self
                .skipped
                .iter()
                .filter(|(_, reason)| *reason != SkipReason::NotFlagged)
                .count()
    }
}

pub struct Reaper<P: PullRequestPlatform> {
    platform: P,
    grace: GraceHours,
    dry_run: bool,
}

impl<P: PullRequestPlatform> Reaper<P> {
    pub fn new(platform: P, grace: GraceHours) -> Self {
        Self {
            platform,
            grace,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// One pass over every open PR. PRs are handled one at a time and
    /// independently; the first platform error aborts the sweep.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<SweepSummary> {
        let pull_requests = self.platform.list_open_pull_requests().await?;
        tracing::info!("Sweeping {} open pull request(s)", pull_requests.len());

        let mut summary = SweepSummary {
            examined: pull_requests.len(),
            ..SweepSummary::default()
        };

        for pull_request in &pull_requests {
            match self.reap(pull_request, now).await? {
                ReapDecision::Close => summary.closed.push(pull_request.number),
                ReapDecision::Skip(reason) => summary.skipped.push((pull_request.number, reason)),
            }
        }

        tracing::info!(
            examined = summary.examined,
            flagged = summary.flagged(),
            closed = summary.closed.len(),
            "Sweep finished"
        );
        Ok(summary)
    }

    /// Decides and, when due, closes a single PR. Commits are only fetched once
    /// the deadline has passed.
    pub async fn reap(&self, pull_request: &PullRequest, now: DateTime<Utc>) -> Result<ReapDecision> {
        let number = pull_request.number;
        if !pull_request.has_label(NEEDS_JUSTIFICATION_LABEL) {
            return Ok(ReapDecision::Skip(SkipReason::NotFlagged));
        }

        let comments = self.platform.list_comments(number).await?;
        if let Some(reason) = pending_deadline(pull_request, &comments, now, self.grace) {
            tracing::info!("PR #{} skipped: {:?}", number, reason);
            return Ok(ReapDecision::Skip(reason));
        }

        let commits = self.platform.list_commits(number).await?;
        if let Some(at) = recent_activity(&commits, now, self.grace) {
            tracing::info!("PR #{} skipped: commit authored at {}", number, at);
            return Ok(ReapDecision::Skip(SkipReason::RecentActivity(at)));
        }

        self.close(number).await?;
        Ok(ReapDecision::Close)
    }

    async fn close(&self, number: u64) -> Result<()> {
        if self.dry_run {
            tracing::info!("[dry-run] Would close PR #{}", number);
            return Ok(());
        }

        self.platform
            .create_comment(number, &comments::closure(self.grace))
            .await?;
        self.platform.add_labels(number, &[CLOSED_LABEL]).await?;
        self.platform.close_pull_request(number).await?;
        tracing::info!("Closed PR #{} as low-effort", number);
        Ok(())
    }
}
