use crate::config::grace::GraceHours;
use crate::domain::model::{ChangedFile, CommitInfo, IssueComment, PullRequest};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// The hosting platform as seen by the classifier and the reaper.
///
/// List operations return every page; implementations hide pagination.
#[async_trait]
pub trait PullRequestPlatform: Send + Sync {
    async fn list_open_pull_requests(&self) -> Result<Vec<PullRequest>>;
    async fn get_pull_request(&self, number: u64) -> Result<PullRequest>;
    async fn list_files(&self, number: u64) -> Result<Vec<ChangedFile>>;
    /// Oldest first.
    async fn list_comments(&self, number: u64) -> Result<Vec<IssueComment>>;
    async fn list_commits(&self, number: u64) -> Result<Vec<CommitInfo>>;
    /// PRs in this repository opened by `author` on or after `since` (a calendar date).
    async fn count_pull_requests_by_author_since(&self, author: &str, since: NaiveDate)
        -> Result<u64>;

    async fn create_comment(&self, number: u64, body: &str) -> Result<()>;
    async fn add_labels(&self, number: u64, labels: &[&str]) -> Result<()>;
    async fn close_pull_request(&self, number: u64) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn repository(&self) -> &str;
    fn api_url(&self) -> &str;
    fn token(&self) -> &str;
    fn grace_hours(&self) -> GraceHours;
    fn dry_run(&self) -> bool;
}
