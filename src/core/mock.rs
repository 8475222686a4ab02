//! In-memory platform used by the unit tests of the classifier and the reaper.

use crate::domain::model::{ChangedFile, CommitInfo, IssueComment, PullRequest};
use crate::domain::ports::PullRequestPlatform;
use crate::utils::error::{GateError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Comment { number: u64, body: String },
    Labels { number: u64, labels: Vec<String> },
    Close { number: u64 },
}

#[derive(Default)]
struct State {
    pull_requests: Vec<PullRequest>,
    files: HashMap<u64, Vec<ChangedFile>>,
    comments: HashMap<u64, Vec<IssueComment>>,
    commits: HashMap<u64, Vec<CommitInfo>>,
    recent_pr_count: Option<u64>,
    calls: Vec<Call>,
}

#[derive(Clone, Default)]
pub struct MockPlatform {
    state: Arc<Mutex<State>>,
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub fn pull_request(number: u64, title: &str, body: &str, labels: &[&str]) -> PullRequest {
    PullRequest {
        number,
        title: title.to_string(),
        body: body.to_string(),
        author: "contributor".to_string(),
        created_at: at(2024, 3, 1, 0),
        updated_at: at(2024, 3, 1, 0),
        labels: labels.iter().map(|l| l.to_string()).collect(),
    }
}

pub fn file(filename: &str, additions: u64, deletions: u64) -> ChangedFile {
    ChangedFile {
        filename: filename.to_string(),
        additions,
        deletions,
        changes: additions + deletions,
    }
}

pub fn commit(sha: &str, authored_at: DateTime<Utc>) -> CommitInfo {
    CommitInfo {
        sha: sha.to_string(),
        authored_at: Some(authored_at),
    }
}

pub fn comment(id: u64, body: &str, created_at: DateTime<Utc>) -> IssueComment {
    IssueComment {
        id,
        author: "effort-gate[bot]".to_string(),
        body: body.to_string(),
        created_at,
    }
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_pull_request(&self, pr: PullRequest) {
        self.state.lock().await.pull_requests.push(pr);
    }

    pub async fn set_files(&self, number: u64, files: Vec<ChangedFile>) {
        self.state.lock().await.files.insert(number, files);
    }

    pub async fn set_comments(&self, number: u64, comments: Vec<IssueComment>) {
        self.state.lock().await.comments.insert(number, comments);
    }

    pub async fn set_commits(&self, number: u64, commits: Vec<CommitInfo>) {
        self.state.lock().await.commits.insert(number, commits);
    }

    /// `None` makes the search lookup fail.
    pub async fn set_recent_pr_count(&self, count: Option<u64>) {
        self.state.lock().await.recent_pr_count = count;
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.state.lock().await.calls.clone()
    }
}

#[async_trait]
impl PullRequestPlatform for MockPlatform {
    async fn list_open_pull_requests(&self) -> Result<Vec<PullRequest>> {
        Ok(self.state.lock().await.pull_requests.clone())
    }

    async fn get_pull_request(&self, number: u64) -> Result<PullRequest> {
        let state = self.state.lock().await;
        state
            .pull_requests
            .iter()
            .find(|pr| pr.number == number)
            .cloned()
            .ok_or_else(|| GateError::HttpStatus {
                method: "GET".to_string(),
                url: format!("/pulls/{}", number),
                status: 404,
                body: String::new(),
            })
    }

    async fn list_files(&self, number: u64) -> Result<Vec<ChangedFile>> {
        let state = self.state.lock().await;
        Ok(state.files.get(&number).cloned().unwrap_or_default())
    }

    async fn list_comments(&self, number: u64) -> Result<Vec<IssueComment>> {
        let state = self.state.lock().await;
        Ok(state.comments.get(&number).cloned().unwrap_or_default())
    }

    async fn list_commits(&self, number: u64) -> Result<Vec<CommitInfo>> {
        let state = self.state.lock().await;
        Ok(state.commits.get(&number).cloned().unwrap_or_default())
    }

    async fn count_pull_requests_by_author_since(
        &self,
        _author: &str,
        _since: NaiveDate,
    ) -> Result<u64> {
        self.state
            .lock()
            .await
            .recent_pr_count
            .ok_or_else(|| GateError::HttpStatus {
                method: "GET".to_string(),
                url: "/search/issues".to_string(),
                status: 403,
                body: "rate limited".to_string(),
            })
    }

    async fn create_comment(&self, number: u64, body: &str) -> Result<()> {
        self.state.lock().await.calls.push(Call::Comment {
            number,
            body: body.to_string(),
        });
        Ok(())
    }

    async fn add_labels(&self, number: u64, labels: &[&str]) -> Result<()> {
        self.state.lock().await.calls.push(Call::Labels {
            number,
            labels: labels.iter().map(|l| l.to_string()).collect(),
        });
        Ok(())
    }

    async fn close_pull_request(&self, number: u64) -> Result<()> {
        self.state.lock().await.calls.push(Call::Close { number });
        Ok(())
    }
}
