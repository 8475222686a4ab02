use crate::domain::model::{ChangedFile, CommitInfo, IssueComment, PullRequest};
use crate::domain::ports::{ConfigProvider, PullRequestPlatform};
use crate::utils::error::{GateError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

const PER_PAGE: usize = 100;
const USER_AGENT: &str = concat!("effort-gate/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct GhUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GhLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GhPullRequest {
    number: u64,
    title: String,
    body: Option<String>,
    user: Option<GhUser>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    labels: Vec<GhLabel>,
}

impl From<GhPullRequest> for PullRequest {
    fn from(pr: GhPullRequest) -> Self {
        Self {
            number: pr.number,
            title: pr.title,
            body: pr.body.unwrap_or_default(),
            author: pr.user.map(|u| u.login).unwrap_or_default(),
            created_at: pr.created_at,
            updated_at: pr.updated_at,
            labels: pr.labels.into_iter().map(|l| l.name).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GhComment {
    id: u64,
    body: Option<String>,
    user: Option<GhUser>,
    created_at: DateTime<Utc>,
}

impl From<GhComment> for IssueComment {
    fn from(c: GhComment) -> Self {
        Self {
            id: c.id,
            author: c.user.map(|u| u.login).unwrap_or_default(),
            body: c.body.unwrap_or_default(),
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GhSignature {
    date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct GhCommitDetail {
    author: Option<GhSignature>,
}

#[derive(Debug, Deserialize)]
struct GhCommit {
    sha: String,
    commit: GhCommitDetail,
}

impl From<GhCommit> for CommitInfo {
    fn from(c: GhCommit) -> Self {
        Self {
            sha: c.sha,
            authored_at: c.commit.author.and_then(|a| a.date),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GhSearchResult {
    total_count: u64,
}

#[derive(Debug, Deserialize)]
struct PullRequestEvent {
    pull_request: Option<GhPullRequest>,
}

/// Reads the pull request out of a `pull_request` / `pull_request_target` webhook payload.
pub fn pull_request_from_event(payload: &str) -> Result<PullRequest> {
    let event: PullRequestEvent = serde_json::from_str(payload)?;
    event
        .pull_request
        .map(PullRequest::from)
        .ok_or_else(|| GateError::PayloadError {
            message: "event has no pull_request object".to_string(),
        })
}

/// GitHub REST implementation of [`PullRequestPlatform`] for one repository.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_url: String,
    owner: String,
    repo: String,
    token: String,
}

impl GitHubClient {
    pub fn new(api_url: &str, repository: &str, token: &str) -> Result<Self> {
        let (owner, repo) =
            repository
                .split_once('/')
                .ok_or_else(|| GateError::InvalidConfigValueError {
                    field: "repository".to_string(),
                    value: repository.to_string(),
                    reason: "Expected the form owner/name".to_string(),
                })?;

        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            token: token.to_string(),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(config.api_url(), config.repository(), config.token())
    }

    fn repo_url(&self, path: &str) -> String {
        format!("{}/repos/{}/{}{}", self.api_url, self.owner, self.repo, path)
    }

    /// Day-granular on purpose: `created:>=` only takes a date here.
    fn search_query(&self, author: &str, since: NaiveDate) -> String {
        format!(
            "repo:{}/{} is:pr author:{} created:>={}",
            self.owner,
            self.repo,
            author,
            since.format("%Y-%m-%d")
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    async fn send(&self, method: Method, url: &str, builder: RequestBuilder) -> Result<reqwest::Response> {
        tracing::debug!("{} {}", method, url);
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GateError::HttpStatus {
                method: method.to_string(),
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        let builder = self.request(Method::GET, url).query(query);
        let response = self.send(Method::GET, url, builder).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn write_json(&self, method: Method, url: &str, payload: serde_json::Value) -> Result<()> {
        let builder = self.request(method.clone(), url).json(&payload);
        self.send(method, url, builder).await?;
        Ok(())
    }

    /// Follows `page=N` until a page comes back short.
    async fn paginate<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<T>> {
        let url = self.repo_url(path);
        let mut items = Vec::new();
        let mut page = 1usize;

        loop {
            let mut params: Vec<(&str, String)> =
                query.iter().map(|(k, v)| (*k, v.to_string())).collect();
            params.push(("per_page", PER_PAGE.to_string()));
            params.push(("page", page.to_string()));

            let batch: Vec<T> = self.get_json(&url, &params).await?;
            let last = batch.len() < PER_PAGE;
            items.extend(batch);

            if last {
                break;
            }
            page += 1;
        }

        tracing::debug!("Fetched {} item(s) from {} in {} page(s)", items.len(), path, page);
        Ok(items)
    }
}

#[async_trait]
impl PullRequestPlatform for GitHubClient {
    async fn list_open_pull_requests(&self) -> Result<Vec<PullRequest>> {
        let pulls: Vec<GhPullRequest> = self.paginate("/pulls", &[("state", "open")]).await?;
        Ok(pulls.into_iter().map(PullRequest::from).collect())
    }

    async fn get_pull_request(&self, number: u64) -> Result<PullRequest> {
        let pr: GhPullRequest = self
            .get_json(&self.repo_url(&format!("/pulls/{}", number)), &[])
            .await?;
        Ok(pr.into())
    }

    async fn list_files(&self, number: u64) -> Result<Vec<ChangedFile>> {
        self.paginate(&format!("/pulls/{}/files", number), &[]).await
    }

    async fn list_comments(&self, number: u64) -> Result<Vec<IssueComment>> {
        let comments: Vec<GhComment> = self
            .paginate(&format!("/issues/{}/comments", number), &[])
            .await?;
        Ok(comments.into_iter().map(IssueComment::from).collect())
    }

    async fn list_commits(&self, number: u64) -> Result<Vec<CommitInfo>> {
        let commits: Vec<GhCommit> = self
            .paginate(&format!("/pulls/{}/commits", number), &[])
            .await?;
        Ok(commits.into_iter().map(CommitInfo::from).collect())
    }

    async fn count_pull_requests_by_author_since(
        &self,
        author: &str,
        since: NaiveDate,
    ) -> Result<u64> {
        let q = self.search_query(author, since);
        let url = format!("{}/search/issues", self.api_url);
        let result: GhSearchResult = self
            .get_json(&url, &[("q", q), ("per_page", "1".to_string())])
            .await?;
        Ok(result.total_count)
    }

    async fn create_comment(&self, number: u64, body: &str) -> Result<()> {
        let url = self.repo_url(&format!("/issues/{}/comments", number));
        self.write_json(Method::POST, &url, json!({ "body": body }))
            .await
    }

    async fn add_labels(&self, number: u64, labels: &[&str]) -> Result<()> {
        let url = self.repo_url(&format!("/issues/{}/labels", number));
        self.write_json(Method::POST, &url, json!({ "labels": labels }))
            .await
    }

    async fn close_pull_request(&self, number: u64) -> Result<()> {
        let url = self.repo_url(&format!("/pulls/{}", number));
        self.write_json(Method::PATCH, &url, json!({ "state": "closed" }))
            .await
    }
}
