//! GitHub issue tracker client.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{CreatedIssue, IssueDraft};
use crate::tracker::IssueTracker;

pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Where issues are filed and with which credentials
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub token: String,
    pub owner: String,
    pub repo: String,
    /// API root, without trailing slash
    pub api_url: String,
}

impl TrackerConfig {
    pub fn new(token: impl Into<String>, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
            api_url: GITHUB_API_URL.to_string(),
        }
    }

    /// Read `GITHUB_TOKEN` plus either `REPO_OWNER`/`REPO_NAME` or `GITHUB_REPO=owner/name`
    pub fn from_env() -> Result<Self> {
        Self::from_env_for(None)
    }

    /// Like [`from_env`](Self::from_env), but an explicit `owner/name` wins over the
    /// repository variables
    pub fn from_env_for(repo_slug: Option<&str>) -> Result<Self> {
        let token =
            std::env::var("GITHUB_TOKEN").context("GITHUB_TOKEN environment variable not set")?;

        let (owner, repo) = match repo_slug {
            Some(slug) => parse_repo_slug(slug)?,
            None => match (std::env::var("REPO_OWNER"), std::env::var("REPO_NAME")) {
                (Ok(owner), Ok(repo)) => (owner, repo),
                _ => {
                    let full = std::env::var("GITHUB_REPO")
                        .context("set REPO_OWNER and REPO_NAME, or GITHUB_REPO=owner/name")?;
                    parse_repo_slug(&full)?
                }
            },
        };

        let mut config = Self::new(token, owner, repo);
        if let Ok(api_url) = std::env::var("GITHUB_API_URL") {
            config.api_url = api_url.trim_end_matches('/').to_string();
        }
        Ok(config)
    }

    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Split `owner/name`
pub fn parse_repo_slug(slug: &str) -> Result<(String, String)> {
    match slug.trim().split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(anyhow!("Invalid repository '{slug}', expected owner/name")),
    }
}

/// GitHub REST client that files issues in one repository
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    config: TrackerConfig,
}

#[derive(Debug, Serialize)]
struct CreateIssueRequest<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct IssueResponse {
    number: u64,
    title: String,
    html_url: String,
}

impl GitHubClient {
    /// Create a new GitHub client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: TrackerConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("prdflow/0.1"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }
}

#[async_trait]
impl IssueTracker for GitHubClient {
    async fn create_issue(&self, draft: &IssueDraft) -> Result<CreatedIssue> {
        if !draft.has_title() {
            return Err(anyhow!("Refusing to create an issue without a title"));
        }

        let url = format!(
            "{}/repos/{}/{}/issues",
            self.config.api_url, self.config.owner, self.config.repo
        );
        let request = CreateIssueRequest {
            title: draft.title.trim(),
            body: &draft.body,
        };

        debug!("POST {url}");

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.config.token))
            .json(&request)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("GitHub API error: {status} - {body}"));
        }

        let issue: IssueResponse = response
            .json()
            .await
            .context("Failed to parse issue response")?;

        Ok(CreatedIssue {
            number: issue.number,
            title: issue.title,
            html_url: issue.html_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> GitHubClient {
        let mut config = TrackerConfig::new("ghp_test", "acme", "widgets");
        config.api_url = server.uri();
        GitHubClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_create_issue() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/widgets/issues"))
            .and(header("authorization", "Bearer ghp_test"))
            .and(header("accept", "application/vnd.github+json"))
            .and(body_json(serde_json::json!({"title": "Fix login bug", "body": "Steps"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "number": 42,
                "title": "Fix login bug",
                "html_url": "https://github.com/acme/widgets/issues/42",
                "state": "open"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let created = test_client(&server)
            .create_issue(&IssueDraft::new("Fix login bug", "Steps"))
            .await
            .unwrap();

        assert_eq!(created.number, 42);
        assert_eq!(created.html_url, "https://github.com/acme/widgets/issues/42");
    }

    #[tokio::test]
    async fn test_create_issue_reports_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .create_issue(&IssueDraft::new("Fix", ""))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Bad credentials"));
    }

    #[tokio::test]
    async fn test_blank_title_never_reaches_the_api() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let result = test_client(&server)
            .create_issue(&IssueDraft::new("  ", "body"))
            .await;

        assert!(result.is_err());
    }

    #[test]
    fn test_parse_repo_slug() {
        assert_eq!(
            parse_repo_slug("acme/widgets").unwrap(),
            ("acme".to_string(), "widgets".to_string())
        );
        assert!(parse_repo_slug("widgets").is_err());
        assert!(parse_repo_slug("/widgets").is_err());
        assert!(parse_repo_slug("a/b/c").is_err());
    }
}
