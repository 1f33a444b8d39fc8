//! GitHub REST API client for assignment operations

use crate::error::{Error, Result};
use crate::traits::PlatformApi;
use crate::types::EventContext;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

const DEFAULT_API_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const PER_PAGE: usize = 100;
const MAX_PAGES: u32 = 100;

#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: String,
}

/// Subset of the issue object we read
#[derive(Debug, Deserialize)]
struct GitHubIssue {
    #[serde(default)]
    assignees: Vec<GitHubUser>,
}

/// Subset of the pull request object we read
#[derive(Debug, Deserialize)]
struct GitHubPullRequest {
    #[serde(default)]
    assignees: Vec<GitHubUser>,
    #[serde(default)]
    requested_reviewers: Vec<GitHubUser>,
}

#[derive(Debug, Serialize)]
struct AssigneesBody<'a> {
    assignees: &'a [String],
}

#[derive(Debug, Serialize)]
struct ReviewersBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    reviewers: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    team_reviewers: Option<&'a [String]>,
}

#[derive(Debug, Deserialize)]
struct GitHubErrorBody {
    message: String,
}

fn user_logins(users: Vec<GitHubUser>) -> Vec<String> {
    users.into_iter().map(|u| u.login).collect()
}

/// GitHub API client for issue, pull request and team endpoints
pub struct GitHubApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl std::fmt::Debug for GitHubApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubApiClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl GitHubApiClient {
    /// Create a new GitHub API client
    pub fn new(base_url: String, token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("auto-assign/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Create from environment variables
    ///
    /// `GITHUB_API_URL` selects the API host (GitHub Enterprise Server sets
    /// it); an explicit `token` wins over `GITHUB_TOKEN`.
    pub fn from_env(token: Option<String>) -> Result<Self> {
        let base_url = std::env::var("GITHUB_API_URL")
            .ok()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let token = token
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var("GITHUB_TOKEN").ok());

        Ok(Self::new(base_url, token))
    }

    /// API host this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);

        if let Some(ref token) = self.token {
            request = request.header("Authorization", format!("Bearer {}", token.trim()));
        }

        request
    }

    /// Send a request and turn non-success statuses into errors
    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            let remaining = response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            if remaining.as_deref() == Some("0") {
                return Err(Error::RateLimitExceeded(format!(
                    "GitHub API rate limit exceeded while trying to {}",
                    what
                )));
            }
        }

        let detail = response
            .json::<GitHubErrorBody>()
            .await
            .map(|b| b.message)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown").to_string());

        Err(Error::Api {
            status: status.as_u16(),
            message: format!("{}: {}", what, detail),
        })
    }

    fn issue_path(target: &EventContext) -> String {
        format!(
            "/repos/{}/{}/issues/{}",
            target.owner, target.repo, target.number
        )
    }

    fn pull_path(target: &EventContext) -> String {
        format!(
            "/repos/{}/{}/pulls/{}",
            target.owner, target.repo, target.number
        )
    }

    async fn request_reviews(&self, target: &EventContext, body: ReviewersBody<'_>) -> Result<()> {
        let path = format!("{}/requested_reviewers", Self::pull_path(target));
        let request = self.request(Method::POST, &path).json(&body);
        self.send(request, "request reviewers").await?;
        Ok(())
    }
}

impl PlatformApi for GitHubApiClient {
    async fn issue_assignees<'a>(&'a self, target: &'a EventContext) -> Result<Vec<String>> {
        let request = self.request(Method::GET, &Self::issue_path(target));
        let issue: GitHubIssue = self.send(request, "get issue").await?.json().await?;
        Ok(user_logins(issue.assignees))
    }

    async fn pull_request_assignees_and_reviewers<'a>(
        &'a self,
        target: &'a EventContext,
    ) -> Result<(Vec<String>, Vec<String>)> {
        let request = self.request(Method::GET, &Self::pull_path(target));
        let pr: GitHubPullRequest = self.send(request, "get pull request").await?.json().await?;
        Ok((user_logins(pr.assignees), user_logins(pr.requested_reviewers)))
    }

    async fn add_assignees<'a>(&'a self, target: &'a EventContext, logins: &'a [String]) -> Result<()> {
        let path = format!("{}/assignees", Self::issue_path(target));
        let request = self
            .request(Method::POST, &path)
            .json(&AssigneesBody { assignees: logins });
        self.send(request, "add assignees").await?;
        Ok(())
    }

    async fn remove_assignees<'a>(
        &'a self,
        target: &'a EventContext,
        logins: &'a [String],
    ) -> Result<()> {
        let path = format!("{}/assignees", Self::issue_path(target));
        let request = self
            .request(Method::DELETE, &path)
            .json(&AssigneesBody { assignees: logins });
        self.send(request, "remove assignees").await?;
        Ok(())
    }

    async fn add_reviewers<'a>(&'a self, target: &'a EventContext, logins: &'a [String]) -> Result<()> {
        self.request_reviews(
            target,
            ReviewersBody {
                reviewers: Some(logins),
                team_reviewers: None,
            },
        )
        .await
    }

    async fn add_team_reviewers<'a>(
        &'a self,
        target: &'a EventContext,
        team_slugs: &'a [String],
    ) -> Result<()> {
        self.request_reviews(
            target,
            ReviewersBody {
                reviewers: None,
                team_reviewers: Some(team_slugs),
            },
        )
        .await
    }

    async fn remove_reviewers<'a>(
        &'a self,
        target: &'a EventContext,
        logins: &'a [String],
    ) -> Result<()> {
        let path = format!("{}/requested_reviewers", Self::pull_path(target));
        let body = ReviewersBody {
            reviewers: Some(logins),
            team_reviewers: None,
        };
        let request = self.request(Method::DELETE, &path).json(&body);
        self.send(request, "remove reviewers").await?;
        Ok(())
    }

    async fn team_members<'a>(&'a self, org: &'a str, team_slug: &'a str) -> Result<Vec<String>> {
        let path = format!("/orgs/{}/teams/{}/members", org, team_slug);
        let what = format!("list members of team {}", team_slug);
        let mut members = Vec::new();
        let mut page = 1;

        // Paginate until a short page (GitHub returns max 100 per page)
        loop {
            let request = self
                .request(Method::GET, &path)
                .query(&[("per_page", PER_PAGE.to_string()), ("page", page.to_string())]);
            let users: Vec<GitHubUser> = self.send(request, &what).await?.json().await?;
            let count = users.len();
            members.extend(user_logins(users));

            if count < PER_PAGE {
                break;
            }
            page += 1;
            if page > MAX_PAGES {
                return Err(Error::Runtime(format!(
                    "Too many pages listing members of team {}",
                    team_slug
                )));
            }
        }

        Ok(members)
    }

    async fn check_assignable<'a>(&'a self, target: &'a EventContext, login: &'a str) -> Result<()> {
        let path = format!("{}/assignees/{}", Self::issue_path(target), login);
        let request = self.request(Method::GET, &path);
        self.send(request, &format!("check assignee {}", login)).await?;
        Ok(())
    }
}
