//! Event payload model and issue/PR context resolution
//!
//! A workflow can be triggered by an issue, a pull request, a workflow run
//! wrapping pull requests, or a classic project card pointing at an issue.
//! Only the fields needed to locate the target are modeled; everything else
//! in the payload is ignored.

use crate::error::{Error, Result};
use crate::types::{EventContext, TargetKind};
use serde::Deserialize;
use std::path::Path;

/// Minimal user object
#[derive(Debug, Clone, Deserialize)]
pub struct Actor {
    /// Login name
    pub login: String,
}

/// Repository the workflow runs in
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    /// `owner/repo`
    pub full_name: String,
}

/// Issue or pull request object from `issues` / `pull_request` events
#[derive(Debug, Clone, Deserialize)]
pub struct IssueLike {
    /// Issue or PR number
    pub number: u64,
    /// Author, absent in some synthetic payloads
    #[serde(default)]
    pub user: Option<Actor>,
}

/// Pull request reference inside a workflow run
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestRef {
    /// PR number
    pub number: u64,
}

/// `workflow_run` event body
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRun {
    /// Pull requests associated with the run
    #[serde(default)]
    pub pull_requests: Vec<PullRequestRef>,
    /// Who triggered the run
    #[serde(default)]
    pub actor: Option<Actor>,
}

/// `project_card` event body
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectCard {
    /// API or web URL of the linked issue, absent for note cards
    #[serde(default)]
    pub content_url: Option<String>,
}

/// Webhook payload as written to `GITHUB_EVENT_PATH`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    /// Repository the event belongs to
    #[serde(default)]
    pub repository: Option<Repository>,
    /// Present on `issues` and `issue_comment` events
    #[serde(default)]
    pub issue: Option<IssueLike>,
    /// Present on `pull_request` and `pull_request_target` events
    #[serde(default)]
    pub pull_request: Option<IssueLike>,
    /// Present on `workflow_run` events
    #[serde(default)]
    pub workflow_run: Option<WorkflowRun>,
    /// Present on `project_card` events
    #[serde(default)]
    pub project_card: Option<ProjectCard>,
}

/// The payload shape a target was found in, in resolution priority order
#[derive(Debug, Clone, Copy)]
pub enum EventSource<'a> {
    /// `issue` object
    Issue(&'a IssueLike),
    /// `pull_request` object
    PullRequest(&'a IssueLike),
    /// First pull request of a `workflow_run`
    WorkflowRun {
        /// PR the run was triggered for
        pull_request: &'a PullRequestRef,
        /// Run actor, treated as the PR author
        actor: Option<&'a Actor>,
    },
    /// Issue URL of a `project_card`
    ProjectCard(&'a str),
}

impl EventPayload {
    /// Parse a payload from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::EventParse(e.to_string()))
    }

    /// Read and parse a payload file
    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::EventParse(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    /// Read the payload of the current workflow run from `GITHUB_EVENT_PATH`
    pub async fn from_env() -> Result<Self> {
        let path = std::env::var("GITHUB_EVENT_PATH")
            .ok()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::EventParse("GITHUB_EVENT_PATH not set".to_string()))?;
        Self::from_path(path).await
    }

    /// Pick the first payload shape that names a target.
    ///
    /// A `workflow_run` without pull requests and a project card without a
    /// content URL do not count.
    pub fn source(&self) -> Option<EventSource<'_>> {
        if let Some(issue) = &self.issue {
            return Some(EventSource::Issue(issue));
        }
        if let Some(pr) = &self.pull_request {
            return Some(EventSource::PullRequest(pr));
        }
        if let Some(run) = &self.workflow_run {
            if let Some(pull_request) = run.pull_requests.first() {
                return Some(EventSource::WorkflowRun {
                    pull_request,
                    actor: run.actor.as_ref(),
                });
            }
        }
        self.project_card
            .as_ref()
            .and_then(|card| card.content_url.as_deref())
            .map(EventSource::ProjectCard)
    }

    /// Owner and repo from `repository.full_name`
    fn owner_repo(&self) -> Result<(String, String)> {
        let full_name = self
            .repository
            .as_ref()
            .map(|r| r.full_name.as_str())
            .ok_or_else(|| Error::ContextResolution("payload has no repository".to_string()))?;
        split_full_name(full_name)
    }
}

/// Split `owner/repo`
pub fn split_full_name(full_name: &str) -> Result<(String, String)> {
    match full_name.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(Error::ContextResolution(format!(
            "invalid repository name: {}",
            full_name
        ))),
    }
}

/// Extract `(owner, repo, number)` from an issue URL.
///
/// Accepts web (`https://github.com/o/r/issues/1`) and API
/// (`https://api.github.com/repos/o/r/issues/1`) forms; the URL must end in
/// `/issues/{n}`.
pub fn parse_issue_url(url: &str) -> Result<(String, String, u64)> {
    let invalid = || Error::ContextResolution(format!("not an issue URL: {}", url));

    let parsed = reqwest::Url::parse(url).map_err(|_| invalid())?;
    let segments: Vec<&str> = parsed
        .path_segments()
        .ok_or_else(invalid)?
        .filter(|s| !s.is_empty())
        .collect();

    match segments.as_slice() {
        [.., owner, repo, "issues", number] => {
            let number = number.parse::<u64>().map_err(|_| invalid())?;
            if number == 0 {
                return Err(invalid());
            }
            Ok((owner.to_string(), repo.to_string(), number))
        }
        _ => Err(invalid()),
    }
}

/// Resolve the target of this run.
///
/// A positive `manual_issue_number` takes precedence over the payload shape
/// and always yields an issue with no known author.
pub fn resolve(payload: &EventPayload, manual_issue_number: u64) -> Result<EventContext> {
    if manual_issue_number > 0 {
        let (owner, repo) = payload.owner_repo()?;
        return Ok(EventContext {
            owner,
            repo,
            kind: TargetKind::Issue,
            number: manual_issue_number,
            author: None,
        });
    }

    let source = payload.source().ok_or_else(|| {
        Error::ContextResolution(
            "payload has no issue, pull_request, workflow_run or project_card".to_string(),
        )
    })?;

    let context = match source {
        EventSource::Issue(issue) => {
            let (owner, repo) = payload.owner_repo()?;
            EventContext {
                owner,
                repo,
                kind: TargetKind::Issue,
                number: issue.number,
                author: issue.user.as_ref().map(|u| u.login.clone()),
            }
        }
        EventSource::PullRequest(pr) => {
            let (owner, repo) = payload.owner_repo()?;
            EventContext {
                owner,
                repo,
                kind: TargetKind::PullRequest,
                number: pr.number,
                author: pr.user.as_ref().map(|u| u.login.clone()),
            }
        }
        EventSource::WorkflowRun {
            pull_request,
            actor,
        } => {
            let (owner, repo) = payload.owner_repo()?;
            EventContext {
                owner,
                repo,
                kind: TargetKind::PullRequest,
                number: pull_request.number,
                author: actor.map(|a| a.login.clone()),
            }
        }
        EventSource::ProjectCard(url) => {
            // The card may live in a project outside the workflow's repository
            let (owner, repo, number) = parse_issue_url(url)?;
            EventContext {
                owner,
                repo,
                kind: TargetKind::Issue,
                number,
                author: None,
            }
        }
    };

    tracing::debug!(item = %context, author = ?context.author, "resolved event context");
    Ok(context)
}
