//! In-memory `PlatformApi` that records every call

#![allow(dead_code)]

use autoassign_core::{
    AssignmentConfig, Error, EventContext, EventPayload, PlatformApi, Result, RunOutcome,
};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, HashSet};

/// `(owner, repo, number)` a call was made against
pub type Loc = (String, String, u64);

/// One recorded platform call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    IssueAssignees(Loc),
    PullRequestState(Loc),
    AddAssignees(Loc, Vec<String>),
    RemoveAssignees(Loc, Vec<String>),
    AddReviewers(Loc, Vec<String>),
    AddTeamReviewers(Loc, Vec<String>),
    RemoveReviewers(Loc, Vec<String>),
    TeamMembers { org: String, slug: String },
    CheckAssignable(Loc, String),
}

impl Call {
    /// Whether the call changes state on the platform
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Call::AddAssignees(..)
                | Call::RemoveAssignees(..)
                | Call::AddReviewers(..)
                | Call::AddTeamReviewers(..)
                | Call::RemoveReviewers(..)
        )
    }
}

pub fn loc(owner: &str, repo: &str, number: u64) -> Loc {
    (owner.to_string(), repo.to_string(), number)
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn not_found(what: String) -> Error {
    Error::Api {
        status: 404,
        message: format!("{}: Not Found", what),
    }
}

pub struct MockPlatform {
    pub current_assignees: Vec<String>,
    pub current_reviewers: Vec<String>,
    pub teams: HashMap<String, Vec<String>>,
    pub failing_teams: HashSet<String>,
    pub unassignable: HashSet<String>,
    pub fail_removal: bool,
    calls: Mutex<Vec<Call>>,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self {
            current_assignees: strings(&["userA", "userB"]),
            current_reviewers: strings(&["userA", "userB"]),
            teams: HashMap::new(),
            failing_teams: HashSet::new(),
            unassignable: HashSet::new(),
            fail_removal: false,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// `teamA = [userA1, userA2]`, `teamB = [userB1]`
    pub fn with_default_teams() -> Self {
        Self::new()
            .with_team("teamA", &["userA1", "userA2"])
            .with_team("teamB", &["userB1"])
    }

    pub fn with_team(mut self, slug: &str, members: &[&str]) -> Self {
        self.teams.insert(slug.to_string(), strings(members));
        self
    }

    pub fn with_current_assignees(mut self, assignees: &[&str]) -> Self {
        self.current_assignees = strings(assignees);
        self
    }

    pub fn with_failing_team(mut self, slug: &str) -> Self {
        self.failing_teams.insert(slug.to_string());
        self
    }

    pub fn with_unassignable(mut self, login: &str) -> Self {
        self.unassignable.insert(login.to_string());
        self
    }

    pub fn with_failing_removal(mut self) -> Self {
        self.fail_removal = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn team_lookups(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::TeamMembers { slug, .. } => Some(slug),
                _ => None,
            })
            .collect()
    }

    pub fn added_assignees(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::AddAssignees(_, logins) => Some(logins),
                _ => None,
            })
            .collect()
    }

    pub fn added_reviewers(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::AddReviewers(_, logins) => Some(logins),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

fn loc_of(target: &EventContext) -> Loc {
    loc(&target.owner, &target.repo, target.number)
}

impl PlatformApi for MockPlatform {
    async fn issue_assignees<'a>(&'a self, target: &'a EventContext) -> Result<Vec<String>> {
        self.record(Call::IssueAssignees(loc_of(target)));
        Ok(self.current_assignees.clone())
    }

    async fn pull_request_assignees_and_reviewers<'a>(
        &'a self,
        target: &'a EventContext,
    ) -> Result<(Vec<String>, Vec<String>)> {
        self.record(Call::PullRequestState(loc_of(target)));
        Ok((self.current_assignees.clone(), self.current_reviewers.clone()))
    }

    async fn add_assignees<'a>(&'a self, target: &'a EventContext, logins: &'a [String]) -> Result<()> {
        self.record(Call::AddAssignees(loc_of(target), logins.to_vec()));
        Ok(())
    }

    async fn remove_assignees<'a>(
        &'a self,
        target: &'a EventContext,
        logins: &'a [String],
    ) -> Result<()> {
        self.record(Call::RemoveAssignees(loc_of(target), logins.to_vec()));
        if self.fail_removal {
            return Err(Error::Http("connection reset".to_string()));
        }
        Ok(())
    }

    async fn add_reviewers<'a>(&'a self, target: &'a EventContext, logins: &'a [String]) -> Result<()> {
        self.record(Call::AddReviewers(loc_of(target), logins.to_vec()));
        Ok(())
    }

    async fn add_team_reviewers<'a>(
        &'a self,
        target: &'a EventContext,
        team_slugs: &'a [String],
    ) -> Result<()> {
        self.record(Call::AddTeamReviewers(loc_of(target), team_slugs.to_vec()));
        Ok(())
    }

    async fn remove_reviewers<'a>(
        &'a self,
        target: &'a EventContext,
        logins: &'a [String],
    ) -> Result<()> {
        self.record(Call::RemoveReviewers(loc_of(target), logins.to_vec()));
        Ok(())
    }

    async fn team_members<'a>(&'a self, org: &'a str, team_slug: &'a str) -> Result<Vec<String>> {
        self.record(Call::TeamMembers {
            org: org.to_string(),
            slug: team_slug.to_string(),
        });
        if self.failing_teams.contains(team_slug) {
            return Err(not_found(format!("list members of team {}", team_slug)));
        }
        Ok(self.teams.get(team_slug).cloned().unwrap_or_default())
    }

    async fn check_assignable<'a>(&'a self, target: &'a EventContext, login: &'a str) -> Result<()> {
        self.record(Call::CheckAssignable(loc_of(target), login.to_string()));
        if self.unassignable.contains(login) {
            return Err(not_found(format!("check assignee {}", login)));
        }
        Ok(())
    }
}

pub fn payload(value: serde_json::Value) -> EventPayload {
    serde_json::from_value(value).expect("valid test payload")
}

/// `mockOrg/mockRepo#666`, opened by `author`
pub fn issue_payload() -> EventPayload {
    payload(serde_json::json!({
        "repository": { "full_name": "mockOrg/mockRepo" },
        "issue": { "number": 666, "user": { "login": "author" } }
    }))
}

/// `mockOrg/mockRepo#667`, opened by `author`
pub fn pr_payload() -> EventPayload {
    payload(serde_json::json!({
        "repository": { "full_name": "mockOrg/mockRepo" },
        "pull_request": { "number": 667, "user": { "login": "author" } }
    }))
}

/// Workflow run for `mockOrg/mockRepo#668`, triggered by `author`
pub fn workflow_run_payload() -> EventPayload {
    payload(serde_json::json!({
        "repository": { "full_name": "mockOrg/mockRepo" },
        "workflow_run": {
            "pull_requests": [{ "number": 668 }],
            "actor": { "login": "author" }
        }
    }))
}

/// Project card pointing at `mockOrgCard/mockRepoCard#669`
pub fn project_card_payload() -> EventPayload {
    payload(serde_json::json!({
        "repository": { "full_name": "mockOrgCard/mockRepoCard" },
        "project_card": {
            "content_url": "https://github.com/mockOrgCard/mockRepoCard/issues/669"
        }
    }))
}

/// Run with a fixed seed so random selection is reproducible
pub async fn run_seeded(
    platform: &MockPlatform,
    payload: &EventPayload,
    config: &AssignmentConfig,
    seed: u64,
) -> Result<RunOutcome> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    autoassign_core::run(platform, payload, config, &mut rng).await
}

pub async fn run_mock(
    platform: &MockPlatform,
    payload: &EventPayload,
    config: &AssignmentConfig,
) -> Result<RunOutcome> {
    run_seeded(platform, payload, config, 0).await
}
