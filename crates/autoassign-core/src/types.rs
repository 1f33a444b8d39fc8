//! Core type definitions shared by the resolver, builder and orchestrator

use crate::error::{Error, Result};
use std::fmt;

/// Kind of item being assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TargetKind {
    /// A plain issue
    Issue,
    /// A pull request (also addressable as an issue)
    PullRequest,
}

impl TargetKind {
    /// Get string representation
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::PullRequest => "pull request",
        }
    }

    /// Whether reviewers can be requested on this target
    #[inline]
    pub const fn is_pull_request(&self) -> bool {
        matches!(self, Self::PullRequest)
    }
}

/// The issue or pull request a run operates on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventContext {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Issue or pull request
    pub kind: TargetKind,
    /// Issue or pull request number
    pub number: u64,
    /// Login of whoever opened the target, when the event carries it
    pub author: Option<String>,
}

impl EventContext {
    /// `owner/repo`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Whether `login` is the target's author
    #[inline]
    pub fn is_author(&self, login: &str) -> bool {
        self.author.as_deref() == Some(login)
    }
}

impl fmt::Display for EventContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{}#{}",
            self.kind.as_str(),
            self.owner,
            self.repo,
            self.number
        )
    }
}

/// A login or team slug paired with a repeat count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedName {
    /// Login or team slug
    pub name: String,
    /// How many times the name is repeated on expansion
    pub weight: u32,
}

impl WeightedName {
    /// Name with weight 1
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_weight(name, 1)
    }

    /// Name with an explicit weight
    pub fn with_weight(name: impl Into<String>, weight: u32) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }

    /// Expand a weighted list into a flat sequence, preserving input order.
    ///
    /// `[a:2, b]` becomes `[a, a, b]`; weight 0 contributes nothing.
    pub fn expand(list: &[WeightedName]) -> impl Iterator<Item = &str> + '_ {
        list.iter()
            .flat_map(|w| std::iter::repeat(w.name.as_str()).take(w.weight as usize))
    }

    /// Names with a positive weight, each yielded once in list order.
    ///
    /// Dedup collapses repeats anyway, so the pool never needs the full
    /// expansion.
    pub fn active(list: &[WeightedName]) -> impl Iterator<Item = &str> + '_ {
        list.iter()
            .filter(|w| w.weight > 0)
            .map(|w| w.name.as_str())
    }

    /// Build a weight-1 list from plain names
    pub fn list<I, S>(names: I) -> Vec<WeightedName>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().map(WeightedName::new).collect()
    }
}

/// Selection and assignment options for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentConfig {
    /// Static logins, weighted by repetition
    pub assignees: Vec<WeightedName>,
    /// Team slugs whose members become candidates
    pub teams: Vec<WeightedName>,
    /// Random subset size (0 = whole pool)
    pub num_of_assignee: u32,
    /// Soft-exit when the target already has assignees
    pub abort_if_previous_assignees: bool,
    /// Clear existing assignees (and PR reviewers) first
    pub remove_previous_assignees: bool,
    /// Treat an empty pool as success
    pub allow_no_assignees: bool,
    /// Keep the author in the pool
    pub allow_self_assign: bool,
    /// Explicit issue number (0 = derive from event)
    pub manual_issue_number: u64,
    /// Also request the configured teams as PR team reviewers
    pub team_is_pull_request_reviewer: bool,
    /// Probe every candidate after assignment and fail on rejections
    pub fails_if_users_cannot_be_assigned: bool,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            assignees: Vec::new(),
            teams: Vec::new(),
            num_of_assignee: 0,
            abort_if_previous_assignees: false,
            remove_previous_assignees: false,
            allow_no_assignees: false,
            allow_self_assign: true,
            manual_issue_number: 0,
            team_is_pull_request_reviewer: false,
            fails_if_users_cannot_be_assigned: false,
        }
    }
}

impl AssignmentConfig {
    /// Whether any selection input expands to at least one name
    pub fn has_selection_input(&self) -> bool {
        WeightedName::active(&self.assignees).next().is_some()
            || WeightedName::active(&self.teams).next().is_some()
    }

    /// Fail when neither assignees nor teams name anybody
    pub fn validate(&self) -> Result<()> {
        if self.has_selection_input() {
            Ok(())
        } else {
            Err(Error::Config(
                "missing required parameters: assignees or teams".to_string(),
            ))
        }
    }

    /// Distinct team slugs in first-seen order, ignoring zero weights
    pub fn distinct_teams(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for slug in WeightedName::active(&self.teams) {
            if !seen.contains(&slug) {
                seen.push(slug);
            }
        }
        seen
    }
}

/// Who ended up assigned and requested for review
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentResult {
    /// Logins added as issue/PR assignees
    pub assignees: Vec<String>,
    /// Logins requested as PR reviewers
    pub reviewers: Vec<String>,
    /// Team slugs requested as PR team reviewers
    pub team_reviewers: Vec<String>,
}

impl AssignmentResult {
    /// True when nothing was assigned or requested
    pub fn is_empty(&self) -> bool {
        self.assignees.is_empty() && self.reviewers.is_empty() && self.team_reviewers.is_empty()
    }
}

/// Successful end state of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Candidates were selected and assigned (possibly none)
    Assigned(AssignmentResult),
    /// The target already had assignees; nothing was changed
    Aborted {
        /// Assignees found on the target
        previous_assignees: Vec<String>,
    },
}

impl RunOutcome {
    /// The assignment result, if the run did not soft-exit
    pub fn result(&self) -> Option<&AssignmentResult> {
        match self {
            RunOutcome::Assigned(r) => Some(r),
            RunOutcome::Aborted { .. } => None,
        }
    }

    /// Whether the run stopped on existing assignees
    #[inline]
    pub fn is_aborted(&self) -> bool {
        matches!(self, RunOutcome::Aborted { .. })
    }
}
