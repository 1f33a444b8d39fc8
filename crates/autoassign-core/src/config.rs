//! Coercion of raw action inputs into an [`AssignmentConfig`]
//!
//! GitHub Actions hands every input over as a string (empty when unset), so
//! the host passes raw strings through [`RawInputs`] and lets this module do
//! the typing.

use crate::error::{Error, Result};
use crate::types::{AssignmentConfig, WeightedName};

/// Split a comma-separated list, trimming items and dropping empty ones
pub fn parse_csv(value: &str) -> Vec<&str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

/// Parse `name[:weight]` items, e.g. `alice:2, bob`.
pub fn parse_assignments(value: &str) -> Result<Vec<WeightedName>> {
    parse_csv(value)
        .into_iter()
        .map(|item| {
            let mut parts = item.split(':');
            let name = parts.next().unwrap_or_default().trim();
            let weight = parts.next();
            if parts.next().is_some() {
                return Err(Error::Input(format!("Invalid assignment value: {}", value)));
            }
            if name.is_empty() {
                return Err(Error::Input(format!("Invalid assignment value: {}", value)));
            }

            let weight = match weight {
                None => 1,
                Some(w) => w.trim().parse::<u32>().map_err(|_| {
                    Error::Input(format!(
                        "Invalid weight value for {} assignment: {}",
                        name, w
                    ))
                })?,
            };
            Ok(WeightedName::with_weight(name, weight))
        })
        .collect()
}

/// Parse a base-10 integer, falling back to `default` for an empty value
pub fn parse_int<T: std::str::FromStr>(value: &str, default: T) -> Result<T> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(default);
    }
    value
        .parse::<T>()
        .map_err(|_| Error::Input(format!("Invalid integer value: {}", value)))
}

/// Parse a YAML 1.2 core schema boolean, falling back to `default` when empty
pub fn parse_bool(value: &str, default: bool) -> Result<bool> {
    match value.trim() {
        "" => Ok(default),
        "true" | "True" | "TRUE" => Ok(true),
        "false" | "False" | "FALSE" => Ok(false),
        other => Err(Error::Input(format!(
            "Invalid boolean value: {} (expected true|True|TRUE|false|False|FALSE)",
            other
        ))),
    }
}

/// Action inputs exactly as received
#[derive(Debug, Clone, Default)]
pub struct RawInputs<'a> {
    /// `assignees`
    pub assignees: &'a str,
    /// `teams`
    pub teams: &'a str,
    /// `numOfAssignee`
    pub num_of_assignee: &'a str,
    /// `abortIfPreviousAssignees`
    pub abort_if_previous_assignees: &'a str,
    /// `removePreviousAssignees`
    pub remove_previous_assignees: &'a str,
    /// `allowNoAssignees`
    pub allow_no_assignees: &'a str,
    /// `allowSelfAssign`
    pub allow_self_assign: &'a str,
    /// `issueNumber`
    pub issue_number: &'a str,
    /// `teamIsPullRequestReviewer`
    pub team_is_pull_request_reviewer: &'a str,
    /// `failsIfUsersCannotBeAssigned`
    pub fails_if_users_cannot_be_assigned: &'a str,
}

fn with_input<T>(name: &str, result: Result<T>) -> Result<T> {
    result.map_err(|e| match e {
        Error::Input(msg) => Error::Input(format!("Failed to parse value for {}: {}", name, msg)),
        other => other,
    })
}

impl RawInputs<'_> {
    /// Coerce every input, naming the offending input on failure
    pub fn into_config(self) -> Result<AssignmentConfig> {
        let defaults = AssignmentConfig::default();
        Ok(AssignmentConfig {
            assignees: with_input("assignees", parse_assignments(self.assignees))?,
            teams: with_input("teams", parse_assignments(self.teams))?,
            num_of_assignee: with_input("numOfAssignee", parse_int(self.num_of_assignee, 0))?,
            abort_if_previous_assignees: with_input(
                "abortIfPreviousAssignees",
                parse_bool(self.abort_if_previous_assignees, false),
            )?,
            remove_previous_assignees: with_input(
                "removePreviousAssignees",
                parse_bool(self.remove_previous_assignees, false),
            )?,
            allow_no_assignees: with_input(
                "allowNoAssignees",
                parse_bool(self.allow_no_assignees, false),
            )?,
            allow_self_assign: with_input(
                "allowSelfAssign",
                parse_bool(self.allow_self_assign, defaults.allow_self_assign),
            )?,
            manual_issue_number: with_input("issueNumber", parse_int(self.issue_number, 0))?,
            team_is_pull_request_reviewer: with_input(
                "teamIsPullRequestReviewer",
                parse_bool(self.team_is_pull_request_reviewer, false),
            )?,
            fails_if_users_cannot_be_assigned: with_input(
                "failsIfUsersCannotBeAssigned",
                parse_bool(self.fails_if_users_cannot_be_assigned, false),
            )?,
        })
    }
}
