//! Platform API trait used by the assignment engine
//!
//! Methods return `impl Future + Send` so implementations can be plain
//! `async fn`s: no boxing, no dynamic dispatch. The production
//! implementation is [`crate::http::GitHubApiClient`]; tests drive the
//! engine with an in-memory recorder.

use crate::error::Result;
use crate::types::EventContext;
use std::future::Future;

/// Issue, pull request and team operations the engine needs
pub trait PlatformApi: Sync {
    /// Current assignees of an issue or pull request
    fn issue_assignees<'a>(
        &'a self,
        target: &'a EventContext,
    ) -> impl Future<Output = Result<Vec<String>>> + Send + 'a;

    /// Current assignees and requested reviewers of a pull request
    fn pull_request_assignees_and_reviewers<'a>(
        &'a self,
        target: &'a EventContext,
    ) -> impl Future<Output = Result<(Vec<String>, Vec<String>)>> + Send + 'a;

    /// Add assignees to an issue or pull request
    fn add_assignees<'a>(
        &'a self,
        target: &'a EventContext,
        logins: &'a [String],
    ) -> impl Future<Output = Result<()>> + Send + 'a;

    /// Remove assignees from an issue or pull request
    fn remove_assignees<'a>(
        &'a self,
        target: &'a EventContext,
        logins: &'a [String],
    ) -> impl Future<Output = Result<()>> + Send + 'a;

    /// Request reviews from users on a pull request
    fn add_reviewers<'a>(
        &'a self,
        target: &'a EventContext,
        logins: &'a [String],
    ) -> impl Future<Output = Result<()>> + Send + 'a;

    /// Request reviews from teams on a pull request
    fn add_team_reviewers<'a>(
        &'a self,
        target: &'a EventContext,
        team_slugs: &'a [String],
    ) -> impl Future<Output = Result<()>> + Send + 'a;

    /// Withdraw review requests from users on a pull request
    fn remove_reviewers<'a>(
        &'a self,
        target: &'a EventContext,
        logins: &'a [String],
    ) -> impl Future<Output = Result<()>> + Send + 'a;

    /// Member logins of an organization team
    fn team_members<'a>(
        &'a self,
        org: &'a str,
        team_slug: &'a str,
    ) -> impl Future<Output = Result<Vec<String>>> + Send + 'a;

    /// Succeeds when `login` can be assigned to the target
    fn check_assignable<'a>(
        &'a self,
        target: &'a EventContext,
        login: &'a str,
    ) -> impl Future<Output = Result<()>> + Send + 'a;
}
