//! Assignment run: resolve, select, clear, assign, request reviews, verify

use crate::candidates::select_candidates;
use crate::context::{self, EventPayload};
use crate::error::{Error, RemovalTarget, Result};
use crate::traits::PlatformApi;
use crate::types::{AssignmentConfig, AssignmentResult, EventContext, RunOutcome, TargetKind};
use futures::future::join_all;
use rand::{Rng, SeedableRng};

/// Drives one assignment run against a platform
pub struct AssignmentOrchestrator<'a, P> {
    platform: &'a P,
    config: &'a AssignmentConfig,
}

impl<'a, P: PlatformApi> AssignmentOrchestrator<'a, P> {
    /// Create an orchestrator for one run
    pub fn new(platform: &'a P, config: &'a AssignmentConfig) -> Self {
        Self { platform, config }
    }

    /// Execute the run for the target named by `payload`.
    ///
    /// Stops at the first failure. Pre-existing assignees with
    /// `abort_if_previous_assignees` end the run as [`RunOutcome::Aborted`],
    /// which is a success.
    pub async fn run<R: Rng + ?Sized>(
        &self,
        payload: &EventPayload,
        rng: &mut R,
    ) -> Result<RunOutcome> {
        let target = context::resolve(payload, self.config.manual_issue_number)?;

        self.config.validate()?;

        if self.config.abort_if_previous_assignees {
            let previous = self.platform.issue_assignees(&target).await?;
            if !previous.is_empty() {
                tracing::info!(
                    item = %target,
                    assignees = ?previous,
                    "already assigned, nothing to do"
                );
                return Ok(RunOutcome::Aborted {
                    previous_assignees: previous,
                });
            }
        }

        let pool = select_candidates(self.platform, &target, self.config, rng).await?;

        if self.config.remove_previous_assignees {
            self.remove_previous(&target).await?;
        }

        if pool.is_empty() {
            return Ok(RunOutcome::Assigned(AssignmentResult::default()));
        }

        let assignees = pool.into_vec();
        tracing::info!(item = %target, assignees = ?assignees, "adding assignees");
        self.platform.add_assignees(&target, &assignees).await?;

        let mut result = AssignmentResult {
            assignees,
            ..Default::default()
        };

        if target.kind.is_pull_request() {
            self.request_reviews(&target, &mut result).await?;
        }

        if self.config.fails_if_users_cannot_be_assigned {
            self.verify_assignable(&target, &result.assignees).await?;
        }

        Ok(RunOutcome::Assigned(result))
    }

    /// Clear assignees, and for pull requests also requested reviewers
    async fn remove_previous(&self, target: &EventContext) -> Result<()> {
        let (assignees, reviewers) = match target.kind {
            TargetKind::Issue => {
                let assignees = self
                    .platform
                    .issue_assignees(target)
                    .await
                    .map_err(|e| Error::removal(RemovalTarget::Assignees, e))?;
                (assignees, Vec::new())
            }
            TargetKind::PullRequest => self
                .platform
                .pull_request_assignees_and_reviewers(target)
                .await
                .map_err(|e| Error::removal(RemovalTarget::Assignees, e))?,
        };

        if !assignees.is_empty() {
            tracing::info!(item = %target, assignees = ?assignees, "removing previous assignees");
            self.platform
                .remove_assignees(target, &assignees)
                .await
                .map_err(|e| Error::removal(RemovalTarget::Assignees, e))?;
        }

        if !reviewers.is_empty() {
            tracing::info!(item = %target, reviewers = ?reviewers, "removing previous reviewers");
            self.platform
                .remove_reviewers(target, &reviewers)
                .await
                .map_err(|e| Error::removal(RemovalTarget::Reviewers, e))?;
        }

        Ok(())
    }

    /// Request reviews from every assignee except the author, plus teams
    /// when configured
    async fn request_reviews(
        &self,
        target: &EventContext,
        result: &mut AssignmentResult,
    ) -> Result<()> {
        let reviewers: Vec<String> = result
            .assignees
            .iter()
            .filter(|login| !target.is_author(login))
            .cloned()
            .collect();

        if !reviewers.is_empty() {
            tracing::info!(item = %target, reviewers = ?reviewers, "requesting reviewers");
            self.platform.add_reviewers(target, &reviewers).await?;
            result.reviewers = reviewers;
        }

        if self.config.team_is_pull_request_reviewer {
            let teams: Vec<String> = self
                .config
                .distinct_teams()
                .into_iter()
                .map(str::to_string)
                .collect();
            if !teams.is_empty() {
                tracing::info!(item = %target, teams = ?teams, "requesting team reviewers");
                self.platform.add_team_reviewers(target, &teams).await?;
                result.team_reviewers = teams;
            }
        }

        Ok(())
    }

    /// Probe every login concurrently and fail if any was rejected.
    ///
    /// All probes run to completion; one rejection does not cancel the rest.
    async fn verify_assignable(&self, target: &EventContext, logins: &[String]) -> Result<()> {
        let probes = logins
            .iter()
            .map(|login| self.platform.check_assignable(target, login));
        let outcomes = join_all(probes).await;

        let rejected: Vec<String> = logins
            .iter()
            .zip(outcomes)
            .filter_map(|(login, outcome)| match outcome {
                Ok(()) => None,
                Err(e) => {
                    tracing::warn!(login = %login, error = %e, "user cannot be assigned");
                    Some(login.clone())
                }
            })
            .collect();

        if rejected.is_empty() {
            Ok(())
        } else {
            Err(Error::AssignmentVerification(rejected))
        }
    }
}

/// Run one assignment pass with an explicit random source
pub async fn run<P, R>(
    platform: &P,
    payload: &EventPayload,
    config: &AssignmentConfig,
    rng: &mut R,
) -> Result<RunOutcome>
where
    P: PlatformApi,
    R: Rng + ?Sized,
{
    AssignmentOrchestrator::new(platform, config)
        .run(payload, rng)
        .await
}

/// Run one assignment pass seeded from the OS
pub async fn run_with_os_rng<P: PlatformApi>(
    platform: &P,
    payload: &EventPayload,
    config: &AssignmentConfig,
) -> Result<RunOutcome> {
    let mut rng = rand::rngs::StdRng::from_entropy();
    run(platform, payload, config, &mut rng).await
}
