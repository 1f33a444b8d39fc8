//! Candidate pool construction
//!
//! Pipeline: take assignees with a positive weight, add team members (one
//! lookup per distinct slug, concurrently), deduplicate keeping first
//! occurrence, drop the author when self-assignment is off, then optionally
//! trim to a random subset. Weights never expand into repeated entries since
//! dedup would discard them.

use crate::error::{Error, Result};
use crate::traits::PlatformApi;
use crate::types::{AssignmentConfig, EventContext, WeightedName};
use futures::future::try_join_all;
use rand::Rng;
use std::collections::{HashMap, HashSet};

/// Deduplicated, ordered candidate logins
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidatePool {
    logins: Vec<String>,
}

impl CandidatePool {
    /// Build a pool from names in priority order, keeping first occurrences
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut logins = Vec::new();
        for name in names {
            let name = name.as_ref();
            if !seen.contains(name) {
                seen.insert(name.to_string());
                logins.push(name.to_string());
            }
        }
        Self { logins }
    }

    /// Candidate logins in pool order
    #[inline]
    pub fn as_slice(&self) -> &[String] {
        &self.logins
    }

    /// Consume into the login list
    pub fn into_vec(self) -> Vec<String> {
        self.logins
    }

    /// Number of candidates
    #[inline]
    pub fn len(&self) -> usize {
        self.logins.len()
    }

    /// True when nobody is eligible
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.logins.is_empty()
    }

    /// Whether `login` is in the pool
    pub fn contains(&self, login: &str) -> bool {
        self.logins.iter().any(|l| l == login)
    }

    /// Drop `login` if present
    pub fn remove(&mut self, login: &str) {
        self.logins.retain(|l| l != login);
    }

    /// Keep `n` distinct candidates drawn uniformly without replacement.
    ///
    /// No-op when `n` is 0 or the pool is not larger than `n`. Picks are
    /// returned in draw order.
    pub fn retain_random<R: Rng + ?Sized>(&mut self, n: usize, rng: &mut R) {
        if n == 0 || self.logins.len() <= n {
            return;
        }
        let picked: Vec<String> = rand::seq::index::sample(rng, self.logins.len(), n)
            .into_iter()
            .map(|i| self.logins[i].clone())
            .collect();
        self.logins = picked;
    }
}

/// Fetch members of every distinct team slug concurrently.
///
/// Fails as a whole if any lookup fails, wrapping the first error.
pub async fn fetch_team_members<P: PlatformApi>(
    platform: &P,
    org: &str,
    teams: &[WeightedName],
) -> Result<HashMap<String, Vec<String>>> {
    let mut slugs: Vec<&str> = Vec::new();
    for slug in WeightedName::active(teams) {
        if !slugs.contains(&slug) {
            slugs.push(slug);
        }
    }
    if slugs.is_empty() {
        return Ok(HashMap::new());
    }

    let lookups = slugs.iter().map(|&slug| async move {
        let members = platform.team_members(org, slug).await?;
        tracing::debug!(team = slug, members = members.len(), "fetched team members");
        Ok::<_, Error>((slug.to_string(), members))
    });

    let results = try_join_all(lookups)
        .await
        .map_err(|e| Error::TeamLookup {
            source: Box::new(e),
        })?;

    Ok(results.into_iter().collect())
}

/// Merge weighted assignees and team members into a deduplicated pool.
///
/// Assignee-derived names always precede team-derived names. A team listed
/// more than once contributes its members once.
pub fn build_pool(
    assignees: &[WeightedName],
    teams: &[WeightedName],
    team_members: &HashMap<String, Vec<String>>,
) -> CandidatePool {
    let mut slugs: Vec<&str> = Vec::new();
    for slug in WeightedName::active(teams) {
        if !slugs.contains(&slug) {
            slugs.push(slug);
        }
    }
    let from_teams = slugs.into_iter().flat_map(|slug| {
        team_members
            .get(slug)
            .map(|members| members.as_slice())
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
    });
    CandidatePool::from_names(WeightedName::active(assignees).chain(from_teams))
}

/// Run the full candidate pipeline for one target.
///
/// Team members are looked up in the target owner's organization. An empty
/// pool is `Ok` only when `allow_no_assignees` is set. Callers validate the
/// configuration first (see [`AssignmentConfig::validate`]).
pub async fn select_candidates<P, R>(
    platform: &P,
    context: &EventContext,
    config: &AssignmentConfig,
    rng: &mut R,
) -> Result<CandidatePool>
where
    P: PlatformApi,
    R: Rng + ?Sized,
{
    let team_members = fetch_team_members(platform, &context.owner, &config.teams).await?;
    let mut pool = build_pool(&config.assignees, &config.teams, &team_members);

    if !config.allow_self_assign {
        if let Some(author) = context.author.as_deref() {
            pool.remove(author);
        }
    }

    if pool.is_empty() {
        if config.allow_no_assignees {
            tracing::info!("no candidates left, continuing without assignees");
            return Ok(pool);
        }
        return Err(Error::NoCandidates);
    }

    pool.retain_random(config.num_of_assignee as usize, rng);
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn members(entries: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(slug, logins)| {
                (
                    slug.to_string(),
                    logins.iter().map(|l| l.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_weighted_assignees_then_teams_dedup() {
        let assignees = vec![WeightedName::with_weight("a", 2), WeightedName::new("b")];
        let teams = vec![WeightedName::new("t")];
        let pool = build_pool(&assignees, &teams, &members(&[("t", &["b"])]));
        assert_eq!(pool.as_slice(), ["a", "b"]);
    }

    #[test]
    fn test_team_order_follows_assignees() {
        let assignees = WeightedName::list(["user1", "user2", "userA2"]);
        let teams = WeightedName::list(["teamA", "teamB"]);
        let lookup = members(&[("teamA", &["userA1", "userA2"]), ("teamB", &["userB1"])]);
        let pool = build_pool(&assignees, &teams, &lookup);
        assert_eq!(
            pool.as_slice(),
            ["user1", "user2", "userA2", "userA1", "userB1"]
        );
    }

    #[test]
    fn test_repeated_team_collapses_after_dedup() {
        let teams = vec![WeightedName::with_weight("t", 3)];
        let pool = build_pool(&[], &teams, &members(&[("t", &["x", "y"])]));
        assert_eq!(pool.as_slice(), ["x", "y"]);
    }

    #[test]
    fn test_huge_weights_do_not_expand() {
        let assignees = vec![
            WeightedName::with_weight("alice", u32::MAX),
            WeightedName::new("bob"),
        ];
        let teams = vec![WeightedName::with_weight("t", u32::MAX)];
        let lookup = members(&[("t", &["alice", "carol"])]);
        let pool = build_pool(&assignees, &teams, &lookup);
        assert_eq!(pool.as_slice(), ["alice", "bob", "carol"]);
    }

    #[test]
    fn test_zero_weight_entries_are_skipped() {
        let assignees = vec![WeightedName::with_weight("a", 0), WeightedName::new("b")];
        let teams = vec![WeightedName::with_weight("t", 0)];
        let pool = build_pool(&assignees, &teams, &members(&[("t", &["x"])]));
        assert_eq!(pool.as_slice(), ["b"]);
    }

    #[test]
    fn test_unknown_team_contributes_nothing() {
        let pool = build_pool(&WeightedName::list(["a"]), &WeightedName::list(["ghost"]), &HashMap::new());
        assert_eq!(pool.as_slice(), ["a"]);
    }

    #[test]
    fn test_retain_random_exact_size_and_membership() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut pool = CandidatePool::from_names(["a", "b", "c", "d", "e"]);
        pool.retain_random(3, &mut rng);
        assert_eq!(pool.len(), 3);
        let unique: HashSet<&String> = pool.as_slice().iter().collect();
        assert_eq!(unique.len(), 3);
        assert!(pool.as_slice().iter().all(|l| ["a", "b", "c", "d", "e"].contains(&l.as_str())));
    }

    #[test]
    fn test_retain_random_noop_when_small() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut pool = CandidatePool::from_names(["a", "b"]);
        pool.retain_random(2, &mut rng);
        assert_eq!(pool.as_slice(), ["a", "b"]);
        pool.retain_random(0, &mut rng);
        assert_eq!(pool.as_slice(), ["a", "b"]);
    }

    #[test]
    fn test_retain_random_covers_pool_uniformly() {
        let names = ["a", "b", "c", "d", "e", "f"];
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut counts: HashMap<String, u32> = HashMap::new();
        let trials = 6000;

        for _ in 0..trials {
            let mut pool = CandidatePool::from_names(names);
            pool.retain_random(2, &mut rng);
            for login in pool.into_vec() {
                *counts.entry(login).or_default() += 1;
            }
        }

        // Each name is expected 2000 times (2 picks / 6 names per trial)
        for name in names {
            let hits = counts.get(name).copied().unwrap_or(0);
            assert!(
                (1700..=2300).contains(&hits),
                "{} picked {} times, expected ~2000",
                name,
                hits
            );
        }
    }

    #[test]
    fn test_remove_author() {
        let mut pool = CandidatePool::from_names(["author", "x"]);
        pool.remove("author");
        assert_eq!(pool.as_slice(), ["x"]);
        pool.remove("missing");
        assert_eq!(pool.len(), 1);
        assert!(!pool.contains("author"));
    }
}
