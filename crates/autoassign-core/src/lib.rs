//! # Auto-assign Core
//!
//! Picks who should own an issue or review a pull request, then applies the
//! choice through the GitHub REST API.
//!
//! A run:
//! - resolves the target from the workflow event payload
//! - expands weighted assignees and team members into a deduplicated pool
//! - applies the self-assignment policy and optional random narrowing
//! - clears or respects previous assignees
//! - assigns, requests reviews, and optionally verifies assignability
//!
//! ## Example
//!
//! ```no_run
//! use autoassign_core::{run_with_os_rng, AssignmentConfig, EventPayload, GitHubApiClient, WeightedName};
//!
//! # async fn example() -> autoassign_core::Result<()> {
//! let payload = EventPayload::from_env().await?;
//! let client = GitHubApiClient::from_env(None)?;
//! let config = AssignmentConfig {
//!     assignees: WeightedName::list(["octocat", "mona"]),
//!     num_of_assignee: 1,
//!     ..Default::default()
//! };
//!
//! let outcome = run_with_os_rng(&client, &payload, &config).await?;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, rust_2018_idioms)]

pub mod candidates;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod traits;
pub mod types;

pub use candidates::CandidatePool;
pub use config::RawInputs;
pub use context::EventPayload;
pub use error::{Error, ErrorKind, Result};
pub use http::GitHubApiClient;
pub use orchestrator::{run, run_with_os_rng, AssignmentOrchestrator};
pub use traits::PlatformApi;
pub use types::{
    AssignmentConfig, AssignmentResult, EventContext, RunOutcome, TargetKind, WeightedName,
};
