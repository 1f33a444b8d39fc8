//! Error types for autoassign-core

use thiserror::Error;

/// Result type alias for assignment operations
pub type Result<T> = std::result::Result<T, Error>;

/// What a failed removal was trying to clear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalTarget {
    /// Issue or pull request assignees
    Assignees,
    /// Requested pull request reviewers
    Reviewers,
}

impl RemovalTarget {
    /// Get string representation
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Assignees => "assignees",
            Self::Reviewers => "reviewers",
        }
    }
}

/// Main error type for assignment runs
#[derive(Debug, Error)]
pub enum Error {
    /// The event payload names no issue or pull request
    #[error("Could not find issue or pull request in event context: {0}")]
    ContextResolution(String),

    /// The event payload could not be read or decoded
    #[error("Event parse error: {0}")]
    EventParse(String),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A raw action input could not be coerced
    #[error("Invalid input: {0}")]
    Input(String),

    /// Expansion and filtering left nobody to assign
    #[error("No candidates found for assignment")]
    NoCandidates,

    /// At least one team member lookup failed
    #[error("Failed to retrieve team members")]
    TeamLookup {
        /// First failure encountered
        #[source]
        source: Box<Error>,
    },

    /// Clearing previous assignees or reviewers failed
    #[error("Failed to remove previous {}", .target.as_str())]
    Removal {
        /// What was being removed
        target: RemovalTarget,
        /// Underlying API failure
        #[source]
        source: Box<Error>,
    },

    /// Some candidates were rejected by the assignability probe
    #[error("Some users can't be assigned: {}", .0.join(", "))]
    AssignmentVerification(Vec<String>),

    /// GitHub answered with a non-success status
    #[error("GitHub API returned {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Request description and response message
        message: String,
    },

    /// API rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Runtime error (Tokio, threading, etc.)
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err.without_url().to_string())
    }
}

/// Fieldless error category for zero-cost pattern matching.
///
/// Single byte representation (`#[repr(u8)]`), `Copy`, no allocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorKind {
    /// No issue or pull request in the event
    ContextResolution,
    /// Event payload parse failure
    EventParse,
    /// Configuration error
    Config,
    /// Input coercion error
    Input,
    /// Empty candidate pool
    NoCandidates,
    /// Team member lookup failure
    TeamLookup,
    /// Previous assignee/reviewer removal failure
    Removal,
    /// Assignability verification failure
    AssignmentVerification,
    /// Non-success API status
    Api,
    /// API rate limit exceeded
    RateLimitExceeded,
    /// Transport error
    Http,
    /// Runtime error
    Runtime,
}

impl Error {
    /// Get the error kind. Zero allocation, returns a Copy enum.
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::ContextResolution(_) => ErrorKind::ContextResolution,
            Error::EventParse(_) => ErrorKind::EventParse,
            Error::Config(_) => ErrorKind::Config,
            Error::Input(_) => ErrorKind::Input,
            Error::NoCandidates => ErrorKind::NoCandidates,
            Error::TeamLookup { .. } => ErrorKind::TeamLookup,
            Error::Removal { .. } => ErrorKind::Removal,
            Error::AssignmentVerification(_) => ErrorKind::AssignmentVerification,
            Error::Api { .. } => ErrorKind::Api,
            Error::RateLimitExceeded(_) => ErrorKind::RateLimitExceeded,
            Error::Http(_) => ErrorKind::Http,
            Error::Runtime(_) => ErrorKind::Runtime,
        }
    }

    /// Wrap an API failure raised while clearing previous state
    pub(crate) fn removal(target: RemovalTarget, source: Error) -> Self {
        Error::Removal {
            target,
            source: Box::new(source),
        }
    }
}
