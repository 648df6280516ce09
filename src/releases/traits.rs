//! releases::traits
//!
//! Release source trait and the data it returns.
//!
//! # Design
//!
//! The `ReleaseSource` trait is async because every query is network I/O.
//! Implementations map transport and API failures onto [`ReleaseError`];
//! callers never see a raw HTTP error.
//!
//! # Example
//!
//! ```ignore
//! use ci_actions::releases::{ReleaseSource, ReleaseError};
//!
//! async fn latest(source: &dyn ReleaseSource) -> Result<String, ReleaseError> {
//!     let release = source.latest_release("8.3").await?;
//!     Ok(release.version)
//! }
//! ```

use std::str::FromStr;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from release queries and classification.
#[derive(Debug, Clone, Error)]
pub enum ReleaseError {
    /// A branch or version string could not be coerced to a semantic version.
    #[error("invalid version '{0}': no numeric version component found")]
    InvalidVersion(String),

    /// The version constraint expression could not be parsed.
    #[error("invalid version constraint '{input}': {message}")]
    InvalidConstraint {
        /// The expression as given
        input: String,
        /// Parser message
        message: String,
    },

    /// A branch reported a state label outside `eol`, `security`, `stable`.
    #[error("unknown release state '{state}' for branch {branch}")]
    UnknownState {
        /// Branch identifier, e.g. `8.2`
        branch: String,
        /// The label as reported
        state: String,
    },

    /// The release service does not know the requested branch.
    #[error("release not found for {branch}: {message}")]
    NotFound {
        /// Branch identifier
        branch: String,
        /// Message from the service
        message: String,
    },

    /// The service answered with an error status or an undecodable body.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),
}

/// Lifecycle state of a release branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReleaseState {
    /// End of life, no further releases
    Eol,
    /// Security fixes only
    Security,
    /// Actively maintained
    Stable,
}

impl ReleaseState {
    /// All states, in output order.
    pub const ALL: [ReleaseState; 3] = [
        ReleaseState::Eol,
        ReleaseState::Security,
        ReleaseState::Stable,
    ];

    /// The label used by the release service and in output names.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseState::Eol => "eol",
            ReleaseState::Security => "security",
            ReleaseState::Stable => "stable",
        }
    }
}

impl std::fmt::Display for ReleaseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReleaseState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eol" => Ok(ReleaseState::Eol),
            "security" => Ok(ReleaseState::Security),
            "stable" => Ok(ReleaseState::Stable),
            other => Err(other.to_string()),
        }
    }
}

/// State entry for one branch, as reported by the service.
///
/// The label is kept as a raw string so that an unexpected value surfaces
/// as [`ReleaseError::UnknownState`] naming the branch, instead of failing
/// the decode of the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchState {
    /// State label (`eol`, `security`, `stable`)
    pub state: String,
}

impl BranchState {
    /// Create an entry from a known state.
    pub fn new(state: ReleaseState) -> Self {
        Self {
            state: state.as_str().to_string(),
        }
    }
}

/// Branches of one major version: minor-version string → state entry.
pub type MinorReleases = IndexMap<String, BranchState>;

/// Release states: major-version string → branches, in document order.
pub type ReleaseStateMap = IndexMap<String, MinorReleases>;

/// Latest release of a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Full version, e.g. `8.2.27`
    pub version: String,
}

/// Source of release metadata.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Get the source name (for logging).
    fn name(&self) -> &'static str;

    /// Fetch the state of every known release branch.
    async fn states(&self) -> Result<ReleaseStateMap, ReleaseError>;

    /// Fetch the latest release of a branch (e.g. `8.2` → `8.2.27`).
    async fn latest_release(&self, branch: &str) -> Result<Release, ReleaseError>;
}
