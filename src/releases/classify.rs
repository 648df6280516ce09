//! releases::classify
//!
//! Group release branches into lifecycle buckets.
//!
//! # Semantics
//!
//! Every branch of every major version is visited in document order:
//!
//! 1. Branches below the minimum version are skipped with a warning.
//! 2. Branches that satisfy the constraint (or all branches, when there is
//!    none) are appended to the bucket for their state, and their latest
//!    release is looked up and appended alongside.
//!
//! Buckets are shared across major versions: `7.4` and `8.0` in state
//! `eol` both land in the single `eol` bucket. Lookups are sequential,
//! each awaited before the next starts.

use semver::Version;
use serde::{Deserialize, Serialize};

use super::traits::{ReleaseError, ReleaseSource, ReleaseState, ReleaseStateMap};
use super::version::{coerce, VersionConstraint};
use crate::ui::output::{self, Verbosity};

/// Oldest branch ever reported.
pub const ABSOLUTE_MINIMUM_VERSION: &str = "7.4";

/// Branches in one state with their latest releases.
///
/// `minor[i]` is the latest release of `major[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// Branch identifiers, e.g. `8.2`
    pub major: Vec<String>,
    /// Latest releases, e.g. `8.2.27`
    pub minor: Vec<String>,
}

impl Bucket {
    /// Check if the bucket has no branches.
    pub fn is_empty(&self) -> bool {
        self.major.is_empty()
    }
}

/// Result of classification: one bucket per state, always all three.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub eol: Bucket,
    pub security: Bucket,
    pub stable: Bucket,
}

impl ClassificationResult {
    /// Get the bucket for a state.
    pub fn bucket(&self, state: ReleaseState) -> &Bucket {
        match state {
            ReleaseState::Eol => &self.eol,
            ReleaseState::Security => &self.security,
            ReleaseState::Stable => &self.stable,
        }
    }

    fn bucket_mut(&mut self, state: ReleaseState) -> &mut Bucket {
        match state {
            ReleaseState::Eol => &mut self.eol,
            ReleaseState::Security => &mut self.security,
            ReleaseState::Stable => &mut self.stable,
        }
    }

    /// Iterate buckets in output order (`eol`, `security`, `stable`).
    pub fn iter(&self) -> impl Iterator<Item = (ReleaseState, &Bucket)> {
        ReleaseState::ALL
            .into_iter()
            .map(move |state| (state, self.bucket(state)))
    }

    /// Total number of classified branches.
    pub fn len(&self) -> usize {
        self.iter().map(|(_, bucket)| bucket.major.len()).sum()
    }

    /// Check if no branch was classified.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classification options.
#[derive(Debug, Clone)]
pub struct ClassifyOptions {
    /// Only branches satisfying this constraint are classified.
    pub constraint: Option<VersionConstraint>,
    /// Branches below this version are skipped.
    pub minimum: Version,
    /// Logging verbosity.
    pub verbosity: Verbosity,
}

impl ClassifyOptions {
    /// Options with no constraint and the absolute minimum version.
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            constraint: None,
            minimum: Version::new(7, 4, 0),
            verbosity,
        }
    }
}

/// Classify the branches of `states`, looking up latest releases from `source`.
///
/// # Errors
///
/// - `ReleaseError::InvalidVersion` if a branch name has no numeric version
/// - `ReleaseError::UnknownState` if a qualifying branch has an unknown label
/// - any error from `source.latest_release`
pub async fn classify(
    source: &dyn ReleaseSource,
    states: &ReleaseStateMap,
    options: &ClassifyOptions,
) -> Result<ClassificationResult, ReleaseError> {
    let mut result = ClassificationResult::default();

    for minors in states.values() {
        for (branch, entry) in minors {
            let version = coerce(branch).inspect_err(|_| {
                output::error(format!("cannot coerce branch '{}' to a version", branch))
            })?;

            if version < options.minimum {
                output::warn(
                    format!(
                        "Skipping {} as it is below the minimum version {}",
                        branch, options.minimum
                    ),
                    options.verbosity,
                );
                continue;
            }

            if let Some(constraint) = &options.constraint {
                if !constraint.satisfies(&version) {
                    output::debug(
                        format!("{} does not satisfy '{}'", branch, constraint),
                        options.verbosity,
                    );
                    continue;
                }
            }

            let state: ReleaseState =
                entry
                    .state
                    .parse()
                    .map_err(|state| ReleaseError::UnknownState {
                        branch: branch.clone(),
                        state,
                    })?;

            result.bucket_mut(state).major.push(branch.clone());

            output::debug(
                format!("Looking up latest {} release of {}", state, branch),
                options.verbosity,
            );
            let release = source.latest_release(branch).await?;
            result.bucket_mut(state).minor.push(release.version);
        }
    }

    Ok(result)
}

/// Fetch release states from `source` and classify them.
pub async fn fetch_and_classify(
    source: &dyn ReleaseSource,
    options: &ClassifyOptions,
) -> Result<ClassificationResult, ReleaseError> {
    output::debug(
        format!("Fetching release states from {}", source.name()),
        options.verbosity,
    );
    let states = source.states().await?;
    classify(source, &states, options).await
}
