//! releases::mock
//!
//! Mock release source for deterministic testing.
//!
//! # Design
//!
//! The mock source serves release states and latest releases from memory,
//! records every call in order, and can be configured to fail a given
//! operation.
//!
//! # Example
//!
//! ```
//! use ci_actions::releases::mock::MockReleaseSource;
//! use ci_actions::releases::{ReleaseSource, ReleaseState};
//!
//! # tokio_test::block_on(async {
//! let source = MockReleaseSource::new()
//!     .with_branch("8", "8.3", ReleaseState::Stable, "8.3.14");
//!
//! let states = source.states().await.unwrap();
//! assert_eq!(states["8"]["8.3"].state, "stable");
//!
//! let release = source.latest_release("8.3").await.unwrap();
//! assert_eq!(release.version, "8.3.14");
//! # });
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::traits::{
    BranchState, Release, ReleaseError, ReleaseSource, ReleaseState, ReleaseStateMap,
};

/// Mock release source for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone, Default)]
pub struct MockReleaseSource {
    inner: Arc<Mutex<MockSourceInner>>,
}

#[derive(Debug, Default)]
struct MockSourceInner {
    states: ReleaseStateMap,
    releases: HashMap<String, String>,
    fail_on: Option<FailOn>,
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail `states` with the given error.
    States(ReleaseError),
    /// Fail `latest_release` for any branch with the given error.
    LatestRelease(ReleaseError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    States,
    LatestRelease { branch: String },
}

impl MockReleaseSource {
    /// Create an empty mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a branch with its state and latest release.
    pub fn with_branch(
        self,
        major: &str,
        branch: &str,
        state: ReleaseState,
        latest: &str,
    ) -> Self {
        self.with_raw_state(major, branch, state.as_str());
        self.lock()
            .releases
            .insert(branch.to_string(), latest.to_string());
        self
    }

    /// Add a branch with an arbitrary state label and no release.
    pub fn with_raw_state(&self, major: &str, branch: &str, label: &str) -> &Self {
        self.lock()
            .states
            .entry(major.to_string())
            .or_default()
            .insert(
                branch.to_string(),
                BranchState {
                    state: label.to_string(),
                },
            );
        self
    }

    /// Configure an operation to fail.
    pub fn fail_on(&self, fail_on: FailOn) {
        self.lock().fail_on = Some(fail_on);
    }

    /// Recorded operations, in call order.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Branches passed to `latest_release`, in call order.
    pub fn release_lookups(&self) -> Vec<String> {
        self.operations()
            .into_iter()
            .filter_map(|op| match op {
                MockOperation::LatestRelease { branch } => Some(branch),
                MockOperation::States => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockSourceInner> {
        // A poisoned lock only means another test thread panicked.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ReleaseSource for MockReleaseSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn states(&self) -> Result<ReleaseStateMap, ReleaseError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::States);
        if let Some(FailOn::States(err)) = &inner.fail_on {
            return Err(err.clone());
        }
        Ok(inner.states.clone())
    }

    async fn latest_release(&self, branch: &str) -> Result<Release, ReleaseError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::LatestRelease {
            branch: branch.to_string(),
        });
        if let Some(FailOn::LatestRelease(err)) = &inner.fail_on {
            return Err(err.clone());
        }
        inner
            .releases
            .get(branch)
            .map(|version| Release {
                version: version.clone(),
            })
            .ok_or_else(|| ReleaseError::NotFound {
                branch: branch.to_string(),
                message: "Unknown version".to_string(),
            })
    }
}
