//! manifest
//!
//! Multi-arch manifest aggregation and publishing.
//!
//! # Architecture
//!
//! Publishing is three steps, each usable on its own:
//!
//! 1. [`read_fragments`] reads the per-build JSON metadata files
//! 2. [`aggregate`] merges them into a [`PublishCommand`]
//! 3. an [`ImageTools`] implementation runs it
//!
//! # Modules
//!
//! - `fragment`: fragment schema and directory reading
//! - `aggregate`: merge logic and argument construction
//! - `tools`: `ImageTools` trait and the buildx runner
//! - [`mock`]: recording implementation for tests

mod aggregate;
mod fragment;
pub mod mock;
mod tools;

pub use aggregate::{
    aggregate, AggregatedManifest, ManifestInputs, PublishCommand, CREATE_VERB,
    METADATA_WARNINGS_ENV,
};
pub use fragment::{parse_fragment, read_fragments, BuildMetadata};
pub use tools::{last_error_line, BuildxImageTools, ImageTools, PublishOutput, UNKNOWN_ERROR};

use std::path::PathBuf;
use thiserror::Error;

/// Errors from manifest aggregation and publishing.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read metadata directory '{path}': {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read metadata file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse metadata file '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("no image name found in metadata and none configured")]
    MissingImageName,

    #[error("Docker buildx is required. See https://github.com/docker/setup-buildx-action to set up buildx.")]
    BuildxUnavailable,

    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// `message` is the last non-empty stderr line; `stderr` is all of it.
    #[error("buildx failed with: {message}")]
    PublishFailed { message: String, stderr: String },
}

/// Check tooling, then publish.
///
/// # Errors
///
/// Returns `ManifestError::BuildxUnavailable` without running anything if
/// the tooling is missing.
pub fn publish(
    tools: &dyn ImageTools,
    command: &PublishCommand,
) -> Result<PublishOutput, ManifestError> {
    if !tools.is_available() {
        return Err(ManifestError::BuildxUnavailable);
    }
    tools.publish(command)
}
