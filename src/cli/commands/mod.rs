//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Resolves its options from flags, CI inputs and config
//! 2. Calls into [`crate::releases`] or [`crate::manifest`]
//! 3. Reports progress and writes outputs
//!
//! # Async Commands
//!
//! `php-versions` is async because it involves network I/O. Its handler
//! builds a `tokio::runtime::Runtime` and blocks on the async body so that
//! dispatch stays synchronous.

mod completion;
pub mod php_versions;
pub mod push_manifest;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use php_versions::{php_versions, PhpVersionsArgs};
pub use push_manifest::{push_manifest, PushManifestArgs};

use crate::cli::args::Command;
use crate::cli::Context;
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::PhpVersions {
            version_constraint,
            minimum_version,
            api_base,
        } => php_versions(
            ctx,
            PhpVersionsArgs {
                version_constraint,
                minimum_version,
                api_base,
            },
        ),
        Command::PushManifest {
            metadata_path,
            repository,
            image_name,
            tags,
            annotations,
            dry_run,
        } => push_manifest(
            ctx,
            PushManifestArgs {
                metadata_path,
                repository,
                image_name,
                tags,
                annotations,
                dry_run,
            },
        ),
        Command::Completion { shell } => completion(shell),
    }
}
