//! ci-actions - CI helpers for release tracking and image publishing
//!
//! Two independent helpers built for CI pipelines:
//!
//! - **php-versions**: classifies PHP release branches into `eol`,
//!   `security` and `stable` buckets, each with the latest patch release
//!   of every branch, and publishes them as step outputs.
//! - **push-manifest**: merges per-architecture build metadata into one
//!   multi-arch manifest and publishes it with `docker buildx imagetools`.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, resolves options)
//! - [`releases`] - Release sources and branch classification
//! - [`manifest`] - Metadata aggregation and manifest publishing
//! - [`core`] - Configuration and CI input/output plumbing
//! - [`ui`] - User-facing output
//!
//! # Guarantees
//!
//! 1. Outputs are written only after a run fully succeeds
//! 2. Every external call is made sequentially and awaited
//! 3. The parent process environment is never modified

pub mod cli;
pub mod core;
pub mod manifest;
pub mod releases;
pub mod ui;
