//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Verbosity-aware messages and output groups
//!
//! # Design
//!
//! All diagnostics go through this module so that `--quiet` and
//! `--debug` behave the same in every command.

pub mod output;
