//! core
//!
//! Ambient plumbing shared by every command.
//!
//! # Modules
//!
//! - [`config`] - Configuration schema and loading
//! - [`actions`] - CI runner inputs and outputs

pub mod actions;
pub mod config;
