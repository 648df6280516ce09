//! cli
//!
//! Command-line interface layer for ci-actions.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Resolve options from flags, CI inputs and the config file
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. Classification lives in [`crate::releases`] and
//! manifest publishing in [`crate::manifest`]; handlers only wire inputs,
//! configuration and outputs around them.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::ui::output::{self, Verbosity};

/// Per-invocation context shared by all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Explicit config file (`--config`)
    pub config_path: Option<PathBuf>,
    /// Enable debug output
    pub debug: bool,
    /// Minimal output
    pub quiet: bool,
}

impl Context {
    /// Output verbosity derived from the flags.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }

    /// Load configuration, reporting any load warnings.
    pub fn load_config(&self) -> Result<Config> {
        let result = Config::load(self.config_path.as_deref()).context("Failed to load config")?;
        for warning in &result.warnings {
            output::warn(
                format!("{} ({})", warning.message, warning.path.display()),
                self.verbosity(),
            );
        }
        if let Some(path) = result.config.path() {
            output::debug(
                format!("Using config {}", path.display()),
                self.verbosity(),
            );
        }
        Ok(result.config)
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let ctx = Context {
        config_path: cli.config.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
    };

    commands::dispatch(cli.command, &ctx)
}
