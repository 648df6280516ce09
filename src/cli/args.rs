//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Read configuration from this file
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//!
//! Command options left unset fall back to the matching CI input
//! (`INPUT_<NAME>`), then to the config file, then to built-in defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ci-actions - CI helpers for PHP release tracking and multi-arch manifests
#[derive(Parser, Debug)]
#[command(name = "ci-actions")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Read configuration from this file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify PHP release branches into eol, security and stable
    #[command(
        name = "php-versions",
        long_about = "Classify PHP release branches by support state.\n\n\
            Fetches the state of every release branch from php.net, keeps the \
            branches at or above the minimum version that satisfy the version \
            constraint, looks up the latest release of each, and sets the outputs \
            php_eol_versions, php_security_versions and php_stable_versions. Each \
            output is a JSON object {\"major\": [...], \"minor\": [...]}.",
        after_help = "\
EXAMPLES:
    # All supported branches
    ci-actions php-versions

    # Only PHP 8 branches
    ci-actions php-versions --version-constraint '8.x'

    # Inside a workflow step (reads INPUT_VERSION-CONSTRAINT, writes $GITHUB_OUTPUT)
    ci-actions php-versions"
    )]
    PhpVersions {
        /// Version range, e.g. `8.x`, `>=8.1`, `7.4 || ^8.2`
        #[arg(long, value_name = "RANGE")]
        version_constraint: Option<String>,

        /// Skip branches below this version
        #[arg(long, value_name = "VERSION")]
        minimum_version: Option<String>,

        /// Release service base URL
        #[arg(long, value_name = "URL")]
        api_base: Option<String>,
    },

    /// Publish a multi-arch manifest from per-build metadata files
    #[command(
        name = "push-manifest",
        long_about = "Publish a multi-arch manifest.\n\n\
            Reads every *.json metadata file in the metadata directory, merges \
            their tags and digests, and runs `docker buildx imagetools create` \
            with the merged tags, the extra tags and annotations, and one \
            <repository>/<image>@<digest> reference per digest.",
        after_help = "\
EXAMPLES:
    # Merge per-arch builds and add a floating tag
    ci-actions push-manifest --metadata-path ./metadata \\
        --repository ghcr.io/acme --tag latest

    # Show the command without running it
    ci-actions push-manifest --metadata-path ./metadata --repository ghcr.io/acme --dry-run"
    )]
    PushManifest {
        /// Directory containing the metadata files
        #[arg(long, value_name = "DIR")]
        metadata_path: Option<PathBuf>,

        /// Registry and namespace prefix, e.g. `ghcr.io/acme`
        #[arg(long)]
        repository: Option<String>,

        /// Image name used when no metadata file names one
        #[arg(long)]
        image_name: Option<String>,

        /// Extra tag (repeatable)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Annotation, `key=value` (repeatable)
        #[arg(long = "annotation", value_name = "ANNOTATION")]
        annotations: Vec<String>,

        /// Print the command instead of running it
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    # Bash (add to ~/.bashrc)
    ci-actions completion bash >> ~/.bashrc

    # Fish
    ci-actions completion fish > ~/.config/fish/completions/ci-actions.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
