//! cli::commands::php_versions
//!
//! Classify PHP release branches and publish the buckets as outputs.
//!
//! # Design
//!
//! The command:
//! - Resolves the constraint, minimum version and API base from flags,
//!   CI inputs and config
//! - Fetches release states and classifies them (network I/O, async)
//! - Sets `php_eol_versions`, `php_security_versions` and
//!   `php_stable_versions` only after classification fully succeeds
//!
//! # Example
//!
//! ```bash
//! ci-actions php-versions --version-constraint '8.x'
//! ```

use std::time::Duration;

use anyhow::{Context as _, Result};

use crate::cli::Context;
use crate::core::actions::{ActionInputs, ActionOutputs};
use crate::core::config::Config;
use crate::releases::{
    coerce, fetch_and_classify, ClassificationResult, ClassifyOptions, PhpNetSource,
    ReleaseSource, ReleaseState, VersionConstraint,
};
use crate::ui::output;

/// CI input holding the version constraint.
pub const CONSTRAINT_INPUT: &str = "version-constraint";

/// Command-line arguments for `php-versions`.
#[derive(Debug, Clone, Default)]
pub struct PhpVersionsArgs {
    pub version_constraint: Option<String>,
    pub minimum_version: Option<String>,
    pub api_base: Option<String>,
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct PhpVersionsPlan {
    pub options: ClassifyOptions,
    pub api_base: String,
    pub timeout: Duration,
}

/// Name of the output for a state, e.g. `php_stable_versions`.
pub fn output_name(state: ReleaseState) -> String {
    format!("php_{}_versions", state)
}

/// Run the php-versions command.
pub fn php_versions(ctx: &Context, args: PhpVersionsArgs) -> Result<()> {
    let config = ctx.load_config()?;
    let plan = resolve(ctx, &args, &ActionInputs::from_env(), &config)?;
    let source = PhpNetSource::new(&plan.api_base, plan.timeout)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_with_source(
        ctx,
        &source,
        &plan.options,
        &ActionOutputs::from_env(),
    ))?;
    Ok(())
}

/// Resolve settings: flags, then CI inputs, then config, then defaults.
pub fn resolve(
    ctx: &Context,
    args: &PhpVersionsArgs,
    inputs: &ActionInputs,
    config: &Config,
) -> Result<PhpVersionsPlan> {
    let constraint_text = args
        .version_constraint
        .clone()
        .or_else(|| inputs.get(CONSTRAINT_INPUT));
    let constraint = VersionConstraint::parse_optional(constraint_text.as_deref())?;

    let minimum_text = args
        .minimum_version
        .as_deref()
        .unwrap_or_else(|| config.releases().minimum_version());
    let minimum = coerce(minimum_text).context("Invalid minimum version")?;

    let api_base = args
        .api_base
        .as_deref()
        .unwrap_or_else(|| config.releases().api_base())
        .to_string();

    Ok(PhpVersionsPlan {
        options: ClassifyOptions {
            constraint,
            minimum,
            verbosity: ctx.verbosity(),
        },
        api_base,
        timeout: config.releases().timeout(),
    })
}

/// Classify using `source` and write one output per state.
pub async fn run_with_source(
    ctx: &Context,
    source: &dyn ReleaseSource,
    options: &ClassifyOptions,
    outputs: &ActionOutputs,
) -> Result<ClassificationResult> {
    let verbosity = ctx.verbosity();
    match &options.constraint {
        Some(constraint) => output::print(
            format!("Version constraint: {}", constraint),
            verbosity,
        ),
        None => output::debug("No version constraint", verbosity),
    }

    let result = fetch_and_classify(source, options)
        .await
        .context("Failed to classify PHP versions")?;

    let mut records = Vec::with_capacity(ReleaseState::ALL.len());
    for (state, bucket) in result.iter() {
        let value = serde_json::to_string(bucket)?;
        output::group(&output_name(state), verbosity, || {
            output::print(&value, verbosity);
        });
        records.push((output_name(state), value));
    }
    outputs
        .set_all(&records)
        .context("Failed to set outputs")?;

    Ok(result)
}
