//! cli::commands::push_manifest
//!
//! Merge per-build metadata and publish a multi-arch manifest.
//!
//! # Design
//!
//! The command:
//! - Resolves the metadata directory, repository, fallback image name,
//!   extra tags and annotations from flags and CI inputs
//! - Refuses to run without buildx (unless this is a dry run)
//! - Reads all `*.json` fragments (any bad file aborts before publishing)
//! - Builds the `imagetools create` arguments and publishes
//! - Relays buildx's stderr (metadata warnings, failure detail) and stdout
//!
//! # Example
//!
//! ```bash
//! ci-actions push-manifest --metadata-path ./metadata \
//!     --repository ghcr.io/acme --tag latest
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};

use crate::cli::Context;
use crate::core::actions::ActionInputs;
use crate::manifest::{
    aggregate, publish, read_fragments, BuildxImageTools, ImageTools, ManifestError,
    ManifestInputs, PublishCommand,
};
use crate::ui::output;

/// Command-line arguments for `push-manifest`.
#[derive(Debug, Clone, Default)]
pub struct PushManifestArgs {
    pub metadata_path: Option<PathBuf>,
    pub repository: Option<String>,
    pub image_name: Option<String>,
    pub tags: Vec<String>,
    pub annotations: Vec<String>,
    pub dry_run: bool,
}

/// Fully resolved request.
#[derive(Debug, Clone)]
pub struct PushManifestRequest {
    pub metadata_path: PathBuf,
    pub inputs: ManifestInputs,
    pub dry_run: bool,
}

/// Run the push-manifest command.
pub fn push_manifest(ctx: &Context, args: PushManifestArgs) -> Result<()> {
    let config = ctx.load_config()?;
    let request = resolve(&args, &ActionInputs::from_env())?;
    let tools = BuildxImageTools::new(config.buildx().program(), config.buildx().standalone());
    run_with_tools(ctx, &request, &tools)?;
    Ok(())
}

/// Resolve the request: flags first, then CI inputs.
///
/// Repeatable flags replace the matching list input rather than adding
/// to it.
pub fn resolve(args: &PushManifestArgs, inputs: &ActionInputs) -> Result<PushManifestRequest> {
    let Some(metadata_path) = args
        .metadata_path
        .clone()
        .or_else(|| inputs.get("metadata-path").map(PathBuf::from))
    else {
        bail!("A metadata path is required (--metadata-path or the metadata-path input)");
    };

    let list = |flag: &Vec<String>, input: &str| {
        if flag.is_empty() {
            inputs.get_list(input)
        } else {
            flag.clone()
        }
    };

    Ok(PushManifestRequest {
        metadata_path,
        inputs: ManifestInputs {
            repository: args
                .repository
                .clone()
                .or_else(|| inputs.get("repository"))
                .unwrap_or_default(),
            image_name: args.image_name.clone().or_else(|| inputs.get("image-name")),
            tags: list(&args.tags, "tags"),
            annotations: list(&args.annotations, "annotations"),
        },
        dry_run: args.dry_run,
    })
}

/// Read, aggregate and publish with the given tooling.
///
/// Returns the command that was (or, on a dry run, would have been) run.
pub fn run_with_tools(
    ctx: &Context,
    request: &PushManifestRequest,
    tools: &dyn ImageTools,
) -> Result<PublishCommand> {
    let verbosity = ctx.verbosity();

    if !request.dry_run && !tools.is_available() {
        return Err(ManifestError::BuildxUnavailable.into());
    }

    let fragments = read_fragments(&request.metadata_path).with_context(|| {
        format!(
            "Failed to read build metadata from {}",
            request.metadata_path.display()
        )
    })?;
    output::debug(
        format!(
            "Read {} metadata file(s) from {}",
            fragments.len(),
            request.metadata_path.display()
        ),
        verbosity,
    );

    let command = aggregate(&fragments, &request.inputs)?;

    let (program, args) = tools.command_line(&command);
    output::print(format!("toolCmd.command: {}", program), verbosity);
    output::print(
        format!("toolCmd.args: {}", serde_json::to_string(&args)?),
        verbosity,
    );

    if request.dry_run {
        output::success("Dry run, not publishing", verbosity);
        return Ok(command);
    }

    let result = publish(tools, &command).inspect_err(|err| {
        if let ManifestError::PublishFailed { stderr, .. } = err {
            relay(stderr, verbosity);
        }
    })?;
    relay(&result.stderr, verbosity);
    relay(&result.stdout, verbosity);
    output::success("Manifest published", verbosity);

    Ok(command)
}

/// Print the non-empty lines of a child process stream.
fn relay(text: &str, verbosity: output::Verbosity) {
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        output::print(line, verbosity);
    }
}
