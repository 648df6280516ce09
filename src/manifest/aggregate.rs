//! manifest::aggregate
//!
//! Merge build fragments into one `imagetools create` invocation.
//!
//! # Argument layout
//!
//! ```text
//! create --annotation <a>... --tag <t>... <repository>/<image>@<digest>...
//! ```
//!
//! Tags are the fragment tags in fragment order followed by the extra
//! tags. Nothing is de-duplicated.

use std::collections::BTreeMap;

use super::fragment::BuildMetadata;
use super::ManifestError;

/// The `imagetools` subcommand used to publish.
pub const CREATE_VERB: &str = "create";

/// Environment variable enabling buildx metadata warnings.
pub const METADATA_WARNINGS_ENV: &str = "BUILDX_METADATA_WARNINGS";

/// Tags, digests and image name merged from all fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedManifest {
    /// First non-empty image name seen
    pub image_name: Option<String>,
    /// Fragment tags, then extra tags
    pub tags: Vec<String>,
    /// Digests in order of appearance
    pub digests: Vec<String>,
}

impl AggregatedManifest {
    /// Merge fragments in order.
    pub fn from_fragments(fragments: &[BuildMetadata]) -> Self {
        let mut manifest = Self::default();
        for fragment in fragments {
            manifest.add(fragment);
        }
        manifest
    }

    /// Merge one fragment.
    ///
    /// The image name is taken from the first fragment with a non-empty
    /// `image` and never replaced afterwards.
    pub fn add(&mut self, fragment: &BuildMetadata) {
        if self.image_name.is_none() {
            self.image_name = fragment.image.clone().filter(|name| !name.is_empty());
        }
        if let Some(tags) = &fragment.tags {
            self.tags.extend(tags.iter().cloned());
        }
        if let Some(digests) = &fragment.digests {
            self.digests.extend(digests.iter().cloned());
        }
    }

    /// Fully-qualified reference for each digest.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::MissingImageName` if there are digests but
    /// no image name.
    pub fn references(&self, repository: &str) -> Result<Vec<String>, ManifestError> {
        if self.digests.is_empty() {
            return Ok(Vec::new());
        }
        let image = self
            .image_name
            .as_deref()
            .ok_or(ManifestError::MissingImageName)?;

        let repository = repository.trim_end_matches('/');
        Ok(self
            .digests
            .iter()
            .map(|digest| {
                if repository.is_empty() {
                    format!("{}@{}", image, digest)
                } else {
                    format!("{}/{}@{}", repository, image, digest)
                }
            })
            .collect())
    }
}

/// Configuration inputs for aggregation.
#[derive(Debug, Clone, Default)]
pub struct ManifestInputs {
    /// Registry/namespace prefix, e.g. `ghcr.io/acme`
    pub repository: String,
    /// Image name used when no fragment names one
    pub image_name: Option<String>,
    /// Tags appended after the fragment tags
    pub tags: Vec<String>,
    /// Annotations, `key=value`
    pub annotations: Vec<String>,
}

/// A ready-to-run `imagetools` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishCommand {
    /// Arguments after `imagetools`, starting with `create`
    pub args: Vec<String>,
    /// Variables set on the child process only
    pub env: BTreeMap<String, String>,
}

impl PublishCommand {
    /// Create a command with the default environment overrides.
    pub fn new(args: Vec<String>) -> Self {
        let env = BTreeMap::from([(METADATA_WARNINGS_ENV.to_string(), "true".to_string())]);
        Self { args, env }
    }
}

/// Build the publish command for a set of fragments.
///
/// # Example
///
/// ```
/// use ci_actions::manifest::{aggregate, BuildMetadata, ManifestInputs};
///
/// let fragments = vec![BuildMetadata {
///     image: Some("app".into()),
///     tags: Some(vec!["v1".into()]),
///     digests: Some(vec!["sha256:a".into()]),
/// }];
/// let inputs = ManifestInputs {
///     repository: "ghcr.io/acme".into(),
///     ..Default::default()
/// };
///
/// let command = aggregate(&fragments, &inputs).unwrap();
/// assert_eq!(command.args, ["create", "--tag", "v1", "ghcr.io/acme/app@sha256:a"]);
/// ```
pub fn aggregate(
    fragments: &[BuildMetadata],
    inputs: &ManifestInputs,
) -> Result<PublishCommand, ManifestError> {
    let mut manifest = AggregatedManifest::from_fragments(fragments);
    if manifest.image_name.is_none() {
        manifest.image_name = inputs.image_name.clone().filter(|name| !name.is_empty());
    }
    manifest.tags.extend(inputs.tags.iter().cloned());

    let mut args = vec![CREATE_VERB.to_string()];
    for annotation in &inputs.annotations {
        args.push("--annotation".to_string());
        args.push(annotation.clone());
    }
    for tag in &manifest.tags {
        args.push("--tag".to_string());
        args.push(tag.clone());
    }
    args.extend(manifest.references(&inputs.repository)?);

    Ok(PublishCommand::new(args))
}
