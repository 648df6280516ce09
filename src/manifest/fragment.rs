//! manifest::fragment
//!
//! Per-build metadata fragments.
//!
//! Each build job writes one JSON file describing the image it pushed:
//!
//! ```json
//! {"image": "app", "tags": ["8.3-amd64"], "digests": ["sha256:..."]}
//! ```
//!
//! All fields are optional. Files are read in directory-listing order,
//! which depends on the filesystem.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ManifestError;

/// Metadata describing one per-architecture build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildMetadata {
    /// Image name, e.g. `app`
    #[serde(default)]
    pub image: Option<String>,
    /// Tags pushed for this build
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Digests pushed for this build
    #[serde(default)]
    pub digests: Option<Vec<String>>,
}

/// Parse a fragment from JSON text.
pub fn parse_fragment(path: &Path, contents: &str) -> Result<BuildMetadata, ManifestError> {
    serde_json::from_str(contents).map_err(|e| ManifestError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Read every `*.json` fragment in `dir`, in listing order.
///
/// Entries without the `.json` suffix are ignored.
///
/// # Errors
///
/// Any unreadable entry or malformed file aborts the whole read.
pub fn read_fragments(dir: &Path) -> Result<Vec<BuildMetadata>, ManifestError> {
    let entries = fs::read_dir(dir).map_err(|e| ManifestError::ReadDir {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut fragments = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ManifestError::ReadDir {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !is_fragment(&path) {
            continue;
        }

        let contents = fs::read_to_string(&path).map_err(|e| ManifestError::Read {
            path: path.clone(),
            source: e,
        })?;
        fragments.push(parse_fragment(&path, &contents)?);
    }

    Ok(fragments)
}

fn is_fragment(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".json"))
}
