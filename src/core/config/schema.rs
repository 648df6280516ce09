//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Config values are validated after parsing so that a bad value is
//! reported against the file it came from, not deep inside a command.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::releases::{coerce, ABSOLUTE_MINIMUM_VERSION, DEFAULT_API_BASE, DEFAULT_TIMEOUT};

/// File configuration.
///
/// # Example
///
/// ```toml
/// [releases]
/// api_base = "https://www.php.net"
/// minimum_version = "7.4"
/// timeout_secs = 30
///
/// [buildx]
/// program = "docker"
/// standalone = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Release query settings
    pub releases: Option<ReleasesConfig>,

    /// Manifest publishing settings
    pub buildx: Option<BuildxConfig>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(releases) = &self.releases {
            releases.validate()?;
        }
        if let Some(buildx) = &self.buildx {
            buildx.validate()?;
        }
        Ok(())
    }
}

/// Release query settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ReleasesConfig {
    /// Base URL of the release service
    pub api_base: Option<String>,

    /// Branches below this version are never reported
    pub minimum_version: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl ReleasesConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(api_base) = &self.api_base {
            if api_base.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "releases.api_base cannot be empty".into(),
                ));
            }
        }
        if let Some(minimum) = &self.minimum_version {
            coerce(minimum).map_err(|e| {
                ConfigError::InvalidValue(format!("releases.minimum_version: {}", e))
            })?;
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "releases.timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Base URL, defaulting to php.net.
    pub fn api_base(&self) -> &str {
        self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    /// Minimum branch version, defaulting to 7.4.
    pub fn minimum_version(&self) -> &str {
        self.minimum_version
            .as_deref()
            .unwrap_or(ABSOLUTE_MINIMUM_VERSION)
    }

    /// Request timeout, defaulting to 30 seconds.
    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }
}

/// Manifest publishing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BuildxConfig {
    /// Program to run (`docker`, or the buildx binary when standalone)
    pub program: Option<String>,

    /// Invoke `program imagetools` instead of `program buildx imagetools`
    pub standalone: Option<bool>,
}

impl BuildxConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(program) = &self.program {
            if program.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "buildx.program cannot be empty".into(),
                ));
            }
        }
        Ok(())
    }

    /// Program, defaulting to `docker`.
    pub fn program(&self) -> &str {
        self.program.as_deref().unwrap_or("docker")
    }

    /// Standalone mode, defaulting to false.
    pub fn standalone(&self) -> bool {
        self.standalone.unwrap_or(false)
    }
}
