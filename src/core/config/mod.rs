//! core::config
//!
//! Configuration file loading.
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Config file
//! 3. CI inputs (`INPUT_*`, not handled here)
//! 4. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! The first existing file wins:
//! 1. `--config <path>` (must exist)
//! 2. `$CI_ACTIONS_CONFIG`
//! 3. `$XDG_CONFIG_HOME/ci-actions/config.toml`
//! 4. `<platform config dir>/ci-actions/config.toml`
//!
//! A missing file is not an error; defaults are used.
//!
//! # Example
//!
//! ```no_run
//! use ci_actions::core::config::Config;
//!
//! let result = Config::load(None).unwrap();
//! println!("Release API: {}", result.config.releases().api_base());
//! ```

pub mod schema;

pub use schema::{BuildxConfig, FileConfig, ReleasesConfig};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "CI_ACTIONS_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Loaded configuration with defaults applied by accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    path: Option<PathBuf>,
    releases: ReleasesConfig,
    buildx: BuildxConfig,
}

impl Config {
    /// Build a config from already-parsed file contents.
    pub fn from_file_config(file: FileConfig, path: Option<PathBuf>) -> Self {
        Self {
            releases: file.releases.unwrap_or_default(),
            buildx: file.buildx.unwrap_or_default(),
            path,
        }
    }

    /// Load configuration.
    ///
    /// If `explicit` is provided it must exist; otherwise the standard
    /// locations are searched.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed,
    /// or validated.
    pub fn load(explicit: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::find(&mut warnings),
        };

        let config = match path {
            Some(path) => {
                let file = Self::read_config(&path)?;
                file.validate()?;
                Self::from_file_config(file, Some(path))
            }
            None => Config::default(),
        };

        Ok(ConfigLoadResult { config, warnings })
    }

    /// Search the standard locations for a config file.
    fn find(warnings: &mut Vec<ConfigWarning>) -> Option<PathBuf> {
        // 1. $CI_ACTIONS_CONFIG
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
            warnings.push(ConfigWarning {
                message: format!("{} points to a missing file, ignoring it", CONFIG_ENV),
                path,
            });
        }

        // 2. $XDG_CONFIG_HOME/ci-actions/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("ci-actions/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Platform config directory
        dirs::config_dir()
            .map(|dir| dir.join("ci-actions/config.toml"))
            .filter(|path| path.exists())
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Release query settings.
    pub fn releases(&self) -> &ReleasesConfig {
        &self.releases
    }

    /// Manifest publishing settings.
    pub fn buildx(&self) -> &BuildxConfig {
        &self.buildx
    }

    /// Path of the loaded file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
