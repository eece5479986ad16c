use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dispatch::types::Version;

/// Environment variable consulted by the CLI for a default options file
pub const OPTIONS_PATH_ENV: &str = "VERSION_DISPATCH_OPTIONS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read options file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid options: {0}")]
    Json(#[from] serde_json::Error),

    #[error("minimum version {min} is greater than maximum version {max}")]
    InvertedBounds { min: Version, max: Version },
}

/// Construction-time options for a version registry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistryOptions {
    /// Seeds the first pending registration
    pub initial_version: Option<Version>,
    /// Inclusive lower bound; only checked in fallback mode
    pub min_version: Option<Version>,
    /// Inclusive upper bound; only checked in fallback mode
    pub max_version: Option<Version>,
    /// Nearest-lower-or-equal matching when true, exact matching when false
    pub fallback: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            initial_version: None,
            min_version: None,
            max_version: None,
            fallback: true,
        }
    }
}

impl RegistryOptions {
    /// Options whose first registration targets `version` without an explicit begin
    pub fn starting_at(version: Version) -> Self {
        Self {
            initial_version: Some(version),
            ..Self::default()
        }
    }

    pub fn with_min_version(mut self, min: Version) -> Self {
        self.min_version = Some(min);
        self
    }

    pub fn with_max_version(mut self, max: Version) -> Self {
        self.max_version = Some(max);
        self
    }

    /// Switch to exact-match resolution
    pub fn exact(mut self) -> Self {
        self.fallback = false;
        self
    }

    /// Apply command-line overrides on top of loaded options
    ///
    /// A bound given here replaces the loaded one, and `exact` only ever
    /// switches fallback off.
    pub fn overridden(mut self, min: Option<Version>, max: Option<Version>, exact: bool) -> Self {
        if min.is_some() {
            self.min_version = min;
        }
        if max.is_some() {
            self.max_version = max;
        }
        if exact {
            self.fallback = false;
        }
        self
    }

    /// Reject a lower bound above the upper bound
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (self.min_version, self.max_version) {
            (Some(min), Some(max)) if min > max => Err(ConfigError::InvertedBounds { min, max }),
            _ => Ok(()),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

/// Returns the options file to load: the explicit path if given,
/// otherwise the path in $VERSION_DISPATCH_OPTIONS, otherwise none.
pub fn options_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    let from_env = std::env::var_os(OPTIONS_PATH_ENV).map(PathBuf::from);
    options_path_with_env(explicit, from_env)
}

/// Load options from the resolved options file, or defaults when there is none
pub fn load_options(explicit: Option<PathBuf>) -> Result<RegistryOptions, ConfigError> {
    match options_path(explicit) {
        Some(path) => RegistryOptions::load(path),
        None => Ok(RegistryOptions::default()),
    }
}

fn options_path_with_env(explicit: Option<PathBuf>, from_env: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or(from_env)
}
