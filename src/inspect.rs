//! Resolution report for the `version-dispatch` CLI
//!
//! Builds a registry whose implementations are the registered version numbers
//! themselves, then records which one every requested version resolves to.

use serde::Serialize;
use thiserror::Error;

use crate::config::{ConfigError, RegistryOptions};
use crate::dispatch::error::{RegistrationError, RejectionKind};
use crate::dispatch::registry::VersionRegistry;
use crate::dispatch::types::Version;

#[derive(Debug, Error)]
pub enum InspectError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

/// Result of resolving one requested version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Resolved {
        requested: Version,
        resolved: Version,
    },
    Rejected {
        requested: Version,
        kind: RejectionKind,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionReport {
    pub options: RegistryOptions,
    /// Registered versions, newest first
    pub versions: Vec<Version>,
    pub outcomes: Vec<Outcome>,
}

impl ResolutionReport {
    /// Register `versions` under `options` and resolve every entry of `requested`
    ///
    /// The versions are registered directly, so `initial_version` is ignored.
    pub fn build(
        options: RegistryOptions,
        versions: &[Version],
        requested: &[Version],
    ) -> Result<Self, InspectError> {
        let options = RegistryOptions {
            initial_version: None,
            ..options
        };
        let mut registry = VersionRegistry::with_options(options)?;
        for &version in versions {
            registry.register_as(version, "inspect", version)?;
        }

        let outcomes = requested
            .iter()
            .map(|&requested| match registry.resolve(requested) {
                Ok(&resolved) => Outcome::Resolved {
                    requested,
                    resolved,
                },
                Err(error) => Outcome::Rejected {
                    requested,
                    kind: error.kind(),
                    message: error.to_string(),
                },
            })
            .collect();

        Ok(Self {
            options,
            versions: registry.versions().collect(),
            outcomes,
        })
    }

    pub fn has_rejections(&self) -> bool {
        self.outcomes
            .iter()
            .any(|outcome| matches!(outcome, Outcome::Rejected { .. }))
    }

    /// One line per requested version
    pub fn render(&self) -> String {
        self.outcomes
            .iter()
            .map(|outcome| match outcome {
                Outcome::Resolved {
                    requested,
                    resolved,
                } => format!("{requested} -> {resolved}"),
                Outcome::Rejected {
                    requested, message, ..
                } => format!("{requested} -> error: {message}"),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
