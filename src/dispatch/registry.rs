//! Version registry: maps version numbers to implementations
//!
//! Resolution runs in one of two modes:
//! - fallback (default): bounds are checked first, then the greatest registered
//!   version `<=` the requested one is selected
//! - exact: only an exact key match is accepted, bounds are ignored

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::config::{ConfigError, RegistryOptions};
use crate::dispatch::error::{RegistrationError, ResolveError};
use crate::dispatch::types::Version;

/// Holds every registered implementation of one operation, keyed by version.
///
/// The registry never calls `F`; it only selects it. Binding adapters in
/// [`crate::dispatch::bindings`] decide how a selected implementation is invoked.
pub struct VersionRegistry<F> {
    entries: BTreeMap<Version, F>,
    pending: Option<Version>,
    name: Option<&'static str>,
    options: RegistryOptions,
}

impl<F> Default for VersionRegistry<F> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            pending: None,
            name: None,
            options: RegistryOptions::default(),
        }
    }
}

impl<F> VersionRegistry<F> {
    /// Create an empty registry with fallback resolution and no bounds
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with the given options
    ///
    /// `initial_version`, when set, becomes the pending registration.
    pub fn with_options(options: RegistryOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self {
            entries: BTreeMap::new(),
            pending: options.initial_version,
            name: None,
            options,
        })
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    /// Name of the first registered implementation, used as the entry point name
    pub fn name(&self) -> Option<&'static str> {
        self.name
    }

    /// Version waiting for its implementation, if a registration is in progress
    pub fn pending(&self) -> Option<Version> {
        self.pending
    }

    /// Registered versions, newest first
    pub fn versions(&self) -> impl Iterator<Item = Version> + '_ {
        self.entries.keys().rev().copied()
    }

    pub fn contains(&self, version: Version) -> bool {
        self.entries.contains_key(&version)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mark `version` as the target of the next completed registration
    pub fn begin_registration(&mut self, version: Version) -> Result<&mut Self, RegistrationError> {
        if let Some(pending) = self.pending {
            return Err(RegistrationError::DuplicateRegistrationInProgress {
                pending,
                requested: version,
            });
        }
        if self.entries.contains_key(&version) {
            return Err(RegistrationError::VersionAlreadyRegistered(version));
        }

        self.pending = Some(version);
        Ok(self)
    }

    /// Attach `implementation` to the pending version
    pub fn complete_registration(
        &mut self,
        implementation: F,
    ) -> Result<&mut Self, RegistrationError> {
        self.complete_registration_as(std::any::type_name::<F>(), implementation)
    }

    /// Attach `implementation` to the pending version under an explicit name
    pub fn complete_registration_as(
        &mut self,
        name: &'static str,
        implementation: F,
    ) -> Result<&mut Self, RegistrationError> {
        let version = self
            .pending
            .take()
            .ok_or(RegistrationError::NoPendingRegistration)?;
        self.insert(version, name, implementation)?;
        Ok(self)
    }

    /// Register `implementation` under `version` in one step
    pub fn register(
        &mut self,
        version: Version,
        implementation: F,
    ) -> Result<&mut Self, RegistrationError> {
        self.register_as(version, std::any::type_name::<F>(), implementation)
    }

    /// Register `implementation` under `version` in one step, with an explicit name
    pub fn register_as(
        &mut self,
        version: Version,
        name: &'static str,
        implementation: F,
    ) -> Result<&mut Self, RegistrationError> {
        if let Some(pending) = self.pending {
            return Err(RegistrationError::DuplicateRegistrationInProgress {
                pending,
                requested: version,
            });
        }
        self.insert(version, name, implementation)?;
        Ok(self)
    }

    fn insert(
        &mut self,
        version: Version,
        name: &'static str,
        implementation: F,
    ) -> Result<(), RegistrationError> {
        if self.entries.contains_key(&version) {
            return Err(RegistrationError::VersionAlreadyRegistered(version));
        }

        self.entries.insert(version, implementation);
        let entry_point = *self.name.get_or_insert(name);
        debug!(
            entry_point,
            version,
            registered = self.entries.len(),
            "registered implementation"
        );
        Ok(())
    }

    /// Select the implementation serving `requested`
    pub fn resolve(&self, requested: Version) -> Result<&F, ResolveError> {
        self.resolve_entry(requested).map(|(_, implementation)| implementation)
    }

    /// Select the registered version serving `requested`
    pub fn resolve_version(&self, requested: Version) -> Result<Version, ResolveError> {
        self.resolve_entry(requested).map(|(version, _)| version)
    }

    fn resolve_entry(&self, requested: Version) -> Result<(Version, &F), ResolveError> {
        if !self.options.fallback {
            return self
                .entries
                .get(&requested)
                .map(|implementation| (requested, implementation))
                .ok_or(ResolveError::VersionNotFound { requested });
        }

        if let Some(min) = self.options.min_version {
            if requested < min {
                return Err(ResolveError::VersionTooLow { requested, min });
            }
        }
        if let Some(max) = self.options.max_version {
            if requested > max {
                return Err(ResolveError::VersionTooHigh { requested, max });
            }
        }

        let (version, implementation) = self
            .entries
            .range(..=requested)
            .next_back()
            .ok_or(ResolveError::VersionNotFound { requested })?;

        if *version != requested {
            debug!(
                entry_point = self.name.unwrap_or_default(),
                requested,
                resolved = *version,
                "fell back to nearest lower version"
            );
        }
        Ok((*version, implementation))
    }
}

impl<F> fmt::Debug for VersionRegistry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionRegistry")
            .field("name", &self.name)
            .field("versions", &self.versions().collect::<Vec<_>>())
            .field("pending", &self.pending)
            .field("options", &self.options)
            .finish()
    }
}
