//! Free function binding
//!
//! The strategy receives the call arguments and the selected implementation is
//! invoked with exactly those arguments.

use std::fmt;

use crate::config::{ConfigError, RegistryOptions};
use crate::dispatch::bindings::{Binding, Selection};
use crate::dispatch::error::{DispatchError, RegistrationError, ResolveError};
use crate::dispatch::registry::VersionRegistry;
use crate::dispatch::strategy::{Unconfigured, VersionStrategy};
use crate::dispatch::types::{BindingKind, Version};

type Implementation<A, R, E> = Box<dyn Fn(A) -> Result<R, E> + Send + Sync>;
type RejectionHandler<A, R, E> = Box<dyn Fn(&ResolveError, A) -> Result<R, E> + Send + Sync>;

/// A versioned free function taking arguments `A`
pub struct VersionedFn<A, R, E = DispatchError, S = Unconfigured> {
    binding: Binding<Implementation<A, R, E>, RejectionHandler<A, R, E>, S>,
}

impl<A, R, E> VersionedFn<A, R, E> {
    pub fn new() -> Self {
        Self::from_registry(VersionRegistry::new())
    }

    pub fn with_options(options: RegistryOptions) -> Result<Self, ConfigError> {
        Ok(Self::from_registry(VersionRegistry::with_options(options)?))
    }

    fn from_registry(registry: VersionRegistry<Implementation<A, R, E>>) -> Self {
        Self {
            binding: Binding::new(BindingKind::Free, registry),
        }
    }
}

impl<A, R, E> Default for VersionedFn<A, R, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, R, E, S> VersionedFn<A, R, E, S> {
    /// Replace the version number strategy
    pub fn with_strategy<S2: VersionStrategy<A>>(self, strategy: S2) -> VersionedFn<A, R, E, S2> {
        VersionedFn {
            binding: self.binding.with_strategy(strategy),
        }
    }

    /// Call `handler` in place of an implementation when resolution fails
    pub fn on_rejection<H>(mut self, handler: H) -> Self
    where
        H: Fn(&ResolveError, A) -> Result<R, E> + Send + Sync + 'static,
    {
        self.binding.on_rejection = Some(Box::new(handler));
        self
    }

    pub fn kind(&self) -> BindingKind {
        self.binding.kind
    }

    /// Entry point name, taken from the first registered implementation
    pub fn name(&self) -> Option<&'static str> {
        self.binding.registry.name()
    }

    pub fn registry(&self) -> &VersionRegistry<Implementation<A, R, E>> {
        &self.binding.registry
    }

    /// Register `implementation` under `version`, named after its type
    pub fn register<G>(
        &mut self,
        version: Version,
        implementation: G,
    ) -> Result<&mut Self, RegistrationError>
    where
        G: Fn(A) -> Result<R, E> + Send + Sync + 'static,
    {
        self.register_as(version, std::any::type_name::<G>(), implementation)
    }

    /// Register `implementation` under `version` with an explicit name
    pub fn register_as<G>(
        &mut self,
        version: Version,
        name: &'static str,
        implementation: G,
    ) -> Result<&mut Self, RegistrationError>
    where
        G: Fn(A) -> Result<R, E> + Send + Sync + 'static,
    {
        self.binding.register_as(version, name, Box::new(implementation))?;
        Ok(self)
    }

    pub fn begin_registration(&mut self, version: Version) -> Result<&mut Self, RegistrationError> {
        self.binding.begin_registration(version)?;
        Ok(self)
    }

    pub fn complete_registration<G>(
        &mut self,
        implementation: G,
    ) -> Result<&mut Self, RegistrationError>
    where
        G: Fn(A) -> Result<R, E> + Send + Sync + 'static,
    {
        self.complete_registration_as(std::any::type_name::<G>(), implementation)
    }

    pub fn complete_registration_as<G>(
        &mut self,
        name: &'static str,
        implementation: G,
    ) -> Result<&mut Self, RegistrationError>
    where
        G: Fn(A) -> Result<R, E> + Send + Sync + 'static,
    {
        self.binding.complete_registration_as(name, Box::new(implementation))?;
        Ok(self)
    }
}

impl<A, R, E, S> VersionedFn<A, R, E, S>
where
    S: VersionStrategy<A>,
    E: From<DispatchError>,
{
    /// Compute the requested version from `args`, resolve it and invoke the selection with `args`
    pub fn call(&self, args: A) -> Result<R, E> {
        match self.binding.select(&args)? {
            Selection::Implementation(implementation) => implementation(args),
            Selection::Rejected(handler, error) => handler(&error, args),
        }
    }
}

impl<A, R, E, S: fmt::Debug> fmt::Debug for VersionedFn<A, R, E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VersionedFn").field(&self.binding).finish()
    }
}
