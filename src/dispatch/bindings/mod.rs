//! Binding adapters: one per call shape
//!
//! Each adapter owns a [`VersionRegistry`](crate::dispatch::registry::VersionRegistry)
//! of boxed implementations plus a [`VersionStrategy`]. The call shape is fixed by
//! the adapter type chosen at construction:
//!
//! - [`VersionedFn`]: free function or static method, strategy sees the arguments
//! - [`VersionedMethod`]: method bound to a receiver, strategy sees the receiver
//! - [`VersionedTypeFn`]: type-level method, strategy sees only the owning type
//!
//! Faults returned by a selected implementation are passed through untouched.

pub mod free;
pub mod instance;
pub mod type_level;

pub use free::VersionedFn;
pub use instance::VersionedMethod;
pub use type_level::VersionedTypeFn;

use std::fmt;

use tracing::debug;

use crate::dispatch::error::{DispatchError, RegistrationError, ResolveError};
use crate::dispatch::registry::VersionRegistry;
use crate::dispatch::strategy::{Unconfigured, VersionStrategy};
use crate::dispatch::types::{BindingKind, Version};

/// State shared by every adapter
///
/// `I` is the boxed implementation type and `H` the boxed rejection handler,
/// both shaped by the adapter that owns the binding.
struct Binding<I, H, S> {
    kind: BindingKind,
    registry: VersionRegistry<I>,
    strategy: S,
    on_rejection: Option<H>,
}

/// What a call ends up invoking
enum Selection<'a, I, H> {
    Implementation(&'a I),
    Rejected(&'a H, ResolveError),
}

impl<I, H> Binding<I, H, Unconfigured> {
    fn new(kind: BindingKind, registry: VersionRegistry<I>) -> Self {
        Self {
            kind,
            registry,
            strategy: Unconfigured,
            on_rejection: None,
        }
    }
}

impl<I, H, S> Binding<I, H, S> {
    fn with_strategy<S2>(self, strategy: S2) -> Binding<I, H, S2> {
        Binding {
            kind: self.kind,
            registry: self.registry,
            strategy,
            on_rejection: self.on_rejection,
        }
    }

    fn register_as(
        &mut self,
        version: Version,
        name: &'static str,
        implementation: I,
    ) -> Result<(), RegistrationError> {
        self.registry.register_as(version, name, implementation)?;
        Ok(())
    }

    fn begin_registration(&mut self, version: Version) -> Result<(), RegistrationError> {
        self.registry.begin_registration(version)?;
        Ok(())
    }

    fn complete_registration_as(
        &mut self,
        name: &'static str,
        implementation: I,
    ) -> Result<(), RegistrationError> {
        self.registry.complete_registration_as(name, implementation)?;
        Ok(())
    }

    /// Ask the strategy for a version and pick what serves it
    ///
    /// A resolution fault goes to the rejection handler when one is set.
    /// Strategy faults always propagate.
    fn select<C>(&self, context: &C) -> Result<Selection<'_, I, H>, DispatchError>
    where
        C: ?Sized,
        S: VersionStrategy<C>,
    {
        let version = self.strategy.version_number(context)?;
        match self.registry.resolve(version) {
            Ok(implementation) => Ok(Selection::Implementation(implementation)),
            Err(error) => {
                debug!(
                    binding = %self.kind,
                    entry_point = self.registry.name().unwrap_or_default(),
                    requested = error.requested(),
                    handled = self.on_rejection.is_some(),
                    "version rejected: {}",
                    error
                );
                match &self.on_rejection {
                    Some(handler) => Ok(Selection::Rejected(handler, error)),
                    None => Err(error.into()),
                }
            }
        }
    }
}

impl<I, H, S: fmt::Debug> fmt::Debug for Binding<I, H, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("kind", &self.kind)
            .field("registry", &self.registry)
            .field("strategy", &self.strategy)
            .field("on_rejection", &self.on_rejection.is_some())
            .finish()
    }
}
