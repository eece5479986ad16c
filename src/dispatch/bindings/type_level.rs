//! Type-level method binding
//!
//! The strategy only sees the owning type, as an [`Owner<T>`] marker; the
//! selected implementation receives the same marker followed by the call arguments.

use std::fmt;

use crate::config::{ConfigError, RegistryOptions};
use crate::dispatch::bindings::{Binding, Selection};
use crate::dispatch::error::{DispatchError, RegistrationError, ResolveError};
use crate::dispatch::registry::VersionRegistry;
use crate::dispatch::strategy::{Unconfigured, VersionStrategy};
use crate::dispatch::types::{BindingKind, Owner, Version};

type Implementation<T, A, R, E> = Box<dyn Fn(Owner<T>, A) -> Result<R, E> + Send + Sync>;
type RejectionHandler<T, A, R, E> =
    Box<dyn Fn(&ResolveError, Owner<T>, A) -> Result<R, E> + Send + Sync>;

/// A versioned associated function of `T` taking arguments `A`
pub struct VersionedTypeFn<T, A, R, E = DispatchError, S = Unconfigured> {
    binding: Binding<Implementation<T, A, R, E>, RejectionHandler<T, A, R, E>, S>,
}

impl<T, A, R, E> VersionedTypeFn<T, A, R, E> {
    pub fn new() -> Self {
        Self::from_registry(VersionRegistry::new())
    }

    pub fn with_options(options: RegistryOptions) -> Result<Self, ConfigError> {
        Ok(Self::from_registry(VersionRegistry::with_options(options)?))
    }

    fn from_registry(registry: VersionRegistry<Implementation<T, A, R, E>>) -> Self {
        Self {
            binding: Binding::new(BindingKind::Type, registry),
        }
    }
}

impl<T, A, R, E> Default for VersionedTypeFn<T, A, R, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A, R, E, S> VersionedTypeFn<T, A, R, E, S> {
    pub fn with_strategy<S2>(self, strategy: S2) -> VersionedTypeFn<T, A, R, E, S2>
    where
        S2: VersionStrategy<Owner<T>>,
    {
        VersionedTypeFn {
            binding: self.binding.with_strategy(strategy),
        }
    }

    /// Call `handler` in place of an implementation when resolution fails
    pub fn on_rejection<H>(mut self, handler: H) -> Self
    where
        H: Fn(&ResolveError, Owner<T>, A) -> Result<R, E> + Send + Sync + 'static,
    {
        self.binding.on_rejection = Some(Box::new(handler));
        self
    }

    pub fn kind(&self) -> BindingKind {
        self.binding.kind
    }

    pub fn name(&self) -> Option<&'static str> {
        self.binding.registry.name()
    }

    pub fn registry(&self) -> &VersionRegistry<Implementation<T, A, R, E>> {
        &self.binding.registry
    }

    pub fn register<G>(
        &mut self,
        version: Version,
        implementation: G,
    ) -> Result<&mut Self, RegistrationError>
    where
        G: Fn(Owner<T>, A) -> Result<R, E> + Send + Sync + 'static,
    {
        self.register_as(version, std::any::type_name::<G>(), implementation)
    }

    pub fn register_as<G>(
        &mut self,
        version: Version,
        name: &'static str,
        implementation: G,
    ) -> Result<&mut Self, RegistrationError>
    where
        G: Fn(Owner<T>, A) -> Result<R, E> + Send + Sync + 'static,
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
        G: Fn(Owner<T>, A) -> Result<R, E> + Send + Sync + 'static,
    {
        self.complete_registration_as(std::any::type_name::<G>(), implementation)
    }

    pub fn complete_registration_as<G>(
        &mut self,
        name: &'static str,
        implementation: G,
    ) -> Result<&mut Self, RegistrationError>
    where
        G: Fn(Owner<T>, A) -> Result<R, E> + Send + Sync + 'static,
    {
        self.binding.complete_registration_as(name, Box::new(implementation))?;
        Ok(self)
    }
}

impl<T, A, R, E, S> VersionedTypeFn<T, A, R, E, S>
where
    S: VersionStrategy<Owner<T>>,
    E: From<DispatchError>,
{
    pub fn call(&self, args: A) -> Result<R, E> {
        let owner = Owner::<T>::new();
        match self.binding.select(&owner)? {
            Selection::Implementation(implementation) => implementation(owner, args),
            Selection::Rejected(handler, error) => handler(&error, owner, args),
        }
    }
}

impl<T, A, R, E, S: fmt::Debug> fmt::Debug for VersionedTypeFn<T, A, R, E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionedTypeFn")
            .field("owner", &std::any::type_name::<T>())
            .field("binding", &self.binding)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::error::StrategyError;

    trait ApiLevel {
        const API_VERSION: Version;
    }

    struct Legacy;
    struct Current;

    impl ApiLevel for Legacy {
        const API_VERSION: Version = 1;
    }

    impl ApiLevel for Current {
        const API_VERSION: Version = 4;
    }

    /// Requests the version the owning type declares
    struct Declared;

    impl<T: ApiLevel> VersionStrategy<Owner<T>> for Declared {
        fn version_number(&self, _owner: &Owner<T>) -> Result<Version, StrategyError> {
            Ok(T::API_VERSION)
        }
    }

    type Described<T> = VersionedTypeFn<T, (), String, DispatchError, Declared>;

    fn describe<T: ApiLevel + 'static>() -> Described<T> {
        let mut versioned = VersionedTypeFn::new();
        versioned
            .register(1, |owner: Owner<T>, ()| Ok(format!("{owner:?} v1")))
            .unwrap()
            .register(3, |owner: Owner<T>, ()| Ok(format!("{owner:?} v3")))
            .unwrap();
        versioned.with_strategy(Declared)
    }

    #[test]
    fn call_resolves_version_from_owning_type() {
        let legacy = describe::<Legacy>().call(()).unwrap();
        let current = describe::<Current>().call(()).unwrap();

        assert!(legacy.ends_with("Legacy> v1"));
        assert!(current.ends_with("Current> v3"));
    }

    #[test]
    fn call_passes_resolution_fault_to_rejection_handler() {
        let mut versioned = VersionedTypeFn::<Legacy, (), String>::new()
            .on_rejection(|error, _, ()| Ok(format!("fallback {}", error.requested())));
        versioned.register(2, |_, ()| Ok("v2".to_string())).unwrap();
        let versioned = versioned.with_strategy(Declared);

        assert_eq!(versioned.call(()).unwrap(), "fallback 1");
    }

    #[test]
    fn call_without_strategy_is_not_implemented() {
        let mut versioned = VersionedTypeFn::<Current, (), String>::new();
        versioned.register(1, |_, ()| Ok(String::new())).unwrap();

        assert!(matches!(
            versioned.call(()),
            Err(DispatchError::Strategy(StrategyError::NotImplemented))
        ));
        assert_eq!(versioned.kind(), BindingKind::Type);
    }

    #[test]
    fn named_registration_names_entry_point() {
        let mut versioned = VersionedTypeFn::<Current, (), &str>::new();
        versioned
            .begin_registration(2)
            .unwrap()
            .complete_registration_as("schema", |_, ()| Ok("v2"))
            .unwrap()
            .register_as(4, "schema_v4", |_, ()| Ok("v4"))
            .unwrap();
        let versioned = versioned.with_strategy(Declared);

        assert_eq!(versioned.name(), Some("schema"));
        assert_eq!(versioned.call(()).unwrap(), "v4");
    }
}
