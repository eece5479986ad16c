//! Instance-bound method binding
//!
//! The strategy receives the receiver (its version usually lives in request or
//! session state), and the selected implementation is invoked with the receiver
//! first, followed by the call arguments.

use std::fmt;

use crate::config::{ConfigError, RegistryOptions};
use crate::dispatch::bindings::{Binding, Selection};
use crate::dispatch::error::{DispatchError, RegistrationError, ResolveError};
use crate::dispatch::registry::VersionRegistry;
use crate::dispatch::strategy::{Unconfigured, VersionStrategy};
use crate::dispatch::types::{BindingKind, Version};

type Implementation<T, A, R, E> = Box<dyn Fn(&T, A) -> Result<R, E> + Send + Sync>;
type RejectionHandler<T, A, R, E> =
    Box<dyn Fn(&ResolveError, &T, A) -> Result<R, E> + Send + Sync>;

/// A versioned method of `T` taking arguments `A`
pub struct VersionedMethod<T, A, R, E = DispatchError, S = Unconfigured> {
    binding: Binding<Implementation<T, A, R, E>, RejectionHandler<T, A, R, E>, S>,
}

impl<T, A, R, E> VersionedMethod<T, A, R, E> {
    pub fn new() -> Self {
        Self::from_registry(VersionRegistry::new())
    }

    pub fn with_options(options: RegistryOptions) -> Result<Self, ConfigError> {
        Ok(Self::from_registry(VersionRegistry::with_options(options)?))
    }

    fn from_registry(registry: VersionRegistry<Implementation<T, A, R, E>>) -> Self {
        Self {
            binding: Binding::new(BindingKind::Instance, registry),
        }
    }
}

impl<T, A, R, E> Default for VersionedMethod<T, A, R, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A, R, E, S> VersionedMethod<T, A, R, E, S> {
    pub fn with_strategy<S2>(self, strategy: S2) -> VersionedMethod<T, A, R, E, S2>
    where
        S2: VersionStrategy<T>,
    {
        VersionedMethod {
            binding: self.binding.with_strategy(strategy),
        }
    }

    /// Call `handler` in place of an implementation when resolution fails
    pub fn on_rejection<H>(mut self, handler: H) -> Self
    where
        H: Fn(&ResolveError, &T, A) -> Result<R, E> + Send + Sync + 'static,
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
        G: Fn(&T, A) -> Result<R, E> + Send + Sync + 'static,
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
        G: Fn(&T, A) -> Result<R, E> + Send + Sync + 'static,
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
        G: Fn(&T, A) -> Result<R, E> + Send + Sync + 'static,
    {
        self.complete_registration_as(std::any::type_name::<G>(), implementation)
    }

    pub fn complete_registration_as<G>(
        &mut self,
        name: &'static str,
        implementation: G,
    ) -> Result<&mut Self, RegistrationError>
    where
        G: Fn(&T, A) -> Result<R, E> + Send + Sync + 'static,
    {
        self.binding.complete_registration_as(name, Box::new(implementation))?;
        Ok(self)
    }
}

impl<T, A, R, E, S> VersionedMethod<T, A, R, E, S>
where
    S: VersionStrategy<T>,
    E: From<DispatchError>,
{
    /// Compute the requested version from `receiver` and invoke the selection on it
    pub fn call(&self, receiver: &T, args: A) -> Result<R, E> {
        match self.binding.select(receiver)? {
            Selection::Implementation(implementation) => implementation(receiver, args),
            Selection::Rejected(handler, error) => handler(&error, receiver, args),
        }
    }
}

impl<T, A, R, E, S: fmt::Debug> fmt::Debug for VersionedMethod<T, A, R, E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VersionedMethod")
            .field(&self.binding)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::error::RejectionKind;
    use crate::dispatch::strategy::from_field;
    use rstest::rstest;

    #[derive(Debug)]
    struct Request {
        version: Option<Version>,
        user: &'static str,
    }

    impl Request {
        fn new(version: Version) -> Self {
            Self {
                version: Some(version),
                user: "ada",
            }
        }
    }

    #[derive(Debug, PartialEq)]
    enum ViewError {
        MethodNotAllowed,
        Dispatch(String),
    }

    impl From<DispatchError> for ViewError {
        fn from(error: DispatchError) -> Self {
            ViewError::Dispatch(error.to_string())
        }
    }

    fn profile() -> VersionedMethod<Request, (), String, ViewError, impl VersionStrategy<Request>> {
        let options = RegistryOptions::default().with_min_version(1);
        let mut view = VersionedMethod::with_options(options).unwrap();
        view.register(1, |req: &Request, ()| Ok(format!("user={}", req.user)))
            .unwrap()
            .register(3, |req: &Request, ()| {
                Ok(format!("{{\"user\":\"{}\"}}", req.user))
            })
            .unwrap();
        view.with_strategy(from_field("request.version", |req: &Request| req.version))
    }

    #[rstest]
    #[case(1, "user=ada")]
    #[case(2, "user=ada")]
    #[case(3, "{\"user\":\"ada\"}")]
    #[case(9, "{\"user\":\"ada\"}")]
    fn call_reads_version_from_receiver(#[case] version: Version, #[case] expected: &str) {
        let view = profile();

        assert_eq!(view.call(&Request::new(version), ()).unwrap(), expected);
    }

    #[test]
    fn call_reports_too_low_through_caller_error_type() {
        let view = profile();

        let result = view.call(&Request::new(0), ());

        assert_eq!(
            result,
            Err(ViewError::Dispatch(
                "version number 0 is too low (minimum 1); upgrade required".to_string()
            ))
        );
    }

    #[test]
    fn call_reports_missing_version_field() {
        let view = profile();
        let request = Request {
            version: None,
            user: "ada",
        };

        assert_eq!(
            view.call(&request, ()),
            Err(ViewError::Dispatch(
                "version number missing: request.version".to_string()
            ))
        );
    }

    #[test]
    fn rejection_handler_translates_not_found_into_method_not_allowed() {
        let mut view = VersionedMethod::<Request, (), String, ViewError>::new().on_rejection(
            |error, _, ()| match error.kind() {
                RejectionKind::NotFound => Err(ViewError::MethodNotAllowed),
                _ => Err(DispatchError::from(error.clone()).into()),
            },
        );
        view.register(2, |_: &Request, ()| Ok("v2".to_string())).unwrap();
        let view = view.with_strategy(from_field("request.version", |req: &Request| req.version));

        assert_eq!(
            view.call(&Request::new(1), ()),
            Err(ViewError::MethodNotAllowed)
        );
        assert_eq!(view.call(&Request::new(2), ()), Ok("v2".to_string()));
    }

    #[test]
    fn implementation_fault_is_returned_unchanged() {
        let mut view = VersionedMethod::<Request, (), String, ViewError>::new();
        view.register(1, |_: &Request, ()| Err(ViewError::MethodNotAllowed)).unwrap();
        let view = view.with_strategy(from_field("request.version", |req: &Request| req.version));

        assert_eq!(
            view.call(&Request::new(1), ()),
            Err(ViewError::MethodNotAllowed)
        );
        assert_eq!(view.kind(), BindingKind::Instance);
    }

    #[test]
    fn register_as_names_entry_point() {
        let mut view = VersionedMethod::<Request, (), String, ViewError>::new();
        view.register_as(1, "profile", |req: &Request, ()| Ok(req.user.to_string()))
            .unwrap()
            .begin_registration(2)
            .unwrap()
            .complete_registration_as("profile_v2", |_: &Request, ()| Ok(String::new()))
            .unwrap();

        assert_eq!(view.name(), Some("profile"));
        assert_eq!(view.registry().versions().collect::<Vec<_>>(), vec![2, 1]);
    }
}
