//! Version number strategies
//!
//! A strategy computes the requested version number from the call context:
//! the call arguments for free functions, the receiver for bound methods, or
//! the owning type for type-level methods. Strategies must be deterministic
//! for identical context; they only ever see the context by shared reference.

use std::fmt;
use std::marker::PhantomData;

use crate::dispatch::error::StrategyError;
use crate::dispatch::types::Version;

/// Computes the requested version number from a call context
pub trait VersionStrategy<C: ?Sized>: Send + Sync {
    fn version_number(&self, context: &C) -> Result<Version, StrategyError>;
}

/// Strategy used until one is supplied; always fails with [`StrategyError::NotImplemented`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

impl<C: ?Sized> VersionStrategy<C> for Unconfigured {
    fn version_number(&self, _context: &C) -> Result<Version, StrategyError> {
        Err(StrategyError::NotImplemented)
    }
}

/// Always requests the same version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixed(pub Version);

impl<C: ?Sized> VersionStrategy<C> for Fixed {
    fn version_number(&self, _context: &C) -> Result<Version, StrategyError> {
        Ok(self.0)
    }
}

pub fn fixed(version: Version) -> Fixed {
    Fixed(version)
}

/// Strategy backed by a closure, see [`from_fn`]
pub struct FromFn<C: ?Sized, F> {
    f: F,
    _context: PhantomData<fn(&C)>,
}

/// Use a closure as the strategy
pub fn from_fn<C, F>(f: F) -> FromFn<C, F>
where
    C: ?Sized,
    F: Fn(&C) -> Result<Version, StrategyError> + Send + Sync,
{
    FromFn {
        f,
        _context: PhantomData,
    }
}

impl<C, F> VersionStrategy<C> for FromFn<C, F>
where
    C: ?Sized,
    F: Fn(&C) -> Result<Version, StrategyError> + Send + Sync,
{
    fn version_number(&self, context: &C) -> Result<Version, StrategyError> {
        (self.f)(context)
    }
}

impl<C: ?Sized, F> fmt::Debug for FromFn<C, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromFn").finish_non_exhaustive()
    }
}

/// Reads an already-numeric version off the context, see [`from_field`]
pub struct FromField<C: ?Sized, G> {
    field: &'static str,
    get: G,
    _context: PhantomData<fn(&C)>,
}

/// Read the version from a field of the context
///
/// `field` names the source in [`StrategyError::Missing`] when `get` returns `None`.
pub fn from_field<C, G>(field: &'static str, get: G) -> FromField<C, G>
where
    C: ?Sized,
    G: Fn(&C) -> Option<Version> + Send + Sync,
{
    FromField {
        field,
        get,
        _context: PhantomData,
    }
}

impl<C, G> VersionStrategy<C> for FromField<C, G>
where
    C: ?Sized,
    G: Fn(&C) -> Option<Version> + Send + Sync,
{
    fn version_number(&self, context: &C) -> Result<Version, StrategyError> {
        (self.get)(context).ok_or(StrategyError::Missing { field: self.field })
    }
}

impl<C: ?Sized, G> fmt::Debug for FromField<C, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromField")
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}

/// Parses the version out of a textual field such as a request header, see [`from_str_field`]
pub struct FromStrField<C: ?Sized, G> {
    field: &'static str,
    get: G,
    _context: PhantomData<fn(&C)>,
}

/// Read the version from a textual field of the context
///
/// Surrounding whitespace is ignored. A `None` from `get` is
/// [`StrategyError::Missing`]; text that is not an integer is [`StrategyError::Invalid`].
pub fn from_str_field<C, G>(field: &'static str, get: G) -> FromStrField<C, G>
where
    C: ?Sized,
    G: Fn(&C) -> Option<&str> + Send + Sync,
{
    FromStrField {
        field,
        get,
        _context: PhantomData,
    }
}

impl<C, G> VersionStrategy<C> for FromStrField<C, G>
where
    C: ?Sized,
    G: Fn(&C) -> Option<&str> + Send + Sync,
{
    fn version_number(&self, context: &C) -> Result<Version, StrategyError> {
        let raw = (self.get)(context).ok_or(StrategyError::Missing { field: self.field })?;
        raw.trim().parse().map_err(|_| StrategyError::Invalid {
            field: self.field,
            value: raw.to_string(),
        })
    }
}

impl<C: ?Sized, G> fmt::Debug for FromStrField<C, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromStrField")
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    struct Request {
        version: Option<Version>,
        headers: HashMap<&'static str, &'static str>,
    }

    impl Request {
        fn with_header(value: &'static str) -> Self {
            Self {
                version: None,
                headers: HashMap::from([("x-api-version", value)]),
            }
        }
    }

    #[test]
    fn unconfigured_strategy_is_not_implemented() {
        let result = VersionStrategy::<()>::version_number(&Unconfigured, &());

        assert!(matches!(result, Err(StrategyError::NotImplemented)));
    }

    #[test]
    fn fixed_strategy_ignores_context() {
        let strategy = fixed(4);

        assert_eq!(strategy.version_number("anything").unwrap(), 4);
        assert_eq!(strategy.version_number(&[1u8, 2, 3][..]).unwrap(), 4);
    }

    #[test]
    fn from_fn_reads_version_from_arguments() {
        let strategy = from_fn(|args: &(Version, i64)| Ok(args.0));

        assert_eq!(strategy.version_number(&(3, 12)).unwrap(), 3);
    }

    #[test]
    fn from_fn_propagates_strategy_fault() {
        let strategy = from_fn(|_: &()| Err(StrategyError::Other("offline".into())));

        let err = strategy.version_number(&()).unwrap_err();

        assert_eq!(err.to_string(), "offline");
    }

    #[rstest]
    #[case(Some(7), Some(7))]
    #[case(None, None)]
    fn from_field_reads_numeric_field(
        #[case] version: Option<Version>,
        #[case] expected: Option<Version>,
    ) {
        let strategy = from_field("request.version", |req: &Request| req.version);
        let request = Request {
            version,
            headers: HashMap::new(),
        };

        let result = strategy.version_number(&request);

        match (result, expected) {
            (Ok(version), Some(expected)) => assert_eq!(version, expected),
            (Err(StrategyError::Missing { field }), None) => assert_eq!(field, "request.version"),
            (other, _) => panic!("Expected {:?}, got {:?}", expected, other),
        }
    }

    #[rstest]
    #[case("3", 3)]
    #[case(" 12 ", 12)]
    #[case("-1", -1)]
    fn from_str_field_parses_header(#[case] header: &'static str, #[case] expected: Version) {
        let strategy = from_str_field("x-api-version", |req: &Request| {
            req.headers.get("x-api-version").copied()
        });

        let request = Request::with_header(header);

        assert_eq!(strategy.version_number(&request).unwrap(), expected);
    }

    #[test]
    fn from_str_field_rejects_non_numeric_header() {
        let strategy = from_str_field("x-api-version", |req: &Request| {
            req.headers.get("x-api-version").copied()
        });

        let result = strategy.version_number(&Request::with_header("v2"));

        match result {
            Err(StrategyError::Invalid { field, value }) => {
                assert_eq!(field, "x-api-version");
                assert_eq!(value, "v2");
            }
            other => panic!("Expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn from_str_field_reports_missing_header() {
        let strategy = from_str_field("x-api-version", |req: &Request| {
            req.headers.get("x-api-version").copied()
        });
        let request = Request {
            version: None,
            headers: HashMap::new(),
        };

        match strategy.version_number(&request) {
            Err(StrategyError::Missing { field }) => assert_eq!(field, "x-api-version"),
            other => panic!("Expected Missing, got {:?}", other),
        }
    }
}
