use serde::Serialize;
use thiserror::Error;

use crate::dispatch::types::Version;

/// Registration-sequencing faults. These are programmer errors and should fail fast at setup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("version {0} is already registered")]
    VersionAlreadyRegistered(Version),

    #[error("version {pending} is already pending registration, cannot set another ({requested})")]
    DuplicateRegistrationInProgress {
        pending: Version,
        requested: Version,
    },

    #[error("no version pending registration")]
    NoPendingRegistration,
}

/// Coarse classification of a resolution fault, for integration layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    TooLow,
    TooHigh,
    NotFound,
}

/// Faults raised while mapping a requested version to an implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("version number {requested} is too low (minimum {min}); upgrade required")]
    VersionTooLow { requested: Version, min: Version },

    #[error("version number {requested} is too high (maximum {max})")]
    VersionTooHigh { requested: Version, max: Version },

    #[error("no suitable version found for version number {requested}")]
    VersionNotFound { requested: Version },
}

impl ResolveError {
    pub fn kind(&self) -> RejectionKind {
        match self {
            ResolveError::VersionTooLow { .. } => RejectionKind::TooLow,
            ResolveError::VersionTooHigh { .. } => RejectionKind::TooHigh,
            ResolveError::VersionNotFound { .. } => RejectionKind::NotFound,
        }
    }

    /// The version number that could not be resolved
    pub fn requested(&self) -> Version {
        match self {
            ResolveError::VersionTooLow { requested, .. }
            | ResolveError::VersionTooHigh { requested, .. }
            | ResolveError::VersionNotFound { requested } => *requested,
        }
    }
}

/// Faults raised by a version number strategy
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("no version number strategy configured")]
    NotImplemented,

    #[error("version number missing: {field}")]
    Missing { field: &'static str },

    #[error("invalid version number in {field}: {value:?}")]
    Invalid { field: &'static str, value: String },

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Faults raised by the dispatch machinery itself, before an implementation runs
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Strategy(#[from] StrategyError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ResolveError::VersionTooLow { requested: 0, min: 1 }, RejectionKind::TooLow, 0)]
    #[case(ResolveError::VersionTooHigh { requested: 11, max: 10 }, RejectionKind::TooHigh, 11)]
    #[case(ResolveError::VersionNotFound { requested: -3 }, RejectionKind::NotFound, -3)]
    fn resolve_error_reports_kind_and_requested_version(
        #[case] error: ResolveError,
        #[case] kind: RejectionKind,
        #[case] requested: Version,
    ) {
        assert_eq!(error.kind(), kind);
        assert_eq!(error.requested(), requested);
    }

    #[test]
    fn too_low_message_asks_for_upgrade() {
        let error = ResolveError::VersionTooLow {
            requested: 0,
            min: 2,
        };

        assert_eq!(
            error.to_string(),
            "version number 0 is too low (minimum 2); upgrade required"
        );
    }

    #[test]
    fn dispatch_error_is_transparent_over_its_source() {
        let error = DispatchError::from(StrategyError::NotImplemented);

        assert_eq!(error.to_string(), "no version number strategy configured");
        assert!(matches!(
            error,
            DispatchError::Strategy(StrategyError::NotImplemented)
        ));
    }
}
