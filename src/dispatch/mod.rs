//! Versioned dispatch layer
//!
//! Holds several implementations of one operation, each tagged with an integer
//! version, and routes every call to exactly one of them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────────┐
//! │  Strategy   │────▶│  Registry   │────▶│  Implementation  │
//! │ (context →  │     │ (version →  │     │ (called with the │
//! │  version)   │     │  selection) │     │  original args)  │
//! └─────────────┘     └─────────────┘     └──────────────────┘
//!        ▲                                         │
//!        │              ┌─────────────┐            │
//!        └──────────────│   Binding   │◀───────────┘
//!                       │ (call shape)│
//!                       └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`registry`]: registration and nearest-lower-or-equal resolution
//! - [`strategy`]: `VersionStrategy` trait and stock strategies
//! - [`bindings`]: free, instance-bound and type-level adapters
//! - [`error`]: registration, resolution, strategy and dispatch faults
//! - [`types`]: `Version`, `BindingKind`, `Owner`

pub mod bindings;
pub mod error;
pub mod registry;
pub mod strategy;
pub mod types;

pub use bindings::{VersionedFn, VersionedMethod, VersionedTypeFn};
pub use error::{DispatchError, RegistrationError, RejectionKind, ResolveError, StrategyError};
pub use registry::VersionRegistry;
pub use strategy::VersionStrategy;
pub use types::{BindingKind, Owner, Version};
