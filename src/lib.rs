//! Versioned function dispatch
//!
//! Register several implementations of the same operation under integer
//! versions and let each call pick one, falling back to the nearest lower
//! registered version.
//!
//! ```
//! use version_dispatch::dispatch::{VersionedFn, strategy};
//!
//! let mut scale = VersionedFn::<(i64, i64), i64>::new();
//! scale
//!     .register_as(1, "scale", |(_, n)| Ok(n))?
//!     .register(2, |(_, n)| Ok(n * 2))?;
//! let scale = scale.with_strategy(strategy::from_fn(|args: &(i64, i64)| Ok(args.0)));
//!
//! assert_eq!(scale.name(), Some("scale"));
//! assert_eq!(scale.call((1, 10))?, 10);
//! assert_eq!(scale.call((7, 10))?, 20);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod dispatch;
pub mod inspect;
