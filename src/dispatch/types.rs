//! Shared types for versioned dispatch

use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;

/// Version number identifying a revision of an operation's behavior.
///
/// Totally ordered. Negative numbers are valid versions.
pub type Version = i64;

/// How a dispatch entry point is attached to its callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    /// Free function or static method: the strategy sees the call arguments
    Free,
    /// Method bound to an instance: the strategy sees the receiver
    Instance,
    /// Type-level method: the strategy sees only the owning type
    Type,
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BindingKind::Free => "free",
            BindingKind::Instance => "instance",
            BindingKind::Type => "type",
        };
        f.write_str(s)
    }
}

/// Zero-sized marker standing in for the owning type of a type-level method
pub struct Owner<T: ?Sized>(PhantomData<fn() -> Box<T>>);

impl<T: ?Sized> Owner<T> {
    pub fn new() -> Self {
        Owner(PhantomData)
    }

    /// Fully qualified name of the owning type
    pub fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

impl<T: ?Sized> Default for Owner<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for Owner<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Owner<T> {}

impl<T: ?Sized> fmt::Debug for Owner<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Owner<{}>", self.type_name())
    }
}
