//! Error types for handle casts.

use thiserror::Error;

/// Errors reported by runtime-checked casts.
///
/// A failed downcast is always reported as an error, never as an empty
/// handle that looks like a successful result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CastError {
    /// The foreign runtime type check rejected the object.
    #[error("cannot cast {from} to {to}: runtime type check failed")]
    TypeMismatch {
        /// Static type of the source handle.
        from: &'static str,
        /// Requested target type.
        to: &'static str,
    },

    /// The target type has no runtime type identifier to check against.
    #[error("cannot cast to {to}: no runtime type registered")]
    NoRuntimeType {
        /// Requested target type.
        to: &'static str,
    },

    /// A raw-pointer cast was requested on an empty handle.
    #[error("cannot cast an empty handle to {to}")]
    NullCast {
        /// Requested target type.
        to: &'static str,
    },
}

/// Result type for cast operations.
pub type CastResult<T> = Result<T, CastError>;
