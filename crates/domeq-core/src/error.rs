//! Core error types for domeq-core.
//!
//! Uses `thiserror` for structured, matchable error variants. All errors
//! indicate a modeling mistake (never a transient condition) and are
//! surfaced directly to the caller -- there is no fallback mode.

use thiserror::Error;

/// Core errors produced by the domeq-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A value name (or explicit plural) does not match the canonical
    /// lowercase snake_case pattern `[a-z][a-z_]*`.
    #[error("invalid identifier '{name}': must be lowercase snake_case matching [a-z][a-z_]*")]
    InvalidIdentifier { name: String },

    /// A scalar name does not match `[a-z][a-z0-9_]*`.
    #[error("invalid scalar name '{name}': must match [a-z][a-z0-9_]*")]
    InvalidScalarName { name: String },

    /// Two distinct definitions derive the same fully qualified class name.
    ///
    /// Registration is rejected uniformly across all factories; re-declaring
    /// an identical definition is accepted and reuses the existing entry.
    #[error("class name collision: '{class_name}' is already registered with a different definition")]
    ClassNameCollision { class_name: String },
}
