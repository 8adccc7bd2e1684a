//! Error types for tskernel.
//!
//! Only caller mistakes surface as errors. Data-dependent conditions such as a
//! group that is too short, or a missing value under the `Propagate` policy,
//! resolve to an [`Outcome::Undefined`](crate::outcome::Outcome) sentinel so
//! that one bad group never aborts a bulk evaluation.

use thiserror::Error;

/// Result type alias using `KernelError`.
pub type Result<T> = std::result::Result<T, KernelError>;

/// Errors that can occur while configuring, resolving or invoking kernels.
#[derive(Debug, Error)]
pub enum KernelError {
    /// Kernel not found in registry.
    #[error("Kernel not found: {0}")]
    KernelNotFound(String),

    /// Kernel already registered.
    #[error("Kernel already registered: {0}")]
    KernelAlreadyRegistered(String),

    /// The kernel configuration was rejected before any computation.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A kernel was invoked through the wrong result shape.
    #[error("Kernel {kernel} produces {actual} results, not {expected}")]
    ShapeMismatch {
        /// Kernel identifier.
        kernel: String,
        /// Shape the caller asked for.
        expected: &'static str,
        /// Shape the kernel actually produces.
        actual: &'static str,
    },

    /// The validity mask does not cover the value buffer.
    #[error("Validity mask length {validity} does not match value length {values}")]
    ValidityLengthMismatch {
        /// Number of values.
        values: usize,
        /// Number of validity flags.
        validity: usize,
    },

    /// Configuration file or environment error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Deserialization error.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

}

impl KernelError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        KernelError::InvalidConfiguration(msg.into())
    }

    /// Create a kernel not found error.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        KernelError::KernelNotFound(id.into())
    }

    /// Returns true if the error was caused by how the kernel was called,
    /// rather than by the environment.
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            KernelError::KernelNotFound(_)
                | KernelError::InvalidConfiguration(_)
                | KernelError::ShapeMismatch { .. }
                | KernelError::ValidityLengthMismatch { .. }
        )
    }
}
