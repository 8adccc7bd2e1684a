//! # TSKernel Core
//!
//! Core abstractions, traits, and registry for the TSKernel time-series
//! statistics library.
//!
//! This crate provides:
//! - Sequence views with validity masks and missing-value policies
//! - Outcomes carrying either a value or a typed "undefined" sentinel
//! - Kernel metadata and the shared kernel configuration
//! - Trait definitions for message-driven kernels
//! - An immutable, statically typed kernel registry
//! - Logging setup for hosts

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod error;
pub mod kernel;
pub mod observability;
pub mod outcome;
pub mod registry;
pub mod sequence;
pub mod traits;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{DecompositionMode, ForecastModelKind, KernelConfig, MissingPolicy};
    pub use crate::domain::Domain;
    pub use crate::error::{KernelError, Result};
    pub use crate::kernel::{KernelMetadata, OutputShape};
    pub use crate::outcome::{ComponentColumns, Outcome, UndefinedReason};
    pub use crate::registry::{
        DecompositionKernelFn, KernelEntry, KernelFn, KernelRegistry, KernelRegistryBuilder,
        RegistryStats, ScalarKernelFn,
    };
    pub use crate::sequence::{OwnedSequence, Resolved, SequenceView};
    pub use crate::traits::{BatchKernel, BatchKernelDyn, Kernel, TypeErasedBatchKernel};
}
