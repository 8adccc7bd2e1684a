//! Core kernel traits.
//!
//! This module defines the traits kernels implement:
//! - `Kernel`: Base trait exposing metadata
//! - `BatchKernel`: Owned-message execution for hosts that drive kernels
//!   through typed request/response values
//! - `BatchKernelDyn`: Type-erased, JSON-in/JSON-out execution for hosts that
//!   only exchange bytes
//!
//! Kernels never spawn threads, lock, or suspend on I/O. `execute` is `async`
//! only so that it composes with asynchronous hosts; every implementation in
//! this workspace completes without awaiting anything.

use crate::error::{KernelError, Result};
use crate::kernel::KernelMetadata;
use async_trait::async_trait;
use std::fmt::{self, Debug};
use std::marker::PhantomData;

/// Base trait for all kernels.
pub trait Kernel: Send + Sync + Debug {
    /// Returns the kernel metadata.
    fn metadata(&self) -> &KernelMetadata;

    /// Validate kernel construction parameters.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Returns the kernel ID.
    fn id(&self) -> &str {
        &self.metadata().id
    }
}

/// Trait for kernels driven through owned input/output messages.
///
/// # Type Parameters
///
/// - `I`: Input type
/// - `O`: Output type
#[async_trait]
pub trait BatchKernel<I, O>: Kernel
where
    I: Send + Sync,
    O: Send + Sync,
{
    /// Execute the kernel with the given input.
    async fn execute(&self, input: I) -> Result<O>;

    /// Validate the input before execution.
    ///
    /// Override to reject malformed configuration eagerly.
    fn validate_input(&self, _input: &I) -> Result<()> {
        Ok(())
    }
}

/// Type-erased batch kernel.
#[async_trait]
pub trait BatchKernelDyn: Kernel {
    /// Execute with JSON-encoded input and output.
    async fn execute_dyn(&self, input: &[u8]) -> Result<Vec<u8>>;
}

/// Type-erased wrapper for batch kernels enabling dynamic dispatch.
///
/// Wraps any `BatchKernel<I, O>` implementation and provides the
/// `BatchKernelDyn` interface through JSON serialization.
///
/// # Example
///
/// ```ignore
/// use tskernel_core::traits::TypeErasedBatchKernel;
///
/// let kernel = TypeErasedBatchKernel::new(MannKendall::new());
/// let output = kernel.execute_dyn(br#"{"series":{"values":[1,2,3]},"config":{}}"#).await?;
/// ```
pub struct TypeErasedBatchKernel<K, I, O> {
    inner: K,
    _phantom: PhantomData<fn(I) -> O>,
}

impl<K: Debug, I, O> Debug for TypeErasedBatchKernel<K, I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeErasedBatchKernel")
            .field("inner", &self.inner)
            .finish()
    }
}

impl<K, I, O> TypeErasedBatchKernel<K, I, O> {
    /// Wrap a typed batch kernel for type-erased execution.
    pub fn new(kernel: K) -> Self {
        Self {
            inner: kernel,
            _phantom: PhantomData,
        }
    }

    /// Access the inner kernel.
    pub fn inner(&self) -> &K {
        &self.inner
    }
}

impl<K, I, O> Kernel for TypeErasedBatchKernel<K, I, O>
where
    K: Kernel,
    I: Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    fn metadata(&self) -> &KernelMetadata {
        self.inner.metadata()
    }

    fn validate(&self) -> Result<()> {
        self.inner.validate()
    }
}

#[async_trait]
impl<K, I, O> BatchKernelDyn for TypeErasedBatchKernel<K, I, O>
where
    K: BatchKernel<I, O> + 'static,
    I: serde::de::DeserializeOwned + Send + Sync + 'static,
    O: serde::Serialize + Send + Sync + 'static,
{
    async fn execute_dyn(&self, input: &[u8]) -> Result<Vec<u8>> {
        let typed_input: I = serde_json::from_slice(input)
            .map_err(|e| KernelError::DeserializationError(e.to_string()))?;
        self.inner.validate_input(&typed_input)?;
        let output = self.inner.execute(typed_input).await?;
        serde_json::to_vec(&output).map_err(|e| KernelError::SerializationError(e.to_string()))
    }
}
