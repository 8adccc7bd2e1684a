//! Static kernel registration table.
//!
//! Hosts resolve a stable kernel name once, at startup, to a typed function
//! pointer and then call it once per group. The registry is assembled with a
//! [`KernelRegistryBuilder`] and is immutable afterwards, so lookups and calls
//! need no locking and any number of worker threads may share it.

use crate::config::KernelConfig;
use crate::domain::Domain;
use crate::error::{KernelError, Result};
use crate::kernel::{KernelMetadata, OutputShape};
use crate::outcome::{ComponentColumns, Outcome};
use crate::sequence::SequenceView;
use hashbrown::HashMap;
use tracing::{debug, info, warn};

/// Kernel producing one value per group.
pub type ScalarKernelFn = fn(&SequenceView<'_>, &KernelConfig) -> Result<Outcome<f64>>;

/// Kernel producing aligned component columns per group.
pub type DecompositionKernelFn =
    fn(&SequenceView<'_>, &KernelConfig) -> Result<Outcome<ComponentColumns>>;

/// Typed kernel entry point.
#[derive(Clone, Copy)]
pub enum KernelFn {
    /// Scalar-valued kernel.
    Scalar(ScalarKernelFn),
    /// Decomposition kernel.
    Decomposition(DecompositionKernelFn),
}

impl KernelFn {
    /// Result shape of this entry point.
    #[must_use]
    pub const fn shape(&self) -> OutputShape {
        match self {
            KernelFn::Scalar(_) => OutputShape::Scalar,
            KernelFn::Decomposition(_) => OutputShape::Decomposition,
        }
    }
}

/// Registry statistics.
#[derive(Debug, Clone, Default)]
pub struct RegistryStats {
    /// Total number of registered kernels.
    pub total: usize,
    /// Number of scalar kernels.
    pub scalar_kernels: usize,
    /// Number of decomposition kernels.
    pub decomposition_kernels: usize,
    /// Kernels by domain.
    pub by_domain: HashMap<Domain, usize>,
}

/// One registered kernel.
#[derive(Clone)]
pub struct KernelEntry {
    /// Kernel metadata.
    pub metadata: KernelMetadata,
    func: KernelFn,
}

impl KernelEntry {
    /// Create a scalar kernel entry.
    pub fn scalar(mut metadata: KernelMetadata, func: ScalarKernelFn) -> Self {
        metadata.shape = OutputShape::Scalar;
        Self {
            metadata,
            func: KernelFn::Scalar(func),
        }
    }

    /// Create a decomposition kernel entry.
    pub fn decomposition(mut metadata: KernelMetadata, func: DecompositionKernelFn) -> Self {
        metadata.shape = OutputShape::Decomposition;
        Self {
            metadata,
            func: KernelFn::Decomposition(func),
        }
    }

    /// The typed entry point.
    #[must_use]
    pub fn func(&self) -> KernelFn {
        self.func
    }

    /// Invoke a scalar kernel on one group.
    pub fn call_scalar(&self, seq: &SequenceView<'_>, config: &KernelConfig) -> Result<Outcome<f64>> {
        match self.func {
            KernelFn::Scalar(f) => f(seq, config),
            KernelFn::Decomposition(_) => Err(self.shape_mismatch(OutputShape::Scalar)),
        }
    }

    /// Invoke a decomposition kernel on one group.
    pub fn call_decomposition(
        &self,
        seq: &SequenceView<'_>,
        config: &KernelConfig,
    ) -> Result<Outcome<ComponentColumns>> {
        match self.func {
            KernelFn::Decomposition(f) => f(seq, config),
            KernelFn::Scalar(_) => Err(self.shape_mismatch(OutputShape::Decomposition)),
        }
    }

    fn shape_mismatch(&self, expected: OutputShape) -> KernelError {
        KernelError::ShapeMismatch {
            kernel: self.metadata.id.clone(),
            expected: expected.as_str(),
            actual: self.func.shape().as_str(),
        }
    }
}

impl std::fmt::Debug for KernelEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelEntry")
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// Immutable name-to-kernel table.
#[derive(Debug, Default)]
pub struct KernelRegistry {
    entries: HashMap<String, KernelEntry>,
}

impl KernelRegistry {
    /// Start building a registry.
    #[must_use]
    pub fn builder() -> KernelRegistryBuilder {
        KernelRegistryBuilder::new()
    }

    /// Look up a kernel by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&KernelEntry> {
        self.entries.get(id)
    }

    /// Look up a kernel by ID, failing with `KernelNotFound`.
    pub fn resolve(&self, id: &str) -> Result<&KernelEntry> {
        self.entries.get(id).ok_or_else(|| {
            warn!(kernel_id = %id, "Kernel lookup failed");
            KernelError::not_found(id)
        })
    }

    /// Check if a kernel exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// All kernel IDs, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Metadata of all kernels in a domain, sorted by ID.
    #[must_use]
    pub fn by_domain(&self, domain: Domain) -> Vec<&KernelMetadata> {
        let mut result: Vec<&KernelMetadata> = self
            .entries
            .values()
            .filter(|e| e.metadata.domain == domain)
            .map(|e| &e.metadata)
            .collect();
        result.sort_by(|a, b| a.id.cmp(&b.id));
        result
    }

    /// Get registry statistics.
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        let mut stats = RegistryStats {
            total: self.entries.len(),
            ..Default::default()
        };
        for entry in self.entries.values() {
            match entry.func.shape() {
                OutputShape::Scalar => stats.scalar_kernels += 1,
                OutputShape::Decomposition => stats.decomposition_kernels += 1,
            }
            *stats.by_domain.entry(entry.metadata.domain).or_default() += 1;
        }
        stats
    }

    /// Total number of registered kernels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder for kernel registry.
#[derive(Default)]
pub struct KernelRegistryBuilder {
    entries: Vec<KernelEntry>,
}

impl KernelRegistryBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry.
    #[must_use]
    pub fn with_entry(mut self, entry: KernelEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Add a scalar kernel.
    #[must_use]
    pub fn with_scalar(self, metadata: KernelMetadata, func: ScalarKernelFn) -> Self {
        self.with_entry(KernelEntry::scalar(metadata, func))
    }

    /// Add a decomposition kernel.
    #[must_use]
    pub fn with_decomposition(self, metadata: KernelMetadata, func: DecompositionKernelFn) -> Self {
        self.with_entry(KernelEntry::decomposition(metadata, func))
    }

    /// Build the registry.
    ///
    /// # Errors
    ///
    /// Returns `KernelAlreadyRegistered` if two entries share an ID.
    pub fn build(self) -> Result<KernelRegistry> {
        let mut entries = HashMap::with_capacity(self.entries.len());

        for entry in self.entries {
            let id = entry.metadata.id.clone();
            if entries.contains_key(&id) {
                return Err(KernelError::KernelAlreadyRegistered(id));
            }
            debug!(kernel_id = %id, domain = %entry.metadata.domain, shape = %entry.metadata.shape, "Registering kernel");
            entries.insert(id, entry);
        }

        let registry = KernelRegistry { entries };
        let stats = registry.stats();
        info!(
            total = stats.total,
            scalar = stats.scalar_kernels,
            decomposition = stats.decomposition_kernels,
            "Built kernel registry"
        );

        Ok(registry)
    }
}
