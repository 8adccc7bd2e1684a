//! Observability
//!
//! Kernels report through `tracing`; this module only configures the
//! subscriber on behalf of hosts that do not bring their own.

pub mod logging;

pub use logging::{LogConfig, LogLevel, LogOutput};
