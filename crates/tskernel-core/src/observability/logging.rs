//! Structured Logging
//!
//! Kernels emit `tracing` events; installing a subscriber is up to the host.
//! [`LogConfig`] is a convenience for hosts (and benches) that want the
//! default `tracing-subscriber` setup.
//!
//! Levels used by the kernels:
//!
//! - `trace`: one event per kernel call, with the group length
//! - `debug`: a group produced the undefined sentinel, with the reason
//! - `info`: the kernel registry was built
//! - `warn`: a kernel name failed to resolve
//!
//! # Example
//!
//! ```rust,ignore
//! use tskernel_core::observability::logging::{LogConfig, LogLevel};
//!
//! LogConfig::production()
//!     .with_target_level("tskernel_temporal::predictability", LogLevel::Debug)
//!     .init()?;
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level (most verbose)
    Trace,
    /// Debug level
    Debug,
    /// Info level
    #[default]
    Info,
    /// Warning level
    Warn,
    /// Error level
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

/// Log output target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// Standard output
    Stdout,
    /// Standard error
    #[default]
    Stderr,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default log level
    pub level: LogLevel,
    /// Enable structured JSON output
    pub structured: bool,
    /// Include caller location
    pub include_location: bool,
    /// Include thread IDs
    pub include_thread_ids: bool,
    /// Per-target log levels (module paths such as `tskernel_temporal::trend`)
    pub target_levels: BTreeMap<String, LogLevel>,
    /// Output stream
    pub output: LogOutput,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            structured: false,
            include_location: false,
            include_thread_ids: false,
            target_levels: BTreeMap::new(),
            output: LogOutput::Stderr,
        }
    }
}

impl LogConfig {
    /// Development configuration
    pub fn development() -> Self {
        Self {
            level: LogLevel::Debug,
            structured: false,
            include_location: true,
            ..Default::default()
        }
    }

    /// Production configuration
    pub fn production() -> Self {
        Self {
            level: LogLevel::Info,
            structured: true,
            include_thread_ids: true,
            ..Default::default()
        }
    }

    /// Set the default level.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Set log level for a specific target
    pub fn with_target_level(mut self, target: impl Into<String>, level: LogLevel) -> Self {
        self.target_levels.insert(target.into(), level);
        self
    }

    /// `EnvFilter` directives for this configuration.
    pub fn filter_directives(&self) -> String {
        let mut directives = self.level.to_string();
        for (target, level) in &self.target_levels {
            directives.push(',');
            directives.push_str(target);
            directives.push('=');
            directives.push_str(&level.to_string());
        }
        directives
    }

    /// Initialize logging
    ///
    /// `RUST_LOG` overrides the configured levels. Installing a subscriber
    /// when one is already set is a no-op.
    pub fn init(&self) -> crate::error::Result<()> {
        use tracing_subscriber::fmt::writer::BoxMakeWriter;
        use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(self.filter_directives()))
            .map_err(|e| crate::error::KernelError::ConfigError(format!("Invalid log filter: {}", e)))?;

        let writer = match self.output {
            LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
            LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        };

        let subscriber = tracing_subscriber::registry().with(filter);

        if self.structured {
            let layer = fmt::layer()
                .json()
                .with_thread_ids(self.include_thread_ids)
                .with_file(self.include_location)
                .with_line_number(self.include_location)
                .with_writer(writer);

            subscriber.with(layer).try_init().ok();
        } else {
            let layer = fmt::layer()
                .with_thread_ids(self.include_thread_ids)
                .with_file(self.include_location)
                .with_line_number(self.include_location)
                .with_writer(writer);

            subscriber.with(layer).try_init().ok();
        }

        Ok(())
    }
}
