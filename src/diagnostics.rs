//! Diagnostics emitted while resolving and migrating settings.
//!
//! Every component reports through a [`DiagnosticSink`]. A sink only observes: it
//! has no return value and cannot change what the caller does next.

use std::fmt;
use std::str::FromStr;

/// Severity of a diagnostic message, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    Trace,
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Parse a lootcli log level name, falling back to [`Severity::Info`].
    pub fn from_name(name: &str) -> Severity {
        name.parse().unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    /// Matching `tracing` level.
    pub fn as_level(self) -> tracing::Level {
        match self {
            Severity::Trace => tracing::Level::TRACE,
            Severity::Debug => tracing::Level::DEBUG,
            Severity::Info => tracing::Level::INFO,
            Severity::Warning => tracing::Level::WARN,
            Severity::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level \"{0}\"")]
pub struct UnknownSeverity(pub String);

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Severity::Trace),
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            _ => Err(UnknownSeverity(s.to_string())),
        }
    }
}

/// Receiver for `(severity, message)` diagnostics.
#[cfg_attr(test, mockall::automock)]
pub trait DiagnosticSink {
    fn emit(&self, severity: Severity, message: &str);
}

impl<F> DiagnosticSink for F
where
    F: Fn(Severity, &str),
{
    fn emit(&self, severity: Severity, message: &str) {
        self(severity, message)
    }
}

/// Forwards diagnostics to `tracing` at the matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Trace => tracing::trace!("{}", message),
            Severity::Debug => tracing::debug!("{}", message),
            Severity::Info => tracing::info!("{}", message),
            Severity::Warning => tracing::warn!("{}", message),
            Severity::Error => tracing::error!("{}", message),
        }
    }
}

/// Discards every diagnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&self, _severity: Severity, _message: &str) {}
}
