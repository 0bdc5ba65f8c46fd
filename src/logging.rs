use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::diagnostics::Severity;

/// `EnvFilter` directive for `level`.
fn filter_directive(level: Severity) -> &'static str {
    match level {
        Severity::Warning => "warn",
        other => other.as_str(),
    }
}

/// Build the level filter, letting `RUST_LOG` override `level` when set.
fn env_filter(level: Severity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directive(level)))
}

fn ensure_log_dir(log_dir: &Utf8Path) -> Result<()> {
    if !log_dir.exists() {
        fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir))?;
    }
    Ok(())
}

/// Setup logging with rotating file appender.
///
/// Logs are written to the specified directory with daily rotation.
///
/// # Arguments
/// * `log_dir` - Directory for log files (e.g., "logs")
/// * `log_prefix` - Prefix for log files (e.g., "lootcli")
/// * `level_name` - lootcli log level name, e.g. "warning"; unknown names mean "info"
///
/// # Returns
/// A guard that must be held for the duration of the program to keep logging active
pub fn setup_logging(
    log_dir: &Utf8Path,
    log_prefix: &str,
    level_name: &str,
) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    setup_logging_with_console(log_dir, log_prefix, Severity::from_name(level_name), false)
}

/// Setup logging with optional console output.
///
/// Installing a global subscriber a second time (e.g. from several tests) is reported as
/// an error rather than a panic.
///
/// # Arguments
/// * `log_dir` - Directory for log files
/// * `log_prefix` - Prefix for log files
/// * `level` - Least severe level that is written
/// * `console_output` - If true, also log to stderr
///
/// # Returns
/// A guard that must be held for the duration of the program to keep logging active
pub fn setup_logging_with_console(
    log_dir: &Utf8Path,
    log_prefix: &str,
    level: Severity,
    console_output: bool,
) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    ensure_log_dir(log_dir)?;

    // Create daily rotating file appender
    let file_appender = rolling::daily(log_dir, log_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // No ANSI codes in log files
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let registry = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(file_layer);

    if console_output {
        let console_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);

        registry
            .with(console_layer)
            .try_init()
            .context("Failed to install logging subscriber")?;
    } else {
        registry
            .try_init()
            .context("Failed to install logging subscriber")?;
    }

    tracing::info!(
        "Logging initialized: dir={}, prefix={}, level={}, console={}",
        log_dir,
        log_prefix,
        level,
        console_output
    );

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    #[test]
    #[allow(unused_variables)]
    fn test_setup_logging() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = Utf8PathBuf::try_from(temp_dir.path().join("logs")).unwrap();

        // Only one test can install the global subscriber; either way the directory
        // must exist afterwards.
        let result = setup_logging(&log_dir, "test", "debug");

        assert!(log_dir.exists());
    }

    #[test]
    fn test_filter_names() {
        assert_eq!(filter_directive(Severity::Warning), "warn");
        assert_eq!(filter_directive(Severity::Trace), "trace");
        assert_eq!(filter_directive(Severity::Error), "error");
    }

    #[test]
    fn test_level_names_map_to_filters() {
        assert_eq!(filter_directive(Severity::from_name("warning")), "warn");
        assert_eq!(filter_directive(Severity::from_name("Trace")), "trace");
        assert_eq!(filter_directive(Severity::from_name("chatty")), "info");
    }
}
