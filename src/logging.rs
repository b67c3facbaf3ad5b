//! Tracing subscriber setup
//!
//! Console output goes to stderr so the run summary on stdout stays clean.
//! When a log file is configured, every event is also appended to it without
//! ANSI colors.

use crate::cli::Verbosity;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Default filter directive for a verbosity level
pub fn default_directive(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "error",
        Verbosity::Normal => "warn",
        Verbosity::Verbose => "info,portal_setup=info",
        Verbosity::VeryVerbose => "debug,portal_setup=trace",
    }
}

/// Install the global subscriber; `RUST_LOG` overrides the verbosity flags
pub fn init(verbosity: Verbosity, log_file: Option<&Path>) {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let file_layer = log_file.and_then(open_log_file).map(|file| {
        fmt::layer()
            .with_writer(Arc::new(file))
            .with_ansi(false)
            .with_filter(EnvFilter::new("info,portal_setup=debug"))
    });

    let file_logging = file_layer.is_some();
    if tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()
        .is_ok()
    {
        debug!(verbosity = verbosity.as_str(), file_logging, "logging initialized");
    }
}

fn open_log_file(path: &Path) -> Option<fs::File> {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("Warning: Failed to create log directory {}: {}", parent.display(), e);
            return None;
        }
    }

    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Warning: Failed to open log file {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(default_directive(Verbosity::Quiet), "error");
        assert_eq!(default_directive(Verbosity::Normal), "warn");
        assert!(default_directive(Verbosity::VeryVerbose).contains("trace"));
    }

    #[test]
    fn test_open_log_file_creates_parent() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("logs").join("portal-setup.log");
        assert!(open_log_file(&path).is_some());
        assert!(path.exists());
    }

    #[test]
    fn test_init_twice_keeps_first_subscriber() {
        init(Verbosity::Verbose, None);
        init(Verbosity::Quiet, None);
    }
}
