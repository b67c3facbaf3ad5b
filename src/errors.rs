//! Error types for portal-setup
//!
//! Every filesystem failure carries the step that produced it and the path
//! involved, so the user can diagnose a failed run from the message alone.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Installation step that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    EnsureDirectories,
    GrantExecutable,
    InstallLauncherLink,
    RegisterPathEntry,
    MaterializeTemplate,
    RemoveLink,
    RemovePathEntry,
    RemoveDirectories,
}

impl Step {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::EnsureDirectories => "ensure directories",
            Step::GrantExecutable => "grant executable",
            Step::InstallLauncherLink => "install launcher link",
            Step::RegisterPathEntry => "register PATH entry",
            Step::MaterializeTemplate => "materialize template",
            Step::RemoveLink => "remove launcher link",
            Step::RemovePathEntry => "remove PATH entry",
            Step::RemoveDirectories => "remove directories",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    PermissionDenied,
    NotFound,
    Conflict,
    Other,
}

/// Main error type for installation operations
#[derive(Error, Debug)]
pub enum SetupError {
    /// Insufficient rights to create, write or link
    #[error("{step}: permission denied for {}", .path.display())]
    PermissionDenied { step: Step, path: PathBuf },

    /// A required artifact is missing
    #[error("{step}: {} does not exist", .path.display())]
    NotFound { step: Step, path: PathBuf },

    /// A path exists but has the wrong type
    #[error("{step}: {} {reason}", .path.display())]
    Conflict {
        step: Step,
        path: PathBuf,
        reason: String,
    },

    /// Any other I/O failure
    #[error("{step}: I/O error on {}: {source}", .path.display())]
    Io {
        step: Step,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Some entries of a per-entry step failed
    #[error("{step}: {} of the entries failed: {}", .failures.len(), join_failures(.failures))]
    Partial {
        step: Step,
        failures: Vec<SetupError>,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Home directory could not be resolved
    #[error("Could not determine home directory")]
    HomeNotFound,
}

/// Result type alias for setup operations
pub type Result<T> = std::result::Result<T, SetupError>;

fn join_failures(failures: &[SetupError]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl SetupError {
    /// Classify an I/O error raised while `step` touched `path`
    pub fn from_io(step: Step, path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            io::ErrorKind::PermissionDenied => SetupError::PermissionDenied { step, path },
            io::ErrorKind::NotFound => SetupError::NotFound { step, path },
            io::ErrorKind::AlreadyExists => SetupError::Conflict {
                step,
                path,
                reason: "already exists with an unexpected type".to_string(),
            },
            _ => SetupError::Io { step, path, source },
        }
    }

    /// Build a conflict error
    pub fn conflict(step: Step, path: &Path, reason: impl Into<String>) -> Self {
        SetupError::Conflict {
            step,
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Coarse classification used by callers and tests
    pub fn kind(&self) -> ErrorKind {
        match self {
            SetupError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            SetupError::NotFound { .. } => ErrorKind::NotFound,
            SetupError::Conflict { .. } => ErrorKind::Conflict,
            SetupError::Partial { failures, .. } => {
                let first = failures.first().map(|f| f.kind()).unwrap_or(ErrorKind::Other);
                if failures.iter().all(|f| f.kind() == first) {
                    first
                } else {
                    ErrorKind::Other
                }
            }
            SetupError::Io { .. } | SetupError::Config(_) | SetupError::HomeNotFound => {
                ErrorKind::Other
            }
        }
    }

    /// Step that failed, when the error came from a filesystem operation
    pub fn step(&self) -> Option<Step> {
        match self {
            SetupError::PermissionDenied { step, .. }
            | SetupError::NotFound { step, .. }
            | SetupError::Conflict { step, .. }
            | SetupError::Io { step, .. }
            | SetupError::Partial { step, .. } => Some(*step),
            SetupError::Config(_) | SetupError::HomeNotFound => None,
        }
    }
}
