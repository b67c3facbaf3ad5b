//! Directory provisioning
//!
//! Every directory is attempted even when an earlier one fails; the failures
//! are reported together as a single [`SetupError::Partial`].

use crate::errors::{Result, SetupError, Step};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Create each directory (and missing parents); returns the ones that were newly created
pub fn ensure_directories<P: AsRef<Path>>(dirs: &[P]) -> Result<Vec<PathBuf>> {
    let mut created = Vec::new();
    let mut failures = Vec::new();

    for dir in dirs {
        let dir = dir.as_ref();
        match ensure_directory(dir) {
            Ok(true) => {
                debug!(path = %dir.display(), "created directory");
                created.push(dir.to_path_buf());
            }
            Ok(false) => debug!(path = %dir.display(), "directory already present"),
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "failed to provision directory");
                failures.push(e);
            }
        }
    }

    match failures.len() {
        0 => Ok(created),
        1 => Err(failures.remove(0)),
        _ => Err(SetupError::Partial {
            step: Step::EnsureDirectories,
            failures,
        }),
    }
}

/// Create a single directory; `Ok(false)` when it already existed
pub fn ensure_directory(dir: &Path) -> Result<bool> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => return Ok(false),
        Ok(_) => {
            return Err(SetupError::conflict(
                Step::EnsureDirectories,
                dir,
                "exists and is not a directory",
            ))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(classify(dir, e)),
    }

    fs::create_dir_all(dir).map_err(|e| classify(dir, e))?;
    Ok(true)
}

/// Map a creation failure, preferring a conflict on a blocking ancestor file
fn classify(dir: &Path, err: io::Error) -> SetupError {
    if let Some(blocker) = blocking_ancestor(dir) {
        return SetupError::conflict(
            Step::EnsureDirectories,
            &blocker,
            format!("is not a directory (needed for {})", dir.display()),
        );
    }
    SetupError::from_io(Step::EnsureDirectories, dir, err)
}

/// Nearest existing ancestor, if it is something other than a directory
fn blocking_ancestor(dir: &Path) -> Option<PathBuf> {
    for ancestor in dir.ancestors().skip(1) {
        if let Ok(meta) = fs::metadata(ancestor) {
            return (!meta.is_dir()).then(|| ancestor.to_path_buf());
        }
    }
    None
}
