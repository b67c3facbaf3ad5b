//! Owner execute bit assignment for launcher artifacts

use crate::errors::{Result, SetupError, Step};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Owner execute bit
pub const OWNER_EXEC: u32 = 0o100;

/// Add `u+x` to each file, keeping the other mode bits; returns the files whose mode changed
pub fn grant_executable<P: AsRef<Path>>(files: &[P]) -> Result<Vec<PathBuf>> {
    let mut changed = Vec::new();
    let mut failures = Vec::new();

    for file in files {
        let file = file.as_ref();
        match grant_one(file) {
            Ok(true) => {
                debug!(path = %file.display(), "marked executable");
                changed.push(file.to_path_buf());
            }
            Ok(false) => debug!(path = %file.display(), "already executable"),
            Err(e) => {
                warn!(path = %file.display(), error = %e, "cannot mark executable");
                failures.push(e);
            }
        }
    }

    match failures.len() {
        0 => Ok(changed),
        1 => Err(failures.remove(0)),
        _ => Err(SetupError::Partial {
            step: Step::GrantExecutable,
            failures,
        }),
    }
}

fn grant_one(file: &Path) -> Result<bool> {
    let meta = fs::metadata(file).map_err(|e| SetupError::from_io(Step::GrantExecutable, file, e))?;
    if meta.is_dir() {
        return Err(SetupError::conflict(
            Step::GrantExecutable,
            file,
            "is a directory, expected an executable file",
        ));
    }

    let mut perms = meta.permissions();
    let mode = perms.mode();
    if mode & OWNER_EXEC != 0 {
        return Ok(false);
    }

    perms.set_mode(mode | OWNER_EXEC);
    fs::set_permissions(file, perms).map_err(|e| SetupError::from_io(Step::GrantExecutable, file, e))?;
    Ok(true)
}

/// Whether the owner execute bit is set
pub fn is_owner_executable(file: &Path) -> bool {
    fs::metadata(file)
        .map(|m| m.is_file() && m.permissions().mode() & OWNER_EXEC != 0)
        .unwrap_or(false)
}
