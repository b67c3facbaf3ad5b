//! Whole-file template materialization

use crate::errors::{Result, SetupError, Step};
use std::fs;
use std::io::{self, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Mode given to a file that did not exist before
pub const NEW_FILE_MODE: u32 = 0o644;

/// Overwrite `destination` with `content`; the parent directory must already exist
pub fn materialize_template(destination: &Path, content: &str) -> Result<()> {
    replace_file(Step::MaterializeTemplate, destination, content.as_bytes())?;
    debug!(path = %destination.display(), bytes = content.len(), "template written");
    Ok(())
}

/// Atomically replace the file at `destination` with `content`
///
/// A symlinked destination is resolved first, so the link survives and its
/// target is rewritten. An existing file keeps its permissions.
pub(crate) fn replace_file(step: Step, destination: &Path, content: &[u8]) -> Result<()> {
    let target = resolve_destination(step, destination)?;

    let parent = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| SetupError::conflict(step, &target, "has no parent directory"))?;

    match fs::metadata(parent) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(SetupError::conflict(step, parent, "is not a directory")),
        Err(e) => return Err(SetupError::from_io(step, parent, e)),
    }

    let permissions = match fs::metadata(&target) {
        Ok(meta) if meta.is_dir() => {
            return Err(SetupError::conflict(step, &target, "is a directory"))
        }
        Ok(meta) => meta.permissions(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::Permissions::from_mode(NEW_FILE_MODE)
        }
        Err(e) => return Err(SetupError::from_io(step, &target, e)),
    };

    let mut temp =
        NamedTempFile::new_in(parent).map_err(|e| SetupError::from_io(step, parent, e))?;
    temp.write_all(content)
        .and_then(|_| temp.as_file().set_permissions(permissions))
        .map_err(|e| SetupError::from_io(step, &target, e))?;
    temp.persist(&target)
        .map_err(|e| SetupError::from_io(step, &target, e.error))?;

    if target != destination {
        debug!(link = %destination.display(), target = %target.display(), "rewrote symlink target");
    }
    Ok(())
}

/// Follow a symlinked destination to the file it names
fn resolve_destination(step: Step, destination: &Path) -> Result<PathBuf> {
    match fs::symlink_metadata(destination) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::canonicalize(destination).map_err(|e| SetupError::from_io(step, destination, e))
        }
        _ => Ok(destination.to_path_buf()),
    }
}
