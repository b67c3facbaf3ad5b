//! Launcher symlink installation
//!
//! The link is swapped into place by creating a temporary symlink beside it and
//! renaming it over the destination, so readers never see a missing launcher.

use crate::errors::{Result, SetupError, Step};
use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Outcome of installing the launcher link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEffect {
    Created,
    Replaced,
    Unchanged,
}

impl LinkEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkEffect::Created => "created",
            LinkEffect::Replaced => "replaced",
            LinkEffect::Unchanged => "unchanged",
        }
    }
}

/// Point `<link_dir>/<link_name>` at `source`
pub fn install_launcher_link(source: &Path, link_dir: &Path, link_name: &str) -> Result<LinkEffect> {
    let step = Step::InstallLauncherLink;

    fs::metadata(source).map_err(|e| SetupError::from_io(step, source, e))?;

    let link = link_dir.join(link_name);
    let effect = match fs::symlink_metadata(&link) {
        Ok(meta) if meta.file_type().is_symlink() => {
            let current = fs::read_link(&link).map_err(|e| SetupError::from_io(step, &link, e))?;
            if current == source {
                debug!(link = %link.display(), "launcher link already current");
                return Ok(LinkEffect::Unchanged);
            }
            LinkEffect::Replaced
        }
        Ok(meta) if meta.is_dir() => {
            return Err(SetupError::conflict(
                step,
                &link,
                "is a directory, refusing to replace it with a link",
            ))
        }
        Ok(_) => LinkEffect::Replaced,
        Err(e) if e.kind() == io::ErrorKind::NotFound => LinkEffect::Created,
        Err(e) => return Err(SetupError::from_io(step, &link, e)),
    };

    let temp_link = temp_link_path(link_dir, link_name);
    remove_if_present(&temp_link).map_err(|e| SetupError::from_io(step, &temp_link, e))?;
    symlink(source, &temp_link).map_err(|e| SetupError::from_io(step, &temp_link, e))?;

    if let Err(e) = fs::rename(&temp_link, &link) {
        let _ = fs::remove_file(&temp_link);
        return Err(SetupError::from_io(step, &link, e));
    }

    debug!(link = %link.display(), target = %source.display(), effect = effect.as_str(), "launcher link installed");
    Ok(effect)
}

/// Current target of the link, if `link` is a symlink
pub fn link_target(link: &Path) -> Option<PathBuf> {
    match fs::symlink_metadata(link) {
        Ok(meta) if meta.file_type().is_symlink() => fs::read_link(link).ok(),
        _ => None,
    }
}

fn temp_link_path(link_dir: &Path, link_name: &str) -> PathBuf {
    link_dir.join(format!(".{}.tmp-link", link_name))
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf, PathBuf) {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("portal");
        let bin = temp.path().join("bin");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&bin).unwrap();
        let launcher = root.join("portal");
        fs::write(&launcher, "#!/bin/sh\n").unwrap();
        (temp, launcher, bin)
    }

    #[test]
    fn test_creates_link() {
        let (_temp, launcher, bin) = setup();

        let effect = install_launcher_link(&launcher, &bin, "portal").unwrap();

        assert_eq!(effect, LinkEffect::Created);
        assert_eq!(link_target(&bin.join("portal")), Some(launcher));
    }

    #[test]
    fn test_second_install_is_unchanged() {
        let (_temp, launcher, bin) = setup();

        install_launcher_link(&launcher, &bin, "portal").unwrap();
        let effect = install_launcher_link(&launcher, &bin, "portal").unwrap();

        assert_eq!(effect, LinkEffect::Unchanged);
        let entries: Vec<_> = fs::read_dir(&bin).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_stale_link_is_replaced() {
        let (temp, launcher, bin) = setup();
        let old = temp.path().join("old-portal");
        fs::write(&old, "").unwrap();
        symlink(&old, bin.join("portal")).unwrap();

        let effect = install_launcher_link(&launcher, &bin, "portal").unwrap();

        assert_eq!(effect, LinkEffect::Replaced);
        assert_eq!(link_target(&bin.join("portal")), Some(launcher));
    }

    #[test]
    fn test_dangling_link_is_replaced() {
        let (temp, launcher, bin) = setup();
        symlink(temp.path().join("gone"), bin.join("portal")).unwrap();

        let effect = install_launcher_link(&launcher, &bin, "portal").unwrap();
        assert_eq!(effect, LinkEffect::Replaced);
    }

    #[test]
    fn test_missing_source_is_not_found() {
        let (temp, _launcher, bin) = setup();

        let err = install_launcher_link(&temp.path().join("nope"), &bin, "portal").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(link_target(&bin.join("portal")).is_none());
    }

    #[test]
    fn test_directory_at_link_path_is_conflict() {
        let (_temp, launcher, bin) = setup();
        fs::create_dir(bin.join("portal")).unwrap();

        let err = install_launcher_link(&launcher, &bin, "portal").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(bin.join("portal").is_dir());
    }
}
