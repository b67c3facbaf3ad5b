//! Removal of what the bootstrapper installed
//!
//! Kept separate from the bootstrapper: it is the only code that deletes or
//! rewrites anything. It only touches artifacts it can prove are its own:
//! the link must point at our launcher, a profile line must export nothing but
//! the bin dir, and directories go only when empty. The install root and the
//! bin dir are never removed.

use crate::bootstrap::link::link_target;
use crate::bootstrap::profile::{self, PathExport};
use crate::bootstrap::template::replace_file;
use crate::config::{Config, InstallPaths, LauncherSpec};
use crate::errors::{Result, SetupError, Step};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of removing the launcher link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveEffect {
    Removed,
    NotPresent,
}

/// Directory removal outcome
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryRemoval {
    pub removed: Vec<PathBuf>,
    pub kept_non_empty: Vec<PathBuf>,
}

/// What an uninstall run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallReport {
    pub link: PathBuf,
    pub link_effect: RemoveEffect,
    pub shell_profile: PathBuf,
    pub path_lines_removed: usize,
    pub directories: DirectoryRemoval,
}

/// Remove `<link_dir>/<link_name>` if it is a symlink to `expected_target`
pub fn remove_link(link_dir: &Path, link_name: &str, expected_target: &Path) -> Result<RemoveEffect> {
    let step = Step::RemoveLink;
    let link = link_dir.join(link_name);

    match fs::symlink_metadata(&link) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(RemoveEffect::NotPresent),
        Err(e) => return Err(SetupError::from_io(step, &link, e)),
        Ok(_) => {}
    }

    match link_target(&link) {
        Some(target) if target == expected_target => {
            fs::remove_file(&link).map_err(|e| SetupError::from_io(step, &link, e))?;
            debug!(link = %link.display(), "launcher link removed");
            Ok(RemoveEffect::Removed)
        }
        Some(target) => Err(SetupError::conflict(
            step,
            &link,
            format!("points at {}, not the installed launcher", target.display()),
        )),
        None => Err(SetupError::conflict(step, &link, "is not a symlink")),
    }
}

/// Drop profile lines that export exactly `bin_dir`; returns how many were removed
///
/// Lines are kept byte for byte, whatever their encoding.
pub fn remove_path_entry(profile_path: &Path, bin_dir: &Path, home: &Path) -> Result<usize> {
    let content = profile::read_profile(Step::RemovePathEntry, profile_path)?;
    if content.is_empty() {
        return Ok(0);
    }

    let target = PathExport {
        entries: vec![bin_dir.to_path_buf()],
    };

    let mut removed = 0;
    let mut kept = Vec::with_capacity(content.len());
    for line in content.split_inclusive(|b| *b == b'\n') {
        let text = String::from_utf8_lossy(line);
        match PathExport::parse(&text, home) {
            Some(export) if export == target => removed += 1,
            Some(export) if export.covers(&target) => {
                warn!(line = text.trim_end(), "PATH line also exports other directories, leaving it");
                kept.extend_from_slice(line);
            }
            _ => kept.extend_from_slice(line),
        }
    }

    if removed > 0 {
        replace_file(Step::RemovePathEntry, profile_path, &kept)?;
        debug!(profile = %profile_path.display(), removed, "PATH entries removed");
    }
    Ok(removed)
}

/// Remove each directory that exists and is empty
pub fn remove_directories_if_empty<P: AsRef<Path>>(dirs: &[P]) -> Result<DirectoryRemoval> {
    let step = Step::RemoveDirectories;
    let mut outcome = DirectoryRemoval::default();

    for dir in dirs {
        let dir = dir.as_ref();
        let mut entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(SetupError::from_io(step, dir, e)),
        };

        if entries.next().is_some() {
            outcome.kept_non_empty.push(dir.to_path_buf());
            continue;
        }

        fs::remove_dir(dir).map_err(|e| SetupError::from_io(step, dir, e))?;
        outcome.removed.push(dir.to_path_buf());
    }

    Ok(outcome)
}

/// Reverses a bootstrap run
#[derive(Debug, Clone)]
pub struct Uninstaller {
    paths: InstallPaths,
    launcher: LauncherSpec,
}

impl Uninstaller {
    pub fn new(paths: InstallPaths, launcher: LauncherSpec) -> Self {
        Self { paths, launcher }
    }

    pub fn from_config(config: &Config, home: &Path) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.install_paths(home)?, config.launcher()))
    }

    /// Directories eligible for removal, innermost first
    pub fn removable_directories(&self) -> Vec<&Path> {
        vec![
            self.paths.template_dir.as_path(),
            self.paths.backup_dir.as_path(),
            self.paths.log_dir.as_path(),
        ]
    }

    /// Remove link, PATH entry and empty directories, stopping at the first failure
    pub fn run(&self) -> Result<UninstallReport> {
        info!(root = %self.paths.install_root.display(), "starting uninstall");

        let link_effect = remove_link(
            &self.paths.bin_dir,
            &self.launcher.link_name,
            &self.launcher.source(&self.paths),
        )?;
        let path_lines_removed =
            remove_path_entry(&self.paths.shell_profile, &self.paths.bin_dir, &self.paths.home)?;
        let directories = remove_directories_if_empty(&self.removable_directories())?;

        info!(
            removed_lines = path_lines_removed,
            removed_dirs = directories.removed.len(),
            "uninstall complete"
        );

        Ok(UninstallReport {
            link: self.launcher.link(&self.paths),
            link_effect,
            shell_profile: self.paths.shell_profile.clone(),
            path_lines_removed,
            directories,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use std::os::unix::fs::{symlink, PermissionsExt};
    use tempfile::TempDir;

    #[test]
    fn test_remove_link_only_when_ours() {
        let temp = TempDir::new().unwrap();
        let launcher = temp.path().join("portal-src");
        fs::write(&launcher, "").unwrap();
        symlink(&launcher, temp.path().join("portal")).unwrap();

        let effect = remove_link(temp.path(), "portal", &launcher).unwrap();
        assert_eq!(effect, RemoveEffect::Removed);

        let again = remove_link(temp.path(), "portal", &launcher).unwrap();
        assert_eq!(again, RemoveEffect::NotPresent);
    }

    #[test]
    fn test_remove_link_refuses_foreign_link_and_files() {
        let temp = TempDir::new().unwrap();
        symlink("/usr/bin/true", temp.path().join("portal")).unwrap();
        fs::write(temp.path().join("other"), "").unwrap();

        let err = remove_link(temp.path(), "portal", Path::new("/opt/portal/portal")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(link_target(&temp.path().join("portal")).is_some());

        let err = remove_link(temp.path(), "other", Path::new("/opt/portal/portal")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(temp.path().join("other").exists());
    }

    #[test]
    fn test_remove_path_entry_keeps_other_lines() {
        let temp = TempDir::new().unwrap();
        let home = temp.path();
        let profile_path = home.join(".zshrc");
        fs::write(
            &profile_path,
            "alias ll='ls -l'\nexport PATH=\"$HOME/bin:$PATH\"\nexport PATH=\"/usr/local/sbin:$HOME/bin:$PATH\"\nexport PATH=~/bin/:$PATH\n",
        )
        .unwrap();

        let removed = remove_path_entry(&profile_path, &home.join("bin"), home).unwrap();

        assert_eq!(removed, 2);
        assert_eq!(
            fs::read_to_string(&profile_path).unwrap(),
            "alias ll='ls -l'\nexport PATH=\"/usr/local/sbin:$HOME/bin:$PATH\"\n"
        );
    }

    #[test]
    fn test_remove_path_entry_through_symlinked_profile() {
        let temp = TempDir::new().unwrap();
        let home = temp.path();
        let dotfiles = home.join("dotfiles");
        fs::create_dir(&dotfiles).unwrap();
        let real = dotfiles.join("zshrc");
        fs::write(&real, "alias ll='ls -l'\nexport PATH=\"$HOME/bin:$PATH\"\n").unwrap();
        fs::set_permissions(&real, fs::Permissions::from_mode(0o600)).unwrap();
        let profile_path = home.join(".zshrc");
        symlink(&real, &profile_path).unwrap();

        let removed = remove_path_entry(&profile_path, &home.join("bin"), home).unwrap();

        assert_eq!(removed, 1);
        assert!(fs::symlink_metadata(&profile_path).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&real).unwrap(), "alias ll='ls -l'\n");
        assert_eq!(fs::metadata(&real).unwrap().permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn test_remove_path_entry_keeps_profile_mode() {
        let temp = TempDir::new().unwrap();
        let home = temp.path();
        let profile_path = home.join(".zshrc");
        fs::write(&profile_path, "export PATH=\"$HOME/bin:$PATH\"\n").unwrap();
        fs::set_permissions(&profile_path, fs::Permissions::from_mode(0o600)).unwrap();

        remove_path_entry(&profile_path, &home.join("bin"), home).unwrap();

        assert_eq!(fs::read(&profile_path).unwrap(), b"");
        assert_eq!(fs::metadata(&profile_path).unwrap().permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn test_remove_path_entry_keeps_non_utf8_lines() {
        let temp = TempDir::new().unwrap();
        let home = temp.path();
        let profile_path = home.join(".zshrc");
        let mut content = b"# caf\xe9 latin-1\n".to_vec();
        content.extend_from_slice(b"export PATH=\"$HOME/bin:$PATH\"\n");
        content.extend_from_slice(b"alias x=\xff");
        fs::write(&profile_path, &content).unwrap();

        let removed = remove_path_entry(&profile_path, &home.join("bin"), home).unwrap();

        assert_eq!(removed, 1);
        assert_eq!(fs::read(&profile_path).unwrap(), b"# caf\xe9 latin-1\nalias x=\xff".to_vec());
    }

    #[test]
    fn test_remove_path_entry_missing_profile() {
        let temp = TempDir::new().unwrap();
        let removed =
            remove_path_entry(&temp.path().join(".zshrc"), &temp.path().join("bin"), temp.path()).unwrap();
        assert_eq!(removed, 0);
        assert!(!temp.path().join(".zshrc").exists());
    }

    #[test]
    fn test_remove_directories_if_empty() {
        let temp = TempDir::new().unwrap();
        let empty = temp.path().join("templates");
        let full = temp.path().join("backups");
        fs::create_dir(&empty).unwrap();
        fs::create_dir(&full).unwrap();
        fs::write(full.join("backup_20250101"), "").unwrap();

        let outcome =
            remove_directories_if_empty(&[&empty, &full, &temp.path().join("absent")]).unwrap();

        assert_eq!(outcome.removed, vec![empty.clone()]);
        assert_eq!(outcome.kept_non_empty, vec![full.clone()]);
        assert!(!empty.exists());
        assert!(full.exists());
    }
}
