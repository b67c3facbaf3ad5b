//! Bootstrap system for portal-setup
//!
//! Brings the target environment to a known installed state from any prior
//! state: nothing installed, partially installed, or fully installed.
//!
//! The run is a flat sequence of individually idempotent steps:
//! 1. create the directory layout
//! 2. mark the launcher and its scripts executable
//! 3. link the launcher into the user bin dir
//! 4. register the bin dir on PATH in the shell profile
//! 5. write the priority document
//!
//! The first failing step aborts the run. Steps 1 and 2 still attempt every
//! entry before reporting. Two concurrent runs may race on the profile append;
//! only one invocation at a time is supported.

pub mod directories;
pub mod link;
pub mod permissions;
pub mod profile;
pub mod template;

pub use directories::ensure_directories;
pub use link::{install_launcher_link, LinkEffect};
pub use permissions::grant_executable;
pub use profile::{register_path_entry, PathEffect};
pub use template::materialize_template;

use crate::config::{Config, InstallPaths, LauncherSpec};
use crate::errors::Result;
use crate::priority::{self, PriorityContext};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::info;

/// Exit code for a failed run
pub const EXIT_CODE_FAILURE: i32 = 1;

/// What a successful run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub created_dirs: Vec<PathBuf>,
    pub executables: Vec<PathBuf>,
    pub newly_executable: Vec<PathBuf>,
    pub link: PathBuf,
    pub link_target: PathBuf,
    pub link_effect: LinkEffect,
    pub shell_profile: PathBuf,
    pub export_line: String,
    pub path_effect: PathEffect,
    pub priority_doc: PathBuf,
    pub commands: Vec<String>,
}

/// Installer for the portal launcher
#[derive(Debug, Clone)]
pub struct Bootstrapper {
    paths: InstallPaths,
    launcher: LauncherSpec,
}

impl Bootstrapper {
    /// Create a bootstrapper over resolved paths
    pub fn new(paths: InstallPaths, launcher: LauncherSpec) -> Self {
        Self { paths, launcher }
    }

    /// Resolve `config` against `home`
    pub fn from_config(config: &Config, home: &Path) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.install_paths(home)?, config.launcher()))
    }

    pub fn paths(&self) -> &InstallPaths {
        &self.paths
    }

    pub fn launcher(&self) -> &LauncherSpec {
        &self.launcher
    }

    /// Line appended to the shell profile
    pub fn export_line(&self) -> String {
        profile::export_line(&self.paths.bin_dir, &self.paths.home)
    }

    /// Step 1
    pub fn ensure_directories(&self) -> Result<Vec<PathBuf>> {
        ensure_directories(&self.paths.directories())
    }

    /// Step 2; returns the files whose mode changed
    pub fn grant_executable(&self) -> Result<Vec<PathBuf>> {
        grant_executable(&self.launcher.executables(&self.paths))
    }

    /// Step 3
    pub fn install_launcher_link(&self) -> Result<LinkEffect> {
        install_launcher_link(
            &self.launcher.source(&self.paths),
            &self.paths.bin_dir,
            &self.launcher.link_name,
        )
    }

    /// Step 4
    pub fn register_path_entry(&self) -> Result<PathEffect> {
        register_path_entry(&self.paths.shell_profile, &self.export_line(), &self.paths.home)
    }

    /// Step 5
    pub fn materialize_priority_document(&self, generated_at: &DateTime<Local>) -> Result<()> {
        let content = priority::render(&self.priority_context(), generated_at);
        materialize_template(&self.paths.priority_doc, &content)
    }

    fn priority_context(&self) -> PriorityContext {
        PriorityContext::new(&self.paths, &self.launcher)
    }

    /// Run every step in order, stopping at the first failure
    pub fn run(&self, generated_at: &DateTime<Local>) -> Result<InstallReport> {
        info!(root = %self.paths.install_root.display(), "starting installation");

        let created_dirs = self.ensure_directories()?;
        info!(created = created_dirs.len(), "directories ready");

        let newly_executable = self.grant_executable()?;
        info!(changed = newly_executable.len(), "launcher artifacts executable");

        let link_effect = self.install_launcher_link()?;
        info!(effect = link_effect.as_str(), "launcher link ready");

        let path_effect = self.register_path_entry()?;
        info!(effect = path_effect.as_str(), profile = %self.paths.shell_profile.display(), "PATH entry ready");

        self.materialize_priority_document(generated_at)?;
        info!(path = %self.paths.priority_doc.display(), "priority document written");

        Ok(InstallReport {
            created_dirs,
            executables: self.launcher.executables(&self.paths),
            newly_executable,
            link: self.launcher.link(&self.paths),
            link_target: self.launcher.source(&self.paths),
            link_effect,
            shell_profile: self.paths.shell_profile.clone(),
            export_line: self.export_line(),
            path_effect,
            priority_doc: self.paths.priority_doc.clone(),
            commands: self.priority_context().commands(),
        })
    }
}
