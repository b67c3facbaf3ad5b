//! Doctor command for installation diagnostics
//!
//! Read-only health checks over everything the bootstrapper provisions.

use crate::bootstrap::link::link_target;
use crate::bootstrap::permissions::is_owner_executable;
use crate::bootstrap::profile::{self, PathExport};
use crate::config::{InstallPaths, LauncherSpec};
use crate::errors::Step;
use colored::Colorize;
use std::ffi::OsString;
use std::path::PathBuf;

/// Health check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Pass,
    Warn(String),
    Fail(String),
}

/// Individual health check
#[derive(Debug)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
}

impl HealthCheck {
    fn new(name: &str, status: HealthStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
        }
    }
}

/// Doctor diagnostics system
pub struct Doctor {
    paths: InstallPaths,
    launcher: LauncherSpec,
    path_env: Option<OsString>,
}

impl Doctor {
    /// `path_env` is the PATH value to inspect, usually `std::env::var_os("PATH")`
    pub fn new(paths: InstallPaths, launcher: LauncherSpec, path_env: Option<OsString>) -> Self {
        Self {
            paths,
            launcher,
            path_env,
        }
    }

    /// Run all health checks
    pub fn run_diagnostics(&self) -> Vec<HealthCheck> {
        vec![
            self.check_directories(),
            self.check_launcher(),
            self.check_scripts(),
            self.check_link(),
            self.check_profile(),
            self.check_priority_doc(),
            self.check_process_path(),
        ]
    }

    /// Check 1: directory layout
    fn check_directories(&self) -> HealthCheck {
        let missing: Vec<String> = self
            .paths
            .directories()
            .into_iter()
            .filter(|d| !d.is_dir())
            .map(|d| d.display().to_string())
            .collect();

        if missing.is_empty() {
            HealthCheck::new("Directories", HealthStatus::Pass)
        } else {
            HealthCheck::new(
                "Directories",
                HealthStatus::Fail(format!("missing: {}", missing.join(", "))),
            )
        }
    }

    /// Check 2: launcher present and executable
    fn check_launcher(&self) -> HealthCheck {
        let source = self.launcher.source(&self.paths);
        let status = if !source.is_file() {
            HealthStatus::Fail(format!("{} not found", source.display()))
        } else if !is_owner_executable(&source) {
            HealthStatus::Fail(format!("{} is not executable", source.display()))
        } else {
            HealthStatus::Pass
        };
        HealthCheck::new("Launcher", status)
    }

    /// Check 3: companion scripts executable
    fn check_scripts(&self) -> HealthCheck {
        let bad: Vec<PathBuf> = self
            .launcher
            .scripts
            .iter()
            .map(|s| self.paths.install_root.join(s))
            .filter(|p| !is_owner_executable(p))
            .collect();

        if bad.is_empty() {
            HealthCheck::new("Scripts", HealthStatus::Pass)
        } else {
            let list = bad.iter().map(|p| p.display().to_string()).collect::<Vec<_>>();
            HealthCheck::new(
                "Scripts",
                HealthStatus::Fail(format!("missing or not executable: {}", list.join(", "))),
            )
        }
    }

    /// Check 4: link resolves to the launcher
    fn check_link(&self) -> HealthCheck {
        let link = self.launcher.link(&self.paths);
        let source = self.launcher.source(&self.paths);
        let status = match link_target(&link) {
            Some(target) if target == source && source.exists() => HealthStatus::Pass,
            Some(target) if target == source => {
                HealthStatus::Fail(format!("{} is dangling", link.display()))
            }
            Some(target) => HealthStatus::Fail(format!(
                "{} points at {}",
                link.display(),
                target.display()
            )),
            None if link.exists() => {
                HealthStatus::Fail(format!("{} exists but is not a symlink", link.display()))
            }
            None => HealthStatus::Fail(format!("{} not found", link.display())),
        };
        HealthCheck::new("Launcher link", status)
    }

    /// Check 5: profile exports the bin dir exactly once
    fn check_profile(&self) -> HealthCheck {
        let profile_path = &self.paths.shell_profile;
        let content = match profile::read_profile(Step::RegisterPathEntry, profile_path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => return HealthCheck::new("Shell profile", HealthStatus::Fail(e.to_string())),
        };

        let target = PathExport {
            entries: vec![self.paths.bin_dir.clone()],
        };
        let status = match profile::count_matching(&content, &target, &self.paths.home) {
            0 => HealthStatus::Fail(format!(
                "{} does not export {}",
                profile_path.display(),
                self.paths.bin_dir.display()
            )),
            1 => HealthStatus::Pass,
            n => HealthStatus::Warn(format!("{} PATH exports of the bin dir", n)),
        };
        HealthCheck::new("Shell profile", status)
    }

    /// Check 6: priority document present
    fn check_priority_doc(&self) -> HealthCheck {
        let doc = &self.paths.priority_doc;
        if doc.is_file() {
            HealthCheck::new("Priority document", HealthStatus::Pass)
        } else {
            HealthCheck::new(
                "Priority document",
                HealthStatus::Warn(format!("{} not generated yet", doc.display())),
            )
        }
    }

    /// Check 7: bin dir on the current PATH
    fn check_process_path(&self) -> HealthCheck {
        let on_path = self
            .path_env
            .as_ref()
            .map(|p| std::env::split_paths(p).any(|entry| entry == self.paths.bin_dir))
            .unwrap_or(false);

        if on_path {
            HealthCheck::new("Current PATH", HealthStatus::Pass)
        } else {
            HealthCheck::new(
                "Current PATH",
                HealthStatus::Warn("bin dir not on PATH yet, open a new shell".to_string()),
            )
        }
    }

    /// Display diagnostics results
    pub fn display_results(checks: &[HealthCheck]) {
        println!("\n{}\n", "portal-setup Diagnostics".bold().cyan());
        println!("{:<20} {}", "Check", "Status");
        println!("{}", "=".repeat(50));

        for check in checks {
            let message = match &check.status {
                HealthStatus::Pass => "PASS".green(),
                HealthStatus::Warn(msg) => format!("WARN: {}", msg).yellow(),
                HealthStatus::Fail(msg) => format!("FAIL: {}", msg).red(),
            };
            println!("{:<20} {}", check.name, message);
        }

        println!();
    }

    /// Get overall health status
    pub fn overall_status(checks: &[HealthCheck]) -> bool {
        !checks.iter().any(|c| matches!(c.status, HealthStatus::Fail(_)))
    }
}
