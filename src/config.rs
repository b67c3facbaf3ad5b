//! Configuration management for portal-setup
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.portal-setup/config.toml
//!
//! Paths in the file may use `~/` or `$HOME/`; they are expanded against the
//! home directory handed to [`Config::install_paths`], never read from the
//! process environment.

use crate::errors::{Result, SetupError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory (relative to home) holding the default config file
pub const CONFIG_DIR: &str = ".portal-setup";

/// Default config file name
pub const CONFIG_FILE: &str = "config.toml";

/// Complete configuration for portal-setup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub launcher: LauncherConfig,
    pub logging: LoggingConfig,
}

/// Filesystem layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub install_root: String,
    pub bin_dir: String,
    pub log_dir: String,
    /// Defaults to `<install_root>/backups`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<String>,
    /// Defaults to `<install_root>/templates`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_dir: Option<String>,
    pub shell_profile: String,
    /// Defaults to `<install_root>/PRIORITIES.md`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_doc: Option<String>,
}

/// Launcher artifacts shipped in the install root
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    pub name: String,
    /// Name exposed in the bin dir; defaults to `name`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_name: Option<String>,
    /// Companion scripts that must also be executable
    pub scripts: Vec<String>,
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append a log file under the log dir
    pub file: bool,
    pub file_name: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            install_root: "~/portal".to_string(),
            bin_dir: "~/bin".to_string(),
            log_dir: "~/logs".to_string(),
            backup_dir: None,
            template_dir: None,
            shell_profile: "~/.zshrc".to_string(),
            priority_doc: None,
        }
    }
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            name: "portal".to_string(),
            link_name: None,
            scripts: vec!["portal_manager.py".to_string()],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: true,
            file_name: "portal-setup.log".to_string(),
        }
    }
}

/// Fully resolved, absolute installation paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPaths {
    pub home: PathBuf,
    pub install_root: PathBuf,
    pub bin_dir: PathBuf,
    pub log_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub template_dir: PathBuf,
    pub shell_profile: PathBuf,
    pub priority_doc: PathBuf,
}

impl InstallPaths {
    /// Directories provisioned by the bootstrapper, in creation order
    pub fn directories(&self) -> Vec<&Path> {
        vec![
            self.install_root.as_path(),
            self.bin_dir.as_path(),
            self.log_dir.as_path(),
            self.backup_dir.as_path(),
            self.template_dir.as_path(),
        ]
    }
}

/// Launcher names resolved against an install root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherSpec {
    pub name: String,
    pub link_name: String,
    pub scripts: Vec<String>,
}

impl LauncherSpec {
    /// Location of the launcher executable
    pub fn source(&self, paths: &InstallPaths) -> PathBuf {
        paths.install_root.join(&self.name)
    }

    /// Location of the symlink in the bin dir
    pub fn link(&self, paths: &InstallPaths) -> PathBuf {
        paths.bin_dir.join(&self.link_name)
    }

    /// Launcher plus companion scripts
    pub fn executables(&self, paths: &InstallPaths) -> Vec<PathBuf> {
        std::iter::once(&self.name)
            .chain(self.scripts.iter())
            .map(|name| paths.install_root.join(name))
            .collect()
    }
}

impl Config {
    /// Load configuration from an explicit file or the default location under `home`
    pub fn load(path: Option<&Path>, home: &Path) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(config_path)
        } else {
            Self::load_default(home)
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SetupError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            SetupError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load `~/.portal-setup/config.toml` when present, built-in defaults otherwise
    pub fn load_default(home: &Path) -> Result<Self> {
        let config_path = Self::default_path(home);
        if config_path.exists() {
            return Self::load_from_file(&config_path);
        }
        Ok(Config::default())
    }

    /// Default config file location
    pub fn default_path(home: &Path) -> PathBuf {
        home.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        check_name("launcher.name", &self.launcher.name)?;
        if let Some(link_name) = &self.launcher.link_name {
            check_name("launcher.link_name", link_name)?;
        }
        for script in &self.launcher.scripts {
            check_name("launcher.scripts", script)?;
        }
        check_name("logging.file_name", &self.logging.file_name)?;

        let required = [
            ("paths.install_root", &self.paths.install_root),
            ("paths.bin_dir", &self.paths.bin_dir),
            ("paths.log_dir", &self.paths.log_dir),
            ("paths.shell_profile", &self.paths.shell_profile),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(SetupError::Config(format!("{} must not be empty", key)));
            }
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| SetupError::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SetupError::Config(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| SetupError::Config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| SetupError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Resolve every configured path to an absolute path under `home`
    pub fn install_paths(&self, home: &Path) -> Result<InstallPaths> {
        if !home.is_absolute() {
            return Err(SetupError::Config(format!(
                "home directory must be absolute: {}",
                home.display()
            )));
        }

        let install_root = expand_path(home, &self.paths.install_root);
        let under_root = |value: &Option<String>, default: &str| match value {
            Some(raw) => expand_path(home, raw),
            None => install_root.join(default),
        };

        Ok(InstallPaths {
            home: home.to_path_buf(),
            bin_dir: expand_path(home, &self.paths.bin_dir),
            log_dir: expand_path(home, &self.paths.log_dir),
            backup_dir: under_root(&self.paths.backup_dir, "backups"),
            template_dir: under_root(&self.paths.template_dir, "templates"),
            shell_profile: expand_path(home, &self.paths.shell_profile),
            priority_doc: under_root(&self.paths.priority_doc, "PRIORITIES.md"),
            install_root,
        })
    }

    /// Launcher names with defaults applied
    pub fn launcher(&self) -> LauncherSpec {
        LauncherSpec {
            name: self.launcher.name.clone(),
            link_name: self
                .launcher
                .link_name
                .clone()
                .unwrap_or_else(|| self.launcher.name.clone()),
            scripts: self.launcher.scripts.clone(),
        }
    }

    /// Log file location, if file logging is enabled
    pub fn log_file(&self, paths: &InstallPaths) -> Option<PathBuf> {
        self.logging
            .file
            .then(|| paths.log_dir.join(&self.logging.file_name))
    }
}

fn check_name(key: &str, value: &str) -> Result<()> {
    if value.is_empty() || value == "." || value == ".." || value.contains('/') {
        return Err(SetupError::Config(format!(
            "{} must be a plain file name, got {:?}",
            key, value
        )));
    }
    Ok(())
}

/// Expand `~`, `~/`, `$HOME` and `${HOME}` against `home`; relative paths land under `home`
pub fn expand_path(home: &Path, raw: &str) -> PathBuf {
    let raw = raw.trim();
    expand_home(home, raw).unwrap_or_else(|| {
        let path = PathBuf::from(raw);
        if path.is_absolute() {
            path
        } else {
            home.join(path)
        }
    })
}

/// Expand a home-relative spelling; `None` when `raw` does not start with one
pub fn expand_home(home: &Path, raw: &str) -> Option<PathBuf> {
    for prefix in ["~", "$HOME", "${HOME}"] {
        if raw == prefix {
            return Some(home.to_path_buf());
        }
        if let Some(rest) = raw.strip_prefix(prefix).and_then(|r| r.strip_prefix('/')) {
            return Some(home.join(rest));
        }
    }
    None
}
