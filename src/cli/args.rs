//! Command-line argument parsing for portal-setup
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// portal-setup - Install the portal management CLI into your environment
#[derive(Parser, Debug)]
#[command(name = "portal-setup")]
#[command(version)]
#[command(about = "Install the portal management CLI: directories, launcher link, PATH entry", long_about = None)]
pub struct Args {
    /// Configuration file path (default: ~/.portal-setup/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Home directory used to resolve all default paths
    #[arg(long, global = true, value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand (defaults to install)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Install or repair the portal launcher (default)
    Install,

    /// Check the installed state
    Doctor,

    /// Remove the launcher link, PATH entry and empty directories
    Uninstall,

    /// Display the effective configuration and resolved paths
    Config {
        /// Write the effective configuration to the config file if none exists
        #[arg(long)]
        init: bool,
    },
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Subcommand to run; no subcommand means install
    pub fn command(&self) -> Commands {
        self.command.unwrap_or(Commands::Install)
    }

    /// Reject contradictory flags
    pub fn validate(&self) -> Result<(), String> {
        if self.quiet && self.verbose > 0 {
            return Err("Cannot combine --quiet with --verbose.".to_string());
        }
        if let Some(home) = &self.home {
            if !home.is_absolute() {
                return Err(format!("--home must be an absolute path, got {}", home.display()));
            }
        }
        Ok(())
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Check if the run summary should be printed
    pub fn show_summary(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }
}
