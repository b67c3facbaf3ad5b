//! portal-setup - idempotent installer for the portal management CLI
//!
//! Provisions the directory layout, marks the launcher executable, links it
//! into the user bin dir, registers that dir on PATH in the shell profile, and
//! writes the priority document. Every step can be re-run safely.
//!
//! # Architecture
//!
//! - **bootstrap**: the five install steps and the [`bootstrap::Bootstrapper`]
//! - **uninstall**: the symmetric removal steps
//! - **doctor**: read-only health checks
//! - **config / cli / logging / report**: ambient plumbing
//!
//! Unix only: relies on symlinks and owner mode bits.

pub mod errors;
pub use errors::{Result, SetupError};

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod doctor;
pub mod logging;
pub mod priority;
pub mod report;
pub mod uninstall;
