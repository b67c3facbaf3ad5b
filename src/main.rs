//! portal-setup - Main CLI Entry Point

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use colored::Colorize;
use portal_setup::{
    bootstrap::{Bootstrapper, EXIT_CODE_FAILURE},
    cli::{Args, Commands},
    config::Config,
    doctor::Doctor,
    logging, report,
    uninstall::Uninstaller,
    SetupError,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn resolve_home(args: &Args) -> Result<PathBuf, SetupError> {
    match &args.home {
        Some(home) => Ok(home.clone()),
        None => dirs::home_dir().ok_or(SetupError::HomeNotFound),
    }
}

/// Install or repair
fn run_install(args: &Args, config: &Config, home: &Path) -> Result<bool, SetupError> {
    let bootstrapper = Bootstrapper::from_config(config, home)?;
    let report = bootstrapper.run(&Local::now())?;

    if args.verbosity().show_summary() {
        print!("{}", report::install_summary(&report));
    }
    Ok(true)
}

/// Health checks; false when any check fails
fn run_doctor(config: &Config, home: &Path) -> Result<bool, SetupError> {
    let paths = config.install_paths(home)?;
    let doctor = Doctor::new(paths, config.launcher(), std::env::var_os("PATH"));
    let checks = doctor.run_diagnostics();

    Doctor::display_results(&checks);
    let healthy = Doctor::overall_status(&checks);
    if healthy {
        println!("{}", "All checks passed".green());
    } else {
        println!("{}", "Some checks failed, run `portal-setup install` to repair".red());
    }
    Ok(healthy)
}

fn run_uninstall(args: &Args, config: &Config, home: &Path) -> Result<bool, SetupError> {
    let uninstaller = Uninstaller::from_config(config, home)?;
    let report = uninstaller.run()?;

    if args.verbosity().show_summary() {
        print!("{}", report::uninstall_summary(&report));
    }
    Ok(true)
}

fn show_config(args: &Args, config: &Config, home: &Path, init: bool) -> Result<bool, SetupError> {
    let paths = config.install_paths(home)?;
    let launcher = config.launcher();
    let source = args
        .config
        .clone()
        .unwrap_or_else(|| Config::default_path(home));

    if init {
        if source.exists() {
            println!("{} {}", "Config file already exists:".yellow(), source.display());
        } else {
            config.save(&source)?;
            println!("{} {}", "Wrote".green(), source.display());
        }
    }

    println!("{} {}", "# Config file:".dimmed(), source.display());
    println!("{}", config.to_toml()?);
    println!("{}", "# Resolved paths".dimmed());
    println!("install_root  = {}", paths.install_root.display());
    println!("bin_dir       = {}", paths.bin_dir.display());
    println!("log_dir       = {}", paths.log_dir.display());
    println!("backup_dir    = {}", paths.backup_dir.display());
    println!("template_dir  = {}", paths.template_dir.display());
    println!("shell_profile = {}", paths.shell_profile.display());
    println!("priority_doc  = {}", paths.priority_doc.display());
    println!("launcher      = {}", launcher.source(&paths).display());
    println!("link          = {}", launcher.link(&paths).display());
    Ok(true)
}

fn run(args: &Args) -> Result<bool> {
    args.validate().map_err(anyhow::Error::msg)?;

    let home = resolve_home(args)?;
    let config = Config::load(args.config.as_deref(), &home)
        .context("Failed to load configuration")?;

    let log_file = match args.command() {
        Commands::Install => config
            .install_paths(&home)
            .ok()
            .and_then(|paths| config.log_file(&paths)),
        Commands::Doctor | Commands::Uninstall | Commands::Config { .. } => None,
    };
    logging::init(args.verbosity(), log_file.as_deref());

    let outcome = match args.command() {
        Commands::Install => run_install(args, &config, &home),
        Commands::Doctor => run_doctor(&config, &home),
        Commands::Uninstall => run_uninstall(args, &config, &home),
        Commands::Config { init } => show_config(args, &config, &home, init),
    };

    match outcome {
        Ok(ok) => Ok(ok),
        Err(e) => {
            tracing::info!(error = %e, "run failed");
            eprint!("{}", report::failure_message(&e));
            Ok(false)
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_CODE_FAILURE as u8),
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red(), e);
            ExitCode::from(EXIT_CODE_FAILURE as u8)
        }
    }
}
