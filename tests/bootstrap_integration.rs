//! Integration tests for the install / re-install / uninstall lifecycle
//!
//! Every test runs against a throwaway home directory.

use chrono::{Local, TimeZone};
use portal_setup::{
    bootstrap::{
        link::link_target, permissions::is_owner_executable, profile, Bootstrapper, LinkEffect,
        PathEffect,
    },
    config::Config,
    doctor::Doctor,
    errors::{ErrorKind, Step},
    priority,
    uninstall::{RemoveEffect, Uninstaller},
};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::TempDir;

fn bootstrapper(home: &Path) -> Bootstrapper {
    Bootstrapper::from_config(&Config::default(), home).unwrap()
}

/// Lay down the launcher artifacts the installer expects to find
fn place_launcher(b: &Bootstrapper) {
    fs::create_dir_all(&b.paths().install_root).unwrap();
    for exe in b.launcher().executables(b.paths()) {
        fs::write(&exe, "#!/bin/sh\necho portal\n").unwrap();
        fs::set_permissions(&exe, fs::Permissions::from_mode(0o644)).unwrap();
    }
}

fn export_count(b: &Bootstrapper) -> usize {
    let content = fs::read_to_string(&b.paths().shell_profile).unwrap_or_default();
    let target = profile::PathExport::parse(&b.export_line(), &b.paths().home).unwrap();
    profile::count_matching(&content, &target, &b.paths().home)
}

#[test]
fn test_fresh_environment_install() {
    let home = TempDir::new().unwrap();
    let b = bootstrapper(home.path());
    place_launcher(&b);

    b.run(&Local::now()).unwrap();

    let paths = b.paths();
    for dir in [&paths.backup_dir, &paths.template_dir, &paths.log_dir, &paths.bin_dir] {
        assert!(dir.is_dir(), "{} missing", dir.display());
    }
    let link = b.launcher().link(paths);
    assert_eq!(link_target(&link), Some(b.launcher().source(paths)));
    assert_eq!(fs::canonicalize(&link).unwrap(), fs::canonicalize(b.launcher().source(paths)).unwrap());
    assert!(b.launcher().executables(paths).iter().all(|e| is_owner_executable(e)));
    assert_eq!(export_count(&b), 1);

    let doc = fs::read_to_string(&paths.priority_doc).unwrap();
    assert!(doc.starts_with(priority::HEADER));
}

#[test]
fn test_second_run_is_byte_identical() {
    let home = TempDir::new().unwrap();
    let b = bootstrapper(home.path());
    place_launcher(&b);
    let link = b.launcher().link(b.paths());

    b.run(&Local::now()).unwrap();
    let profile_after_first = fs::read(&b.paths().shell_profile).unwrap();
    let link_after_first = fs::read_link(&link).unwrap();

    let report = b.run(&Local::now()).unwrap();

    assert_eq!(report.link_effect, LinkEffect::Unchanged);
    assert_eq!(report.path_effect, PathEffect::AlreadyPresent);
    assert_eq!(fs::read(&b.paths().shell_profile).unwrap(), profile_after_first);
    assert_eq!(fs::read_link(&link).unwrap(), link_after_first);
}

#[test]
fn test_many_runs_keep_single_export_and_link() {
    let home = TempDir::new().unwrap();
    let b = bootstrapper(home.path());
    place_launcher(&b);
    fs::write(&b.paths().shell_profile, "export EDITOR=vim\n").unwrap();

    for _ in 0..5 {
        b.run(&Local::now()).unwrap();
    }

    assert_eq!(export_count(&b), 1);
    let bin_entries: Vec<_> = fs::read_dir(&b.paths().bin_dir).unwrap().collect();
    assert_eq!(bin_entries.len(), 1);
    assert!(fs::read_to_string(&b.paths().shell_profile)
        .unwrap()
        .starts_with("export EDITOR=vim\n"));
}

#[test]
fn test_preexisting_directories_are_tolerated() {
    let home = TempDir::new().unwrap();
    let b = bootstrapper(home.path());
    for dir in b.paths().directories() {
        fs::create_dir_all(dir).unwrap();
    }
    place_launcher(&b);

    let report = b.run(&Local::now()).unwrap();
    assert!(report.created_dirs.is_empty());
}

#[test]
fn test_missing_launcher_is_reported() {
    let home = TempDir::new().unwrap();
    let b = bootstrapper(home.path());

    let err = b.run(&Local::now()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.step(), Some(Step::GrantExecutable));
    assert!(err.to_string().contains("portal"));
    assert!(link_target(&b.launcher().link(b.paths())).is_none());
}

#[test]
fn test_missing_launcher_at_link_step() {
    let home = TempDir::new().unwrap();
    let b = bootstrapper(home.path());
    b.ensure_directories().unwrap();

    let err = b.install_launcher_link().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.step(), Some(Step::InstallLauncherLink));
}

#[test]
fn test_priority_document_reflects_latest_run() {
    let home = TempDir::new().unwrap();
    let b = bootstrapper(home.path());
    place_launcher(&b);

    let first = Local.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
    let second = Local.with_ymd_and_hms(2025, 6, 30, 20, 15, 0).unwrap();
    b.run(&first).unwrap();
    b.run(&second).unwrap();

    let doc = fs::read_to_string(&b.paths().priority_doc).unwrap();
    assert!(doc.contains("2025-06-30 20:15:00"));
    assert!(!doc.contains("2025-01-01 08:00:00"));
    assert_eq!(doc.matches(priority::HEADER).count(), 1);
}

#[test]
fn test_launcher_moved_link_follows() {
    let home = TempDir::new().unwrap();
    let mut config = Config::default();
    let b = Bootstrapper::from_config(&config, home.path()).unwrap();
    place_launcher(&b);
    b.run(&Local::now()).unwrap();

    config.paths.install_root = "~/portal-v2".to_string();
    let moved = Bootstrapper::from_config(&config, home.path()).unwrap();
    place_launcher(&moved);
    let report = moved.run(&Local::now()).unwrap();

    assert_eq!(report.link_effect, LinkEffect::Replaced);
    assert_eq!(
        link_target(&moved.launcher().link(moved.paths())),
        Some(moved.launcher().source(moved.paths()))
    );
    assert_eq!(export_count(&moved), 1);
}

#[test]
fn test_doctor_after_install_and_uninstall() {
    let home = TempDir::new().unwrap();
    let config = Config::default();
    let b = Bootstrapper::from_config(&config, home.path()).unwrap();
    place_launcher(&b);
    let path_env = std::env::join_paths([b.paths().bin_dir.clone()]).unwrap();
    let doctor = Doctor::new(b.paths().clone(), b.launcher().clone(), Some(path_env));

    assert!(!Doctor::overall_status(&doctor.run_diagnostics()));

    b.run(&Local::now()).unwrap();
    assert!(Doctor::overall_status(&doctor.run_diagnostics()));

    let report = Uninstaller::from_config(&config, home.path()).unwrap().run().unwrap();
    assert_eq!(report.link_effect, RemoveEffect::Removed);
    assert_eq!(report.path_lines_removed, 1);
    assert_eq!(report.directories.removed.len(), 3);
    assert_eq!(export_count(&b), 0);
    assert!(!Doctor::overall_status(&doctor.run_diagnostics()));

    // The launcher itself and the install root stay in place.
    assert!(b.launcher().source(b.paths()).is_file());
}

#[test]
fn test_reinstall_after_uninstall() {
    let home = TempDir::new().unwrap();
    let config = Config::default();
    let b = Bootstrapper::from_config(&config, home.path()).unwrap();
    place_launcher(&b);

    b.run(&Local::now()).unwrap();
    Uninstaller::from_config(&config, home.path()).unwrap().run().unwrap();
    let report = b.run(&Local::now()).unwrap();

    assert_eq!(report.link_effect, LinkEffect::Created);
    assert_eq!(report.path_effect, PathEffect::Appended);
    assert_eq!(export_count(&b), 1);
}
