//! Human-readable run summaries

use crate::bootstrap::{InstallReport, LinkEffect, PathEffect};
use crate::errors::SetupError;
use crate::uninstall::{RemoveEffect, UninstallReport};
use colored::Colorize;

/// Summary printed after a successful install
pub fn install_summary(report: &InstallReport) -> String {
    let mut lines = vec![
        String::new(),
        "Portal manager installed".bold().green().to_string(),
        "=".repeat(50).cyan().to_string(),
    ];

    if report.created_dirs.is_empty() {
        lines.push(format!("  Directories:  {}", "already present".dimmed()));
    } else {
        lines.push(format!("  Directories:  {} created", report.created_dirs.len()));
        lines.extend(
            report
                .created_dirs
                .iter()
                .map(|dir| format!("    + {}", dir.display())),
        );
    }

    lines.push(format!(
        "  Executables:  {} ({} updated)",
        report.executables.len(),
        report.newly_executable.len()
    ));

    let link_state = match report.link_effect {
        LinkEffect::Created => "created".green(),
        LinkEffect::Replaced => "replaced".yellow(),
        LinkEffect::Unchanged => "unchanged".dimmed(),
    };
    lines.push(format!(
        "  Link:         {} -> {} [{}]",
        report.link.display(),
        report.link_target.display(),
        link_state
    ));

    let path_state = match report.path_effect {
        PathEffect::Appended => "appended".green(),
        PathEffect::AlreadyPresent => "already present".dimmed(),
    };
    lines.push(format!(
        "  PATH entry:   {} [{}]",
        report.shell_profile.display(),
        path_state
    ));
    lines.push(format!("  Priorities:   {}", report.priority_doc.display()));

    lines.push(String::new());
    lines.push("Available commands:".bold().to_string());
    lines.extend(report.commands.iter().map(|c| format!("  {}", c.cyan())));

    if report.path_effect == PathEffect::Appended {
        lines.push(String::new());
        lines.push(format!(
            "Run `source {}` or open a new shell to use them.",
            report.shell_profile.display()
        ));
    }

    finish(lines)
}

/// Summary printed after a successful uninstall
pub fn uninstall_summary(report: &UninstallReport) -> String {
    let link_state = match report.link_effect {
        RemoveEffect::Removed => "removed",
        RemoveEffect::NotPresent => "not present",
    };

    let mut lines = vec![
        String::new(),
        "Portal manager uninstalled".bold().green().to_string(),
        "=".repeat(50).cyan().to_string(),
        format!("  Link:         {} [{}]", report.link.display(), link_state),
        format!(
            "  PATH entry:   {} [{} line(s) removed]",
            report.shell_profile.display(),
            report.path_lines_removed
        ),
    ];
    lines.extend(
        report
            .directories
            .removed
            .iter()
            .map(|dir| format!("    - {}", dir.display())),
    );
    lines.extend(
        report
            .directories
            .kept_non_empty
            .iter()
            .map(|dir| format!("    kept (not empty): {}", dir.display())),
    );

    finish(lines)
}

/// Diagnosis printed to stderr when a run fails
pub fn failure_message(err: &SetupError) -> String {
    let heading = match err.step() {
        Some(step) => format!("Step '{}' failed", step),
        None => "portal-setup failed".to_string(),
    };
    let mut lines = vec![heading.bold().red().to_string()];

    match err {
        SetupError::Partial { failures, .. } => {
            lines.extend(failures.iter().map(|f| format!("  - {}", f)));
        }
        other => lines.push(format!("  {}", other)),
    }

    lines.push("Fix the problem above and re-run; completed steps are safe to repeat.".to_string());
    finish(lines)
}

fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
