//! Priority document rendering
//!
//! Produces the Markdown overview written into the install root on every run:
//! where things were installed and the five management priorities together
//! with the launcher command that serves each one.

use crate::config::{InstallPaths, LauncherSpec};
use chrono::{DateTime, Local};

/// Header line of the generated document
pub const HEADER: &str = "# Portal Manager - Top 5 Priorities";

/// A management priority and the launcher subcommands behind it
#[derive(Debug, Clone, Copy)]
pub struct Priority {
    pub title: &'static str,
    pub description: &'static str,
    pub commands: &'static [&'static str],
}

/// The five priorities, in rank order
pub const PRIORITIES: [Priority; 5] = [
    Priority {
        title: "Site status",
        description: "Check every page file is present",
        commands: &["status"],
    },
    Priority {
        title: "Page management",
        description: "List pages and create new ones from the page template",
        commands: &["list", "create ID TITLE"],
    },
    Priority {
        title: "Backups",
        description: "Snapshot HTML pages and config into the backup directory",
        commands: &["backup"],
    },
    Priority {
        title: "Deployment",
        description: "Commit and push the site to GitHub Pages",
        commands: &["deploy [MSG]"],
    },
    Priority {
        title: "Online check",
        description: "Verify the public URL answers",
        commands: &["check"],
    },
];

/// Installation facts shown in the document
#[derive(Debug, Clone)]
pub struct PriorityContext {
    pub install_root: String,
    pub launcher: String,
    pub link: String,
    pub link_name: String,
    pub log_dir: String,
    pub backup_dir: String,
    pub template_dir: String,
    pub shell_profile: String,
}

impl PriorityContext {
    pub fn new(paths: &InstallPaths, launcher: &LauncherSpec) -> Self {
        Self {
            install_root: paths.install_root.display().to_string(),
            launcher: launcher.source(paths).display().to_string(),
            link: launcher.link(paths).display().to_string(),
            link_name: launcher.link_name.clone(),
            log_dir: paths.log_dir.display().to_string(),
            backup_dir: paths.backup_dir.display().to_string(),
            template_dir: paths.template_dir.display().to_string(),
            shell_profile: paths.shell_profile.display().to_string(),
        }
    }

    /// Fully qualified commands, e.g. `portal status`
    pub fn commands(&self) -> Vec<String> {
        PRIORITIES
            .iter()
            .flat_map(|p| p.commands.iter())
            .map(|c| format!("{} {}", self.link_name, c))
            .collect()
    }
}

/// Render the document
pub fn render(ctx: &PriorityContext, generated_at: &DateTime<Local>) -> String {
    let mut lines = vec![
        HEADER.to_string(),
        String::new(),
        format!("_Generated {}_", generated_at.format("%Y-%m-%d %H:%M:%S")),
        String::new(),
        "## Installation".to_string(),
        String::new(),
        "| Item | Location |".to_string(),
        "|------|----------|".to_string(),
    ];

    let rows = [
        ("Install root", &ctx.install_root),
        ("Launcher", &ctx.launcher),
        ("Command link", &ctx.link),
        ("Logs", &ctx.log_dir),
        ("Backups", &ctx.backup_dir),
        ("Templates", &ctx.template_dir),
        ("Shell profile", &ctx.shell_profile),
    ];
    lines.extend(
        rows.iter()
            .map(|(item, location)| format!("| {} | `{}` |", item, location)),
    );

    lines.extend([
        String::new(),
        "## Priorities".to_string(),
        String::new(),
        "| # | Priority | What | Command |".to_string(),
        "|---|----------|------|---------|".to_string(),
    ]);
    for (rank, priority) in PRIORITIES.iter().enumerate() {
        let commands = priority
            .commands
            .iter()
            .map(|c| format!("`{} {}`", ctx.link_name, c))
            .collect::<Vec<_>>()
            .join(" / ");
        lines.push(format!(
            "| {} | {} | {} | {} |",
            rank + 1,
            priority.title,
            priority.description,
            commands
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "Open a new shell (or `source {}`) before running `{}`.",
        ctx.shell_profile, ctx.link_name
    ));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
