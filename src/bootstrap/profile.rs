//! Shell profile PATH registration
//!
//! Lines are compared by what they put on PATH, not by their text: quoting,
//! `$HOME` vs `~` vs an absolute path, and trailing slashes all normalize to
//! the same set of directories.

use crate::config::expand_home;
use crate::errors::{Result, SetupError, Step};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Outcome of registering the PATH entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathEffect {
    AlreadyPresent,
    Appended,
}

impl PathEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathEffect::AlreadyPresent => "already present",
            PathEffect::Appended => "appended",
        }
    }
}

/// Directories a single profile line adds to PATH
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExport {
    pub entries: Vec<PathBuf>,
}

impl PathExport {
    /// Parse a `PATH=...` assignment; `None` for anything else
    pub fn parse(line: &str, home: &Path) -> Option<Self> {
        let line = strip_comment(line.trim()).trim();
        if line.is_empty() {
            return None;
        }

        let assignment = ["export ", "typeset -x ", "declare -x "]
            .iter()
            .find_map(|kw| line.strip_prefix(kw))
            .unwrap_or(line)
            .trim_start();
        let value = assignment.strip_prefix("PATH=")?;
        let value = value.trim().trim_end_matches(';');

        let unquoted: String = value.chars().filter(|c| *c != '"' && *c != '\'').collect();
        // The shell resolves relative components against the working directory.
        let entries = unquoted
            .split(':')
            .map(str::trim)
            .filter(|c| !c.is_empty() && !is_path_reference(c))
            .map(|c| expand_home(home, c).unwrap_or_else(|| PathBuf::from(c)))
            .filter(|p| p.is_absolute())
            .collect::<Vec<_>>();

        if entries.is_empty() {
            return None;
        }
        Some(Self { entries })
    }

    /// Whether this line puts every directory of `other` on PATH
    pub fn covers(&self, other: &PathExport) -> bool {
        other.entries.iter().all(|e| self.entries.contains(e))
    }
}

fn is_path_reference(component: &str) -> bool {
    matches!(component, "$PATH" | "${PATH}")
}

/// Drop a trailing ` # comment`; whole-line comments become empty
fn strip_comment(line: &str) -> &str {
    if line.starts_with('#') {
        return "";
    }
    match line.find(" #") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// The line appended to the profile for `bin_dir`
pub fn export_line(bin_dir: &Path, home: &Path) -> String {
    let dir = match bin_dir.strip_prefix(home) {
        Ok(rest) if rest.as_os_str().is_empty() => "$HOME".to_string(),
        Ok(rest) => format!("$HOME/{}", rest.display()),
        Err(_) => bin_dir.display().to_string(),
    };
    format!("export PATH=\"{}:$PATH\"", dir)
}

/// Number of lines in `content` that export what `target` exports
pub fn count_matching(content: &str, target: &PathExport, home: &Path) -> usize {
    content
        .lines()
        .filter_map(|line| PathExport::parse(line, home))
        .filter(|export| export.covers(target))
        .count()
}

/// Append `export_line` to `profile` unless an equivalent export already exists
pub fn register_path_entry(profile: &Path, export_line: &str, home: &Path) -> Result<PathEffect> {
    let step = Step::RegisterPathEntry;
    let target = PathExport::parse(export_line, home).ok_or_else(|| {
        SetupError::Config(format!("not a PATH export line: {:?}", export_line))
    })?;

    let bytes = read_profile(step, profile)?;
    if count_matching(&String::from_utf8_lossy(&bytes), &target, home) > 0 {
        debug!(profile = %profile.display(), "PATH entry already present");
        return Ok(PathEffect::AlreadyPresent);
    }

    let mut addition = String::new();
    if !bytes.is_empty() && bytes.last() != Some(&b'\n') {
        addition.push('\n');
    }
    addition.push_str(export_line);
    addition.push('\n');

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(profile)
        .map_err(|e| SetupError::from_io(step, profile, e))?;
    file.write_all(addition.as_bytes())
        .map_err(|e| SetupError::from_io(step, profile, e))?;

    debug!(profile = %profile.display(), line = export_line, "PATH entry appended");
    Ok(PathEffect::Appended)
}

/// Raw profile bytes; a missing profile reads as empty
///
/// Profiles may hold bytes in any encoding, so callers scan a lossy decoding
/// and rewrite from the raw bytes.
pub fn read_profile(step: Step, profile: &Path) -> Result<Vec<u8>> {
    match fs::metadata(profile) {
        Ok(meta) if meta.is_dir() => {
            return Err(SetupError::conflict(step, profile, "is a directory, expected a shell profile"))
        }
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(SetupError::from_io(step, profile, e)),
    }

    fs::read(profile).map_err(|e| SetupError::from_io(step, profile, e))
}
