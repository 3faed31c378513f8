//! Path parsing and resolution helpers
//!
//! Repository paths are slash-separated, relative to the web URL of a drive and
//! carry no leading or trailing slash. They compare case-insensitively but keep
//! their original case for display.
//!
//! Drive paths used at the command line have the format: drive[/path]

use crate::error::{Error, Result};

/// Path segment that stands for "any child" in existence checks
pub const WILDCARD: &str = "*";

/// Normalize a path coming from the outside
///
/// Backslashes become slashes and leading/trailing slashes and spaces are trimmed.
pub fn normalize_path(path: &str) -> String {
    path.trim()
        .replace('\\', "/")
        .trim_matches(|c| c == '/' || c == ' ')
        .to_string()
}

/// Join a child path onto a root, adding a single separating slash when needed
pub fn join_path(root: &str, child: &str) -> String {
    let root = root.trim().trim_end_matches('/');
    let child = child.trim().trim_start_matches('/');
    match (root.is_empty(), child.is_empty()) {
        (true, _) => child.to_string(),
        (false, true) => root.to_string(),
        (false, false) => format!("{root}/{child}"),
    }
}

/// Split a path into its non-empty, trimmed segments
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

/// Get the parent part of a path (empty when there is no slash)
pub fn parent_path(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) if pos > 0 => &path[..pos],
        _ => "",
    }
}

/// Get the last segment of a path
pub fn child_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

fn chars_eq_ci(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Compare two strings case-insensitively
pub fn eq_ci(a: &str, b: &str) -> bool {
    let mut left = a.chars();
    let mut right = b.chars();
    loop {
        match (left.next(), right.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) if chars_eq_ci(x, y) => {}
            _ => return false,
        }
    }
}

/// Strip a prefix case-insensitively, returning the remainder
pub fn strip_prefix_ci<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let mut chars = value.chars();
    for expected in prefix.chars() {
        match chars.next() {
            Some(actual) if chars_eq_ci(actual, expected) => {}
            _ => return None,
        }
    }
    Some(chars.as_str())
}

/// Check a prefix case-insensitively
pub fn starts_with_ci(value: &str, prefix: &str) -> bool {
    strip_prefix_ci(value, prefix).is_some()
}

/// Check whether `path` equals `ancestor` or lies below it
pub fn is_within_ci(path: &str, ancestor: &str) -> bool {
    if ancestor.is_empty() {
        return true;
    }
    match strip_prefix_ci(path, ancestor) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Key under which a path is stored in case-insensitive maps
pub fn cache_key(path: &str) -> String {
    path.to_lowercase()
}

/// A parsed path pointing into a configured drive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrivePath {
    /// Drive name
    pub drive: String,
    /// Path below the drive root (empty for the drive root itself)
    pub path: String,
}

impl DrivePath {
    /// Create a new DrivePath
    pub fn new(drive: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            drive: drive.into(),
            path: normalize_path(&path.into()),
        }
    }

    /// Get the parent path (one level up)
    pub fn parent(&self) -> Option<Self> {
        if self.path.is_empty() {
            None
        } else {
            Some(Self {
                drive: self.drive.clone(),
                path: parent_path(&self.path).to_string(),
            })
        }
    }

    /// Get the last path segment (empty at the drive root)
    pub fn name(&self) -> &str {
        child_name(&self.path)
    }

    /// Join a child path component
    pub fn join(&self, child: &str) -> Self {
        Self {
            drive: self.drive.clone(),
            path: join_path(&self.path, &normalize_path(child)),
        }
    }
}

impl std::fmt::Display for DrivePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}/", self.drive)
        } else {
            write!(f, "{}/{}", self.drive, self.path)
        }
    }
}

/// Parse a path string into a DrivePath
///
/// The first segment names the drive; the rest is the path below its root.
pub fn parse_drive_path(path: &str) -> Result<DrivePath> {
    let normalized = normalize_path(path);
    if normalized.is_empty() {
        return Err(Error::InvalidPath("Path cannot be empty".into()));
    }

    let (drive, rest) = match normalized.split_once('/') {
        Some((drive, rest)) => (drive, rest),
        None => (normalized.as_str(), ""),
    };

    if !is_valid_drive_name(drive) {
        return Err(Error::InvalidPath(format!(
            "Invalid drive name '{drive}'. Use format: drive[/path]"
        )));
    }

    Ok(DrivePath::new(drive, rest))
}

/// Check if a string is a valid drive name
pub fn is_valid_drive_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
