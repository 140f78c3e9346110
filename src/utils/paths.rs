//! String path helpers shared by traversal and the cache.
//!
//! Traversal and cache paths are strings so non-local schemes survive
//! untouched; these helpers only ever treat `/` as the separator.

use crate::error::{Error, Result};
use crate::{PARENT_ENTRY, SELF_ENTRY};

/// Whether `name` is the `.` or `..` listing marker.
#[must_use]
pub fn is_reserved_entry(name: &str) -> bool {
    name == SELF_ENTRY || name == PARENT_ENTRY
}

/// Append an entry name to its container path.
///
/// A container that already ends in `/` (the filesystem root, `mem://`) does
/// not get a second separator.
#[must_use]
pub fn join_entry(container: &str, name: &str) -> String {
    let mut full = String::with_capacity(container.len() + name.len() + 1);
    full.push_str(container);
    if !container.ends_with('/') {
        full.push('/');
    }
    full.push_str(name);
    full
}

/// Whether the path carries a URL-style scheme (`s3://bucket/key`).
#[must_use]
pub fn has_scheme(path: &str) -> bool {
    path.split_once("://").is_some_and(|(scheme, _)| {
        !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// Makes a path absolute, resolving relative local paths from the current
/// directory. Scheme paths and absolute paths are returned unchanged.
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined.
pub fn make_absolute(path: &str) -> Result<String> {
    if has_scheme(path) || std::path::Path::new(path).is_absolute() {
        return Ok(path.to_string());
    }
    let cwd = std::env::current_dir().map_err(|e| Error::from_io(".", e))?;
    Ok(cwd.join(path).to_string_lossy().into_owned())
}

/// Last path component, or the whole path when it has no separator.
#[must_use]
pub fn file_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}
