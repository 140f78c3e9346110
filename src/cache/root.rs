use crate::utils::hash::hash_path;
use crate::utils::paths::{file_name, join_entry};
use crate::{CACHE_DIR_ENV, COMPILED_SUFFIX, DEFAULT_CACHE_SUBDIR, TEMP_PREFIX};
use std::ffi::OsString;
use std::fmt;

/// Longest sanitised file-name prefix kept in artifact names.
const NAME_PREFIX_LIMIT: usize = 48;

/// Directory holding compiled artifacts.
///
/// Shared by [`crate::cache::CompiledCache`] and
/// [`crate::cache::CachePurger`] so both always agree on where artifacts
/// live and how they are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRoot(String);

impl CacheRoot {
    /// Use `path` verbatim.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Resolve from `WALKCACHE_CACHE_DIR`, falling back to
    /// [`CacheRoot::default_location`].
    #[must_use]
    pub fn resolve() -> Self {
        Self::from_override(std::env::var_os(CACHE_DIR_ENV))
    }

    /// Resolution policy with the environment lookup factored out.
    ///
    /// A set, non-empty value is used verbatim; anything else falls back to
    /// the default location.
    #[must_use]
    pub fn from_override(value: Option<OsString>) -> Self {
        match value {
            Some(dir) if !dir.is_empty() => Self(dir.to_string_lossy().into_owned()),
            _ => Self::default_location(),
        }
    }

    /// `<platform temp dir>/walkcache`.
    #[must_use]
    pub fn default_location() -> Self {
        Self(
            std::env::temp_dir()
                .join(DEFAULT_CACHE_SUBDIR)
                .to_string_lossy()
                .into_owned(),
        )
    }

    /// The root directory path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Artifact path for an absolute source path.
    ///
    /// `<root>/<sanitised file name>-<xxh3-128 of the full source path>.wcache`.
    /// The hash covers the whole path, so sources sharing a file name in
    /// different directories never collide; the name prefix is only there
    /// for humans.
    #[must_use]
    pub fn artifact_path(&self, absolute_source: &str) -> String {
        let name = format!(
            "{}-{}{COMPILED_SUFFIX}",
            sanitize(file_name(absolute_source)),
            hash_path(absolute_source)
        );
        join_entry(&self.0, &name)
    }
}

impl fmt::Display for CacheRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a file name follows the artifact naming convention.
#[must_use]
pub fn is_artifact_name(name: &str) -> bool {
    name.len() > COMPILED_SUFFIX.len() && name.ends_with(COMPILED_SUFFIX)
}

/// Whether a file name is a temporary file left by an interrupted artifact
/// write.
#[must_use]
pub fn is_temp_name(name: &str) -> bool {
    name.len() > TEMP_PREFIX.len() && name.starts_with(TEMP_PREFIX) && !is_artifact_name(name)
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(NAME_PREFIX_LIMIT)
        .collect()
}
