use super::root::{CacheRoot, is_artifact_name, is_temp_name};
use crate::error::Result;
use crate::storage::{LocalStorage, Storage};
use crate::utils::paths::{is_reserved_entry, join_entry};
use crate::walk::list;
use tracing::{Level, debug, info, span};

/// Deletes every compiled artifact under a cache root.
///
/// Only files following the artifact naming convention are removed, along
/// with temporary files that interrupted writes left behind. Anything else
/// that happens to live in the root is left alone.
#[derive(Debug, Clone)]
pub struct CachePurger<S = LocalStorage> {
    storage: S,
    root: CacheRoot,
}

impl CachePurger {
    /// Purger for the local cache root resolved from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(LocalStorage::new(), CacheRoot::resolve())
    }
}

impl<S: Storage> CachePurger<S> {
    /// Purger over `storage` for `root`.
    pub const fn new(storage: S, root: CacheRoot) -> Self {
        Self { storage, root }
    }

    /// Root this purger cleans.
    #[must_use]
    pub const fn root(&self) -> &CacheRoot {
        &self.root
    }

    /// Remove all artifacts. Returns the number of artifacts removed;
    /// swept temporary files are not counted.
    ///
    /// A root that does not exist yet is treated as already empty.
    /// Files that disappear between listing and removal are skipped. A write
    /// still in flight in another process loses its temporary file and fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be listed or an artifact cannot
    /// be removed.
    pub fn purge(&self) -> Result<usize> {
        let root = self.root.as_str();
        let span = span!(Level::DEBUG, "cache_purge", root);
        let _guard = span.enter();

        if !self.storage.exists(root) {
            debug!("cache root absent, nothing to purge");
            return Ok(0);
        }

        // Finish listing before mutating the directory
        let doomed = match list(&self.storage, root, None) {
            Ok(entries) => entries
                .filter(|name| {
                    name.as_ref().map_or(true, |n| {
                        !is_reserved_entry(n) && (is_artifact_name(n) || is_temp_name(n))
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            Err(e) if e.is_not_found() => return Ok(0),
            Err(e) => return Err(e),
        };

        let mut removed = 0;
        let mut swept = 0;
        for name in doomed {
            let path = join_entry(root, &name);
            if self.storage.is_container(&path, None) {
                continue;
            }
            match self.storage.remove_file(&path) {
                Ok(()) if is_temp_name(&name) => swept += 1,
                Ok(()) => removed += 1,
                Err(e) if e.is_not_found() => debug!(path = %path, "already gone"),
                Err(e) => return Err(e),
            }
        }

        info!(removed, swept, "purged compiled artifacts");
        Ok(removed)
    }
}
