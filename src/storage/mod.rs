//! Storage-access capability consumed by traversal and the compiled cache.
//!
//! Paths are plain strings so that non-local schemes (`mem://`, `s3://`, ...)
//! pass through untouched; only the storage implementation interprets them.

/// Local filesystem storage
pub mod local;
/// In-memory storage with handle accounting
pub mod memory;

pub use local::LocalStorage;
pub use memory::MemoryStorage;

use crate::error::Result;
use std::collections::BTreeMap;
use std::time::SystemTime;

/// Caller-supplied options passed unchanged to every open operation.
///
/// The library never inspects the options; storage implementations may
/// (credentials, timeouts, listing page sizes, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessContext {
    options: BTreeMap<String, String>,
}

impl AccessContext {
    /// Empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style option setter.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Look up an option by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Whether no options are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// An open listing of one container.
pub trait DirHandle {
    /// Read the next raw entry name, `Ok(None)` at end of listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying listing fails mid-read.
    fn next_name(&mut self) -> Result<Option<String>>;

    /// Release the handle. Called exactly once by [`crate::walk::Entries`].
    fn close(&mut self) {}
}

/// Listing, classification, and file access for one storage backend.
pub trait Storage {
    /// Open `path` for listing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] or [`crate::Error::Access`] if the
    /// container cannot be opened.
    fn open_dir<'a>(
        &'a self,
        path: &str,
        context: Option<&AccessContext>,
    ) -> Result<Box<dyn DirHandle + 'a>>;

    /// Whether `path` names a container that traversal should descend into.
    fn is_container(&self, path: &str, context: Option<&AccessContext>) -> bool;

    /// Whether anything exists at `path`.
    fn exists(&self, path: &str) -> bool;

    /// Read the full contents of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or unreadable.
    fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Replace the file at `path` so that readers observe either the old
    /// contents or the complete new contents, never a partial write.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or published.
    fn write_atomic(&self, path: &str, bytes: &[u8]) -> Result<()>;

    /// Last-modified time of `path`, `Ok(None)` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the path exists but cannot be inspected.
    fn modified(&self, path: &str) -> Result<Option<SystemTime>>;

    /// Create `path` and any missing parents.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    fn create_dir_all(&self, path: &str) -> Result<()>;

    /// Remove the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or cannot be removed.
    fn remove_file(&self, path: &str) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn open_dir<'a>(
        &'a self,
        path: &str,
        context: Option<&AccessContext>,
    ) -> Result<Box<dyn DirHandle + 'a>> {
        (**self).open_dir(path, context)
    }

    fn is_container(&self, path: &str, context: Option<&AccessContext>) -> bool {
        (**self).is_container(path, context)
    }

    fn exists(&self, path: &str) -> bool {
        (**self).exists(path)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>> {
        (**self).read(path)
    }

    fn write_atomic(&self, path: &str, bytes: &[u8]) -> Result<()> {
        (**self).write_atomic(path, bytes)
    }

    fn modified(&self, path: &str) -> Result<Option<SystemTime>> {
        (**self).modified(path)
    }

    fn create_dir_all(&self, path: &str) -> Result<()> {
        (**self).create_dir_all(path)
    }

    fn remove_file(&self, path: &str) -> Result<()> {
        (**self).remove_file(path)
    }
}
