//! Lazy listing and single-pass recursive traversal.
//!
//! [`list`] opens one container and yields its raw entry names. [`walk`]
//! drives [`list`] once per visited container through an explicit stack of
//! open listings, emitting absolute paths in depth-first pre-order.
//!
//! Neither ever re-lists a container: some listing backends restart a
//! consumed stream mid-read instead of rewinding it, so every container is
//! opened at most once and drained in place.
//!
//! # Examples
//!
//! ```
//! use walkcache::storage::MemoryStorage;
//! use walkcache::walk::walk;
//!
//! # fn main() -> walkcache::Result<()> {
//! let storage = MemoryStorage::new();
//! storage.add_file("/a/x", "1")?;
//! storage.add_file("/a/b/y", "2")?;
//!
//! let paths = walk(&storage, "/a", None)?.collect::<walkcache::Result<Vec<_>>>()?;
//! assert_eq!(paths, vec!["/a/x", "/a/b", "/a/b/y"]);
//! # Ok(())
//! # }
//! ```

mod traversal;

pub use traversal::{Walk, walk};

use crate::error::Result;
use crate::storage::{AccessContext, DirHandle, Storage};
use std::iter::FusedIterator;
use tracing::trace;

/// Raw entry names of one container, in listing order.
///
/// Owns the container's handle and releases it exactly once: when the
/// listing is exhausted, when reading fails, or when the sequence is dropped.
pub struct Entries<'a> {
    container: String,
    handle: Option<Box<dyn DirHandle + 'a>>,
}

impl Entries<'_> {
    /// Container this listing belongs to.
    #[must_use]
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Whether the handle has been released.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.handle.is_none()
    }

    fn release(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.close();
            trace!(container = %self.container, "released listing");
        }
    }
}

impl Iterator for Entries<'_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.handle.as_mut()?;
        match handle.next_name() {
            Ok(Some(name)) => Some(Ok(name)),
            Ok(None) => {
                self.release();
                None
            }
            Err(e) => {
                self.release();
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for Entries<'_> {}

impl Drop for Entries<'_> {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Entries<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entries")
            .field("container", &self.container)
            .field("released", &self.is_released())
            .finish()
    }
}

/// Open `container` and return its raw entry names lazily.
///
/// The open happens now; a missing or inaccessible container is reported
/// from this call rather than from the first `next()`.
///
/// # Errors
///
/// Returns [`crate::Error::NotFound`] or [`crate::Error::Access`] if the
/// storage cannot open the container.
pub fn list<'a, S: Storage + ?Sized>(
    storage: &'a S,
    container: &str,
    context: Option<&AccessContext>,
) -> Result<Entries<'a>> {
    let handle = storage.open_dir(container, context)?;
    Ok(Entries {
        container: container.to_string(),
        handle: Some(handle),
    })
}
