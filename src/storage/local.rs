use super::{AccessContext, DirHandle, Storage};
use crate::error::{Error, Result};
use std::fs::{self, ReadDir};
use std::io::Write;
use std::path::Path;
use std::time::SystemTime;
use crate::TEMP_PREFIX;
use tempfile::Builder;
use tracing::trace;

/// [`Storage`] backed by the local filesystem.
///
/// Accepts plain paths and `file://` URLs. The access context is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage {
    follow_symlinks: bool,
}

impl LocalStorage {
    /// Storage that classifies symlinks as leaves.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            follow_symlinks: false,
        }
    }

    /// Classify symlinks by their target instead of the link itself.
    ///
    /// Off by default; a link pointing at an ancestor would otherwise make
    /// traversal infinite.
    #[must_use]
    pub const fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }
}

fn local_path(path: &str) -> &Path {
    Path::new(path.strip_prefix("file://").unwrap_or(path))
}

/// Open `fs::read_dir` stream; the descriptor is dropped on close.
struct LocalDirHandle {
    path: String,
    inner: Option<ReadDir>,
}

impl DirHandle for LocalDirHandle {
    fn next_name(&mut self) -> Result<Option<String>> {
        let Some(inner) = self.inner.as_mut() else {
            return Ok(None);
        };
        match inner.next() {
            Some(Ok(entry)) => Ok(Some(entry.file_name().to_string_lossy().into_owned())),
            Some(Err(e)) => Err(Error::from_io(self.path.clone(), e)),
            None => Ok(None),
        }
    }

    fn close(&mut self) {
        if self.inner.take().is_some() {
            trace!(path = %self.path, "closed directory handle");
        }
    }
}

impl Storage for LocalStorage {
    fn open_dir<'a>(
        &'a self,
        path: &str,
        _context: Option<&AccessContext>,
    ) -> Result<Box<dyn DirHandle + 'a>> {
        let inner = fs::read_dir(local_path(path)).map_err(|e| Error::from_io(path, e))?;
        trace!(path, "opened directory handle");
        Ok(Box::new(LocalDirHandle {
            path: path.to_string(),
            inner: Some(inner),
        }))
    }

    fn is_container(&self, path: &str, _context: Option<&AccessContext>) -> bool {
        let metadata = if self.follow_symlinks {
            fs::metadata(local_path(path))
        } else {
            fs::symlink_metadata(local_path(path))
        };
        metadata.is_ok_and(|m| m.is_dir())
    }

    fn exists(&self, path: &str) -> bool {
        fs::symlink_metadata(local_path(path)).is_ok()
    }

    fn read(&self, path: &str) -> Result<Vec<u8>> {
        fs::read(local_path(path)).map_err(|e| Error::from_io(path, e))
    }

    fn write_atomic(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let target = local_path(path);
        let parent = target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        // Same directory as the target so the rename never crosses filesystems
        let mut tmp = Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(parent)
            .map_err(|e| Error::from_io(path, e))?;
        tmp.write_all(bytes).map_err(|e| Error::from_io(path, e))?;
        tmp.flush().map_err(|e| Error::from_io(path, e))?;
        tmp.persist(target)
            .map_err(|e| Error::from_io(path, e.error))?;
        Ok(())
    }

    fn modified(&self, path: &str) -> Result<Option<SystemTime>> {
        match fs::metadata(local_path(path)) {
            Ok(metadata) => metadata
                .modified()
                .map(Some)
                .map_err(|e| Error::from_io(path, e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::from_io(path, e)),
        }
    }

    fn create_dir_all(&self, path: &str) -> Result<()> {
        fs::create_dir_all(local_path(path)).map_err(|e| Error::from_io(path, e))
    }

    fn remove_file(&self, path: &str) -> Result<()> {
        fs::remove_file(local_path(path)).map_err(|e| Error::from_io(path, e))
    }
}
