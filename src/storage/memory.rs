use super::{AccessContext, DirHandle, Storage};
use crate::error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

/// In-memory [`Storage`] for tests and embedded callers.
///
/// Paths are absolute and `/`-separated; `/` always exists. Listings return
/// children in insertion order. Every mutation advances a logical clock by
/// one second, so modification times are strictly ordered and never tie.
///
/// The storage counts handles that were opened but not yet closed through
/// [`DirHandle::close`], and records every `open_dir` call, which makes
/// handle leaks and eager listing observable.
///
/// Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    nodes: BTreeMap<String, Node>,
    clock: u64,
    open_handles: usize,
    listings: Vec<String>,
    dot_entries: bool,
    failing: BTreeSet<String>,
}

#[derive(Debug)]
enum Node {
    Dir {
        children: Vec<String>,
        modified: SystemTime,
    },
    File {
        data: Vec<u8>,
        modified: SystemTime,
    },
}

impl Node {
    const fn modified(&self) -> SystemTime {
        match self {
            Self::Dir { modified, .. } | Self::File { modified, .. } => *modified,
        }
    }
}

/// Split `path` into (parent, name). `None` for `/` and relative names.
fn split_parent(path: &str) -> Option<(&str, &str)> {
    let idx = path.rfind('/')?;
    let name = &path[idx + 1..];
    if name.is_empty() {
        return None;
    }
    let parent = if idx == 0 { "/" } else { &path[..idx] };
    Some((parent, name))
}

fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

impl Inner {
    fn tick(&mut self) -> SystemTime {
        self.clock += 1;
        SystemTime::UNIX_EPOCH + Duration::from_secs(self.clock)
    }

    fn ensure_dir(&mut self, path: &str) -> Result<()> {
        match self.nodes.get(path) {
            Some(Node::Dir { .. }) => return Ok(()),
            Some(Node::File { .. }) => {
                return Err(Error::from_io(
                    path,
                    io::Error::other("a file is in the way of a directory"),
                ));
            }
            None => {}
        }
        if path == "/" {
            let modified = self.tick();
            self.nodes.insert(
                path.to_string(),
                Node::Dir {
                    children: Vec::new(),
                    modified,
                },
            );
            return Ok(());
        }
        if let Some((parent, _)) = split_parent(path) {
            self.ensure_dir(parent)?;
        }
        let modified = self.tick();
        self.link(path);
        self.nodes.insert(
            path.to_string(),
            Node::Dir {
                children: Vec::new(),
                modified,
            },
        );
        Ok(())
    }

    /// Register `path` in its parent's child list.
    fn link(&mut self, path: &str) {
        if let Some((parent, name)) = split_parent(path)
            && let Some(Node::Dir { children, .. }) = self.nodes.get_mut(parent)
            && !children.iter().any(|c| c == name)
        {
            children.push(name.to_string());
        }
    }

    fn unlink(&mut self, path: &str) {
        if let Some((parent, name)) = split_parent(path)
            && let Some(Node::Dir { children, .. }) = self.nodes.get_mut(parent)
        {
            children.retain(|c| c != name);
        }
    }

    fn put_file(&mut self, path: &str, data: Vec<u8>) {
        let modified = self.tick();
        self.link(path);
        self.nodes
            .insert(path.to_string(), Node::File { data, modified });
    }
}

impl MemoryStorage {
    /// Empty storage containing only `/`.
    #[must_use]
    pub fn new() -> Self {
        let storage = Self::default();
        let _ = storage.lock().ensure_dir("/");
        storage
    }

    /// Report `.` and `..` at the start of every listing, the way many
    /// stream-backed listings do.
    #[must_use]
    pub fn with_dot_entries(self, enabled: bool) -> Self {
        self.lock().dot_entries = enabled;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a directory and its parents.
    ///
    /// # Errors
    ///
    /// Returns an error if a file already occupies part of the path.
    pub fn add_dir(&self, path: &str) -> Result<()> {
        self.lock().ensure_dir(normalize(path))
    }

    /// Create or replace a file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if a file already occupies a parent path or a
    /// directory occupies `path`.
    pub fn add_file(&self, path: &str, data: impl Into<Vec<u8>>) -> Result<()> {
        let path = normalize(path);
        let mut inner = self.lock();
        if let Some(Node::Dir { .. }) = inner.nodes.get(path) {
            return Err(Error::from_io(
                path,
                io::Error::other("a directory is in the way of a file"),
            ));
        }
        if let Some((parent, _)) = split_parent(path) {
            inner.ensure_dir(parent)?;
        }
        inner.put_file(path, data.into());
        Ok(())
    }

    /// Overwrite the modification time of an existing node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if nothing exists at `path`.
    pub fn set_modified(&self, path: &str, time: SystemTime) -> Result<()> {
        match self.lock().nodes.get_mut(normalize(path)) {
            Some(Node::Dir { modified, .. } | Node::File { modified, .. }) => {
                *modified = time;
                Ok(())
            }
            None => Err(Error::not_found(path)),
        }
    }

    /// Make every later `open_dir` of `path` fail with an access error.
    pub fn fail_open(&self, path: &str) {
        self.lock().failing.insert(normalize(path).to_string());
    }

    /// Handles opened and not yet closed.
    #[must_use]
    pub fn open_handles(&self) -> usize {
        self.lock().open_handles
    }

    /// Every path passed to `open_dir`, in call order.
    #[must_use]
    pub fn listings(&self) -> Vec<String> {
        self.lock().listings.clone()
    }

    /// Names of the files directly under `path`, in listing order.
    #[must_use]
    pub fn file_names(&self, path: &str) -> Vec<String> {
        let inner = self.lock();
        let path = normalize(path);
        match inner.nodes.get(path) {
            Some(Node::Dir { children, .. }) => children
                .iter()
                .filter(|name| {
                    let full = crate::utils::paths::join_entry(path, name);
                    matches!(inner.nodes.get(&full), Some(Node::File { .. }))
                })
                .cloned()
                .collect(),
            _ => Vec::new(),
        }
    }
}

struct MemoryDirHandle {
    names: std::vec::IntoIter<String>,
    inner: Arc<Mutex<Inner>>,
    closed: bool,
}

impl DirHandle for MemoryDirHandle {
    fn next_name(&mut self) -> Result<Option<String>> {
        if self.closed {
            return Ok(None);
        }
        Ok(self.names.next())
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            inner.open_handles = inner.open_handles.saturating_sub(1);
        }
    }
}

impl Storage for MemoryStorage {
    fn open_dir<'a>(
        &'a self,
        path: &str,
        _context: Option<&AccessContext>,
    ) -> Result<Box<dyn DirHandle + 'a>> {
        let key = normalize(path);
        let mut inner = self.lock();
        inner.listings.push(key.to_string());
        if inner.failing.contains(key) {
            return Err(Error::from_io(
                path,
                io::Error::from(io::ErrorKind::PermissionDenied),
            ));
        }
        let mut names = match inner.nodes.get(key) {
            Some(Node::Dir { children, .. }) => children.clone(),
            Some(Node::File { .. }) => {
                return Err(Error::from_io(path, io::Error::other("not a directory")));
            }
            None => return Err(Error::not_found(path)),
        };
        if inner.dot_entries {
            names.splice(0..0, [".".to_string(), "..".to_string()]);
        }
        inner.open_handles += 1;
        Ok(Box::new(MemoryDirHandle {
            names: names.into_iter(),
            inner: Arc::clone(&self.inner),
            closed: false,
        }))
    }

    fn is_container(&self, path: &str, _context: Option<&AccessContext>) -> bool {
        matches!(self.lock().nodes.get(normalize(path)), Some(Node::Dir { .. }))
    }

    fn exists(&self, path: &str) -> bool {
        self.lock().nodes.contains_key(normalize(path))
    }

    fn read(&self, path: &str) -> Result<Vec<u8>> {
        match self.lock().nodes.get(normalize(path)) {
            Some(Node::File { data, .. }) => Ok(data.clone()),
            Some(Node::Dir { .. }) => Err(Error::from_io(path, io::Error::other("is a directory"))),
            None => Err(Error::not_found(path)),
        }
    }

    fn write_atomic(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let key = normalize(path);
        let mut inner = self.lock();
        let parent_is_dir = split_parent(key)
            .is_some_and(|(parent, _)| matches!(inner.nodes.get(parent), Some(Node::Dir { .. })));
        if !parent_is_dir {
            return Err(Error::not_found(path));
        }
        if matches!(inner.nodes.get(key), Some(Node::Dir { .. })) {
            return Err(Error::from_io(path, io::Error::other("is a directory")));
        }
        inner.put_file(key, bytes.to_vec());
        Ok(())
    }

    fn modified(&self, path: &str) -> Result<Option<SystemTime>> {
        Ok(self.lock().nodes.get(normalize(path)).map(Node::modified))
    }

    fn create_dir_all(&self, path: &str) -> Result<()> {
        self.add_dir(path)
    }

    fn remove_file(&self, path: &str) -> Result<()> {
        let key = normalize(path);
        let mut inner = self.lock();
        let is_file = inner
            .nodes
            .get(key)
            .map(|node| matches!(node, Node::File { .. }));
        match is_file {
            Some(true) => {
                inner.nodes.remove(key);
                inner.unlink(key);
                Ok(())
            }
            Some(false) => Err(Error::from_io(path, io::Error::other("is a directory"))),
            None => Err(Error::not_found(path)),
        }
    }
}
