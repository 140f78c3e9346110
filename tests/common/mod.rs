#![allow(dead_code)]

use anyhow::Result;
use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;
use walkcache::cache::{CacheRoot, CompiledCache};

/// Scratch tree plus a private cache root
pub struct TestTree {
    pub temp_dir: TempDir,
}

impl TestTree {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        fs::create_dir_all(temp_dir.path().join("tree"))?;
        Ok(Self { temp_dir })
    }

    /// Root of the scratch tree
    pub fn root(&self) -> PathBuf {
        self.temp_dir.path().join("tree")
    }

    pub fn root_str(&self) -> String {
        self.root().to_string_lossy().into_owned()
    }

    /// Cache root, not created until the first artifact is written
    pub fn cache_root(&self) -> CacheRoot {
        CacheRoot::new(self.temp_dir.path().join("cache").to_string_lossy())
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.temp_dir.path().join("cache")
    }

    pub fn cache(&self) -> CompiledCache {
        CompiledCache::new(
            walkcache::storage::LocalStorage::new(),
            walkcache::decode::DescriptorDecoder,
            self.cache_root(),
        )
    }

    pub fn write(&self, relative: &str, content: &str) -> Result<String> {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path.to_string_lossy().into_owned())
    }

    pub fn mkdir(&self, relative: &str) -> Result<String> {
        let path = self.root().join(relative);
        fs::create_dir_all(&path)?;
        Ok(path.to_string_lossy().into_owned())
    }

    pub fn artifact_names(&self) -> Vec<String> {
        fs::read_dir(self.cache_dir()).map_or_else(
            |_| Vec::new(),
            |entries| {
                entries
                    .filter_map(std::result::Result::ok)
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            },
        )
    }
}

/// Shift a file's mtime by `offset` into the past
pub fn age_file(path: impl AsRef<Path>, offset: Duration) -> Result<()> {
    let then = SystemTime::now() - offset;
    filetime::set_file_mtime(path, FileTime::from_system_time(then))?;
    Ok(())
}

/// Set a file's mtime to an exact instant
pub fn set_mtime(path: impl AsRef<Path>, time: SystemTime) -> Result<()> {
    filetime::set_file_mtime(path, FileTime::from_system_time(time))?;
    Ok(())
}
