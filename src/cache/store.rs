use super::codec::ArtifactCodec;
use super::purge::CachePurger;
use super::root::CacheRoot;
use crate::decode::{Decoder, DescriptorDecoder, Value};
use crate::error::{Error, Result};
use crate::storage::{LocalStorage, Storage};
use crate::utils::paths::make_absolute;
use std::time::SystemTime;
use tracing::{Level, debug, info, span, warn};

/// Where a loaded value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Read from a fresh compiled artifact
    Artifact,
    /// Decoded from the source and written to a new artifact
    Compiled,
}

/// A loaded value together with its [`Origin`].
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    /// Decoded descriptor
    pub value: Value,
    /// Artifact hit or recompilation
    pub origin: Origin,
}

/// State of a source's artifact, as seen by the freshness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// No artifact exists
    Missing,
    /// Artifact exists but is older than the source
    Stale {
        /// Artifact path
        artifact: String,
    },
    /// Artifact exists and is at least as new as the source
    Fresh {
        /// Artifact path
        artifact: String,
        /// Artifact modification time
        modified: SystemTime,
    },
}

/// Compiled descriptor cache.
///
/// `load` returns a source's decoded value. The first load, and any load
/// after the source changed, decodes the source and publishes a compiled
/// artifact under the cache root; later loads read the artifact directly.
///
/// The store keeps no per-source state in memory: every `load` re-runs the
/// freshness check against storage. Construct one store and pass it to
/// whoever needs it.
///
/// Freshness compares modification times (`artifact >= source`), so two
/// edits within one timestamp tick of the filesystem can go unnoticed.
#[derive(Debug, Clone)]
pub struct CompiledCache<S = LocalStorage, D = DescriptorDecoder> {
    storage: S,
    decoder: D,
    root: CacheRoot,
    codec: ArtifactCodec,
}

impl CompiledCache {
    /// Local-filesystem store with the root resolved from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(LocalStorage::new(), DescriptorDecoder, CacheRoot::resolve())
    }
}

impl<S: Storage, D: Decoder> CompiledCache<S, D> {
    /// Store over `storage`, decoding sources with `decoder`, writing
    /// artifacts under `root`.
    pub fn new(storage: S, decoder: D, root: CacheRoot) -> Self {
        Self {
            storage,
            decoder,
            root,
            codec: ArtifactCodec::default(),
        }
    }

    /// Compress new artifacts at `level`.
    #[must_use]
    pub fn with_compression_level(mut self, level: i32) -> Self {
        self.codec = ArtifactCodec::new(level);
        self
    }

    /// Cache root this store writes to.
    #[must_use]
    pub const fn root(&self) -> &CacheRoot {
        &self.root
    }

    /// Underlying storage.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Artifact path for `source` (relative local paths are made absolute).
    ///
    /// # Errors
    ///
    /// Returns an error if a relative path cannot be resolved.
    pub fn artifact_path(&self, source: &str) -> Result<String> {
        Ok(self.root.artifact_path(&make_absolute(source)?))
    }

    /// Decoded value of `source`.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the source does not exist, even when an
    ///   artifact for it is still present
    /// - [`Error::Decode`] if the source is malformed
    /// - [`Error::Unsupported`] if the decoder does not handle the source
    /// - [`Error::Access`] if the cache root or artifact cannot be written
    pub fn load(&self, source: &str) -> Result<Value> {
        self.load_traced(source).map(|loaded| loaded.value)
    }

    /// Like [`CompiledCache::load`], also reporting where the value came from.
    ///
    /// # Errors
    ///
    /// Same as [`CompiledCache::load`].
    pub fn load_traced(&self, source: &str) -> Result<Loaded> {
        let source = make_absolute(source)?;
        let span = span!(Level::DEBUG, "cache_load", source = %source);
        let _guard = span.enter();

        let source_modified = self
            .storage
            .modified(&source)?
            .ok_or_else(|| Error::not_found(&source))?;

        if let Freshness::Fresh { artifact, .. } = self.freshness(&source, source_modified)? {
            match self
                .storage
                .read(&artifact)
                .and_then(|bytes| self.codec.decode(&artifact, &bytes))
            {
                Ok(value) => {
                    debug!(artifact = %artifact, "artifact hit");
                    return Ok(Loaded {
                        value,
                        origin: Origin::Artifact,
                    });
                }
                // Removed by a concurrent purge or unreadable: recompile
                Err(e) => warn!(artifact = %artifact, error = %e, "discarding artifact"),
            }
        }

        let value = self.compile(&source, source_modified)?;
        Ok(Loaded {
            value,
            origin: Origin::Compiled,
        })
    }

    /// Freshness of `source`'s artifact without loading anything.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the source does not exist.
    pub fn status(&self, source: &str) -> Result<Freshness> {
        let source = make_absolute(source)?;
        let source_modified = self
            .storage
            .modified(&source)?
            .ok_or_else(|| Error::not_found(&source))?;
        self.freshness(&source, source_modified)
    }

    /// Remove the artifact of one source. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact exists but cannot be removed.
    pub fn invalidate(&self, source: &str) -> Result<bool> {
        let artifact = self.artifact_path(source)?;
        match self.storage.remove_file(&artifact) {
            Ok(()) => {
                info!(artifact = %artifact, "invalidated artifact");
                Ok(true)
            }
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Purger sharing this store's storage and root.
    #[must_use]
    pub fn purger(&self) -> CachePurger<&S> {
        CachePurger::new(&self.storage, self.root.clone())
    }

    /// Remove every artifact under the root. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// See [`CachePurger::purge`].
    pub fn purge(&self) -> Result<usize> {
        self.purger().purge()
    }

    fn freshness(&self, source: &str, source_modified: SystemTime) -> Result<Freshness> {
        let artifact = self.root.artifact_path(source);
        Ok(match self.storage.modified(&artifact)? {
            None => Freshness::Missing,
            Some(modified) if modified >= source_modified => Freshness::Fresh { artifact, modified },
            Some(_) => Freshness::Stale { artifact },
        })
    }

    /// Decode `source` and publish its artifact.
    ///
    /// `source_modified` is the timestamp observed before reading. If the
    /// source changed while it was being compiled, the new artifact would
    /// look fresh for content it does not hold, so it is withdrawn again and
    /// the next load recompiles.
    fn compile(&self, source: &str, source_modified: SystemTime) -> Result<Value> {
        let raw = self.storage.read(source)?;
        let value = self.decoder.decode(source, &raw)?;

        let artifact = self.root.artifact_path(source);
        self.storage.create_dir_all(self.root.as_str())?;
        let bytes = self.codec.encode(&artifact, &value)?;
        self.storage.write_atomic(&artifact, &bytes)?;

        if self.storage.modified(source)? != Some(source_modified) {
            debug!(artifact = %artifact, "source changed during compile, withdrawing artifact");
            match self.storage.remove_file(&artifact) {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }
            return Ok(value);
        }

        info!(
            artifact = %artifact,
            source_bytes = raw.len(),
            artifact_bytes = bytes.len(),
            "compiled descriptor"
        );
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::cell::Cell;
    use std::time::Duration;

    fn store(storage: &MemoryStorage) -> CompiledCache<MemoryStorage> {
        CompiledCache::new(storage.clone(), DescriptorDecoder, CacheRoot::new("/cache"))
    }

    #[test]
    fn test_first_load_compiles_second_hits() {
        let storage = MemoryStorage::new();
        storage.add_file("/etc/cfg.json", r#"{"k":"v"}"#).unwrap();
        let cache = store(&storage);

        let first = cache.load_traced("/etc/cfg.json").unwrap();
        let second = cache.load_traced("/etc/cfg.json").unwrap();

        assert_eq!(first.origin, Origin::Compiled);
        assert_eq!(second.origin, Origin::Artifact);
        assert_eq!(first.value, second.value);
        assert_eq!(first.value.get("k").and_then(Value::as_str), Some("v"));
    }

    #[test]
    fn test_second_load_skips_decoder() {
        let storage = MemoryStorage::new();
        storage.add_file("/etc/cfg.json", r#"{"k":"v"}"#).unwrap();
        let calls = Cell::new(0);
        let counting = |path: &str, bytes: &[u8]| -> Result<Value> {
            calls.set(calls.get() + 1);
            DescriptorDecoder.decode(path, bytes)
        };
        let cache = CompiledCache::new(storage.clone(), counting, CacheRoot::new("/cache"));

        cache.load("/etc/cfg.json").unwrap();
        cache.load("/etc/cfg.json").unwrap();

        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_root_created_on_first_write() {
        let storage = MemoryStorage::new();
        storage.add_file("/src/a.toml", "x = 1").unwrap();
        let cache = CompiledCache::new(
            storage.clone(),
            DescriptorDecoder,
            CacheRoot::new("/var/tmp/nested/cache"),
        );
        assert!(!storage.exists("/var/tmp/nested/cache"));

        cache.load("/src/a.toml").unwrap();

        assert!(storage.is_container("/var/tmp/nested/cache", None));
        assert_eq!(storage.file_names("/var/tmp/nested/cache").len(), 1);
    }

    #[test]
    fn test_newer_source_recompiles() {
        let storage = MemoryStorage::new();
        storage.add_file("/etc/cfg.json", r#"{"k":"v"}"#).unwrap();
        let cache = store(&storage);
        cache.load("/etc/cfg.json").unwrap();

        storage.add_file("/etc/cfg.json", r#"{"k":"w"}"#).unwrap();
        assert!(matches!(
            cache.status("/etc/cfg.json").unwrap(),
            Freshness::Stale { .. }
        ));

        let loaded = cache.load_traced("/etc/cfg.json").unwrap();
        assert_eq!(loaded.origin, Origin::Compiled);
        assert_eq!(loaded.value.get("k").and_then(Value::as_str), Some("w"));

        let artifact = cache.artifact_path("/etc/cfg.json").unwrap();
        let artifact_time = storage.modified(&artifact).unwrap().unwrap();
        let source_time = storage.modified("/etc/cfg.json").unwrap().unwrap();
        assert!(artifact_time >= source_time);
    }

    #[test]
    fn test_equal_timestamps_count_as_fresh() {
        let storage = MemoryStorage::new();
        storage.add_file("/etc/cfg.json", "{}").unwrap();
        let cache = store(&storage);
        cache.load("/etc/cfg.json").unwrap();

        let artifact = cache.artifact_path("/etc/cfg.json").unwrap();
        let same = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        storage.set_modified(&artifact, same).unwrap();
        storage.set_modified("/etc/cfg.json", same).unwrap();

        assert_eq!(cache.load_traced("/etc/cfg.json").unwrap().origin, Origin::Artifact);
    }

    #[test]
    fn test_missing_source_never_served_from_artifact() {
        let storage = MemoryStorage::new();
        storage.add_file("/etc/cfg.json", r#"{"k":"v"}"#).unwrap();
        let cache = store(&storage);
        cache.load("/etc/cfg.json").unwrap();

        storage.remove_file("/etc/cfg.json").unwrap();

        assert!(cache.load("/etc/cfg.json").unwrap_err().is_not_found());
    }

    #[test]
    fn test_malformed_source_is_decode_error_and_writes_nothing() {
        let storage = MemoryStorage::new();
        storage.add_file("/etc/bad.json", "{").unwrap();
        let cache = store(&storage);

        let err = cache.load("/etc/bad.json").unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
        assert!(storage.file_names("/cache").is_empty());
    }

    #[test]
    fn test_corrupt_artifact_is_recompiled() {
        let storage = MemoryStorage::new();
        storage.add_file("/etc/cfg.json", r#"{"k":"v"}"#).unwrap();
        let cache = store(&storage);
        cache.load("/etc/cfg.json").unwrap();

        let artifact = cache.artifact_path("/etc/cfg.json").unwrap();
        storage.add_file(&artifact, "garbage").unwrap();

        let loaded = cache.load_traced("/etc/cfg.json").unwrap();
        assert_eq!(loaded.origin, Origin::Compiled);
        assert_eq!(loaded.value.get("k").and_then(Value::as_str), Some("v"));
    }

    #[test]
    fn test_invalidate_single_source() {
        let storage = MemoryStorage::new();
        storage.add_file("/etc/a.json", "{}").unwrap();
        storage.add_file("/etc/b.json", "{}").unwrap();
        let cache = store(&storage);
        cache.load("/etc/a.json").unwrap();
        cache.load("/etc/b.json").unwrap();

        assert!(cache.invalidate("/etc/a.json").unwrap());
        assert!(!cache.invalidate("/etc/a.json").unwrap());

        assert_eq!(cache.status("/etc/a.json").unwrap(), Freshness::Missing);
        assert!(matches!(
            cache.status("/etc/b.json").unwrap(),
            Freshness::Fresh { .. }
        ));
    }

    #[test]
    fn test_purge_forces_recompile() {
        let storage = MemoryStorage::new();
        storage.add_file("/etc/cfg.json", "{}").unwrap();
        let cache = store(&storage);
        cache.load("/etc/cfg.json").unwrap();

        assert_eq!(cache.purge().unwrap(), 1);
        assert_eq!(
            cache.load_traced("/etc/cfg.json").unwrap().origin,
            Origin::Compiled
        );
    }

    #[test]
    fn test_edit_during_compile_is_not_served_from_artifact() {
        let storage = MemoryStorage::new();
        storage.add_file("/etc/cfg.json", r#"{"k":"v"}"#).unwrap();
        let editor = storage.clone();
        let calls = Cell::new(0);
        let editing = |path: &str, bytes: &[u8]| -> Result<Value> {
            calls.set(calls.get() + 1);
            if calls.get() == 1 {
                editor.add_file("/etc/cfg.json", r#"{"k":"w"}"#)?;
            }
            DescriptorDecoder.decode(path, bytes)
        };
        let cache = CompiledCache::new(storage.clone(), editing, CacheRoot::new("/cache"));

        let first = cache.load_traced("/etc/cfg.json").unwrap();
        assert_eq!(first.value.get("k").and_then(Value::as_str), Some("v"));
        assert_eq!(cache.status("/etc/cfg.json").unwrap(), Freshness::Missing);

        let second = cache.load_traced("/etc/cfg.json").unwrap();
        assert_eq!(second.origin, Origin::Compiled);
        assert_eq!(second.value.get("k").and_then(Value::as_str), Some("w"));

        let third = cache.load_traced("/etc/cfg.json").unwrap();
        assert_eq!(third.origin, Origin::Artifact);
        assert_eq!(calls.get(), 2);
    }
}
