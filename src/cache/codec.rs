use crate::decode::Value;
use crate::error::{Error, Result};
use crate::utils::{compress, serialization};

/// Leading bytes of every artifact: format tag plus layout version.
const MAGIC: &[u8; 4] = b"WCC\x01";

/// Default zstd level for artifacts.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Compiled artifact format: magic header, then zstd-compressed bincode.
///
/// The layout is private to the cache; bumping the header version byte
/// makes older artifacts fail to load, which the store treats as
/// stale and recompiles.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactCodec {
    level: i32,
}

impl Default for ArtifactCodec {
    fn default() -> Self {
        Self::new(DEFAULT_COMPRESSION_LEVEL)
    }
}

impl ArtifactCodec {
    /// Codec compressing at `level` (1-22).
    #[must_use]
    pub const fn new(level: i32) -> Self {
        Self { level }
    }

    /// Configured compression level.
    #[must_use]
    pub const fn level(&self) -> i32 {
        self.level
    }

    /// Encode `value` for the artifact at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] naming `path` if serialization or
    /// compression fails.
    pub fn encode(&self, path: &str, value: &Value) -> Result<Vec<u8>> {
        let raw = serialization::serialize(value).map_err(|e| Error::decode(path, e))?;
        let packed = compress::compress_bytes(&raw, self.level).map_err(|e| Error::decode(path, e))?;

        let mut out = Vec::with_capacity(MAGIC.len() + packed.len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&packed);
        Ok(out)
    }

    /// Load an artifact read from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the header is wrong or the payload is
    /// corrupt or truncated.
    pub fn decode(&self, path: &str, bytes: &[u8]) -> Result<Value> {
        let payload = bytes
            .strip_prefix(MAGIC.as_slice())
            .ok_or_else(|| Error::decode(path, "not a compiled artifact (bad header)"))?;
        let raw = compress::decompress_bytes(payload).map_err(|e| Error::decode(path, e))?;
        serialization::deserialize(&raw).map_err(|e| Error::decode(path, e))
    }
}
