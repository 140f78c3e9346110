//! Structured-data decoding for source descriptors.
//!
//! The cache treats decoding as a collaborator: anything implementing
//! [`Decoder`] can turn raw descriptor bytes into a [`Value`]. The bundled
//! [`DescriptorDecoder`] picks JSON or TOML from the file extension.

mod formats;
mod value;

pub use formats::{JsonDecoder, TomlDecoder};
pub use value::Value;

use crate::error::{Error, Result};
use crate::utils::paths::file_name;

/// Turns raw descriptor bytes into a [`Value`].
pub trait Decoder {
    /// Decode `bytes`, which were read from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the bytes are malformed, or
    /// [`Error::Unsupported`] if the decoder does not handle `path`.
    fn decode(&self, path: &str, bytes: &[u8]) -> Result<Value>;
}

impl<F> Decoder for F
where
    F: Fn(&str, &[u8]) -> Result<Value>,
{
    fn decode(&self, path: &str, bytes: &[u8]) -> Result<Value> {
        self(path, bytes)
    }
}

/// Chooses a format by file extension: `.json` or `.toml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorDecoder;

impl DescriptorDecoder {
    fn extension(path: &str) -> Option<String> {
        file_name(path)
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
    }
}

impl Decoder for DescriptorDecoder {
    fn decode(&self, path: &str, bytes: &[u8]) -> Result<Value> {
        match Self::extension(path).as_deref() {
            Some("json") => JsonDecoder.decode(path, bytes),
            Some("toml") => TomlDecoder.decode(path, bytes),
            Some(other) => Err(Error::Unsupported(format!(
                "descriptor format '.{other}' ({path})"
            ))),
            None => Err(Error::Unsupported(format!(
                "descriptor without extension ({path})"
            ))),
        }
    }
}
