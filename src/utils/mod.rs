//! Utility functions and helpers.
//!
//! # Submodules
//!
//! - [`compress`]: Compression helpers
//! - [`hash`]: Path and content hashing
//! - [`paths`]: String path manipulation
//! - [`serialization`]: Binary serialization
//!
//! # Examples
//!
//! ```
//! use walkcache::utils::{format_size, paths::join_entry};
//!
//! assert_eq!(join_entry("/etc", "hosts"), "/etc/hosts");
//! assert_eq!(format_size(1024 * 1024), "1.00 MB");
//! ```

/// Compression utilities (Zstandard)
pub mod compress;
/// XXH3 hashing helpers
pub mod hash;
/// Path manipulation and resolution utilities
pub mod paths;
/// Binary serialization utilities
pub mod serialization;

/// Formats a file size in bytes into a human-readable string with appropriate units.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size.round() as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
