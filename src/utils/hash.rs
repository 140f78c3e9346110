use xxhash_rust::xxh3::xxh3_128;

/// Computes the XXH3 128-bit hash of raw bytes as 32 lowercase hex chars.
#[must_use]
pub fn hash_bytes(data: &[u8]) -> String {
    let hash = xxh3_128(data);
    format!("{hash:032x}")
}

/// Hash of a full path string, used to name derived files.
#[must_use]
pub fn hash_path(path: &str) -> String {
    hash_bytes(path.as_bytes())
}
