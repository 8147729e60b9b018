//! BLAKE3 digests for fragment artifact integrity

use blake3::Hasher;

/// Hash prefix for BLAKE3 digests
pub const HASH_PREFIX: &str = "blake3:";

/// Calculate the BLAKE3 digest of an artifact
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    format!("{}{}", HASH_PREFIX, hasher.finalize().to_hex())
}

/// Check an artifact against an expected digest
///
/// The prefix is optional in `expected` and hex comparison ignores case.
pub fn verify_bytes(bytes: &[u8], expected: &str) -> bool {
    let expected = expected.strip_prefix(HASH_PREFIX).unwrap_or(expected);
    let actual = hash_bytes(bytes);
    actual[HASH_PREFIX.len()..].eq_ignore_ascii_case(expected.trim())
}
