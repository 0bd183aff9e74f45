//! Stable identifiers derived with SHA-256.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 digest of `input`
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Id of a module discovered at recursion `depth` under `name`.
///
/// Two sibling communities that infer the same name get the same id.
pub fn module_id(depth: usize, name: &str) -> String {
    sha256_hex(&format!("{depth}-{name}"))
}
