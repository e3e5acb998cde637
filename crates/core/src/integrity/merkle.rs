//! SHA-256 digests and the sorted Merkle reduction over line hashes.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of the UTF-8 bytes of `data`.
#[must_use]
pub fn sha256_hex(data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Reduces leaf hashes to a single root.
///
/// Leaves are sorted first so the root does not depend on their order. Each
/// level pairs neighbours and hashes the concatenated hex text; a trailing
/// unpaired hash is paired with itself. No leaves gives `SHA256("")`.
#[must_use]
pub fn merkle_root(mut leaves: Vec<String>) -> String {
    if leaves.is_empty() {
        return sha256_hex("");
    }
    leaves.sort_unstable();

    let mut level = leaves;
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let left = &pair[0];
                let right = pair.get(1).unwrap_or(left);
                sha256_hex(&format!("{left}{right}"))
            })
            .collect();
    }

    level.swap_remove(0)
}
