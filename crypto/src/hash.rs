//! SHA-256 hashing for transactions and blocks.

use sha2::{Digest, Sha256};

/// Compute a single SHA-256 hash.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute a double SHA-256 hash. Transaction digests are the double hash
/// of the canonical serialization with the signature field cleared.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_deterministic() {
        assert_eq!(sha256(b"plaza"), sha256(b"plaza"));
        assert_ne!(sha256(b"plaza"), sha256(b"plazb"));
    }

    #[test]
    fn sha256d_is_double_hash() {
        let once = sha256(b"data");
        assert_eq!(sha256d(b"data"), sha256(&once));
    }
}
