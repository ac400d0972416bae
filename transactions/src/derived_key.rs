//! Derived-key authorization metadata.

use plaza_types::{PublicKey, Signature};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorizeDerivedKeyOperation {
    Revoke,
    Authorize,
}

/// Authorizes or revokes a derived key for the transactor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizeDerivedKeyMetadata {
    pub derived_public_key: PublicKey,

    /// First block height at which the key is no longer valid.
    pub expiration_block: u64,

    pub operation: AuthorizeDerivedKeyOperation,

    /// The owner's signature over sha256d(derived key ‖ uvarint(expiration)),
    /// proving the owner sanctioned this authorization even when the
    /// transaction itself is signed by the derived key.
    pub access_signature: Signature,
}

impl AuthorizeDerivedKeyMetadata {
    /// The digest the access signature commits to.
    pub fn access_digest(derived_public_key: &PublicKey, expiration_block: u64) -> [u8; 32] {
        let mut payload = Vec::with_capacity(43);
        payload.extend_from_slice(derived_public_key.as_bytes());
        plaza_types::wire::write_uvarint(&mut payload, expiration_block);
        plaza_crypto::sha256d(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_digest_binds_key_and_expiration() {
        let key_a = PublicKey::new([1u8; 33]);
        let key_b = PublicKey::new([2u8; 33]);
        assert_ne!(
            AuthorizeDerivedKeyMetadata::access_digest(&key_a, 10),
            AuthorizeDerivedKeyMetadata::access_digest(&key_b, 10),
        );
        assert_ne!(
            AuthorizeDerivedKeyMetadata::access_digest(&key_a, 10),
            AuthorizeDerivedKeyMetadata::access_digest(&key_a, 11),
        );
    }
}
