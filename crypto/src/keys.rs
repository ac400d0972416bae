//! Key generation and derivation.

use crate::hash::sha256;
use plaza_types::{PublicKey, SecretKeyBytes};
use secp256k1::{SecretKey, SECP256K1};

/// A secp256k1 key pair (compressed public key + secret scalar).
pub struct KeyPair {
    pub public: PublicKey,
    pub secret: SecretKeyBytes,
}

/// Generate a random key pair.
pub fn generate_keypair() -> KeyPair {
    let secret_key = SecretKey::new(&mut rand::thread_rng());
    keypair_from_secret(secret_key)
}

/// Derive a key pair deterministically from arbitrary seed bytes.
///
/// The seed is hashed and re-hashed until the digest is a valid scalar, so
/// any input (including all zeros) produces a key pair.
pub fn keypair_from_seed(seed: &[u8]) -> KeyPair {
    let mut digest = sha256(seed);
    loop {
        if let Ok(secret_key) = SecretKey::from_slice(&digest) {
            return keypair_from_secret(secret_key);
        }
        digest = sha256(&digest);
    }
}

/// Whether 33 bytes are a parseable compressed curve point.
pub fn is_valid_public_key(public_key: &PublicKey) -> bool {
    secp256k1::PublicKey::from_slice(public_key.as_bytes()).is_ok()
}

/// The compressed public key for a secret scalar, if the scalar is valid.
pub fn public_from_secret(secret: &SecretKeyBytes) -> Option<PublicKey> {
    let secret_key = SecretKey::from_slice(&secret.0).ok()?;
    Some(PublicKey::new(
        secret_key.public_key(SECP256K1).serialize(),
    ))
}

fn keypair_from_secret(secret_key: SecretKey) -> KeyPair {
    let public = PublicKey::new(secret_key.public_key(SECP256K1).serialize());
    KeyPair {
        public,
        secret: SecretKeyBytes(secret_key.secret_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_derivation_is_deterministic() {
        let a = keypair_from_seed(b"seed");
        let b = keypair_from_seed(b"seed");
        assert_eq!(a.public, b.public);
        assert_eq!(a.secret.0, b.secret.0);
    }

    #[test]
    fn zero_seed_still_produces_keypair() {
        let kp = keypair_from_seed(&[0u8; 32]);
        assert!(!kp.public.is_zero());
    }

    #[test]
    fn different_seeds_differ() {
        assert_ne!(
            keypair_from_seed(b"one").public,
            keypair_from_seed(b"two").public
        );
    }

    #[test]
    fn public_from_secret_matches() {
        let kp = generate_keypair();
        assert_eq!(public_from_secret(&kp.secret), Some(kp.public));
    }
}
