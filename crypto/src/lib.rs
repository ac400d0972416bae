//! Cryptographic primitives for the Plaza ledger.
//!
//! - **secp256k1 ECDSA** for transaction signing and verification, with
//!   compressed 33-byte public keys and 64-byte compact signatures
//! - **Double SHA-256** for transaction digests and block hashes

pub mod hash;
pub mod keys;
pub mod sign;

pub use hash::{sha256, sha256d};
pub use keys::{
    generate_keypair, is_valid_public_key, keypair_from_seed, public_from_secret, KeyPair,
};
pub use sign::{sign_digest, verify_signature};
