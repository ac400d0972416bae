//! ECDSA signing and verification over 32-byte digests.

use plaza_types::{PublicKey, SecretKeyBytes, Signature};
use secp256k1::ecdsa;
use secp256k1::{Message, SecretKey, SECP256K1};

/// Sign a 32-byte digest, returning a compact signature. Signing is
/// deterministic (RFC 6979).
///
/// Returns `None` if the secret bytes are not a valid scalar.
pub fn sign_digest(digest: &[u8; 32], secret: &SecretKeyBytes) -> Option<Signature> {
    let secret_key = SecretKey::from_slice(&secret.0).ok()?;
    let message = Message::from_digest(*digest);
    let signature = SECP256K1.sign_ecdsa(&message, &secret_key);
    Some(Signature(signature.serialize_compact()))
}

/// Verify a compact signature over a 32-byte digest.
///
/// Returns `false` for malformed keys or signatures rather than erroring;
/// the caller maps failure to a consensus rule error.
pub fn verify_signature(digest: &[u8; 32], signature: &Signature, public_key: &PublicKey) -> bool {
    let Ok(key) = secp256k1::PublicKey::from_slice(public_key.as_bytes()) else {
        return false;
    };
    let Ok(sig) = ecdsa::Signature::from_compact(signature.as_bytes()) else {
        return false;
    };
    let message = Message::from_digest(*digest);
    SECP256K1.verify_ecdsa(&message, &sig, &key).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256d;
    use crate::keys::{generate_keypair, keypair_from_seed};

    #[test]
    fn sign_and_verify() {
        let kp = generate_keypair();
        let digest = sha256d(b"a transaction");
        let sig = sign_digest(&digest, &kp.secret).unwrap();
        assert!(verify_signature(&digest, &sig, &kp.public));
    }

    #[test]
    fn wrong_digest_fails() {
        let kp = generate_keypair();
        let sig = sign_digest(&sha256d(b"right"), &kp.secret).unwrap();
        assert!(!verify_signature(&sha256d(b"wrong"), &sig, &kp.public));
    }

    #[test]
    fn wrong_key_fails() {
        let kp1 = generate_keypair();
        let kp2 = generate_keypair();
        let digest = sha256d(b"msg");
        let sig = sign_digest(&digest, &kp1.secret).unwrap();
        assert!(!verify_signature(&digest, &sig, &kp2.public));
    }

    #[test]
    fn signing_is_deterministic() {
        let kp = keypair_from_seed(b"rfc6979");
        let digest = sha256d(b"msg");
        let sig1 = sign_digest(&digest, &kp.secret).unwrap();
        let sig2 = sign_digest(&digest, &kp.secret).unwrap();
        assert_eq!(sig1.as_bytes(), sig2.as_bytes());
    }

    #[test]
    fn garbage_key_rejected() {
        let kp = generate_keypair();
        let digest = sha256d(b"msg");
        let sig = sign_digest(&digest, &kp.secret).unwrap();
        assert!(!verify_signature(&digest, &sig, &PublicKey::new([0xFF; 33])));
    }
}
