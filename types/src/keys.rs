//! Key types: compressed public keys, signatures, and stable identifiers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of a compressed secp256k1 public key in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 33;

/// A 33-byte compressed secp256k1 public key.
///
/// The all-zero key is reserved for block-reward transactions, which carry
/// no transactor key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublicKey(pub [u8; PUBLIC_KEY_LENGTH]);

impl PublicKey {
    pub const ZERO: Self = Self([0u8; PUBLIC_KEY_LENGTH]);

    pub fn new(bytes: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parse a public key from a byte slice, requiring the exact length.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; PUBLIC_KEY_LENGTH] = bytes.try_into().ok()?;
        Some(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; PUBLIC_KEY_LENGTH]
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}…)", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// A stable 33-byte account identifier.
///
/// Identical to the account's public key at creation and decoupled from it
/// thereafter: `SwapIdentity` rebinds keys while every PKID-keyed ledger
/// (profiles, coin balances, NFT ownership) is untouched. Identifiers are
/// never reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pkid(pub [u8; PUBLIC_KEY_LENGTH]);

impl Pkid {
    pub fn new(bytes: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// The PKID minted for a key seen for the first time.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Self(public_key.0)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.0
    }
}

impl fmt::Debug for Pkid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pkid({}…)", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for Pkid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// A 64-byte compact ECDSA signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    pub const ZERO: Self = Self([0u8; 64]);

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 64]
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}…)", hex::encode(&self.0[..4]))
    }
}

/// A 32-byte secp256k1 secret scalar.
///
/// Does not implement `Debug`, `Clone`, or serde to prevent accidental
/// exposure. Key bytes are zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretKeyBytes(pub [u8; 32]);

// serde can't derive fixed arrays wider than 32 elements, so the 33- and
// 64-byte types get explicit byte-oriented impls.

macro_rules! impl_serde_byte_array {
    ($type:ident, $len:expr) => {
        impl Serialize for $type {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_bytes(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $type {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                struct ArrayVisitor;

                impl<'de> serde::de::Visitor<'de> for ArrayVisitor {
                    type Value = $type;

                    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                        write!(f, "{} bytes", $len)
                    }

                    fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
                        let arr: [u8; $len] = v
                            .try_into()
                            .map_err(|_| E::invalid_length(v.len(), &self))?;
                        Ok($type(arr))
                    }

                    fn visit_seq<A: serde::de::SeqAccess<'de>>(
                        self,
                        mut seq: A,
                    ) -> Result<Self::Value, A::Error> {
                        let mut arr = [0u8; $len];
                        for (i, byte) in arr.iter_mut().enumerate() {
                            *byte = seq
                                .next_element()?
                                .ok_or_else(|| serde::de::Error::invalid_length(i, &self))?;
                        }
                        Ok($type(arr))
                    }
                }

                deserializer.deserialize_bytes(ArrayVisitor)
            }
        }
    };
}

impl_serde_byte_array!(PublicKey, PUBLIC_KEY_LENGTH);
impl_serde_byte_array!(Pkid, PUBLIC_KEY_LENGTH);
impl_serde_byte_array!(Signature, 64);
