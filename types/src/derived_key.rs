//! Delegated-signing ("derived") key records.

use crate::keys::PublicKey;
use serde::{Deserialize, Serialize};

/// Authorization state of a derived key.
///
/// `Revoked` is terminal for the (owner, derived) pair; expiry is decided
/// against the block height at verification time rather than stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DerivedKeyState {
    Valid,
    Revoked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DerivedKeyMapKey {
    pub owner_public_key: PublicKey,
    pub derived_public_key: PublicKey,
}

impl DerivedKeyMapKey {
    pub fn new(owner_public_key: PublicKey, derived_public_key: PublicKey) -> Self {
        Self {
            owner_public_key,
            derived_public_key,
        }
    }
}

/// A key the owner has authorized to sign transactions on their behalf
/// until an expiration height.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedKeyEntry {
    pub owner_public_key: PublicKey,
    pub derived_public_key: PublicKey,

    /// First block height at which the key is no longer valid.
    pub expiration_block: u64,

    pub state: DerivedKeyState,

    pub is_deleted: bool,
}

impl DerivedKeyEntry {
    /// Whether the key may sign at the given height.
    pub fn is_usable_at(&self, block_height: u64) -> bool {
        self.state == DerivedKeyState::Valid && self.expiration_block > block_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(state: DerivedKeyState, expiration_block: u64) -> DerivedKeyEntry {
        DerivedKeyEntry {
            owner_public_key: PublicKey::new([1u8; 33]),
            derived_public_key: PublicKey::new([2u8; 33]),
            expiration_block,
            state,
            is_deleted: false,
        }
    }

    #[test]
    fn usable_only_while_valid_and_unexpired() {
        let e = entry(DerivedKeyState::Valid, 10);
        assert!(e.is_usable_at(9));
        assert!(!e.is_usable_at(10));
        assert!(!e.is_usable_at(11));

        let revoked = entry(DerivedKeyState::Revoked, 10);
        assert!(!revoked.is_usable_at(5));
    }
}
