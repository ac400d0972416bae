//! Profiles, stable-identifier mappings, coin entries, and coin balances.

use crate::keys::{Pkid, PublicKey};
use crate::params::MAX_USERNAME_LENGTH_BYTES;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Maps a public key to its stable identifier, or the reverse. The same
/// record shape serves both directions of the mapping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkidEntry {
    pub pkid: Pkid,
    pub public_key: PublicKey,

    pub is_deleted: bool,
}

/// Restrictions a profile owner can place on coin transfers.
///
/// `PermanentlyUnrestricted` is absorbing: once set it can never change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferRestrictionStatus {
    #[default]
    Unrestricted,
    /// Transfers must involve the profile owner as sender or receiver.
    ProfileOwnerOnly,
    /// The receiver must already hold a nonzero balance.
    HoldersOnly,
    PermanentlyUnrestricted,
}

impl TransferRestrictionStatus {
    pub fn is_unrestricted(&self) -> bool {
        matches!(
            self,
            Self::Unrestricted | Self::PermanentlyUnrestricted
        )
    }
}

/// Everything needed to support buy/sell/transfer of a coin attached to a
/// profile. Profiles embed two of these: the bonded-curve creator coin and
/// the unbacked DAO coin.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinEntry {
    /// The founder's share of net-new creator-coin purchases, in basis points.
    pub creator_basis_points: u64,

    /// Native-token reserve backing the coin. Grows on buys, shrinks on
    /// sells. Always zero for DAO coins.
    pub locked_nanos: u64,

    /// Number of distinct holders with a nonzero balance.
    pub number_of_holders: u64,

    /// Coins currently in circulation. Computed into a fresh value on every
    /// mutation so copied entries never alias their parent.
    pub coins_in_circulation: U256,

    /// Highest circulation ever reached. The founder reward applies only to
    /// the excess minted above this watermark. Creator-coin circulation
    /// cannot exceed `u64::MAX` nanos, so the watermark fits in 64 bits.
    pub watermark_nanos: u64,

    /// One-way latch disabling further DAO-coin minting.
    pub minting_disabled: bool,

    pub transfer_restriction: TransferRestrictionStatus,
}

/// A user profile: username, metadata, and the two embedded coin records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEntry {
    pub public_key: PublicKey,

    /// Unique human-readable identifier (case-insensitive uniqueness).
    pub username: Vec<u8>,

    pub description: Vec<u8>,

    /// Profile image as a data URL.
    pub profile_pic: Vec<u8>,

    /// Hiding a profile is a flag flip, not a deletion, so it can be undone.
    pub is_hidden: bool,

    pub creator_coin: CoinEntry,

    pub dao_coin: CoinEntry,

    pub is_deleted: bool,
}

/// Fixed-width lowercased username, used as the uniqueness key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UsernameKey(pub [u8; MAX_USERNAME_LENGTH_BYTES]);

impl UsernameKey {
    /// Lowercase and zero-pad a username. Callers must have validated the
    /// length already; longer input is truncated to the key width.
    pub fn from_username(username: &[u8]) -> Self {
        let mut key = [0u8; MAX_USERNAME_LENGTH_BYTES];
        for (i, b) in username.iter().take(MAX_USERNAME_LENGTH_BYTES).enumerate() {
            key[i] = b.to_ascii_lowercase();
        }
        Self(key)
    }
}

/// Key for the (holder, creator) coin balance tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BalanceKey {
    pub holder_pkid: Pkid,
    pub creator_pkid: Pkid,
}

impl BalanceKey {
    pub fn new(holder_pkid: Pkid, creator_pkid: Pkid) -> Self {
        Self {
            holder_pkid,
            creator_pkid,
        }
    }
}

/// A holder's balance of one creator's coin. Used for both the creator-coin
/// and DAO-coin tables, which are kept separate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub holder_pkid: Pkid,
    pub creator_pkid: Pkid,

    pub balance_nanos: U256,

    /// Whether the holder has ever purchased this coin (as opposed to
    /// receiving it). Decides the one-time founder-reward exemption.
    pub has_purchased: bool,

    pub is_deleted: bool,
}

impl BalanceEntry {
    pub fn new(holder_pkid: Pkid, creator_pkid: Pkid) -> Self {
        Self {
            holder_pkid,
            creator_pkid,
            balance_nanos: U256::zero(),
            has_purchased: false,
            is_deleted: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_key_is_case_insensitive() {
        let a = UsernameKey::from_username(b"Alice");
        let b = UsernameKey::from_username(b"aLiCe");
        let c = UsernameKey::from_username(b"bob");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn permanently_unrestricted_is_unrestricted() {
        assert!(TransferRestrictionStatus::Unrestricted.is_unrestricted());
        assert!(TransferRestrictionStatus::PermanentlyUnrestricted.is_unrestricted());
        assert!(!TransferRestrictionStatus::ProfileOwnerOnly.is_unrestricted());
        assert!(!TransferRestrictionStatus::HoldersOnly.is_unrestricted());
    }
}
