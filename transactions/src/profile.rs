//! Profile and identity transaction metadata.

use plaza_types::PublicKey;
use serde::{Deserialize, Serialize};

/// Creates or updates a profile.
///
/// Empty byte fields mean "leave unchanged" on an update; on creation the
/// username must be present.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProfileMetadata {
    /// The profile to operate on. `None` targets the transactor's own
    /// profile; a param updater may target someone else's.
    pub profile_public_key: Option<PublicKey>,

    pub new_username: Vec<u8>,

    pub new_description: Vec<u8>,

    pub new_profile_pic: Vec<u8>,

    /// Founder-reward share for the creator coin, in basis points.
    pub new_creator_basis_points: u64,

    pub is_hidden: bool,
}

/// Atomically swaps the public keys bound to two stable identifiers.
/// Admin-keyed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapIdentityMetadata {
    pub from_public_key: PublicKey,
    pub to_public_key: PublicKey,
}

/// Writes a new exchange rate into the global params. Admin-keyed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBitcoinUsdExchangeRateMetadata {
    pub usd_cents_per_bitcoin: u64,
}
