//! Governable global parameters and the forbidden-block-signer set.

use crate::keys::PublicKey;
use serde::{Deserialize, Serialize};

/// On-chain parameters adjustable by the param-updater keys.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalParamsEntry {
    /// Exchange rate for cross-chain burn mints, in USD cents per Bitcoin.
    pub usd_cents_per_bitcoin: u64,

    /// Fee charged (as transaction fees) on first profile creation.
    pub create_profile_fee_nanos: u64,

    /// Per-copy NFT mint fee; an NFT with n copies incurs n of these.
    pub create_nft_fee_nanos: u64,

    /// Maximum copies a single NFT may be minted with.
    pub max_copies_per_nft: u64,

    /// Minimum accepted fee rate in nanos per kilobyte.
    pub minimum_network_fee_nanos_per_kb: u64,
}

impl Default for GlobalParamsEntry {
    fn default() -> Self {
        Self {
            usd_cents_per_bitcoin: 3_000_000,
            create_profile_fee_nanos: 0,
            create_nft_fee_nanos: 0,
            max_copies_per_nft: 1_000,
            minimum_network_fee_nanos_per_kb: 0,
        }
    }
}

/// A key barred from signing blocks. Admin-controlled via
/// `UpdateGlobalParams`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForbiddenPubKeyEntry {
    pub public_key: PublicKey,

    pub is_deleted: bool,
}
