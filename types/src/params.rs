//! Chain parameters — consensus constants and governance-tunable bounds.

use crate::keys::PublicKey;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Number of base units ("nanos") in one whole native token.
pub const NANOS_PER_UNIT: u64 = 1_000_000_000;

/// Satoshis in one Bitcoin, for cross-chain burn conversion.
pub const SATOSHIS_PER_BITCOIN: u64 = 100_000_000;

/// 100% expressed in basis points.
pub const MAX_BASIS_POINTS: u64 = 10_000;

/// Maximum username length in bytes. Usernames are unique case-insensitively.
pub const MAX_USERNAME_LENGTH_BYTES: usize = 25;

/// Maximum profile description length in bytes.
pub const MAX_PROFILE_DESCRIPTION_LENGTH_BYTES: usize = 512;

/// Maximum profile image length in bytes (data-URL encoded).
pub const MAX_PROFILE_PIC_LENGTH_BYTES: usize = 20_000;

/// Maximum post body length in bytes.
pub const MAX_POST_BODY_LENGTH_BYTES: usize = 20_000;

/// Maximum encrypted private-message length in bytes.
pub const MAX_PRIVATE_MESSAGE_LENGTH_BYTES: usize = 10_000;

/// Bounds for the governable exchange rate (USD cents per Bitcoin).
pub const MIN_USD_CENTS_PER_BITCOIN: u64 = 100;
pub const MAX_USD_CENTS_PER_BITCOIN: u64 = 1_000_000_000;

/// Bounds for the governable minimum network fee (nanos per KB).
pub const MIN_NETWORK_FEE_NANOS_PER_KB: u64 = 0;
pub const MAX_NETWORK_FEE_NANOS_PER_KB: u64 = 100 * NANOS_PER_UNIT;

/// Bounds for the governable profile-creation fee.
pub const MIN_CREATE_PROFILE_FEE_NANOS: u64 = 0;
pub const MAX_CREATE_PROFILE_FEE_NANOS: u64 = 100 * NANOS_PER_UNIT;

/// Bounds for the governable per-copy NFT mint fee.
pub const MIN_CREATE_NFT_FEE_NANOS: u64 = 0;
pub const MAX_CREATE_NFT_FEE_NANOS: u64 = 100 * NANOS_PER_UNIT;

/// Bounds for the governable NFT copy limit.
pub const MIN_MAX_COPIES_PER_NFT: u64 = 1;
pub const MAX_MAX_COPIES_PER_NFT: u64 = 10_000;

/// Selling a creator-coin position down to fewer nanos than this liquidates
/// the whole position, so dust balances can't wedge the holder count.
pub const CREATOR_COIN_AUTO_SELL_THRESHOLD_NANOS: u64 = 10;

/// Fee retained on cross-chain burn mints, in basis points.
pub const BITCOIN_EXCHANGE_FEE_BASIS_POINTS: u64 = 10;

/// Block heights at which protocol behavior changes.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ForkHeights {
    /// Height after which basic transfers may carry diamond extra-data.
    pub diamonds_block_height: u64,
}

/// All chain parameters held by every node.
///
/// Consensus constants live here; the governable subset is mirrored in
/// `GlobalParamsEntry` and updated on-chain via `UpdateGlobalParams`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainParams {
    /// Maximum serialized block size in bytes. A single transaction may not
    /// exceed half of this.
    pub max_block_size_bytes: u64,

    /// Target seconds between blocks.
    pub time_between_blocks_secs: u64,

    /// Seconds a block-reward output must age before it is spendable.
    /// Expressed in blocks as `ceil(maturity / block_time)`.
    pub block_reward_maturity_secs: u64,

    /// Initial block subsidy in nanos.
    pub block_reward_nanos: u64,

    /// Blocks between halvings of the subsidy.
    pub blocks_per_halving: u64,

    /// Cap on the total native-token supply, and on any single amount.
    pub max_nanos: u64,

    /// Keys authorized to update global params, swap identities, and set
    /// the exchange rate.
    pub param_updater_public_keys: BTreeSet<PublicKey>,

    /// Nanos minted per USD cent of verified cross-chain burn.
    pub nanos_per_usd_cent: u64,

    /// Diamond level -> cumulative nanos required at that level.
    pub diamond_levels: BTreeMap<u64, u64>,

    pub fork_heights: ForkHeights,
}

impl ChainParams {
    /// Block subsidy at a given height (right-shift halving schedule).
    pub fn base_block_reward(&self, height: u64) -> u64 {
        let halvings = height / self.blocks_per_halving;
        if halvings >= 64 {
            return 0;
        }
        self.block_reward_nanos >> halvings
    }

    /// Number of confirmations a block-reward output needs before spending.
    pub fn block_reward_maturity_blocks(&self) -> u64 {
        self.block_reward_maturity_secs.div_ceil(self.time_between_blocks_secs)
    }

    pub fn is_param_updater(&self, public_key: &PublicKey) -> bool {
        self.param_updater_public_keys.contains(public_key)
    }
}

impl Default for ChainParams {
    fn default() -> Self {
        let mut diamond_levels = BTreeMap::new();
        diamond_levels.insert(1, 50_000);
        diamond_levels.insert(2, 500_000);
        diamond_levels.insert(3, 5_000_000);
        diamond_levels.insert(4, 50_000_000);
        diamond_levels.insert(5, 500_000_000);
        diamond_levels.insert(6, 5_000_000_000);
        diamond_levels.insert(7, 50_000_000_000);
        diamond_levels.insert(8, 500_000_000_000);

        Self {
            max_block_size_bytes: 16 * 1024 * 1024,
            time_between_blocks_secs: 60,
            block_reward_maturity_secs: 3 * 60 * 60,
            block_reward_nanos: NANOS_PER_UNIT,
            blocks_per_halving: 1_051_200, // roughly two years at one minute per block
            max_nanos: 30_000_000 * NANOS_PER_UNIT,
            param_updater_public_keys: BTreeSet::new(),
            nanos_per_usd_cent: 100_000,
            diamond_levels,
            fork_heights: ForkHeights::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_reward_halves() {
        let params = ChainParams {
            block_reward_nanos: 1_000_000,
            blocks_per_halving: 100,
            ..ChainParams::default()
        };
        assert_eq!(params.base_block_reward(0), 1_000_000);
        assert_eq!(params.base_block_reward(99), 1_000_000);
        assert_eq!(params.base_block_reward(100), 500_000);
        assert_eq!(params.base_block_reward(200), 250_000);
    }

    #[test]
    fn block_reward_zero_after_64_halvings() {
        let params = ChainParams {
            blocks_per_halving: 1,
            ..ChainParams::default()
        };
        assert_eq!(params.base_block_reward(64), 0);
        assert_eq!(params.base_block_reward(10_000), 0);
    }

    #[test]
    fn maturity_rounds_up() {
        let params = ChainParams {
            time_between_blocks_secs: 60,
            block_reward_maturity_secs: 150,
            ..ChainParams::default()
        };
        assert_eq!(params.block_reward_maturity_blocks(), 3);
    }
}
