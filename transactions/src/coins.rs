//! Creator-coin and DAO-coin transaction metadata.

use plaza_types::{PublicKey, TransferRestrictionStatus};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreatorCoinOperation {
    Buy,
    Sell,
    /// Recognized on the wire but rejected by consensus.
    Add,
}

/// Buys or sells a creator coin against its bonded curve.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorCoinMetadata {
    /// The profile whose coin is being traded.
    pub profile_public_key: PublicKey,

    pub operation: CreatorCoinOperation,

    /// Buy: nanos of native token to convert into coins.
    pub nanos_to_spend: u64,

    /// Sell: coin nanos to convert back into native tokens.
    pub creator_coin_to_sell_nanos: u64,

    /// Slippage floor for buys: minimum coin nanos expected.
    pub min_creator_coin_expected_nanos: u64,

    /// Slippage floor for sells: minimum native nanos expected.
    pub min_nanos_expected: u64,
}

/// Moves creator coins between holders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorCoinTransferMetadata {
    pub profile_public_key: PublicKey,
    pub coin_to_transfer_nanos: u64,
    pub receiver_public_key: PublicKey,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DaoCoinOperation {
    Mint,
    Burn,
    DisableMinting,
    UpdateTransferRestrictionStatus,
}

/// Mint/burn/restriction operations on a profile's DAO coin. Only the
/// profile owner may mint, disable minting, or change restrictions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaoCoinMetadata {
    pub profile_public_key: PublicKey,

    pub operation: DaoCoinOperation,

    pub coins_to_mint_nanos: U256,

    pub coins_to_burn_nanos: U256,

    /// Only read for `UpdateTransferRestrictionStatus`.
    pub transfer_restriction_status: TransferRestrictionStatus,
}

/// Moves DAO coins between holders, subject to the profile's restriction
/// status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaoCoinTransferMetadata {
    pub profile_public_key: PublicKey,
    pub dao_coin_to_transfer_nanos: U256,
    pub receiver_public_key: PublicKey,
}
