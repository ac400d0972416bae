//! Unspent transaction outputs — the unit of native-token ownership.

use crate::hash::TxnHash;
use crate::keys::PublicKey;
use serde::{Deserialize, Serialize};

/// Where an output came from. The origin tag decides spendability rules
/// (block rewards mature) and lets downstream accounting attribute implicit
/// outputs created by handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UtxoType {
    /// An ordinary transaction output.
    Output,
    /// A block-reward output; unspendable until matured.
    BlockReward,
    /// Minted against a verified cross-chain burn.
    BitcoinBurn,
    /// Proceeds of a creator-coin sell.
    CreatorCoinSale,
    /// The creator's share of a creator-coin buy.
    CreatorCoinFounderReward,
    /// Seller proceeds of an accepted NFT bid.
    NftSeller,
    /// Change returned to the bidder of an accepted NFT bid.
    NftBidderChange,
    /// The post author's royalty on an NFT sale.
    NftCreatorRoyalty,
    /// An additional per-PKID royalty on an NFT sale.
    NftAdditionalRoyalty,
}

/// Identifies an output by the transaction that created it and its index
/// within that transaction's output list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UtxoKey {
    pub txid: TxnHash,
    pub index: u32,
}

impl UtxoKey {
    pub fn new(txid: TxnHash, index: u32) -> Self {
        Self { txid, index }
    }
}

/// An unspent output.
///
/// `spent` is in-memory bookkeeping only: the backing store holds an output
/// iff it is unspent, while the overlay distinguishes a spent tombstone
/// (present, `spent = true`) from an entry it simply hasn't loaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoEntry {
    pub amount_nanos: u64,
    pub public_key: PublicKey,
    pub block_height: u64,
    pub utxo_type: UtxoType,

    #[serde(skip)]
    pub spent: bool,
}

impl UtxoEntry {
    pub fn new(
        amount_nanos: u64,
        public_key: PublicKey,
        block_height: u64,
        utxo_type: UtxoType,
    ) -> Self {
        Self {
            amount_nanos,
            public_key,
            block_height,
            utxo_type,
            spent: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spent_flag_not_serialized() {
        let mut entry = UtxoEntry::new(42, PublicKey::new([2u8; 33]), 7, UtxoType::Output);
        entry.spent = true;
        let bytes = bincode::serialize(&entry).unwrap();
        let back: UtxoEntry = bincode::deserialize(&bytes).unwrap();
        assert!(!back.spent);
        assert_eq!(back.amount_nanos, 42);
    }
}
