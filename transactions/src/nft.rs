//! NFT transaction metadata.

use plaza_types::{PostHash, PublicKey, UtxoKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mints a post as an NFT with `num_copies` serials.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNftMetadata {
    pub nft_post_hash: PostHash,

    pub num_copies: u64,

    pub has_unlockable: bool,

    pub is_for_sale: bool,

    pub min_bid_amount_nanos: u64,

    pub nft_royalty_to_creator_basis_points: u64,

    pub nft_royalty_to_coin_basis_points: u64,

    pub is_buy_now: bool,

    pub buy_now_price_nanos: u64,

    /// Extra royalties paid directly to these keys on every sale. Resolved
    /// to PKIDs at connect time. Must not include the post author.
    pub additional_royalties_to_creators: BTreeMap<PublicKey, u64>,

    /// Extra royalties added to these keys' profile coin reserves on every
    /// sale. Must not include the post author.
    pub additional_royalties_to_coins: BTreeMap<PublicKey, u64>,
}

/// Owner-only sale-state changes for one serial.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateNftMetadata {
    pub nft_post_hash: PostHash,
    pub serial_number: u64,
    pub is_for_sale: bool,
    pub min_bid_amount_nanos: u64,
    pub is_buy_now: bool,
    pub buy_now_price_nanos: u64,
}

/// Places (or, with amount zero, cancels) a bid on a serial.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftBidMetadata {
    pub nft_post_hash: PostHash,
    pub serial_number: u64,
    pub bid_amount_nanos: u64,
}

/// Seller-signed acceptance of a bid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptNftBidMetadata {
    pub nft_post_hash: PostHash,

    pub serial_number: u64,

    pub bidder_public_key: PublicKey,

    pub bid_amount_nanos: u64,

    /// Ciphertext for the buyer when the post has unlockable content.
    pub unlockable_text: Vec<u8>,

    /// The bidder's outputs, spent on the bidder's behalf to fund the bid.
    /// Counted as inputs of this transaction.
    pub bidder_inputs: Vec<UtxoKey>,
}

/// Owner-signed transfer of a serial; pending until the receiver accepts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftTransferMetadata {
    pub nft_post_hash: PostHash,
    pub serial_number: u64,
    pub receiver_public_key: PublicKey,
    pub unlockable_text: Vec<u8>,
}

/// Receiver-signed acceptance of a pending transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptNftTransferMetadata {
    pub nft_post_hash: PostHash,
    pub serial_number: u64,
}

/// Owner-signed burn of a serial.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnNftMetadata {
    pub nft_post_hash: PostHash,
    pub serial_number: u64,
}
