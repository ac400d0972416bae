//! NFT entries and bids.
//!
//! Each minted copy of a post is identified by (post hash, serial number)
//! with serials running 1..=copies. A single post maps to many NFT entries.

use crate::hash::PostHash;
use crate::keys::Pkid;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NftKey {
    pub post_hash: PostHash,
    pub serial_number: u64,
}

impl NftKey {
    pub fn new(post_hash: PostHash, serial_number: u64) -> Self {
        Self {
            post_hash,
            serial_number,
        }
    }
}

/// One minted copy of a post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftEntry {
    /// Previous owner, retained so the unlockable text can still be
    /// decrypted after a transfer.
    pub last_owner_pkid: Option<Pkid>,

    pub owner_pkid: Pkid,

    pub post_hash: PostHash,

    pub serial_number: u64,

    pub is_for_sale: bool,

    pub min_bid_amount_nanos: u64,

    /// Ciphertext addressed to the current owner; set at most once, on the
    /// first sale of an unlockable NFT.
    pub unlockable_text: Vec<u8>,

    pub last_accepted_bid_amount_nanos: u64,

    /// Set when the NFT was transferred and the receiver has not yet
    /// accepted. Pending and for-sale are mutually exclusive.
    pub is_pending: bool,

    /// Buy-now NFTs execute the accept flow for any bid meeting the price.
    /// Incompatible with unlockable content.
    pub is_buy_now: bool,

    pub buy_now_price_nanos: u64,

    pub is_deleted: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NftBidKey {
    pub bidder_pkid: Pkid,
    pub post_hash: PostHash,
    pub serial_number: u64,
}

/// A single bid on an NFT serial. A zero amount is a cancellation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftBidEntry {
    pub bidder_pkid: Pkid,
    pub post_hash: PostHash,
    pub serial_number: u64,
    pub bid_amount_nanos: u64,

    pub is_deleted: bool,
}
