//! NFT storage trait.

use crate::StoreError;
use plaza_types::{NftBidEntry, NftBidKey, NftEntry, NftKey, PostHash};

pub trait NftStore {
    fn fetch_nft(&self, key: &NftKey) -> Result<Option<NftEntry>, StoreError>;

    fn fetch_nft_bid(&self, key: &NftBidKey) -> Result<Option<NftBidEntry>, StoreError>;

    /// All open bids for one serial, in bidder order.
    fn fetch_bids_for_serial(
        &self,
        post_hash: &PostHash,
        serial_number: u64,
    ) -> Result<Vec<NftBidEntry>, StoreError>;

    /// The append-only accepted-bid history for a serial.
    fn fetch_accepted_bid_history(&self, key: &NftKey) -> Result<Vec<NftBidEntry>, StoreError>;
}
