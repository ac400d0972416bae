//! Posts — the social ledger's content records, including NFT metadata.

use crate::hash::PostHash;
use crate::keys::{Pkid, PublicKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A post: content, counters, and (once minted) NFT metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostEntry {
    /// Hash of the transaction that created the post; the post's identity.
    pub post_hash: PostHash,

    pub poster_public_key: PublicKey,

    /// Set for comments: the post being replied to.
    pub parent_post_hash: Option<PostHash>,

    pub body: Vec<u8>,

    /// Set for reposts: the post being reposted. A repost with an empty body
    /// is a vanilla repost; with a body it is a quote repost.
    pub reposted_post_hash: Option<PostHash>,

    pub is_quoted_repost: bool,

    /// Nanosecond timestamp, unique per poster. Nanosecond resolution keeps
    /// the uniqueness constraint cheap for clients to satisfy.
    pub timestamp_nanos: u64,

    /// Hiding a post is a flag flip, not a deletion, so it can be undone.
    pub is_hidden: bool,

    pub like_count: u64,
    pub repost_count: u64,
    pub quote_repost_count: u64,
    pub diamond_count: u64,
    pub comment_count: u64,

    pub is_pinned: bool,

    /// Height of the block that confirmed the post.
    pub confirmation_block_height: u64,

    // NFT metadata, populated by CreateNFT.
    pub is_nft: bool,
    pub num_nft_copies: u64,
    pub num_nft_copies_for_sale: u64,
    pub num_nft_copies_burned: u64,
    pub has_unlockable: bool,
    pub nft_royalty_to_creator_basis_points: u64,
    pub nft_royalty_to_coin_basis_points: u64,

    /// Extra per-PKID royalties paid out directly on every sale. Must never
    /// contain the post author.
    pub additional_nft_royalties_to_creators: BTreeMap<Pkid, u64>,

    /// Extra per-PKID royalties added to the named profiles' coin reserves
    /// on every sale. Must never contain the post author.
    pub additional_nft_royalties_to_coins: BTreeMap<Pkid, u64>,

    /// Arbitrary non-consensus attributes. Updates merge key-by-key.
    pub extra_data: BTreeMap<String, Vec<u8>>,

    pub is_deleted: bool,
}

impl PostEntry {
    /// A repost that adds no body of its own.
    pub fn is_vanilla_repost(&self) -> bool {
        !self.is_quoted_repost && self.reposted_post_hash.is_some()
    }

    pub fn is_comment(&self) -> bool {
        self.parent_post_hash.is_some()
    }

    /// Sum of every royalty share attached to this post, in basis points.
    pub fn total_royalty_basis_points(&self) -> u64 {
        let additional: u64 = self
            .additional_nft_royalties_to_creators
            .values()
            .chain(self.additional_nft_royalties_to_coins.values())
            .sum();
        self.nft_royalty_to_creator_basis_points
            .saturating_add(self.nft_royalty_to_coin_basis_points)
            .saturating_add(additional)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::TxnHash;

    fn sample_post() -> PostEntry {
        PostEntry {
            post_hash: TxnHash::new([1u8; 32]),
            poster_public_key: PublicKey::new([2u8; 33]),
            parent_post_hash: None,
            body: b"hello plaza".to_vec(),
            reposted_post_hash: None,
            is_quoted_repost: false,
            timestamp_nanos: 1_000,
            is_hidden: false,
            like_count: 0,
            repost_count: 0,
            quote_repost_count: 0,
            diamond_count: 0,
            comment_count: 0,
            is_pinned: false,
            confirmation_block_height: 0,
            is_nft: false,
            num_nft_copies: 0,
            num_nft_copies_for_sale: 0,
            num_nft_copies_burned: 0,
            has_unlockable: false,
            nft_royalty_to_creator_basis_points: 0,
            nft_royalty_to_coin_basis_points: 0,
            additional_nft_royalties_to_creators: BTreeMap::new(),
            additional_nft_royalties_to_coins: BTreeMap::new(),
            extra_data: BTreeMap::new(),
            is_deleted: false,
        }
    }

    #[test]
    fn vanilla_vs_quote_repost() {
        let mut post = sample_post();
        assert!(!post.is_vanilla_repost());

        post.reposted_post_hash = Some(TxnHash::new([9u8; 32]));
        assert!(post.is_vanilla_repost());

        post.is_quoted_repost = true;
        assert!(!post.is_vanilla_repost());
    }

    #[test]
    fn royalty_sum_includes_additional_maps() {
        let mut post = sample_post();
        post.nft_royalty_to_creator_basis_points = 100;
        post.nft_royalty_to_coin_basis_points = 200;
        post.additional_nft_royalties_to_creators
            .insert(Pkid::new([3u8; 33]), 300);
        post.additional_nft_royalties_to_coins
            .insert(Pkid::new([4u8; 33]), 400);
        assert_eq!(post.total_royalty_basis_points(), 1_000);
    }
}
