//! The atomic overlay write.

use plaza_types::{
    BalanceEntry, BalanceKey, BlockHash, DerivedKeyEntry, DerivedKeyMapKey, DiamondEntry,
    DiamondKey, FollowEntry, FollowKey, ForbiddenPubKeyEntry, GlobalParamsEntry, LikeEntry,
    LikeKey, MessageEntry, MessageKey, MessagingGroupEntry, MessagingGroupKey, NftBidEntry,
    NftBidKey, NftEntry, NftKey, PkidEntry, Pkid, PostEntry, PostHash, ProfileEntry, PublicKey,
    RepostEntry, RepostKey, TxnHash, UtxoEntry, UtxoKey,
};

/// Everything a flushed overlay wants written.
///
/// `None` values are deletions. The view builds one batch per flush;
/// backends apply it atomically so a crash never exposes half an overlay.
#[derive(Debug, Default)]
pub struct FlushBatch {
    pub utxos: Vec<(UtxoKey, Option<UtxoEntry>)>,
    pub pkids_by_public_key: Vec<(PublicKey, Option<PkidEntry>)>,
    pub public_keys_by_pkid: Vec<(Pkid, Option<PkidEntry>)>,
    /// Backends re-derive the username index from each entry's username.
    pub profiles: Vec<(Pkid, Option<ProfileEntry>)>,
    pub posts: Vec<(PostHash, Option<PostEntry>)>,
    pub likes: Vec<(LikeKey, Option<LikeEntry>)>,
    pub follows: Vec<(FollowKey, Option<FollowEntry>)>,
    pub reposts: Vec<(RepostKey, Option<RepostEntry>)>,
    pub diamonds: Vec<(DiamondKey, Option<DiamondEntry>)>,
    pub nfts: Vec<(NftKey, Option<NftEntry>)>,
    pub nft_bids: Vec<(NftBidKey, Option<NftBidEntry>)>,
    pub accepted_bid_histories: Vec<(NftKey, Vec<NftBidEntry>)>,
    pub messages: Vec<(MessageKey, Option<MessageEntry>)>,
    pub messaging_groups: Vec<(MessagingGroupKey, Option<MessagingGroupEntry>)>,
    pub derived_keys: Vec<(DerivedKeyMapKey, Option<DerivedKeyEntry>)>,
    pub creator_coin_balances: Vec<(BalanceKey, Option<BalanceEntry>)>,
    pub dao_coin_balances: Vec<(BalanceKey, Option<BalanceEntry>)>,
    pub forbidden_pub_keys: Vec<(PublicKey, Option<ForbiddenPubKeyEntry>)>,
    /// `true` adds the id, `false` removes it (disconnected mint).
    pub burn_txids: Vec<(TxnHash, bool)>,
    pub global_params: Option<GlobalParamsEntry>,
    pub nanos_purchased: Option<u64>,
    pub tip_hash: Option<BlockHash>,
}
