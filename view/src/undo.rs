//! The undo log.
//!
//! Every mutation a transaction makes appends one tagged record carrying the
//! previous state needed to reverse it. Disconnect replays a transaction's
//! records from the tail. This enum evolves in lockstep with `TxnMeta`.

use plaza_types::{
    BalanceEntry, BalanceKey, CoinEntry, DerivedKeyEntry, DerivedKeyMapKey, DiamondEntry,
    FollowEntry, FollowKey, ForbiddenPubKeyEntry, GlobalParamsEntry, LikeEntry, LikeKey,
    MessageKey, MessagingGroupEntry, MessagingGroupKey, NftBidEntry, NftBidKey, NftEntry, NftKey,
    PkidEntry, Pkid, PostEntry, PostHash, ProfileEntry, PublicKey, RepostEntry, RepostKey,
    TxnHash, UtxoEntry, UtxoKey,
};

/// Royalty accounting recorded when a bid is accepted. Consumed by
/// out-of-band analytics; disconnect itself only needs the entry snapshots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoyaltyPayout {
    pub pkid: Pkid,
    pub amount_nanos: u64,
}

/// The full reversal payload of an accepted NFT bid. Shared between the
/// `AcceptNftBid` operation and a buy-now `NftBid` that executed the accept
/// flow inline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcceptedBidUndo {
    pub nft_key: NftKey,
    pub prev_nft: NftEntry,
    pub bid_key: NftBidKey,
    /// The consumed bid. `None` for a buy-now execution, where no bid entry
    /// ever persisted.
    pub prev_bid: Option<NftBidEntry>,
    pub prev_post: PostEntry,
    pub prev_accepted_history: Vec<NftBidEntry>,

    /// Bidder outputs spent to fund the bid, with the entries needed to
    /// re-materialize them in order.
    pub spent_bidder_utxos: Vec<(UtxoKey, UtxoEntry)>,

    /// Implicit payment outputs created by the sale, in creation order.
    pub payment_utxo_keys: Vec<UtxoKey>,

    /// Coin entries of royalty recipients before locked nanos were added.
    pub prev_royalty_coin_entries: Vec<(Pkid, CoinEntry)>,

    // Analytics fields; not needed for reversal.
    pub creator_royalty_nanos: u64,
    pub creator_coin_royalty_nanos: u64,
    pub additional_creator_royalties: Vec<RoyaltyPayout>,
    pub additional_coin_royalties: Vec<RoyaltyPayout>,
    pub seller_proceeds_nanos: u64,
    pub bidder_change_nanos: u64,
}

/// One reversible operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UndoOp {
    /// An output was added; reversal deletes it.
    AddUtxo { key: UtxoKey, entry: UtxoEntry },

    /// An output was spent; reversal re-inserts the saved entry under the
    /// saved key.
    SpendUtxo { key: UtxoKey, entry: UtxoEntry },

    /// A diamond side-effect on a basic transfer.
    Diamond {
        prev_post: PostEntry,
        prev_diamond: Option<DiamondEntry>,
    },

    BitcoinExchange {
        burn_txn_id: TxnHash,
        prev_nanos_purchased: u64,
        /// The implicit minted output.
        output_key: UtxoKey,
    },

    UpdateExchangeRate {
        prev_global_params: GlobalParamsEntry,
    },

    UpdateGlobalParams {
        prev_global_params: GlobalParamsEntry,
        /// Key plus previous entry, when the txn inserted a forbidden key.
        prev_forbidden_pub_key: Option<(PublicKey, Option<ForbiddenPubKeyEntry>)>,
    },

    PrivateMessage {
        sender_key: MessageKey,
        recipient_key: MessageKey,
    },

    MessagingGroup {
        group_key: MessagingGroupKey,
        prev_entry: Option<MessagingGroupEntry>,
    },

    SubmitPost {
        post_hash: PostHash,
        prev_post: Option<PostEntry>,
        prev_parent: Option<PostEntry>,
        prev_reposted: Option<PostEntry>,
        repost_key: Option<RepostKey>,
        prev_repost_entry: Option<RepostEntry>,
    },

    UpdateProfile {
        pkid: Pkid,
        prev_profile: Option<ProfileEntry>,
    },

    SwapIdentity {
        prev_forward: Vec<(PublicKey, Option<PkidEntry>)>,
        prev_reverse: Vec<(Pkid, Option<PkidEntry>)>,
    },

    Follow {
        key: FollowKey,
        prev_entry: Option<FollowEntry>,
    },

    Like {
        key: LikeKey,
        prev_entry: Option<LikeEntry>,
        prev_post: PostEntry,
    },

    CreatorCoin {
        creator_pkid: Pkid,
        prev_coin: CoinEntry,
        transactor_balance_key: BalanceKey,
        prev_transactor_balance: Option<BalanceEntry>,
        creator_balance_key: BalanceKey,
        prev_creator_balance: Option<BalanceEntry>,
        /// The implicit proceeds output of a sell, when one was created.
        payout_utxo_key: Option<UtxoKey>,
    },

    CreatorCoinTransfer {
        creator_pkid: Pkid,
        prev_coin: CoinEntry,
        sender_balance_key: BalanceKey,
        prev_sender_balance: Option<BalanceEntry>,
        receiver_balance_key: BalanceKey,
        prev_receiver_balance: Option<BalanceEntry>,
    },

    DaoCoin {
        creator_pkid: Pkid,
        prev_coin: CoinEntry,
        balance_key: BalanceKey,
        prev_balance: Option<BalanceEntry>,
    },

    DaoCoinTransfer {
        creator_pkid: Pkid,
        prev_coin: CoinEntry,
        sender_balance_key: BalanceKey,
        prev_sender_balance: Option<BalanceEntry>,
        receiver_balance_key: BalanceKey,
        prev_receiver_balance: Option<BalanceEntry>,
    },

    CreateNft {
        post_hash: PostHash,
        num_copies: u64,
        prev_post: PostEntry,
    },

    UpdateNft {
        nft_key: NftKey,
        prev_nft: NftEntry,
        prev_post: PostEntry,
        /// Bids deleted when the serial was taken off sale.
        deleted_bids: Vec<NftBidEntry>,
    },

    NftBid {
        bid_key: NftBidKey,
        prev_bid: Option<NftBidEntry>,
        /// Set when a buy-now bid executed the accept flow inline.
        buy_now: Option<Box<AcceptedBidUndo>>,
    },

    AcceptNftBid(Box<AcceptedBidUndo>),

    NftTransfer {
        nft_key: NftKey,
        prev_nft: NftEntry,
    },

    AcceptNftTransfer {
        nft_key: NftKey,
        prev_nft: NftEntry,
    },

    BurnNft {
        nft_key: NftKey,
        prev_nft: NftEntry,
        prev_post: PostEntry,
    },

    AuthorizeDerivedKey {
        key: DerivedKeyMapKey,
        prev_entry: Option<DerivedKeyEntry>,
    },
}

impl UndoOp {
    /// Number of UTXO spends this operation represents, for block-level
    /// reconciliation (bidder inputs count as spends).
    pub fn spend_count(&self) -> usize {
        match self {
            Self::SpendUtxo { .. } => 1,
            Self::NftBid { buy_now, .. } => {
                buy_now.as_ref().map_or(0, |b| b.spent_bidder_utxos.len())
            }
            Self::AcceptNftBid(payload) => payload.spent_bidder_utxos.len(),
            _ => 0,
        }
    }

    /// Number of UTXO additions this operation represents (implicit payment
    /// outputs count as additions).
    pub fn add_count(&self) -> usize {
        match self {
            Self::AddUtxo { .. } => 1,
            Self::NftBid { buy_now, .. } => {
                buy_now.as_ref().map_or(0, |b| b.payment_utxo_keys.len())
            }
            Self::AcceptNftBid(payload) => payload.payment_utxo_keys.len(),
            _ => 0,
        }
    }
}
