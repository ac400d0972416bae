//! The ledger view: an in-memory overlay over the backing store.
//!
//! Reads check the overlay first and fall back to the store, caching what
//! they find. Mutations only ever touch the overlay; deletions are soft
//! (a presence flag flips) so disconnect can re-materialize them and flush
//! can translate them into store deletions. The view is single-threaded:
//! within one connect or disconnect call it is the exclusive mutator.

use crate::error::ViewError;
use crate::undo::UndoOp;
use plaza_store::{ChainStore, FlushBatch};
use plaza_types::{
    BalanceEntry, BalanceKey, BlockHash, ChainParams, DerivedKeyEntry, DerivedKeyMapKey,
    DiamondEntry, DiamondKey, FollowEntry, FollowKey, ForbiddenPubKeyEntry, GlobalParamsEntry,
    LikeEntry, LikeKey, MessageEntry, MessageKey, MessagingGroupEntry, MessagingGroupKey,
    NftBidEntry, NftBidKey, NftEntry, NftKey, PkidEntry, Pkid, PostEntry, PostHash, ProfileEntry,
    PublicKey, RepostEntry, RepostKey, TxnHash, UsernameKey, UtxoEntry, UtxoKey,
};
use std::collections::HashMap;
use std::sync::Arc;

/// The in-memory view of chain state.
///
/// Cloning produces a deep copy: the overlay maps are independent and only
/// the read-only store handle is shared. Two clones diverge freely.
#[derive(Clone)]
pub struct LedgerView {
    pub(crate) store: Arc<dyn ChainStore>,
    pub(crate) params: ChainParams,

    /// The block hash this view's state reflects.
    pub(crate) tip_hash: BlockHash,

    // UTXO set and native balances.
    pub(crate) num_utxo_entries: u64,
    pub(crate) utxos: HashMap<UtxoKey, UtxoEntry>,
    pub(crate) balances: HashMap<PublicKey, u64>,

    // Cross-chain burn bookkeeping and global params.
    pub(crate) nanos_purchased: u64,
    /// Value false marks a burn id removed by a disconnect.
    pub(crate) burn_txids: HashMap<TxnHash, bool>,
    pub(crate) global_params: GlobalParamsEntry,
    pub(crate) forbidden_pub_keys: HashMap<PublicKey, ForbiddenPubKeyEntry>,

    // Messages.
    pub(crate) messages: HashMap<MessageKey, MessageEntry>,
    pub(crate) messaging_groups: HashMap<MessagingGroupKey, MessagingGroupEntry>,

    // Social relations.
    pub(crate) follows: HashMap<FollowKey, FollowEntry>,
    pub(crate) likes: HashMap<LikeKey, LikeEntry>,
    pub(crate) reposts: HashMap<RepostKey, RepostEntry>,
    pub(crate) diamonds: HashMap<DiamondKey, DiamondEntry>,

    // Posts.
    pub(crate) posts: HashMap<PostHash, PostEntry>,

    // Identity and profiles. The username map mirrors the profile map and
    // the two are always updated together.
    pub(crate) pkids_by_public_key: HashMap<PublicKey, PkidEntry>,
    pub(crate) public_keys_by_pkid: HashMap<Pkid, PkidEntry>,
    pub(crate) profiles: HashMap<Pkid, ProfileEntry>,
    pub(crate) profiles_by_username: HashMap<UsernameKey, ProfileEntry>,

    // Coin balances.
    pub(crate) creator_coin_balances: HashMap<BalanceKey, BalanceEntry>,
    pub(crate) dao_coin_balances: HashMap<BalanceKey, BalanceEntry>,

    // NFTs.
    pub(crate) nfts: HashMap<NftKey, NftEntry>,
    pub(crate) nft_bids: HashMap<NftBidKey, NftBidEntry>,
    pub(crate) accepted_bid_histories: HashMap<NftKey, Vec<NftBidEntry>>,

    // Derived keys.
    pub(crate) derived_keys: HashMap<DerivedKeyMapKey, DerivedKeyEntry>,
}

impl LedgerView {
    /// Build a fresh view on top of a store.
    pub fn new(store: Arc<dyn ChainStore>, params: ChainParams) -> Result<Self, ViewError> {
        let tip_hash = store.fetch_tip_hash()?.unwrap_or(BlockHash::ZERO);
        let num_utxo_entries = store.utxo_count()?;
        let nanos_purchased = store.fetch_nanos_purchased()?;
        let global_params = store.fetch_global_params()?.unwrap_or_default();

        Ok(Self {
            store,
            params,
            tip_hash,
            num_utxo_entries,
            utxos: HashMap::new(),
            balances: HashMap::new(),
            nanos_purchased,
            burn_txids: HashMap::new(),
            global_params,
            forbidden_pub_keys: HashMap::new(),
            messages: HashMap::new(),
            messaging_groups: HashMap::new(),
            follows: HashMap::new(),
            likes: HashMap::new(),
            reposts: HashMap::new(),
            diamonds: HashMap::new(),
            posts: HashMap::new(),
            pkids_by_public_key: HashMap::new(),
            public_keys_by_pkid: HashMap::new(),
            profiles: HashMap::new(),
            profiles_by_username: HashMap::new(),
            creator_coin_balances: HashMap::new(),
            dao_coin_balances: HashMap::new(),
            nfts: HashMap::new(),
            nft_bids: HashMap::new(),
            accepted_bid_histories: HashMap::new(),
            derived_keys: HashMap::new(),
        })
    }

    pub fn tip_hash(&self) -> BlockHash {
        self.tip_hash
    }

    pub fn params(&self) -> &ChainParams {
        &self.params
    }

    pub fn global_params(&self) -> &GlobalParamsEntry {
        &self.global_params
    }

    pub fn num_utxo_entries(&self) -> u64 {
        self.num_utxo_entries
    }

    // ── UTXO overlay ────────────────────────────────────────────────────

    /// The entry for a key, tombstones included. Callers check `spent`.
    pub fn utxo_entry(&mut self, key: &UtxoKey) -> Result<Option<UtxoEntry>, ViewError> {
        if let Some(entry) = self.utxos.get(key) {
            return Ok(Some(entry.clone()));
        }
        match self.store.fetch_utxo(key)? {
            Some(entry) => {
                // The store only holds unspent entries; cache for later.
                self.utxos.insert(*key, entry.clone());
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    /// Native-token balance for a key, overlay-adjusted.
    pub fn balance_nanos(&mut self, public_key: &PublicKey) -> Result<u64, ViewError> {
        if let Some(balance) = self.balances.get(public_key) {
            return Ok(*balance);
        }
        let balance = self.store.fetch_balance(public_key)?;
        self.balances.insert(*public_key, balance);
        Ok(balance)
    }

    fn credit_balance(&mut self, public_key: &PublicKey, amount: u64) -> Result<(), ViewError> {
        let balance = self.balance_nanos(public_key)?;
        let updated = balance
            .checked_add(amount)
            .ok_or_else(|| ViewError::Corruption("balance overflow on credit".into()))?;
        self.balances.insert(*public_key, updated);
        Ok(())
    }

    fn debit_balance(&mut self, public_key: &PublicKey, amount: u64) -> Result<(), ViewError> {
        let balance = self.balance_nanos(public_key)?;
        let updated = balance.checked_sub(amount).ok_or_else(|| {
            ViewError::Corruption("balance underflow on debit; balance cache out of sync".into())
        })?;
        self.balances.insert(*public_key, updated);
        Ok(())
    }

    /// Spend an output, returning the undo record. The caller has already
    /// validated existence, spentness, and maturity; violations here mean
    /// the overlay is inconsistent.
    pub(crate) fn spend_utxo(&mut self, key: &UtxoKey) -> Result<UndoOp, ViewError> {
        let entry = self
            .utxo_entry(key)?
            .ok_or_else(|| ViewError::Corruption(format!("spending nonexistent utxo {key:?}")))?;
        if entry.spent {
            return Err(ViewError::Corruption(format!(
                "spending already-spent utxo {key:?}"
            )));
        }

        let mut tombstone = entry.clone();
        tombstone.spent = true;
        self.utxos.insert(*key, tombstone);
        self.num_utxo_entries = self.num_utxo_entries.saturating_sub(1);
        self.debit_balance(&entry.public_key, entry.amount_nanos)?;

        // The saved entry still has every field from before the spend,
        // which is exactly what reversal needs.
        Ok(UndoOp::SpendUtxo { key: *key, entry })
    }

    /// Re-materialize a spent output from its undo record.
    pub(crate) fn unspend_utxo(&mut self, key: &UtxoKey, entry: &UtxoEntry) -> Result<(), ViewError> {
        let mut restored = entry.clone();
        restored.spent = false;
        self.utxos.insert(*key, restored);
        self.num_utxo_entries += 1;
        self.credit_balance(&entry.public_key, entry.amount_nanos)
    }

    /// Add a fresh output, returning the undo record.
    ///
    /// Overwriting a tombstone left by a disconnected transaction is fine:
    /// the flush that would have deleted the tombstone instead writes the
    /// new entry, which is the outcome both operations want.
    pub(crate) fn add_utxo(&mut self, key: &UtxoKey, entry: UtxoEntry) -> Result<UndoOp, ViewError> {
        if entry.spent {
            return Err(ViewError::Corruption(
                "adding a utxo entry marked spent".into(),
            ));
        }
        self.utxos.insert(*key, entry.clone());
        self.num_utxo_entries += 1;
        self.credit_balance(&entry.public_key, entry.amount_nanos)?;
        Ok(UndoOp::AddUtxo { key: *key, entry })
    }

    /// Reverse an `add_utxo` by tombstoning the entry.
    pub(crate) fn unadd_utxo(&mut self, key: &UtxoKey) -> Result<(), ViewError> {
        let entry = self
            .utxo_entry(key)?
            .ok_or_else(|| ViewError::Corruption(format!("unadding nonexistent utxo {key:?}")))?;
        if entry.spent {
            return Err(ViewError::Corruption(format!(
                "unadding already-spent utxo {key:?}"
            )));
        }
        let mut tombstone = entry.clone();
        tombstone.spent = true;
        self.utxos.insert(*key, tombstone);
        self.num_utxo_entries = self.num_utxo_entries.saturating_sub(1);
        self.debit_balance(&entry.public_key, entry.amount_nanos)
    }

    // ── Identity ────────────────────────────────────────────────────────

    /// The stable identifier for a public key, minting the identity mapping
    /// on first sight.
    pub fn pkid_for_public_key(&mut self, public_key: &PublicKey) -> Result<PkidEntry, ViewError> {
        if let Some(entry) = self.pkids_by_public_key.get(public_key) {
            return Ok(entry.clone());
        }
        if let Some(entry) = self.store.fetch_pkid_for_public_key(public_key)? {
            self.pkids_by_public_key.insert(*public_key, entry.clone());
            return Ok(entry);
        }
        let entry = PkidEntry {
            pkid: Pkid::from_public_key(public_key),
            public_key: *public_key,
            is_deleted: false,
        };
        self.set_pkid_mappings(&entry);
        Ok(entry)
    }

    /// The public key currently bound to a stable identifier.
    pub fn public_key_for_pkid(&mut self, pkid: &Pkid) -> Result<PublicKey, ViewError> {
        if let Some(entry) = self.public_keys_by_pkid.get(pkid) {
            return Ok(entry.public_key);
        }
        if let Some(entry) = self.store.fetch_public_key_for_pkid(pkid)? {
            self.public_keys_by_pkid.insert(*pkid, entry.clone());
            return Ok(entry.public_key);
        }
        // An identifier that has never been swapped is its creation key.
        Ok(PublicKey::new(pkid.0))
    }

    pub(crate) fn set_pkid_mappings(&mut self, entry: &PkidEntry) {
        self.pkids_by_public_key
            .insert(entry.public_key, entry.clone());
        self.public_keys_by_pkid.insert(entry.pkid, entry.clone());
    }

    // ── Generic overlay getters (overlay, then store) ───────────────────

    pub fn profile_for_pkid(&mut self, pkid: &Pkid) -> Result<Option<ProfileEntry>, ViewError> {
        if let Some(entry) = self.profiles.get(pkid) {
            return Ok(Some(entry.clone()));
        }
        match self.store.fetch_profile_by_pkid(pkid)? {
            Some(entry) => {
                self.profiles.insert(*pkid, entry.clone());
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    /// Profile lookup through the current key binding.
    pub fn profile_for_public_key(
        &mut self,
        public_key: &PublicKey,
    ) -> Result<Option<ProfileEntry>, ViewError> {
        let pkid = self.pkid_for_public_key(public_key)?.pkid;
        self.profile_for_pkid(&pkid)
    }

    pub fn profile_for_username(
        &mut self,
        username: &UsernameKey,
    ) -> Result<Option<ProfileEntry>, ViewError> {
        if let Some(entry) = self.profiles_by_username.get(username) {
            return Ok(Some(entry.clone()));
        }
        match self.store.fetch_profile_by_username(username)? {
            Some(entry) => {
                self.profiles_by_username.insert(*username, entry.clone());
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    /// Set a profile under both its PKID and its username key.
    pub(crate) fn set_profile(&mut self, pkid: Pkid, entry: ProfileEntry) {
        let username_key = UsernameKey::from_username(&entry.username);
        self.profiles.insert(pkid, entry.clone());
        self.profiles_by_username.insert(username_key, entry);
    }

    pub(crate) fn delete_profile(&mut self, pkid: Pkid, entry: &ProfileEntry) {
        let mut tombstone = entry.clone();
        tombstone.is_deleted = true;
        self.set_profile(pkid, tombstone);
    }

    pub fn post_entry(&mut self, post_hash: &PostHash) -> Result<Option<PostEntry>, ViewError> {
        if let Some(entry) = self.posts.get(post_hash) {
            return Ok(Some(entry.clone()));
        }
        match self.store.fetch_post(post_hash)? {
            Some(entry) => {
                self.posts.insert(*post_hash, entry.clone());
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    pub(crate) fn set_post(&mut self, entry: PostEntry) {
        self.posts.insert(entry.post_hash, entry);
    }

    pub(crate) fn delete_post(&mut self, entry: &PostEntry) {
        let mut tombstone = entry.clone();
        tombstone.is_deleted = true;
        self.set_post(tombstone);
    }

    /// Whether a poster already has a live post at a timestamp, in the
    /// overlay or the store.
    pub fn post_exists_at_timestamp(
        &mut self,
        poster: &PublicKey,
        timestamp_nanos: u64,
    ) -> Result<bool, ViewError> {
        let in_overlay = self.posts.values().any(|post| {
            !post.is_deleted
                && post.poster_public_key == *poster
                && post.timestamp_nanos == timestamp_nanos
        });
        if in_overlay {
            return Ok(true);
        }
        Ok(self.store.post_exists_at_timestamp(poster, timestamp_nanos)?)
    }

    pub fn like_entry(&mut self, key: &LikeKey) -> Result<Option<LikeEntry>, ViewError> {
        if let Some(entry) = self.likes.get(key) {
            return Ok(Some(entry.clone()));
        }
        match self.store.fetch_like(key)? {
            Some(entry) => {
                self.likes.insert(*key, entry.clone());
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    pub fn follow_entry(&mut self, key: &FollowKey) -> Result<Option<FollowEntry>, ViewError> {
        if let Some(entry) = self.follows.get(key) {
            return Ok(Some(entry.clone()));
        }
        match self.store.fetch_follow(key)? {
            Some(entry) => {
                self.follows.insert(*key, entry.clone());
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    pub fn repost_entry(&mut self, key: &RepostKey) -> Result<Option<RepostEntry>, ViewError> {
        if let Some(entry) = self.reposts.get(key) {
            return Ok(Some(entry.clone()));
        }
        match self.store.fetch_repost(key)? {
            Some(entry) => {
                self.reposts.insert(*key, entry.clone());
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    pub fn diamond_entry(&mut self, key: &DiamondKey) -> Result<Option<DiamondEntry>, ViewError> {
        if let Some(entry) = self.diamonds.get(key) {
            return Ok(Some(entry.clone()));
        }
        match self.store.fetch_diamond(key)? {
            Some(entry) => {
                self.diamonds.insert(*key, entry.clone());
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    pub fn nft_entry(&mut self, key: &NftKey) -> Result<Option<NftEntry>, ViewError> {
        if let Some(entry) = self.nfts.get(key) {
            return Ok(Some(entry.clone()));
        }
        match self.store.fetch_nft(key)? {
            Some(entry) => {
                self.nfts.insert(*key, entry.clone());
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    pub fn nft_bid_entry(&mut self, key: &NftBidKey) -> Result<Option<NftBidEntry>, ViewError> {
        if let Some(entry) = self.nft_bids.get(key) {
            return Ok(Some(entry.clone()));
        }
        match self.store.fetch_nft_bid(key)? {
            Some(entry) => {
                self.nft_bids.insert(*key, entry.clone());
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    /// All live bids for a serial, merged across overlay and store, in
    /// bidder order so iteration is deterministic.
    pub fn bids_for_serial(
        &mut self,
        post_hash: &PostHash,
        serial_number: u64,
    ) -> Result<Vec<NftBidEntry>, ViewError> {
        // Pull the store's bids into the overlay first so there is a single
        // source of truth to filter.
        for bid in self.store.fetch_bids_for_serial(post_hash, serial_number)? {
            let key = NftBidKey {
                bidder_pkid: bid.bidder_pkid,
                post_hash: *post_hash,
                serial_number,
            };
            self.nft_bids.entry(key).or_insert(bid);
        }
        let mut bids: Vec<NftBidEntry> = self
            .nft_bids
            .values()
            .filter(|bid| {
                !bid.is_deleted
                    && bid.post_hash == *post_hash
                    && bid.serial_number == serial_number
            })
            .cloned()
            .collect();
        bids.sort_by(|a, b| a.bidder_pkid.cmp(&b.bidder_pkid));
        Ok(bids)
    }

    pub fn accepted_bid_history(&mut self, key: &NftKey) -> Result<Vec<NftBidEntry>, ViewError> {
        if let Some(history) = self.accepted_bid_histories.get(key) {
            return Ok(history.clone());
        }
        let history = self.store.fetch_accepted_bid_history(key)?;
        self.accepted_bid_histories.insert(*key, history.clone());
        Ok(history)
    }

    pub fn message_entry(&mut self, key: &MessageKey) -> Result<Option<MessageEntry>, ViewError> {
        if let Some(entry) = self.messages.get(key) {
            return Ok(Some(entry.clone()));
        }
        match self.store.fetch_message(key)? {
            Some(entry) => {
                self.messages.insert(*key, entry.clone());
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    pub fn messaging_group_entry(
        &mut self,
        key: &MessagingGroupKey,
    ) -> Result<Option<MessagingGroupEntry>, ViewError> {
        if let Some(entry) = self.messaging_groups.get(key) {
            return Ok(Some(entry.clone()));
        }
        match self.store.fetch_messaging_group(key)? {
            Some(entry) => {
                self.messaging_groups.insert(*key, entry.clone());
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    pub fn derived_key_entry(
        &mut self,
        key: &DerivedKeyMapKey,
    ) -> Result<Option<DerivedKeyEntry>, ViewError> {
        if let Some(entry) = self.derived_keys.get(key) {
            return Ok(Some(entry.clone()));
        }
        match self.store.fetch_derived_key(key)? {
            Some(entry) => {
                self.derived_keys.insert(*key, entry.clone());
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    pub fn creator_coin_balance(
        &mut self,
        key: &BalanceKey,
    ) -> Result<Option<BalanceEntry>, ViewError> {
        if let Some(entry) = self.creator_coin_balances.get(key) {
            return Ok(Some(entry.clone()));
        }
        match self.store.fetch_creator_coin_balance(key)? {
            Some(entry) => {
                self.creator_coin_balances.insert(*key, entry.clone());
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    pub fn dao_coin_balance(
        &mut self,
        key: &BalanceKey,
    ) -> Result<Option<BalanceEntry>, ViewError> {
        if let Some(entry) = self.dao_coin_balances.get(key) {
            return Ok(Some(entry.clone()));
        }
        match self.store.fetch_dao_coin_balance(key)? {
            Some(entry) => {
                self.dao_coin_balances.insert(*key, entry.clone());
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    pub fn forbidden_pub_key_entry(
        &mut self,
        public_key: &PublicKey,
    ) -> Result<Option<ForbiddenPubKeyEntry>, ViewError> {
        if let Some(entry) = self.forbidden_pub_keys.get(public_key) {
            return Ok(Some(entry.clone()));
        }
        match self.store.fetch_forbidden_pub_key(public_key)? {
            Some(entry) => {
                self.forbidden_pub_keys.insert(*public_key, entry.clone());
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    pub fn burn_txid_exists(&mut self, txid: &TxnHash) -> Result<bool, ViewError> {
        if let Some(present) = self.burn_txids.get(txid) {
            return Ok(*present);
        }
        Ok(self.store.burn_txid_exists(txid)?)
    }

    // ── Overlay setters ─────────────────────────────────────────────────
    //
    // Deletion is a soft flip of `is_deleted` on a copy of the entry: the
    // mapping stays present so flush turns it into a store deletion and
    // disconnect can re-materialize it.

    pub(crate) fn set_like(&mut self, entry: LikeEntry) {
        let key = LikeKey {
            liker_public_key: entry.liker_public_key,
            liked_post_hash: entry.liked_post_hash,
        };
        self.likes.insert(key, entry);
    }

    pub(crate) fn delete_like(&mut self, entry: &LikeEntry) {
        let mut tombstone = entry.clone();
        tombstone.is_deleted = true;
        self.set_like(tombstone);
    }

    pub(crate) fn set_follow(&mut self, entry: FollowEntry) {
        let key = FollowKey {
            follower_pkid: entry.follower_pkid,
            followed_pkid: entry.followed_pkid,
        };
        self.follows.insert(key, entry);
    }

    pub(crate) fn delete_follow(&mut self, entry: &FollowEntry) {
        let mut tombstone = entry.clone();
        tombstone.is_deleted = true;
        self.set_follow(tombstone);
    }

    pub(crate) fn set_repost(&mut self, entry: RepostEntry) {
        let key = RepostKey {
            reposter_public_key: entry.reposter_public_key,
            reposted_post_hash: entry.reposted_post_hash,
        };
        self.reposts.insert(key, entry);
    }

    pub(crate) fn delete_repost(&mut self, entry: &RepostEntry) {
        let mut tombstone = entry.clone();
        tombstone.is_deleted = true;
        self.set_repost(tombstone);
    }

    pub(crate) fn set_diamond(&mut self, entry: DiamondEntry) {
        let key = DiamondKey {
            sender_pkid: entry.sender_pkid,
            receiver_pkid: entry.receiver_pkid,
            diamond_post_hash: entry.diamond_post_hash,
        };
        self.diamonds.insert(key, entry);
    }

    pub(crate) fn delete_diamond(&mut self, entry: &DiamondEntry) {
        let mut tombstone = entry.clone();
        tombstone.is_deleted = true;
        self.set_diamond(tombstone);
    }

    pub(crate) fn set_nft(&mut self, entry: NftEntry) {
        let key = NftKey::new(entry.post_hash, entry.serial_number);
        self.nfts.insert(key, entry);
    }

    pub(crate) fn delete_nft(&mut self, entry: &NftEntry) {
        let mut tombstone = entry.clone();
        tombstone.is_deleted = true;
        self.set_nft(tombstone);
    }

    pub(crate) fn set_nft_bid(&mut self, entry: NftBidEntry) {
        let key = NftBidKey {
            bidder_pkid: entry.bidder_pkid,
            post_hash: entry.post_hash,
            serial_number: entry.serial_number,
        };
        self.nft_bids.insert(key, entry);
    }

    pub(crate) fn delete_nft_bid(&mut self, entry: &NftBidEntry) {
        let mut tombstone = entry.clone();
        tombstone.is_deleted = true;
        self.set_nft_bid(tombstone);
    }

    pub(crate) fn set_accepted_bid_history(&mut self, key: NftKey, history: Vec<NftBidEntry>) {
        self.accepted_bid_histories.insert(key, history);
    }

    pub(crate) fn set_message(&mut self, key: MessageKey, entry: MessageEntry) {
        self.messages.insert(key, entry);
    }

    pub(crate) fn delete_message(&mut self, key: MessageKey, entry: &MessageEntry) {
        let mut tombstone = entry.clone();
        tombstone.is_deleted = true;
        self.messages.insert(key, tombstone);
    }

    pub(crate) fn set_messaging_group(&mut self, entry: MessagingGroupEntry) {
        let key = MessagingGroupKey {
            owner_public_key: entry.group_owner_public_key,
            group_key_name: entry.messaging_group_key_name,
        };
        self.messaging_groups.insert(key, entry);
    }

    pub(crate) fn delete_messaging_group(&mut self, entry: &MessagingGroupEntry) {
        let mut tombstone = entry.clone();
        tombstone.is_deleted = true;
        self.set_messaging_group(tombstone);
    }

    pub(crate) fn set_derived_key(&mut self, entry: DerivedKeyEntry) {
        let key = DerivedKeyMapKey::new(entry.owner_public_key, entry.derived_public_key);
        self.derived_keys.insert(key, entry);
    }

    pub(crate) fn delete_derived_key(&mut self, entry: &DerivedKeyEntry) {
        let mut tombstone = entry.clone();
        tombstone.is_deleted = true;
        self.set_derived_key(tombstone);
    }

    pub(crate) fn set_creator_coin_balance(&mut self, entry: BalanceEntry) {
        let key = BalanceKey::new(entry.holder_pkid, entry.creator_pkid);
        self.creator_coin_balances.insert(key, entry);
    }

    pub(crate) fn delete_creator_coin_balance(&mut self, entry: &BalanceEntry) {
        let mut tombstone = entry.clone();
        tombstone.is_deleted = true;
        self.set_creator_coin_balance(tombstone);
    }

    pub(crate) fn set_dao_coin_balance(&mut self, entry: BalanceEntry) {
        let key = BalanceKey::new(entry.holder_pkid, entry.creator_pkid);
        self.dao_coin_balances.insert(key, entry);
    }

    pub(crate) fn delete_dao_coin_balance(&mut self, entry: &BalanceEntry) {
        let mut tombstone = entry.clone();
        tombstone.is_deleted = true;
        self.set_dao_coin_balance(tombstone);
    }

    pub(crate) fn set_forbidden_pub_key(&mut self, entry: ForbiddenPubKeyEntry) {
        self.forbidden_pub_keys.insert(entry.public_key, entry);
    }

    // ── Flush ───────────────────────────────────────────────────────────

    /// Push the whole overlay down to the store atomically and reset the
    /// overlay so its semantics match the store bit-for-bit.
    pub fn flush(&mut self) -> Result<(), ViewError> {
        let mut batch = FlushBatch::default();

        for (key, entry) in &self.utxos {
            if entry.spent {
                batch.utxos.push((*key, None));
            } else {
                batch.utxos.push((*key, Some(entry.clone())));
            }
        }
        for (key, entry) in &self.pkids_by_public_key {
            let value = (!entry.is_deleted).then(|| entry.clone());
            batch.pkids_by_public_key.push((*key, value));
        }
        for (key, entry) in &self.public_keys_by_pkid {
            let value = (!entry.is_deleted).then(|| entry.clone());
            batch.public_keys_by_pkid.push((*key, value));
        }
        for (pkid, entry) in &self.profiles {
            let value = (!entry.is_deleted).then(|| entry.clone());
            batch.profiles.push((*pkid, value));
        }
        for (hash, entry) in &self.posts {
            let value = (!entry.is_deleted).then(|| entry.clone());
            batch.posts.push((*hash, value));
        }
        for (key, entry) in &self.likes {
            let value = (!entry.is_deleted).then(|| entry.clone());
            batch.likes.push((*key, value));
        }
        for (key, entry) in &self.follows {
            let value = (!entry.is_deleted).then(|| entry.clone());
            batch.follows.push((*key, value));
        }
        for (key, entry) in &self.reposts {
            let value = (!entry.is_deleted).then(|| entry.clone());
            batch.reposts.push((*key, value));
        }
        for (key, entry) in &self.diamonds {
            let value = (!entry.is_deleted).then(|| entry.clone());
            batch.diamonds.push((*key, value));
        }
        for (key, entry) in &self.nfts {
            let value = (!entry.is_deleted).then(|| entry.clone());
            batch.nfts.push((*key, value));
        }
        for (key, entry) in &self.nft_bids {
            let value = (!entry.is_deleted).then(|| entry.clone());
            batch.nft_bids.push((*key, value));
        }
        for (key, history) in &self.accepted_bid_histories {
            batch.accepted_bid_histories.push((*key, history.clone()));
        }
        for (key, entry) in &self.messages {
            let value = (!entry.is_deleted).then(|| entry.clone());
            batch.messages.push((*key, value));
        }
        for (key, entry) in &self.messaging_groups {
            let value = (!entry.is_deleted).then(|| entry.clone());
            batch.messaging_groups.push((*key, value));
        }
        for (key, entry) in &self.derived_keys {
            let value = (!entry.is_deleted).then(|| entry.clone());
            batch.derived_keys.push((*key, value));
        }
        for (key, entry) in &self.creator_coin_balances {
            let value = (!entry.is_deleted).then(|| entry.clone());
            batch.creator_coin_balances.push((*key, value));
        }
        for (key, entry) in &self.dao_coin_balances {
            let value = (!entry.is_deleted).then(|| entry.clone());
            batch.dao_coin_balances.push((*key, value));
        }
        for (key, entry) in &self.forbidden_pub_keys {
            let value = (!entry.is_deleted).then(|| entry.clone());
            batch.forbidden_pub_keys.push((*key, value));
        }
        for (txid, present) in &self.burn_txids {
            batch.burn_txids.push((*txid, *present));
        }
        batch.global_params = Some(self.global_params.clone());
        batch.nanos_purchased = Some(self.nanos_purchased);
        batch.tip_hash = Some(self.tip_hash);

        self.store.flush(batch)?;
        self.reset_overlay()?;
        Ok(())
    }

    /// Clear the overlay and re-read the store-backed scalars, as after a
    /// flush.
    fn reset_overlay(&mut self) -> Result<(), ViewError> {
        self.utxos.clear();
        self.balances.clear();
        self.burn_txids.clear();
        self.forbidden_pub_keys.clear();
        self.messages.clear();
        self.messaging_groups.clear();
        self.follows.clear();
        self.likes.clear();
        self.reposts.clear();
        self.diamonds.clear();
        self.posts.clear();
        self.pkids_by_public_key.clear();
        self.public_keys_by_pkid.clear();
        self.profiles.clear();
        self.profiles_by_username.clear();
        self.creator_coin_balances.clear();
        self.dao_coin_balances.clear();
        self.nfts.clear();
        self.nft_bids.clear();
        self.accepted_bid_histories.clear();
        self.derived_keys.clear();

        self.num_utxo_entries = self.store.utxo_count()?;
        self.nanos_purchased = self.store.fetch_nanos_purchased()?;
        self.global_params = self.store.fetch_global_params()?.unwrap_or_default();
        Ok(())
    }
}
