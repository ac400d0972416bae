//! In-memory storage backend, used by tests and tooling.

use crate::{
    ChainStore, DerivedKeyStore, FlushBatch, MessageStore, MetaStore, NftStore, PostStore,
    ProfileStore, SocialStore, StoreError, UtxoStore,
};
use plaza_types::{
    BalanceEntry, BalanceKey, BlockHash, DerivedKeyEntry, DerivedKeyMapKey, DiamondEntry,
    DiamondKey, FollowEntry, FollowKey, ForbiddenPubKeyEntry, GlobalParamsEntry, LikeEntry,
    LikeKey, MessageEntry, MessageKey, MessagingGroupEntry, MessagingGroupKey, NftBidEntry,
    NftBidKey, NftEntry, NftKey, PkidEntry, Pkid, PostEntry, PostHash, PublicKey, RepostEntry,
    RepostKey, TxnHash, UsernameKey, UtxoEntry, UtxoKey,
};
use plaza_types::ProfileEntry;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

#[derive(Default)]
struct Inner {
    utxos: HashMap<UtxoKey, UtxoEntry>,
    balances: HashMap<PublicKey, u64>,
    pkids_by_public_key: HashMap<PublicKey, PkidEntry>,
    public_keys_by_pkid: HashMap<Pkid, PkidEntry>,
    profiles: HashMap<Pkid, ProfileEntry>,
    profiles_by_username: HashMap<UsernameKey, Pkid>,
    posts: HashMap<PostHash, PostEntry>,
    posts_by_poster_timestamp: HashSet<(PublicKey, u64)>,
    likes: HashMap<LikeKey, LikeEntry>,
    follows: HashMap<FollowKey, FollowEntry>,
    reposts: HashMap<RepostKey, RepostEntry>,
    diamonds: HashMap<DiamondKey, DiamondEntry>,
    nfts: HashMap<NftKey, NftEntry>,
    nft_bids: HashMap<NftBidKey, NftBidEntry>,
    accepted_bid_histories: HashMap<NftKey, Vec<NftBidEntry>>,
    messages: HashMap<MessageKey, MessageEntry>,
    messaging_groups: HashMap<MessagingGroupKey, MessagingGroupEntry>,
    derived_keys: HashMap<DerivedKeyMapKey, DerivedKeyEntry>,
    creator_coin_balances: HashMap<BalanceKey, BalanceEntry>,
    dao_coin_balances: HashMap<BalanceKey, BalanceEntry>,
    forbidden_pub_keys: HashMap<PublicKey, ForbiddenPubKeyEntry>,
    burn_txids: HashSet<TxnHash>,
    global_params: Option<GlobalParamsEntry>,
    nanos_purchased: u64,
    tip_hash: Option<BlockHash>,
}

/// An in-memory `ChainStore`.
pub struct MemStore {
    inner: RwLock<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_poisoned<T>(_e: T) -> StoreError {
    StoreError::Backend("store lock poisoned".into())
}

impl UtxoStore for MemStore {
    fn fetch_utxo(&self, key: &UtxoKey) -> Result<Option<UtxoEntry>, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.utxos.get(key).cloned())
    }

    fn fetch_balance(&self, public_key: &PublicKey) -> Result<u64, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.balances.get(public_key).copied().unwrap_or(0))
    }

    fn utxo_count(&self) -> Result<u64, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.utxos.len() as u64)
    }
}

impl ProfileStore for MemStore {
    fn fetch_pkid_for_public_key(
        &self,
        public_key: &PublicKey,
    ) -> Result<Option<PkidEntry>, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.pkids_by_public_key.get(public_key).cloned())
    }

    fn fetch_public_key_for_pkid(&self, pkid: &Pkid) -> Result<Option<PkidEntry>, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.public_keys_by_pkid.get(pkid).cloned())
    }

    fn fetch_profile_by_pkid(&self, pkid: &Pkid) -> Result<Option<ProfileEntry>, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.profiles.get(pkid).cloned())
    }

    fn fetch_profile_by_username(
        &self,
        username: &UsernameKey,
    ) -> Result<Option<ProfileEntry>, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner
            .profiles_by_username
            .get(username)
            .and_then(|pkid| inner.profiles.get(pkid))
            .cloned())
    }

    fn fetch_creator_coin_balance(
        &self,
        key: &BalanceKey,
    ) -> Result<Option<BalanceEntry>, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.creator_coin_balances.get(key).cloned())
    }

    fn fetch_dao_coin_balance(
        &self,
        key: &BalanceKey,
    ) -> Result<Option<BalanceEntry>, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.dao_coin_balances.get(key).cloned())
    }
}

impl PostStore for MemStore {
    fn fetch_post(&self, post_hash: &PostHash) -> Result<Option<PostEntry>, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.posts.get(post_hash).cloned())
    }

    fn post_exists_at_timestamp(
        &self,
        poster: &PublicKey,
        timestamp_nanos: u64,
    ) -> Result<bool, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner
            .posts_by_poster_timestamp
            .contains(&(*poster, timestamp_nanos)))
    }
}

impl SocialStore for MemStore {
    fn fetch_like(&self, key: &LikeKey) -> Result<Option<LikeEntry>, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.likes.get(key).cloned())
    }

    fn fetch_follow(&self, key: &FollowKey) -> Result<Option<FollowEntry>, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.follows.get(key).cloned())
    }

    fn fetch_repost(&self, key: &RepostKey) -> Result<Option<RepostEntry>, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.reposts.get(key).cloned())
    }

    fn fetch_diamond(&self, key: &DiamondKey) -> Result<Option<DiamondEntry>, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.diamonds.get(key).cloned())
    }
}

impl NftStore for MemStore {
    fn fetch_nft(&self, key: &NftKey) -> Result<Option<NftEntry>, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.nfts.get(key).cloned())
    }

    fn fetch_nft_bid(&self, key: &NftBidKey) -> Result<Option<NftBidEntry>, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.nft_bids.get(key).cloned())
    }

    fn fetch_bids_for_serial(
        &self,
        post_hash: &PostHash,
        serial_number: u64,
    ) -> Result<Vec<NftBidEntry>, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        let mut bids: Vec<NftBidEntry> = inner
            .nft_bids
            .values()
            .filter(|bid| bid.post_hash == *post_hash && bid.serial_number == serial_number)
            .cloned()
            .collect();
        bids.sort_by(|a, b| a.bidder_pkid.cmp(&b.bidder_pkid));
        Ok(bids)
    }

    fn fetch_accepted_bid_history(&self, key: &NftKey) -> Result<Vec<NftBidEntry>, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner
            .accepted_bid_histories
            .get(key)
            .cloned()
            .unwrap_or_default())
    }
}

impl MessageStore for MemStore {
    fn fetch_message(&self, key: &MessageKey) -> Result<Option<MessageEntry>, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.messages.get(key).cloned())
    }

    fn fetch_messaging_group(
        &self,
        key: &MessagingGroupKey,
    ) -> Result<Option<MessagingGroupEntry>, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.messaging_groups.get(key).cloned())
    }
}

impl DerivedKeyStore for MemStore {
    fn fetch_derived_key(
        &self,
        key: &DerivedKeyMapKey,
    ) -> Result<Option<DerivedKeyEntry>, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.derived_keys.get(key).cloned())
    }
}

impl MetaStore for MemStore {
    fn fetch_global_params(&self) -> Result<Option<GlobalParamsEntry>, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.global_params.clone())
    }

    fn fetch_nanos_purchased(&self) -> Result<u64, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.nanos_purchased)
    }

    fn burn_txid_exists(&self, txid: &TxnHash) -> Result<bool, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.burn_txids.contains(txid))
    }

    fn fetch_forbidden_pub_key(
        &self,
        public_key: &PublicKey,
    ) -> Result<Option<ForbiddenPubKeyEntry>, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.forbidden_pub_keys.get(public_key).cloned())
    }

    fn fetch_tip_hash(&self) -> Result<Option<BlockHash>, StoreError> {
        let inner = self.inner.read().map_err(lock_poisoned)?;
        Ok(inner.tip_hash)
    }
}

impl ChainStore for MemStore {
    fn flush(&self, batch: FlushBatch) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(lock_poisoned)?;

        for (key, entry) in batch.utxos {
            match entry {
                Some(entry) => {
                    // Maintain the balance index alongside the UTXO set.
                    if let Some(old) = inner.utxos.insert(key, entry.clone()) {
                        let balance = inner.balances.entry(old.public_key).or_default();
                        *balance = balance.saturating_sub(old.amount_nanos);
                    }
                    let balance = inner.balances.entry(entry.public_key).or_default();
                    *balance = balance.saturating_add(entry.amount_nanos);
                }
                None => {
                    if let Some(old) = inner.utxos.remove(&key) {
                        let balance = inner.balances.entry(old.public_key).or_default();
                        *balance = balance.saturating_sub(old.amount_nanos);
                    }
                }
            }
        }

        for (key, entry) in batch.pkids_by_public_key {
            match entry {
                Some(entry) => inner.pkids_by_public_key.insert(key, entry),
                None => inner.pkids_by_public_key.remove(&key),
            };
        }
        for (key, entry) in batch.public_keys_by_pkid {
            match entry {
                Some(entry) => inner.public_keys_by_pkid.insert(key, entry),
                None => inner.public_keys_by_pkid.remove(&key),
            };
        }

        for (pkid, entry) in batch.profiles {
            // Drop the old username index entry before inserting the new one.
            if let Some(old) = inner.profiles.get(&pkid) {
                let old_key = UsernameKey::from_username(&old.username);
                inner.profiles_by_username.remove(&old_key);
            }
            match entry {
                Some(entry) => {
                    inner
                        .profiles_by_username
                        .insert(UsernameKey::from_username(&entry.username), pkid);
                    inner.profiles.insert(pkid, entry);
                }
                None => {
                    inner.profiles.remove(&pkid);
                }
            }
        }

        for (hash, entry) in batch.posts {
            if let Some(old) = inner.posts.get(&hash) {
                let old_key = (old.poster_public_key, old.timestamp_nanos);
                inner.posts_by_poster_timestamp.remove(&old_key);
            }
            match entry {
                Some(entry) => {
                    inner
                        .posts_by_poster_timestamp
                        .insert((entry.poster_public_key, entry.timestamp_nanos));
                    inner.posts.insert(hash, entry);
                }
                None => {
                    inner.posts.remove(&hash);
                }
            }
        }

        for (key, entry) in batch.likes {
            match entry {
                Some(entry) => inner.likes.insert(key, entry),
                None => inner.likes.remove(&key),
            };
        }
        for (key, entry) in batch.follows {
            match entry {
                Some(entry) => inner.follows.insert(key, entry),
                None => inner.follows.remove(&key),
            };
        }
        for (key, entry) in batch.reposts {
            match entry {
                Some(entry) => inner.reposts.insert(key, entry),
                None => inner.reposts.remove(&key),
            };
        }
        for (key, entry) in batch.diamonds {
            match entry {
                Some(entry) => inner.diamonds.insert(key, entry),
                None => inner.diamonds.remove(&key),
            };
        }
        for (key, entry) in batch.nfts {
            match entry {
                Some(entry) => inner.nfts.insert(key, entry),
                None => inner.nfts.remove(&key),
            };
        }
        for (key, entry) in batch.nft_bids {
            match entry {
                Some(entry) => inner.nft_bids.insert(key, entry),
                None => inner.nft_bids.remove(&key),
            };
        }
        for (key, history) in batch.accepted_bid_histories {
            if history.is_empty() {
                inner.accepted_bid_histories.remove(&key);
            } else {
                inner.accepted_bid_histories.insert(key, history);
            }
        }
        for (key, entry) in batch.messages {
            match entry {
                Some(entry) => inner.messages.insert(key, entry),
                None => inner.messages.remove(&key),
            };
        }
        for (key, entry) in batch.messaging_groups {
            match entry {
                Some(entry) => inner.messaging_groups.insert(key, entry),
                None => inner.messaging_groups.remove(&key),
            };
        }
        for (key, entry) in batch.derived_keys {
            match entry {
                Some(entry) => inner.derived_keys.insert(key, entry),
                None => inner.derived_keys.remove(&key),
            };
        }
        for (key, entry) in batch.creator_coin_balances {
            match entry {
                Some(entry) => inner.creator_coin_balances.insert(key, entry),
                None => inner.creator_coin_balances.remove(&key),
            };
        }
        for (key, entry) in batch.dao_coin_balances {
            match entry {
                Some(entry) => inner.dao_coin_balances.insert(key, entry),
                None => inner.dao_coin_balances.remove(&key),
            };
        }
        for (key, entry) in batch.forbidden_pub_keys {
            match entry {
                Some(entry) => inner.forbidden_pub_keys.insert(key, entry),
                None => inner.forbidden_pub_keys.remove(&key),
            };
        }
        for (txid, add) in batch.burn_txids {
            if add {
                inner.burn_txids.insert(txid);
            } else {
                inner.burn_txids.remove(&txid);
            }
        }
        if let Some(params) = batch.global_params {
            inner.global_params = Some(params);
        }
        if let Some(nanos) = batch.nanos_purchased {
            inner.nanos_purchased = nanos;
        }
        if let Some(tip) = batch.tip_hash {
            inner.tip_hash = Some(tip);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plaza_types::UtxoType;

    fn utxo(amount: u64, owner: u8) -> UtxoEntry {
        UtxoEntry::new(amount, PublicKey::new([owner; 33]), 1, UtxoType::Output)
    }

    #[test]
    fn flush_utxos_maintains_balances() {
        let store = MemStore::new();
        let owner = PublicKey::new([1u8; 33]);
        let key_a = UtxoKey::new(TxnHash::new([1u8; 32]), 0);
        let key_b = UtxoKey::new(TxnHash::new([2u8; 32]), 0);

        store
            .flush(FlushBatch {
                utxos: vec![(key_a, Some(utxo(100, 1))), (key_b, Some(utxo(50, 1)))],
                ..FlushBatch::default()
            })
            .unwrap();
        assert_eq!(store.fetch_balance(&owner).unwrap(), 150);
        assert_eq!(store.utxo_count().unwrap(), 2);

        store
            .flush(FlushBatch {
                utxos: vec![(key_a, None)],
                ..FlushBatch::default()
            })
            .unwrap();
        assert_eq!(store.fetch_balance(&owner).unwrap(), 50);
        assert_eq!(store.utxo_count().unwrap(), 1);
    }

    #[test]
    fn profile_flush_maintains_username_index() {
        let store = MemStore::new();
        let pkid = Pkid::new([1u8; 33]);
        let mut profile = ProfileEntry {
            public_key: PublicKey::new([1u8; 33]),
            username: b"Alice".to_vec(),
            description: vec![],
            profile_pic: vec![],
            is_hidden: false,
            creator_coin: Default::default(),
            dao_coin: Default::default(),
            is_deleted: false,
        };
        store
            .flush(FlushBatch {
                profiles: vec![(pkid, Some(profile.clone()))],
                ..FlushBatch::default()
            })
            .unwrap();

        let fetched = store
            .fetch_profile_by_username(&UsernameKey::from_username(b"alice"))
            .unwrap();
        assert!(fetched.is_some());

        // Renaming frees the old username.
        profile.username = b"Bob".to_vec();
        store
            .flush(FlushBatch {
                profiles: vec![(pkid, Some(profile))],
                ..FlushBatch::default()
            })
            .unwrap();
        assert!(store
            .fetch_profile_by_username(&UsernameKey::from_username(b"alice"))
            .unwrap()
            .is_none());
        assert!(store
            .fetch_profile_by_username(&UsernameKey::from_username(b"BOB"))
            .unwrap()
            .is_some());
    }

    #[test]
    fn post_flush_maintains_timestamp_index() {
        let store = MemStore::new();
        let poster = PublicKey::new([1u8; 33]);
        assert!(!store.post_exists_at_timestamp(&poster, 42).unwrap());
    }
}
