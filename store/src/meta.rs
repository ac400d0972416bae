//! Chain-wide metadata storage trait.

use crate::StoreError;
use plaza_types::{BlockHash, ForbiddenPubKeyEntry, GlobalParamsEntry, PublicKey, TxnHash};

pub trait MetaStore {
    /// The persisted global params, if any have ever been flushed.
    fn fetch_global_params(&self) -> Result<Option<GlobalParamsEntry>, StoreError>;

    /// Cumulative nanos minted against cross-chain burns.
    fn fetch_nanos_purchased(&self) -> Result<u64, StoreError>;

    /// Whether a burn transaction id has already been minted against.
    fn burn_txid_exists(&self, txid: &TxnHash) -> Result<bool, StoreError>;

    fn fetch_forbidden_pub_key(
        &self,
        public_key: &PublicKey,
    ) -> Result<Option<ForbiddenPubKeyEntry>, StoreError>;

    /// The chain tip the store reflects. `None` for a fresh store.
    fn fetch_tip_hash(&self) -> Result<Option<BlockHash>, StoreError>;
}
