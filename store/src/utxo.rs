//! UTXO and native-balance storage trait.

use crate::StoreError;
use plaza_types::{PublicKey, UtxoEntry, UtxoKey};

/// Read access to the UTXO set and the per-owner balance index.
///
/// The store holds an output iff it is unspent; the balance of a key is by
/// definition the sum of its live outputs.
pub trait UtxoStore {
    fn fetch_utxo(&self, key: &UtxoKey) -> Result<Option<UtxoEntry>, StoreError>;

    fn fetch_balance(&self, public_key: &PublicKey) -> Result<u64, StoreError>;

    /// Total number of unspent outputs.
    fn utxo_count(&self) -> Result<u64, StoreError>;
}
