//! Profile, identity, and coin-balance storage trait.

use crate::StoreError;
use plaza_types::{
    BalanceEntry, BalanceKey, PkidEntry, ProfileEntry, Pkid, PublicKey, UsernameKey,
};

pub trait ProfileStore {
    /// Forward mapping: public key -> stable identifier.
    fn fetch_pkid_for_public_key(
        &self,
        public_key: &PublicKey,
    ) -> Result<Option<PkidEntry>, StoreError>;

    /// Reverse mapping: stable identifier -> current public key.
    fn fetch_public_key_for_pkid(&self, pkid: &Pkid) -> Result<Option<PkidEntry>, StoreError>;

    fn fetch_profile_by_pkid(&self, pkid: &Pkid) -> Result<Option<ProfileEntry>, StoreError>;

    fn fetch_profile_by_username(
        &self,
        username: &UsernameKey,
    ) -> Result<Option<ProfileEntry>, StoreError>;

    fn fetch_creator_coin_balance(
        &self,
        key: &BalanceKey,
    ) -> Result<Option<BalanceEntry>, StoreError>;

    fn fetch_dao_coin_balance(
        &self,
        key: &BalanceKey,
    ) -> Result<Option<BalanceEntry>, StoreError>;
}
