//! Derived-key storage trait.

use crate::StoreError;
use plaza_types::{DerivedKeyEntry, DerivedKeyMapKey};

pub trait DerivedKeyStore {
    fn fetch_derived_key(
        &self,
        key: &DerivedKeyMapKey,
    ) -> Result<Option<DerivedKeyEntry>, StoreError>;
}
