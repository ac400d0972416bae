//! Post storage trait.

use crate::StoreError;
use plaza_types::{PostEntry, PostHash, PublicKey};

pub trait PostStore {
    fn fetch_post(&self, post_hash: &PostHash) -> Result<Option<PostEntry>, StoreError>;

    /// Whether the poster already has a post at this nanosecond timestamp.
    /// Backs the per-poster timestamp-uniqueness rule.
    fn post_exists_at_timestamp(
        &self,
        poster: &PublicKey,
        timestamp_nanos: u64,
    ) -> Result<bool, StoreError>;
}
