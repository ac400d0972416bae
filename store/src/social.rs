//! Like / follow / repost / diamond storage trait.

use crate::StoreError;
use plaza_types::{
    DiamondEntry, DiamondKey, FollowEntry, FollowKey, LikeEntry, LikeKey, RepostEntry, RepostKey,
};

pub trait SocialStore {
    fn fetch_like(&self, key: &LikeKey) -> Result<Option<LikeEntry>, StoreError>;

    fn fetch_follow(&self, key: &FollowKey) -> Result<Option<FollowEntry>, StoreError>;

    fn fetch_repost(&self, key: &RepostKey) -> Result<Option<RepostEntry>, StoreError>;

    fn fetch_diamond(&self, key: &DiamondKey) -> Result<Option<DiamondEntry>, StoreError>;
}
