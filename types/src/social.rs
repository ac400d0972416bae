//! Simple relation records: likes, follows, reposts, diamonds.

use crate::hash::PostHash;
use crate::keys::{Pkid, PublicKey};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LikeKey {
    pub liker_public_key: PublicKey,
    pub liked_post_hash: PostHash,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeEntry {
    pub liker_public_key: PublicKey,
    pub liked_post_hash: PostHash,

    pub is_deleted: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FollowKey {
    pub follower_pkid: Pkid,
    pub followed_pkid: Pkid,
}

/// Follows are keyed by stable identifier so key rotation keeps the social
/// graph intact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowEntry {
    pub follower_pkid: Pkid,
    pub followed_pkid: Pkid,

    pub is_deleted: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RepostKey {
    pub reposter_public_key: PublicKey,
    pub reposted_post_hash: PostHash,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepostEntry {
    pub reposter_public_key: PublicKey,

    /// The repost itself.
    pub repost_post_hash: PostHash,

    /// The post being reposted.
    pub reposted_post_hash: PostHash,

    pub is_deleted: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DiamondKey {
    pub sender_pkid: Pkid,
    pub receiver_pkid: Pkid,
    pub diamond_post_hash: PostHash,
}

/// The diamond level a sender has bestowed on a post. Levels only ever
/// increase for a given (sender, receiver, post) triple.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiamondEntry {
    pub sender_pkid: Pkid,
    pub receiver_pkid: Pkid,
    pub diamond_post_hash: PostHash,
    pub diamond_level: u64,

    pub is_deleted: bool,
}
