//! Post, follow, and like transaction metadata.

use plaza_types::{PostHash, PublicKey};
use serde::{Deserialize, Serialize};

/// Creates a new post or edits an existing one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitPostMetadata {
    /// Set to edit: the hash of the post being modified. New posts are
    /// keyed by the hash of this transaction.
    pub post_hash_to_modify: Option<PostHash>,

    /// Set for comments.
    pub parent_post_hash: Option<PostHash>,

    pub body: Vec<u8>,

    /// Set for reposts. An empty body makes a vanilla repost; a non-empty
    /// body with `is_quoted_repost` makes a quote repost.
    pub reposted_post_hash: Option<PostHash>,

    pub is_quoted_repost: bool,

    /// Client-supplied nanosecond timestamp; must be unique per poster.
    pub timestamp_nanos: u64,

    pub is_hidden: bool,
}

/// Follows or unfollows a profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowMetadata {
    pub followed_public_key: PublicKey,
    pub is_unfollow: bool,
}

/// Likes or unlikes a post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeMetadata {
    pub liked_post_hash: PostHash,
    pub is_unlike: bool,
}
