//! Block headers.
//!
//! The view only needs the header fields that anchor connect/disconnect:
//! the parent link, the height, and the hash derived from the header bytes.

use crate::hash::BlockHash;
use serde::{Deserialize, Serialize};

pub const CURRENT_BLOCK_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: u32,
    pub prev_block_hash: BlockHash,
    pub height: u64,
    pub timestamp_secs: u64,
}

impl BlockHeader {
    /// Canonical header bytes, hashed by the caller to produce the block
    /// hash.
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("block header serialization should not fail")
    }
}
