//! Blocks: a header plus an ordered transaction list.

use crate::{Transaction, TxnKind};
use plaza_types::{BlockHash, BlockHeader};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub txns: Vec<Transaction>,
}

impl Block {
    /// The block hash: double SHA-256 of the canonical header bytes.
    pub fn hash(&self) -> BlockHash {
        BlockHash::new(plaza_crypto::sha256d(&self.header.to_bytes()))
    }

    /// Whether the block leads with a block-reward transaction, as every
    /// valid block must.
    pub fn has_block_reward_prefix(&self) -> bool {
        self.txns
            .first()
            .is_some_and(|txn| txn.kind() == TxnKind::BlockReward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plaza_types::CURRENT_BLOCK_VERSION;

    #[test]
    fn hash_depends_on_header_only() {
        let header = BlockHeader {
            version: CURRENT_BLOCK_VERSION,
            prev_block_hash: BlockHash::ZERO,
            height: 1,
            timestamp_secs: 1_000,
        };
        let a = Block {
            header: header.clone(),
            txns: vec![],
        };
        let mut b = Block {
            header,
            txns: vec![],
        };
        assert_eq!(a.hash(), b.hash());

        b.header.height = 2;
        assert_ne!(a.hash(), b.hash());
    }
}
