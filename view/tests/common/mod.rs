//! Shared test harness: an in-memory chain with funded keys.
#![allow(dead_code)]

use plaza_crypto::KeyPair;
use plaza_store::{ChainStore, MemStore};
use plaza_transactions::{Block, Transaction, TxnMeta, TxnOutput};
use plaza_types::{
    BlockHash, BlockHeader, ChainParams, PublicKey, Signature, TxnHash, UtxoKey,
    CURRENT_BLOCK_VERSION,
};
use plaza_view::{ConnectedTxn, LedgerView, UndoOp, ViewError};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Deterministic keypair per test identity.
pub fn keypair(n: u8) -> KeyPair {
    plaza_crypto::keypair_from_seed(&[n; 32])
}

/// Chain params tuned for tests: instant block-reward maturity, no fee
/// floor, a generous subsidy, and key 0 as the param updater.
pub fn test_params() -> ChainParams {
    let mut params = ChainParams {
        block_reward_nanos: 10_000_000_000,
        block_reward_maturity_secs: 0,
        ..ChainParams::default()
    };
    params
        .param_updater_public_keys
        .insert(keypair(0).public);
    params
}

pub struct Harness {
    pub store: Arc<MemStore>,
    pub view: LedgerView,
    pub height: u64,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_params(test_params())
    }

    pub fn with_params(params: ChainParams) -> Self {
        let store = Arc::new(MemStore::new());
        let view = LedgerView::new(store.clone() as Arc<dyn ChainStore>, params).unwrap();
        Self {
            store,
            view,
            height: 0,
        }
    }

    /// Build a block extending the current tip.
    pub fn make_block(&self, txns: Vec<Transaction>) -> Block {
        Block {
            header: BlockHeader {
                version: CURRENT_BLOCK_VERSION,
                prev_block_hash: self.view.tip_hash(),
                height: self.height + 1,
                timestamp_secs: 1_000_000 + (self.height + 1) * 60,
            },
            txns,
        }
    }

    /// Connect a block with a funding coinbase, returning the spendable
    /// output keys in recipient order.
    pub fn fund_block(&mut self, recipients: &[(&KeyPair, u64)]) -> Vec<UtxoKey> {
        let coinbase = coinbase(
            self.height + 1,
            recipients
                .iter()
                .map(|(kp, amount)| (kp.public, *amount))
                .collect(),
        );
        let coinbase_hash = coinbase.hash();
        let block = self.make_block(vec![coinbase]);
        self.connect_block(&block).unwrap();
        (0..recipients.len())
            .map(|index| UtxoKey::new(coinbase_hash, index as u32))
            .collect()
    }

    pub fn connect_block(&mut self, block: &Block) -> Result<Vec<Vec<UndoOp>>, ViewError> {
        let ops = self.view.connect_block(block, true)?;
        self.height = block.header.height;
        Ok(ops)
    }

    pub fn disconnect_block(
        &mut self,
        block: &Block,
        ops: Vec<Vec<UndoOp>>,
    ) -> Result<(), ViewError> {
        self.view.disconnect_block(block, ops)?;
        self.height = block.header.height.saturating_sub(1);
        Ok(())
    }

    /// Connect a single transaction at the next height.
    pub fn connect_txn(&mut self, txn: &Transaction) -> Result<ConnectedTxn, ViewError> {
        let hash = txn.hash();
        self.view
            .connect_transaction(txn, &hash, 0, self.height + 1, true, false)
    }

    pub fn balance(&mut self, public_key: &PublicKey) -> u64 {
        self.view.balance_nanos(public_key).unwrap()
    }
}

/// A block-reward transaction with miner entropy derived from the height so
/// coinbases never collide.
pub fn coinbase(height: u64, outputs: Vec<(PublicKey, u64)>) -> Transaction {
    Transaction {
        inputs: vec![],
        outputs: outputs
            .into_iter()
            .map(|(public_key, amount_nanos)| TxnOutput {
                public_key,
                amount_nanos,
            })
            .collect(),
        public_key: PublicKey::ZERO,
        extra_data: BTreeMap::new(),
        meta: TxnMeta::BlockReward {
            extra_nonce: height.to_be_bytes().to_vec(),
        },
        signature: Signature::ZERO,
    }
}

/// Build and sign a transaction for `kp`.
pub fn signed_txn(
    kp: &KeyPair,
    inputs: Vec<UtxoKey>,
    outputs: Vec<(PublicKey, u64)>,
    extra_data: BTreeMap<String, Vec<u8>>,
    meta: TxnMeta,
) -> Transaction {
    let mut txn = Transaction {
        inputs,
        outputs: outputs
            .into_iter()
            .map(|(public_key, amount_nanos)| TxnOutput {
                public_key,
                amount_nanos,
            })
            .collect(),
        public_key: kp.public,
        extra_data,
        meta,
        signature: Signature::ZERO,
    };
    txn.signature = plaza_crypto::sign_digest(&txn.signature_digest(), &kp.secret).unwrap();
    txn
}

/// A plain signed transfer spending `input` and paying each recipient.
pub fn transfer(
    kp: &KeyPair,
    input: UtxoKey,
    outputs: Vec<(PublicKey, u64)>,
) -> Transaction {
    signed_txn(kp, vec![input], outputs, BTreeMap::new(), TxnMeta::BasicTransfer)
}

/// The output key of a transaction at the given index.
pub fn output_key(txn: &Transaction, index: u32) -> UtxoKey {
    UtxoKey::new(txn.hash(), index)
}

/// A single-UTXO wallet that threads its output through a chain of
/// transactions, sending the full amount back to itself each time.
pub struct Wallet {
    pub kp: KeyPair,
    pub utxo: UtxoKey,
    pub amount: u64,
}

impl Wallet {
    pub fn new(kp: KeyPair, utxo: UtxoKey, amount: u64) -> Self {
        Self { kp, utxo, amount }
    }

    /// Build a signed transaction spending the wallet's UTXO with a full
    /// self-change output, and advance the wallet to the change.
    pub fn txn(&mut self, meta: TxnMeta) -> Transaction {
        self.txn_with(meta, BTreeMap::new(), 0)
    }

    /// Like `txn`, with extra data and an amount to leave behind as input
    /// surplus (fees, coin purchases, buy-now payments).
    pub fn txn_with(
        &mut self,
        meta: TxnMeta,
        extra_data: BTreeMap<String, Vec<u8>>,
        surplus: u64,
    ) -> Transaction {
        self.amount -= surplus;
        let txn = signed_txn(
            &self.kp,
            vec![self.utxo],
            vec![(self.kp.public, self.amount)],
            extra_data,
            meta,
        );
        self.utxo = output_key(&txn, 0);
        txn
    }
}

/// Hash bytes helper for extra-data fields.
pub fn hash_bytes(hash: &TxnHash) -> Vec<u8> {
    hash.as_bytes().to_vec()
}

/// Uvarint helper for extra-data fields.
pub fn uvarint_bytes(value: u64) -> Vec<u8> {
    let mut out = Vec::new();
    plaza_types::wire::write_uvarint(&mut out, value);
    out
}

#[allow(dead_code)]
pub fn zero_block_hash() -> BlockHash {
    BlockHash::ZERO
}
