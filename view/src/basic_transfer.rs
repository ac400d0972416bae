//! The basic transfer: the universal prologue/epilogue of every
//! transaction.
//!
//! Connect spends inputs, adds outputs, optionally applies a diamond
//! side-effect, and verifies the signature. Disconnect is the exact
//! inverse: the diamond first, then outputs in reverse index order, then
//! inputs in reverse index order.

use crate::error::{RuleError, ViewError};
use crate::undo::UndoOp;
use crate::view::LedgerView;
use plaza_transactions::extra_data::{
    DERIVED_PUBLIC_KEY, DIAMOND_LEVEL_KEY, DIAMOND_POST_HASH_KEY,
};
use plaza_transactions::{Transaction, TxnKind};
use plaza_types::wire::read_uvarint;
use plaza_types::{
    DerivedKeyMapKey, DiamondEntry, DiamondKey, PublicKey, TxnHash, UtxoEntry, UtxoKey, UtxoType,
};
use std::collections::HashMap;

impl LedgerView {
    /// Connect the input/output/signature/diamond portion of a transaction.
    ///
    /// Returns (total input, total output, undo ops). Any error leaves the
    /// caller obligated to discard the view's pending mutations.
    pub(crate) fn connect_basic_transfer(
        &mut self,
        txn: &Transaction,
        txn_hash: &TxnHash,
        block_height: u64,
        verify_signatures: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        let mut ops: Vec<UndoOp> = Vec::with_capacity(txn.inputs.len() + txn.outputs.len() + 1);

        if txn.kind() == TxnKind::BlockReward && !txn.inputs.is_empty() {
            return Err(RuleError::BlockRewardTxnNotAllowedToHaveInputs.into());
        }

        // Inputs: validate, then spend, one at a time.
        let mut total_input: u64 = 0;
        for input in &txn.inputs {
            let entry = self
                .utxo_entry(input)?
                .ok_or(RuleError::InputSpendsNonexistentUtxo)?;
            if entry.spent {
                return Err(RuleError::InputSpendsPreviouslySpentOutput.into());
            }
            if self.is_immature_block_reward(&entry, block_height) {
                return Err(RuleError::InputSpendsImmatureBlockReward.into());
            }
            // Inputs must be owned by the transactor: one signature covers
            // every input.
            if entry.public_key != txn.public_key {
                return Err(RuleError::InputWithPublicKeyDifferentFromTxnPublicKey.into());
            }
            if entry.amount_nanos > self.params.max_nanos {
                return Err(RuleError::InputSpendsOutputWithInvalidAmount.into());
            }
            total_input = total_input
                .checked_add(entry.amount_nanos)
                .filter(|total| *total <= self.params.max_nanos)
                .ok_or(RuleError::InputSpendsOutputWithInvalidAmount)?;

            ops.push(self.spend_utxo(input)?);
        }

        // Outputs: validate, then add at (txn hash, output index).
        let mut total_output: u64 = 0;
        let mut amounts_by_public_key: HashMap<PublicKey, u64> = HashMap::new();
        let output_type = if txn.kind() == TxnKind::BlockReward {
            UtxoType::BlockReward
        } else {
            UtxoType::Output
        };
        for (output_index, output) in txn.outputs.iter().enumerate() {
            if output.amount_nanos > self.params.max_nanos {
                return Err(RuleError::TxnOutputWithInvalidAmount.into());
            }
            total_output = total_output
                .checked_add(output.amount_nanos)
                .filter(|total| *total <= self.params.max_nanos)
                .ok_or(RuleError::TxnOutputWithInvalidAmount)?;

            // Per-recipient subtotal, consumed by the diamond check below.
            *amounts_by_public_key.entry(output.public_key).or_default() +=
                output.amount_nanos;

            let key = UtxoKey::new(*txn_hash, output_index as u32);
            let entry = UtxoEntry::new(
                output.amount_nanos,
                output.public_key,
                block_height,
                output_type,
            );
            ops.push(self.add_utxo(&key, entry)?);
        }

        // Diamond side-effect: a basic transfer carrying a post hash and a
        // level in extra data is a tip.
        if txn.kind() == TxnKind::BasicTransfer
            && block_height > self.params.fork_heights.diamonds_block_height
        {
            if let Some(op) = self.connect_diamond(txn, &amounts_by_public_key)? {
                ops.push(op);
            }
        }

        if verify_signatures {
            if txn.kind() == TxnKind::BlockReward {
                // Block rewards are unsigned by construction so miners need
                // no key material online.
                if !txn.public_key.is_zero() || !txn.signature.is_zero() {
                    return Err(RuleError::BlockRewardTxnNotAllowedToHaveSignature.into());
                }
            } else {
                self.verify_txn_signature(txn, block_height)?;
            }
        }

        Ok((total_input, total_output, ops))
    }

    /// Exact inverse of `connect_basic_transfer`, consuming undo ops from
    /// the tail of `ops`.
    pub(crate) fn disconnect_basic_transfer(
        &mut self,
        txn: &Transaction,
        txn_hash: &TxnHash,
        ops: &mut Vec<UndoOp>,
        block_height: u64,
    ) -> Result<(), ViewError> {
        // A diamond op, if present, was appended last.
        if matches!(ops.last(), Some(UndoOp::Diamond { .. })) {
            if let Some(UndoOp::Diamond {
                prev_post,
                prev_diamond,
            }) = ops.pop()
            {
                self.disconnect_diamond(txn, prev_post, prev_diamond)?;
            }
        }

        // Outputs in reverse index order.
        for output_index in (0..txn.outputs.len()).rev() {
            let key = UtxoKey::new(*txn_hash, output_index as u32);
            let Some(UndoOp::AddUtxo { key: op_key, .. }) = ops.pop() else {
                return Err(ViewError::Corruption(format!(
                    "output {key:?} does not line up with an add operation"
                )));
            };
            if op_key != key {
                return Err(ViewError::Corruption(format!(
                    "output key {key:?} does not match recorded add key {op_key:?}"
                )));
            }

            let entry = self.utxo_entry(&key)?.ok_or_else(|| {
                ViewError::Corruption(format!("output {key:?} missing from view"))
            })?;
            if entry.spent {
                return Err(ViewError::Corruption(format!(
                    "output {key:?} was spent before being removed"
                )));
            }
            let output = &txn.outputs[output_index];
            if entry.amount_nanos != output.amount_nanos
                || entry.public_key != output.public_key
            {
                return Err(ViewError::Corruption(format!(
                    "output {key:?} does not match the transaction output"
                )));
            }
            if entry.block_height != block_height {
                return Err(ViewError::Corruption(format!(
                    "output {key:?} has height {} but block being disconnected is {}",
                    entry.block_height, block_height
                )));
            }
            if entry.utxo_type == UtxoType::BlockReward && txn.kind() != TxnKind::BlockReward {
                return Err(ViewError::Corruption(format!(
                    "output {key:?} is a block reward but the txn is not"
                )));
            }

            self.unadd_utxo(&key)?;
        }

        // Inputs in reverse index order.
        for input in txn.inputs.iter().rev() {
            let Some(UndoOp::SpendUtxo { key, entry }) = ops.pop() else {
                return Err(ViewError::Corruption(format!(
                    "input {input:?} does not line up with a spend operation"
                )));
            };
            if key != *input {
                return Err(ViewError::Corruption(format!(
                    "input {input:?} does not match recorded spend key {key:?}"
                )));
            }
            self.unspend_utxo(&key, &entry)?;
        }

        Ok(())
    }

    fn is_immature_block_reward(&self, entry: &UtxoEntry, block_height: u64) -> bool {
        if entry.utxo_type != UtxoType::BlockReward {
            return false;
        }
        let blocks_passed = block_height.saturating_sub(entry.block_height);
        blocks_passed < self.params.block_reward_maturity_blocks()
    }

    /// Verify the transaction signature against the owner key, or against
    /// an authorized derived key when one is stamped in extra data.
    pub(crate) fn verify_txn_signature(
        &mut self,
        txn: &Transaction,
        block_height: u64,
    ) -> Result<(), ViewError> {
        let digest = txn.signature_digest();

        if let Some(derived_bytes) = txn.extra_data.get(DERIVED_PUBLIC_KEY) {
            let derived = PublicKey::from_slice(derived_bytes)
                .ok_or(RuleError::DerivedKeyInvalidExtraData)?;
            let map_key = DerivedKeyMapKey::new(txn.public_key, derived);
            let entry = self
                .derived_key_entry(&map_key)?
                .filter(|entry| !entry.is_deleted)
                .ok_or(RuleError::DerivedKeyNotAuthorized)?;
            if entry.owner_public_key != txn.public_key
                || entry.derived_public_key != derived
                || !entry.is_usable_at(block_height)
            {
                return Err(RuleError::DerivedKeyNotAuthorized.into());
            }
            if plaza_crypto::verify_signature(&digest, &txn.signature, &derived) {
                return Ok(());
            }
            return Err(RuleError::DerivedKeyNotAuthorized.into());
        }

        if plaza_crypto::verify_signature(&digest, &txn.signature, &txn.public_key) {
            return Ok(());
        }
        Err(RuleError::InvalidTransactionSignature.into())
    }

    // ── Diamonds ────────────────────────────────────────────────────────

    fn connect_diamond(
        &mut self,
        txn: &Transaction,
        amounts_by_public_key: &HashMap<PublicKey, u64>,
    ) -> Result<Option<UndoOp>, ViewError> {
        let Some(post_hash_bytes) = txn.extra_data.get(DIAMOND_POST_HASH_KEY) else {
            return Ok(None);
        };
        let level_bytes = txn
            .extra_data
            .get(DIAMOND_LEVEL_KEY)
            .ok_or(RuleError::BasicTransferHasDiamondPostHashWithoutDiamondLevel)?;
        let mut level_slice = level_bytes.as_slice();
        let diamond_level = read_uvarint(&mut level_slice)
            .map_err(|_| RuleError::BasicTransferHasInvalidDiamondLevel)?;

        let post_hash_arr: [u8; 32] = post_hash_bytes
            .as_slice()
            .try_into()
            .map_err(|_| RuleError::BasicTransferDiamondInvalidLengthForPostHashBytes)?;
        let diamond_post_hash = TxnHash::new(post_hash_arr);

        let prev_post = self
            .post_entry(&diamond_post_hash)?
            .filter(|post| !post.is_deleted)
            .ok_or(RuleError::BasicTransferDiamondPostEntryDoesNotExist)?;

        let recipient = prev_post.poster_public_key;
        if recipient == txn.public_key {
            return Err(RuleError::BasicTransferDiamondCannotTransferToSelf.into());
        }

        let (required_nanos, net_new_diamonds) = self.validate_diamonds_and_required_nanos(
            &txn.public_key,
            &recipient,
            &diamond_post_hash,
            diamond_level,
        )?;

        let recipient_total = amounts_by_public_key.get(&recipient).copied().unwrap_or(0);
        if recipient_total < required_nanos {
            return Err(RuleError::BasicTransferInsufficientNanosForDiamondLevel.into());
        }

        let mut new_post = prev_post.clone();
        new_post.diamond_count += net_new_diamonds;
        self.set_post(new_post);

        let sender_pkid = self.pkid_for_public_key(&txn.public_key)?.pkid;
        let receiver_pkid = self.pkid_for_public_key(&recipient)?.pkid;
        let diamond_key = DiamondKey {
            sender_pkid,
            receiver_pkid,
            diamond_post_hash,
        };
        let prev_diamond = self
            .diamond_entry(&diamond_key)?
            .filter(|entry| !entry.is_deleted);

        self.set_diamond(DiamondEntry {
            sender_pkid,
            receiver_pkid,
            diamond_post_hash,
            diamond_level,
            is_deleted: false,
        });

        Ok(Some(UndoOp::Diamond {
            prev_post,
            prev_diamond,
        }))
    }

    fn disconnect_diamond(
        &mut self,
        txn: &Transaction,
        prev_post: plaza_types::PostEntry,
        prev_diamond: Option<DiamondEntry>,
    ) -> Result<(), ViewError> {
        let post_hash_bytes = txn.extra_data.get(DIAMOND_POST_HASH_KEY).ok_or_else(|| {
            ViewError::Corruption("diamond undo op without a diamond post hash".into())
        })?;
        let post_hash_arr: [u8; 32] = post_hash_bytes.as_slice().try_into().map_err(|_| {
            ViewError::Corruption("diamond post hash has invalid length on disconnect".into())
        })?;
        let diamond_post_hash = TxnHash::new(post_hash_arr);

        let sender_pkid = self.pkid_for_public_key(&txn.public_key)?.pkid;
        let receiver_pkid = self
            .pkid_for_public_key(&prev_post.poster_public_key)?
            .pkid;
        let diamond_key = DiamondKey {
            sender_pkid,
            receiver_pkid,
            diamond_post_hash,
        };
        let current = self
            .diamond_entry(&diamond_key)?
            .filter(|entry| !entry.is_deleted)
            .ok_or_else(|| {
                ViewError::Corruption("diamond entry missing during disconnect".into())
            })?;

        self.delete_diamond(&current);
        if let Some(prev) = prev_diamond {
            self.set_diamond(prev);
        }
        self.set_post(prev_post);
        Ok(())
    }

    /// Check a prospective diamond level and compute the nanos the sender
    /// still owes for it.
    pub(crate) fn validate_diamonds_and_required_nanos(
        &mut self,
        sender: &PublicKey,
        receiver: &PublicKey,
        post_hash: &TxnHash,
        diamond_level: u64,
    ) -> Result<(u64, u64), ViewError> {
        let needed_nanos = *self
            .params
            .diamond_levels
            .get(&diamond_level)
            .ok_or(RuleError::BasicTransferHasInvalidDiamondLevel)?;

        let sender_pkid = self.pkid_for_public_key(sender)?.pkid;
        let receiver_pkid = self.pkid_for_public_key(receiver)?.pkid;
        let key = DiamondKey {
            sender_pkid,
            receiver_pkid,
            diamond_post_hash: *post_hash,
        };
        let current_level = self
            .diamond_entry(&key)?
            .filter(|entry| !entry.is_deleted)
            .map_or(0, |entry| entry.diamond_level);

        if current_level >= diamond_level {
            return Err(RuleError::PostAlreadyHasSufficientDiamonds.into());
        }

        let current_nanos = self
            .params
            .diamond_levels
            .get(&current_level)
            .copied()
            .unwrap_or(0);
        // If the level table was lowered by governance the sender may owe
        // nothing extra for the upgrade.
        let required = needed_nanos.saturating_sub(current_nanos);
        let net_new_diamonds = diamond_level - current_level;

        Ok((required, net_new_diamonds))
    }
}
