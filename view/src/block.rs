//! Block-level connect and disconnect.

use crate::error::{RuleError, ViewError};
use crate::undo::UndoOp;
use crate::view::LedgerView;
use plaza_transactions::Block;
use tracing::info;

impl LedgerView {
    /// Connect a block that extends the view's tip.
    ///
    /// Transactions are processed in order; fees accumulate and bound the
    /// block reward. On success the tip advances to the block's hash and
    /// the per-transaction undo logs are returned for later disconnects.
    pub fn connect_block(
        &mut self,
        block: &Block,
        verify_signatures: bool,
    ) -> Result<Vec<Vec<UndoOp>>, ViewError> {
        let block_hash = block.hash();
        if block.header.prev_block_hash != self.tip_hash {
            return Err(RuleError::BlockDoesNotConnectToTip.into());
        }
        if !block.has_block_reward_prefix() {
            return Err(RuleError::BlockDoesNotStartWithBlockReward.into());
        }

        info!(block = %block_hash, height = block.header.height, txns = block.txns.len(),
            "connecting block");

        let height = block.header.height;
        let mut total_fees: u64 = 0;
        let mut all_ops: Vec<Vec<UndoOp>> = Vec::with_capacity(block.txns.len());
        for txn in &block.txns {
            let txn_hash = txn.hash();
            // Size zero skips the fee-rate floor: recomputing serialized
            // sizes per transaction would slow block processing and the
            // floor was already enforced at mempool admission.
            let connected =
                self.connect_transaction(txn, &txn_hash, 0, height, verify_signatures, false)?;

            total_fees = total_fees
                .checked_add(connected.fees)
                .ok_or(RuleError::TxnOutputWithInvalidAmount)?;
            all_ops.push(connected.ops);
        }

        // The block reward's outputs may not exceed the subsidy plus fees.
        let mut block_reward_output: u64 = 0;
        for output in &block.txns[0].outputs {
            if output.amount_nanos > self.params.max_nanos {
                return Err(RuleError::BlockRewardOutputWithInvalidAmount.into());
            }
            block_reward_output = block_reward_output
                .checked_add(output.amount_nanos)
                .ok_or(RuleError::BlockRewardOutputWithInvalidAmount)?;
        }
        let base_reward = self.params.base_block_reward(height);
        if total_fees > self.params.max_nanos {
            return Err(RuleError::BlockRewardOverflow.into());
        }
        let max_block_reward = base_reward
            .checked_add(total_fees)
            .ok_or(RuleError::BlockRewardOverflow)?;
        if block_reward_output > max_block_reward {
            return Err(RuleError::BlockRewardExceedsMaxAllowed.into());
        }

        self.tip_hash = block_hash;
        Ok(all_ops)
    }

    /// Disconnect the tip block, restoring the view to the parent's state.
    ///
    /// Any mismatch between the block and the undo logs is corruption: the
    /// caller must halt rather than continue with a half-reversed view.
    pub fn disconnect_block(
        &mut self,
        block: &Block,
        all_ops: Vec<Vec<UndoOp>>,
    ) -> Result<(), ViewError> {
        let block_hash = block.hash();
        if block_hash != self.tip_hash {
            return Err(ViewError::Corruption(
                "block being disconnected does not match the tip".into(),
            ));
        }
        if all_ops.len() != block.txns.len() {
            return Err(ViewError::Corruption(format!(
                "block has {} transactions but {} undo logs were supplied",
                block.txns.len(),
                all_ops.len()
            )));
        }

        info!(block = %block_hash, height = block.header.height, "disconnecting block");

        // Cross-check the undo logs against the block's shape before
        // touching anything. Bidder inputs count as inputs; implicit
        // payment outputs can push additions above the explicit outputs.
        let mut num_inputs = 0usize;
        let mut num_outputs = 0usize;
        for txn in &block.txns {
            num_inputs += txn.inputs.len();
            if let plaza_transactions::TxnMeta::AcceptNftBid(meta) = &txn.meta {
                num_inputs += meta.bidder_inputs.len();
            }
            num_outputs += txn.outputs.len();
        }
        let mut num_spend_ops = 0usize;
        let mut num_add_ops = 0usize;
        for ops in &all_ops {
            for op in ops {
                num_spend_ops += op.spend_count();
                num_add_ops += op.add_count();
            }
        }
        if num_inputs != num_spend_ops {
            return Err(ViewError::Corruption(format!(
                "block has {num_inputs} inputs but the undo logs record {num_spend_ops} spends"
            )));
        }
        if num_outputs > num_add_ops {
            return Err(ViewError::Corruption(format!(
                "block has {num_outputs} outputs but the undo logs record only {num_add_ops} adds"
            )));
        }

        let height = block.header.height;
        for (txn, ops) in block.txns.iter().zip(all_ops).rev() {
            let txn_hash = txn.hash();
            self.disconnect_transaction(txn, &txn_hash, ops, height)?;
        }

        self.tip_hash = block.header.prev_block_hash;
        Ok(())
    }
}
