//! Transaction-level connect/disconnect dispatch.

use crate::error::{RuleError, ViewError};
use crate::undo::UndoOp;
use crate::view::LedgerView;
use plaza_transactions::validation::validate_transaction_sanity;
use plaza_transactions::{Transaction, TxnKind, TxnMeta};
use plaza_types::TxnHash;

/// The result of connecting one transaction.
#[derive(Clone, Debug)]
pub struct ConnectedTxn {
    /// Ordered undo records; reverse replay is the exact inverse.
    pub ops: Vec<UndoOp>,
    pub total_input: u64,
    pub total_output: u64,
    pub fees: u64,
}

impl LedgerView {
    /// Validate a transaction against the view and apply its effects.
    ///
    /// `txn_size_bytes` of zero skips the fee-rate floor (block connect
    /// enforces fees at mempool admission instead). `ignore_utxos` skips
    /// UTXO accounting for the handlers that support augmented-view use.
    pub fn connect_transaction(
        &mut self,
        txn: &Transaction,
        txn_hash: &TxnHash,
        txn_size_bytes: u64,
        block_height: u64,
        verify_signatures: bool,
        ignore_utxos: bool,
    ) -> Result<ConnectedTxn, ViewError> {
        validate_transaction_sanity(txn)?;

        // No transaction may take up more than half a block.
        if txn.serialized_size() > self.params.max_block_size_bytes / 2 {
            return Err(RuleError::TxnTooBig.into());
        }

        let (total_input, total_output, ops) = match &txn.meta {
            TxnMeta::BlockReward { .. } | TxnMeta::BasicTransfer => {
                self.connect_basic_transfer(txn, txn_hash, block_height, verify_signatures)?
            }
            TxnMeta::BitcoinExchange(meta) => {
                self.connect_bitcoin_exchange(txn, meta, txn_hash, block_height, verify_signatures)?
            }
            TxnMeta::PrivateMessage(meta) => {
                self.connect_private_message(txn, meta, txn_hash, block_height, verify_signatures)?
            }
            TxnMeta::MessagingGroup(meta) => {
                self.connect_messaging_group(txn, meta, txn_hash, block_height, verify_signatures)?
            }
            TxnMeta::SubmitPost(meta) => self.connect_submit_post(
                txn,
                meta,
                txn_hash,
                block_height,
                verify_signatures,
                ignore_utxos,
            )?,
            TxnMeta::UpdateProfile(meta) => self.connect_update_profile(
                txn,
                meta,
                txn_hash,
                block_height,
                verify_signatures,
                ignore_utxos,
            )?,
            TxnMeta::UpdateBitcoinUsdExchangeRate(meta) => self
                .connect_update_exchange_rate(txn, meta, txn_hash, block_height, verify_signatures)?,
            TxnMeta::UpdateGlobalParams => {
                self.connect_update_global_params(txn, txn_hash, block_height, verify_signatures)?
            }
            TxnMeta::Follow(meta) => {
                self.connect_follow(txn, meta, txn_hash, block_height, verify_signatures)?
            }
            TxnMeta::Like(meta) => {
                self.connect_like(txn, meta, txn_hash, block_height, verify_signatures)?
            }
            TxnMeta::CreatorCoin(meta) => {
                self.connect_creator_coin(txn, meta, txn_hash, block_height, verify_signatures)?
            }
            TxnMeta::CreatorCoinTransfer(meta) => self.connect_creator_coin_transfer(
                txn,
                meta,
                txn_hash,
                block_height,
                verify_signatures,
            )?,
            TxnMeta::DaoCoin(meta) => {
                self.connect_dao_coin(txn, meta, txn_hash, block_height, verify_signatures)?
            }
            TxnMeta::DaoCoinTransfer(meta) => {
                self.connect_dao_coin_transfer(txn, meta, txn_hash, block_height, verify_signatures)?
            }
            TxnMeta::SwapIdentity(meta) => {
                self.connect_swap_identity(txn, meta, txn_hash, block_height, verify_signatures)?
            }
            TxnMeta::CreateNft(meta) => {
                self.connect_create_nft(txn, meta, txn_hash, block_height, verify_signatures)?
            }
            TxnMeta::UpdateNft(meta) => {
                self.connect_update_nft(txn, meta, txn_hash, block_height, verify_signatures)?
            }
            TxnMeta::AcceptNftBid(meta) => {
                self.connect_accept_nft_bid(txn, meta, txn_hash, block_height, verify_signatures)?
            }
            TxnMeta::NftBid(meta) => {
                self.connect_nft_bid(txn, meta, txn_hash, block_height, verify_signatures)?
            }
            TxnMeta::NftTransfer(meta) => {
                self.connect_nft_transfer(txn, meta, txn_hash, block_height, verify_signatures)?
            }
            TxnMeta::AcceptNftTransfer(meta) => self.connect_accept_nft_transfer(
                txn,
                meta,
                txn_hash,
                block_height,
                verify_signatures,
            )?,
            TxnMeta::BurnNft(meta) => {
                self.connect_burn_nft(txn, meta, txn_hash, block_height, verify_signatures)?
            }
            TxnMeta::AuthorizeDerivedKey(meta) => self.connect_authorize_derived_key(
                txn,
                meta,
                txn_hash,
                block_height,
                verify_signatures,
            )?,
        };

        // Fee accounting. Block rewards mint rather than spend, so they are
        // exempt from input-covers-output.
        let mut fees: u64 = 0;
        if txn.kind() != TxnKind::BlockReward {
            if total_input < total_output {
                return Err(RuleError::TxnOutputExceedsInput.into());
            }
            fees = total_input - total_output;
        }

        // Cross-chain burn mints pay their fee out of the minted amount and
        // skip the floor; a zero size or a zero floor also skips it.
        if txn.kind() != TxnKind::BitcoinExchange
            && txn_size_bytes != 0
            && self.global_params.minimum_network_fee_nanos_per_kb != 0
        {
            let fee_rate_numerator = fees
                .checked_mul(1000)
                .ok_or(RuleError::OverflowDetectedInFeeRateCalculation)?;
            if fee_rate_numerator / txn_size_bytes
                < self.global_params.minimum_network_fee_nanos_per_kb
            {
                return Err(RuleError::TxnFeeBelowNetworkMinimum.into());
            }
        }

        Ok(ConnectedTxn {
            ops,
            total_input,
            total_output,
            fees,
        })
    }

    /// Reverse one connected transaction using its undo records.
    ///
    /// Kind-specific effects are reversed first (they were appended last),
    /// then the basic transfer. Every record must be consumed.
    pub fn disconnect_transaction(
        &mut self,
        txn: &Transaction,
        txn_hash: &TxnHash,
        mut ops: Vec<UndoOp>,
        block_height: u64,
    ) -> Result<(), ViewError> {
        match &txn.meta {
            TxnMeta::BlockReward { .. } | TxnMeta::BasicTransfer => {
                self.disconnect_basic_transfer(txn, txn_hash, &mut ops, block_height)?
            }
            TxnMeta::BitcoinExchange(meta) => {
                self.disconnect_bitcoin_exchange(txn, meta, txn_hash, &mut ops, block_height)?
            }
            TxnMeta::PrivateMessage(meta) => {
                self.disconnect_private_message(txn, meta, txn_hash, &mut ops, block_height)?
            }
            TxnMeta::MessagingGroup(meta) => {
                self.disconnect_messaging_group(txn, meta, txn_hash, &mut ops, block_height)?
            }
            TxnMeta::SubmitPost(meta) => {
                self.disconnect_submit_post(txn, meta, txn_hash, &mut ops, block_height)?
            }
            TxnMeta::UpdateProfile(meta) => {
                self.disconnect_update_profile(txn, meta, txn_hash, &mut ops, block_height)?
            }
            TxnMeta::UpdateBitcoinUsdExchangeRate(meta) => {
                self.disconnect_update_exchange_rate(txn, meta, txn_hash, &mut ops, block_height)?
            }
            TxnMeta::UpdateGlobalParams => {
                self.disconnect_update_global_params(txn, txn_hash, &mut ops, block_height)?
            }
            TxnMeta::Follow(meta) => {
                self.disconnect_follow(txn, meta, txn_hash, &mut ops, block_height)?
            }
            TxnMeta::Like(meta) => {
                self.disconnect_like(txn, meta, txn_hash, &mut ops, block_height)?
            }
            TxnMeta::CreatorCoin(meta) => {
                self.disconnect_creator_coin(txn, meta, txn_hash, &mut ops, block_height)?
            }
            TxnMeta::CreatorCoinTransfer(meta) => self.disconnect_creator_coin_transfer(
                txn,
                meta,
                txn_hash,
                &mut ops,
                block_height,
            )?,
            TxnMeta::DaoCoin(meta) => {
                self.disconnect_dao_coin(txn, meta, txn_hash, &mut ops, block_height)?
            }
            TxnMeta::DaoCoinTransfer(meta) => {
                self.disconnect_dao_coin_transfer(txn, meta, txn_hash, &mut ops, block_height)?
            }
            TxnMeta::SwapIdentity(meta) => {
                self.disconnect_swap_identity(txn, meta, txn_hash, &mut ops, block_height)?
            }
            TxnMeta::CreateNft(meta) => {
                self.disconnect_create_nft(txn, meta, txn_hash, &mut ops, block_height)?
            }
            TxnMeta::UpdateNft(meta) => {
                self.disconnect_update_nft(txn, meta, txn_hash, &mut ops, block_height)?
            }
            TxnMeta::AcceptNftBid(meta) => {
                self.disconnect_accept_nft_bid(txn, meta, txn_hash, &mut ops, block_height)?
            }
            TxnMeta::NftBid(meta) => {
                self.disconnect_nft_bid(txn, meta, txn_hash, &mut ops, block_height)?
            }
            TxnMeta::NftTransfer(meta) => {
                self.disconnect_nft_transfer(txn, meta, txn_hash, &mut ops, block_height)?
            }
            TxnMeta::AcceptNftTransfer(meta) => self.disconnect_accept_nft_transfer(
                txn,
                meta,
                txn_hash,
                &mut ops,
                block_height,
            )?,
            TxnMeta::BurnNft(meta) => {
                self.disconnect_burn_nft(txn, meta, txn_hash, &mut ops, block_height)?
            }
            TxnMeta::AuthorizeDerivedKey(meta) => self.disconnect_authorize_derived_key(
                txn,
                meta,
                txn_hash,
                &mut ops,
                block_height,
            )?,
        }

        if !ops.is_empty() {
            return Err(ViewError::Corruption(format!(
                "{} undo operations left over after disconnecting a {} transaction",
                ops.len(),
                txn.kind()
            )));
        }
        Ok(())
    }

    /// Pop the trailing kind-specific op, or fail as corruption.
    pub(crate) fn pop_kind_op(
        &self,
        ops: &mut Vec<UndoOp>,
        kind: TxnKind,
    ) -> Result<UndoOp, ViewError> {
        ops.pop().ok_or_else(|| {
            ViewError::Corruption(format!(
                "missing undo operation while disconnecting a {kind} transaction"
            ))
        })
    }
}
