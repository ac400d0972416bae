//! Global-params, exchange-rate, and cross-chain burn handlers.

use crate::error::{RuleError, ViewError};
use crate::undo::UndoOp;
use crate::view::LedgerView;
use plaza_transactions::extra_data::{
    CREATE_NFT_FEE_NANOS_KEY, CREATE_PROFILE_FEE_NANOS_KEY, FORBIDDEN_BLOCK_SIGNATURE_PUBKEY_KEY,
    MAX_COPIES_PER_NFT_KEY, MIN_NETWORK_FEE_NANOS_PER_KB_KEY, USD_CENTS_PER_BITCOIN_KEY,
};
use plaza_transactions::{
    BitcoinExchangeMetadata, Transaction, TxnKind, UpdateBitcoinUsdExchangeRateMetadata,
};
use plaza_types::params::{
    BITCOIN_EXCHANGE_FEE_BASIS_POINTS, MAX_BASIS_POINTS, MAX_CREATE_NFT_FEE_NANOS,
    MAX_CREATE_PROFILE_FEE_NANOS, MAX_MAX_COPIES_PER_NFT, MAX_NETWORK_FEE_NANOS_PER_KB,
    MAX_USD_CENTS_PER_BITCOIN, MIN_CREATE_NFT_FEE_NANOS, MIN_CREATE_PROFILE_FEE_NANOS,
    MIN_MAX_COPIES_PER_NFT, MIN_NETWORK_FEE_NANOS_PER_KB, MIN_USD_CENTS_PER_BITCOIN,
    SATOSHIS_PER_BITCOIN,
};
use plaza_types::wire::read_uvarint;
use plaza_types::{ForbiddenPubKeyEntry, PublicKey, TxnHash, UtxoEntry, UtxoKey, UtxoType};

fn decode_uvarint_field(bytes: &[u8]) -> Result<u64, RuleError> {
    let mut slice = bytes;
    read_uvarint(&mut slice).map_err(|_| RuleError::GlobalParamsValueInvalid)
}

impl LedgerView {
    // ── BitcoinExchange ─────────────────────────────────────────────────

    /// Mint native tokens against a verified cross-chain burn. The burn
    /// proof was checked upstream; here the id is tracked so the same burn
    /// can never mint twice.
    pub(crate) fn connect_bitcoin_exchange(
        &mut self,
        txn: &Transaction,
        meta: &BitcoinExchangeMetadata,
        txn_hash: &TxnHash,
        block_height: u64,
        verify_signatures: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        if meta.burn_amount_satoshis == 0 {
            return Err(RuleError::BitcoinExchangeInvalidBurnAmount.into());
        }
        if self.burn_txid_exists(&meta.burn_txn_id)? {
            return Err(RuleError::BitcoinBurnAlreadyProcessed.into());
        }

        // satoshis -> USD cents -> nanos, at the current on-chain rate.
        let usd_cents = (meta.burn_amount_satoshis as u128)
            .checked_mul(self.global_params.usd_cents_per_bitcoin as u128)
            .map(|v| v / SATOSHIS_PER_BITCOIN as u128)
            .ok_or(RuleError::AmountOverflow)?;
        let nanos_minted = usd_cents
            .checked_mul(self.params.nanos_per_usd_cent as u128)
            .filter(|v| *v <= self.params.max_nanos as u128)
            .ok_or(RuleError::AmountOverflow)? as u64;
        if nanos_minted == 0 {
            return Err(RuleError::BitcoinExchangeInvalidBurnAmount.into());
        }

        // The mint fee is retained rather than charged as an input fee.
        let fee_nanos = ((nanos_minted as u128 * BITCOIN_EXCHANGE_FEE_BASIS_POINTS as u128)
            / MAX_BASIS_POINTS as u128) as u64;
        let user_nanos = nanos_minted - fee_nanos;

        if verify_signatures {
            self.verify_txn_signature(txn, block_height)?;
        }

        let prev_nanos_purchased = self.nanos_purchased;
        self.nanos_purchased = prev_nanos_purchased
            .checked_add(nanos_minted)
            .ok_or(RuleError::AmountOverflow)?;
        self.burn_txids.insert(meta.burn_txn_id, true);

        // One implicit output carrying the minted amount.
        let output_key = UtxoKey::new(*txn_hash, txn.outputs.len() as u32);
        let entry = UtxoEntry::new(
            user_nanos,
            txn.public_key,
            block_height,
            UtxoType::BitcoinBurn,
        );
        let _ = self.add_utxo(&output_key, entry)?;

        let ops = vec![UndoOp::BitcoinExchange {
            burn_txn_id: meta.burn_txn_id,
            prev_nanos_purchased,
            output_key,
        }];

        Ok((nanos_minted, user_nanos, ops))
    }

    pub(crate) fn disconnect_bitcoin_exchange(
        &mut self,
        _txn: &Transaction,
        meta: &BitcoinExchangeMetadata,
        _txn_hash: &TxnHash,
        ops: &mut Vec<UndoOp>,
        _block_height: u64,
    ) -> Result<(), ViewError> {
        let op = self.pop_kind_op(ops, TxnKind::BitcoinExchange)?;
        let UndoOp::BitcoinExchange {
            burn_txn_id,
            prev_nanos_purchased,
            output_key,
        } = op
        else {
            return Err(ViewError::Corruption(
                "expected a bitcoin-exchange undo operation".into(),
            ));
        };
        if burn_txn_id != meta.burn_txn_id {
            return Err(ViewError::Corruption(
                "bitcoin-exchange undo does not match the transaction".into(),
            ));
        }

        self.unadd_utxo(&output_key)?;
        self.nanos_purchased = prev_nanos_purchased;
        self.burn_txids.insert(burn_txn_id, false);
        Ok(())
    }

    // ── UpdateBitcoinUSDExchangeRate ────────────────────────────────────

    pub(crate) fn connect_update_exchange_rate(
        &mut self,
        txn: &Transaction,
        meta: &UpdateBitcoinUsdExchangeRateMetadata,
        txn_hash: &TxnHash,
        block_height: u64,
        verify_signatures: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        if !self.params.is_param_updater(&txn.public_key) {
            return Err(RuleError::UserNotAuthorizedToUpdateExchangeRate.into());
        }
        if meta.usd_cents_per_bitcoin < MIN_USD_CENTS_PER_BITCOIN {
            return Err(RuleError::ExchangeRateTooLow.into());
        }
        if meta.usd_cents_per_bitcoin > MAX_USD_CENTS_PER_BITCOIN {
            return Err(RuleError::ExchangeRateTooHigh.into());
        }

        let (total_input, total_output, mut ops) =
            self.connect_basic_transfer(txn, txn_hash, block_height, verify_signatures)?;

        let prev_global_params = self.global_params.clone();
        self.global_params.usd_cents_per_bitcoin = meta.usd_cents_per_bitcoin;

        ops.push(UndoOp::UpdateExchangeRate { prev_global_params });
        Ok((total_input, total_output, ops))
    }

    pub(crate) fn disconnect_update_exchange_rate(
        &mut self,
        txn: &Transaction,
        _meta: &UpdateBitcoinUsdExchangeRateMetadata,
        txn_hash: &TxnHash,
        ops: &mut Vec<UndoOp>,
        block_height: u64,
    ) -> Result<(), ViewError> {
        let op = self.pop_kind_op(ops, TxnKind::UpdateBitcoinUsdExchangeRate)?;
        let UndoOp::UpdateExchangeRate { prev_global_params } = op else {
            return Err(ViewError::Corruption(
                "expected an exchange-rate undo operation".into(),
            ));
        };
        self.global_params = prev_global_params;
        self.disconnect_basic_transfer(txn, txn_hash, ops, block_height)
    }

    // ── UpdateGlobalParams ──────────────────────────────────────────────

    /// Apply bounds-checked field updates from extra data, and optionally
    /// insert a forbidden-block-signer key in the same transaction.
    pub(crate) fn connect_update_global_params(
        &mut self,
        txn: &Transaction,
        txn_hash: &TxnHash,
        block_height: u64,
        verify_signatures: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        if !self.params.is_param_updater(&txn.public_key) {
            return Err(RuleError::UserNotAuthorizedToUpdateGlobalParams.into());
        }

        let mut new_params = self.global_params.clone();

        if let Some(bytes) = txn.extra_data.get(USD_CENTS_PER_BITCOIN_KEY) {
            let value = decode_uvarint_field(bytes)?;
            if value < MIN_USD_CENTS_PER_BITCOIN {
                return Err(RuleError::ExchangeRateTooLow.into());
            }
            if value > MAX_USD_CENTS_PER_BITCOIN {
                return Err(RuleError::ExchangeRateTooHigh.into());
            }
            new_params.usd_cents_per_bitcoin = value;
        }
        if let Some(bytes) = txn.extra_data.get(MIN_NETWORK_FEE_NANOS_PER_KB_KEY) {
            let value = decode_uvarint_field(bytes)?;
            if value < MIN_NETWORK_FEE_NANOS_PER_KB {
                return Err(RuleError::MinNetworkFeeTooLow.into());
            }
            if value > MAX_NETWORK_FEE_NANOS_PER_KB {
                return Err(RuleError::MinNetworkFeeTooHigh.into());
            }
            new_params.minimum_network_fee_nanos_per_kb = value;
        }
        if let Some(bytes) = txn.extra_data.get(CREATE_PROFILE_FEE_NANOS_KEY) {
            let value = decode_uvarint_field(bytes)?;
            if value < MIN_CREATE_PROFILE_FEE_NANOS {
                return Err(RuleError::CreateProfileFeeTooLow.into());
            }
            if value > MAX_CREATE_PROFILE_FEE_NANOS {
                return Err(RuleError::CreateProfileFeeTooHigh.into());
            }
            new_params.create_profile_fee_nanos = value;
        }
        if let Some(bytes) = txn.extra_data.get(CREATE_NFT_FEE_NANOS_KEY) {
            let value = decode_uvarint_field(bytes)?;
            if value < MIN_CREATE_NFT_FEE_NANOS {
                return Err(RuleError::CreateNftFeeTooLow.into());
            }
            if value > MAX_CREATE_NFT_FEE_NANOS {
                return Err(RuleError::CreateNftFeeTooHigh.into());
            }
            new_params.create_nft_fee_nanos = value;
        }
        if let Some(bytes) = txn.extra_data.get(MAX_COPIES_PER_NFT_KEY) {
            let value = decode_uvarint_field(bytes)?;
            if value < MIN_MAX_COPIES_PER_NFT {
                return Err(RuleError::MaxCopiesPerNftTooLow.into());
            }
            if value > MAX_MAX_COPIES_PER_NFT {
                return Err(RuleError::MaxCopiesPerNftTooHigh.into());
            }
            new_params.max_copies_per_nft = value;
        }

        let mut forbidden_update: Option<(PublicKey, Option<ForbiddenPubKeyEntry>)> = None;
        let mut new_forbidden_entry: Option<ForbiddenPubKeyEntry> = None;
        if let Some(bytes) = txn.extra_data.get(FORBIDDEN_BLOCK_SIGNATURE_PUBKEY_KEY) {
            let forbidden_key =
                PublicKey::from_slice(bytes).ok_or(RuleError::ForbiddenPubKeyLength)?;
            let prev_entry = self
                .forbidden_pub_key_entry(&forbidden_key)?
                .filter(|entry| !entry.is_deleted);
            forbidden_update = Some((forbidden_key, prev_entry));
            new_forbidden_entry = Some(ForbiddenPubKeyEntry {
                public_key: forbidden_key,
                is_deleted: false,
            });
        }

        let (total_input, total_output, mut ops) =
            self.connect_basic_transfer(txn, txn_hash, block_height, verify_signatures)?;

        if total_output == 0 {
            return Err(RuleError::UserOutputMustBeNonzero.into());
        }

        let prev_global_params = self.global_params.clone();
        self.global_params = new_params;
        if let Some(entry) = new_forbidden_entry {
            self.set_forbidden_pub_key(entry);
        }

        ops.push(UndoOp::UpdateGlobalParams {
            prev_global_params,
            prev_forbidden_pub_key: forbidden_update,
        });
        Ok((total_input, total_output, ops))
    }

    pub(crate) fn disconnect_update_global_params(
        &mut self,
        txn: &Transaction,
        txn_hash: &TxnHash,
        ops: &mut Vec<UndoOp>,
        block_height: u64,
    ) -> Result<(), ViewError> {
        let op = self.pop_kind_op(ops, TxnKind::UpdateGlobalParams)?;
        let UndoOp::UpdateGlobalParams {
            prev_global_params,
            prev_forbidden_pub_key,
        } = op
        else {
            return Err(ViewError::Corruption(
                "expected a global-params undo operation".into(),
            ));
        };

        self.global_params = prev_global_params;
        if let Some((forbidden_key, prev_entry)) = prev_forbidden_pub_key {
            match prev_entry {
                Some(entry) => self.set_forbidden_pub_key(entry),
                None => self.set_forbidden_pub_key(ForbiddenPubKeyEntry {
                    public_key: forbidden_key,
                    is_deleted: true,
                }),
            }
        }

        self.disconnect_basic_transfer(txn, txn_hash, ops, block_height)
    }
}
