//! DAO-coin handlers: mint, burn, minting disable, transfer restriction,
//! and holder-to-holder transfers.
//!
//! DAO coins are unbacked governance tokens: no reserve, no curve, 256-bit
//! circulation, owner-controlled supply.

use crate::coins::transfer_allowed;
use crate::error::{RuleError, ViewError};
use crate::undo::UndoOp;
use crate::view::LedgerView;
use plaza_transactions::{
    DaoCoinMetadata, DaoCoinOperation, DaoCoinTransferMetadata, Transaction, TxnKind,
};
use plaza_types::{BalanceEntry, BalanceKey, TransferRestrictionStatus, TxnHash};
use primitive_types::U256;

impl LedgerView {
    pub(crate) fn connect_dao_coin(
        &mut self,
        txn: &Transaction,
        meta: &DaoCoinMetadata,
        txn_hash: &TxnHash,
        block_height: u64,
        verify_signatures: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        let creator_pkid = self.pkid_for_public_key(&meta.profile_public_key)?.pkid;
        let mut profile = self
            .profile_for_pkid(&creator_pkid)?
            .filter(|profile| !profile.is_deleted)
            .ok_or(RuleError::CoinOperationOnNonexistentProfile)?;
        let prev_coin = profile.dao_coin.clone();

        let transactor_pkid = self.pkid_for_public_key(&txn.public_key)?.pkid;
        let is_owner = txn.public_key == profile.public_key;
        let balance_key = BalanceKey::new(transactor_pkid, creator_pkid);
        let prev_balance = self
            .dao_coin_balance(&balance_key)?
            .filter(|entry| !entry.is_deleted);

        // Validate everything before the transfer so failure never leaves
        // a half-applied coin entry.
        match meta.operation {
            DaoCoinOperation::Mint => {
                if !is_owner {
                    return Err(RuleError::OnlyProfileOwnerCanMintDaoCoin.into());
                }
                if prev_coin.minting_disabled {
                    return Err(RuleError::DaoCoinMintingDisabled.into());
                }
                if meta.coins_to_mint_nanos.is_zero() {
                    return Err(RuleError::DaoCoinMustMintNonZero.into());
                }
                if prev_coin
                    .coins_in_circulation
                    .checked_add(meta.coins_to_mint_nanos)
                    .is_none()
                {
                    return Err(RuleError::AmountOverflow.into());
                }
            }
            DaoCoinOperation::Burn => {
                if meta.coins_to_burn_nanos.is_zero() {
                    return Err(RuleError::DaoCoinMustBurnNonZero.into());
                }
                let balance = prev_balance
                    .as_ref()
                    .map_or(U256::zero(), |entry| entry.balance_nanos);
                if balance < meta.coins_to_burn_nanos {
                    return Err(RuleError::DaoCoinBurnInsufficientCoins.into());
                }
            }
            DaoCoinOperation::DisableMinting => {
                if !is_owner {
                    return Err(RuleError::OnlyProfileOwnerCanDisableMinting.into());
                }
            }
            DaoCoinOperation::UpdateTransferRestrictionStatus => {
                if !is_owner {
                    return Err(RuleError::OnlyProfileOwnerCanUpdateTransferRestriction.into());
                }
                // The permanent latch never reopens.
                if prev_coin.transfer_restriction
                    == TransferRestrictionStatus::PermanentlyUnrestricted
                {
                    return Err(
                        RuleError::DaoCoinCannotUpdatePermanentTransferRestriction.into()
                    );
                }
            }
        }

        let (total_input, total_output, mut ops) =
            self.connect_basic_transfer(txn, txn_hash, block_height, verify_signatures)?;

        match meta.operation {
            DaoCoinOperation::Mint => {
                let mut entry = prev_balance
                    .clone()
                    .unwrap_or_else(|| BalanceEntry::new(transactor_pkid, creator_pkid));
                if entry.balance_nanos.is_zero() {
                    profile.dao_coin.number_of_holders += 1;
                }
                entry.balance_nanos = entry
                    .balance_nanos
                    .checked_add(meta.coins_to_mint_nanos)
                    .ok_or(RuleError::AmountOverflow)?;
                self.set_dao_coin_balance(entry);

                profile.dao_coin.coins_in_circulation = prev_coin
                    .coins_in_circulation
                    .checked_add(meta.coins_to_mint_nanos)
                    .ok_or(RuleError::AmountOverflow)?;
            }
            DaoCoinOperation::Burn => {
                let mut entry = prev_balance.clone().ok_or_else(|| {
                    ViewError::Corruption("burner balance disappeared mid-connect".into())
                })?;
                entry.balance_nanos = entry.balance_nanos - meta.coins_to_burn_nanos;
                if entry.balance_nanos.is_zero() {
                    profile.dao_coin.number_of_holders =
                        profile.dao_coin.number_of_holders.saturating_sub(1);
                    self.delete_dao_coin_balance(&entry);
                } else {
                    self.set_dao_coin_balance(entry);
                }

                profile.dao_coin.coins_in_circulation = prev_coin
                    .coins_in_circulation
                    .checked_sub(meta.coins_to_burn_nanos)
                    .ok_or_else(|| {
                        ViewError::Corruption("dao coin circulation underflow on burn".into())
                    })?;
            }
            DaoCoinOperation::DisableMinting => {
                profile.dao_coin.minting_disabled = true;
            }
            DaoCoinOperation::UpdateTransferRestrictionStatus => {
                profile.dao_coin.transfer_restriction = meta.transfer_restriction_status;
            }
        }
        self.set_profile(creator_pkid, profile);

        ops.push(UndoOp::DaoCoin {
            creator_pkid,
            prev_coin,
            balance_key,
            prev_balance,
        });
        Ok((total_input, total_output, ops))
    }

    pub(crate) fn disconnect_dao_coin(
        &mut self,
        txn: &Transaction,
        _meta: &DaoCoinMetadata,
        txn_hash: &TxnHash,
        ops: &mut Vec<UndoOp>,
        block_height: u64,
    ) -> Result<(), ViewError> {
        let op = self.pop_kind_op(ops, TxnKind::DaoCoin)?;
        let UndoOp::DaoCoin {
            creator_pkid,
            prev_coin,
            balance_key,
            prev_balance,
        } = op
        else {
            return Err(ViewError::Corruption(
                "expected a dao-coin undo operation".into(),
            ));
        };

        let mut profile = self
            .profile_for_pkid(&creator_pkid)?
            .filter(|profile| !profile.is_deleted)
            .ok_or_else(|| {
                ViewError::Corruption("dao profile missing during disconnect".into())
            })?;
        profile.dao_coin = prev_coin;
        self.set_profile(creator_pkid, profile);

        self.restore_dao_coin_balance(balance_key, prev_balance)?;

        self.disconnect_basic_transfer(txn, txn_hash, ops, block_height)
    }

    fn restore_dao_coin_balance(
        &mut self,
        key: BalanceKey,
        prev: Option<BalanceEntry>,
    ) -> Result<(), ViewError> {
        match prev {
            Some(entry) => self.set_dao_coin_balance(entry),
            None => {
                if let Some(current) = self
                    .dao_coin_balance(&key)?
                    .filter(|entry| !entry.is_deleted)
                {
                    self.delete_dao_coin_balance(&current);
                }
            }
        }
        Ok(())
    }

    // ── DAOCoinTransfer ─────────────────────────────────────────────────

    pub(crate) fn connect_dao_coin_transfer(
        &mut self,
        txn: &Transaction,
        meta: &DaoCoinTransferMetadata,
        txn_hash: &TxnHash,
        block_height: u64,
        verify_signatures: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        if meta.dao_coin_to_transfer_nanos.is_zero() {
            return Err(RuleError::CoinTransferMustBeGreaterThanZero.into());
        }
        if meta.receiver_public_key == txn.public_key {
            return Err(RuleError::CoinTransferCannotTransferToSelf.into());
        }

        let creator_pkid = self.pkid_for_public_key(&meta.profile_public_key)?.pkid;
        let mut profile = self
            .profile_for_pkid(&creator_pkid)?
            .filter(|profile| !profile.is_deleted)
            .ok_or(RuleError::CoinOperationOnNonexistentProfile)?;
        let prev_coin = profile.dao_coin.clone();

        let sender_pkid = self.pkid_for_public_key(&txn.public_key)?.pkid;
        let receiver_pkid = self.pkid_for_public_key(&meta.receiver_public_key)?.pkid;
        let sender_key = BalanceKey::new(sender_pkid, creator_pkid);
        let receiver_key = BalanceKey::new(receiver_pkid, creator_pkid);

        let prev_sender_balance = self
            .dao_coin_balance(&sender_key)?
            .filter(|entry| !entry.is_deleted);
        let prev_receiver_balance = self
            .dao_coin_balance(&receiver_key)?
            .filter(|entry| !entry.is_deleted);

        let sender_balance = prev_sender_balance
            .as_ref()
            .map_or(U256::zero(), |entry| entry.balance_nanos);
        if sender_balance < meta.dao_coin_to_transfer_nanos {
            return Err(RuleError::CoinTransferInsufficientCoins.into());
        }

        let receiver_holds_coin = prev_receiver_balance
            .as_ref()
            .is_some_and(|entry| !entry.balance_nanos.is_zero());
        if !transfer_allowed(
            prev_coin.transfer_restriction,
            &txn.public_key,
            &meta.receiver_public_key,
            &profile.public_key,
            receiver_holds_coin,
        ) {
            return Err(RuleError::CoinTransferProhibitedByTransferRestriction.into());
        }

        let (total_input, total_output, mut ops) =
            self.connect_basic_transfer(txn, txn_hash, block_height, verify_signatures)?;

        let mut holders = prev_coin.number_of_holders;

        let mut sender_entry = prev_sender_balance.clone().ok_or_else(|| {
            ViewError::Corruption("sender balance disappeared mid-connect".into())
        })?;
        sender_entry.balance_nanos =
            sender_entry.balance_nanos - meta.dao_coin_to_transfer_nanos;
        if sender_entry.balance_nanos.is_zero() {
            holders = holders.saturating_sub(1);
            self.delete_dao_coin_balance(&sender_entry);
        } else {
            self.set_dao_coin_balance(sender_entry);
        }

        let mut receiver_entry = prev_receiver_balance
            .clone()
            .unwrap_or_else(|| BalanceEntry::new(receiver_pkid, creator_pkid));
        if receiver_entry.balance_nanos.is_zero() {
            holders += 1;
        }
        receiver_entry.balance_nanos = receiver_entry
            .balance_nanos
            .checked_add(meta.dao_coin_to_transfer_nanos)
            .ok_or(RuleError::AmountOverflow)?;
        self.set_dao_coin_balance(receiver_entry);

        profile.dao_coin.number_of_holders = holders;
        self.set_profile(creator_pkid, profile);

        ops.push(UndoOp::DaoCoinTransfer {
            creator_pkid,
            prev_coin,
            sender_balance_key: sender_key,
            prev_sender_balance,
            receiver_balance_key: receiver_key,
            prev_receiver_balance,
        });
        Ok((total_input, total_output, ops))
    }

    pub(crate) fn disconnect_dao_coin_transfer(
        &mut self,
        txn: &Transaction,
        _meta: &DaoCoinTransferMetadata,
        txn_hash: &TxnHash,
        ops: &mut Vec<UndoOp>,
        block_height: u64,
    ) -> Result<(), ViewError> {
        let op = self.pop_kind_op(ops, TxnKind::DaoCoinTransfer)?;
        let UndoOp::DaoCoinTransfer {
            creator_pkid,
            prev_coin,
            sender_balance_key,
            prev_sender_balance,
            receiver_balance_key,
            prev_receiver_balance,
        } = op
        else {
            return Err(ViewError::Corruption(
                "expected a dao-coin-transfer undo operation".into(),
            ));
        };

        let mut profile = self
            .profile_for_pkid(&creator_pkid)?
            .filter(|profile| !profile.is_deleted)
            .ok_or_else(|| {
                ViewError::Corruption("dao profile missing during disconnect".into())
            })?;
        profile.dao_coin = prev_coin;
        self.set_profile(creator_pkid, profile);

        self.restore_dao_coin_balance(sender_balance_key, prev_sender_balance)?;
        self.restore_dao_coin_balance(receiver_balance_key, prev_receiver_balance)?;

        self.disconnect_basic_transfer(txn, txn_hash, ops, block_height)
    }
}
