//! Creator-coin handlers: bonded-curve buys and sells, plus transfers.
//!
//! The curve is a Bancor form with reserve ratio fixed at 1/3 and slope
//! 0.003, which reduces to a cube law: supply³ scales linearly with the
//! native-token reserve. All arithmetic is integer math over `U256` with
//! floor rounding; dust left by rounding stays in the reserve.

use crate::error::{RuleError, ViewError};
use crate::undo::UndoOp;
use crate::view::LedgerView;
use plaza_transactions::{
    CreatorCoinMetadata, CreatorCoinOperation, CreatorCoinTransferMetadata, Transaction, TxnKind,
};
use plaza_types::params::CREATOR_COIN_AUTO_SELL_THRESHOLD_NANOS;
use plaza_types::params::MAX_BASIS_POINTS;
use plaza_types::{
    BalanceEntry, BalanceKey, Pkid, PublicKey, TransferRestrictionStatus, TxnHash, UtxoEntry,
    UtxoKey, UtxoType,
};
use primitive_types::U256;

/// Floor cube root by Newton's method, starting from a power-of-two
/// overestimate.
pub(crate) fn cbrt_floor(n: U256) -> U256 {
    if n.is_zero() {
        return U256::zero();
    }
    let bits = n.bits();
    let mut x = U256::one() << (bits / 3 + 1);
    loop {
        let next = (x + x + n / (x * x)) / 3;
        if next >= x {
            break;
        }
        x = next;
    }
    // Newton can land one above the floor on cube boundaries.
    while x * x * x > n {
        x = x - U256::one();
    }
    x
}

/// Supply (in coin nanos) backed by a reserve of `locked_nanos`, from a
/// standing start: supply = cbrt(10²¹ × locked).
///
/// The constant folds the slope and reserve ratio into nano units; one
/// whole native token from zero mints ten whole coins.
fn polynomial_supply(locked_nanos: u64) -> U256 {
    let scale = U256::from(10u64).pow(U256::from(21u64));
    cbrt_floor(scale * U256::from(locked_nanos))
}

/// Whether a transfer is allowed under a profile's restriction status.
pub(crate) fn transfer_allowed(
    status: TransferRestrictionStatus,
    sender: &PublicKey,
    receiver: &PublicKey,
    profile_owner: &PublicKey,
    receiver_holds_coin: bool,
) -> bool {
    match status {
        TransferRestrictionStatus::Unrestricted
        | TransferRestrictionStatus::PermanentlyUnrestricted => true,
        TransferRestrictionStatus::ProfileOwnerOnly => {
            sender == profile_owner || receiver == profile_owner
        }
        TransferRestrictionStatus::HoldersOnly => receiver_holds_coin,
    }
}

impl LedgerView {
    // ── CreatorCoin buy/sell ────────────────────────────────────────────

    pub(crate) fn connect_creator_coin(
        &mut self,
        txn: &Transaction,
        meta: &CreatorCoinMetadata,
        txn_hash: &TxnHash,
        block_height: u64,
        verify_signatures: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        let creator_pkid = self.pkid_for_public_key(&meta.profile_public_key)?.pkid;
        if self
            .profile_for_pkid(&creator_pkid)?
            .filter(|profile| !profile.is_deleted)
            .is_none()
        {
            return Err(RuleError::CoinOperationOnNonexistentProfile.into());
        }

        match meta.operation {
            CreatorCoinOperation::Buy => self.connect_creator_coin_buy(
                txn,
                meta,
                txn_hash,
                creator_pkid,
                block_height,
                verify_signatures,
            ),
            CreatorCoinOperation::Sell => self.connect_creator_coin_sell(
                txn,
                meta,
                txn_hash,
                creator_pkid,
                block_height,
                verify_signatures,
            ),
            // The wire still knows "add" but consensus never accepted it.
            CreatorCoinOperation::Add => {
                Err(RuleError::CreatorCoinOperationNotSupported.into())
            }
        }
    }

    fn connect_creator_coin_buy(
        &mut self,
        txn: &Transaction,
        meta: &CreatorCoinMetadata,
        txn_hash: &TxnHash,
        creator_pkid: Pkid,
        block_height: u64,
        verify_signatures: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        if meta.nanos_to_spend == 0 {
            return Err(RuleError::CreatorCoinBuyMustTradeNonZeroNanos.into());
        }

        let (total_input, total_output, mut ops) =
            self.connect_basic_transfer(txn, txn_hash, block_height, verify_signatures)?;

        // The purchase is funded by the input surplus; what remains above
        // the purchase amount is the network fee.
        let surplus = total_input.saturating_sub(total_output);
        if surplus < meta.nanos_to_spend {
            return Err(RuleError::CreatorCoinBuyInsufficientFunds.into());
        }

        let mut profile = self
            .profile_for_pkid(&creator_pkid)?
            .filter(|profile| !profile.is_deleted)
            .ok_or(RuleError::CoinOperationOnNonexistentProfile)?;
        let prev_coin = profile.creator_coin.clone();

        let old_supply = prev_coin.coins_in_circulation;
        if old_supply > U256::from(u64::MAX) {
            return Err(RuleError::CreatorCoinSupplyOverflow.into());
        }
        let new_locked = prev_coin
            .locked_nanos
            .checked_add(meta.nanos_to_spend)
            .filter(|locked| *locked <= self.params.max_nanos)
            .ok_or(RuleError::AmountOverflow)?;

        let new_supply = if prev_coin.locked_nanos == 0 {
            polynomial_supply(new_locked)
        } else {
            let cubed = old_supply
                .checked_mul(old_supply)
                .and_then(|s2| s2.checked_mul(old_supply))
                .ok_or(RuleError::AmountOverflow)?;
            let scaled = cubed
                .checked_mul(U256::from(new_locked))
                .ok_or(RuleError::AmountOverflow)?
                / U256::from(prev_coin.locked_nanos);
            cbrt_floor(scaled)
        };
        if new_supply > U256::from(u64::MAX) {
            return Err(RuleError::CreatorCoinSupplyOverflow.into());
        }

        let old_circ = old_supply.as_u64();
        let new_circ = new_supply.as_u64();
        let minted = new_circ.saturating_sub(old_circ);

        // Founder reward: only circulation minted above the historical
        // watermark is taxed.
        let transactor_pkid = self.pkid_for_public_key(&txn.public_key)?.pkid;
        let taxable = new_circ.saturating_sub(prev_coin.watermark_nanos.max(old_circ));
        let founder_reward = if transactor_pkid == creator_pkid {
            // The creator buying their own coin keeps the whole mint.
            0
        } else {
            (((taxable as u128) * (prev_coin.creator_basis_points as u128))
                / (MAX_BASIS_POINTS as u128)) as u64
        };
        let founder_reward = founder_reward.min(minted);
        let buyer_coins = minted - founder_reward;

        if buyer_coins < meta.min_creator_coin_expected_nanos {
            return Err(RuleError::CreatorCoinSlippageExceeded.into());
        }

        // Balance updates, with holder counts tracking zero crossings.
        let transactor_key = BalanceKey::new(transactor_pkid, creator_pkid);
        let creator_key = BalanceKey::new(creator_pkid, creator_pkid);
        let prev_transactor_balance = self
            .creator_coin_balance(&transactor_key)?
            .filter(|entry| !entry.is_deleted);
        let prev_creator_balance = self
            .creator_coin_balance(&creator_key)?
            .filter(|entry| !entry.is_deleted);

        let mut holders = prev_coin.number_of_holders;

        let mut transactor_entry = prev_transactor_balance
            .clone()
            .unwrap_or_else(|| BalanceEntry::new(transactor_pkid, creator_pkid));
        let transactor_gain = if transactor_pkid == creator_pkid {
            minted
        } else {
            buyer_coins
        };
        if transactor_entry.balance_nanos.is_zero() && transactor_gain > 0 {
            holders += 1;
        }
        transactor_entry.balance_nanos = transactor_entry
            .balance_nanos
            .checked_add(U256::from(transactor_gain))
            .ok_or(RuleError::AmountOverflow)?;
        transactor_entry.has_purchased = true;
        self.set_creator_coin_balance(transactor_entry);

        if founder_reward > 0 && transactor_pkid != creator_pkid {
            let mut creator_entry = prev_creator_balance
                .clone()
                .unwrap_or_else(|| BalanceEntry::new(creator_pkid, creator_pkid));
            if creator_entry.balance_nanos.is_zero() {
                holders += 1;
            }
            creator_entry.balance_nanos = creator_entry
                .balance_nanos
                .checked_add(U256::from(founder_reward))
                .ok_or(RuleError::AmountOverflow)?;
            self.set_creator_coin_balance(creator_entry);
        }

        profile.creator_coin.locked_nanos = new_locked;
        profile.creator_coin.coins_in_circulation = U256::from(new_circ);
        profile.creator_coin.watermark_nanos = prev_coin.watermark_nanos.max(new_circ);
        profile.creator_coin.number_of_holders = holders;
        self.set_profile(creator_pkid, profile);

        ops.push(UndoOp::CreatorCoin {
            creator_pkid,
            prev_coin,
            transactor_balance_key: transactor_key,
            prev_transactor_balance,
            creator_balance_key: creator_key,
            prev_creator_balance,
            payout_utxo_key: None,
        });

        // The locked nanos count as an output for conservation purposes.
        let total_output = total_output
            .checked_add(meta.nanos_to_spend)
            .ok_or(RuleError::AmountOverflow)?;
        Ok((total_input, total_output, ops))
    }

    fn connect_creator_coin_sell(
        &mut self,
        txn: &Transaction,
        meta: &CreatorCoinMetadata,
        txn_hash: &TxnHash,
        creator_pkid: Pkid,
        block_height: u64,
        verify_signatures: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        if meta.creator_coin_to_sell_nanos == 0 {
            return Err(RuleError::CreatorCoinSellMustTradeNonZeroCoins.into());
        }

        let transactor_pkid = self.pkid_for_public_key(&txn.public_key)?.pkid;
        let transactor_key = BalanceKey::new(transactor_pkid, creator_pkid);
        let prev_transactor_balance = self
            .creator_coin_balance(&transactor_key)?
            .filter(|entry| !entry.is_deleted);
        let balance = prev_transactor_balance
            .as_ref()
            .map_or(U256::zero(), |entry| entry.balance_nanos);

        if balance < U256::from(meta.creator_coin_to_sell_nanos) {
            return Err(RuleError::CreatorCoinSellInsufficientCoins.into());
        }
        // Dust positions liquidate fully so the holder count can't wedge.
        let mut coins_to_sell = meta.creator_coin_to_sell_nanos;
        let remainder = balance - U256::from(coins_to_sell);
        if remainder < U256::from(CREATOR_COIN_AUTO_SELL_THRESHOLD_NANOS) {
            coins_to_sell = balance.as_u64();
        }

        let (total_input, total_output, mut ops) =
            self.connect_basic_transfer(txn, txn_hash, block_height, verify_signatures)?;

        let mut profile = self
            .profile_for_pkid(&creator_pkid)?
            .filter(|profile| !profile.is_deleted)
            .ok_or(RuleError::CoinOperationOnNonexistentProfile)?;
        let prev_coin = profile.creator_coin.clone();

        let old_supply = prev_coin.coins_in_circulation;
        if U256::from(coins_to_sell) > old_supply {
            return Err(ViewError::Corruption(
                "coin balance exceeds circulation".into(),
            ));
        }
        let new_supply = old_supply - U256::from(coins_to_sell);

        // Reserve follows the cube law; a full exit drains it entirely so
        // the curve can restart cleanly.
        let (new_locked, nanos_returned) = if new_supply.is_zero() {
            (0u64, prev_coin.locked_nanos)
        } else {
            let old_cubed = old_supply
                .checked_mul(old_supply)
                .and_then(|s2| s2.checked_mul(old_supply))
                .ok_or(RuleError::AmountOverflow)?;
            let new_cubed = new_supply
                .checked_mul(new_supply)
                .and_then(|s2| s2.checked_mul(new_supply))
                .ok_or(RuleError::AmountOverflow)?;
            let locked = U256::from(prev_coin.locked_nanos)
                .checked_mul(new_cubed)
                .ok_or(RuleError::AmountOverflow)?
                / old_cubed;
            let locked = locked.as_u64();
            (locked, prev_coin.locked_nanos - locked)
        };

        if nanos_returned < meta.min_nanos_expected {
            return Err(RuleError::CreatorCoinSlippageExceeded.into());
        }

        // Update the seller's balance; dropping to zero releases a holder
        // slot. A full exit resets supply and reserve together.
        let mut holders = prev_coin.number_of_holders;
        let mut seller_entry = prev_transactor_balance.clone().ok_or_else(|| {
            ViewError::Corruption("seller balance disappeared mid-connect".into())
        })?;
        seller_entry.balance_nanos = seller_entry.balance_nanos - U256::from(coins_to_sell);
        if seller_entry.balance_nanos.is_zero() {
            holders = holders.saturating_sub(1);
            self.delete_creator_coin_balance(&seller_entry);
        } else {
            self.set_creator_coin_balance(seller_entry);
        }

        profile.creator_coin.locked_nanos = new_locked;
        profile.creator_coin.coins_in_circulation = new_supply;
        profile.creator_coin.number_of_holders = holders;
        self.set_profile(creator_pkid, profile);

        // Proceeds leave the reserve as an implicit output to the seller.
        let mut payout_utxo_key = None;
        let mut total_input = total_input;
        let mut total_output = total_output;
        if nanos_returned > 0 {
            let key = UtxoKey::new(*txn_hash, txn.outputs.len() as u32);
            let entry = UtxoEntry::new(
                nanos_returned,
                txn.public_key,
                block_height,
                UtxoType::CreatorCoinSale,
            );
            let _ = self.add_utxo(&key, entry)?;
            payout_utxo_key = Some(key);
            total_input = total_input
                .checked_add(nanos_returned)
                .ok_or(RuleError::AmountOverflow)?;
            total_output = total_output
                .checked_add(nanos_returned)
                .ok_or(RuleError::AmountOverflow)?;
        }

        let creator_key = BalanceKey::new(creator_pkid, creator_pkid);
        let prev_creator_balance = self
            .creator_coin_balance(&creator_key)?
            .filter(|entry| !entry.is_deleted);

        ops.push(UndoOp::CreatorCoin {
            creator_pkid,
            prev_coin,
            transactor_balance_key: transactor_key,
            prev_transactor_balance,
            creator_balance_key: creator_key,
            prev_creator_balance,
            payout_utxo_key,
        });
        Ok((total_input, total_output, ops))
    }

    pub(crate) fn disconnect_creator_coin(
        &mut self,
        txn: &Transaction,
        _meta: &CreatorCoinMetadata,
        txn_hash: &TxnHash,
        ops: &mut Vec<UndoOp>,
        block_height: u64,
    ) -> Result<(), ViewError> {
        let op = self.pop_kind_op(ops, TxnKind::CreatorCoin)?;
        let UndoOp::CreatorCoin {
            creator_pkid,
            prev_coin,
            transactor_balance_key,
            prev_transactor_balance,
            creator_balance_key,
            prev_creator_balance,
            payout_utxo_key,
        } = op
        else {
            return Err(ViewError::Corruption(
                "expected a creator-coin undo operation".into(),
            ));
        };

        if let Some(key) = payout_utxo_key {
            self.unadd_utxo(&key)?;
        }

        let mut profile = self
            .profile_for_pkid(&creator_pkid)?
            .filter(|profile| !profile.is_deleted)
            .ok_or_else(|| {
                ViewError::Corruption("creator profile missing during disconnect".into())
            })?;
        profile.creator_coin = prev_coin;
        self.set_profile(creator_pkid, profile);

        self.restore_creator_coin_balance(transactor_balance_key, prev_transactor_balance)?;
        self.restore_creator_coin_balance(creator_balance_key, prev_creator_balance)?;

        self.disconnect_basic_transfer(txn, txn_hash, ops, block_height)
    }

    pub(crate) fn restore_creator_coin_balance(
        &mut self,
        key: BalanceKey,
        prev: Option<BalanceEntry>,
    ) -> Result<(), ViewError> {
        match prev {
            Some(entry) => self.set_creator_coin_balance(entry),
            None => {
                if let Some(current) = self
                    .creator_coin_balance(&key)?
                    .filter(|entry| !entry.is_deleted)
                {
                    self.delete_creator_coin_balance(&current);
                }
            }
        }
        Ok(())
    }

    // ── CreatorCoinTransfer ─────────────────────────────────────────────

    pub(crate) fn connect_creator_coin_transfer(
        &mut self,
        txn: &Transaction,
        meta: &CreatorCoinTransferMetadata,
        txn_hash: &TxnHash,
        block_height: u64,
        verify_signatures: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        if meta.coin_to_transfer_nanos == 0 {
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
        let prev_coin = profile.creator_coin.clone();

        let sender_pkid = self.pkid_for_public_key(&txn.public_key)?.pkid;
        let receiver_pkid = self.pkid_for_public_key(&meta.receiver_public_key)?.pkid;
        let sender_key = BalanceKey::new(sender_pkid, creator_pkid);
        let receiver_key = BalanceKey::new(receiver_pkid, creator_pkid);

        let prev_sender_balance = self
            .creator_coin_balance(&sender_key)?
            .filter(|entry| !entry.is_deleted);
        let prev_receiver_balance = self
            .creator_coin_balance(&receiver_key)?
            .filter(|entry| !entry.is_deleted);

        let sender_balance = prev_sender_balance
            .as_ref()
            .map_or(U256::zero(), |entry| entry.balance_nanos);
        if sender_balance < U256::from(meta.coin_to_transfer_nanos) {
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

        // Dust remainders consolidate into the transfer.
        let mut coins_to_transfer = meta.coin_to_transfer_nanos;
        let remainder = sender_balance - U256::from(coins_to_transfer);
        if remainder < U256::from(CREATOR_COIN_AUTO_SELL_THRESHOLD_NANOS) {
            coins_to_transfer = sender_balance.as_u64();
        }

        let (total_input, total_output, mut ops) =
            self.connect_basic_transfer(txn, txn_hash, block_height, verify_signatures)?;

        let mut holders = prev_coin.number_of_holders;

        let mut sender_entry = prev_sender_balance.clone().ok_or_else(|| {
            ViewError::Corruption("sender balance disappeared mid-connect".into())
        })?;
        sender_entry.balance_nanos = sender_entry.balance_nanos - U256::from(coins_to_transfer);
        if sender_entry.balance_nanos.is_zero() {
            holders = holders.saturating_sub(1);
            self.delete_creator_coin_balance(&sender_entry);
        } else {
            self.set_creator_coin_balance(sender_entry);
        }

        let mut receiver_entry = prev_receiver_balance
            .clone()
            .unwrap_or_else(|| BalanceEntry::new(receiver_pkid, creator_pkid));
        if receiver_entry.balance_nanos.is_zero() {
            holders += 1;
        }
        receiver_entry.balance_nanos = receiver_entry
            .balance_nanos
            .checked_add(U256::from(coins_to_transfer))
            .ok_or(RuleError::AmountOverflow)?;
        self.set_creator_coin_balance(receiver_entry);

        profile.creator_coin.number_of_holders = holders;
        self.set_profile(creator_pkid, profile);

        ops.push(UndoOp::CreatorCoinTransfer {
            creator_pkid,
            prev_coin,
            sender_balance_key: sender_key,
            prev_sender_balance,
            receiver_balance_key: receiver_key,
            prev_receiver_balance,
        });
        Ok((total_input, total_output, ops))
    }

    pub(crate) fn disconnect_creator_coin_transfer(
        &mut self,
        txn: &Transaction,
        _meta: &CreatorCoinTransferMetadata,
        txn_hash: &TxnHash,
        ops: &mut Vec<UndoOp>,
        block_height: u64,
    ) -> Result<(), ViewError> {
        let op = self.pop_kind_op(ops, TxnKind::CreatorCoinTransfer)?;
        let UndoOp::CreatorCoinTransfer {
            creator_pkid,
            prev_coin,
            sender_balance_key,
            prev_sender_balance,
            receiver_balance_key,
            prev_receiver_balance,
        } = op
        else {
            return Err(ViewError::Corruption(
                "expected a creator-coin-transfer undo operation".into(),
            ));
        };

        let mut profile = self
            .profile_for_pkid(&creator_pkid)?
            .filter(|profile| !profile.is_deleted)
            .ok_or_else(|| {
                ViewError::Corruption("creator profile missing during disconnect".into())
            })?;
        profile.creator_coin = prev_coin;
        self.set_profile(creator_pkid, profile);

        self.restore_creator_coin_balance(sender_balance_key, prev_sender_balance)?;
        self.restore_creator_coin_balance(receiver_balance_key, prev_receiver_balance)?;

        self.disconnect_basic_transfer(txn, txn_hash, ops, block_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Cube root ───────────────────────────────────────────────────────

    #[test]
    fn cbrt_is_floor_root() {
        for n in [0u64, 1, 2, 8, 27, 1_000_000, 123_456_789, 1_000_000_000_000_000_000] {
            let root = cbrt_floor(U256::from(n)).as_u64();
            assert!(root.pow(3) <= n, "cbrt({n}) = {root} overshoots");
            assert!(
                (root + 1).checked_pow(3).map_or(true, |next| next > n),
                "cbrt({n}) = {root} undershoots"
            );
        }
    }

    #[test]
    fn cbrt_floor_behavior() {
        assert_eq!(cbrt_floor(U256::from(7u64)), U256::from(1u64));
        assert_eq!(cbrt_floor(U256::from(8u64)), U256::from(2u64));
        assert_eq!(cbrt_floor(U256::from(26u64)), U256::from(2u64));
        assert_eq!(cbrt_floor(U256::from(27u64)), U256::from(3u64));
    }

    #[test]
    fn cbrt_large_values() {
        // 10^30 = (10^10)^3
        let n = U256::from(10u64).pow(U256::from(30u64));
        assert_eq!(cbrt_floor(n), U256::from(10_000_000_000u64));
    }

    // ── Polynomial initialization ───────────────────────────────────────

    #[test]
    fn one_token_mints_ten_coins_from_zero() {
        // 1 native token = 1e9 nanos -> 10 coins = 1e10 coin nanos.
        assert_eq!(polynomial_supply(1_000_000_000), U256::from(10_000_000_000u64));
    }

    #[test]
    fn polynomial_supply_is_monotone() {
        let mut last = U256::zero();
        for nanos in [1u64, 10, 1_000, 1_000_000, 1_000_000_000, 5_000_000_000] {
            let supply = polynomial_supply(nanos);
            assert!(supply >= last);
            last = supply;
        }
    }

    // ── Transfer restrictions ───────────────────────────────────────────

    #[test]
    fn restriction_matrix() {
        let owner = PublicKey::new([1u8; 33]);
        let alice = PublicKey::new([2u8; 33]);
        let bob = PublicKey::new([3u8; 33]);

        use TransferRestrictionStatus::*;
        assert!(transfer_allowed(Unrestricted, &alice, &bob, &owner, false));
        assert!(transfer_allowed(
            PermanentlyUnrestricted,
            &alice,
            &bob,
            &owner,
            false
        ));
        assert!(transfer_allowed(ProfileOwnerOnly, &owner, &bob, &owner, false));
        assert!(transfer_allowed(ProfileOwnerOnly, &alice, &owner, &owner, false));
        assert!(!transfer_allowed(ProfileOwnerOnly, &alice, &bob, &owner, false));
        assert!(transfer_allowed(HoldersOnly, &alice, &bob, &owner, true));
        assert!(!transfer_allowed(HoldersOnly, &alice, &bob, &owner, false));
    }
}
