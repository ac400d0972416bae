//! The NFT market: bids, buy-now execution, and accepted bids with royalty
//! distribution.
//!
//! An accepted bid and a buy-now bid share one sale flow: spend the buyer's
//! funds, split the amount into royalties/seller proceeds/change as
//! implicit outputs, credit coin royalties into profile reserves, move
//! ownership, and append the serial's accepted-bid history. Royalty splits
//! always sum exactly to the bid; the seller absorbs rounding dust.

use crate::error::{RuleError, ViewError};
use crate::undo::{AcceptedBidUndo, RoyaltyPayout, UndoOp};
use crate::view::LedgerView;
use plaza_transactions::{AcceptNftBidMetadata, NftBidMetadata, Transaction, TxnKind};
use plaza_types::params::MAX_BASIS_POINTS;
use plaza_types::{
    NftBidEntry, NftBidKey, NftEntry, NftKey, Pkid, PublicKey, TxnHash, UtxoEntry, UtxoKey,
    UtxoType,
};

fn royalty_nanos(bid_amount: u64, basis_points: u64) -> u64 {
    ((bid_amount as u128 * basis_points as u128) / MAX_BASIS_POINTS as u128) as u64
}

impl LedgerView {
    // ── NFTBid ──────────────────────────────────────────────────────────

    pub(crate) fn connect_nft_bid(
        &mut self,
        txn: &Transaction,
        meta: &NftBidMetadata,
        txn_hash: &TxnHash,
        block_height: u64,
        verify_signatures: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        let nft_key = NftKey::new(meta.nft_post_hash, meta.serial_number);
        let nft = self
            .nft_entry(&nft_key)?
            .filter(|entry| !entry.is_deleted)
            .ok_or(RuleError::NftDoesNotExist)?;

        let bidder_pkid = self.pkid_for_public_key(&txn.public_key)?.pkid;
        if nft.owner_pkid == bidder_pkid {
            return Err(RuleError::NftOwnerCannotBidOnOwnedNft.into());
        }

        let bid_key = NftBidKey {
            bidder_pkid,
            post_hash: meta.nft_post_hash,
            serial_number: meta.serial_number,
        };
        let prev_bid = self
            .nft_bid_entry(&bid_key)?
            .filter(|entry| !entry.is_deleted);

        // A zero bid cancels.
        if meta.bid_amount_nanos == 0 {
            let existing = prev_bid.ok_or(RuleError::CannotCancelNonexistentBid)?;

            let (total_input, total_output, mut ops) =
                self.connect_basic_transfer(txn, txn_hash, block_height, verify_signatures)?;

            self.delete_nft_bid(&existing);
            ops.push(UndoOp::NftBid {
                bid_key,
                prev_bid: Some(existing),
                buy_now: None,
            });
            return Ok((total_input, total_output, ops));
        }

        if !nft.is_for_sale {
            return Err(RuleError::NftBidOnNftThatIsNotForSale.into());
        }
        if meta.bid_amount_nanos < nft.min_bid_amount_nanos {
            return Err(RuleError::NftBidLessThanMinBidAmount.into());
        }
        // A bid is a standing claim on funds the bidder must actually have.
        if self.balance_nanos(&txn.public_key)? < meta.bid_amount_nanos {
            return Err(RuleError::InsufficientFundsForNftBid.into());
        }

        let (total_input, total_output, mut ops) =
            self.connect_basic_transfer(txn, txn_hash, block_height, verify_signatures)?;

        // A bid meeting a buy-now price executes the sale on the spot,
        // funded by this transaction's own input surplus.
        if nft.is_buy_now && meta.bid_amount_nanos >= nft.buy_now_price_nanos {
            let surplus = total_input.saturating_sub(total_output);
            if surplus < meta.bid_amount_nanos {
                return Err(RuleError::InsufficientFundsForNftBid.into());
            }

            let seller_public_key = self.public_key_for_pkid(&nft.owner_pkid)?;
            let (payload, input_delta, output_delta) = self.connect_nft_sale(
                txn_hash,
                block_height,
                nft_key,
                nft,
                meta.bid_amount_nanos,
                bidder_pkid,
                seller_public_key,
                &[],
                &[],
                None,
                txn.outputs.len() as u32,
            )?;

            ops.push(UndoOp::NftBid {
                bid_key,
                prev_bid,
                buy_now: Some(Box::new(payload)),
            });
            let total_input = total_input
                .checked_add(input_delta)
                .ok_or(RuleError::AmountOverflow)?;
            let total_output = total_output
                .checked_add(output_delta)
                .ok_or(RuleError::AmountOverflow)?;
            return Ok((total_input, total_output, ops));
        }

        self.set_nft_bid(NftBidEntry {
            bidder_pkid,
            post_hash: meta.nft_post_hash,
            serial_number: meta.serial_number,
            bid_amount_nanos: meta.bid_amount_nanos,
            is_deleted: false,
        });

        ops.push(UndoOp::NftBid {
            bid_key,
            prev_bid,
            buy_now: None,
        });
        Ok((total_input, total_output, ops))
    }

    pub(crate) fn disconnect_nft_bid(
        &mut self,
        txn: &Transaction,
        _meta: &NftBidMetadata,
        txn_hash: &TxnHash,
        ops: &mut Vec<UndoOp>,
        block_height: u64,
    ) -> Result<(), ViewError> {
        let op = self.pop_kind_op(ops, TxnKind::NftBid)?;
        let UndoOp::NftBid {
            bid_key,
            prev_bid,
            buy_now,
        } = op
        else {
            return Err(ViewError::Corruption(
                "expected an nft-bid undo operation".into(),
            ));
        };

        match buy_now {
            Some(payload) => {
                // The executed sale never persisted a bid entry, so only
                // the sale itself needs reversing.
                self.disconnect_nft_sale(*payload)?;
            }
            None => match prev_bid {
                Some(prev) => self.set_nft_bid(prev),
                None => {
                    let current = self
                        .nft_bid_entry(&bid_key)?
                        .filter(|entry| !entry.is_deleted)
                        .ok_or_else(|| {
                            ViewError::Corruption("bid entry missing during disconnect".into())
                        })?;
                    self.delete_nft_bid(&current);
                }
            },
        }

        self.disconnect_basic_transfer(txn, txn_hash, ops, block_height)
    }

    // ── AcceptNFTBid ────────────────────────────────────────────────────

    pub(crate) fn connect_accept_nft_bid(
        &mut self,
        txn: &Transaction,
        meta: &AcceptNftBidMetadata,
        txn_hash: &TxnHash,
        block_height: u64,
        verify_signatures: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        let nft_key = NftKey::new(meta.nft_post_hash, meta.serial_number);
        let nft = self
            .nft_entry(&nft_key)?
            .filter(|entry| !entry.is_deleted)
            .ok_or(RuleError::NftDoesNotExist)?;

        let seller_pkid = self.pkid_for_public_key(&txn.public_key)?.pkid;
        if nft.owner_pkid != seller_pkid {
            return Err(RuleError::OnlyOwnerCanAcceptNftBid.into());
        }
        if !nft.is_for_sale {
            return Err(RuleError::AcceptNftBidOnNftThatIsNotForSale.into());
        }

        let bidder_pkid = self.pkid_for_public_key(&meta.bidder_public_key)?.pkid;
        let bid_key = NftBidKey {
            bidder_pkid,
            post_hash: meta.nft_post_hash,
            serial_number: meta.serial_number,
        };
        let bid = self
            .nft_bid_entry(&bid_key)?
            .filter(|entry| !entry.is_deleted)
            .ok_or(RuleError::AcceptNftBidOnNonexistentBid)?;

        // The seller signs off on a specific amount, not whatever the bid
        // happens to be by the time the transaction mines.
        if meta.bid_amount_nanos != bid.bid_amount_nanos {
            return Err(RuleError::AcceptNftBidAmountMismatch.into());
        }
        if bid.bid_amount_nanos < nft.min_bid_amount_nanos {
            return Err(RuleError::NftBidLessThanMinBidAmount.into());
        }

        let post = self
            .post_entry(&meta.nft_post_hash)?
            .filter(|post| !post.is_deleted)
            .ok_or_else(|| ViewError::Corruption("nft entry without a post".into()))?;
        if post.has_unlockable
            && nft.unlockable_text.is_empty()
            && meta.unlockable_text.is_empty()
        {
            return Err(RuleError::UnlockableNftMustProvideUnlockableText.into());
        }

        let (total_input, total_output, mut ops) =
            self.connect_basic_transfer(txn, txn_hash, block_height, verify_signatures)?;

        let bid_amount = bid.bid_amount_nanos;
        let (payload, input_delta, output_delta) = self.connect_nft_sale(
            txn_hash,
            block_height,
            nft_key,
            nft,
            bid_amount,
            bidder_pkid,
            txn.public_key,
            &meta.bidder_inputs,
            &meta.unlockable_text,
            Some(bid),
            txn.outputs.len() as u32,
        )?;

        ops.push(UndoOp::AcceptNftBid(Box::new(payload)));
        let total_input = total_input
            .checked_add(input_delta)
            .ok_or(RuleError::AmountOverflow)?;
        let total_output = total_output
            .checked_add(output_delta)
            .ok_or(RuleError::AmountOverflow)?;
        Ok((total_input, total_output, ops))
    }

    pub(crate) fn disconnect_accept_nft_bid(
        &mut self,
        txn: &Transaction,
        _meta: &AcceptNftBidMetadata,
        txn_hash: &TxnHash,
        ops: &mut Vec<UndoOp>,
        block_height: u64,
    ) -> Result<(), ViewError> {
        let op = self.pop_kind_op(ops, TxnKind::AcceptNftBid)?;
        let UndoOp::AcceptNftBid(payload) = op else {
            return Err(ViewError::Corruption(
                "expected an accept-nft-bid undo operation".into(),
            ));
        };
        self.disconnect_nft_sale(*payload)?;
        self.disconnect_basic_transfer(txn, txn_hash, ops, block_height)
    }

    // ── Shared sale flow ────────────────────────────────────────────────

    /// Execute a sale of one serial for `bid_amount`, funded either by the
    /// bidder's own spent outputs (accepted bid) or by the surrounding
    /// transaction's input surplus (buy-now; `bidder_inputs` empty).
    ///
    /// Returns the undo payload plus the amounts to add to the
    /// transaction's total input and output for conservation.
    #[allow(clippy::too_many_arguments)]
    fn connect_nft_sale(
        &mut self,
        txn_hash: &TxnHash,
        block_height: u64,
        nft_key: NftKey,
        prev_nft: NftEntry,
        bid_amount: u64,
        bidder_pkid: Pkid,
        seller_public_key: PublicKey,
        bidder_inputs: &[UtxoKey],
        unlockable_text: &[u8],
        prev_bid: Option<NftBidEntry>,
        mut next_output_index: u32,
    ) -> Result<(AcceptedBidUndo, u64, u64), ViewError> {
        let prev_post = self
            .post_entry(&nft_key.post_hash)?
            .filter(|post| !post.is_deleted)
            .ok_or_else(|| ViewError::Corruption("nft sale on a post that is gone".into()))?;

        // Spend the bidder's funding outputs, if this sale uses them.
        let bidder_public_key = self.public_key_for_pkid(&bidder_pkid)?;
        let mut spent_bidder_utxos: Vec<(UtxoKey, UtxoEntry)> = Vec::new();
        let mut bidder_input_total: u64 = 0;
        for input in bidder_inputs {
            let entry = self
                .utxo_entry(input)?
                .ok_or(RuleError::InputSpendsNonexistentUtxo)?;
            if entry.spent {
                return Err(RuleError::InputSpendsPreviouslySpentOutput.into());
            }
            if entry.public_key != bidder_public_key {
                return Err(RuleError::NftBidderInputMustBeOwnedByBidder.into());
            }
            bidder_input_total = bidder_input_total
                .checked_add(entry.amount_nanos)
                .filter(|total| *total <= self.params.max_nanos)
                .ok_or(RuleError::InputSpendsOutputWithInvalidAmount)?;
            self.spend_utxo(input)?;
            spent_bidder_utxos.push((*input, entry));
        }
        if !bidder_inputs.is_empty() && bidder_input_total < bid_amount {
            return Err(RuleError::AcceptNftBidBidderInputsInsufficientFunds.into());
        }
        let bidder_change = bidder_input_total.saturating_sub(bid_amount);

        // Split the bid. The seller gets whatever the royalties leave,
        // so the splits always sum exactly to the bid.
        let creator_royalty =
            royalty_nanos(bid_amount, prev_post.nft_royalty_to_creator_basis_points);
        let creator_coin_royalty =
            royalty_nanos(bid_amount, prev_post.nft_royalty_to_coin_basis_points);
        let additional_creator_royalties: Vec<RoyaltyPayout> = prev_post
            .additional_nft_royalties_to_creators
            .iter()
            .map(|(pkid, bp)| RoyaltyPayout {
                pkid: *pkid,
                amount_nanos: royalty_nanos(bid_amount, *bp),
            })
            .collect();
        let additional_coin_royalties: Vec<RoyaltyPayout> = prev_post
            .additional_nft_royalties_to_coins
            .iter()
            .map(|(pkid, bp)| RoyaltyPayout {
                pkid: *pkid,
                amount_nanos: royalty_nanos(bid_amount, *bp),
            })
            .collect();

        let royalties_total = additional_creator_royalties
            .iter()
            .chain(additional_coin_royalties.iter())
            .map(|payout| payout.amount_nanos)
            .try_fold(creator_royalty + creator_coin_royalty, |acc, amount| {
                acc.checked_add(amount)
            })
            .ok_or(RuleError::AmountOverflow)?;
        let seller_proceeds = bid_amount.checked_sub(royalties_total).ok_or_else(|| {
            ViewError::Corruption("royalties exceed the bid amount".into())
        })?;

        // Payments become implicit outputs appended after the explicit
        // ones, in a fixed order so reversal is deterministic.
        let mut payment_utxo_keys: Vec<UtxoKey> = Vec::new();
        let mut add_payment = |view: &mut Self,
                               amount: u64,
                               public_key: PublicKey,
                               utxo_type: UtxoType,
                               keys: &mut Vec<UtxoKey>|
         -> Result<(), ViewError> {
            if amount == 0 {
                return Ok(());
            }
            let key = UtxoKey::new(*txn_hash, next_output_index);
            next_output_index += 1;
            let entry = UtxoEntry::new(amount, public_key, block_height, utxo_type);
            let _ = view.add_utxo(&key, entry)?;
            keys.push(key);
            Ok(())
        };

        let poster_pkid = self.pkid_for_public_key(&prev_post.poster_public_key)?.pkid;
        let poster_payout_key = self.public_key_for_pkid(&poster_pkid)?;
        add_payment(
            self,
            seller_proceeds,
            seller_public_key,
            UtxoType::NftSeller,
            &mut payment_utxo_keys,
        )?;
        add_payment(
            self,
            creator_royalty,
            poster_payout_key,
            UtxoType::NftCreatorRoyalty,
            &mut payment_utxo_keys,
        )?;
        for payout in &additional_creator_royalties {
            let payout_key = self.public_key_for_pkid(&payout.pkid)?;
            add_payment(
                self,
                payout.amount_nanos,
                payout_key,
                UtxoType::NftAdditionalRoyalty,
                &mut payment_utxo_keys,
            )?;
        }
        add_payment(
            self,
            bidder_change,
            bidder_public_key,
            UtxoType::NftBidderChange,
            &mut payment_utxo_keys,
        )?;

        // Coin royalties flow into profile reserves rather than outputs.
        let mut prev_royalty_coin_entries: Vec<(Pkid, plaza_types::CoinEntry)> = Vec::new();
        let mut credit_coin = |view: &mut Self,
                               pkid: Pkid,
                               amount: u64,
                               prevs: &mut Vec<(Pkid, plaza_types::CoinEntry)>|
         -> Result<(), ViewError> {
            if amount == 0 {
                return Ok(());
            }
            let Some(mut profile) = view
                .profile_for_pkid(&pkid)?
                .filter(|profile| !profile.is_deleted)
            else {
                // No profile to credit: the royalty is burned.
                return Ok(());
            };
            prevs.push((pkid, profile.creator_coin.clone()));
            profile.creator_coin.locked_nanos = profile
                .creator_coin
                .locked_nanos
                .checked_add(amount)
                .filter(|locked| *locked <= view.params.max_nanos)
                .ok_or(RuleError::AmountOverflow)?;
            view.set_profile(pkid, profile);
            Ok(())
        };
        credit_coin(
            self,
            poster_pkid,
            creator_coin_royalty,
            &mut prev_royalty_coin_entries,
        )?;
        for payout in &additional_coin_royalties {
            credit_coin(
                self,
                payout.pkid,
                payout.amount_nanos,
                &mut prev_royalty_coin_entries,
            )?;
        }

        // Ownership moves; sale state resets; unlockable text is written
        // exactly once.
        let mut new_nft = prev_nft.clone();
        new_nft.last_owner_pkid = Some(prev_nft.owner_pkid);
        new_nft.owner_pkid = bidder_pkid;
        new_nft.is_for_sale = false;
        new_nft.min_bid_amount_nanos = 0;
        new_nft.is_buy_now = false;
        new_nft.buy_now_price_nanos = 0;
        new_nft.is_pending = false;
        new_nft.last_accepted_bid_amount_nanos = bid_amount;
        if !unlockable_text.is_empty() && new_nft.unlockable_text.is_empty() {
            new_nft.unlockable_text = unlockable_text.to_vec();
        }
        self.set_nft(new_nft);

        let mut new_post = prev_post.clone();
        new_post.num_nft_copies_for_sale = new_post.num_nft_copies_for_sale.saturating_sub(1);
        self.set_post(new_post);

        if let Some(bid) = &prev_bid {
            self.delete_nft_bid(bid);
        }

        let prev_accepted_history = self.accepted_bid_history(&nft_key)?;
        let mut history = prev_accepted_history.clone();
        history.push(NftBidEntry {
            bidder_pkid,
            post_hash: nft_key.post_hash,
            serial_number: nft_key.serial_number,
            bid_amount_nanos: bid_amount,
            is_deleted: false,
        });
        self.set_accepted_bid_history(nft_key, history);

        let payload = AcceptedBidUndo {
            nft_key,
            prev_nft,
            bid_key: NftBidKey {
                bidder_pkid,
                post_hash: nft_key.post_hash,
                serial_number: nft_key.serial_number,
            },
            prev_bid,
            prev_post,
            prev_accepted_history,
            spent_bidder_utxos,
            payment_utxo_keys,
            prev_royalty_coin_entries,
            creator_royalty_nanos: creator_royalty,
            creator_coin_royalty_nanos: creator_coin_royalty,
            additional_creator_royalties,
            additional_coin_royalties,
            seller_proceeds_nanos: seller_proceeds,
            bidder_change_nanos: bidder_change,
        };

        let output_delta = bid_amount
            .checked_add(bidder_change)
            .ok_or(RuleError::AmountOverflow)?;
        Ok((payload, bidder_input_total, output_delta))
    }

    /// Exact inverse of `connect_nft_sale`.
    fn disconnect_nft_sale(&mut self, payload: AcceptedBidUndo) -> Result<(), ViewError> {
        // Implicit payments go first, newest first.
        for key in payload.payment_utxo_keys.iter().rev() {
            self.unadd_utxo(key)?;
        }
        for (key, entry) in payload.spent_bidder_utxos.iter().rev() {
            self.unspend_utxo(key, entry)?;
        }

        for (pkid, prev_coin) in payload.prev_royalty_coin_entries.into_iter().rev() {
            let mut profile = self
                .profile_for_pkid(&pkid)?
                .filter(|profile| !profile.is_deleted)
                .ok_or_else(|| {
                    ViewError::Corruption("royalty profile missing during disconnect".into())
                })?;
            profile.creator_coin = prev_coin;
            self.set_profile(pkid, profile);
        }

        self.set_accepted_bid_history(payload.nft_key, payload.prev_accepted_history);
        match payload.prev_bid {
            Some(prev) => self.set_nft_bid(prev),
            None => {
                // Buy-now executions never persisted a bid to remove.
            }
        }
        self.set_post(payload.prev_post);
        self.set_nft(payload.prev_nft);
        Ok(())
    }
}
