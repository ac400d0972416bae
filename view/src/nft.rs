//! NFT lifecycle handlers: mint, sale-state updates, transfers, and burns.
//!
//! The market side (bids and accepted bids) lives in `nft_market`.

use crate::error::{RuleError, ViewError};
use crate::undo::UndoOp;
use crate::view::LedgerView;
use plaza_transactions::{
    AcceptNftTransferMetadata, BurnNftMetadata, CreateNftMetadata, NftTransferMetadata,
    Transaction, TxnKind, UpdateNftMetadata,
};
use plaza_types::params::MAX_BASIS_POINTS;
use plaza_types::{NftEntry, NftKey, Pkid, TxnHash};
use std::collections::BTreeMap;

impl LedgerView {
    // ── CreateNFT ───────────────────────────────────────────────────────

    pub(crate) fn connect_create_nft(
        &mut self,
        txn: &Transaction,
        meta: &CreateNftMetadata,
        txn_hash: &TxnHash,
        block_height: u64,
        verify_signatures: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        let prev_post = self
            .post_entry(&meta.nft_post_hash)?
            .filter(|post| !post.is_deleted)
            .ok_or(RuleError::CreateNftOnNonexistentPost)?;

        if prev_post.poster_public_key != txn.public_key {
            return Err(RuleError::CreateNftMustBePostAuthor.into());
        }
        if prev_post.is_nft {
            return Err(RuleError::CreateNftOnPostThatAlreadyIsNft.into());
        }
        if prev_post.is_vanilla_repost() {
            return Err(RuleError::CreateNftOnVanillaRepost.into());
        }
        if meta.num_copies == 0 {
            return Err(RuleError::CreateNftMustHaveNonZeroCopies.into());
        }
        if meta.num_copies > self.global_params.max_copies_per_nft {
            return Err(RuleError::TooManyNftCopies.into());
        }
        if meta.has_unlockable && meta.is_buy_now {
            return Err(RuleError::CannotHaveUnlockableAndBuyNowNft.into());
        }

        // Royalties need a profile to flow into.
        let poster_pkid = self.pkid_for_public_key(&txn.public_key)?.pkid;
        if self
            .profile_for_pkid(&poster_pkid)?
            .filter(|profile| !profile.is_deleted)
            .is_none()
        {
            return Err(RuleError::CannotCreateNftWithoutProfile.into());
        }

        // Resolve additional royalty keys to stable identifiers and bound
        // the total royalty take.
        let mut creator_royalties: BTreeMap<Pkid, u64> = BTreeMap::new();
        for (public_key, basis_points) in &meta.additional_royalties_to_creators {
            let pkid = self.pkid_for_public_key(public_key)?.pkid;
            if pkid == poster_pkid {
                return Err(RuleError::CannotSpecifyCreatorAsAdditionalRoyalty.into());
            }
            creator_royalties.insert(pkid, *basis_points);
        }
        let mut coin_royalties: BTreeMap<Pkid, u64> = BTreeMap::new();
        for (public_key, basis_points) in &meta.additional_royalties_to_coins {
            let pkid = self.pkid_for_public_key(public_key)?.pkid;
            if pkid == poster_pkid {
                return Err(RuleError::CannotSpecifyCreatorAsAdditionalRoyalty.into());
            }
            coin_royalties.insert(pkid, *basis_points);
        }
        let additional_total: u64 = creator_royalties
            .values()
            .chain(coin_royalties.values())
            .try_fold(0u64, |acc, bp| acc.checked_add(*bp))
            .ok_or(RuleError::NftRoyaltyExceedsMax)?;
        let royalty_total = meta
            .nft_royalty_to_creator_basis_points
            .checked_add(meta.nft_royalty_to_coin_basis_points)
            .and_then(|sum| sum.checked_add(additional_total))
            .ok_or(RuleError::NftRoyaltyExceedsMax)?;
        if royalty_total > MAX_BASIS_POINTS {
            return Err(RuleError::NftRoyaltyExceedsMax.into());
        }

        let (total_input, total_output, mut ops) =
            self.connect_basic_transfer(txn, txn_hash, block_height, verify_signatures)?;

        // Minting burns a per-copy fee, paid as transaction fees.
        let mint_fee = meta
            .num_copies
            .checked_mul(self.global_params.create_nft_fee_nanos)
            .ok_or(RuleError::AmountOverflow)?;
        if total_input.saturating_sub(total_output) < mint_fee {
            return Err(RuleError::CreateNftWithInsufficientFunds.into());
        }

        let mut new_post = prev_post.clone();
        new_post.is_nft = true;
        new_post.num_nft_copies = meta.num_copies;
        new_post.num_nft_copies_for_sale = if meta.is_for_sale { meta.num_copies } else { 0 };
        new_post.num_nft_copies_burned = 0;
        new_post.has_unlockable = meta.has_unlockable;
        new_post.nft_royalty_to_creator_basis_points = meta.nft_royalty_to_creator_basis_points;
        new_post.nft_royalty_to_coin_basis_points = meta.nft_royalty_to_coin_basis_points;
        new_post.additional_nft_royalties_to_creators = creator_royalties;
        new_post.additional_nft_royalties_to_coins = coin_royalties;
        self.set_post(new_post);

        for serial_number in 1..=meta.num_copies {
            self.set_nft(NftEntry {
                last_owner_pkid: None,
                owner_pkid: poster_pkid,
                post_hash: meta.nft_post_hash,
                serial_number,
                is_for_sale: meta.is_for_sale,
                min_bid_amount_nanos: meta.min_bid_amount_nanos,
                unlockable_text: Vec::new(),
                last_accepted_bid_amount_nanos: 0,
                is_pending: false,
                is_buy_now: meta.is_buy_now,
                buy_now_price_nanos: meta.buy_now_price_nanos,
                is_deleted: false,
            });
        }

        ops.push(UndoOp::CreateNft {
            post_hash: meta.nft_post_hash,
            num_copies: meta.num_copies,
            prev_post,
        });
        Ok((total_input, total_output, ops))
    }

    pub(crate) fn disconnect_create_nft(
        &mut self,
        txn: &Transaction,
        _meta: &CreateNftMetadata,
        txn_hash: &TxnHash,
        ops: &mut Vec<UndoOp>,
        block_height: u64,
    ) -> Result<(), ViewError> {
        let op = self.pop_kind_op(ops, TxnKind::CreateNft)?;
        let UndoOp::CreateNft {
            post_hash,
            num_copies,
            prev_post,
        } = op
        else {
            return Err(ViewError::Corruption(
                "expected a create-nft undo operation".into(),
            ));
        };

        for serial_number in 1..=num_copies {
            let key = NftKey::new(post_hash, serial_number);
            let entry = self
                .nft_entry(&key)?
                .filter(|entry| !entry.is_deleted)
                .ok_or_else(|| {
                    ViewError::Corruption("minted nft entry missing during disconnect".into())
                })?;
            self.delete_nft(&entry);
        }
        self.set_post(prev_post);

        self.disconnect_basic_transfer(txn, txn_hash, ops, block_height)
    }

    // ── UpdateNFT ───────────────────────────────────────────────────────

    pub(crate) fn connect_update_nft(
        &mut self,
        txn: &Transaction,
        meta: &UpdateNftMetadata,
        txn_hash: &TxnHash,
        block_height: u64,
        verify_signatures: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        let nft_key = NftKey::new(meta.nft_post_hash, meta.serial_number);
        let prev_nft = self
            .nft_entry(&nft_key)?
            .filter(|entry| !entry.is_deleted)
            .ok_or(RuleError::NftDoesNotExist)?;

        let transactor_pkid = self.pkid_for_public_key(&txn.public_key)?.pkid;
        if prev_nft.owner_pkid != transactor_pkid {
            return Err(RuleError::OnlyOwnerCanUpdateNft.into());
        }
        if prev_nft.is_pending {
            return Err(RuleError::CannotUpdatePendingNftTransfer.into());
        }

        let prev_post = self
            .post_entry(&meta.nft_post_hash)?
            .filter(|post| !post.is_deleted)
            .ok_or_else(|| ViewError::Corruption("nft entry without a post".into()))?;

        if meta.is_buy_now && prev_post.has_unlockable {
            return Err(RuleError::CannotHaveUnlockableAndBuyNowNft.into());
        }

        let (total_input, total_output, mut ops) =
            self.connect_basic_transfer(txn, txn_hash, block_height, verify_signatures)?;

        let mut new_nft = prev_nft.clone();
        new_nft.is_for_sale = meta.is_for_sale;
        new_nft.min_bid_amount_nanos = meta.min_bid_amount_nanos;
        new_nft.is_buy_now = meta.is_buy_now;
        new_nft.buy_now_price_nanos = meta.buy_now_price_nanos;
        self.set_nft(new_nft);

        // Flipping off sale voids the serial's open bids; the undo record
        // keeps them so disconnect restores the order book exactly.
        let mut deleted_bids = Vec::new();
        if prev_nft.is_for_sale && !meta.is_for_sale {
            for bid in self.bids_for_serial(&meta.nft_post_hash, meta.serial_number)? {
                self.delete_nft_bid(&bid);
                deleted_bids.push(bid);
            }
        }

        let mut new_post = prev_post.clone();
        if prev_nft.is_for_sale && !meta.is_for_sale {
            new_post.num_nft_copies_for_sale =
                new_post.num_nft_copies_for_sale.saturating_sub(1);
        } else if !prev_nft.is_for_sale && meta.is_for_sale {
            new_post.num_nft_copies_for_sale = new_post
                .num_nft_copies_for_sale
                .checked_add(1)
                .ok_or(RuleError::AmountOverflow)?;
        }
        self.set_post(new_post);

        ops.push(UndoOp::UpdateNft {
            nft_key,
            prev_nft,
            prev_post,
            deleted_bids,
        });
        Ok((total_input, total_output, ops))
    }

    pub(crate) fn disconnect_update_nft(
        &mut self,
        txn: &Transaction,
        _meta: &UpdateNftMetadata,
        txn_hash: &TxnHash,
        ops: &mut Vec<UndoOp>,
        block_height: u64,
    ) -> Result<(), ViewError> {
        let op = self.pop_kind_op(ops, TxnKind::UpdateNft)?;
        let UndoOp::UpdateNft {
            nft_key: _,
            prev_nft,
            prev_post,
            deleted_bids,
        } = op
        else {
            return Err(ViewError::Corruption(
                "expected an update-nft undo operation".into(),
            ));
        };

        self.set_nft(prev_nft);
        self.set_post(prev_post);
        for bid in deleted_bids {
            self.set_nft_bid(bid);
        }

        self.disconnect_basic_transfer(txn, txn_hash, ops, block_height)
    }

    // ── NFTTransfer / AcceptNFTTransfer / BurnNFT ───────────────────────

    pub(crate) fn connect_nft_transfer(
        &mut self,
        txn: &Transaction,
        meta: &NftTransferMetadata,
        txn_hash: &TxnHash,
        block_height: u64,
        verify_signatures: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        let nft_key = NftKey::new(meta.nft_post_hash, meta.serial_number);
        let prev_nft = self
            .nft_entry(&nft_key)?
            .filter(|entry| !entry.is_deleted)
            .ok_or(RuleError::NftDoesNotExist)?;

        let transactor_pkid = self.pkid_for_public_key(&txn.public_key)?.pkid;
        if prev_nft.owner_pkid != transactor_pkid {
            return Err(RuleError::OnlyOwnerCanTransferNft.into());
        }
        if prev_nft.is_for_sale {
            return Err(RuleError::CannotTransferForSaleNft.into());
        }
        if prev_nft.is_pending {
            return Err(RuleError::CannotTransferPendingNft.into());
        }
        if meta.receiver_public_key == txn.public_key {
            return Err(RuleError::NftTransferCannotTransferToSelf.into());
        }

        let post = self
            .post_entry(&meta.nft_post_hash)?
            .filter(|post| !post.is_deleted)
            .ok_or_else(|| ViewError::Corruption("nft entry without a post".into()))?;
        // Unlockable text travels once, addressed to the first recipient.
        if !meta.unlockable_text.is_empty()
            && (!post.has_unlockable || !prev_nft.unlockable_text.is_empty())
        {
            return Err(RuleError::UnlockableNftMustProvideUnlockableText.into());
        }

        let receiver_pkid = self.pkid_for_public_key(&meta.receiver_public_key)?.pkid;

        let (total_input, total_output, mut ops) =
            self.connect_basic_transfer(txn, txn_hash, block_height, verify_signatures)?;

        let mut new_nft = prev_nft.clone();
        new_nft.last_owner_pkid = Some(prev_nft.owner_pkid);
        new_nft.owner_pkid = receiver_pkid;
        new_nft.is_pending = true;
        if !meta.unlockable_text.is_empty() {
            new_nft.unlockable_text = meta.unlockable_text.clone();
        }
        self.set_nft(new_nft);

        ops.push(UndoOp::NftTransfer { nft_key, prev_nft });
        Ok((total_input, total_output, ops))
    }

    pub(crate) fn disconnect_nft_transfer(
        &mut self,
        txn: &Transaction,
        _meta: &NftTransferMetadata,
        txn_hash: &TxnHash,
        ops: &mut Vec<UndoOp>,
        block_height: u64,
    ) -> Result<(), ViewError> {
        let op = self.pop_kind_op(ops, TxnKind::NftTransfer)?;
        let UndoOp::NftTransfer { nft_key: _, prev_nft } = op else {
            return Err(ViewError::Corruption(
                "expected an nft-transfer undo operation".into(),
            ));
        };
        self.set_nft(prev_nft);
        self.disconnect_basic_transfer(txn, txn_hash, ops, block_height)
    }

    pub(crate) fn connect_accept_nft_transfer(
        &mut self,
        txn: &Transaction,
        meta: &AcceptNftTransferMetadata,
        txn_hash: &TxnHash,
        block_height: u64,
        verify_signatures: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        let nft_key = NftKey::new(meta.nft_post_hash, meta.serial_number);
        let prev_nft = self
            .nft_entry(&nft_key)?
            .filter(|entry| !entry.is_deleted)
            .ok_or(RuleError::NftDoesNotExist)?;

        let transactor_pkid = self.pkid_for_public_key(&txn.public_key)?.pkid;
        if prev_nft.owner_pkid != transactor_pkid {
            return Err(RuleError::OnlyOwnerCanAcceptNftTransfer.into());
        }
        if !prev_nft.is_pending {
            return Err(RuleError::AcceptNftTransferOnNonPendingNft.into());
        }

        let (total_input, total_output, mut ops) =
            self.connect_basic_transfer(txn, txn_hash, block_height, verify_signatures)?;

        let mut new_nft = prev_nft.clone();
        new_nft.is_pending = false;
        self.set_nft(new_nft);

        ops.push(UndoOp::AcceptNftTransfer { nft_key, prev_nft });
        Ok((total_input, total_output, ops))
    }

    pub(crate) fn disconnect_accept_nft_transfer(
        &mut self,
        txn: &Transaction,
        _meta: &AcceptNftTransferMetadata,
        txn_hash: &TxnHash,
        ops: &mut Vec<UndoOp>,
        block_height: u64,
    ) -> Result<(), ViewError> {
        let op = self.pop_kind_op(ops, TxnKind::AcceptNftTransfer)?;
        let UndoOp::AcceptNftTransfer { nft_key: _, prev_nft } = op else {
            return Err(ViewError::Corruption(
                "expected an accept-nft-transfer undo operation".into(),
            ));
        };
        self.set_nft(prev_nft);
        self.disconnect_basic_transfer(txn, txn_hash, ops, block_height)
    }

    pub(crate) fn connect_burn_nft(
        &mut self,
        txn: &Transaction,
        meta: &BurnNftMetadata,
        txn_hash: &TxnHash,
        block_height: u64,
        verify_signatures: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        let nft_key = NftKey::new(meta.nft_post_hash, meta.serial_number);
        let prev_nft = self
            .nft_entry(&nft_key)?
            .filter(|entry| !entry.is_deleted)
            .ok_or(RuleError::NftDoesNotExist)?;

        let transactor_pkid = self.pkid_for_public_key(&txn.public_key)?.pkid;
        if prev_nft.owner_pkid != transactor_pkid {
            return Err(RuleError::OnlyOwnerCanBurnNft.into());
        }
        if prev_nft.is_for_sale {
            return Err(RuleError::CannotBurnNftThatIsForSale.into());
        }

        let prev_post = self
            .post_entry(&meta.nft_post_hash)?
            .filter(|post| !post.is_deleted)
            .ok_or_else(|| ViewError::Corruption("nft entry without a post".into()))?;

        let (total_input, total_output, mut ops) =
            self.connect_basic_transfer(txn, txn_hash, block_height, verify_signatures)?;

        self.delete_nft(&prev_nft);

        let mut new_post = prev_post.clone();
        new_post.num_nft_copies_burned = new_post
            .num_nft_copies_burned
            .checked_add(1)
            .ok_or(RuleError::AmountOverflow)?;
        self.set_post(new_post);

        ops.push(UndoOp::BurnNft {
            nft_key,
            prev_nft,
            prev_post,
        });
        Ok((total_input, total_output, ops))
    }

    pub(crate) fn disconnect_burn_nft(
        &mut self,
        txn: &Transaction,
        _meta: &BurnNftMetadata,
        txn_hash: &TxnHash,
        ops: &mut Vec<UndoOp>,
        block_height: u64,
    ) -> Result<(), ViewError> {
        let op = self.pop_kind_op(ops, TxnKind::BurnNft)?;
        let UndoOp::BurnNft {
            nft_key: _,
            prev_nft,
            prev_post,
        } = op
        else {
            return Err(ViewError::Corruption(
                "expected a burn-nft undo operation".into(),
            ));
        };
        self.set_nft(prev_nft);
        self.set_post(prev_post);
        self.disconnect_basic_transfer(txn, txn_hash, ops, block_height)
    }
}
