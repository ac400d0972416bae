//! Profile and identity handlers: UpdateProfile and SwapIdentity.

use crate::error::{RuleError, ViewError};
use crate::undo::UndoOp;
use crate::view::LedgerView;
use plaza_transactions::{SwapIdentityMetadata, Transaction, TxnKind, UpdateProfileMetadata};
use plaza_types::params::{
    MAX_BASIS_POINTS, MAX_PROFILE_DESCRIPTION_LENGTH_BYTES, MAX_PROFILE_PIC_LENGTH_BYTES,
    MAX_USERNAME_LENGTH_BYTES,
};
use plaza_types::{CoinEntry, PkidEntry, ProfileEntry, UsernameKey, TxnHash};

fn is_valid_username(username: &[u8]) -> bool {
    !username.is_empty()
        && username.len() <= MAX_USERNAME_LENGTH_BYTES
        && username
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || *b == b'_')
}

impl LedgerView {
    // ── UpdateProfile ───────────────────────────────────────────────────

    /// Create or update a profile. A profile reserves its username
    /// case-insensitively; first creation pays the profile-creation fee.
    pub(crate) fn connect_update_profile(
        &mut self,
        txn: &Transaction,
        meta: &UpdateProfileMetadata,
        txn_hash: &TxnHash,
        block_height: u64,
        verify_signatures: bool,
        ignore_utxos: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        // A param updater may operate on someone else's profile; everyone
        // else only on their own.
        let target_key = meta.profile_public_key.unwrap_or(txn.public_key);
        if target_key != txn.public_key && !self.params.is_param_updater(&txn.public_key) {
            return Err(RuleError::UpdateProfileNotAuthorized.into());
        }

        if meta.new_description.len() > MAX_PROFILE_DESCRIPTION_LENGTH_BYTES {
            return Err(RuleError::ProfileDescriptionTooLong.into());
        }
        if meta.new_profile_pic.len() > MAX_PROFILE_PIC_LENGTH_BYTES {
            return Err(RuleError::ProfilePicTooLong.into());
        }
        if meta.new_creator_basis_points > MAX_BASIS_POINTS {
            return Err(RuleError::ProfileCreatorBasisPointsExceedsMax.into());
        }

        let target_pkid = self.pkid_for_public_key(&target_key)?.pkid;
        let prev_profile = self
            .profile_for_pkid(&target_pkid)?
            .filter(|profile| !profile.is_deleted);

        if !meta.new_username.is_empty() {
            if !is_valid_username(&meta.new_username) {
                return Err(RuleError::InvalidUsername.into());
            }
            // Case-insensitive uniqueness.
            let username_key = UsernameKey::from_username(&meta.new_username);
            if let Some(existing) = self
                .profile_for_username(&username_key)?
                .filter(|profile| !profile.is_deleted)
            {
                if existing.public_key != target_key {
                    return Err(RuleError::ProfileUsernameExists.into());
                }
            }
        } else if prev_profile.is_none() {
            // Creation requires a username.
            return Err(RuleError::InvalidUsername.into());
        }

        let (total_input, total_output, mut ops) = if ignore_utxos {
            (0, 0, Vec::new())
        } else {
            self.connect_basic_transfer(txn, txn_hash, block_height, verify_signatures)?
        };

        // First creation pays the profile fee out of the transaction fees.
        if prev_profile.is_none()
            && !ignore_utxos
            && self.global_params.create_profile_fee_nanos > 0
        {
            let fees = total_input.saturating_sub(total_output);
            if fees < self.global_params.create_profile_fee_nanos {
                return Err(RuleError::CreateProfileWithInsufficientFee.into());
            }
        }

        let mut new_profile = match &prev_profile {
            Some(existing) => existing.clone(),
            None => ProfileEntry {
                public_key: target_key,
                username: Vec::new(),
                description: Vec::new(),
                profile_pic: Vec::new(),
                is_hidden: false,
                creator_coin: CoinEntry::default(),
                dao_coin: CoinEntry::default(),
                is_deleted: false,
            },
        };
        if !meta.new_username.is_empty() {
            new_profile.username = meta.new_username.clone();
        }
        if !meta.new_description.is_empty() {
            new_profile.description = meta.new_description.clone();
        }
        if !meta.new_profile_pic.is_empty() {
            new_profile.profile_pic = meta.new_profile_pic.clone();
        }
        new_profile.is_hidden = meta.is_hidden;
        // The founder share is the one field that reaches into the
        // embedded coin entry; everything else in it is preserved.
        new_profile.creator_coin.creator_basis_points = meta.new_creator_basis_points;

        // Tombstone the old entry first so a changed username's old index
        // key gets deleted at flush.
        if let Some(existing) = &prev_profile {
            self.delete_profile(target_pkid, existing);
        }
        self.set_profile(target_pkid, new_profile);

        ops.push(UndoOp::UpdateProfile {
            pkid: target_pkid,
            prev_profile,
        });
        Ok((total_input, total_output, ops))
    }

    pub(crate) fn disconnect_update_profile(
        &mut self,
        txn: &Transaction,
        _meta: &UpdateProfileMetadata,
        txn_hash: &TxnHash,
        ops: &mut Vec<UndoOp>,
        block_height: u64,
    ) -> Result<(), ViewError> {
        let op = self.pop_kind_op(ops, TxnKind::UpdateProfile)?;
        let UndoOp::UpdateProfile { pkid, prev_profile } = op else {
            return Err(ViewError::Corruption(
                "expected an update-profile undo operation".into(),
            ));
        };

        let current = self
            .profile_for_pkid(&pkid)?
            .filter(|profile| !profile.is_deleted)
            .ok_or_else(|| {
                ViewError::Corruption("profile entry missing during disconnect".into())
            })?;
        self.delete_profile(pkid, &current);
        if let Some(prev) = prev_profile {
            self.set_profile(pkid, prev);
        }

        self.disconnect_basic_transfer(txn, txn_hash, ops, block_height)
    }

    // ── SwapIdentity ────────────────────────────────────────────────────

    /// Atomically swap the key↔identifier bindings of two public keys.
    /// Everything keyed by stable identifier is untouched.
    pub(crate) fn connect_swap_identity(
        &mut self,
        txn: &Transaction,
        meta: &SwapIdentityMetadata,
        txn_hash: &TxnHash,
        block_height: u64,
        verify_signatures: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        if !self.params.is_param_updater(&txn.public_key) {
            return Err(RuleError::SwapIdentityIsParamUpdaterOnly.into());
        }
        if meta.from_public_key == meta.to_public_key {
            return Err(RuleError::SwapIdentityCannotSwapIdenticalKeys.into());
        }

        let (total_input, total_output, mut ops) =
            self.connect_basic_transfer(txn, txn_hash, block_height, verify_signatures)?;

        // Reading mints identity mappings for keys never seen before, so
        // both sides always have entries to swap.
        let old_from = self.pkid_for_public_key(&meta.from_public_key)?;
        let old_to = self.pkid_for_public_key(&meta.to_public_key)?;

        let prev_forward = vec![
            (meta.from_public_key, Some(old_from.clone())),
            (meta.to_public_key, Some(old_to.clone())),
        ];
        let prev_reverse = vec![
            (old_from.pkid, Some(old_from.clone())),
            (old_to.pkid, Some(old_to.clone())),
        ];

        self.set_pkid_mappings(&PkidEntry {
            pkid: old_to.pkid,
            public_key: meta.from_public_key,
            is_deleted: false,
        });
        self.set_pkid_mappings(&PkidEntry {
            pkid: old_from.pkid,
            public_key: meta.to_public_key,
            is_deleted: false,
        });

        ops.push(UndoOp::SwapIdentity {
            prev_forward,
            prev_reverse,
        });
        Ok((total_input, total_output, ops))
    }

    pub(crate) fn disconnect_swap_identity(
        &mut self,
        txn: &Transaction,
        _meta: &SwapIdentityMetadata,
        txn_hash: &TxnHash,
        ops: &mut Vec<UndoOp>,
        block_height: u64,
    ) -> Result<(), ViewError> {
        let op = self.pop_kind_op(ops, TxnKind::SwapIdentity)?;
        let UndoOp::SwapIdentity {
            prev_forward,
            prev_reverse,
        } = op
        else {
            return Err(ViewError::Corruption(
                "expected a swap-identity undo operation".into(),
            ));
        };

        for (public_key, prev) in prev_forward {
            if let Some(entry) = prev {
                self.pkids_by_public_key.insert(public_key, entry);
            }
        }
        for (pkid, prev) in prev_reverse {
            if let Some(entry) = prev {
                self.public_keys_by_pkid.insert(pkid, entry);
            }
        }

        self.disconnect_basic_transfer(txn, txn_hash, ops, block_height)
    }
}
