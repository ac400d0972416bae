//! Follow and like handlers.
//!
//! Both are toggleable relations. Undo records carry the previous post
//! entry so counters are restored to their exact prior values, never merely
//! decremented.

use crate::error::{RuleError, ViewError};
use crate::undo::UndoOp;
use crate::view::LedgerView;
use plaza_transactions::{FollowMetadata, LikeMetadata, Transaction, TxnKind};
use plaza_types::{FollowEntry, FollowKey, LikeEntry, LikeKey, TxnHash};

impl LedgerView {
    // ── Follow ──────────────────────────────────────────────────────────

    pub(crate) fn connect_follow(
        &mut self,
        txn: &Transaction,
        meta: &FollowMetadata,
        txn_hash: &TxnHash,
        block_height: u64,
        verify_signatures: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        // The followee must have a profile; following a bare key is
        // meaningless.
        let followed_profile = self
            .profile_for_public_key(&meta.followed_public_key)?
            .filter(|profile| !profile.is_deleted)
            .ok_or(RuleError::CannotFollowNonexistentProfile)?;

        let follower_pkid = self.pkid_for_public_key(&txn.public_key)?.pkid;
        let followed_pkid = self
            .pkid_for_public_key(&followed_profile.public_key)?
            .pkid;
        let key = FollowKey {
            follower_pkid,
            followed_pkid,
        };
        let prev_entry = self
            .follow_entry(&key)?
            .filter(|entry| !entry.is_deleted);

        if meta.is_unfollow && prev_entry.is_none() {
            return Err(RuleError::CannotUnfollowNonexistentFollowEntry.into());
        }

        let (total_input, total_output, mut ops) =
            self.connect_basic_transfer(txn, txn_hash, block_height, verify_signatures)?;

        if meta.is_unfollow {
            if let Some(entry) = &prev_entry {
                self.delete_follow(entry);
            }
        } else if prev_entry.is_none() {
            self.set_follow(FollowEntry {
                follower_pkid,
                followed_pkid,
                is_deleted: false,
            });
        }
        // Re-following an existing follow is a no-op.

        ops.push(UndoOp::Follow { key, prev_entry });
        Ok((total_input, total_output, ops))
    }

    pub(crate) fn disconnect_follow(
        &mut self,
        txn: &Transaction,
        _meta: &FollowMetadata,
        txn_hash: &TxnHash,
        ops: &mut Vec<UndoOp>,
        block_height: u64,
    ) -> Result<(), ViewError> {
        let op = self.pop_kind_op(ops, TxnKind::Follow)?;
        let UndoOp::Follow { key, prev_entry } = op else {
            return Err(ViewError::Corruption(
                "expected a follow undo operation".into(),
            ));
        };

        match prev_entry {
            Some(prev) => self.set_follow(prev),
            None => {
                if let Some(current) = self
                    .follow_entry(&key)?
                    .filter(|entry| !entry.is_deleted)
                {
                    self.delete_follow(&current);
                }
            }
        }

        self.disconnect_basic_transfer(txn, txn_hash, ops, block_height)
    }

    // ── Like ────────────────────────────────────────────────────────────

    pub(crate) fn connect_like(
        &mut self,
        txn: &Transaction,
        meta: &LikeMetadata,
        txn_hash: &TxnHash,
        block_height: u64,
        verify_signatures: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        let prev_post = self
            .post_entry(&meta.liked_post_hash)?
            .filter(|post| !post.is_deleted)
            .ok_or(RuleError::CannotLikeNonexistentPost)?;

        let key = LikeKey {
            liker_public_key: txn.public_key,
            liked_post_hash: meta.liked_post_hash,
        };
        let prev_entry = self.like_entry(&key)?.filter(|entry| !entry.is_deleted);

        if meta.is_unlike {
            if prev_entry.is_none() {
                return Err(RuleError::CannotUnlikeWithoutAnExistingLike.into());
            }
        } else if prev_entry.is_some() {
            return Err(RuleError::LikeEntryAlreadyExists.into());
        }

        let (total_input, total_output, mut ops) =
            self.connect_basic_transfer(txn, txn_hash, block_height, verify_signatures)?;

        let mut new_post = prev_post.clone();
        if meta.is_unlike {
            new_post.like_count = new_post.like_count.checked_sub(1).ok_or_else(|| {
                ViewError::Corruption("like count underflow on unlike".into())
            })?;
            if let Some(entry) = &prev_entry {
                self.delete_like(entry);
            }
        } else {
            new_post.like_count = new_post
                .like_count
                .checked_add(1)
                .ok_or(RuleError::AmountOverflow)?;
            self.set_like(LikeEntry {
                liker_public_key: txn.public_key,
                liked_post_hash: meta.liked_post_hash,
                is_deleted: false,
            });
        }
        self.set_post(new_post);

        ops.push(UndoOp::Like {
            key,
            prev_entry,
            prev_post,
        });
        Ok((total_input, total_output, ops))
    }

    pub(crate) fn disconnect_like(
        &mut self,
        txn: &Transaction,
        _meta: &LikeMetadata,
        txn_hash: &TxnHash,
        ops: &mut Vec<UndoOp>,
        block_height: u64,
    ) -> Result<(), ViewError> {
        let op = self.pop_kind_op(ops, TxnKind::Like)?;
        let UndoOp::Like {
            key,
            prev_entry,
            prev_post,
        } = op
        else {
            return Err(ViewError::Corruption(
                "expected a like undo operation".into(),
            ));
        };

        match prev_entry {
            Some(prev) => self.set_like(prev),
            None => {
                if let Some(current) = self.like_entry(&key)?.filter(|entry| !entry.is_deleted) {
                    self.delete_like(&current);
                }
            }
        }
        self.set_post(prev_post);

        self.disconnect_basic_transfer(txn, txn_hash, ops, block_height)
    }
}
