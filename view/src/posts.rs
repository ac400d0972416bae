//! The SubmitPost handler: post creation and editing, including comment
//! and repost counter maintenance.

use crate::error::{RuleError, ViewError};
use crate::undo::UndoOp;
use crate::view::LedgerView;
use plaza_transactions::{SubmitPostMetadata, Transaction, TxnKind};
use plaza_types::params::MAX_POST_BODY_LENGTH_BYTES;
use plaza_types::{PostEntry, RepostEntry, RepostKey, TxnHash};
use std::collections::BTreeMap;

impl LedgerView {
    pub(crate) fn connect_submit_post(
        &mut self,
        txn: &Transaction,
        meta: &SubmitPostMetadata,
        txn_hash: &TxnHash,
        block_height: u64,
        verify_signatures: bool,
        ignore_utxos: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        if meta.body.len() > MAX_POST_BODY_LENGTH_BYTES {
            return Err(RuleError::SubmitPostBodyTooLong.into());
        }

        match meta.post_hash_to_modify {
            None => self.connect_create_post(
                txn,
                meta,
                txn_hash,
                block_height,
                verify_signatures,
                ignore_utxos,
            ),
            Some(post_hash) => self.connect_edit_post(
                txn,
                meta,
                txn_hash,
                post_hash,
                block_height,
                verify_signatures,
                ignore_utxos,
            ),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn connect_create_post(
        &mut self,
        txn: &Transaction,
        meta: &SubmitPostMetadata,
        txn_hash: &TxnHash,
        block_height: u64,
        verify_signatures: bool,
        ignore_utxos: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        if meta.timestamp_nanos == 0 {
            return Err(RuleError::SubmitPostTimestampIsZero.into());
        }
        // A post needs content unless it is a vanilla repost.
        if meta.body.is_empty() && (meta.reposted_post_hash.is_none() || meta.is_quoted_repost) {
            return Err(RuleError::SubmitPostBodyRequired.into());
        }

        // Timestamps order a poster's feed, so they must be unique.
        if self.post_exists_at_timestamp(&txn.public_key, meta.timestamp_nanos)? {
            return Err(RuleError::SubmitPostTimestampAlreadyUsed.into());
        }

        let prev_parent = match meta.parent_post_hash {
            Some(parent_hash) => Some(
                self.post_entry(&parent_hash)?
                    .filter(|post| !post.is_deleted)
                    .ok_or(RuleError::SubmitPostParentDoesNotExist)?,
            ),
            None => None,
        };
        let prev_reposted = match meta.reposted_post_hash {
            Some(reposted_hash) => Some(
                self.post_entry(&reposted_hash)?
                    .filter(|post| !post.is_deleted)
                    .ok_or(RuleError::SubmitPostRepostedPostDoesNotExist)?,
            ),
            None => None,
        };

        let (total_input, total_output, mut ops) = if ignore_utxos {
            (0, 0, Vec::new())
        } else {
            self.connect_basic_transfer(txn, txn_hash, block_height, verify_signatures)?
        };

        let is_vanilla_repost = meta.reposted_post_hash.is_some() && !meta.is_quoted_repost;

        let new_post = PostEntry {
            post_hash: *txn_hash,
            poster_public_key: txn.public_key,
            parent_post_hash: meta.parent_post_hash,
            body: meta.body.clone(),
            reposted_post_hash: meta.reposted_post_hash,
            is_quoted_repost: meta.is_quoted_repost,
            timestamp_nanos: meta.timestamp_nanos,
            is_hidden: meta.is_hidden,
            like_count: 0,
            repost_count: 0,
            quote_repost_count: 0,
            diamond_count: 0,
            comment_count: 0,
            is_pinned: false,
            confirmation_block_height: block_height,
            is_nft: false,
            num_nft_copies: 0,
            num_nft_copies_for_sale: 0,
            num_nft_copies_burned: 0,
            has_unlockable: false,
            nft_royalty_to_creator_basis_points: 0,
            nft_royalty_to_coin_basis_points: 0,
            additional_nft_royalties_to_creators: BTreeMap::new(),
            additional_nft_royalties_to_coins: BTreeMap::new(),
            extra_data: txn.extra_data.clone(),
            is_deleted: false,
        };
        self.set_post(new_post);

        // Bump the parent's comment counter.
        if let Some(parent) = &prev_parent {
            let mut updated = parent.clone();
            updated.comment_count = updated
                .comment_count
                .checked_add(1)
                .ok_or(RuleError::AmountOverflow)?;
            self.set_post(updated);
        }

        // Bump the reposted post's counters and maintain the repost
        // relation for vanilla reposts.
        let mut repost_key = None;
        let mut prev_repost_entry = None;
        if let Some(reposted) = &prev_reposted {
            let mut updated = reposted.clone();
            if is_vanilla_repost {
                updated.repost_count = updated
                    .repost_count
                    .checked_add(1)
                    .ok_or(RuleError::AmountOverflow)?;

                let key = RepostKey {
                    reposter_public_key: txn.public_key,
                    reposted_post_hash: reposted.post_hash,
                };
                prev_repost_entry =
                    self.repost_entry(&key)?.filter(|entry| !entry.is_deleted);
                self.set_repost(RepostEntry {
                    reposter_public_key: txn.public_key,
                    repost_post_hash: *txn_hash,
                    reposted_post_hash: reposted.post_hash,
                    is_deleted: false,
                });
                repost_key = Some(key);
            } else {
                updated.quote_repost_count = updated
                    .quote_repost_count
                    .checked_add(1)
                    .ok_or(RuleError::AmountOverflow)?;
            }
            self.set_post(updated);
        }

        ops.push(UndoOp::SubmitPost {
            post_hash: *txn_hash,
            prev_post: None,
            prev_parent,
            prev_reposted,
            repost_key,
            prev_repost_entry,
        });
        Ok((total_input, total_output, ops))
    }

    #[allow(clippy::too_many_arguments)]
    fn connect_edit_post(
        &mut self,
        txn: &Transaction,
        meta: &SubmitPostMetadata,
        txn_hash: &TxnHash,
        post_hash: TxnHash,
        block_height: u64,
        verify_signatures: bool,
        ignore_utxos: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        let prev_post = self
            .post_entry(&post_hash)?
            .filter(|post| !post.is_deleted)
            .ok_or(RuleError::SubmitPostModifyingNonexistentPost)?;

        if prev_post.poster_public_key != txn.public_key {
            return Err(RuleError::SubmitPostPostModificationNotAuthorized.into());
        }
        // Minted posts are frozen; markets depend on their metadata.
        if prev_post.is_nft {
            return Err(RuleError::SubmitPostCannotUpdateNft.into());
        }

        let (total_input, total_output, mut ops) = if ignore_utxos {
            (0, 0, Vec::new())
        } else {
            self.connect_basic_transfer(txn, txn_hash, block_height, verify_signatures)?
        };

        // Author, timestamp, parent, and repost target are immutable;
        // body and hidden flag change, extra data merges key-by-key.
        let mut new_post = prev_post.clone();
        if !meta.body.is_empty() {
            new_post.body = meta.body.clone();
        }
        new_post.is_hidden = meta.is_hidden;
        for (key, value) in &txn.extra_data {
            new_post.extra_data.insert(key.clone(), value.clone());
        }

        // Hiding or unhiding adjusts the counters the post contributed to.
        let mut prev_parent = None;
        let mut prev_reposted = None;
        let mut repost_key = None;
        let mut prev_repost_entry = None;
        if prev_post.is_hidden != new_post.is_hidden {
            let hiding = new_post.is_hidden;

            if let Some(parent_hash) = prev_post.parent_post_hash {
                if let Some(parent) = self
                    .post_entry(&parent_hash)?
                    .filter(|post| !post.is_deleted)
                {
                    let mut updated = parent.clone();
                    updated.comment_count = if hiding {
                        updated.comment_count.saturating_sub(1)
                    } else {
                        updated
                            .comment_count
                            .checked_add(1)
                            .ok_or(RuleError::AmountOverflow)?
                    };
                    self.set_post(updated);
                    prev_parent = Some(parent);
                }
            }

            if let Some(reposted_hash) = prev_post.reposted_post_hash {
                if let Some(reposted) = self
                    .post_entry(&reposted_hash)?
                    .filter(|post| !post.is_deleted)
                {
                    let mut updated = reposted.clone();
                    if prev_post.is_vanilla_repost() {
                        updated.repost_count = if hiding {
                            updated.repost_count.saturating_sub(1)
                        } else {
                            updated
                                .repost_count
                                .checked_add(1)
                                .ok_or(RuleError::AmountOverflow)?
                        };

                        let key = RepostKey {
                            reposter_public_key: txn.public_key,
                            reposted_post_hash: reposted.post_hash,
                        };
                        let existing =
                            self.repost_entry(&key)?.filter(|entry| !entry.is_deleted);
                        if hiding {
                            if let Some(entry) = &existing {
                                self.delete_repost(entry);
                            }
                        } else {
                            self.set_repost(RepostEntry {
                                reposter_public_key: txn.public_key,
                                repost_post_hash: post_hash,
                                reposted_post_hash: reposted.post_hash,
                                is_deleted: false,
                            });
                        }
                        repost_key = Some(key);
                        prev_repost_entry = existing;
                    } else {
                        updated.quote_repost_count = if hiding {
                            updated.quote_repost_count.saturating_sub(1)
                        } else {
                            updated
                                .quote_repost_count
                                .checked_add(1)
                                .ok_or(RuleError::AmountOverflow)?
                        };
                    }
                    self.set_post(updated);
                    prev_reposted = Some(reposted);
                }
            }
        }

        self.set_post(new_post);

        ops.push(UndoOp::SubmitPost {
            post_hash,
            prev_post: Some(prev_post),
            prev_parent,
            prev_reposted,
            repost_key,
            prev_repost_entry,
        });
        Ok((total_input, total_output, ops))
    }

    pub(crate) fn disconnect_submit_post(
        &mut self,
        txn: &Transaction,
        _meta: &SubmitPostMetadata,
        txn_hash: &TxnHash,
        ops: &mut Vec<UndoOp>,
        block_height: u64,
    ) -> Result<(), ViewError> {
        let op = self.pop_kind_op(ops, TxnKind::SubmitPost)?;
        let UndoOp::SubmitPost {
            post_hash,
            prev_post,
            prev_parent,
            prev_reposted,
            repost_key,
            prev_repost_entry,
        } = op
        else {
            return Err(ViewError::Corruption(
                "expected a submit-post undo operation".into(),
            ));
        };

        let current = self
            .post_entry(&post_hash)?
            .filter(|post| !post.is_deleted)
            .ok_or_else(|| {
                ViewError::Corruption("post entry missing during disconnect".into())
            })?;

        match prev_post {
            Some(prev) => self.set_post(prev),
            None => self.delete_post(&current),
        }
        if let Some(parent) = prev_parent {
            self.set_post(parent);
        }
        if let Some(reposted) = prev_reposted {
            self.set_post(reposted);
        }
        if let Some(key) = repost_key {
            if let Some(current_repost) =
                self.repost_entry(&key)?.filter(|entry| !entry.is_deleted)
            {
                self.delete_repost(&current_repost);
            }
            if let Some(prev) = prev_repost_entry {
                self.set_repost(prev);
            }
        }

        self.disconnect_basic_transfer(txn, txn_hash, ops, block_height)
    }
}
