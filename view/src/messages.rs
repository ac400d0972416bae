//! Private-message and messaging-group handlers.

use crate::error::{RuleError, ViewError};
use crate::undo::UndoOp;
use crate::view::LedgerView;
use plaza_transactions::{
    MessagingGroupMetadata, PrivateMessageMetadata, Transaction, TxnKind,
};
use plaza_types::message::{MAX_GROUP_KEY_NAME_CHARACTERS, MIN_GROUP_KEY_NAME_CHARACTERS};
use plaza_types::params::MAX_PRIVATE_MESSAGE_LENGTH_BYTES;
use plaza_types::{
    GroupKeyName, MessageEntry, MessageKey, MessagingGroupEntry, MessagingGroupKey,
    MessagingGroupMember, PublicKey, TxnHash,
};

fn validate_group_key_name(name: &[u8]) -> Result<(), RuleError> {
    if name.len() < MIN_GROUP_KEY_NAME_CHARACTERS {
        return Err(RuleError::MessagingGroupKeyNameTooShort);
    }
    if name.len() > MAX_GROUP_KEY_NAME_CHARACTERS {
        return Err(RuleError::MessagingGroupKeyNameTooLong);
    }
    Ok(())
}

fn validate_group_public_key(public_key: &PublicKey) -> Result<(), RuleError> {
    if !plaza_crypto::is_valid_public_key(public_key) {
        return Err(RuleError::MessagingGroupInvalidPublicKey);
    }
    Ok(())
}

impl LedgerView {
    // ── PrivateMessage ──────────────────────────────────────────────────

    /// Append a message under both the sender's and the recipient's keys.
    /// Timestamps must be unique per participant.
    pub(crate) fn connect_private_message(
        &mut self,
        txn: &Transaction,
        meta: &PrivateMessageMetadata,
        txn_hash: &TxnHash,
        block_height: u64,
        verify_signatures: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        if meta.encrypted_text.len() > MAX_PRIVATE_MESSAGE_LENGTH_BYTES {
            return Err(RuleError::PrivateMessageEncryptedTextLengthExceedsMax.into());
        }
        if meta.timestamp_nanos == 0 {
            return Err(RuleError::PrivateMessageTstampIsZero.into());
        }
        if meta.version == 0 || meta.version > 3 {
            return Err(RuleError::PrivateMessageInvalidVersion.into());
        }
        if meta.recipient_public_key == txn.public_key {
            return Err(RuleError::PrivateMessageSenderPublicKeyEqualsRecipientPublicKey.into());
        }

        // Version 3 messages must name the messaging keys they encrypt to.
        let (sender_messaging_key, sender_group_name, recipient_messaging_key, recipient_group_name) =
            if meta.version == 3 {
                let sender_key = meta
                    .sender_messaging_public_key
                    .ok_or(RuleError::PrivateMessageInvalidMessagingKey)?;
                let recipient_key = meta
                    .recipient_messaging_public_key
                    .ok_or(RuleError::PrivateMessageInvalidMessagingKey)?;
                validate_group_public_key(&sender_key)
                    .map_err(|_| RuleError::PrivateMessageInvalidMessagingKey)?;
                validate_group_public_key(&recipient_key)
                    .map_err(|_| RuleError::PrivateMessageInvalidMessagingKey)?;
                validate_group_key_name(&meta.sender_messaging_group_key_name)
                    .map_err(|_| RuleError::PrivateMessageInvalidMessagingKey)?;
                validate_group_key_name(&meta.recipient_messaging_group_key_name)
                    .map_err(|_| RuleError::PrivateMessageInvalidMessagingKey)?;
                (
                    sender_key,
                    GroupKeyName::new(&meta.sender_messaging_group_key_name),
                    recipient_key,
                    GroupKeyName::new(&meta.recipient_messaging_group_key_name),
                )
            } else {
                (
                    PublicKey::ZERO,
                    GroupKeyName::base(),
                    PublicKey::ZERO,
                    GroupKeyName::base(),
                )
            };

        let sender_key = MessageKey::new(txn.public_key, meta.timestamp_nanos);
        let recipient_key = MessageKey::new(meta.recipient_public_key, meta.timestamp_nanos);
        if self
            .message_entry(&sender_key)?
            .is_some_and(|entry| !entry.is_deleted)
            || self
                .message_entry(&recipient_key)?
                .is_some_and(|entry| !entry.is_deleted)
        {
            return Err(RuleError::PrivateMessageExistsAlready.into());
        }

        let (total_input, total_output, mut ops) =
            self.connect_basic_transfer(txn, txn_hash, block_height, verify_signatures)?;

        let entry = MessageEntry {
            sender_public_key: txn.public_key,
            recipient_public_key: meta.recipient_public_key,
            encrypted_text: meta.encrypted_text.clone(),
            timestamp_nanos: meta.timestamp_nanos,
            version: meta.version,
            sender_messaging_public_key: sender_messaging_key,
            sender_messaging_group_key_name: sender_group_name,
            recipient_messaging_public_key: recipient_messaging_key,
            recipient_messaging_group_key_name: recipient_group_name,
            is_deleted: false,
        };
        self.set_message(sender_key, entry.clone());
        self.set_message(recipient_key, entry);

        ops.push(UndoOp::PrivateMessage {
            sender_key,
            recipient_key,
        });
        Ok((total_input, total_output, ops))
    }

    pub(crate) fn disconnect_private_message(
        &mut self,
        txn: &Transaction,
        _meta: &PrivateMessageMetadata,
        txn_hash: &TxnHash,
        ops: &mut Vec<UndoOp>,
        block_height: u64,
    ) -> Result<(), ViewError> {
        let op = self.pop_kind_op(ops, TxnKind::PrivateMessage)?;
        let UndoOp::PrivateMessage {
            sender_key,
            recipient_key,
        } = op
        else {
            return Err(ViewError::Corruption(
                "expected a private-message undo operation".into(),
            ));
        };

        for key in [sender_key, recipient_key] {
            let entry = self
                .message_entry(&key)?
                .filter(|entry| !entry.is_deleted)
                .ok_or_else(|| {
                    ViewError::Corruption("message entry missing during disconnect".into())
                })?;
            self.delete_message(key, &entry);
        }

        self.disconnect_basic_transfer(txn, txn_hash, ops, block_height)
    }

    // ── MessagingGroup ──────────────────────────────────────────────────

    /// Register a messaging group or add members to an existing one.
    /// Members can be added but never replaced or removed.
    pub(crate) fn connect_messaging_group(
        &mut self,
        txn: &Transaction,
        meta: &MessagingGroupMetadata,
        txn_hash: &TxnHash,
        block_height: u64,
        verify_signatures: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        validate_group_key_name(&meta.messaging_group_key_name)?;
        validate_group_public_key(&meta.messaging_public_key)?;

        let group_name = GroupKeyName::new(&meta.messaging_group_key_name);
        // The reserved default group belongs to its owner alone.
        if group_name == GroupKeyName::default_key() && !meta.members.is_empty() {
            return Err(RuleError::MessagingGroupDefaultKeyCannotHaveMembers.into());
        }

        for member in &meta.members {
            validate_group_public_key(&member.group_member_public_key)?;
            validate_group_key_name(&member.group_member_key_name.decode())?;
        }

        let group_key = MessagingGroupKey {
            owner_public_key: txn.public_key,
            group_key_name: group_name,
        };
        let prev_entry = self
            .messaging_group_entry(&group_key)?
            .filter(|entry| !entry.is_deleted);

        let mut members = match &prev_entry {
            Some(existing) => {
                // Updating never rotates the group messaging key.
                if existing.messaging_public_key != meta.messaging_public_key {
                    return Err(RuleError::MessagingGroupPublicKeyCannotChange.into());
                }
                existing.members.clone()
            }
            None => Vec::new(),
        };
        for member in &meta.members {
            let duplicate = members
                .iter()
                .any(|m| m.group_member_public_key == member.group_member_public_key);
            if duplicate {
                return Err(RuleError::MessagingGroupMemberAlreadyExists.into());
            }
            members.push(MessagingGroupMember {
                group_member_public_key: member.group_member_public_key,
                group_member_key_name: member.group_member_key_name,
                encrypted_key: member.encrypted_key.clone(),
            });
        }

        let (total_input, total_output, mut ops) =
            self.connect_basic_transfer(txn, txn_hash, block_height, verify_signatures)?;

        self.set_messaging_group(MessagingGroupEntry {
            group_owner_public_key: txn.public_key,
            messaging_public_key: meta.messaging_public_key,
            messaging_group_key_name: group_name,
            members,
            is_deleted: false,
        });

        ops.push(UndoOp::MessagingGroup {
            group_key,
            prev_entry,
        });
        Ok((total_input, total_output, ops))
    }

    pub(crate) fn disconnect_messaging_group(
        &mut self,
        txn: &Transaction,
        _meta: &MessagingGroupMetadata,
        txn_hash: &TxnHash,
        ops: &mut Vec<UndoOp>,
        block_height: u64,
    ) -> Result<(), ViewError> {
        let op = self.pop_kind_op(ops, TxnKind::MessagingGroup)?;
        let UndoOp::MessagingGroup {
            group_key,
            prev_entry,
        } = op
        else {
            return Err(ViewError::Corruption(
                "expected a messaging-group undo operation".into(),
            ));
        };

        let current = self
            .messaging_group_entry(&group_key)?
            .filter(|entry| !entry.is_deleted)
            .ok_or_else(|| {
                ViewError::Corruption("messaging group missing during disconnect".into())
            })?;
        self.delete_messaging_group(&current);
        if let Some(prev) = prev_entry {
            self.set_messaging_group(prev);
        }

        self.disconnect_basic_transfer(txn, txn_hash, ops, block_height)
    }
}
