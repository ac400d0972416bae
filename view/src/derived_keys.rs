//! The AuthorizeDerivedKey handler.

use crate::error::{RuleError, ViewError};
use crate::undo::UndoOp;
use crate::view::LedgerView;
use plaza_transactions::{
    AuthorizeDerivedKeyMetadata, AuthorizeDerivedKeyOperation, Transaction, TxnKind,
};
use plaza_types::{DerivedKeyEntry, DerivedKeyMapKey, DerivedKeyState, TxnHash};

impl LedgerView {
    /// Authorize or revoke a derived key for the transactor.
    ///
    /// The access signature proves the owner sanctioned the authorization
    /// even when the transaction itself is signed by the derived key. For
    /// that to verify, a fresh authorization is written to the view before
    /// the basic transfer checks the transaction signature.
    pub(crate) fn connect_authorize_derived_key(
        &mut self,
        txn: &Transaction,
        meta: &AuthorizeDerivedKeyMetadata,
        txn_hash: &TxnHash,
        block_height: u64,
        verify_signatures: bool,
    ) -> Result<(u64, u64, Vec<UndoOp>), ViewError> {
        let access_digest = AuthorizeDerivedKeyMetadata::access_digest(
            &meta.derived_public_key,
            meta.expiration_block,
        );
        if verify_signatures
            && !plaza_crypto::verify_signature(
                &access_digest,
                &meta.access_signature,
                &txn.public_key,
            )
        {
            return Err(RuleError::AuthorizeDerivedKeyAccessSignatureInvalid.into());
        }

        let map_key = DerivedKeyMapKey::new(txn.public_key, meta.derived_public_key);
        let prev_entry = self
            .derived_key_entry(&map_key)?
            .filter(|entry| !entry.is_deleted);

        match meta.operation {
            AuthorizeDerivedKeyOperation::Authorize => {
                if meta.expiration_block <= block_height {
                    return Err(RuleError::AuthorizeDerivedKeyExpirationMustBeInFuture.into());
                }
                // Revocation is terminal for an (owner, derived) pair.
                if prev_entry
                    .as_ref()
                    .is_some_and(|entry| entry.state == DerivedKeyState::Revoked)
                {
                    return Err(
                        RuleError::AuthorizeDerivedKeyRevokedKeyCannotBeReauthorized.into()
                    );
                }

                // Written before the basic transfer so a transaction signed
                // by the key being authorized validates.
                self.set_derived_key(DerivedKeyEntry {
                    owner_public_key: txn.public_key,
                    derived_public_key: meta.derived_public_key,
                    expiration_block: meta.expiration_block,
                    state: DerivedKeyState::Valid,
                    is_deleted: false,
                });

                let (total_input, total_output, mut ops) =
                    self.connect_basic_transfer(txn, txn_hash, block_height, verify_signatures)?;

                ops.push(UndoOp::AuthorizeDerivedKey {
                    key: map_key,
                    prev_entry,
                });
                Ok((total_input, total_output, ops))
            }
            AuthorizeDerivedKeyOperation::Revoke => {
                // The old entry stays valid through the signature check, so
                // a revoke may be signed by the derived key itself.
                let (total_input, total_output, mut ops) =
                    self.connect_basic_transfer(txn, txn_hash, block_height, verify_signatures)?;

                self.set_derived_key(DerivedKeyEntry {
                    owner_public_key: txn.public_key,
                    derived_public_key: meta.derived_public_key,
                    expiration_block: meta.expiration_block,
                    state: DerivedKeyState::Revoked,
                    is_deleted: false,
                });

                ops.push(UndoOp::AuthorizeDerivedKey {
                    key: map_key,
                    prev_entry,
                });
                Ok((total_input, total_output, ops))
            }
        }
    }

    pub(crate) fn disconnect_authorize_derived_key(
        &mut self,
        txn: &Transaction,
        _meta: &AuthorizeDerivedKeyMetadata,
        txn_hash: &TxnHash,
        ops: &mut Vec<UndoOp>,
        block_height: u64,
    ) -> Result<(), ViewError> {
        let op = self.pop_kind_op(ops, TxnKind::AuthorizeDerivedKey)?;
        let UndoOp::AuthorizeDerivedKey { key, prev_entry } = op else {
            return Err(ViewError::Corruption(
                "expected an authorize-derived-key undo operation".into(),
            ));
        };

        let current = self
            .derived_key_entry(&key)?
            .filter(|entry| !entry.is_deleted)
            .ok_or_else(|| {
                ViewError::Corruption("derived key entry missing during disconnect".into())
            })?;
        self.delete_derived_key(&current);
        if let Some(prev) = prev_entry {
            self.set_derived_key(prev);
        }

        self.disconnect_basic_transfer(txn, txn_hash, ops, block_height)
    }
}
