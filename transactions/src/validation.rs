//! Stateless transaction sanity checks.
//!
//! These run before a transaction touches the ledger view. Stateful checks
//! (UTXO existence, balances, signatures against ledger state) belong to
//! the view.

use crate::error::TransactionError;
use crate::{Transaction, TxnKind};
use std::collections::HashSet;

/// Validate a transaction's basic structure.
pub fn validate_transaction_sanity(txn: &Transaction) -> Result<(), TransactionError> {
    if txn.kind() == TxnKind::BlockReward {
        return validate_block_reward(txn);
    }

    if txn.public_key.is_zero() {
        return Err(TransactionError::MissingPublicKey);
    }
    if txn.signature.is_zero() {
        return Err(TransactionError::MissingSignature);
    }

    // Duplicate inputs would double-count the same output.
    let mut seen = HashSet::with_capacity(txn.inputs.len());
    for (index, input) in txn.inputs.iter().enumerate() {
        if !seen.insert(*input) {
            return Err(TransactionError::DuplicateInput(index));
        }
    }

    // Every user transaction spends inputs to pay fees. Cross-chain burn
    // mints are the exception: their fee is taken from the minted amount.
    if txn.inputs.is_empty() && txn.kind() != TxnKind::BitcoinExchange {
        return Err(TransactionError::MissingInputs(txn.kind()));
    }

    Ok(())
}

fn validate_block_reward(txn: &Transaction) -> Result<(), TransactionError> {
    if !txn.inputs.is_empty() {
        return Err(TransactionError::BlockRewardHasInputs);
    }
    if !txn.public_key.is_zero() {
        return Err(TransactionError::BlockRewardHasPublicKey);
    }
    if !txn.signature.is_zero() {
        return Err(TransactionError::BlockRewardHasSignature);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TxnMeta, TxnOutput};
    use plaza_types::{PublicKey, Signature, TxnHash, UtxoKey};
    use std::collections::BTreeMap;

    fn dummy_public_key() -> PublicKey {
        PublicKey::new([2u8; 33])
    }

    fn dummy_input(n: u8) -> UtxoKey {
        UtxoKey::new(TxnHash::new([n; 32]), 0)
    }

    fn basic_transfer() -> Transaction {
        Transaction {
            inputs: vec![dummy_input(1)],
            outputs: vec![TxnOutput {
                public_key: dummy_public_key(),
                amount_nanos: 100,
            }],
            public_key: dummy_public_key(),
            extra_data: BTreeMap::new(),
            meta: TxnMeta::BasicTransfer,
            signature: Signature([1u8; 64]),
        }
    }

    fn block_reward() -> Transaction {
        Transaction {
            inputs: vec![],
            outputs: vec![TxnOutput {
                public_key: dummy_public_key(),
                amount_nanos: 100,
            }],
            public_key: PublicKey::ZERO,
            extra_data: BTreeMap::new(),
            meta: TxnMeta::BlockReward {
                extra_nonce: vec![1, 2, 3],
            },
            signature: Signature::ZERO,
        }
    }

    #[test]
    fn test_valid_basic_transfer_passes() {
        assert!(validate_transaction_sanity(&basic_transfer()).is_ok());
    }

    #[test]
    fn test_duplicate_inputs_rejected() {
        let mut txn = basic_transfer();
        txn.inputs = vec![dummy_input(1), dummy_input(2), dummy_input(1)];
        assert_eq!(
            validate_transaction_sanity(&txn),
            Err(TransactionError::DuplicateInput(2))
        );
    }

    #[test]
    fn test_missing_public_key_rejected() {
        let mut txn = basic_transfer();
        txn.public_key = PublicKey::ZERO;
        assert_eq!(
            validate_transaction_sanity(&txn),
            Err(TransactionError::MissingPublicKey)
        );
    }

    #[test]
    fn test_missing_signature_rejected() {
        let mut txn = basic_transfer();
        txn.signature = Signature::ZERO;
        assert_eq!(
            validate_transaction_sanity(&txn),
            Err(TransactionError::MissingSignature)
        );
    }

    #[test]
    fn test_no_inputs_rejected() {
        let mut txn = basic_transfer();
        txn.inputs = vec![];
        assert_eq!(
            validate_transaction_sanity(&txn),
            Err(TransactionError::MissingInputs(TxnKind::BasicTransfer))
        );
    }

    #[test]
    fn test_valid_block_reward_passes() {
        assert!(validate_transaction_sanity(&block_reward()).is_ok());
    }

    #[test]
    fn test_block_reward_with_inputs_rejected() {
        let mut txn = block_reward();
        txn.inputs = vec![dummy_input(1)];
        assert_eq!(
            validate_transaction_sanity(&txn),
            Err(TransactionError::BlockRewardHasInputs)
        );
    }

    #[test]
    fn test_block_reward_with_public_key_rejected() {
        let mut txn = block_reward();
        txn.public_key = dummy_public_key();
        assert_eq!(
            validate_transaction_sanity(&txn),
            Err(TransactionError::BlockRewardHasPublicKey)
        );
    }

    #[test]
    fn test_block_reward_with_signature_rejected() {
        let mut txn = block_reward();
        txn.signature = Signature([1u8; 64]);
        assert_eq!(
            validate_transaction_sanity(&txn),
            Err(TransactionError::BlockRewardHasSignature)
        );
    }
}
