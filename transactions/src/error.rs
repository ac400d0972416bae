//! Stateless transaction validation errors.

use crate::TxnKind;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransactionError {
    #[error("transaction input {0} is duplicated")]
    DuplicateInput(usize),

    #[error("{0} transaction must have at least one input")]
    MissingInputs(TxnKind),

    #[error("transaction public key is missing")]
    MissingPublicKey,

    #[error("transaction signature is missing")]
    MissingSignature,

    #[error("block reward transaction may not have inputs")]
    BlockRewardHasInputs,

    #[error("block reward transaction may not have a public key")]
    BlockRewardHasPublicKey,

    #[error("block reward transaction may not have a signature")]
    BlockRewardHasSignature,

    #[error("extra data value for key {0:?} is malformed")]
    MalformedExtraData(&'static str),
}
