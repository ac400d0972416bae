//! The Plaza ledger view.
//!
//! This crate is the consensus work-horse: it builds an in-memory view of
//! the chain tip, validates transactions against it, applies their effects,
//! and records enough undo information to reverse every mutation when a
//! block is disconnected during a reorganization. Every transaction kind
//! has a connect handler and a disconnect handler here; `connect_block` and
//! `disconnect_block` drive them in order. If you want to know how a
//! transaction changes chain state, this is the right crate.

mod basic_transfer;
mod block;
mod coins;
mod dao_coins;
mod derived_keys;
mod dispatch;
mod error;
mod messages;
mod nft;
mod nft_market;
mod params;
mod posts;
mod profiles;
mod social;
mod undo;
mod view;

pub use dispatch::ConnectedTxn;
pub use error::{RuleError, ViewError};
pub use undo::{AcceptedBidUndo, RoyaltyPayout, UndoOp};
pub use view::LedgerView;
