//! Fundamental types for the Plaza ledger.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: hashes, keys, stable identifiers, chain parameters, the entry
//! types of every sub-ledger, and the varint wire codec used by the
//! consensus-visible entry encodings.

pub mod block;
pub mod derived_key;
pub mod global_params;
pub mod hash;
pub mod keys;
pub mod message;
pub mod nft;
pub mod params;
pub mod post;
pub mod profile;
pub mod social;
pub mod utxo;
pub mod wire;

pub use block::{BlockHeader, CURRENT_BLOCK_VERSION};
pub use derived_key::{DerivedKeyEntry, DerivedKeyMapKey, DerivedKeyState};
pub use global_params::{ForbiddenPubKeyEntry, GlobalParamsEntry};
pub use hash::{BlockHash, PostHash, TxnHash};
pub use keys::{Pkid, PublicKey, SecretKeyBytes, Signature};
pub use message::{
    GroupKeyName, MessageEntry, MessageKey, MessagingGroupEntry, MessagingGroupKey,
    MessagingGroupMember,
};
pub use nft::{NftBidEntry, NftBidKey, NftEntry, NftKey};
pub use params::ChainParams;
pub use post::PostEntry;
pub use profile::{
    BalanceEntry, BalanceKey, CoinEntry, PkidEntry, ProfileEntry, TransferRestrictionStatus,
    UsernameKey,
};
pub use social::{
    DiamondEntry, DiamondKey, FollowEntry, FollowKey, LikeEntry, LikeKey, RepostEntry, RepostKey,
};
pub use utxo::{UtxoEntry, UtxoKey, UtxoType};
pub use wire::{WireDecode, WireEncode, WireError};
