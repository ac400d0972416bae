//! Abstract storage traits for the Plaza ledger.
//!
//! The ledger view reads durable state through these traits and writes
//! exclusively via `ChainStore::flush`, which applies a whole overlay's
//! additions, mutations, and deletions atomically. Every backend (the
//! in-memory store here, or an embedded key-value store elsewhere)
//! implements the same surface.

pub mod derived_key;
pub mod error;
pub mod flush;
pub mod memory;
pub mod message;
pub mod meta;
pub mod nft;
pub mod post;
pub mod profile;
pub mod social;
pub mod utxo;

pub use derived_key::DerivedKeyStore;
pub use error::StoreError;
pub use flush::FlushBatch;
pub use memory::MemStore;
pub use message::MessageStore;
pub use meta::MetaStore;
pub use nft::NftStore;
pub use post::PostStore;
pub use profile::ProfileStore;
pub use social::SocialStore;
pub use utxo::UtxoStore;

/// The unified storage interface the ledger view depends on.
pub trait ChainStore:
    UtxoStore
    + ProfileStore
    + PostStore
    + SocialStore
    + NftStore
    + MessageStore
    + DerivedKeyStore
    + MetaStore
    + Send
    + Sync
{
    /// Apply a flushed overlay atomically.
    fn flush(&self, batch: FlushBatch) -> Result<(), StoreError>;
}
