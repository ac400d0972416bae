//! All Plaza transaction kinds and their stateless validation.
//!
//! A transaction is a universal envelope — inputs, outputs, transactor key,
//! extra data, signature — plus kind-specific metadata. The ledger view
//! dispatches on the metadata variant; everything here is stateless.

pub mod block;
pub mod coins;
pub mod derived_key;
pub mod error;
pub mod extra_data;
pub mod messages;
pub mod nft;
pub mod profile;
pub mod social;
pub mod validation;

use plaza_types::{PublicKey, Signature, TxnHash, UtxoKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub use block::Block;
pub use coins::{
    CreatorCoinMetadata, CreatorCoinOperation, CreatorCoinTransferMetadata, DaoCoinMetadata,
    DaoCoinOperation, DaoCoinTransferMetadata,
};
pub use derived_key::{AuthorizeDerivedKeyMetadata, AuthorizeDerivedKeyOperation};
pub use error::TransactionError;
pub use messages::{BitcoinExchangeMetadata, MessagingGroupMetadata, PrivateMessageMetadata};
pub use nft::{
    AcceptNftBidMetadata, AcceptNftTransferMetadata, BurnNftMetadata, CreateNftMetadata,
    NftBidMetadata, NftTransferMetadata, UpdateNftMetadata,
};
pub use profile::{
    SwapIdentityMetadata, UpdateBitcoinUsdExchangeRateMetadata, UpdateProfileMetadata,
};
pub use social::{FollowMetadata, LikeMetadata, SubmitPostMetadata};

/// One output of a transaction: a recipient and an amount in nanos.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxnOutput {
    pub public_key: PublicKey,
    pub amount_nanos: u64,
}

/// Kind-specific transaction payloads. The undo-operation enum in the view
/// crate evolves in lockstep with this list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxnMeta {
    /// The first transaction of every block. Carries miner entropy so two
    /// coinbases with identical outputs still hash differently.
    BlockReward { extra_nonce: Vec<u8> },
    BasicTransfer,
    BitcoinExchange(BitcoinExchangeMetadata),
    PrivateMessage(PrivateMessageMetadata),
    MessagingGroup(MessagingGroupMetadata),
    SubmitPost(SubmitPostMetadata),
    UpdateProfile(UpdateProfileMetadata),
    UpdateBitcoinUsdExchangeRate(UpdateBitcoinUsdExchangeRateMetadata),
    /// Field updates ride in the transaction's extra data.
    UpdateGlobalParams,
    Follow(FollowMetadata),
    Like(LikeMetadata),
    CreatorCoin(CreatorCoinMetadata),
    CreatorCoinTransfer(CreatorCoinTransferMetadata),
    DaoCoin(DaoCoinMetadata),
    DaoCoinTransfer(DaoCoinTransferMetadata),
    SwapIdentity(SwapIdentityMetadata),
    CreateNft(CreateNftMetadata),
    UpdateNft(UpdateNftMetadata),
    AcceptNftBid(AcceptNftBidMetadata),
    NftBid(NftBidMetadata),
    NftTransfer(NftTransferMetadata),
    AcceptNftTransfer(AcceptNftTransferMetadata),
    BurnNft(BurnNftMetadata),
    AuthorizeDerivedKey(AuthorizeDerivedKeyMetadata),
}

/// Fieldless kind tags, for dispatch tables and error messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TxnKind {
    BlockReward,
    BasicTransfer,
    BitcoinExchange,
    PrivateMessage,
    MessagingGroup,
    SubmitPost,
    UpdateProfile,
    UpdateBitcoinUsdExchangeRate,
    UpdateGlobalParams,
    Follow,
    Like,
    CreatorCoin,
    CreatorCoinTransfer,
    DaoCoin,
    DaoCoinTransfer,
    SwapIdentity,
    CreateNft,
    UpdateNft,
    AcceptNftBid,
    NftBid,
    NftTransfer,
    AcceptNftTransfer,
    BurnNft,
    AuthorizeDerivedKey,
}

impl fmt::Display for TxnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl TxnMeta {
    pub fn kind(&self) -> TxnKind {
        match self {
            Self::BlockReward { .. } => TxnKind::BlockReward,
            Self::BasicTransfer => TxnKind::BasicTransfer,
            Self::BitcoinExchange(_) => TxnKind::BitcoinExchange,
            Self::PrivateMessage(_) => TxnKind::PrivateMessage,
            Self::MessagingGroup(_) => TxnKind::MessagingGroup,
            Self::SubmitPost(_) => TxnKind::SubmitPost,
            Self::UpdateProfile(_) => TxnKind::UpdateProfile,
            Self::UpdateBitcoinUsdExchangeRate(_) => TxnKind::UpdateBitcoinUsdExchangeRate,
            Self::UpdateGlobalParams => TxnKind::UpdateGlobalParams,
            Self::Follow(_) => TxnKind::Follow,
            Self::Like(_) => TxnKind::Like,
            Self::CreatorCoin(_) => TxnKind::CreatorCoin,
            Self::CreatorCoinTransfer(_) => TxnKind::CreatorCoinTransfer,
            Self::DaoCoin(_) => TxnKind::DaoCoin,
            Self::DaoCoinTransfer(_) => TxnKind::DaoCoinTransfer,
            Self::SwapIdentity(_) => TxnKind::SwapIdentity,
            Self::CreateNft(_) => TxnKind::CreateNft,
            Self::UpdateNft(_) => TxnKind::UpdateNft,
            Self::AcceptNftBid(_) => TxnKind::AcceptNftBid,
            Self::NftBid(_) => TxnKind::NftBid,
            Self::NftTransfer(_) => TxnKind::NftTransfer,
            Self::AcceptNftTransfer(_) => TxnKind::AcceptNftTransfer,
            Self::BurnNft(_) => TxnKind::BurnNft,
            Self::AuthorizeDerivedKey(_) => TxnKind::AuthorizeDerivedKey,
        }
    }
}

/// A Plaza transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Outputs being spent, each owned by `public_key`.
    pub inputs: Vec<UtxoKey>,

    pub outputs: Vec<TxnOutput>,

    /// The transactor. Zero for block rewards, which are unsigned.
    pub public_key: PublicKey,

    /// Arbitrary key/value payload: diamond tips, derived-key stamps, and
    /// global-params updates all ride here.
    pub extra_data: BTreeMap<String, Vec<u8>>,

    pub meta: TxnMeta,

    /// Compact ECDSA signature over the pre-signature digest. Zero for
    /// block rewards.
    pub signature: Signature,
}

impl Transaction {
    pub fn kind(&self) -> TxnKind {
        self.meta.kind()
    }

    /// Canonical serialization. With `pre_signature` the signature field is
    /// cleared, producing the bytes that get signed.
    pub fn to_bytes(&self, pre_signature: bool) -> Vec<u8> {
        if pre_signature {
            let mut unsigned = self.clone();
            unsigned.signature = Signature::ZERO;
            bincode::serialize(&unsigned).expect("transaction serialization should not fail")
        } else {
            bincode::serialize(self).expect("transaction serialization should not fail")
        }
    }

    /// The transaction id: double SHA-256 of the full serialization.
    pub fn hash(&self) -> TxnHash {
        TxnHash::new(plaza_crypto::sha256d(&self.to_bytes(false)))
    }

    /// The digest the signature commits to.
    pub fn signature_digest(&self) -> [u8; 32] {
        plaza_crypto::sha256d(&self.to_bytes(true))
    }

    pub fn serialized_size(&self) -> u64 {
        self.to_bytes(false).len() as u64
    }

    /// Sum of the explicit output amounts, or `None` on overflow.
    pub fn total_output_nanos(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, out| acc.checked_add(out.amount_nanos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_txn() -> Transaction {
        Transaction {
            inputs: vec![UtxoKey::new(TxnHash::new([1u8; 32]), 0)],
            outputs: vec![TxnOutput {
                public_key: PublicKey::new([2u8; 33]),
                amount_nanos: 100,
            }],
            public_key: PublicKey::new([3u8; 33]),
            extra_data: BTreeMap::new(),
            meta: TxnMeta::BasicTransfer,
            signature: Signature([7u8; 64]),
        }
    }

    #[test]
    fn hash_commits_to_signature() {
        let txn = sample_txn();
        let mut resigned = txn.clone();
        resigned.signature = Signature([8u8; 64]);
        assert_ne!(txn.hash(), resigned.hash());
    }

    #[test]
    fn signature_digest_ignores_signature() {
        let txn = sample_txn();
        let mut resigned = txn.clone();
        resigned.signature = Signature([8u8; 64]);
        assert_eq!(txn.signature_digest(), resigned.signature_digest());
    }

    #[test]
    fn total_output_overflow_is_none() {
        let mut txn = sample_txn();
        txn.outputs = vec![
            TxnOutput {
                public_key: PublicKey::new([2u8; 33]),
                amount_nanos: u64::MAX,
            },
            TxnOutput {
                public_key: PublicKey::new([2u8; 33]),
                amount_nanos: 1,
            },
        ];
        assert_eq!(txn.total_output_nanos(), None);
    }

    #[test]
    fn kind_matches_meta() {
        assert_eq!(sample_txn().kind(), TxnKind::BasicTransfer);
    }
}
