//! Message, messaging-group, and cross-chain burn transaction metadata.

use plaza_types::{MessagingGroupMember, PublicKey, TxnHash};
use serde::{Deserialize, Serialize};

/// Appends an encrypted message to the message ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateMessageMetadata {
    pub recipient_public_key: PublicKey,

    pub encrypted_text: Vec<u8>,

    /// Nanosecond timestamp; must be unique per participant.
    pub timestamp_nanos: u64,

    /// 1 = raw public key, 2 = shared secret, 3 = messaging groups.
    pub version: u8,

    /// Version-3 fields: which messaging keys the ciphertext is addressed
    /// to. Unset for earlier versions.
    pub sender_messaging_public_key: Option<PublicKey>,
    pub sender_messaging_group_key_name: Vec<u8>,
    pub recipient_messaging_public_key: Option<PublicKey>,
    pub recipient_messaging_group_key_name: Vec<u8>,
}

/// Registers or updates a messaging group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagingGroupMetadata {
    /// The key others will use to encrypt to this group.
    pub messaging_public_key: PublicKey,

    pub messaging_group_key_name: Vec<u8>,

    /// Members to add. Existing members cannot be replaced or removed.
    pub members: Vec<MessagingGroupMember>,
}

/// Mints native tokens against a verified cross-chain burn. Proof
/// verification happens upstream; by the time a transaction reaches the
/// view the burn is assumed final.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitcoinExchangeMetadata {
    /// Id of the Bitcoin transaction that burned the funds. Tracked to
    /// prevent double-minting.
    pub burn_txn_id: TxnHash,

    pub burn_amount_satoshis: u64,
}
