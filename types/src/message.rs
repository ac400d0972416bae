//! Private messages and messaging groups.

use crate::keys::PublicKey;
use crate::wire::{
    read_bytes, read_uvarint, write_bytes, write_uvarint, WireDecode, WireEncode, WireError,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum group-key name length in characters.
pub const MIN_GROUP_KEY_NAME_CHARACTERS: usize = 1;

/// Maximum group-key name length; also the fixed padded width on the wire.
pub const MAX_GROUP_KEY_NAME_CHARACTERS: usize = 32;

/// The reserved name of every user's default messaging group.
pub const DEFAULT_GROUP_KEY_NAME: &[u8] = b"default-key";

/// A group-key name, zero-padded to a fixed width.
///
/// Padding to the full width keeps database prefixes from overlapping. Two
/// names are equal iff their padded forms are equal.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupKeyName(pub [u8; MAX_GROUP_KEY_NAME_CHARACTERS]);

impl GroupKeyName {
    /// Pad a raw name with trailing zeros. Input longer than the width is
    /// rejected by transaction validation before this is reached; here it
    /// is truncated.
    pub fn new(name: &[u8]) -> Self {
        let mut padded = [0u8; MAX_GROUP_KEY_NAME_CHARACTERS];
        let len = name.len().min(MAX_GROUP_KEY_NAME_CHARACTERS);
        padded[..len].copy_from_slice(&name[..len]);
        Self(padded)
    }

    /// The empty (base) name.
    pub fn base() -> Self {
        Self::new(&[])
    }

    /// The reserved default-group name.
    pub fn default_key() -> Self {
        Self::new(DEFAULT_GROUP_KEY_NAME)
    }

    /// Strip trailing zeros. An all-zero name decodes to empty.
    pub fn decode(&self) -> Vec<u8> {
        let mut end = self.0.len();
        while end > MIN_GROUP_KEY_NAME_CHARACTERS && self.0[end - 1] == 0 {
            end -= 1;
        }
        if self.0[..end].iter().all(|&b| b == 0) {
            return Vec::new();
        }
        self.0[..end].to_vec()
    }

    pub fn as_bytes(&self) -> &[u8; MAX_GROUP_KEY_NAME_CHARACTERS] {
        &self.0
    }

    pub fn is_base(&self) -> bool {
        self.0 == [0u8; MAX_GROUP_KEY_NAME_CHARACTERS]
    }
}

impl fmt::Debug for GroupKeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupKeyName({})", String::from_utf8_lossy(&self.decode()))
    }
}

/// Key for the message ledger: one mapping per participant per timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageKey {
    pub public_key: PublicKey,
    pub timestamp_nanos: u64,
}

impl MessageKey {
    pub fn new(public_key: PublicKey, timestamp_nanos: u64) -> Self {
        Self {
            public_key,
            timestamp_nanos,
        }
    }
}

/// An encrypted private message.
///
/// Versions: 1 encrypts to the recipient's raw public key, 2 uses a shared
/// secret, 3 uses rotating messaging-group keys. The group fields are only
/// meaningful for version 3 and are zero otherwise.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntry {
    pub sender_public_key: PublicKey,
    pub recipient_public_key: PublicKey,
    pub encrypted_text: Vec<u8>,
    pub timestamp_nanos: u64,
    pub version: u8,

    pub sender_messaging_public_key: PublicKey,
    pub sender_messaging_group_key_name: GroupKeyName,
    pub recipient_messaging_public_key: PublicKey,
    pub recipient_messaging_group_key_name: GroupKeyName,

    pub is_deleted: bool,
}

impl WireEncode for MessageEntry {
    fn wire_encode(&self, out: &mut Vec<u8>) {
        write_bytes(out, self.sender_public_key.as_bytes());
        write_bytes(out, self.recipient_public_key.as_bytes());
        write_bytes(out, &self.encrypted_text);
        write_uvarint(out, self.timestamp_nanos);
        write_uvarint(out, u64::from(self.version));
        write_bytes(out, self.sender_messaging_public_key.as_bytes());
        write_bytes(out, self.sender_messaging_group_key_name.as_bytes());
        write_bytes(out, self.recipient_messaging_public_key.as_bytes());
        write_bytes(out, self.recipient_messaging_group_key_name.as_bytes());
    }
}

impl WireDecode for MessageEntry {
    fn wire_decode(input: &mut &[u8]) -> Result<Self, WireError> {
        let sender_public_key = read_public_key(input)?;
        let recipient_public_key = read_public_key(input)?;
        let encrypted_text = read_bytes(input)?;
        let timestamp_nanos = read_uvarint(input)?;
        let version = u8::try_from(read_uvarint(input)?)
            .map_err(|_| WireError::InvalidValue("version"))?;
        let sender_messaging_public_key = read_public_key(input)?;
        let sender_messaging_group_key_name = read_group_key_name(input)?;
        let recipient_messaging_public_key = read_public_key(input)?;
        let recipient_messaging_group_key_name = read_group_key_name(input)?;

        Ok(Self {
            sender_public_key,
            recipient_public_key,
            encrypted_text,
            timestamp_nanos,
            version,
            sender_messaging_public_key,
            sender_messaging_group_key_name,
            recipient_messaging_public_key,
            recipient_messaging_group_key_name,
            is_deleted: false,
        })
    }
}

/// Key for the messaging-group ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessagingGroupKey {
    pub owner_public_key: PublicKey,
    pub group_key_name: GroupKeyName,
}

impl MessagingGroupKey {
    pub fn new(owner_public_key: PublicKey, group_key_name: &[u8]) -> Self {
        Self {
            owner_public_key,
            group_key_name: GroupKeyName::new(group_key_name),
        }
    }
}

/// One member of a messaging group, carrying the group's private key
/// encrypted to that member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagingGroupMember {
    /// The member's main public key, not a messaging key.
    pub group_member_public_key: PublicKey,

    /// Which of the member's messaging keys the encrypted key is addressed
    /// to. Specifying the member's main key and key name suffices to index
    /// the member.
    pub group_member_key_name: GroupKeyName,

    /// The group messaging private key, encrypted to the member.
    pub encrypted_key: Vec<u8>,
}

impl WireEncode for MessagingGroupMember {
    fn wire_encode(&self, out: &mut Vec<u8>) {
        write_bytes(out, self.group_member_public_key.as_bytes());
        write_bytes(out, self.group_member_key_name.as_bytes());
        write_bytes(out, &self.encrypted_key);
    }
}

impl WireDecode for MessagingGroupMember {
    fn wire_decode(input: &mut &[u8]) -> Result<Self, WireError> {
        let group_member_public_key = read_public_key(input)?;
        let group_member_key_name = read_group_key_name(input)?;
        let encrypted_key = read_bytes(input)?;
        Ok(Self {
            group_member_public_key,
            group_member_key_name,
            encrypted_key,
        })
    }
}

/// A messaging group: the key others encrypt to, plus the member registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagingGroupEntry {
    /// The owner key the group is indexed under.
    pub group_owner_public_key: PublicKey,

    /// The key used to encrypt messages to the group.
    pub messaging_public_key: PublicKey,

    pub messaging_group_key_name: GroupKeyName,

    pub members: Vec<MessagingGroupMember>,

    pub is_deleted: bool,
}

impl WireEncode for MessagingGroupEntry {
    fn wire_encode(&self, out: &mut Vec<u8>) {
        write_bytes(out, self.group_owner_public_key.as_bytes());
        write_bytes(out, self.messaging_public_key.as_bytes());
        write_bytes(out, self.messaging_group_key_name.as_bytes());
        write_uvarint(out, self.members.len() as u64);
        for member in &self.members {
            member.wire_encode(out);
        }
    }
}

impl WireDecode for MessagingGroupEntry {
    fn wire_decode(input: &mut &[u8]) -> Result<Self, WireError> {
        let group_owner_public_key = read_public_key(input)?;
        let messaging_public_key = read_public_key(input)?;
        let messaging_group_key_name = read_group_key_name(input)?;
        let member_count = read_uvarint(input)?;
        let mut members = Vec::with_capacity(member_count.min(1024) as usize);
        for _ in 0..member_count {
            members.push(MessagingGroupMember::wire_decode(input)?);
        }
        Ok(Self {
            group_owner_public_key,
            messaging_public_key,
            messaging_group_key_name,
            members,
            is_deleted: false,
        })
    }
}

fn read_public_key(input: &mut &[u8]) -> Result<PublicKey, WireError> {
    let bytes = read_bytes(input)?;
    PublicKey::from_slice(&bytes).ok_or(WireError::InvalidLength {
        expected: crate::keys::PUBLIC_KEY_LENGTH,
        got: bytes.len(),
    })
}

fn read_group_key_name(input: &mut &[u8]) -> Result<GroupKeyName, WireError> {
    let bytes = read_bytes(input)?;
    if bytes.len() != MAX_GROUP_KEY_NAME_CHARACTERS {
        return Err(WireError::InvalidLength {
            expected: MAX_GROUP_KEY_NAME_CHARACTERS,
            got: bytes.len(),
        });
    }
    Ok(GroupKeyName::new(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Group-key names ─────────────────────────────────────────────────

    #[test]
    fn group_key_name_pads_and_strips() {
        let name = GroupKeyName::new(b"chat");
        assert_eq!(name.as_bytes().len(), MAX_GROUP_KEY_NAME_CHARACTERS);
        assert_eq!(name.decode(), b"chat");
    }

    #[test]
    fn all_zero_name_decodes_to_empty() {
        let name = GroupKeyName::new(&[]);
        assert!(name.is_base());
        assert!(name.decode().is_empty());
    }

    #[test]
    fn names_equal_iff_padded_forms_equal() {
        assert_eq!(GroupKeyName::new(b"a"), GroupKeyName::new(b"a\0\0"));
        assert_ne!(GroupKeyName::new(b"a"), GroupKeyName::new(b"b"));
    }

    #[test]
    fn full_width_name_survives() {
        let raw = [b'x'; MAX_GROUP_KEY_NAME_CHARACTERS];
        let name = GroupKeyName::new(&raw);
        assert_eq!(name.decode(), raw);
    }

    // ── Wire codec ──────────────────────────────────────────────────────

    fn sample_message() -> MessageEntry {
        MessageEntry {
            sender_public_key: PublicKey::new([1u8; 33]),
            recipient_public_key: PublicKey::new([2u8; 33]),
            encrypted_text: b"ciphertext".to_vec(),
            timestamp_nanos: 1_234_567_890,
            version: 3,
            sender_messaging_public_key: PublicKey::new([3u8; 33]),
            sender_messaging_group_key_name: GroupKeyName::default_key(),
            recipient_messaging_public_key: PublicKey::new([4u8; 33]),
            recipient_messaging_group_key_name: GroupKeyName::new(b"friends"),
            is_deleted: false,
        }
    }

    #[test]
    fn message_entry_roundtrip() {
        let entry = sample_message();
        let bytes = entry.to_wire_bytes();
        let back = MessageEntry::from_wire_bytes(&bytes).unwrap();
        assert_eq!(entry, back);
    }

    #[test]
    fn group_entry_roundtrip_with_members() {
        let entry = MessagingGroupEntry {
            group_owner_public_key: PublicKey::new([1u8; 33]),
            messaging_public_key: PublicKey::new([2u8; 33]),
            messaging_group_key_name: GroupKeyName::new(b"team"),
            members: vec![
                MessagingGroupMember {
                    group_member_public_key: PublicKey::new([5u8; 33]),
                    group_member_key_name: GroupKeyName::default_key(),
                    encrypted_key: b"enc-key-1".to_vec(),
                },
                MessagingGroupMember {
                    group_member_public_key: PublicKey::new([6u8; 33]),
                    group_member_key_name: GroupKeyName::new(b"alt"),
                    encrypted_key: b"enc-key-2".to_vec(),
                },
            ],
            is_deleted: false,
        };
        let bytes = entry.to_wire_bytes();
        let back = MessagingGroupEntry::from_wire_bytes(&bytes).unwrap();
        assert_eq!(entry, back);
    }

    #[test]
    fn decode_rejects_truncated_input() {
        let bytes = sample_message().to_wire_bytes();
        assert!(MessageEntry::from_wire_bytes(&bytes[..bytes.len() - 1]).is_err());
    }
}
