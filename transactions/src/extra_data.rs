//! Well-known extra-data keys.
//!
//! Extra data is a free-form map, but a handful of keys are
//! consensus-meaningful. Values are uvarint- or raw-byte encoded as noted.

/// 32-byte post hash of the post being tipped by a basic transfer.
pub const DIAMOND_POST_HASH_KEY: &str = "DiamondPostHash";

/// Uvarint diamond level accompanying `DIAMOND_POST_HASH_KEY`.
pub const DIAMOND_LEVEL_KEY: &str = "DiamondLevel";

/// 33-byte derived public key that signed the transaction on the owner's
/// behalf.
pub const DERIVED_PUBLIC_KEY: &str = "DerivedPublicKey";

// UpdateGlobalParams field keys. Each value is a uvarint.
pub const USD_CENTS_PER_BITCOIN_KEY: &str = "USDCentsPerBitcoin";
pub const MIN_NETWORK_FEE_NANOS_PER_KB_KEY: &str = "MinNetworkFeeNanosPerKB";
pub const CREATE_PROFILE_FEE_NANOS_KEY: &str = "CreateProfileFeeNanos";
pub const CREATE_NFT_FEE_NANOS_KEY: &str = "CreateNFTFeeNanos";
pub const MAX_COPIES_PER_NFT_KEY: &str = "MaxCopiesPerNFT";

/// 33-byte public key to bar from signing blocks.
pub const FORBIDDEN_BLOCK_SIGNATURE_PUBKEY_KEY: &str = "ForbiddenBlockSignaturePubKey";
