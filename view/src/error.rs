//! Consensus rule errors and the view error envelope.
//!
//! `RuleError` display strings are part of the external interface: peers and
//! operators grep logs by these names, so variants are renamed only with a
//! fork. Arithmetic overflow is always a rule error, never a panic.

use plaza_store::StoreError;
use plaza_transactions::{TransactionError, TxnKind};
use thiserror::Error;

/// A transaction violated a consensus rule. The view is left unmutated; the
/// caller rejects the transaction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    // ── Structure and fees ──────────────────────────────────────────────
    #[error(transparent)]
    TransactionSanity(#[from] TransactionError),

    #[error("txn-too-big")]
    TxnTooBig,

    #[error("txn-output-exceeds-input")]
    TxnOutputExceedsInput,

    #[error("txn-fee-below-network-minimum")]
    TxnFeeBelowNetworkMinimum,

    #[error("overflow-detected-in-fee-rate-calculation")]
    OverflowDetectedInFeeRateCalculation,

    #[error("amount-overflow")]
    AmountOverflow,

    // ── Basic transfer inputs/outputs ───────────────────────────────────
    #[error("input-spends-nonexistent-utxo")]
    InputSpendsNonexistentUtxo,

    #[error("input-spends-previously-spent-output")]
    InputSpendsPreviouslySpentOutput,

    #[error("input-spends-immature-block-reward")]
    InputSpendsImmatureBlockReward,

    #[error("input-public-key-differs-from-txn-public-key")]
    InputWithPublicKeyDifferentFromTxnPublicKey,

    #[error("input-spends-output-with-invalid-amount")]
    InputSpendsOutputWithInvalidAmount,

    #[error("output-amount-invalid")]
    TxnOutputWithInvalidAmount,

    #[error("block-reward-txn-not-allowed-to-have-inputs")]
    BlockRewardTxnNotAllowedToHaveInputs,

    #[error("block-reward-txn-not-allowed-to-have-signature")]
    BlockRewardTxnNotAllowedToHaveSignature,

    // ── Signatures and derived keys ─────────────────────────────────────
    #[error("signature-invalid")]
    InvalidTransactionSignature,

    #[error("derived-key-not-authorized")]
    DerivedKeyNotAuthorized,

    #[error("derived-key-invalid-extra-data")]
    DerivedKeyInvalidExtraData,

    #[error("authorize-derived-key-access-signature-invalid")]
    AuthorizeDerivedKeyAccessSignatureInvalid,

    #[error("authorize-derived-key-expiration-must-be-in-future")]
    AuthorizeDerivedKeyExpirationMustBeInFuture,

    #[error("authorize-derived-key-revoked-key-cannot-be-reauthorized")]
    AuthorizeDerivedKeyRevokedKeyCannotBeReauthorized,

    // ── Blocks ──────────────────────────────────────────────────────────
    #[error("block-does-not-connect-to-tip")]
    BlockDoesNotConnectToTip,

    #[error("block-does-not-start-with-block-reward")]
    BlockDoesNotStartWithBlockReward,

    #[error("block-reward-output-with-invalid-amount")]
    BlockRewardOutputWithInvalidAmount,

    #[error("block-reward-overflow")]
    BlockRewardOverflow,

    #[error("block-reward-exceeds-max-allowed")]
    BlockRewardExceedsMaxAllowed,

    // ── Diamonds ────────────────────────────────────────────────────────
    #[error("diamond-post-hash-without-diamond-level")]
    BasicTransferHasDiamondPostHashWithoutDiamondLevel,

    #[error("diamond-level-invalid")]
    BasicTransferHasInvalidDiamondLevel,

    #[error("diamond-post-hash-invalid-length")]
    BasicTransferDiamondInvalidLengthForPostHashBytes,

    #[error("diamond-post-entry-does-not-exist")]
    BasicTransferDiamondPostEntryDoesNotExist,

    #[error("diamond-cannot-transfer-to-self")]
    BasicTransferDiamondCannotTransferToSelf,

    #[error("post-already-has-sufficient-diamonds")]
    PostAlreadyHasSufficientDiamonds,

    #[error("insufficient-nanos-for-diamond-level")]
    BasicTransferInsufficientNanosForDiamondLevel,

    // ── Cross-chain burn mints ──────────────────────────────────────────
    #[error("bitcoin-burn-already-processed")]
    BitcoinBurnAlreadyProcessed,

    #[error("bitcoin-exchange-invalid-burn-amount")]
    BitcoinExchangeInvalidBurnAmount,

    // ── Global params ───────────────────────────────────────────────────
    #[error("user-not-authorized-to-update-global-params")]
    UserNotAuthorizedToUpdateGlobalParams,

    #[error("user-not-authorized-to-update-exchange-rate")]
    UserNotAuthorizedToUpdateExchangeRate,

    #[error("global-params-value-invalid")]
    GlobalParamsValueInvalid,

    #[error("exchange-rate-too-low")]
    ExchangeRateTooLow,

    #[error("exchange-rate-too-high")]
    ExchangeRateTooHigh,

    #[error("min-network-fee-too-low")]
    MinNetworkFeeTooLow,

    #[error("min-network-fee-too-high")]
    MinNetworkFeeTooHigh,

    #[error("create-profile-fee-too-low")]
    CreateProfileFeeTooLow,

    #[error("create-profile-fee-too-high")]
    CreateProfileFeeTooHigh,

    #[error("create-nft-fee-too-low")]
    CreateNftFeeTooLow,

    #[error("create-nft-fee-too-high")]
    CreateNftFeeTooHigh,

    #[error("max-copies-per-nft-too-low")]
    MaxCopiesPerNftTooLow,

    #[error("max-copies-per-nft-too-high")]
    MaxCopiesPerNftTooHigh,

    #[error("forbidden-pub-key-invalid-length")]
    ForbiddenPubKeyLength,

    #[error("user-output-must-be-nonzero")]
    UserOutputMustBeNonzero,

    // ── Messages ────────────────────────────────────────────────────────
    #[error("private-message-encrypted-text-too-long")]
    PrivateMessageEncryptedTextLengthExceedsMax,

    #[error("private-message-timestamp-is-zero")]
    PrivateMessageTstampIsZero,

    #[error("private-message-already-exists")]
    PrivateMessageExistsAlready,

    #[error("private-message-sender-equals-recipient")]
    PrivateMessageSenderPublicKeyEqualsRecipientPublicKey,

    #[error("private-message-invalid-version")]
    PrivateMessageInvalidVersion,

    #[error("private-message-invalid-messaging-key")]
    PrivateMessageInvalidMessagingKey,

    #[error("messaging-group-key-name-too-short")]
    MessagingGroupKeyNameTooShort,

    #[error("messaging-group-key-name-too-long")]
    MessagingGroupKeyNameTooLong,

    #[error("messaging-group-default-key-cannot-have-members")]
    MessagingGroupDefaultKeyCannotHaveMembers,

    #[error("messaging-group-public-key-cannot-change")]
    MessagingGroupPublicKeyCannotChange,

    #[error("messaging-group-member-already-exists")]
    MessagingGroupMemberAlreadyExists,

    #[error("messaging-group-invalid-public-key")]
    MessagingGroupInvalidPublicKey,

    // ── Posts ───────────────────────────────────────────────────────────
    #[error("submit-post-modifying-nonexistent-post")]
    SubmitPostModifyingNonexistentPost,

    #[error("submit-post-modification-not-authorized")]
    SubmitPostPostModificationNotAuthorized,

    #[error("submit-post-cannot-update-nft")]
    SubmitPostCannotUpdateNft,

    #[error("submit-post-body-too-long")]
    SubmitPostBodyTooLong,

    #[error("submit-post-body-required")]
    SubmitPostBodyRequired,

    #[error("submit-post-parent-does-not-exist")]
    SubmitPostParentDoesNotExist,

    #[error("submit-post-reposted-post-does-not-exist")]
    SubmitPostRepostedPostDoesNotExist,

    #[error("submit-post-timestamp-is-zero")]
    SubmitPostTimestampIsZero,

    #[error("submit-post-timestamp-already-used")]
    SubmitPostTimestampAlreadyUsed,

    // ── Profiles ────────────────────────────────────────────────────────
    #[error("username-invalid")]
    InvalidUsername,

    #[error("username-taken")]
    ProfileUsernameExists,

    #[error("profile-description-too-long")]
    ProfileDescriptionTooLong,

    #[error("profile-pic-too-long")]
    ProfilePicTooLong,

    #[error("profile-creator-basis-points-exceeds-max")]
    ProfileCreatorBasisPointsExceedsMax,

    #[error("create-profile-with-insufficient-fee")]
    CreateProfileWithInsufficientFee,

    #[error("update-profile-not-authorized")]
    UpdateProfileNotAuthorized,

    // ── Follows and likes ───────────────────────────────────────────────
    #[error("cannot-follow-nonexistent-profile")]
    CannotFollowNonexistentProfile,

    #[error("cannot-unfollow-nonexistent-follow-entry")]
    CannotUnfollowNonexistentFollowEntry,

    #[error("cannot-like-nonexistent-post")]
    CannotLikeNonexistentPost,

    #[error("like-entry-already-exists")]
    LikeEntryAlreadyExists,

    #[error("cannot-unlike-without-existing-like")]
    CannotUnlikeWithoutAnExistingLike,

    // ── Creator coins and DAO coins ─────────────────────────────────────
    #[error("coin-operation-on-nonexistent-profile")]
    CoinOperationOnNonexistentProfile,

    #[error("creator-coin-buy-must-trade-nonzero-nanos")]
    CreatorCoinBuyMustTradeNonZeroNanos,

    #[error("creator-coin-buy-insufficient-funds")]
    CreatorCoinBuyInsufficientFunds,

    #[error("creator-coin-sell-insufficient-coins")]
    CreatorCoinSellInsufficientCoins,

    #[error("creator-coin-sell-must-trade-nonzero-coins")]
    CreatorCoinSellMustTradeNonZeroCoins,

    #[error("creator-coin-slippage-exceeded")]
    CreatorCoinSlippageExceeded,

    #[error("creator-coin-operation-not-supported")]
    CreatorCoinOperationNotSupported,

    #[error("creator-coin-supply-overflow")]
    CreatorCoinSupplyOverflow,

    #[error("coin-transfer-must-be-greater-than-zero")]
    CoinTransferMustBeGreaterThanZero,

    #[error("coin-transfer-cannot-transfer-to-self")]
    CoinTransferCannotTransferToSelf,

    #[error("coin-transfer-insufficient-coins")]
    CoinTransferInsufficientCoins,

    #[error("coin-transfer-prohibited-by-transfer-restriction")]
    CoinTransferProhibitedByTransferRestriction,

    #[error("only-profile-owner-can-mint-dao-coin")]
    OnlyProfileOwnerCanMintDaoCoin,

    #[error("only-profile-owner-can-disable-minting")]
    OnlyProfileOwnerCanDisableMinting,

    #[error("only-profile-owner-can-update-transfer-restriction")]
    OnlyProfileOwnerCanUpdateTransferRestriction,

    #[error("dao-coin-minting-disabled")]
    DaoCoinMintingDisabled,

    #[error("dao-coin-must-mint-nonzero")]
    DaoCoinMustMintNonZero,

    #[error("dao-coin-must-burn-nonzero")]
    DaoCoinMustBurnNonZero,

    #[error("dao-coin-burn-insufficient-coins")]
    DaoCoinBurnInsufficientCoins,

    #[error("dao-coin-transfer-restriction-is-permanent")]
    DaoCoinCannotUpdatePermanentTransferRestriction,

    // ── Identity ────────────────────────────────────────────────────────
    #[error("swap-identity-is-param-updater-only")]
    SwapIdentityIsParamUpdaterOnly,

    #[error("swap-identity-cannot-swap-identical-keys")]
    SwapIdentityCannotSwapIdenticalKeys,

    // ── NFTs ────────────────────────────────────────────────────────────
    #[error("create-nft-on-nonexistent-post")]
    CreateNftOnNonexistentPost,

    #[error("create-nft-must-be-post-author")]
    CreateNftMustBePostAuthor,

    #[error("create-nft-on-post-that-already-is-nft")]
    CreateNftOnPostThatAlreadyIsNft,

    #[error("create-nft-on-vanilla-repost")]
    CreateNftOnVanillaRepost,

    #[error("cannot-create-nft-without-profile")]
    CannotCreateNftWithoutProfile,

    #[error("create-nft-must-have-nonzero-copies")]
    CreateNftMustHaveNonZeroCopies,

    #[error("too-many-nft-copies")]
    TooManyNftCopies,

    #[error("royalty-sum-exceeds-bound")]
    NftRoyaltyExceedsMax,

    #[error("cannot-specify-creator-as-additional-royalty")]
    CannotSpecifyCreatorAsAdditionalRoyalty,

    #[error("create-nft-with-insufficient-funds")]
    CreateNftWithInsufficientFunds,

    #[error("cannot-have-unlockable-and-buy-now-nft")]
    CannotHaveUnlockableAndBuyNowNft,

    #[error("nft-does-not-exist")]
    NftDoesNotExist,

    #[error("only-owner-can-update-nft")]
    OnlyOwnerCanUpdateNft,

    #[error("cannot-update-pending-nft-transfer")]
    CannotUpdatePendingNftTransfer,

    #[error("nft-bid-on-nft-that-is-not-for-sale")]
    NftBidOnNftThatIsNotForSale,

    #[error("nft-owner-cannot-bid-on-owned-nft")]
    NftOwnerCannotBidOnOwnedNft,

    #[error("nft-bid-less-than-min-bid-amount")]
    NftBidLessThanMinBidAmount,

    #[error("insufficient-funds-for-nft-bid")]
    InsufficientFundsForNftBid,

    #[error("cannot-cancel-nonexistent-bid")]
    CannotCancelNonexistentBid,

    #[error("only-owner-can-accept-nft-bid")]
    OnlyOwnerCanAcceptNftBid,

    #[error("accept-nft-bid-on-nft-that-is-not-for-sale")]
    AcceptNftBidOnNftThatIsNotForSale,

    #[error("accept-nft-bid-on-nonexistent-bid")]
    AcceptNftBidOnNonexistentBid,

    #[error("accept-nft-bid-amount-mismatch")]
    AcceptNftBidAmountMismatch,

    #[error("nft-bidder-input-must-be-owned-by-bidder")]
    NftBidderInputMustBeOwnedByBidder,

    #[error("accept-nft-bid-bidder-inputs-insufficient-funds")]
    AcceptNftBidBidderInputsInsufficientFunds,

    #[error("unlockable-nft-must-provide-unlockable-text")]
    UnlockableNftMustProvideUnlockableText,

    #[error("only-owner-can-transfer-nft")]
    OnlyOwnerCanTransferNft,

    #[error("cannot-transfer-for-sale-nft")]
    CannotTransferForSaleNft,

    #[error("cannot-transfer-pending-nft")]
    CannotTransferPendingNft,

    #[error("nft-transfer-cannot-transfer-to-self")]
    NftTransferCannotTransferToSelf,

    #[error("accept-nft-transfer-on-non-pending-nft")]
    AcceptNftTransferOnNonPendingNft,

    #[error("only-owner-can-accept-nft-transfer")]
    OnlyOwnerCanAcceptNftTransfer,

    #[error("only-owner-can-burn-nft")]
    OnlyOwnerCanBurnNft,

    #[error("cannot-burn-nft-that-is-for-sale")]
    CannotBurnNftThatIsForSale,

    #[error("unimplemented-txn-kind {0}")]
    UnimplementedTxnKind(TxnKind),
}

/// Everything a view operation can fail with.
#[derive(Debug, Error)]
pub enum ViewError {
    /// A deterministic consensus violation; reject the transaction.
    #[error(transparent)]
    Rule(#[from] RuleError),

    /// The backing store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The overlay or its undo records are internally inconsistent. Fatal:
    /// the caller must halt consensus work rather than continue.
    #[error("corrupted view state: {0}")]
    Corruption(String),
}

impl From<TransactionError> for ViewError {
    fn from(err: TransactionError) -> Self {
        Self::Rule(RuleError::TransactionSanity(err))
    }
}

impl ViewError {
    /// True when the error is a deterministic rule rejection rather than an
    /// environment or corruption failure.
    pub fn is_rule_error(&self) -> bool {
        matches!(self, Self::Rule(_))
    }
}
