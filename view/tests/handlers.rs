//! Per-handler coverage: messages, groups, social relations, global
//! params, cross-chain mints, DAO coins, and the NFT lifecycle.

mod common;

use common::*;
use plaza_transactions::extra_data::MIN_NETWORK_FEE_NANOS_PER_KB_KEY;
use plaza_transactions::{
    AuthorizeDerivedKeyMetadata, AuthorizeDerivedKeyOperation, BitcoinExchangeMetadata,
    BurnNftMetadata, CreateNftMetadata, CreatorCoinMetadata, CreatorCoinOperation,
    DaoCoinMetadata, DaoCoinOperation, DaoCoinTransferMetadata, FollowMetadata, LikeMetadata,
    MessagingGroupMetadata, NftBidMetadata, NftTransferMetadata, AcceptNftTransferMetadata,
    PrivateMessageMetadata, SubmitPostMetadata, TxnMeta, UpdateNftMetadata,
    UpdateProfileMetadata,
};
use plaza_types::{
    BalanceKey, GroupKeyName, MessageKey, MessagingGroupKey, MessagingGroupMember, NftBidKey,
    NftKey, TransferRestrictionStatus, TxnHash,
};
use plaza_view::{RuleError, ViewError};
use primitive_types::U256;
use std::collections::BTreeMap;

fn profile_meta(username: &[u8], creator_basis_points: u64) -> UpdateProfileMetadata {
    UpdateProfileMetadata {
        profile_public_key: None,
        new_username: username.to_vec(),
        new_description: vec![],
        new_profile_pic: vec![],
        new_creator_basis_points: creator_basis_points,
        is_hidden: false,
    }
}

fn post_meta(timestamp_nanos: u64) -> SubmitPostMetadata {
    SubmitPostMetadata {
        post_hash_to_modify: None,
        parent_post_hash: None,
        body: b"a post".to_vec(),
        reposted_post_hash: None,
        is_quoted_repost: false,
        timestamp_nanos,
        is_hidden: false,
    }
}

fn nft_meta(post_hash: TxnHash, copies: u64, for_sale: bool) -> CreateNftMetadata {
    CreateNftMetadata {
        nft_post_hash: post_hash,
        num_copies: copies,
        has_unlockable: false,
        is_for_sale: for_sale,
        min_bid_amount_nanos: 0,
        nft_royalty_to_creator_basis_points: 0,
        nft_royalty_to_coin_basis_points: 0,
        is_buy_now: false,
        buy_now_price_nanos: 0,
        additional_royalties_to_creators: BTreeMap::new(),
        additional_royalties_to_coins: BTreeMap::new(),
    }
}

// ── Private messages ────────────────────────────────────────────────────

#[test]
fn private_message_roundtrip_and_uniqueness() {
    let mut h = Harness::new();
    let funding = h.fund_block(&[(&keypair(1), 1_000), (&keypair(2), 1_000)]);
    let mut alice = Wallet::new(keypair(1), funding[0], 1_000);
    let bob = keypair(2);

    let msg_meta = PrivateMessageMetadata {
        recipient_public_key: bob.public,
        encrypted_text: b"ciphertext".to_vec(),
        timestamp_nanos: 5_000,
        version: 1,
        sender_messaging_public_key: None,
        sender_messaging_group_key_name: vec![],
        recipient_messaging_public_key: None,
        recipient_messaging_group_key_name: vec![],
    };
    let msg_txn = alice.txn(TxnMeta::PrivateMessage(msg_meta.clone()));
    let connected = h.connect_txn(&msg_txn).unwrap();

    let sender_key = MessageKey::new(alice.kp.public, 5_000);
    let recipient_key = MessageKey::new(bob.public, 5_000);
    assert!(h.view.message_entry(&sender_key).unwrap().is_some());
    assert!(h.view.message_entry(&recipient_key).unwrap().is_some());

    // Same recipient timestamp collides.
    let dup_txn = alice.txn(TxnMeta::PrivateMessage(msg_meta));
    let err = h.connect_txn(&dup_txn).unwrap_err();
    assert!(matches!(
        err,
        ViewError::Rule(RuleError::PrivateMessageExistsAlready)
    ));

    // Disconnect removes both mappings.
    let hash = msg_txn.hash();
    h.view
        .disconnect_transaction(&msg_txn, &hash, connected.ops, h.height + 1)
        .unwrap();
    assert!(h
        .view
        .message_entry(&sender_key)
        .unwrap()
        .map_or(true, |entry| entry.is_deleted));
}

// ── Messaging groups ────────────────────────────────────────────────────

#[test]
fn messaging_group_members_add_only() {
    let mut h = Harness::new();
    let funding = h.fund_block(&[(&keypair(1), 1_000)]);
    let mut owner = Wallet::new(keypair(1), funding[0], 1_000);
    let member = keypair(2);

    let group_member = MessagingGroupMember {
        group_member_public_key: member.public,
        group_member_key_name: GroupKeyName::new(b"default"),
        encrypted_key: b"enc".to_vec(),
    };
    let create_txn = owner.txn(TxnMeta::MessagingGroup(MessagingGroupMetadata {
        messaging_public_key: keypair(9).public,
        messaging_group_key_name: b"team".to_vec(),
        members: vec![group_member.clone()],
    }));
    h.connect_txn(&create_txn).unwrap();

    let group_key = MessagingGroupKey::new(owner.kp.public, b"team");
    let group = h.view.messaging_group_entry(&group_key).unwrap().unwrap();
    assert_eq!(group.members.len(), 1);

    // Re-adding the same member is an error, not a replacement.
    let dup_txn = owner.txn(TxnMeta::MessagingGroup(MessagingGroupMetadata {
        messaging_public_key: keypair(9).public,
        messaging_group_key_name: b"team".to_vec(),
        members: vec![group_member],
    }));
    let err = h.connect_txn(&dup_txn).unwrap_err();
    assert!(matches!(
        err,
        ViewError::Rule(RuleError::MessagingGroupMemberAlreadyExists)
    ));

    // The reserved default group may not carry members.
    let default_txn = owner.txn(TxnMeta::MessagingGroup(MessagingGroupMetadata {
        messaging_public_key: keypair(9).public,
        messaging_group_key_name: b"default-key".to_vec(),
        members: vec![MessagingGroupMember {
            group_member_public_key: member.public,
            group_member_key_name: GroupKeyName::new(b"default"),
            encrypted_key: b"enc".to_vec(),
        }],
    }));
    let err = h.connect_txn(&default_txn).unwrap_err();
    assert!(matches!(
        err,
        ViewError::Rule(RuleError::MessagingGroupDefaultKeyCannotHaveMembers)
    ));
}

// ── Follows and likes ───────────────────────────────────────────────────

#[test]
fn follow_like_toggle_and_counters() {
    let mut h = Harness::new();
    let funding = h.fund_block(&[(&keypair(1), 1_000), (&keypair(2), 1_000)]);
    let mut alice = Wallet::new(keypair(1), funding[0], 1_000);
    let mut bob = Wallet::new(keypair(2), funding[1], 1_000);

    let profile_txn = alice.txn(TxnMeta::UpdateProfile(profile_meta(b"alice", 0)));
    h.connect_txn(&profile_txn).unwrap();
    let post_txn = alice.txn(TxnMeta::SubmitPost(post_meta(1_234)));
    let post_hash = post_txn.hash();
    h.connect_txn(&post_txn).unwrap();

    // Unfollowing before following fails.
    let bad_unfollow = bob.txn(TxnMeta::Follow(FollowMetadata {
        followed_public_key: alice.kp.public,
        is_unfollow: true,
    }));
    let err = h.connect_txn(&bad_unfollow).unwrap_err();
    assert!(matches!(
        err,
        ViewError::Rule(RuleError::CannotUnfollowNonexistentFollowEntry)
    ));

    let follow_txn = bob.txn(TxnMeta::Follow(FollowMetadata {
        followed_public_key: alice.kp.public,
        is_unfollow: false,
    }));
    h.connect_txn(&follow_txn).unwrap();

    let like_txn = bob.txn(TxnMeta::Like(LikeMetadata {
        liked_post_hash: post_hash,
        is_unlike: false,
    }));
    h.connect_txn(&like_txn).unwrap();
    assert_eq!(
        h.view.post_entry(&post_hash).unwrap().unwrap().like_count,
        1
    );

    // Double-like is rejected.
    let dup_like = bob.txn(TxnMeta::Like(LikeMetadata {
        liked_post_hash: post_hash,
        is_unlike: false,
    }));
    let err = h.connect_txn(&dup_like).unwrap_err();
    assert!(matches!(
        err,
        ViewError::Rule(RuleError::LikeEntryAlreadyExists)
    ));

    let unlike_txn = bob.txn(TxnMeta::Like(LikeMetadata {
        liked_post_hash: post_hash,
        is_unlike: true,
    }));
    h.connect_txn(&unlike_txn).unwrap();
    assert_eq!(
        h.view.post_entry(&post_hash).unwrap().unwrap().like_count,
        0
    );
}

// ── Global params and exchange rate ─────────────────────────────────────

#[test]
fn global_params_require_param_updater() {
    let mut h = Harness::new();
    let funding = h.fund_block(&[(&keypair(0), 1_000), (&keypair(5), 1_000)]);
    let mut updater = Wallet::new(keypair(0), funding[0], 1_000);
    let mut rando = Wallet::new(keypair(5), funding[1], 1_000);

    let mut extra_data = BTreeMap::new();
    extra_data.insert(
        MIN_NETWORK_FEE_NANOS_PER_KB_KEY.to_string(),
        uvarint_bytes(7),
    );

    let denied = rando.txn_with(TxnMeta::UpdateGlobalParams, extra_data.clone(), 0);
    let err = h.connect_txn(&denied).unwrap_err();
    assert!(matches!(
        err,
        ViewError::Rule(RuleError::UserNotAuthorizedToUpdateGlobalParams)
    ));

    let update = updater.txn_with(TxnMeta::UpdateGlobalParams, extra_data, 0);
    let connected = h.connect_txn(&update).unwrap();
    assert_eq!(h.view.global_params().minimum_network_fee_nanos_per_kb, 7);

    // Disconnect restores the prior params.
    let hash = update.hash();
    h.view
        .disconnect_transaction(&update, &hash, connected.ops, h.height + 1)
        .unwrap();
    assert_eq!(h.view.global_params().minimum_network_fee_nanos_per_kb, 0);
}

// ── Cross-chain burn mints ──────────────────────────────────────────────

#[test]
fn bitcoin_exchange_mints_once_per_burn() {
    let mut h = Harness::new();
    let minter = keypair(7);

    let meta = BitcoinExchangeMetadata {
        burn_txn_id: TxnHash::new([0xBB; 32]),
        burn_amount_satoshis: 100_000_000, // one whole bitcoin
    };
    let mint_txn = signed_txn(
        &minter,
        vec![],
        vec![],
        BTreeMap::new(),
        TxnMeta::BitcoinExchange(meta.clone()),
    );
    let connected = h.connect_txn(&mint_txn).unwrap();

    // rate 3,000,000 cents/BTC at 100,000 nanos per cent, less the 10bp
    // mint fee.
    let minted = 3_000_000u64 * 100_000;
    let fee = minted / 1_000;
    assert_eq!(connected.total_input, minted);
    assert_eq!(connected.total_output, minted - fee);
    assert_eq!(connected.fees, fee);
    assert_eq!(h.balance(&minter.public), minted - fee);

    // The same burn id cannot mint twice.
    let replay = signed_txn(
        &minter,
        vec![],
        vec![],
        BTreeMap::new(),
        TxnMeta::BitcoinExchange(meta),
    );
    let err = h.connect_txn(&replay).unwrap_err();
    assert!(matches!(
        err,
        ViewError::Rule(RuleError::BitcoinBurnAlreadyProcessed)
    ));
}

// ── DAO coins ───────────────────────────────────────────────────────────

#[test]
fn dao_coin_lifecycle_and_restrictions() {
    let mut h = Harness::new();
    let funding = h.fund_block(&[
        (&keypair(1), 1_000),
        (&keypair(2), 1_000),
        (&keypair(3), 1_000),
    ]);
    let mut creator = Wallet::new(keypair(1), funding[0], 1_000);
    let mut alice = Wallet::new(keypair(2), funding[1], 1_000);
    let bob = keypair(3);

    let profile_txn = creator.txn(TxnMeta::UpdateProfile(profile_meta(b"dao", 0)));
    h.connect_txn(&profile_txn).unwrap();

    let dao_op = |operation, mint: u64, burn: u64, status| {
        TxnMeta::DaoCoin(DaoCoinMetadata {
            profile_public_key: keypair(1).public,
            operation,
            coins_to_mint_nanos: U256::from(mint),
            coins_to_burn_nanos: U256::from(burn),
            transfer_restriction_status: status,
        })
    };

    // Only the owner mints.
    let outsider_mint = alice.txn(dao_op(
        DaoCoinOperation::Mint,
        1_000,
        0,
        TransferRestrictionStatus::Unrestricted,
    ));
    let err = h.connect_txn(&outsider_mint).unwrap_err();
    assert!(matches!(
        err,
        ViewError::Rule(RuleError::OnlyProfileOwnerCanMintDaoCoin)
    ));

    let mint_txn = creator.txn(dao_op(
        DaoCoinOperation::Mint,
        1_000,
        0,
        TransferRestrictionStatus::Unrestricted,
    ));
    h.connect_txn(&mint_txn).unwrap();

    let creator_pkid = h.view.pkid_for_public_key(&creator.kp.public).unwrap().pkid;
    let profile = h.view.profile_for_pkid(&creator_pkid).unwrap().unwrap();
    assert_eq!(profile.dao_coin.coins_in_circulation, U256::from(1_000u64));
    assert_eq!(profile.dao_coin.number_of_holders, 1);

    // Transfer half to alice while unrestricted.
    let xfer = creator.txn(TxnMeta::DaoCoinTransfer(DaoCoinTransferMetadata {
        profile_public_key: creator.kp.public,
        dao_coin_to_transfer_nanos: U256::from(500u64),
        receiver_public_key: alice.kp.public,
    }));
    h.connect_txn(&xfer).unwrap();

    // Owner-only restriction blocks holder-to-holder transfers.
    let restrict = creator.txn(dao_op(
        DaoCoinOperation::UpdateTransferRestrictionStatus,
        0,
        0,
        TransferRestrictionStatus::ProfileOwnerOnly,
    ));
    h.connect_txn(&restrict).unwrap();

    let blocked = alice.txn(TxnMeta::DaoCoinTransfer(DaoCoinTransferMetadata {
        profile_public_key: creator.kp.public,
        dao_coin_to_transfer_nanos: U256::from(100u64),
        receiver_public_key: bob.public,
    }));
    let err = h.connect_txn(&blocked).unwrap_err();
    assert!(matches!(
        err,
        ViewError::Rule(RuleError::CoinTransferProhibitedByTransferRestriction)
    ));

    // The permanent latch absorbs and never reopens.
    let permanent = creator.txn(dao_op(
        DaoCoinOperation::UpdateTransferRestrictionStatus,
        0,
        0,
        TransferRestrictionStatus::PermanentlyUnrestricted,
    ));
    h.connect_txn(&permanent).unwrap();

    let relatch = creator.txn(dao_op(
        DaoCoinOperation::UpdateTransferRestrictionStatus,
        0,
        0,
        TransferRestrictionStatus::ProfileOwnerOnly,
    ));
    let err = h.connect_txn(&relatch).unwrap_err();
    assert!(matches!(
        err,
        ViewError::Rule(RuleError::DaoCoinCannotUpdatePermanentTransferRestriction)
    ));

    let unblocked = alice.txn(TxnMeta::DaoCoinTransfer(DaoCoinTransferMetadata {
        profile_public_key: creator.kp.public,
        dao_coin_to_transfer_nanos: U256::from(100u64),
        receiver_public_key: bob.public,
    }));
    h.connect_txn(&unblocked).unwrap();

    // Minting can be shut off for good.
    let disable = creator.txn(dao_op(
        DaoCoinOperation::DisableMinting,
        0,
        0,
        TransferRestrictionStatus::Unrestricted,
    ));
    h.connect_txn(&disable).unwrap();
    let late_mint = creator.txn(dao_op(
        DaoCoinOperation::Mint,
        1,
        0,
        TransferRestrictionStatus::Unrestricted,
    ));
    let err = h.connect_txn(&late_mint).unwrap_err();
    assert!(matches!(
        err,
        ViewError::Rule(RuleError::DaoCoinMintingDisabled)
    ));
}

// ── NFT sale-state updates ──────────────────────────────────────────────

#[test]
fn update_nft_off_sale_voids_bids_and_disconnect_restores_them() {
    let mut h = Harness::new();
    let funding = h.fund_block(&[(&keypair(1), 1_000), (&keypair(2), 1_000)]);
    let mut creator = Wallet::new(keypair(1), funding[0], 1_000);
    let mut bidder = Wallet::new(keypair(2), funding[1], 1_000);

    let profile_txn = creator.txn(TxnMeta::UpdateProfile(profile_meta(b"creator", 0)));
    h.connect_txn(&profile_txn).unwrap();
    let post_txn = creator.txn(TxnMeta::SubmitPost(post_meta(10_000)));
    let post_hash = post_txn.hash();
    h.connect_txn(&post_txn).unwrap();
    let mint_txn = creator.txn(TxnMeta::CreateNft(nft_meta(post_hash, 1, true)));
    h.connect_txn(&mint_txn).unwrap();

    let bid_txn = bidder.txn(TxnMeta::NftBid(NftBidMetadata {
        nft_post_hash: post_hash,
        serial_number: 1,
        bid_amount_nanos: 10,
    }));
    h.connect_txn(&bid_txn).unwrap();

    let off_sale = creator.txn(TxnMeta::UpdateNft(UpdateNftMetadata {
        nft_post_hash: post_hash,
        serial_number: 1,
        is_for_sale: false,
        min_bid_amount_nanos: 0,
        is_buy_now: false,
        buy_now_price_nanos: 0,
    }));
    let connected = h.connect_txn(&off_sale).unwrap();

    let bidder_pkid = h.view.pkid_for_public_key(&bidder.kp.public).unwrap().pkid;
    let bid_key = NftBidKey {
        bidder_pkid,
        post_hash,
        serial_number: 1,
    };
    assert!(h
        .view
        .nft_bid_entry(&bid_key)
        .unwrap()
        .map_or(true, |entry| entry.is_deleted));
    let post = h.view.post_entry(&post_hash).unwrap().unwrap();
    assert_eq!(post.num_nft_copies_for_sale, 0);

    // Disconnect restores the order book.
    let hash = off_sale.hash();
    h.view
        .disconnect_transaction(&off_sale, &hash, connected.ops, h.height + 1)
        .unwrap();
    let restored = h.view.nft_bid_entry(&bid_key).unwrap().unwrap();
    assert!(!restored.is_deleted);
    assert_eq!(restored.bid_amount_nanos, 10);
}

// ── NFT transfer, accept, burn ──────────────────────────────────────────

#[test]
fn nft_transfer_accept_burn_flow() {
    let mut h = Harness::new();
    let funding = h.fund_block(&[(&keypair(1), 1_000), (&keypair(2), 1_000)]);
    let mut creator = Wallet::new(keypair(1), funding[0], 1_000);
    let mut receiver = Wallet::new(keypair(2), funding[1], 1_000);

    let profile_txn = creator.txn(TxnMeta::UpdateProfile(profile_meta(b"creator", 0)));
    h.connect_txn(&profile_txn).unwrap();
    let post_txn = creator.txn(TxnMeta::SubmitPost(post_meta(11_000)));
    let post_hash = post_txn.hash();
    h.connect_txn(&post_txn).unwrap();
    let mint_txn = creator.txn(TxnMeta::CreateNft(nft_meta(post_hash, 1, false)));
    h.connect_txn(&mint_txn).unwrap();

    let transfer_txn = creator.txn(TxnMeta::NftTransfer(NftTransferMetadata {
        nft_post_hash: post_hash,
        serial_number: 1,
        receiver_public_key: receiver.kp.public,
        unlockable_text: vec![],
    }));
    h.connect_txn(&transfer_txn).unwrap();

    let nft_key = NftKey::new(post_hash, 1);
    let receiver_pkid = h
        .view
        .pkid_for_public_key(&receiver.kp.public)
        .unwrap()
        .pkid;
    let nft = h.view.nft_entry(&nft_key).unwrap().unwrap();
    assert_eq!(nft.owner_pkid, receiver_pkid);
    assert!(nft.is_pending);

    // Pending entries cannot be burned by anyone but the receiver, and
    // accepting clears the pending flag.
    let accept_txn = receiver.txn(TxnMeta::AcceptNftTransfer(AcceptNftTransferMetadata {
        nft_post_hash: post_hash,
        serial_number: 1,
    }));
    h.connect_txn(&accept_txn).unwrap();
    let nft = h.view.nft_entry(&nft_key).unwrap().unwrap();
    assert!(!nft.is_pending);

    let burn_txn = receiver.txn(TxnMeta::BurnNft(BurnNftMetadata {
        nft_post_hash: post_hash,
        serial_number: 1,
    }));
    h.connect_txn(&burn_txn).unwrap();

    assert!(h
        .view
        .nft_entry(&nft_key)
        .unwrap()
        .map_or(true, |entry| entry.is_deleted));
    let post = h.view.post_entry(&post_hash).unwrap().unwrap();
    assert_eq!(post.num_nft_copies_burned, 1);
}

// ── Buy-now bids ────────────────────────────────────────────────────────

#[test]
fn buy_now_bid_executes_sale_immediately() {
    let mut h = Harness::new();
    let funding = h.fund_block(&[(&keypair(1), 1_000), (&keypair(2), 1_000)]);
    let mut creator = Wallet::new(keypair(1), funding[0], 1_000);
    let mut buyer = Wallet::new(keypair(2), funding[1], 1_000);

    let profile_txn = creator.txn(TxnMeta::UpdateProfile(profile_meta(b"creator", 0)));
    h.connect_txn(&profile_txn).unwrap();
    let post_txn = creator.txn(TxnMeta::SubmitPost(post_meta(12_000)));
    let post_hash = post_txn.hash();
    h.connect_txn(&post_txn).unwrap();

    let mut mint_meta = nft_meta(post_hash, 1, true);
    mint_meta.is_buy_now = true;
    mint_meta.buy_now_price_nanos = 100;
    let mint_txn = creator.txn(TxnMeta::CreateNft(mint_meta));
    h.connect_txn(&mint_txn).unwrap();

    let creator_balance_before = h.balance(&creator.kp.public);

    // The bid leaves 100 nanos of surplus to fund the purchase.
    let buy_txn = buyer.txn_with(
        TxnMeta::NftBid(NftBidMetadata {
            nft_post_hash: post_hash,
            serial_number: 1,
            bid_amount_nanos: 100,
        }),
        BTreeMap::new(),
        100,
    );
    h.connect_txn(&buy_txn).unwrap();

    let buyer_pkid = h.view.pkid_for_public_key(&buyer.kp.public).unwrap().pkid;
    let nft = h.view.nft_entry(&NftKey::new(post_hash, 1)).unwrap().unwrap();
    assert_eq!(nft.owner_pkid, buyer_pkid);
    assert!(!nft.is_for_sale);
    assert!(!nft.is_buy_now);
    assert_eq!(nft.last_accepted_bid_amount_nanos, 100);

    // No royalties configured: the full price lands with the seller.
    assert_eq!(h.balance(&creator.kp.public), creator_balance_before + 100);
    assert_eq!(h.balance(&buyer.kp.public), 900);

    let history = h
        .view
        .accepted_bid_history(&NftKey::new(post_hash, 1))
        .unwrap();
    assert_eq!(history.len(), 1);
}

// ── Creator-coin full exit ──────────────────────────────────────────────

#[test]
fn creator_coin_full_exit_resets_curve() {
    let mut h = Harness::new();
    let funding = h.fund_block(&[(&keypair(1), 2_000_000_000), (&keypair(2), 1_000)]);
    let mut buyer = Wallet::new(keypair(1), funding[0], 2_000_000_000);
    let mut creator = Wallet::new(keypair(2), funding[1], 1_000);

    let profile_txn = creator.txn(TxnMeta::UpdateProfile(profile_meta(b"creator", 0)));
    h.connect_txn(&profile_txn).unwrap();

    let buy_txn = buyer.txn_with(
        TxnMeta::CreatorCoin(CreatorCoinMetadata {
            profile_public_key: creator.kp.public,
            operation: CreatorCoinOperation::Buy,
            nanos_to_spend: 1_000_000_000,
            creator_coin_to_sell_nanos: 0,
            min_creator_coin_expected_nanos: 0,
            min_nanos_expected: 0,
        }),
        BTreeMap::new(),
        1_000_000_000,
    );
    h.connect_txn(&buy_txn).unwrap();

    let creator_pkid = h.view.pkid_for_public_key(&creator.kp.public).unwrap().pkid;
    let buyer_pkid = h.view.pkid_for_public_key(&buyer.kp.public).unwrap().pkid;
    let coin_balance = h
        .view
        .creator_coin_balance(&BalanceKey::new(buyer_pkid, creator_pkid))
        .unwrap()
        .unwrap()
        .balance_nanos
        .as_u64();
    assert!(coin_balance > 0);

    let sell_txn = buyer.txn(TxnMeta::CreatorCoin(CreatorCoinMetadata {
        profile_public_key: creator.kp.public,
        operation: CreatorCoinOperation::Sell,
        nanos_to_spend: 0,
        creator_coin_to_sell_nanos: coin_balance,
        min_creator_coin_expected_nanos: 0,
        min_nanos_expected: 0,
    }));
    h.connect_txn(&sell_txn).unwrap();

    // The last holder leaving resets the curve entirely.
    let profile = h.view.profile_for_pkid(&creator_pkid).unwrap().unwrap();
    assert_eq!(profile.creator_coin.locked_nanos, 0);
    assert!(profile.creator_coin.coins_in_circulation.is_zero());
    assert_eq!(profile.creator_coin.number_of_holders, 0);

    // The seller got the whole reserve back as sale proceeds.
    assert_eq!(h.balance(&buyer.kp.public), 2_000_000_000);
}

// ── Usernames ───────────────────────────────────────────────────────────

#[test]
fn usernames_are_unique_case_insensitively() {
    let mut h = Harness::new();
    let funding = h.fund_block(&[(&keypair(1), 1_000), (&keypair(2), 1_000)]);
    let mut alice = Wallet::new(keypair(1), funding[0], 1_000);
    let mut impostor = Wallet::new(keypair(2), funding[1], 1_000);

    let claim = alice.txn(TxnMeta::UpdateProfile(profile_meta(b"Alice", 0)));
    h.connect_txn(&claim).unwrap();

    let steal = impostor.txn(TxnMeta::UpdateProfile(profile_meta(b"aLiCe", 0)));
    let err = h.connect_txn(&steal).unwrap_err();
    assert!(matches!(
        err,
        ViewError::Rule(RuleError::ProfileUsernameExists)
    ));
}

// ── Revoked derived keys stay revoked ───────────────────────────────────

#[test]
fn revoked_derived_key_cannot_be_reauthorized() {
    let mut h = Harness::new();
    let funding = h.fund_block(&[(&keypair(1), 1_000)]);
    let mut owner = Wallet::new(keypair(1), funding[0], 1_000);
    let derived = keypair(9);

    let authorize = |owner: &mut Wallet, operation, expiration_block: u64| {
        let digest =
            AuthorizeDerivedKeyMetadata::access_digest(&derived.public, expiration_block);
        let access_signature =
            plaza_crypto::sign_digest(&digest, &keypair(1).secret).unwrap();
        owner.txn(TxnMeta::AuthorizeDerivedKey(AuthorizeDerivedKeyMetadata {
            derived_public_key: derived.public,
            expiration_block,
            operation,
            access_signature,
        }))
    };

    let grant = authorize(&mut owner, AuthorizeDerivedKeyOperation::Authorize, 100);
    h.connect_txn(&grant).unwrap();

    let revoke = authorize(&mut owner, AuthorizeDerivedKeyOperation::Revoke, 100);
    h.connect_txn(&revoke).unwrap();

    let regrant = authorize(&mut owner, AuthorizeDerivedKeyOperation::Authorize, 200);
    let err = h.connect_txn(&regrant).unwrap_err();
    assert!(matches!(
        err,
        ViewError::Rule(RuleError::AuthorizeDerivedKeyRevokedKeyCannotBeReauthorized)
    ));
}
