//! End-to-end scenarios exercising connect, disconnect, and flush across
//! the sub-ledgers.

mod common;

use common::*;
use plaza_transactions::extra_data::{DERIVED_PUBLIC_KEY, DIAMOND_LEVEL_KEY, DIAMOND_POST_HASH_KEY};
use plaza_transactions::{
    AcceptNftBidMetadata, AuthorizeDerivedKeyMetadata, AuthorizeDerivedKeyOperation,
    CreateNftMetadata, CreatorCoinMetadata, CreatorCoinOperation, NftBidMetadata, SubmitPostMetadata,
    SwapIdentityMetadata, TxnMeta, UpdateProfileMetadata,
};
use plaza_types::{BalanceKey, BlockHash, NftKey, Signature};
use plaza_view::{RuleError, ViewError};
use std::collections::BTreeMap;

fn default_profile_meta(username: &[u8], creator_basis_points: u64) -> UpdateProfileMetadata {
    UpdateProfileMetadata {
        profile_public_key: None,
        new_username: username.to_vec(),
        new_description: b"a test profile".to_vec(),
        new_profile_pic: vec![],
        new_creator_basis_points: creator_basis_points,
        is_hidden: false,
    }
}

fn default_post_meta(timestamp_nanos: u64) -> SubmitPostMetadata {
    SubmitPostMetadata {
        post_hash_to_modify: None,
        parent_post_hash: None,
        body: b"hello plaza".to_vec(),
        reposted_post_hash: None,
        is_quoted_repost: false,
        timestamp_nanos,
        is_hidden: false,
    }
}

// ── S1: coinbase + transfer, then disconnect to genesis ─────────────────

#[test]
fn s1_block_transfer_and_disconnect() {
    let mut h = Harness::new();
    let a = keypair(1);
    let b = keypair(2);

    let cb = coinbase(1, vec![(a.public, 1_000_000)]);
    let xfer = transfer(
        &a,
        output_key(&cb, 0),
        vec![(b.public, 400_000), (a.public, 600_000)],
    );
    let block = h.make_block(vec![cb, xfer]);
    let block_hash = block.hash();

    let ops = h.connect_block(&block).unwrap();

    assert_eq!(h.balance(&a.public), 600_000);
    assert_eq!(h.balance(&b.public), 400_000);
    assert_eq!(h.view.num_utxo_entries(), 2);
    assert_eq!(h.view.tip_hash(), block_hash);

    h.disconnect_block(&block, ops).unwrap();

    assert_eq!(h.balance(&a.public), 0);
    assert_eq!(h.balance(&b.public), 0);
    assert_eq!(h.view.num_utxo_entries(), 0);
    assert_eq!(h.view.tip_hash(), BlockHash::ZERO);
}

#[test]
fn s1_flush_matches_view() {
    let mut h = Harness::new();
    let a = keypair(1);
    let b = keypair(2);

    let cb = coinbase(1, vec![(a.public, 1_000_000)]);
    let xfer = transfer(
        &a,
        output_key(&cb, 0),
        vec![(b.public, 400_000), (a.public, 600_000)],
    );
    let block = h.make_block(vec![cb, xfer]);
    h.connect_block(&block).unwrap();

    h.view.flush().unwrap();

    // A fresh view over the flushed store sees identical state.
    let mut reloaded = plaza_view::LedgerView::new(
        h.store.clone() as std::sync::Arc<dyn plaza_store::ChainStore>,
        test_params(),
    )
    .unwrap();
    assert_eq!(reloaded.balance_nanos(&a.public).unwrap(), 600_000);
    assert_eq!(reloaded.balance_nanos(&b.public).unwrap(), 400_000);
    assert_eq!(reloaded.num_utxo_entries(), 2);
    assert_eq!(reloaded.tip_hash(), block.hash());
}

// ── S2: founder reward follows the watermark ────────────────────────────

#[test]
fn s2_founder_reward_taxes_only_watermark_excess() {
    let mut h = Harness::new();
    let a = keypair(1);
    let b = keypair(2);
    let c = keypair(3);

    let funding = h.fund_block(&[
        (&a, 2_000_000_000),
        (&b, 2_000_000_000),
        (&c, 1_000_000),
    ]);

    // Creator profile with a 10% founder share.
    let profile_txn = signed_txn(
        &c,
        vec![funding[2]],
        vec![(c.public, 1_000_000)],
        BTreeMap::new(),
        TxnMeta::UpdateProfile(default_profile_meta(b"creator", 1_000)),
    );
    h.connect_txn(&profile_txn).unwrap();

    let c_pkid = h.view.pkid_for_public_key(&c.public).unwrap().pkid;
    let creator_balance_key = BalanceKey::new(c_pkid, c_pkid);

    let buy = |kp: &plaza_crypto::KeyPair, input, change_to, spend: u64| {
        signed_txn(
            kp,
            vec![input],
            vec![(change_to, 2_000_000_000 - spend)],
            BTreeMap::new(),
            TxnMeta::CreatorCoin(CreatorCoinMetadata {
                profile_public_key: c.public,
                operation: CreatorCoinOperation::Buy,
                nanos_to_spend: spend,
                creator_coin_to_sell_nanos: 0,
                min_creator_coin_expected_nanos: 0,
                min_nanos_expected: 0,
            }),
        )
    };

    // First buy crosses the watermark from zero.
    let buy_a = buy(&a, funding[0], a.public, 1_000_000_000);
    h.connect_txn(&buy_a).unwrap();

    let profile = h.view.profile_for_pkid(&c_pkid).unwrap().unwrap();
    let supply_after_a = profile.creator_coin.coins_in_circulation.as_u64();
    assert_eq!(profile.creator_coin.watermark_nanos, supply_after_a);

    let creator_after_a = h
        .view
        .creator_coin_balance(&creator_balance_key)
        .unwrap()
        .unwrap()
        .balance_nanos
        .as_u64();
    // Watermark started at zero, so the whole first mint is taxed at 10%.
    assert_eq!(creator_after_a, supply_after_a / 10);

    // Second buy is taxed only on circulation above the new watermark.
    let buy_b = buy(&b, funding[1], b.public, 1_000_000_000);
    h.connect_txn(&buy_b).unwrap();

    let profile = h.view.profile_for_pkid(&c_pkid).unwrap().unwrap();
    let supply_after_b = profile.creator_coin.coins_in_circulation.as_u64();
    assert!(supply_after_b > supply_after_a);

    let creator_after_b = h
        .view
        .creator_coin_balance(&creator_balance_key)
        .unwrap()
        .unwrap()
        .balance_nanos
        .as_u64();
    let expected_second_reward = (supply_after_b - supply_after_a) / 10;
    assert_eq!(creator_after_b, creator_after_a + expected_second_reward);
}

// ── S3: NFT mint, competing bids, accepted bid with royalties ───────────

#[test]
fn s3_accept_bid_pays_royalties_exactly() {
    let mut h = Harness::new();
    let a = keypair(1);
    let b = keypair(2);
    let c = keypair(3);

    let funding = h.fund_block(&[(&a, 1_000), (&b, 1_000), (&c, 1_000)]);

    // Creator: profile, post, then a three-copy mint with 10% creator and
    // 5% coin royalties.
    let profile_txn = signed_txn(
        &c,
        vec![funding[2]],
        vec![(c.public, 1_000)],
        BTreeMap::new(),
        TxnMeta::UpdateProfile(default_profile_meta(b"creator", 0)),
    );
    h.connect_txn(&profile_txn).unwrap();

    let post_txn = signed_txn(
        &c,
        vec![output_key(&profile_txn, 0)],
        vec![(c.public, 1_000)],
        BTreeMap::new(),
        TxnMeta::SubmitPost(default_post_meta(7_000)),
    );
    let post_hash = post_txn.hash();
    h.connect_txn(&post_txn).unwrap();

    let mint_txn = signed_txn(
        &c,
        vec![output_key(&post_txn, 0)],
        vec![(c.public, 1_000)],
        BTreeMap::new(),
        TxnMeta::CreateNft(CreateNftMetadata {
            nft_post_hash: post_hash,
            num_copies: 3,
            has_unlockable: false,
            is_for_sale: true,
            min_bid_amount_nanos: 0,
            nft_royalty_to_creator_basis_points: 1_000,
            nft_royalty_to_coin_basis_points: 500,
            is_buy_now: false,
            buy_now_price_nanos: 0,
            additional_royalties_to_creators: BTreeMap::new(),
            additional_royalties_to_coins: BTreeMap::new(),
        }),
    );
    h.connect_txn(&mint_txn).unwrap();

    // Two competing bids on serial 1.
    let bid_a = signed_txn(
        &a,
        vec![funding[0]],
        vec![(a.public, 1_000)],
        BTreeMap::new(),
        TxnMeta::NftBid(NftBidMetadata {
            nft_post_hash: post_hash,
            serial_number: 1,
            bid_amount_nanos: 10,
        }),
    );
    h.connect_txn(&bid_a).unwrap();

    let bid_b = signed_txn(
        &b,
        vec![funding[1]],
        vec![(b.public, 1_000)],
        BTreeMap::new(),
        TxnMeta::NftBid(NftBidMetadata {
            nft_post_hash: post_hash,
            serial_number: 1,
            bid_amount_nanos: 20,
        }),
    );
    h.connect_txn(&bid_b).unwrap();

    let c_balance_before = h.balance(&c.public);
    let b_balance_before = h.balance(&b.public);

    // Creator accepts B's bid, funded by B's change output.
    let accept_txn = signed_txn(
        &c,
        vec![output_key(&mint_txn, 0)],
        vec![(c.public, 1_000)],
        BTreeMap::new(),
        TxnMeta::AcceptNftBid(AcceptNftBidMetadata {
            nft_post_hash: post_hash,
            serial_number: 1,
            bidder_public_key: b.public,
            bid_amount_nanos: 20,
            unlockable_text: vec![],
            bidder_inputs: vec![output_key(&bid_b, 0)],
        }),
    );
    h.connect_txn(&accept_txn).unwrap();

    // Ownership moved to B; A's losing bid stays open.
    let nft_key = NftKey::new(post_hash, 1);
    let nft = h.view.nft_entry(&nft_key).unwrap().unwrap();
    let b_pkid = h.view.pkid_for_public_key(&b.public).unwrap().pkid;
    let a_pkid = h.view.pkid_for_public_key(&a.public).unwrap().pkid;
    assert_eq!(nft.owner_pkid, b_pkid);
    assert!(!nft.is_for_sale);
    assert_eq!(nft.last_accepted_bid_amount_nanos, 20);

    let a_bid = h
        .view
        .nft_bid_entry(&plaza_types::NftBidKey {
            bidder_pkid: a_pkid,
            post_hash,
            serial_number: 1,
        })
        .unwrap()
        .unwrap();
    assert!(!a_bid.is_deleted);
    assert_eq!(a_bid.bid_amount_nanos, 10);

    // History records the accepted bid.
    let history = h.view.accepted_bid_history(&nft_key).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].bidder_pkid, b_pkid);
    assert_eq!(history[0].bid_amount_nanos, 20);

    // Royalty splits sum to exactly the bid: 10% creator royalty (2) and
    // seller proceeds (17) arrive as outputs, 5% coin royalty (1) locks
    // into the profile reserve. B pays exactly 20 net of change.
    let c_pkid = h.view.pkid_for_public_key(&c.public).unwrap().pkid;
    let profile = h.view.profile_for_pkid(&c_pkid).unwrap().unwrap();
    assert_eq!(profile.creator_coin.locked_nanos, 1);
    assert_eq!(h.balance(&c.public), c_balance_before + 17 + 2);
    assert_eq!(h.balance(&b.public), b_balance_before - 20);
}

// ── S4: derived keys expire at their expiration height ──────────────────

#[test]
fn s4_derived_key_expires() {
    let mut h = Harness::new();
    let owner = keypair(10);
    let derived = keypair(11);

    let funding = h.fund_block(&[(&owner, 1_000_000)]);
    let authorize_height = h.height + 1;
    let expiration_block = authorize_height + 10;

    let access_digest =
        AuthorizeDerivedKeyMetadata::access_digest(&derived.public, expiration_block);
    let authorize_txn = signed_txn(
        &owner,
        vec![funding[0]],
        vec![(owner.public, 1_000_000)],
        BTreeMap::new(),
        TxnMeta::AuthorizeDerivedKey(AuthorizeDerivedKeyMetadata {
            derived_public_key: derived.public,
            expiration_block,
            operation: AuthorizeDerivedKeyOperation::Authorize,
            access_signature: plaza_crypto::sign_digest(&access_digest, &owner.secret).unwrap(),
        }),
    );
    let authorize_hash = authorize_txn.hash();
    h.view
        .connect_transaction(&authorize_txn, &authorize_hash, 0, authorize_height, true, false)
        .unwrap();

    // A transfer signed by the derived key on the owner's behalf.
    let derived_signed = |input, height_hint: u64| {
        let mut extra_data = BTreeMap::new();
        extra_data.insert(
            DERIVED_PUBLIC_KEY.to_string(),
            derived.public.as_bytes().to_vec(),
        );
        let mut txn = plaza_transactions::Transaction {
            inputs: vec![input],
            outputs: vec![plaza_transactions::TxnOutput {
                public_key: owner.public,
                amount_nanos: 1_000_000 - height_hint,
            }],
            public_key: owner.public,
            extra_data,
            meta: TxnMeta::BasicTransfer,
            signature: Signature::ZERO,
        };
        txn.signature =
            plaza_crypto::sign_digest(&txn.signature_digest(), &derived.secret).unwrap();
        txn
    };

    // Accepted before expiration.
    let txn_ok = derived_signed(output_key(&authorize_txn, 0), 5);
    let txn_ok_hash = txn_ok.hash();
    h.view
        .connect_transaction(&txn_ok, &txn_ok_hash, 0, authorize_height + 5, true, false)
        .unwrap();

    // Rejected at and after the expiration height.
    let txn_late = derived_signed(output_key(&txn_ok, 0), 11);
    let txn_late_hash = txn_late.hash();
    let err = h
        .view
        .connect_transaction(&txn_late, &txn_late_hash, 0, authorize_height + 11, true, false)
        .unwrap_err();
    assert!(matches!(
        err,
        ViewError::Rule(RuleError::DerivedKeyNotAuthorized)
    ));
}

// ── S5: timestamp uniqueness and diamonds ───────────────────────────────

#[test]
fn s5_post_timestamps_unique_and_diamonds_accumulate() {
    let mut h = Harness::new();
    let a = keypair(1);
    let b = keypair(2);

    let funding = h.fund_block(&[(&a, 1_000_000), (&b, 2_000_000)]);

    let post_txn = signed_txn(
        &a,
        vec![funding[0]],
        vec![(a.public, 1_000_000)],
        BTreeMap::new(),
        TxnMeta::SubmitPost(default_post_meta(42_000)),
    );
    let post_hash = post_txn.hash();
    h.connect_txn(&post_txn).unwrap();

    // Same poster, same timestamp: rejected.
    let mut dup_meta = default_post_meta(42_000);
    dup_meta.body = b"different body".to_vec();
    let dup_txn = signed_txn(
        &a,
        vec![output_key(&post_txn, 0)],
        vec![(a.public, 1_000_000)],
        BTreeMap::new(),
        TxnMeta::SubmitPost(dup_meta),
    );
    let err = h.connect_txn(&dup_txn).unwrap_err();
    assert!(matches!(
        err,
        ViewError::Rule(RuleError::SubmitPostTimestampAlreadyUsed)
    ));

    // A level-2 diamond tip from B pays the level price to the author and
    // raises the post's diamond count by two.
    let level_2_nanos = 500_000;
    let mut extra_data = BTreeMap::new();
    extra_data.insert(DIAMOND_POST_HASH_KEY.to_string(), hash_bytes(&post_hash));
    extra_data.insert(DIAMOND_LEVEL_KEY.to_string(), uvarint_bytes(2));
    let diamond_txn = signed_txn(
        &b,
        vec![funding[1]],
        vec![
            (a.public, level_2_nanos),
            (b.public, 2_000_000 - level_2_nanos),
        ],
        extra_data,
        TxnMeta::BasicTransfer,
    );
    h.connect_txn(&diamond_txn).unwrap();

    let post = h.view.post_entry(&post_hash).unwrap().unwrap();
    assert_eq!(post.diamond_count, 2);

    let sender_pkid = h.view.pkid_for_public_key(&b.public).unwrap().pkid;
    let receiver_pkid = h.view.pkid_for_public_key(&a.public).unwrap().pkid;
    let diamond = h
        .view
        .diamond_entry(&plaza_types::DiamondKey {
            sender_pkid,
            receiver_pkid,
            diamond_post_hash: post_hash,
        })
        .unwrap()
        .unwrap();
    assert_eq!(diamond.diamond_level, 2);
}

// ── S6: SwapIdentity rebinds keys, not state ────────────────────────────

#[test]
fn s6_swap_identity_preserves_pkid_keyed_state() {
    let mut h = Harness::new();
    let updater = keypair(0);
    let k1 = keypair(21);
    let k2 = keypair(22);

    let funding = h.fund_block(&[(&updater, 1_000_000), (&k1, 1_000_000)]);

    let profile_txn = signed_txn(
        &k1,
        vec![funding[1]],
        vec![(k1.public, 1_000_000)],
        BTreeMap::new(),
        TxnMeta::UpdateProfile(default_profile_meta(b"alice", 0)),
    );
    h.connect_txn(&profile_txn).unwrap();

    let post_txn = signed_txn(
        &k1,
        vec![output_key(&profile_txn, 0)],
        vec![(k1.public, 1_000_000)],
        BTreeMap::new(),
        TxnMeta::SubmitPost(default_post_meta(9_000)),
    );
    let post_hash = post_txn.hash();
    h.connect_txn(&post_txn).unwrap();

    let mint_txn = signed_txn(
        &k1,
        vec![output_key(&post_txn, 0)],
        vec![(k1.public, 1_000_000)],
        BTreeMap::new(),
        TxnMeta::CreateNft(CreateNftMetadata {
            nft_post_hash: post_hash,
            num_copies: 1,
            has_unlockable: false,
            is_for_sale: false,
            min_bid_amount_nanos: 0,
            nft_royalty_to_creator_basis_points: 0,
            nft_royalty_to_coin_basis_points: 0,
            is_buy_now: false,
            buy_now_price_nanos: 0,
            additional_royalties_to_creators: BTreeMap::new(),
            additional_royalties_to_coins: BTreeMap::new(),
        }),
    );
    h.connect_txn(&mint_txn).unwrap();

    let k1_pkid_before = h.view.pkid_for_public_key(&k1.public).unwrap().pkid;
    let k2_pkid_before = h.view.pkid_for_public_key(&k2.public).unwrap().pkid;

    let swap_txn = signed_txn(
        &updater,
        vec![funding[0]],
        vec![(updater.public, 1_000_000)],
        BTreeMap::new(),
        TxnMeta::SwapIdentity(SwapIdentityMetadata {
            from_public_key: k1.public,
            to_public_key: k2.public,
        }),
    );
    h.connect_txn(&swap_txn).unwrap();

    // The identifiers swapped their key bindings.
    assert_eq!(
        h.view.pkid_for_public_key(&k2.public).unwrap().pkid,
        k1_pkid_before
    );
    assert_eq!(
        h.view.pkid_for_public_key(&k1.public).unwrap().pkid,
        k2_pkid_before
    );

    // Profile and NFT ownership stayed with the identifier, which K2 now
    // controls.
    let profile = h.view.profile_for_public_key(&k2.public).unwrap().unwrap();
    assert_eq!(profile.username, b"alice");
    assert!(h.view.profile_for_public_key(&k1.public).unwrap().is_none());

    let nft = h
        .view
        .nft_entry(&NftKey::new(post_hash, 1))
        .unwrap()
        .unwrap();
    assert_eq!(nft.owner_pkid, k1_pkid_before);
    assert_eq!(
        h.view.public_key_for_pkid(&k1_pkid_before).unwrap(),
        k2.public
    );
}

// ── Block-reward maturity ───────────────────────────────────────────────

#[test]
fn immature_block_reward_cannot_be_spent() {
    let mut params = test_params();
    params.block_reward_maturity_secs = 120; // two blocks at 60s
    let mut h = Harness::with_params(params);
    let a = keypair(1);
    let b = keypair(2);

    let funding = h.fund_block(&[(&a, 1_000_000)]);

    let spend = transfer(&a, funding[0], vec![(b.public, 1_000_000)]);
    let spend_hash = spend.hash();

    // One block of age is not enough.
    let err = h
        .view
        .connect_transaction(&spend, &spend_hash, 0, 2, true, false)
        .unwrap_err();
    assert!(matches!(
        err,
        ViewError::Rule(RuleError::InputSpendsImmatureBlockReward)
    ));

    // Two blocks of age is.
    h.view
        .connect_transaction(&spend, &spend_hash, 0, 3, true, false)
        .unwrap();
    assert_eq!(h.view.balance_nanos(&b.public).unwrap(), 1_000_000);
}

// ── Signature necessity ─────────────────────────────────────────────────

#[test]
fn invalid_signature_is_rejected() {
    let mut h = Harness::new();
    let a = keypair(1);
    let b = keypair(2);

    let funding = h.fund_block(&[(&a, 1_000_000)]);

    // Signed by the wrong key.
    let mut txn = transfer(&a, funding[0], vec![(b.public, 1_000_000)]);
    txn.signature = plaza_crypto::sign_digest(&txn.signature_digest(), &b.secret).unwrap();
    let err = h.connect_txn(&txn).unwrap_err();
    assert!(matches!(
        err,
        ViewError::Rule(RuleError::InvalidTransactionSignature)
    ));

    // Tampered after signing.
    let mut txn = transfer(&a, funding[0], vec![(b.public, 1_000_000)]);
    txn.outputs[0].amount_nanos = 999_999;
    let err = h.connect_txn(&txn).unwrap_err();
    assert!(matches!(
        err,
        ViewError::Rule(RuleError::InvalidTransactionSignature)
    ));
}
