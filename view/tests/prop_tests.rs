//! Property-based invariants: reversibility, determinism, conservation.

mod common;

use common::*;
use plaza_types::BlockHash;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Disconnect(Connect(V, B)) is the identity on every observable field.
    #[test]
    fn connect_disconnect_is_identity(
        mint in 1_000u64..1_000_000_000,
        split_frac in 0u64..=100,
        fee in 0u64..500,
    ) {
        let mut h = Harness::new();
        let a = keypair(1);
        let b = keypair(2);

        let split = mint * split_frac / 100;
        let fee = fee.min(mint - split);
        let change = mint - split - fee;

        let cb = coinbase(1, vec![(a.public, mint)]);
        let xfer = transfer(
            &a,
            output_key(&cb, 0),
            vec![(b.public, split), (a.public, change)],
        );
        let block = h.make_block(vec![cb, xfer]);

        let ops = h.connect_block(&block).unwrap();
        prop_assert_eq!(h.balance(&a.public), change);
        prop_assert_eq!(h.balance(&b.public), split);

        h.disconnect_block(&block, ops).unwrap();
        prop_assert_eq!(h.balance(&a.public), 0);
        prop_assert_eq!(h.balance(&b.public), 0);
        prop_assert_eq!(h.view.num_utxo_entries(), 0);
        prop_assert_eq!(h.view.tip_hash(), BlockHash::ZERO);
    }

    /// Equal initial state and equal input produce equal undo logs and
    /// equal resulting state.
    #[test]
    fn connect_is_deterministic(
        mint in 1_000u64..1_000_000_000,
        split_frac in 0u64..=100,
    ) {
        let mut h1 = Harness::new();
        let mut h2 = Harness::new();
        let a = keypair(1);
        let b = keypair(2);

        let split = mint * split_frac / 100;
        let cb = coinbase(1, vec![(a.public, mint)]);
        let xfer = transfer(
            &a,
            output_key(&cb, 0),
            vec![(b.public, split), (a.public, mint - split)],
        );

        let block1 = h1.make_block(vec![cb.clone(), xfer.clone()]);
        let block2 = h2.make_block(vec![cb, xfer]);

        let ops1 = h1.connect_block(&block1).unwrap();
        let ops2 = h2.connect_block(&block2).unwrap();

        prop_assert_eq!(ops1, ops2);
        prop_assert_eq!(h1.balance(&a.public), h2.balance(&a.public));
        prop_assert_eq!(h1.balance(&b.public), h2.balance(&b.public));
        prop_assert_eq!(h1.view.tip_hash(), h2.view.tip_hash());
    }

    /// total input - total output = fees >= 0, and balances change only by
    /// the minted and fee amounts.
    #[test]
    fn conservation_holds(
        mint in 1_000u64..1_000_000_000,
        split_frac in 0u64..=100,
        fee in 0u64..500,
    ) {
        let mut h = Harness::new();
        let a = keypair(1);
        let b = keypair(2);

        let split = mint * split_frac / 100;
        let fee = fee.min(mint - split);
        let change = mint - split - fee;

        let funding = h.fund_block(&[(&a, mint)]);
        let xfer = transfer(&a, funding[0], vec![(b.public, split), (a.public, change)]);

        let connected = h.connect_txn(&xfer).unwrap();
        prop_assert_eq!(connected.total_input, mint);
        prop_assert_eq!(connected.total_output, split + change);
        prop_assert_eq!(connected.fees, fee);

        // Everything minted is either held or paid as fees.
        let held = h.balance(&a.public) + h.balance(&b.public);
        prop_assert_eq!(held + fee, mint);
    }

    /// A clone of the view diverges independently of its parent.
    #[test]
    fn cloned_views_are_independent(mint in 1_000u64..1_000_000_000) {
        let mut h = Harness::new();
        let a = keypair(1);
        let b = keypair(2);

        let funding = h.fund_block(&[(&a, mint)]);

        let mut fork = h.view.clone();
        let xfer = transfer(&a, funding[0], vec![(b.public, mint)]);
        let hash = xfer.hash();
        fork.connect_transaction(&xfer, &hash, 0, h.height + 1, true, false)
            .unwrap();

        // The fork moved the money; the parent did not.
        prop_assert_eq!(fork.balance_nanos(&b.public).unwrap(), mint);
        prop_assert_eq!(h.balance(&b.public), 0);
        prop_assert_eq!(h.balance(&a.public), mint);
    }
}
