//! Adversarial tests: randomized and malformed inputs against the
//! chain manager.
//!
//! Attack vectors:
//! - Erratic block spacing trying to drive difficulty out of bounds
//! - Out-of-order delivery trying to desynchronize the block tree
//! - Nonce and one-time-signature replay
//! - Malformed transactions through the pool admission path

use ember_core::constants::{COIN, INITIAL_DIFFICULTY, MAX_OTS_INDEX};
use ember_core::genesis::foundation_public_key;
use ember_core::types::{Address, Transaction};
use ember_tests::helpers::*;
use primitive_types::U256;
use proptest::prelude::*;

const MINER: u8 = 0x5E;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Any spacing sequence yields a valid chain with difficulty never
    /// below the floor and strictly increasing cumulative work.
    #[test]
    fn erratic_spacing_keeps_difficulty_bounded(
        deltas in prop::collection::vec(1u64..=600, 1..6),
    ) {
        let mut chain = new_chain();
        let mut parent = chain.last_block().clone();
        let mut difficulty = U256::from(INITIAL_DIFFICULTY);
        let mut last_cumulative = chain.get_cumulative_difficulty().unwrap();

        for delta in deltas {
            let (block, next_difficulty) =
                mine_child(&parent, difficulty, delta, MINER, 50 * COIN, vec![]);
            prop_assert!(chain.add_block(block.clone()).unwrap());
            prop_assert!(next_difficulty >= U256::from(1));

            let cumulative = chain.get_cumulative_difficulty().unwrap();
            prop_assert!(cumulative > last_cumulative);
            last_cumulative = cumulative;
            parent = block;
            difficulty = next_difficulty;
        }
    }

    /// Delivering a chain in any order converges to the same tip.
    #[test]
    fn arrival_order_does_not_change_the_tip(
        order in Just(5usize).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle()),
    ) {
        let mut chain = new_chain();
        let mut parent = chain.last_block().clone();
        let mut difficulty = U256::from(INITIAL_DIFFICULTY);
        let mut blocks = Vec::new();
        for _ in 0..order.len() {
            let (block, next_difficulty) = mine_next(&parent, difficulty, MINER);
            parent = block.clone();
            difficulty = next_difficulty;
            blocks.push(block);
        }

        for index in order {
            prop_assert!(chain.add_block(blocks[index].clone()).unwrap());
        }
        prop_assert_eq!(chain.height(), blocks.len() as u64);
        prop_assert_eq!(
            chain.last_block().headerhash(),
            blocks.last().unwrap().headerhash(),
        );
    }

    /// A one-time-signature slot spent in any earlier block can never
    /// be spent again, whatever the second nonce claims.
    #[test]
    fn ots_slot_replay_always_rejected(ots in 0u16..MAX_OTS_INDEX) {
        let mut chain = new_chain();
        let genesis = chain.last_block().clone();

        let first = foundation_spend(1, ots);
        let (b1, d1) = mine_child(
            &genesis,
            U256::from(INITIAL_DIFFICULTY),
            60,
            MINER,
            50 * COIN,
            vec![first],
        );
        prop_assert!(chain.add_block(b1.clone()).unwrap());

        let replay = foundation_spend(2, ots);
        let (bad, _) = mine_child(&b1, d1, 60, MINER, 50 * COIN, vec![replay]);
        prop_assert!(!chain.add_block(bad).unwrap());
        prop_assert_eq!(chain.height(), 1);
    }
}

fn foundation_spend(nonce: u64, ots_index: u16) -> Transaction {
    Transaction::Transfer {
        to: Address([0x42; 20]),
        amount: COIN,
        fee: 1_000,
        nonce,
        ots_index,
        public_key: foundation_public_key(),
        signature: vec![3u8; 64],
    }
}

#[test]
fn zero_amount_transfer_rejected_in_block() {
    let mut chain = new_chain();
    let genesis = chain.last_block().clone();
    let tx = Transaction::Transfer {
        to: Address([0x42; 20]),
        amount: 0,
        fee: 1_000,
        nonce: 1,
        ots_index: 0,
        public_key: foundation_public_key(),
        signature: vec![3u8; 64],
    };
    let (bad, _) = mine_child(
        &genesis,
        U256::from(INITIAL_DIFFICULTY),
        60,
        MINER,
        50 * COIN,
        vec![tx],
    );
    assert!(!chain.add_block(bad).unwrap());
}

#[test]
fn value_overflow_rejected_in_block() {
    let mut chain = new_chain();
    let genesis = chain.last_block().clone();
    let tx = Transaction::Transfer {
        to: Address([0x42; 20]),
        amount: u64::MAX,
        fee: 1,
        nonce: 1,
        ots_index: 0,
        public_key: foundation_public_key(),
        signature: vec![3u8; 64],
    };
    let (bad, _) = mine_child(
        &genesis,
        U256::from(INITIAL_DIFFICULTY),
        60,
        MINER,
        50 * COIN,
        vec![tx],
    );
    assert!(!chain.add_block(bad).unwrap());
}

#[test]
fn oversized_signature_rejected_at_the_pool() {
    let mut chain = new_chain();
    let tx = Transaction::Transfer {
        to: Address([0x42; 20]),
        amount: COIN,
        fee: 1_000,
        nonce: 1,
        ots_index: 0,
        public_key: foundation_public_key(),
        signature: vec![0u8; 5_000],
    };
    assert!(chain.add_transaction(tx).is_err());
}

#[test]
fn out_of_range_ots_index_rejected_at_the_pool() {
    let mut chain = new_chain();
    let tx = Transaction::Transfer {
        to: Address([0x42; 20]),
        amount: COIN,
        fee: 1_000,
        nonce: 1,
        ots_index: MAX_OTS_INDEX,
        public_key: foundation_public_key(),
        signature: vec![3u8; 64],
    };
    assert!(chain.add_transaction(tx).is_err());
}

#[test]
fn duplicate_pool_submission_rejected() {
    let mut chain = new_chain();
    let tx = foundation_spend(1, 0);
    chain.add_transaction(tx.clone()).unwrap();
    assert!(chain.add_transaction(tx).is_err());
}

#[test]
fn coinbase_not_admitted_to_the_pool() {
    let mut chain = new_chain();
    let tx = Transaction::Coinbase {
        to: Address([0x42; 20]),
        amount: 50 * COIN,
        block_number: 1,
    };
    assert!(chain.add_transaction(tx).is_err());
}
