//! Fork choice, reorganization, and orphan handling under contention.

use ember_core::constants::{COIN, INITIAL_DIFFICULTY};
use ember_core::genesis::{FOUNDATION_PREMINE, foundation_address, genesis_hash};
use ember_tests::helpers::*;
use primitive_types::U256;

const MINER_A: u8 = 0x0A;
const MINER_B: u8 = 0x0B;
const CAROL: u8 = 0xC3;
const DAVE: u8 = 0xD4;

#[test]
fn deep_reorg_rewrites_only_the_diverged_suffix() {
    let mut chain = new_chain();
    let genesis = chain.last_block().clone();
    let genesis_difficulty = U256::from(INITIAL_DIFFICULTY);

    // Mainchain: three on-schedule blocks, difficulty 4 each.
    let (a1, da1) = mine_next(&genesis, genesis_difficulty, MINER_A);
    let (a2, da2) = mine_next(&a1, da1, MINER_A);
    let (a3, _) = mine_next(&a2, da2, MINER_A);
    for block in [&a1, &a2, &a3] {
        assert!(chain.add_block(block.clone()).unwrap());
    }
    assert_eq!(chain.get_cumulative_difficulty().unwrap(), U256::from(16));

    // Fork from genesis: one slow block, then two fast ones.
    // Difficulties 1, 4, 16; cumulative 4+1+4+16 = 25 beats 16.
    let (b1, db1) = mine_child(&genesis, genesis_difficulty, 240, MINER_B, 50 * COIN, vec![]);
    let (b2, db2) = mine_child(&b1, db1, 15, MINER_B, 50 * COIN, vec![]);
    let (b3, _) = mine_child(&b2, db2, 15, MINER_B, 50 * COIN, vec![]);

    assert!(chain.add_block(b1.clone()).unwrap());
    assert!(chain.add_block(b2.clone()).unwrap());
    // Still behind: 4+1+4 = 9 < 16.
    assert_eq!(chain.last_block().headerhash(), a3.headerhash());

    assert!(chain.add_block(b3.clone()).unwrap());
    assert_eq!(chain.last_block().headerhash(), b3.headerhash());
    assert_eq!(chain.get_cumulative_difficulty().unwrap(), U256::from(25));

    // The height index now names the fork at every diverged height.
    assert_eq!(
        chain.get_headerhashes().unwrap(),
        vec![
            genesis_hash(),
            b1.headerhash(),
            b2.headerhash(),
            b3.headerhash(),
        ],
    );
    // The losing blocks survive as a side branch.
    for block in [&a1, &a2, &a3] {
        assert!(chain.get_block(&block.headerhash()).unwrap().is_some());
    }
}

#[test]
fn heavier_but_shorter_branch_truncates_the_height_index() {
    let mut chain = new_chain();
    let genesis = chain.last_block().clone();
    let genesis_difficulty = U256::from(INITIAL_DIFFICULTY);

    // Two cheap mainchain blocks: difficulties 1, 1 (cumulative 6).
    let (a1, da1) = mine_child(&genesis, genesis_difficulty, 240, MINER_A, 50 * COIN, vec![]);
    let (a2, _) = mine_child(&a1, da1, 240, MINER_A, 50 * COIN, vec![]);
    assert!(chain.add_block(a1.clone()).unwrap());
    assert!(chain.add_block(a2.clone()).unwrap());
    assert_eq!(chain.height(), 2);
    assert_eq!(chain.get_cumulative_difficulty().unwrap(), U256::from(6));

    // One fast fork block: difficulty 16 (cumulative 20) wins at a
    // lower height.
    let (b1, _) = mine_child(&genesis, genesis_difficulty, 15, MINER_B, 50 * COIN, vec![]);
    assert!(chain.add_block(b1.clone()).unwrap());

    assert_eq!(chain.height(), 1);
    assert_eq!(chain.last_block().headerhash(), b1.headerhash());
    // The stale height-2 index entry is gone.
    assert_eq!(chain.get_block_by_number(2).unwrap(), None);
    assert_eq!(
        chain.get_headerhashes().unwrap(),
        vec![genesis_hash(), b1.headerhash()],
    );
}

#[test]
fn conflicting_spends_resolve_to_the_winning_branch() {
    let mut chain = new_chain();
    let genesis = chain.last_block().clone();
    let genesis_difficulty = U256::from(INITIAL_DIFFICULTY);

    // The foundation spends the same nonce and slot on both branches.
    let to_carol = transfer_from_foundation(address(CAROL), 100 * COIN);
    let to_dave = transfer_from_foundation(address(DAVE), 100 * COIN);

    let (a1, _) = mine_child(
        &genesis,
        genesis_difficulty,
        60,
        MINER_A,
        50 * COIN,
        vec![to_carol],
    );
    let (b1, db1) = mine_child(
        &genesis,
        genesis_difficulty,
        240,
        MINER_B,
        50 * COIN,
        vec![to_dave],
    );
    let (b2, _) = mine_child(&b1, db1, 15, MINER_B, 50 * COIN, vec![]);

    assert!(chain.add_block(a1.clone()).unwrap());
    assert!(chain.add_block(b1.clone()).unwrap());
    assert!(chain.add_block(b2.clone()).unwrap());
    assert_eq!(chain.last_block().headerhash(), b2.headerhash());

    // On the winning branch only Dave was paid.
    let tip = b2.headerhash();
    let state = chain
        .get_state(&tip, &[foundation_address(), address(CAROL), address(DAVE)])
        .unwrap();
    assert_eq!(state[0].1.balance, FOUNDATION_PREMINE - 100 * COIN - 1_000);
    assert_eq!(state[0].1.nonce, 1);
    assert_eq!(state[1].1.balance, 0);
    assert_eq!(state[2].1.balance, 100 * COIN);

    // The losing branch still answers ledger queries at its own tip.
    let side = a1.headerhash();
    let state = chain.get_state(&side, &[address(CAROL)]).unwrap();
    assert_eq!(state[0].1.balance, 100 * COIN);
}

#[test]
fn orphan_storm_converges_when_the_link_arrives() {
    let mut chain = new_chain();
    let genesis = chain.last_block().clone();
    let mut difficulty = U256::from(INITIAL_DIFFICULTY);

    let mut blocks = Vec::new();
    let mut parent = genesis;
    for _ in 0..5 {
        let (block, next_difficulty) = mine_next(&parent, difficulty, MINER_A);
        parent = block.clone();
        difficulty = next_difficulty;
        blocks.push(block);
    }

    // Deliver newest-first: everything parks.
    for block in blocks.iter().rev().take(4) {
        assert!(chain.add_block(block.clone()).unwrap());
        assert_eq!(chain.height(), 0);
    }

    // The missing link connects the whole chain in one pass.
    assert!(chain.add_block(blocks[0].clone()).unwrap());
    assert_eq!(chain.height(), 5);
    assert_eq!(
        chain.last_block().headerhash(),
        blocks.last().unwrap().headerhash(),
    );
}

#[test]
fn replaced_transfer_returns_to_the_pool() {
    let mut chain = new_chain();
    let genesis = chain.last_block().clone();
    let genesis_difficulty = U256::from(INITIAL_DIFFICULTY);

    let tx = transfer_from_foundation(address(CAROL), 42 * COIN);
    let txhash = tx.txhash().unwrap();

    let (a1, _) = mine_child(
        &genesis,
        genesis_difficulty,
        60,
        MINER_A,
        50 * COIN,
        vec![tx.clone()],
    );
    assert!(chain.add_block(a1).unwrap());

    let (b1, db1) = mine_child(&genesis, genesis_difficulty, 240, MINER_B, 50 * COIN, vec![]);
    let (b2, _) = mine_child(&b1, db1, 15, MINER_B, 50 * COIN, vec![]);
    assert!(chain.add_block(b1).unwrap());
    assert!(chain.add_block(b2).unwrap());

    assert!(chain.tx_pool().contains(&txhash));
    assert_eq!(chain.get_transaction(&txhash).unwrap(), Some((tx, None)));
}

fn transfer_from_foundation(to: ember_core::types::Address, amount: u64) -> ember_core::types::Transaction {
    ember_core::types::Transaction::Transfer {
        to,
        amount,
        fee: 1_000,
        nonce: 1,
        ots_index: 0,
        public_key: ember_core::genesis::foundation_public_key(),
        signature: vec![9u8; 64],
    }
}
