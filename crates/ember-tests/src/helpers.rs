//! Shared test helpers for integration tests.

use primitive_types::U256;

use ember_chain::{ChainManager, Clock};
use ember_core::constants::{COIN, PUBLIC_KEY_SIZE};
use ember_core::difficulty::calc_difficulty;
use ember_core::genesis::GENESIS_TIMESTAMP;
use ember_core::merkle;
use ember_core::pow;
use ember_core::reward::{AcceptAny, HalvingSchedule};
use ember_core::store::MemoryStore;
use ember_core::types::{Address, Block, BlockHeader, Hash256, Transaction};

/// A fixed "wall clock" comfortably ahead of every test chain's
/// timestamps, so the future-timestamp check never interferes.
pub const NOW: u64 = GENESIS_TIMESTAMP + 86_400;

pub fn test_clock() -> Clock {
    Box::new(|| NOW)
}

/// In-memory chain manager accepting any coinbase amount.
pub fn new_chain() -> ChainManager<MemoryStore> {
    ChainManager::with_parts(MemoryStore::new(), Box::new(AcceptAny), test_clock())
        .expect("genesis bootstrap")
}

/// In-memory chain manager enforcing the production reward schedule.
pub fn new_strict_chain() -> ChainManager<MemoryStore> {
    ChainManager::with_parts(MemoryStore::new(), Box::new(HalvingSchedule), test_clock())
        .expect("genesis bootstrap")
}

/// Deterministic public key from a seed byte.
pub fn public_key(seed: u8) -> Vec<u8> {
    let mut key = vec![0u8; PUBLIC_KEY_SIZE];
    blake3::Hasher::new()
        .update(&[seed])
        .finalize_xof()
        .fill(&mut key);
    key
}

/// Address of the seed account.
pub fn address(seed: u8) -> Address {
    Address::from_public_key(&public_key(seed))
}

/// Transfer from the seed account. The signature is a placeholder of a
/// plausible one-time-signature size.
pub fn transfer(from_seed: u8, to: Address, amount: u64, nonce: u64, ots_index: u16) -> Transaction {
    Transaction::Transfer {
        to,
        amount,
        fee: 1_000,
        nonce,
        ots_index,
        public_key: public_key(from_seed),
        signature: vec![from_seed; 64],
    }
}

/// Build and mine a child of `parent`.
///
/// Returns the block together with its own difficulty, so callers can
/// keep extending either a mainchain or a fork.
pub fn mine_child(
    parent: &Block,
    parent_difficulty: U256,
    delta: u64,
    miner: u8,
    reward: u64,
    transfers: Vec<Transaction>,
) -> (Block, U256) {
    let block_number = parent.block_number() + 1;
    let timestamp = parent.header.timestamp + delta;
    let mut txs = vec![Transaction::Coinbase {
        to: address(miner),
        amount: reward,
        block_number,
    }];
    txs.extend(transfers);
    let hashes: Vec<Hash256> = txs
        .iter()
        .map(|tx| tx.txhash().expect("test transactions serialize"))
        .collect();

    let mut block = Block {
        header: BlockHeader {
            block_number,
            prev_headerhash: parent.headerhash(),
            tx_merkle_root: merkle::merkle_root(&hashes),
            timestamp,
            mining_nonce: 0,
        },
        transactions: txs,
    };
    let dt = calc_difficulty(timestamp, parent.header.timestamp, parent_difficulty);
    block.header.mining_nonce = pow::mine(&block.header.mining_hash(), dt.target, 0, 10_000_000)
        .expect("test difficulty is minable");
    (block, dt.difficulty)
}

/// Mine a plain on-schedule block: one-minute spacing, 50 EMBER reward.
pub fn mine_next(parent: &Block, parent_difficulty: U256, miner: u8) -> (Block, U256) {
    mine_child(parent, parent_difficulty, 60, miner, 50 * COIN, vec![])
}
