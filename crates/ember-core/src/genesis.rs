//! Genesis block definition for the Ember network.
//!
//! The genesis block is the first block in the chain (height 0). It
//! contains a single coinbase transaction crediting the foundation
//! premine; the regular mining reward schedule starts at height 1.
//! Genesis carries no proof-of-work: it is accepted by identity, and
//! its difficulty is derived from a synthetic parent timestamp one
//! block interval before its own.
//!
//! All values are hardcoded and deterministic — every node computes the
//! identical genesis block.

use std::sync::LazyLock;

use crate::constants::{BLOCK_TIME_SECS, COIN, PUBLIC_KEY_SIZE};
use crate::merkle;
use crate::types::{Address, Block, BlockHeader, Hash256, Transaction};

/// Genesis block timestamp: January 1, 2026 00:00:00 UTC.
pub const GENESIS_TIMESTAMP: u64 = 1_767_225_600;

/// Synthetic timestamp of the genesis block's nonexistent parent, used
/// to seed the difficulty calculation.
pub const GENESIS_PARENT_TIMESTAMP: u64 = GENESIS_TIMESTAMP - BLOCK_TIME_SECS;

/// Foundation premine: 1,000,000 EMBER.
pub const FOUNDATION_PREMINE: u64 = 1_000_000 * COIN;

/// Cached genesis data, computed once on first access.
struct GenesisData {
    block: Block,
    hash: Hash256,
    coinbase_txhash: Hash256,
}

static GENESIS: LazyLock<GenesisData> = LazyLock::new(build_genesis);

/// Build the genesis block and cache derived values.
fn build_genesis() -> GenesisData {
    let coinbase = Transaction::Coinbase {
        to: foundation_address(),
        amount: FOUNDATION_PREMINE,
        block_number: 0,
    };
    // Hardcoded coinbase — serialization cannot fail.
    let coinbase_txhash = coinbase
        .txhash()
        .expect("genesis coinbase is hardcoded valid data");
    let mr = merkle::merkle_root(&[coinbase_txhash]);

    let block = Block {
        header: BlockHeader {
            block_number: 0,
            prev_headerhash: Hash256::ZERO,
            tx_merkle_root: mr,
            timestamp: GENESIS_TIMESTAMP,
            mining_nonce: 0,
        },
        transactions: vec![coinbase],
    };
    let hash = block.headerhash();

    GenesisData {
        block,
        hash,
        coinbase_txhash,
    }
}

/// The foundation public key.
///
/// Derived deterministically as the BLAKE3 XOF of
/// `b"ember genesis foundation"` for transparency. In production this
/// would be replaced with a real key ceremony output.
pub fn foundation_public_key() -> Vec<u8> {
    let mut key = vec![0u8; PUBLIC_KEY_SIZE];
    blake3::Hasher::new()
        .update(b"ember genesis foundation")
        .finalize_xof()
        .fill(&mut key);
    key
}

/// The foundation address.
pub fn foundation_address() -> Address {
    Address::from_public_key(&foundation_public_key())
}

/// The genesis block (height 0).
pub fn genesis_block() -> &'static Block {
    &GENESIS.block
}

/// The genesis block header hash.
pub fn genesis_hash() -> Hash256 {
    GENESIS.hash
}

/// The transaction hash of the genesis coinbase.
pub fn genesis_coinbase_txhash() -> Hash256 {
    GENESIS.coinbase_txhash
}

/// Check whether a block is the genesis block by comparing header hashes.
pub fn is_genesis(block: &Block) -> bool {
    block.headerhash() == GENESIS.hash
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- Constants ---

    #[test]
    fn genesis_timestamp_is_jan_1_2026() {
        // 56 years * 365 days + 14 leap days = 20454 days * 86400 sec/day
        assert_eq!(GENESIS_TIMESTAMP, 20454 * 86400);
    }

    #[test]
    fn synthetic_parent_is_one_interval_earlier() {
        assert_eq!(GENESIS_TIMESTAMP - GENESIS_PARENT_TIMESTAMP, BLOCK_TIME_SECS);
    }

    // --- Block structure ---

    #[test]
    fn genesis_block_deterministic() {
        assert_eq!(genesis_block(), genesis_block());
    }

    #[test]
    fn genesis_block_has_one_transaction() {
        assert_eq!(genesis_block().transactions.len(), 1);
    }

    #[test]
    fn genesis_coinbase_pays_foundation() {
        let block = genesis_block();
        let Transaction::Coinbase { to, amount, block_number } = &block.transactions[0] else {
            panic!("genesis first tx is not coinbase");
        };
        assert_eq!(*to, foundation_address());
        assert_eq!(*amount, FOUNDATION_PREMINE);
        assert_eq!(*block_number, 0);
    }

    #[test]
    fn genesis_header_fields() {
        let header = &genesis_block().header;
        assert_eq!(header.block_number, 0);
        assert!(header.prev_headerhash.is_zero());
        assert_eq!(header.timestamp, GENESIS_TIMESTAMP);
        assert_eq!(header.mining_nonce, 0);
    }

    // --- Merkle root ---

    #[test]
    fn genesis_merkle_root_correct() {
        let block = genesis_block();
        let txhash = block.transactions[0].txhash().unwrap();
        assert_eq!(block.header.tx_merkle_root, merkle::merkle_root(&[txhash]));
    }

    // --- Hash ---

    #[test]
    fn genesis_hash_matches_header() {
        assert_eq!(genesis_hash(), genesis_block().headerhash());
        assert!(!genesis_hash().is_zero());
    }

    #[test]
    fn genesis_coinbase_txhash_matches_computation() {
        let txhash = genesis_block().transactions[0].txhash().unwrap();
        assert_eq!(genesis_coinbase_txhash(), txhash);
    }

    // --- is_genesis ---

    #[test]
    fn is_genesis_true_for_genesis() {
        assert!(is_genesis(genesis_block()));
    }

    #[test]
    fn is_genesis_false_for_modified_genesis() {
        let mut modified = genesis_block().clone();
        modified.header.mining_nonce = 999;
        assert!(!is_genesis(&modified));
    }

    // --- Foundation key ---

    #[test]
    fn foundation_public_key_has_protocol_length() {
        assert_eq!(foundation_public_key().len(), PUBLIC_KEY_SIZE);
    }

    #[test]
    fn foundation_address_deterministic() {
        assert_eq!(foundation_address(), foundation_address());
        assert_ne!(foundation_address(), Address::ZERO);
    }
}
