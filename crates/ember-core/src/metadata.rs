//! Per-block bookkeeping stored alongside each block.
//!
//! Metadata records exist for every known headerhash, including hashes
//! whose block has not arrived yet: when an orphan is parked before its
//! parent, a placeholder record is created under the parent hash so the
//! child linkage survives until the parent shows up. Placeholders are
//! marked orphan with zero difficulties and are overwritten (children
//! preserved) once the real block validates.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::types::Hash256;

/// Consensus bookkeeping for one headerhash.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct BlockMetadata {
    /// True while the block (or an ancestor) is detached from the tree
    /// rooted at genesis.
    pub is_orphan: bool,
    /// Work of this block alone, big-endian 256-bit.
    block_difficulty: [u8; 32],
    /// Work of the chain ending at this block, big-endian 256-bit.
    cumulative_difficulty: [u8; 32],
    /// Headerhashes of known children, in arrival order, deduplicated.
    pub child_headerhashes: Vec<Hash256>,
}

impl BlockMetadata {
    /// Create a record with the given orphan flag and difficulties.
    pub fn new(is_orphan: bool, block_difficulty: U256, cumulative_difficulty: U256) -> Self {
        Self {
            is_orphan,
            block_difficulty: to_be_bytes(block_difficulty),
            cumulative_difficulty: to_be_bytes(cumulative_difficulty),
            child_headerhashes: Vec::new(),
        }
    }

    /// Placeholder for a headerhash whose block has not arrived.
    pub fn placeholder() -> Self {
        Self::new(true, U256::zero(), U256::zero())
    }

    /// Work of this block alone.
    pub fn block_difficulty(&self) -> U256 {
        U256::from_big_endian(&self.block_difficulty)
    }

    /// Work of the chain ending at this block.
    pub fn cumulative_difficulty(&self) -> U256 {
        U256::from_big_endian(&self.cumulative_difficulty)
    }

    /// Record a child headerhash, ignoring duplicates.
    pub fn add_child(&mut self, headerhash: Hash256) {
        if !self.child_headerhashes.contains(&headerhash) {
            self.child_headerhashes.push(headerhash);
        }
    }

    /// Remove a child headerhash, if present.
    pub fn remove_child(&mut self, headerhash: &Hash256) {
        self.child_headerhashes.retain(|h| h != headerhash);
    }
}

fn to_be_bytes(value: U256) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    bytes
}
