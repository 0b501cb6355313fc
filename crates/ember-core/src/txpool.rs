//! In-memory pool of unconfirmed transfers.
//!
//! The pool stores validated transfers awaiting inclusion in blocks.
//! It provides:
//! - O(1) lookup by txhash
//! - O(1) conflict detection via (sender, nonce) and (sender, OTS index)
//!   indexes
//! - O(log n) fee-ordered selection for block assembly
//! - Size-limited storage with lowest-fee eviction
//!
//! Transactions must be validated by the caller before insertion (using
//! [`validate_transaction`](crate::validation::validate_transaction)
//! plus a ledger check). The pool only checks for duplicates, conflicts,
//! and size limits. Coinbase transactions never enter the pool.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::constants::{POOL_MAX_BYTES, POOL_MAX_TXS};
use crate::error::PoolError;
use crate::types::{Address, Block, Hash256, Transaction};

/// A transaction stored in the pool with precomputed metadata.
#[derive(Debug, Clone)]
pub struct PoolEntry {
    /// The unconfirmed transfer.
    pub tx: Transaction,
    /// Precomputed transaction hash.
    pub txhash: Hash256,
    /// Sending address.
    pub sender: Address,
    /// Fee in embers.
    pub fee: u64,
    /// Serialized size in bytes.
    pub size: usize,
}

/// In-memory pool of unconfirmed transfers.
///
/// Not thread-safe; callers wrap the pool in a lock if concurrent
/// access is needed.
pub struct TxPool {
    /// Primary storage: txhash → entry.
    entries: HashMap<Hash256, PoolEntry>,
    /// (sender, nonce) → txhash of the pool transfer claiming that slot.
    by_nonce: HashMap<(Address, u64), Hash256>,
    /// (sender, OTS index) → txhash of the pool transfer spending that slot.
    by_ots: HashMap<(Address, u16), Hash256>,
    /// Fee-ordered index: `(fee, txhash)`, ascending. Lowest first for
    /// eviction; iterate in reverse for block assembly.
    by_fee: BTreeSet<(u64, Hash256)>,
    /// Maximum transaction count.
    max_count: usize,
    /// Maximum total serialized bytes.
    max_bytes: usize,
    /// Current total serialized bytes in the pool.
    total_bytes: usize,
}

impl TxPool {
    /// Create a new pool with the given size limits.
    pub fn new(max_count: usize, max_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            by_nonce: HashMap::new(),
            by_ots: HashMap::new(),
            by_fee: BTreeSet::new(),
            max_count,
            max_bytes,
            total_bytes: 0,
        }
    }

    /// Create a new pool with the protocol default limits.
    pub fn with_defaults() -> Self {
        Self::new(POOL_MAX_TXS, POOL_MAX_BYTES)
    }

    /// Insert a validated transfer into the pool.
    ///
    /// Returns the txhash on success. If the pool is full, evicts
    /// lowest-fee entries as long as the newcomer pays strictly more;
    /// otherwise fails with [`PoolError::PoolFull`].
    pub fn insert(&mut self, tx: Transaction) -> Result<Hash256, PoolError> {
        let (nonce, ots_index, fee, sender) = match &tx {
            Transaction::Transfer { nonce, ots_index, fee, public_key, .. } => {
                (*nonce, *ots_index, *fee, Address::from_public_key(public_key))
            }
            Transaction::Coinbase { .. } => return Err(PoolError::CoinbaseNotAllowed),
        };

        // Compute txhash and size from a single serialization.
        let encoded = bincode::encode_to_vec(&tx, bincode::config::standard())
            .map_err(|e| PoolError::Internal(e.to_string()))?;
        let txhash = Hash256(blake3::hash(&encoded).into());
        let size = encoded.len();

        if self.entries.contains_key(&txhash) {
            return Err(PoolError::AlreadyExists(txhash.to_string()));
        }
        if let Some(existing) = self.by_nonce.get(&(sender, nonce)) {
            return Err(PoolError::NonceConflict { existing: existing.to_string() });
        }
        if let Some(existing) = self.by_ots.get(&(sender, ots_index)) {
            return Err(PoolError::OtsConflict { existing: existing.to_string() });
        }

        // Evict lowest-fee entries if the pool is full.
        while (self.entries.len() >= self.max_count || self.total_bytes + size > self.max_bytes)
            && !self.entries.is_empty()
        {
            if let Some(&(lowest_fee, lowest_hash)) = self.by_fee.iter().next() {
                if lowest_fee >= fee {
                    return Err(PoolError::PoolFull);
                }
                debug!(evicted = %lowest_hash, lowest_fee, fee, "evicting lowest-fee transfer");
                self.remove_entry(lowest_hash);
            } else {
                break;
            }
        }
        if self.entries.len() >= self.max_count || self.total_bytes + size > self.max_bytes {
            return Err(PoolError::PoolFull);
        }

        self.by_nonce.insert((sender, nonce), txhash);
        self.by_ots.insert((sender, ots_index), txhash);
        self.by_fee.insert((fee, txhash));
        self.total_bytes += size;
        self.entries.insert(txhash, PoolEntry { tx, txhash, sender, fee, size });

        Ok(txhash)
    }

    /// Remove a transaction from the pool by txhash.
    pub fn remove(&mut self, txhash: &Hash256) -> Option<PoolEntry> {
        self.remove_entry(*txhash)
    }

    /// Internal: remove an entry and clean up all indexes.
    fn remove_entry(&mut self, txhash: Hash256) -> Option<PoolEntry> {
        let entry = self.entries.remove(&txhash)?;
        if let Transaction::Transfer { nonce, ots_index, .. } = &entry.tx {
            self.by_nonce.remove(&(entry.sender, *nonce));
            self.by_ots.remove(&(entry.sender, *ots_index));
        }
        self.by_fee.remove(&(entry.fee, txhash));
        self.total_bytes -= entry.size;
        Some(entry)
    }

    /// Drop every pool entry a confirmed block invalidates: the block's
    /// own transfers plus any entry claiming a (sender, nonce) or
    /// (sender, OTS index) slot the block just consumed.
    pub fn remove_confirmed(&mut self, block: &Block) {
        for tx in &block.transactions {
            let Transaction::Transfer { nonce, ots_index, .. } = tx else {
                continue;
            };
            if let Ok(txhash) = tx.txhash() {
                self.remove_entry(txhash);
            }
            let Some(sender) = tx.sender() else { continue };
            if let Some(stale) = self.by_nonce.get(&(sender, *nonce)).copied() {
                self.remove_entry(stale);
            }
            if let Some(stale) = self.by_ots.get(&(sender, *ots_index)).copied() {
                self.remove_entry(stale);
            }
        }
    }

    /// A pooled transfer competing with `tx` for the same
    /// (sender, nonce) or (sender, OTS index) slot, if any.
    ///
    /// The identical transaction is not a conflict: confirming a pooled
    /// transfer in a block is the normal path. Coinbases never conflict.
    pub fn conflicting(&self, tx: &Transaction) -> Option<Hash256> {
        let Transaction::Transfer { nonce, ots_index, .. } = tx else {
            return None;
        };
        let sender = tx.sender()?;
        let txhash = tx.txhash().ok()?;
        for claimed in [
            self.by_nonce.get(&(sender, *nonce)),
            self.by_ots.get(&(sender, *ots_index)),
        ] {
            if let Some(&other) = claimed {
                if other != txhash {
                    return Some(other);
                }
            }
        }
        None
    }

    /// Check if a transaction with the given txhash is in the pool.
    pub fn contains(&self, txhash: &Hash256) -> bool {
        self.entries.contains_key(txhash)
    }

    /// Get a pool entry by txhash.
    pub fn get(&self, txhash: &Hash256) -> Option<&PoolEntry> {
        self.entries.get(txhash)
    }

    /// Pool transfers in descending fee order, for block assembly.
    pub fn by_fee_descending(&self) -> Vec<&PoolEntry> {
        self.by_fee
            .iter()
            .rev()
            .filter_map(|(_, txhash)| self.entries.get(txhash))
            .collect()
    }

    /// Number of transfers in the pool.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total serialized bytes held.
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }
}

impl Default for TxPool {
    fn default() -> Self {
        Self::with_defaults()
    }
}
