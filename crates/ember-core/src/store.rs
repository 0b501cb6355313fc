//! Block storage interface and in-memory implementation.
//!
//! Provides the [`BlockStore`] trait for block, metadata, height-index,
//! account-record, and transaction-index persistence. The
//! [`MemoryStore`] is suitable for testing; the production node uses
//! RocksDB (ember-node).
//!
//! Every mutation goes through a [`StoreBatch`]: the chain manager
//! assembles exactly one batch per ingestion attempt and commits it
//! atomically, so a crash can never leave a block half-persisted.

use std::collections::{BTreeMap, HashMap};

use crate::error::ChainError;
use crate::metadata::BlockMetadata;
use crate::types::{AccountState, Address, Block, Hash256};

/// One mutation inside a [`StoreBatch`].
#[derive(Clone, Debug)]
pub enum BatchOp {
    /// Store a block under its headerhash.
    PutBlock(Block),
    /// Store metadata under a headerhash.
    PutMetadata(Hash256, BlockMetadata),
    /// Point a height at a mainchain headerhash.
    PutHeightIndex(u64, Hash256),
    /// Record the mainchain tip height.
    PutChainHeight(u64),
    /// Store the post-state of the accounts a block touched.
    PutAccounts(Hash256, BTreeMap<Address, AccountState>),
    /// Point a confirmed txhash at its mainchain block.
    PutTxIndex(Hash256, Hash256),
    /// Remove a height-index entry (reorg onto a shorter, heavier chain).
    DeleteHeightIndex(u64),
    /// Remove a block.
    DeleteBlock(Hash256),
    /// Remove a metadata record.
    DeleteMetadata(Hash256),
    /// Remove a block's account records.
    DeleteAccounts(Hash256),
    /// Remove a confirmed-tx index entry.
    DeleteTxIndex(Hash256),
}

/// An ordered list of mutations applied atomically by
/// [`BlockStore::commit`].
#[derive(Default)]
pub struct StoreBatch {
    ops: Vec<BatchOp>,
}

impl StoreBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_block(&mut self, block: Block) {
        self.ops.push(BatchOp::PutBlock(block));
    }

    pub fn put_metadata(&mut self, headerhash: Hash256, metadata: BlockMetadata) {
        self.ops.push(BatchOp::PutMetadata(headerhash, metadata));
    }

    pub fn put_height_index(&mut self, block_number: u64, headerhash: Hash256) {
        self.ops.push(BatchOp::PutHeightIndex(block_number, headerhash));
    }

    pub fn put_chain_height(&mut self, block_number: u64) {
        self.ops.push(BatchOp::PutChainHeight(block_number));
    }

    pub fn put_accounts(&mut self, headerhash: Hash256, accounts: BTreeMap<Address, AccountState>) {
        self.ops.push(BatchOp::PutAccounts(headerhash, accounts));
    }

    pub fn put_tx_index(&mut self, txhash: Hash256, headerhash: Hash256) {
        self.ops.push(BatchOp::PutTxIndex(txhash, headerhash));
    }

    pub fn delete_height_index(&mut self, block_number: u64) {
        self.ops.push(BatchOp::DeleteHeightIndex(block_number));
    }

    pub fn delete_block(&mut self, headerhash: Hash256) {
        self.ops.push(BatchOp::DeleteBlock(headerhash));
    }

    pub fn delete_metadata(&mut self, headerhash: Hash256) {
        self.ops.push(BatchOp::DeleteMetadata(headerhash));
    }

    pub fn delete_accounts(&mut self, headerhash: Hash256) {
        self.ops.push(BatchOp::DeleteAccounts(headerhash));
    }

    pub fn delete_tx_index(&mut self, txhash: Hash256) {
        self.ops.push(BatchOp::DeleteTxIndex(txhash));
    }

    /// Number of mutations queued.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether no mutations are queued.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Consume the batch, yielding its mutations in order.
    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}

/// Block storage interface.
///
/// Reads are individually consistent; writes happen only through
/// [`commit`](BlockStore::commit). Not thread-safe by itself; callers
/// wrap the store in a lock if concurrent access is needed.
pub trait BlockStore: Send + Sync {
    /// Get a block by headerhash. Returns `None` if not stored.
    fn get_block(&self, headerhash: &Hash256) -> Result<Option<Block>, ChainError>;

    /// Get block metadata by headerhash. Returns `None` if not stored.
    ///
    /// A metadata record may exist for a headerhash whose block has not
    /// arrived yet (orphan linkage placeholder).
    fn get_metadata(&self, headerhash: &Hash256) -> Result<Option<BlockMetadata>, ChainError>;

    /// Get the mainchain headerhash at a height. Returns `None` beyond
    /// the tip or for never-indexed heights.
    fn get_block_hash_by_number(&self, block_number: u64) -> Result<Option<Hash256>, ChainError>;

    /// Mainchain tip height. Returns `None` on a fresh store.
    fn chain_height(&self) -> Result<Option<u64>, ChainError>;

    /// Post-state of the accounts touched by the block at `headerhash`.
    fn get_accounts(
        &self,
        headerhash: &Hash256,
    ) -> Result<Option<BTreeMap<Address, AccountState>>, ChainError>;

    /// The mainchain block containing a confirmed transaction.
    fn get_transaction_block(&self, txhash: &Hash256) -> Result<Option<Hash256>, ChainError>;

    /// Apply all mutations in the batch atomically.
    fn commit(&mut self, batch: StoreBatch) -> Result<(), ChainError>;

    /// Check whether a block (not just a metadata placeholder) is stored.
    fn contains_block(&self, headerhash: &Hash256) -> Result<bool, ChainError> {
        Ok(self.get_block(headerhash)?.is_some())
    }

    /// Get the mainchain block at a height.
    fn get_block_by_number(&self, block_number: u64) -> Result<Option<Block>, ChainError> {
        match self.get_block_hash_by_number(block_number)? {
            Some(hash) => self.get_block(&hash),
            None => Ok(None),
        }
    }
}

/// In-memory block storage for testing.
///
/// Stores everything in `HashMap`s with no persistence. Batches are
/// applied op by op; in-memory application cannot fail partway, so the
/// atomicity contract holds trivially.
#[derive(Default)]
pub struct MemoryStore {
    blocks: HashMap<Hash256, Block>,
    metadata: HashMap<Hash256, BlockMetadata>,
    height_index: HashMap<u64, Hash256>,
    accounts: HashMap<Hash256, BTreeMap<Address, AccountState>>,
    tx_index: HashMap<Hash256, Hash256>,
    chain_height: Option<u64>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlockStore for MemoryStore {
    fn get_block(&self, headerhash: &Hash256) -> Result<Option<Block>, ChainError> {
        Ok(self.blocks.get(headerhash).cloned())
    }

    fn get_metadata(&self, headerhash: &Hash256) -> Result<Option<BlockMetadata>, ChainError> {
        Ok(self.metadata.get(headerhash).cloned())
    }

    fn get_block_hash_by_number(&self, block_number: u64) -> Result<Option<Hash256>, ChainError> {
        Ok(self.height_index.get(&block_number).copied())
    }

    fn chain_height(&self) -> Result<Option<u64>, ChainError> {
        Ok(self.chain_height)
    }

    fn get_accounts(
        &self,
        headerhash: &Hash256,
    ) -> Result<Option<BTreeMap<Address, AccountState>>, ChainError> {
        Ok(self.accounts.get(headerhash).cloned())
    }

    fn get_transaction_block(&self, txhash: &Hash256) -> Result<Option<Hash256>, ChainError> {
        Ok(self.tx_index.get(txhash).copied())
    }

    fn commit(&mut self, batch: StoreBatch) -> Result<(), ChainError> {
        for op in batch.into_ops() {
            match op {
                BatchOp::PutBlock(block) => {
                    self.blocks.insert(block.headerhash(), block);
                }
                BatchOp::PutMetadata(hash, metadata) => {
                    self.metadata.insert(hash, metadata);
                }
                BatchOp::PutHeightIndex(number, hash) => {
                    self.height_index.insert(number, hash);
                }
                BatchOp::PutChainHeight(number) => {
                    self.chain_height = Some(number);
                }
                BatchOp::PutAccounts(hash, accounts) => {
                    self.accounts.insert(hash, accounts);
                }
                BatchOp::PutTxIndex(txhash, headerhash) => {
                    self.tx_index.insert(txhash, headerhash);
                }
                BatchOp::DeleteHeightIndex(number) => {
                    self.height_index.remove(&number);
                }
                BatchOp::DeleteBlock(hash) => {
                    self.blocks.remove(&hash);
                }
                BatchOp::DeleteMetadata(hash) => {
                    self.metadata.remove(&hash);
                }
                BatchOp::DeleteAccounts(hash) => {
                    self.accounts.remove(&hash);
                }
                BatchOp::DeleteTxIndex(txhash) => {
                    self.tx_index.remove(&txhash);
                }
            }
        }
        Ok(())
    }
}
