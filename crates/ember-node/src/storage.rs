//! RocksDB-backed chain storage.
//!
//! Implements [`BlockStore`] using RocksDB column families for blocks,
//! block metadata, the height index, per-block account records, and the
//! confirmed-transaction index. Every [`StoreBatch`] commits as one
//! atomic [`WriteBatch`] for crash safety.

use std::collections::BTreeMap;
use std::path::Path;

use rocksdb::{ColumnFamilyDescriptor, DB, Options, WriteBatch};

use ember_core::error::ChainError;
use ember_core::metadata::BlockMetadata;
use ember_core::store::{BatchOp, BlockStore, StoreBatch};
use ember_core::types::{AccountState, Address, Block, Hash256};

// --- Column family names ---

const CF_BLOCKS: &str = "blocks";
const CF_METADATA: &str = "metadata";
const CF_HEIGHT_INDEX: &str = "height_index";
const CF_ACCOUNTS: &str = "accounts";
const CF_TX_INDEX: &str = "tx_index";
const CF_META: &str = "meta";

/// All column family names.
const ALL_CFS: &[&str] = &[
    CF_BLOCKS,
    CF_METADATA,
    CF_HEIGHT_INDEX,
    CF_ACCOUNTS,
    CF_TX_INDEX,
    CF_META,
];

// --- Meta keys ---

const META_CHAIN_HEIGHT: &[u8] = b"chain_height";

fn storage_err(e: impl std::fmt::Display) -> ChainError {
    ChainError::Storage(e.to_string())
}

/// RocksDB-backed chain storage.
///
/// Stores blocks, metadata, the height index, account records, and the
/// transaction index in separate column families. All mutations are
/// atomic via [`WriteBatch`].
pub struct RocksStore {
    db: DB,
}

impl RocksStore {
    /// Open or create a RocksDB database at the given path.
    ///
    /// Creates all column families if they don't exist. The database
    /// starts empty; the chain manager bootstraps genesis on first use.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ChainError> {
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = ALL_CFS
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect();

        let db = DB::open_cf_descriptors(&db_opts, path.as_ref(), cf_descriptors)
            .map_err(storage_err)?;

        Ok(Self { db })
    }

    /// Flush all in-memory buffers to disk.
    pub fn flush(&self) -> Result<(), ChainError> {
        self.db.flush().map_err(storage_err)
    }

    /// Trigger manual compaction across all column families.
    ///
    /// Merges SSTables and reclaims space from pruned orphan subtrees
    /// and reorganized branches. Call during low-activity periods.
    pub fn compact(&self) -> Result<(), ChainError> {
        for cf_name in ALL_CFS {
            let cf = self.cf_handle(cf_name)?;
            self.db.compact_range_cf(&cf, None::<&[u8]>, None::<&[u8]>);
        }
        tracing::info!("compacted {} column families", ALL_CFS.len());
        Ok(())
    }

    // --- Internal helpers ---

    /// Get a column family handle.
    fn cf_handle(&self, name: &str) -> Result<&rocksdb::ColumnFamily, ChainError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| ChainError::Storage(format!("missing column family: {name}")))
    }

    /// Encode a height as big-endian bytes for ordered iteration.
    fn height_key(block_number: u64) -> [u8; 8] {
        block_number.to_be_bytes()
    }

    fn encode<T: bincode::Encode>(value: &T) -> Result<Vec<u8>, ChainError> {
        bincode::encode_to_vec(value, bincode::config::standard()).map_err(storage_err)
    }

    fn decode<T: bincode::Decode<()>>(bytes: &[u8]) -> Result<T, ChainError> {
        let (value, _) =
            bincode::decode_from_slice(bytes, bincode::config::standard()).map_err(storage_err)?;
        Ok(value)
    }

    /// Read and decode a value from a column family.
    fn get_decoded<T: bincode::Decode<()>>(
        &self,
        cf_name: &str,
        key: &[u8],
    ) -> Result<Option<T>, ChainError> {
        let cf = self.cf_handle(cf_name)?;
        match self.db.get_cf(&cf, key).map_err(storage_err)? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }
}

impl BlockStore for RocksStore {
    fn get_block(&self, headerhash: &Hash256) -> Result<Option<Block>, ChainError> {
        self.get_decoded(CF_BLOCKS, headerhash.as_bytes())
    }

    fn get_metadata(&self, headerhash: &Hash256) -> Result<Option<BlockMetadata>, ChainError> {
        self.get_decoded(CF_METADATA, headerhash.as_bytes())
    }

    fn get_block_hash_by_number(&self, block_number: u64) -> Result<Option<Hash256>, ChainError> {
        let cf = self.cf_handle(CF_HEIGHT_INDEX)?;
        match self
            .db
            .get_cf(&cf, Self::height_key(block_number))
            .map_err(storage_err)?
        {
            Some(bytes) if bytes.len() == 32 => {
                let mut hash = [0u8; 32];
                hash.copy_from_slice(&bytes);
                Ok(Some(Hash256(hash)))
            }
            Some(_) => Err(ChainError::Storage("invalid height index value".into())),
            None => Ok(None),
        }
    }

    fn chain_height(&self) -> Result<Option<u64>, ChainError> {
        let cf = self.cf_handle(CF_META)?;
        match self
            .db
            .get_cf(&cf, META_CHAIN_HEIGHT)
            .map_err(storage_err)?
        {
            Some(bytes) if bytes.len() == 8 => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&bytes);
                Ok(Some(u64::from_le_bytes(raw)))
            }
            Some(_) => Err(ChainError::Storage("invalid chain height value".into())),
            None => Ok(None),
        }
    }

    fn get_accounts(
        &self,
        headerhash: &Hash256,
    ) -> Result<Option<BTreeMap<Address, AccountState>>, ChainError> {
        self.get_decoded(CF_ACCOUNTS, headerhash.as_bytes())
    }

    fn get_transaction_block(&self, txhash: &Hash256) -> Result<Option<Hash256>, ChainError> {
        let cf = self.cf_handle(CF_TX_INDEX)?;
        match self.db.get_cf(&cf, txhash.as_bytes()).map_err(storage_err)? {
            Some(bytes) if bytes.len() == 32 => {
                let mut hash = [0u8; 32];
                hash.copy_from_slice(&bytes);
                Ok(Some(Hash256(hash)))
            }
            Some(_) => Err(ChainError::Storage("invalid tx index value".into())),
            None => Ok(None),
        }
    }

    fn commit(&mut self, batch: StoreBatch) -> Result<(), ChainError> {
        let cf_blocks = self.cf_handle(CF_BLOCKS)?;
        let cf_metadata = self.cf_handle(CF_METADATA)?;
        let cf_height = self.cf_handle(CF_HEIGHT_INDEX)?;
        let cf_accounts = self.cf_handle(CF_ACCOUNTS)?;
        let cf_tx_index = self.cf_handle(CF_TX_INDEX)?;
        let cf_meta = self.cf_handle(CF_META)?;

        let mut wb = WriteBatch::default();
        for op in batch.into_ops() {
            match op {
                BatchOp::PutBlock(block) => {
                    let key = block.headerhash();
                    wb.put_cf(cf_blocks, key.as_bytes(), Self::encode(&block)?);
                }
                BatchOp::PutMetadata(headerhash, metadata) => {
                    wb.put_cf(cf_metadata, headerhash.as_bytes(), Self::encode(&metadata)?);
                }
                BatchOp::PutHeightIndex(block_number, headerhash) => {
                    wb.put_cf(cf_height, Self::height_key(block_number), headerhash.as_bytes());
                }
                BatchOp::PutChainHeight(block_number) => {
                    wb.put_cf(cf_meta, META_CHAIN_HEIGHT, block_number.to_le_bytes());
                }
                BatchOp::PutAccounts(headerhash, accounts) => {
                    wb.put_cf(cf_accounts, headerhash.as_bytes(), Self::encode(&accounts)?);
                }
                BatchOp::PutTxIndex(txhash, headerhash) => {
                    wb.put_cf(cf_tx_index, txhash.as_bytes(), headerhash.as_bytes());
                }
                BatchOp::DeleteHeightIndex(block_number) => {
                    wb.delete_cf(cf_height, Self::height_key(block_number));
                }
                BatchOp::DeleteBlock(headerhash) => {
                    wb.delete_cf(cf_blocks, headerhash.as_bytes());
                }
                BatchOp::DeleteMetadata(headerhash) => {
                    wb.delete_cf(cf_metadata, headerhash.as_bytes());
                }
                BatchOp::DeleteAccounts(headerhash) => {
                    wb.delete_cf(cf_accounts, headerhash.as_bytes());
                }
                BatchOp::DeleteTxIndex(txhash) => {
                    wb.delete_cf(cf_tx_index, txhash.as_bytes());
                }
            }
        }

        self.db.write(wb).map_err(storage_err)
    }
}
