//! Core protocol definitions for the Ember chain.
//!
//! Contains the account-model transaction and block types, consensus
//! parameters, difficulty retargeting, proof-of-work verification,
//! block/transaction validation, the genesis definition, the pending
//! transaction pool, the storage contract with an in-memory
//! implementation, and the ledger snapshot abstraction.

pub mod constants;
pub mod difficulty;
pub mod error;
pub mod genesis;
pub mod merkle;
pub mod metadata;
pub mod pow;
pub mod reward;
pub mod state;
pub mod store;
pub mod txpool;
pub mod types;
pub mod validation;

pub use error::{BlockError, ChainError, EmberError, PoolError, TransactionError};
pub use metadata::BlockMetadata;
pub use state::Snapshot;
pub use store::{BatchOp, BlockStore, MemoryStore, StoreBatch};
pub use types::{AccountState, Address, Block, BlockHeader, Hash256, Transaction};
