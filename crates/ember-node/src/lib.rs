//! # ember-node — Persistent node storage.
//!
//! Provides [`storage::RocksStore`], the RocksDB-backed implementation
//! of the chain store. An `ember_chain::ChainManager<RocksStore>` is a
//! durable node core: every ingestion attempt commits as one atomic
//! write batch, so a crash between blocks never leaves partial state.

pub mod storage;

pub use storage::RocksStore;
