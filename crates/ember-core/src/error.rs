//! Error types for the Ember protocol.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("zero amount")] ZeroAmount,
    #[error("value overflow")] ValueOverflow,
    #[error("oversized: {size} > {max}")] OversizedTransaction { size: usize, max: usize },
    #[error("serialization: {0}")] Serialization(String),
    #[error("invalid public key length: {len}")] InvalidPublicKey { len: usize },
    #[error("invalid signature length: {len}")] InvalidSignature { len: usize },
    #[error("OTS index out of range: {index} >= {max}")] OtsIndexOutOfRange { index: u16, max: u16 },
    #[error("invalid nonce: expected {expected}, got {got}")] InvalidNonce { expected: u64, got: u64 },
    #[error("OTS index already used: {index}")] OtsReused { index: u16 },
    #[error("insufficient funds: have {have}, need {need}")] InsufficientFunds { have: u64, need: u64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockError {
    #[error("no transactions")] NoTransactions,
    #[error("first transaction is not coinbase")] FirstTxNotCoinbase,
    #[error("multiple coinbase transactions")] MultipleCoinbase,
    #[error("coinbase height mismatch: got {got}, expected {expected}")] CoinbaseHeightMismatch { got: u64, expected: u64 },
    #[error("invalid reward: got {got}, expected {expected}")] InvalidReward { got: u64, expected: u64 },
    #[error("invalid PoW")] InvalidPoW,
    #[error("invalid block number: got {got}, expected {expected}")] InvalidBlockNumber { got: u64, expected: u64 },
    #[error("invalid prev headerhash")] InvalidPrevHeaderhash,
    #[error("timestamp not after parent")] TimestampNotAfterParent,
    #[error("timestamp too far in the future: {0}s ahead")] TimestampTooFar(u64),
    #[error("invalid merkle root")] InvalidMerkleRoot,
    #[error("duplicate txhash: {0}")] DuplicateTxHash(String),
    #[error("oversized: {size} > {max}")] OversizedBlock { size: usize, max: usize },
    #[error("tx error in {index}: {source}")] TransactionError { index: usize, source: TransactionError },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("transaction already in pool: {0}")] AlreadyExists(String),
    #[error("coinbase not accepted by the pool")] CoinbaseNotAllowed,
    #[error("conflicts with pool tx {existing} on (sender, nonce)")] NonceConflict { existing: String },
    #[error("conflicts with pool tx {existing} on (sender, OTS index)")] OtsConflict { existing: String },
    #[error("pool full")] PoolFull,
    #[error("internal: {0}")] Internal(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("storage: {0}")] Storage(String),
    #[error("block not found: {0}")] MissingBlock(String),
    #[error("metadata not found: {0}")] MissingMetadata(String),
    #[error("inconsistent store: {0}")] Inconsistent(String),
}

#[derive(Error, Debug)]
pub enum EmberError {
    #[error(transparent)] Transaction(#[from] TransactionError),
    #[error(transparent)] Block(#[from] BlockError),
    #[error(transparent)] Pool(#[from] PoolError),
    #[error(transparent)] Chain(#[from] ChainError),
}
