//! Transaction and block validation.
//!
//! Validation is split in two stages, mirroring the ingestion pipeline:
//!
//! - **Structural** checks need nothing but the object itself: field
//!   bounds, encoding size, coinbase placement, merkle commitment.
//! - **Contextual** checks need the parent's ledger view and header:
//!   linkage, timestamps, nonce sequencing, one-time-signature replay,
//!   balances, and the coinbase reward. These run by applying the
//!   transaction list in order to a [`Snapshot`] of the parent.
//!
//! Signature-scheme verification is external to this crate; transfers
//! carry the signature as opaque bytes and only its length is checked
//! here.

use crate::constants::{
    MAX_FUTURE_BLOCK_TIME, MAX_OTS_INDEX, MAX_SIGNATURE_SIZE, MAX_TX_SIZE, PUBLIC_KEY_SIZE,
};
use crate::error::{BlockError, TransactionError};
use crate::merkle;
use crate::reward::RewardPolicy;
use crate::state::Snapshot;
use crate::types::{Block, BlockHeader, Transaction};

/// Structural checks on a single transaction.
pub fn validate_transaction(tx: &Transaction) -> Result<(), TransactionError> {
    match tx {
        Transaction::Coinbase { .. } => {
            // Amount is checked against the reward policy contextually;
            // zero is legal once the schedule runs out.
            Ok(())
        }
        Transaction::Transfer {
            amount,
            fee,
            ots_index,
            public_key,
            signature,
            ..
        } => {
            if *amount == 0 {
                return Err(TransactionError::ZeroAmount);
            }
            amount
                .checked_add(*fee)
                .ok_or(TransactionError::ValueOverflow)?;
            if public_key.len() != PUBLIC_KEY_SIZE {
                return Err(TransactionError::InvalidPublicKey { len: public_key.len() });
            }
            if signature.is_empty() || signature.len() > MAX_SIGNATURE_SIZE {
                return Err(TransactionError::InvalidSignature { len: signature.len() });
            }
            if *ots_index >= MAX_OTS_INDEX {
                return Err(TransactionError::OtsIndexOutOfRange {
                    index: *ots_index,
                    max: MAX_OTS_INDEX,
                });
            }
            let size = tx.encoded_size()?;
            if size > MAX_TX_SIZE {
                return Err(TransactionError::OversizedTransaction { size, max: MAX_TX_SIZE });
            }
            Ok(())
        }
    }
}

/// Structural checks on a block: transaction placement, uniqueness,
/// the merkle commitment, and per-transaction structure.
///
/// Does not touch storage or the ledger.
pub fn validate_block_structure(block: &Block) -> Result<(), BlockError> {
    if block.transactions.is_empty() {
        return Err(BlockError::NoTransactions);
    }
    if !block.transactions[0].is_coinbase() {
        return Err(BlockError::FirstTxNotCoinbase);
    }
    if block.transactions[1..].iter().any(Transaction::is_coinbase) {
        return Err(BlockError::MultipleCoinbase);
    }

    let tx_hashes = block
        .tx_hashes()
        .map_err(|source| BlockError::TransactionError { index: 0, source })?;
    for (i, hash) in tx_hashes.iter().enumerate() {
        if tx_hashes[..i].contains(hash) {
            return Err(BlockError::DuplicateTxHash(hash.to_string()));
        }
    }
    if merkle::merkle_root(&tx_hashes) != block.header.tx_merkle_root {
        return Err(BlockError::InvalidMerkleRoot);
    }

    for (index, tx) in block.transactions.iter().enumerate() {
        validate_transaction(tx)
            .map_err(|source| BlockError::TransactionError { index, source })?;
    }
    Ok(())
}

/// Contextual header checks against the parent header and local time.
pub fn validate_linkage(
    block: &Block,
    parent: &BlockHeader,
    current_time: u64,
) -> Result<(), BlockError> {
    if block.header.prev_headerhash != parent.headerhash() {
        return Err(BlockError::InvalidPrevHeaderhash);
    }
    let expected = parent.block_number + 1;
    if block.header.block_number != expected {
        return Err(BlockError::InvalidBlockNumber {
            got: block.header.block_number,
            expected,
        });
    }
    if block.header.timestamp <= parent.timestamp {
        return Err(BlockError::TimestampNotAfterParent);
    }
    let horizon = current_time.saturating_add(MAX_FUTURE_BLOCK_TIME);
    if block.header.timestamp > horizon {
        return Err(BlockError::TimestampTooFar(block.header.timestamp - current_time));
    }
    Ok(())
}

/// Apply a block's transaction list to a snapshot of its parent,
/// enforcing the contextual rules in block order.
///
/// The coinbase must name the block's own height and satisfy the reward
/// policy; every transfer must clear nonce sequencing, OTS replay, and
/// balance checks. On success the snapshot holds the block's post-state.
/// Assumes [`validate_block_structure`] already passed.
pub fn apply_block_transactions(
    block: &Block,
    snapshot: &mut Snapshot,
    reward_policy: &dyn RewardPolicy,
) -> Result<(), BlockError> {
    if let Some(Transaction::Coinbase { amount, block_number, .. }) = block.coinbase() {
        if *block_number != block.header.block_number {
            return Err(BlockError::CoinbaseHeightMismatch {
                got: *block_number,
                expected: block.header.block_number,
            });
        }
        reward_policy.validate_coinbase(*amount, block.header.block_number)?;
    } else {
        return Err(BlockError::FirstTxNotCoinbase);
    }

    for (index, tx) in block.transactions.iter().enumerate() {
        snapshot
            .apply(tx)
            .map_err(|source| BlockError::TransactionError { index, source })?;
    }
    Ok(())
}
