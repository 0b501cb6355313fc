//! Core protocol types: transactions, blocks, accounts.
//!
//! All monetary values are in embers (1 EMBER = 10^9 embers).
//! All numeric fields use u64 per protocol convention.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::TransactionError;

/// A 32-byte hash value.
///
/// Used for transaction hashes (BLAKE3), block header hashes
/// (double SHA-256), merkle roots (BLAKE3), and PoW digests.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// The zero hash (32 zero bytes). Used as the genesis parent pointer.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create a Hash256 from a byte array.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if this is the zero hash.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A 20-byte account address: the truncated BLAKE3 hash of a public key.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address. Only appears in test fixtures.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Derive the address for a public key: the first 20 bytes of
    /// `BLAKE3(public_key)`.
    pub fn from_public_key(public_key: &[u8]) -> Self {
        let digest = blake3::hash(public_key);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest.as_bytes()[..20]);
        Self(bytes)
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

/// A transaction in the account model.
///
/// Matched exhaustively everywhere; adding a variant is a consensus
/// change.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub enum Transaction {
    /// Block reward credited to the miner. The `block_number` field makes
    /// every coinbase hash unique per height.
    Coinbase {
        to: Address,
        amount: u64,
        block_number: u64,
    },
    /// Account-to-account payment. `nonce` is the sender's sequence
    /// counter; `ots_index` names the one-time-signature slot spent by
    /// this transfer.
    Transfer {
        to: Address,
        amount: u64,
        fee: u64,
        nonce: u64,
        ots_index: u16,
        public_key: Vec<u8>,
        signature: Vec<u8>,
    },
}

impl Transaction {
    /// Compute the transaction hash (BLAKE3 of the canonical encoding).
    ///
    /// Uses bincode with standard config for deterministic serialization.
    /// Returns an error if serialization fails.
    pub fn txhash(&self) -> Result<Hash256, TransactionError> {
        let encoded = bincode::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| TransactionError::Serialization(e.to_string()))?;
        Ok(Hash256(blake3::hash(&encoded).into()))
    }

    /// Serialized length in bytes of the canonical encoding.
    pub fn encoded_size(&self) -> Result<usize, TransactionError> {
        let encoded = bincode::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| TransactionError::Serialization(e.to_string()))?;
        Ok(encoded.len())
    }

    /// Check if this is a coinbase transaction.
    pub fn is_coinbase(&self) -> bool {
        matches!(self, Transaction::Coinbase { .. })
    }

    /// The sending address, derived from the public key. `None` for
    /// coinbase transactions, which have no sender.
    pub fn sender(&self) -> Option<Address> {
        match self {
            Transaction::Coinbase { .. } => None,
            Transaction::Transfer { public_key, .. } => {
                Some(Address::from_public_key(public_key))
            }
        }
    }

    /// The receiving address.
    pub fn recipient(&self) -> Address {
        match self {
            Transaction::Coinbase { to, .. } => *to,
            Transaction::Transfer { to, .. } => *to,
        }
    }

    /// The transferred amount in embers.
    pub fn amount(&self) -> u64 {
        match self {
            Transaction::Coinbase { amount, .. } => *amount,
            Transaction::Transfer { amount, .. } => *amount,
        }
    }

    /// The fee paid to the miner. Zero for coinbase transactions.
    pub fn fee(&self) -> u64 {
        match self {
            Transaction::Coinbase { .. } => 0,
            Transaction::Transfer { fee, .. } => *fee,
        }
    }
}

/// Block header containing the proof-of-work puzzle.
///
/// The header hash is double SHA-256 over a fixed byte layout; the
/// mining hash (PoW input) is BLAKE3 over the same layout without the
/// nonce, so the nonce can be varied without re-serializing the header.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct BlockHeader {
    /// Height of this block; genesis is 0.
    pub block_number: u64,
    /// Headerhash of the parent block. Zero for genesis.
    pub prev_headerhash: Hash256,
    /// BLAKE3 merkle root of the block's transaction hashes.
    pub tx_merkle_root: Hash256,
    /// Unix timestamp in seconds.
    pub timestamp: u64,
    /// Proof-of-work nonce.
    pub mining_nonce: u64,
}

impl BlockHeader {
    /// Header size in bytes when serialized for hashing (3 u64 fields + 2 * 32-byte hashes).
    const HASH_SIZE: usize = 3 * 8 + 2 * 32;

    /// Compute the block header hash (double SHA-256).
    ///
    /// Uses an explicit fixed byte layout: block_number || prev_headerhash ||
    /// tx_merkle_root || timestamp || mining_nonce, all integers little-endian.
    pub fn headerhash(&self) -> Hash256 {
        let mut data = Vec::with_capacity(Self::HASH_SIZE);
        data.extend_from_slice(&self.block_number.to_le_bytes());
        data.extend_from_slice(self.prev_headerhash.as_bytes());
        data.extend_from_slice(self.tx_merkle_root.as_bytes());
        data.extend_from_slice(&self.timestamp.to_le_bytes());
        data.extend_from_slice(&self.mining_nonce.to_le_bytes());
        let first = Sha256::digest(&data);
        Hash256(Sha256::digest(first).into())
    }

    /// Compute the PoW input digest (BLAKE3 of the header without the nonce).
    pub fn mining_hash(&self) -> Hash256 {
        let mut data = Vec::with_capacity(Self::HASH_SIZE - 8);
        data.extend_from_slice(&self.block_number.to_le_bytes());
        data.extend_from_slice(self.prev_headerhash.as_bytes());
        data.extend_from_slice(self.tx_merkle_root.as_bytes());
        data.extend_from_slice(&self.timestamp.to_le_bytes());
        Hash256(blake3::hash(&data).into())
    }
}

/// A complete block: header plus transactions.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct Block {
    /// Block header with proof-of-work.
    pub header: BlockHeader,
    /// Ordered list of transactions. First transaction must be coinbase.
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// The block header hash.
    pub fn headerhash(&self) -> Hash256 {
        self.header.headerhash()
    }

    /// The block height.
    pub fn block_number(&self) -> u64 {
        self.header.block_number
    }

    /// Get the coinbase transaction, if the block is non-empty.
    pub fn coinbase(&self) -> Option<&Transaction> {
        self.transactions.first()
    }

    /// Serialized length in bytes of the canonical encoding.
    pub fn size(&self) -> Result<usize, TransactionError> {
        let encoded = bincode::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| TransactionError::Serialization(e.to_string()))?;
        Ok(encoded.len())
    }

    /// Every address whose account state this block can change:
    /// coinbase recipients, transfer senders, and transfer recipients.
    pub fn touched_addresses(&self) -> BTreeSet<Address> {
        let mut addresses = BTreeSet::new();
        for tx in &self.transactions {
            if let Some(sender) = tx.sender() {
                addresses.insert(sender);
            }
            addresses.insert(tx.recipient());
        }
        addresses
    }

    /// Hashes of all transactions, in block order.
    pub fn tx_hashes(&self) -> Result<Vec<Hash256>, TransactionError> {
        self.transactions.iter().map(|tx| tx.txhash()).collect()
    }
}

/// Per-account ledger state.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct AccountState {
    /// Balance in embers.
    pub balance: u64,
    /// Number of confirmed transfers sent from this account. The next
    /// valid transfer carries `nonce + 1`.
    pub nonce: u64,
    /// One-time-signature slots already spent by confirmed transfers.
    pub used_ots_indexes: BTreeSet<u16>,
}

impl AccountState {
    /// Check whether a one-time-signature slot was already spent.
    pub fn is_ots_used(&self, index: u16) -> bool {
        self.used_ots_indexes.contains(&index)
    }

    /// Mark a one-time-signature slot as spent.
    pub fn mark_ots_used(&mut self, index: u16) {
        self.used_ots_indexes.insert(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{COIN, PUBLIC_KEY_SIZE};

    fn sample_pubkey(seed: u8) -> Vec<u8> {
        vec![seed; PUBLIC_KEY_SIZE]
    }

    fn sample_transfer() -> Transaction {
        Transaction::Transfer {
            to: Address([0xBB; 20]),
            amount: 5 * COIN,
            fee: 1_000,
            nonce: 1,
            ots_index: 0,
            public_key: sample_pubkey(0xAA),
            signature: vec![0u8; 64],
        }
    }

    fn sample_coinbase() -> Transaction {
        Transaction::Coinbase {
            to: Address([0xCC; 20]),
            amount: 50 * COIN,
            block_number: 7,
        }
    }

    fn sample_header() -> BlockHeader {
        BlockHeader {
            block_number: 7,
            prev_headerhash: Hash256([0x11; 32]),
            tx_merkle_root: Hash256([0x22; 32]),
            timestamp: 1_700_000_000,
            mining_nonce: 0,
        }
    }

    // --- Hash256 / Address ---

    #[test]
    fn hash256_zero_is_zero() {
        assert!(Hash256::ZERO.is_zero());
        assert_eq!(Hash256::ZERO, Hash256::default());
    }

    #[test]
    fn hash256_display_hex() {
        let s = format!("{}", Hash256([0xAB; 32]));
        assert_eq!(s.len(), 64);
        assert_eq!(&s[0..2], "ab");
    }

    #[test]
    fn address_from_public_key_deterministic() {
        let pk = sample_pubkey(1);
        assert_eq!(Address::from_public_key(&pk), Address::from_public_key(&pk));
    }

    #[test]
    fn address_differs_per_public_key() {
        assert_ne!(
            Address::from_public_key(&sample_pubkey(1)),
            Address::from_public_key(&sample_pubkey(2)),
        );
    }

    #[test]
    fn address_display_hex() {
        let s = format!("{}", Address([0xCD; 20]));
        assert_eq!(s.len(), 40);
        assert_eq!(&s[0..2], "cd");
    }

    // --- Transaction ---

    #[test]
    fn coinbase_detection() {
        assert!(sample_coinbase().is_coinbase());
        assert!(!sample_transfer().is_coinbase());
    }

    #[test]
    fn coinbase_has_no_sender() {
        assert_eq!(sample_coinbase().sender(), None);
    }

    #[test]
    fn transfer_sender_matches_public_key() {
        let tx = sample_transfer();
        assert_eq!(tx.sender(), Some(Address::from_public_key(&sample_pubkey(0xAA))));
    }

    #[test]
    fn coinbase_fee_is_zero() {
        assert_eq!(sample_coinbase().fee(), 0);
        assert_eq!(sample_transfer().fee(), 1_000);
    }

    #[test]
    fn txhash_deterministic() {
        let tx = sample_transfer();
        assert_eq!(tx.txhash().unwrap(), tx.txhash().unwrap());
    }

    #[test]
    fn txhash_changes_with_data() {
        let tx1 = sample_coinbase();
        let tx2 = Transaction::Coinbase {
            to: Address([0xCC; 20]),
            amount: 50 * COIN,
            block_number: 8,
        };
        assert_ne!(tx1.txhash().unwrap(), tx2.txhash().unwrap());
    }

    #[test]
    fn coinbase_hash_unique_per_height() {
        // Identical payouts at different heights must not collide.
        let a = Transaction::Coinbase { to: Address::ZERO, amount: COIN, block_number: 1 };
        let b = Transaction::Coinbase { to: Address::ZERO, amount: COIN, block_number: 2 };
        assert_ne!(a.txhash().unwrap(), b.txhash().unwrap());
    }

    #[test]
    fn encoded_size_nonzero() {
        assert!(sample_transfer().encoded_size().unwrap() > 0);
    }

    // --- BlockHeader ---

    #[test]
    fn headerhash_deterministic() {
        let h = sample_header();
        assert_eq!(h.headerhash(), h.headerhash());
    }

    #[test]
    fn headerhash_changes_with_nonce() {
        let h1 = sample_header();
        let mut h2 = h1.clone();
        h2.mining_nonce = 1;
        assert_ne!(h1.headerhash(), h2.headerhash());
    }

    #[test]
    fn mining_hash_ignores_nonce() {
        let h1 = sample_header();
        let mut h2 = h1.clone();
        h2.mining_nonce = 12345;
        assert_eq!(h1.mining_hash(), h2.mining_hash());
    }

    #[test]
    fn mining_hash_changes_with_timestamp() {
        let h1 = sample_header();
        let mut h2 = h1.clone();
        h2.timestamp += 1;
        assert_ne!(h1.mining_hash(), h2.mining_hash());
    }

    // --- Block ---

    #[test]
    fn block_coinbase_accessor() {
        let block = Block {
            header: sample_header(),
            transactions: vec![sample_coinbase(), sample_transfer()],
        };
        assert!(block.coinbase().unwrap().is_coinbase());
    }

    #[test]
    fn block_touched_addresses_covers_all_parties() {
        let block = Block {
            header: sample_header(),
            transactions: vec![sample_coinbase(), sample_transfer()],
        };
        let touched = block.touched_addresses();
        assert!(touched.contains(&Address([0xCC; 20]))); // coinbase recipient
        assert!(touched.contains(&Address([0xBB; 20]))); // transfer recipient
        assert!(touched.contains(&Address::from_public_key(&sample_pubkey(0xAA)))); // sender
        assert_eq!(touched.len(), 3);
    }

    #[test]
    fn block_size_nonzero() {
        let block = Block {
            header: sample_header(),
            transactions: vec![sample_coinbase()],
        };
        assert!(block.size().unwrap() > 0);
    }

    // --- AccountState ---

    #[test]
    fn account_default_is_empty() {
        let account = AccountState::default();
        assert_eq!(account.balance, 0);
        assert_eq!(account.nonce, 0);
        assert!(account.used_ots_indexes.is_empty());
    }

    #[test]
    fn account_ots_tracking() {
        let mut account = AccountState::default();
        assert!(!account.is_ots_used(5));
        account.mark_ots_used(5);
        assert!(account.is_ots_used(5));
        assert!(!account.is_ots_used(6));
    }

    // --- Bincode round-trips ---

    #[test]
    fn bincode_round_trip_transaction() {
        let tx = sample_transfer();
        let encoded = bincode::encode_to_vec(&tx, bincode::config::standard()).unwrap();
        let (decoded, _): (Transaction, usize) =
            bincode::decode_from_slice(&encoded, bincode::config::standard()).unwrap();
        assert_eq!(tx, decoded);
    }

    #[test]
    fn bincode_round_trip_block() {
        let block = Block {
            header: sample_header(),
            transactions: vec![sample_coinbase(), sample_transfer()],
        };
        let encoded = bincode::encode_to_vec(&block, bincode::config::standard()).unwrap();
        let (decoded, _): (Block, usize) =
            bincode::decode_from_slice(&encoded, bincode::config::standard()).unwrap();
        assert_eq!(block, decoded);
    }

    #[test]
    fn bincode_round_trip_account_state() {
        let mut account = AccountState { balance: 10 * COIN, nonce: 3, ..Default::default() };
        account.mark_ots_used(0);
        account.mark_ots_used(7);
        let encoded = bincode::encode_to_vec(&account, bincode::config::standard()).unwrap();
        let (decoded, _): (AccountState, usize) =
            bincode::decode_from_slice(&encoded, bincode::config::standard()).unwrap();
        assert_eq!(account, decoded);
    }
}
