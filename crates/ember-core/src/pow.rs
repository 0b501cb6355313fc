//! Proof-of-work verification.
//!
//! The PoW digest is BLAKE3 over `mining_hash || nonce_le`, interpreted
//! as a big-endian [`U256`]. A block satisfies the puzzle when its
//! digest is ≤ the target derived from its difficulty.

use primitive_types::U256;

use crate::types::Hash256;

/// Byte length of the PoW input: 32-byte mining hash + 8-byte nonce.
const POW_INPUT_SIZE: usize = 40;

/// Assemble the PoW input for a mining hash and nonce.
pub fn pow_input(mining_hash: &Hash256, mining_nonce: u64) -> [u8; POW_INPUT_SIZE] {
    let mut input = [0u8; POW_INPUT_SIZE];
    input[..32].copy_from_slice(mining_hash.as_bytes());
    input[32..].copy_from_slice(&mining_nonce.to_le_bytes());
    input
}

/// Compute the PoW digest for a mining hash and nonce.
pub fn pow_digest(mining_hash: &Hash256, mining_nonce: u64) -> U256 {
    let input = pow_input(mining_hash, mining_nonce);
    let digest = blake3::hash(&input);
    U256::from_big_endian(digest.as_bytes())
}

/// Check whether a nonce satisfies the target for a mining hash.
pub fn verify_pow(mining_hash: &Hash256, mining_nonce: u64, target: U256) -> bool {
    pow_digest(mining_hash, mining_nonce) <= target
}

/// Scan nonces from `start_nonce` for one that satisfies the target.
///
/// Returns `None` after `max_iters` attempts. Used by test harnesses
/// and local block production; real miners drive this loop themselves.
pub fn mine(
    mining_hash: &Hash256,
    target: U256,
    start_nonce: u64,
    max_iters: u64,
) -> Option<u64> {
    let mut nonce = start_nonce;
    for _ in 0..max_iters {
        if verify_pow(mining_hash, nonce, target) {
            return Some(nonce);
        }
        nonce = nonce.wrapping_add(1);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::target_from_difficulty;

    fn sample_hash() -> Hash256 {
        Hash256([0x5E; 32])
    }

    #[test]
    fn digest_deterministic() {
        assert_eq!(pow_digest(&sample_hash(), 7), pow_digest(&sample_hash(), 7));
    }

    #[test]
    fn digest_changes_with_nonce() {
        assert_ne!(pow_digest(&sample_hash(), 0), pow_digest(&sample_hash(), 1));
    }

    #[test]
    fn digest_changes_with_hash() {
        assert_ne!(
            pow_digest(&Hash256([1; 32]), 0),
            pow_digest(&Hash256([2; 32]), 0),
        );
    }

    #[test]
    fn max_target_accepts_any_nonce() {
        assert!(verify_pow(&sample_hash(), 0, U256::MAX));
        assert!(verify_pow(&sample_hash(), u64::MAX, U256::MAX));
    }

    #[test]
    fn zero_target_rejects() {
        // A zero target would require an all-zero digest.
        assert!(!verify_pow(&sample_hash(), 0, U256::zero()));
    }

    #[test]
    fn mine_finds_nonce_for_easy_target() {
        let target = target_from_difficulty(U256::from(4));
        let nonce = mine(&sample_hash(), target, 0, 10_000).unwrap();
        assert!(verify_pow(&sample_hash(), nonce, target));
    }

    #[test]
    fn mine_gives_up_on_impossible_target() {
        assert_eq!(mine(&sample_hash(), U256::zero(), 0, 100), None);
    }

    #[test]
    fn mined_nonce_fails_harder_target() {
        let easy = target_from_difficulty(U256::from(2));
        let nonce = mine(&sample_hash(), easy, 0, 10_000).unwrap();
        // The digest that passed the easy target is above a zero target.
        assert!(!verify_pow(&sample_hash(), nonce, U256::zero()));
    }

    #[test]
    fn pow_input_layout() {
        let input = pow_input(&Hash256([0xAA; 32]), 0x0102030405060708);
        assert_eq!(&input[..32], &[0xAA; 32]);
        assert_eq!(&input[32..], &0x0102030405060708u64.to_le_bytes());
    }
}
