//! Merkle root over transaction hashes.
//!
//! BLAKE3 pairwise fold: each level concatenates adjacent pairs and
//! hashes them; an odd leaf is paired with itself. The root of an empty
//! list is the zero hash (only possible for structurally invalid
//! blocks, which are rejected before the root is checked).

use crate::types::Hash256;

/// Compute the merkle root of an ordered list of transaction hashes.
pub fn merkle_root(hashes: &[Hash256]) -> Hash256 {
    if hashes.is_empty() {
        return Hash256::ZERO;
    }
    let mut level: Vec<Hash256> = hashes.to_vec();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        for pair in level.chunks(2) {
            let left = pair[0];
            let right = if pair.len() == 2 { pair[1] } else { pair[0] };
            let mut data = [0u8; 64];
            data[..32].copy_from_slice(left.as_bytes());
            data[32..].copy_from_slice(right.as_bytes());
            next.push(Hash256(blake3::hash(&data).into()));
        }
        level = next;
    }
    level[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(byte: u8) -> Hash256 {
        Hash256([byte; 32])
    }

    #[test]
    fn empty_root_is_zero() {
        assert_eq!(merkle_root(&[]), Hash256::ZERO);
    }

    #[test]
    fn single_leaf_is_hashed_pair() {
        // One leaf is paired with itself, not passed through.
        let root = merkle_root(&[h(1)]);
        assert_ne!(root, h(1));
        assert_eq!(root, merkle_root(&[h(1)]));
    }

    #[test]
    fn order_matters() {
        assert_ne!(merkle_root(&[h(1), h(2)]), merkle_root(&[h(2), h(1)]));
    }

    #[test]
    fn odd_count_duplicates_last() {
        // [a, b, c] folds as [(a,b), (c,c)]
        let left = merkle_root(&[h(1), h(2)]);
        let right = merkle_root(&[h(3)]);
        let mut data = [0u8; 64];
        data[..32].copy_from_slice(left.as_bytes());
        data[32..].copy_from_slice(right.as_bytes());
        let expected = Hash256(blake3::hash(&data).into());
        assert_eq!(merkle_root(&[h(1), h(2), h(3)]), expected);
    }

    #[test]
    fn any_leaf_change_changes_root() {
        let base = merkle_root(&[h(1), h(2), h(3), h(4)]);
        for i in 0..4u8 {
            let mut leaves = [h(1), h(2), h(3), h(4)];
            leaves[i as usize] = h(0xFF);
            assert_ne!(merkle_root(&leaves), base);
        }
    }
}
