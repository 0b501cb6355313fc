//! Difficulty adjustment algorithm.
//!
//! Ember retargets every block from the spacing between a block and its
//! parent. The adjustment is proportional: a parent interval twice the
//! target spacing halves the difficulty, half the spacing doubles it.
//! Per-block swings are clamped to [`MAX_ADJUSTMENT_FACTOR`] (4×) to
//! blunt timestamp manipulation and hashrate spikes.
//!
//! # Difficulty semantics
//!
//! Difficulty is an exact [`U256`] where **higher = harder**. The PoW
//! check interprets the BLAKE3 digest of the mining input as a
//! big-endian `U256` and requires it to be ≤ `target`, where
//! `target = U256::MAX / difficulty`. Difficulty and cumulative
//! difficulty use full 256-bit arithmetic so long chains cannot
//! saturate the fork-choice comparison.

use primitive_types::U256;

use crate::constants::BLOCK_TIME_SECS;

/// Maximum difficulty adjustment factor per block.
pub const MAX_ADJUSTMENT_FACTOR: u64 = 4;

/// Minimum difficulty. The floor keeps the target finite and lets a
/// stalled test network recover.
pub const MIN_DIFFICULTY: u64 = 1;

/// A difficulty and its derived PoW target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DifficultyAndTarget {
    /// Work required for one block at this height.
    pub difficulty: U256,
    /// Upper bound for an acceptable PoW digest.
    pub target: U256,
}

/// Derive the PoW target from a difficulty: `U256::MAX / difficulty`.
///
/// A zero difficulty is treated as [`MIN_DIFFICULTY`].
pub fn target_from_difficulty(difficulty: U256) -> U256 {
    let floor = U256::from(MIN_DIFFICULTY);
    U256::MAX / difficulty.max(floor)
}

/// Compute the difficulty for a block from its own timestamp, its
/// parent's timestamp, and its parent's difficulty.
///
/// 1. `delta = max(1, timestamp - parent_timestamp)`
/// 2. Clamp delta to `[BLOCK_TIME_SECS / 4, BLOCK_TIME_SECS * 4]`
/// 3. `difficulty = parent_difficulty * BLOCK_TIME_SECS / clamped_delta`
/// 4. Floor at [`MIN_DIFFICULTY`]
///
/// The genesis block uses a synthetic parent timestamp one block
/// interval before its own, so step 3 leaves the initial difficulty
/// unchanged.
pub fn calc_difficulty(
    timestamp: u64,
    parent_timestamp: u64,
    parent_difficulty: U256,
) -> DifficultyAndTarget {
    let delta = timestamp.saturating_sub(parent_timestamp).max(1);

    // Clamp the observed interval to prevent extreme adjustments (max 4× change).
    let min_delta = BLOCK_TIME_SECS / MAX_ADJUSTMENT_FACTOR;
    let max_delta = BLOCK_TIME_SECS * MAX_ADJUSTMENT_FACTOR;
    let clamped = delta.clamp(min_delta, max_delta);

    // difficulty = parent * BLOCK_TIME_SECS / clamped, exact in 256 bits.
    // The multiplication can only overflow if parent_difficulty is within
    // a factor of BLOCK_TIME_SECS of U256::MAX; saturate rather than wrap.
    let scaled = parent_difficulty
        .checked_mul(U256::from(BLOCK_TIME_SECS))
        .unwrap_or(U256::MAX);
    let difficulty = (scaled / U256::from(clamped)).max(U256::from(MIN_DIFFICULTY));

    DifficultyAndTarget {
        difficulty,
        target: target_from_difficulty(difficulty),
    }
}
