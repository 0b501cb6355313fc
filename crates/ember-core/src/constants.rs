//! Protocol constants for the Ember network.
//!
//! All monetary values are in embers (1 EMBER = 10^9 embers).
//! All numeric fields use u64 per protocol convention.

/// Smallest currency unit: 1 EMBER = 10^9 embers.
pub const COIN: u64 = 1_000_000_000;

/// Target spacing between blocks, in seconds.
pub const BLOCK_TIME_SECS: u64 = 60;

/// Coinbase reward for the first halving era, in embers.
pub const INITIAL_REWARD: u64 = 50 * COIN;

/// Number of blocks per halving era (~2 years at 60s spacing).
pub const HALVING_INTERVAL: u64 = 1_051_200;

/// Starting difficulty assigned to the genesis block.
///
/// Deliberately low so a fresh network (or a test harness) can produce
/// blocks immediately; retargeting converges to the real hashrate from
/// there.
pub const INITIAL_DIFFICULTY: u64 = 4;

/// Maximum seconds a block timestamp may run ahead of local time.
pub const MAX_FUTURE_BLOCK_TIME: u64 = 900;

/// Floor for the dynamic block-size limit, in bytes.
pub const MIN_BLOCK_SIZE_LIMIT: usize = 262_144;

/// Ceiling for the dynamic block-size limit, in bytes.
pub const MAX_BLOCK_SIZE_LIMIT: usize = 2_097_152;

/// Number of recent mainchain blocks averaged for the size limit.
pub const SIZE_LIMIT_WINDOW: u64 = 10;

/// Maximum serialized transaction size, in bytes.
pub const MAX_TX_SIZE: usize = 16_384;

/// Exact serialized length of an account public key, in bytes.
pub const PUBLIC_KEY_SIZE: usize = 67;

/// Maximum serialized signature length, in bytes.
pub const MAX_SIGNATURE_SIZE: usize = 4_096;

/// Number of one-time-signature slots per account key.
///
/// Each slot may sign exactly one confirmed transfer; reuse is a
/// consensus violation.
pub const MAX_OTS_INDEX: u16 = 8_192;

/// Maximum headerhashes returned by a single sync query.
pub const HEADERHASH_SYNC_LIMIT: u64 = 10_000;

/// Maximum number of transactions held in the pending pool.
pub const POOL_MAX_TXS: usize = 10_000;

/// Maximum total serialized bytes held in the pending pool.
pub const POOL_MAX_BYTES: usize = 33_554_432;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coin_is_one_billion_embers() {
        assert_eq!(COIN, 1_000_000_000);
    }

    #[test]
    fn halving_interval_is_about_two_years() {
        let secs = HALVING_INTERVAL * BLOCK_TIME_SECS;
        let years = secs / (365 * 24 * 3600);
        assert_eq!(years, 2);
    }

    #[test]
    fn size_limit_bounds_ordered() {
        assert!(MIN_BLOCK_SIZE_LIMIT < MAX_BLOCK_SIZE_LIMIT);
    }

    #[test]
    fn tx_fits_in_min_block() {
        assert!(MAX_TX_SIZE < MIN_BLOCK_SIZE_LIMIT);
    }

    #[test]
    fn signature_fits_in_tx() {
        assert!(PUBLIC_KEY_SIZE + MAX_SIGNATURE_SIZE < MAX_TX_SIZE);
    }
}
