//! Coinbase reward schedule.
//!
//! The default schedule halves [`INITIAL_REWARD`] every
//! [`HALVING_INTERVAL`] blocks. The ingestion pipeline checks coinbase
//! amounts through the [`RewardPolicy`] trait so deployments (and
//! tests) can swap the rule without touching consensus code.

use crate::constants::{HALVING_INTERVAL, INITIAL_REWARD};
use crate::error::BlockError;

/// Mining reward for the block at `block_number` under the halving
/// schedule. Genesis (block 0) is the premine and is not produced by
/// this schedule.
pub fn block_reward(block_number: u64) -> u64 {
    let era = block_number / HALVING_INTERVAL;
    if era >= 64 {
        return 0;
    }
    INITIAL_REWARD >> era
}

/// Validates the coinbase amount of an incoming block.
pub trait RewardPolicy: Send + Sync {
    /// Check the coinbase amount claimed at `block_number`.
    fn validate_coinbase(&self, amount: u64, block_number: u64) -> Result<(), BlockError>;
}

/// The production rule: the coinbase must claim exactly the scheduled
/// reward. Fees are paid out of sender balances, not minted.
pub struct HalvingSchedule;

impl RewardPolicy for HalvingSchedule {
    fn validate_coinbase(&self, amount: u64, block_number: u64) -> Result<(), BlockError> {
        let expected = block_reward(block_number);
        if amount != expected {
            return Err(BlockError::InvalidReward { got: amount, expected });
        }
        Ok(())
    }
}

/// Accepts any coinbase amount. Test fixtures only.
pub struct AcceptAny;

impl RewardPolicy for AcceptAny {
    fn validate_coinbase(&self, _amount: u64, _block_number: u64) -> Result<(), BlockError> {
        Ok(())
    }
}
