//! Reward oracle interface.
//!
//! The oracle estimates how much XP and how many coins a new task is
//! worth. It is consulted once, at creation time, and is opaque to the
//! rest of the core. Implementations live in the embedding application
//! (the production one wraps an LLM API); [`FixedOracle`] serves tests
//! and offline use.

use crate::error::OracleError;
use crate::space::Space;
use crate::task::Task;

/// External reward-value estimator.
pub trait RewardOracle {
    fn estimate_xp(&self, task: &Task, space: Option<&Space>) -> Result<u32, OracleError>;
    fn estimate_coins(&self, task: &Task, space: Option<&Space>) -> Result<u32, OracleError>;
}

/// Oracle returning fixed values.
#[derive(Debug, Clone, Copy)]
pub struct FixedOracle {
    pub xp: u32,
    pub coins: u32,
}

impl RewardOracle for FixedOracle {
    fn estimate_xp(&self, _task: &Task, _space: Option<&Space>) -> Result<u32, OracleError> {
        Ok(self.xp)
    }

    fn estimate_coins(&self, _task: &Task, _space: Option<&Space>) -> Result<u32, OracleError> {
        Ok(self.coins)
    }
}
