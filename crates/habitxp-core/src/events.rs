//! Audit events emitted by the orchestrator.
//!
//! The embedding application appends these to its event log or pushes them
//! to clients; the core never consumes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// An accepted completion. `period_completed` marks the attempt that
    /// met the period's repeat target.
    TaskCompleted {
        task_id: String,
        user_id: String,
        period_completed: bool,
        xp_gained: u32,
        coins_gained: u32,
        at: DateTime<Utc>,
    },
    /// The daily streak grew by one.
    StreakIncremented {
        user_id: String,
        streak: u32,
        at: DateTime<Utc>,
    },
    /// XP crossed a level boundary.
    LevelChanged {
        user_id: String,
        from_level: u32,
        to_level: u32,
        at: DateTime<Utc>,
    },
    /// A purchased bonus took effect.
    BonusApplied {
        user_id: String,
        bonus_id: String,
        granted_coins: Option<u32>,
        at: DateTime<Utc>,
    },
}
