//! # HabitXP Core Library
//!
//! This library provides the rules engine for the HabitXP gamified habit
//! tracker. Users define recurring tasks with a repeat target per period;
//! completing them grants XP and coins and feeds a daily streak, while
//! neglect triggers penalties and purchasable bonuses grant timed effects.
//!
//! ## Architecture
//!
//! - **Completion state machine**: each task owns its completion log and
//!   decides acceptance, cooldowns and period completion from it alone
//! - **Progression**: leveling math, timed status effects and penalties on
//!   the user, lazily expired
//! - **Orchestrator**: applies cross-entity consequences (rewards, streak
//!   updates, coin debits) through storage traits
//! - **Maintenance**: idempotent batch sweeps for deadlines, penalties and
//!   effect expiry
//!
//! The core performs no I/O and never reads a clock: every time-dependent
//! operation takes `now` as an explicit input, so behavior is deterministic
//! and testable. Persistence and the reward oracle are traits implemented
//! by the embedding application.
//!
//! ## Key Components
//!
//! - [`Task`]: task entity with its completion state machine
//! - [`User`]: progression state (XP, level, streak, effects)
//! - [`engine`]: request-triggered orchestration (complete, purchase, create)
//! - [`maintenance`]: periodic batch sweeps

pub mod bonus;
pub mod config;
pub mod duration;
pub mod engine;
pub mod error;
pub mod events;
pub mod maintenance;
pub mod oracle;
pub mod period;
pub mod progression;
pub mod space;
pub mod store;
pub mod task;

pub use bonus::{Bonus, BonusEffect, BonusOutcome, FreezeDurationUnit};
pub use config::EngineConfig;
pub use duration::DurationSpec;
pub use engine::{CompletionReport, PurchaseOutcome, TaskDraft};
pub use error::{
    ConfigError, CoreError, DurationError, EntityKind, OracleError, Result, StoreError,
    ValidationError,
};
pub use events::Event;
pub use maintenance::SweepStats;
pub use oracle::{FixedOracle, RewardOracle};
pub use period::Frequency;
pub use progression::{LevelUpChoice, User};
pub use space::Space;
pub use store::{MemoryStore, SpaceStore, TaskStore, UserStore};
pub use task::{Completion, CompletionOutcome, Task};
