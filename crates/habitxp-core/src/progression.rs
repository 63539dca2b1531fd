//! User progression: leveling math, timed status effects, penalties, and
//! the daily streak.
//!
//! Level costs follow `cost(i) = round(100 * 1.2^i)`. The stored `xp` is
//! the single source of truth; `level`, `current_xp` and `xp_goal` are
//! caches recomputed after every gain, in that order.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Coins removed by one penalty application.
pub const COIN_PENALTY: u32 = 5;

/// Health removed by one penalty application.
pub const HEALTH_PENALTY: u32 = 2;

/// Starting ceiling for health at registration.
pub const STARTING_MAX_HEALTH: u32 = 20;

/// Starting number of tasks a user may own.
pub const STARTING_TASK_LIMIT: u32 = 5;

/// XP required to advance from `level` to `level + 1`.
fn level_cost(level: u32) -> u64 {
    (100.0 * 1.2_f64.powi(level as i32)).round() as u64
}

/// What a user picks when cashing in a level-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LevelUpChoice {
    /// +2 max health, healed to full.
    Health,
    /// +1 to the task ownership limit.
    TaskLimit,
}

/// A registered user and every progression field this core mutates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,

    pub max_health: u32,
    pub health: u32,
    pub coins: u32,

    pub streak: u32,
    pub last_streak_update: Option<NaiveDate>,
    pub streak_broken: bool,
    pub streak_freeze_active: bool,
    pub streak_freeze_until: Option<DateTime<Utc>>,

    /// Multiplier on earned XP while a boost is running.
    pub xp_factor: u32,
    pub xp_factor_until: Option<DateTime<Utc>>,
    pub xp_bonus_active: bool,

    /// Lifetime XP; the three fields below are derived from it.
    pub xp: u32,
    pub level: u32,
    pub current_xp: u32,
    pub xp_goal: u32,

    pub task_limit: u32,

    #[serde(default)]
    pub space_ids: Vec<String>,
    #[serde(default)]
    pub bonus_ids: Vec<String>,
}

impl User {
    /// Create a fresh user with registration defaults.
    pub fn new(username: impl Into<String>) -> Self {
        let mut user = User {
            id: format!("user-{}", Uuid::new_v4()),
            username: username.into(),
            max_health: STARTING_MAX_HEALTH,
            health: STARTING_MAX_HEALTH,
            coins: 0,
            streak: 0,
            last_streak_update: None,
            streak_broken: false,
            streak_freeze_active: false,
            streak_freeze_until: None,
            xp_factor: 1,
            xp_factor_until: None,
            xp_bonus_active: false,
            xp: 0,
            level: 0,
            current_xp: 0,
            xp_goal: 0,
            task_limit: STARTING_TASK_LIMIT,
            space_ids: Vec::new(),
            bonus_ids: Vec::new(),
        };
        user.recalculate_progress();
        user
    }

    // ── Leveling ─────────────────────────────────────────────────────

    /// Grant XP, scaled by the active factor. Returns the effective gain.
    pub fn add_xp(&mut self, base_xp: u32) -> u32 {
        let gained = base_xp.saturating_mul(self.xp_factor);
        self.xp = self.xp.saturating_add(gained);
        self.recalculate_progress();
        gained
    }

    /// Recompute `level`, then `current_xp`, then `xp_goal` from `xp`.
    fn recalculate_progress(&mut self) {
        let xp = u64::from(self.xp);
        let mut level = 0u32;
        let mut spent = 0u64;
        while xp >= spent + level_cost(level) {
            spent += level_cost(level);
            level += 1;
        }
        self.level = level;
        self.current_xp = (xp - spent) as u32;
        self.xp_goal = level_cost(level) as u32;
    }

    // ── Timed status effects ─────────────────────────────────────────

    /// Lazily expire the XP boost. Returns true only when state changed,
    /// so callers persist only on true.
    pub fn xp_factor_reset(&mut self, now: DateTime<Utc>) -> bool {
        match self.xp_factor_until {
            Some(until) if now > until => {
                self.xp_factor = 1;
                self.xp_factor_until = None;
                self.xp_bonus_active = false;
                true
            }
            _ => false,
        }
    }

    /// Lazily expire the streak freeze. Same persist-on-true contract as
    /// [`User::xp_factor_reset`].
    pub fn streak_freeze_reset(&mut self, now: DateTime<Utc>) -> bool {
        match self.streak_freeze_until {
            Some(until) if now > until => {
                self.streak_freeze_active = false;
                self.streak_freeze_until = None;
                true
            }
            _ => false,
        }
    }

    // ── Penalties ────────────────────────────────────────────────────

    pub fn coin_penalty(&mut self) {
        self.coins = self.coins.saturating_sub(COIN_PENALTY);
    }

    pub fn health_penalty(&mut self) {
        self.health = self.health.saturating_sub(HEALTH_PENALTY);
    }

    // ── Streak ───────────────────────────────────────────────────────

    /// Count a completed recurring activity toward the streak, at most
    /// once per calendar day. Returns whether the streak grew.
    pub fn record_streak_activity(&mut self, today: NaiveDate) -> bool {
        if self.last_streak_update == Some(today) {
            return false;
        }
        self.streak += 1;
        self.last_streak_update = Some(today);
        true
    }

    // ── Coins & health ───────────────────────────────────────────────

    pub fn add_coins(&mut self, amount: u32) {
        self.coins = self.coins.saturating_add(amount);
    }

    /// Heal, clamped to `max_health`.
    pub fn heal(&mut self, amount: u32) {
        self.health = self.health.saturating_add(amount).min(self.max_health);
    }

    /// Cash in a level-up reward.
    pub fn level_up_reward(&mut self, choice: LevelUpChoice) {
        match choice {
            LevelUpChoice::Health => {
                self.max_health += 2;
                self.health = self.max_health;
            }
            LevelUpChoice::TaskLimit => self.task_limit += 1,
        }
    }
}
