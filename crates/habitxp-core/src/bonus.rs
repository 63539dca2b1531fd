//! Purchasable bonuses and their effects.
//!
//! Effects are a closed tagged variant matched exhaustively: adding a new
//! kind is a compile-checked change everywhere it is handled. Same-kind
//! timed effects are mutually exclusive; stacking is a conflict, not an
//! overwrite. Affordability and the coin debit are the shop's concern
//! ([`crate::engine::purchase_bonus`]) -- this module only governs effect
//! application.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::progression::User;

/// Inclusive bounds for the random coin grant.
pub const RANDOM_COIN_MIN: u32 = 10;
pub const RANDOM_COIN_MAX: u32 = 200;

/// Unit applied to a streak-freeze bonus's duration value. The shop layer
/// resolves this from configuration; the engine never guesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FreezeDurationUnit {
    #[default]
    Hours,
    Days,
}

impl FreezeDurationUnit {
    fn to_duration(self, value: i64) -> Duration {
        match self {
            FreezeDurationUnit::Hours => Duration::hours(value),
            FreezeDurationUnit::Days => Duration::days(value),
        }
    }
}

/// Effect payload, one case per bonus kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BonusEffect {
    /// Multiply earned XP by `factor` for `duration_hours`.
    XpBoost { factor: u32, duration_hours: i64 },
    /// Grant a uniform random amount of coins in
    /// `[RANDOM_COIN_MIN, RANDOM_COIN_MAX]`.
    RandomCoin,
    /// Restore `amount` health, clamped to the user's ceiling.
    Health { amount: u32 },
    /// Protect the streak from breaking for `duration` freeze units.
    StreakFreeze { duration: i64 },
}

/// A bonus offered in the shop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bonus {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cost: u32,
    pub effect: BonusEffect,
}

/// Result of applying a bonus effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum BonusOutcome {
    /// The effect took hold. `granted_coins` is set for coin grants.
    Applied { granted_coins: Option<u32> },
    /// An effect of the same kind is already running; nothing changed.
    AlreadyActive,
}

impl Bonus {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        cost: u32,
        effect: BonusEffect,
    ) -> Self {
        Bonus {
            id: format!("bonus-{}", Uuid::new_v4()),
            name: name.into(),
            description: description.into(),
            cost,
            effect,
        }
    }

    pub fn is_affordable(&self, coins: u32) -> bool {
        coins >= self.cost
    }

    /// Apply this bonus's effect to `user`.
    pub fn apply<R: Rng + ?Sized>(
        &self,
        user: &mut User,
        now: DateTime<Utc>,
        freeze_unit: FreezeDurationUnit,
        rng: &mut R,
    ) -> BonusOutcome {
        match self.effect {
            BonusEffect::XpBoost { factor, duration_hours } => {
                if user.xp_bonus_active {
                    return BonusOutcome::AlreadyActive;
                }
                user.xp_factor = factor;
                user.xp_factor_until = Some(now + Duration::hours(duration_hours));
                user.xp_bonus_active = true;
                BonusOutcome::Applied { granted_coins: None }
            }
            BonusEffect::RandomCoin => {
                let granted = rng.gen_range(RANDOM_COIN_MIN..=RANDOM_COIN_MAX);
                user.add_coins(granted);
                BonusOutcome::Applied { granted_coins: Some(granted) }
            }
            BonusEffect::Health { amount } => {
                user.heal(amount);
                BonusOutcome::Applied { granted_coins: None }
            }
            BonusEffect::StreakFreeze { duration } => {
                if user.streak_freeze_active {
                    return BonusOutcome::AlreadyActive;
                }
                user.streak_freeze_active = true;
                user.streak_freeze_until = Some(now + freeze_unit.to_duration(duration));
                BonusOutcome::Applied { granted_coins: None }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::mock::StepRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
    }

    fn rng() -> StepRng {
        StepRng::new(0, 1)
    }

    fn apply(bonus: &Bonus, user: &mut User) -> BonusOutcome {
        bonus.apply(user, now(), FreezeDurationUnit::Hours, &mut rng())
    }

    #[test]
    fn xp_boost_sets_factor_and_expiry() {
        let mut user = User::new("tester");
        let bonus = Bonus::new("Boost", "", 50, BonusEffect::XpBoost { factor: 2, duration_hours: 1 });

        let outcome = apply(&bonus, &mut user);
        assert_eq!(outcome, BonusOutcome::Applied { granted_coins: None });
        assert_eq!(user.xp_factor, 2);
        assert_eq!(user.xp_factor_until, Some(now() + Duration::hours(1)));
        assert!(user.xp_bonus_active);
    }

    #[test]
    fn xp_boost_conflicts_when_already_active() {
        let mut user = User::new("tester");
        let bonus = Bonus::new("Boost", "", 50, BonusEffect::XpBoost { factor: 2, duration_hours: 1 });
        apply(&bonus, &mut user);

        let before = user.clone();
        assert_eq!(apply(&bonus, &mut user), BonusOutcome::AlreadyActive);
        assert_eq!(user.xp_factor, before.xp_factor);
        assert_eq!(user.xp_factor_until, before.xp_factor_until);
    }

    #[test]
    fn random_coin_grants_within_bounds() {
        let mut user = User::new("tester");
        let bonus = Bonus::new("Coins", "", 30, BonusEffect::RandomCoin);

        let mut rng = rand_pcg::Pcg32::new(42, 54);
        match bonus.apply(&mut user, now(), FreezeDurationUnit::Hours, &mut rng) {
            BonusOutcome::Applied { granted_coins: Some(granted) } => {
                assert!((RANDOM_COIN_MIN..=RANDOM_COIN_MAX).contains(&granted));
                assert_eq!(user.coins, granted);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn health_heals_and_clamps() {
        let mut user = User::new("tester");
        user.health = 10;
        let bonus = Bonus::new("Heal", "", 20, BonusEffect::Health { amount: 5 });
        assert_eq!(apply(&bonus, &mut user), BonusOutcome::Applied { granted_coins: None });
        assert_eq!(user.health, 15);

        user.health = user.max_health - 1;
        apply(&bonus, &mut user);
        assert_eq!(user.health, user.max_health);
    }

    #[test]
    fn streak_freeze_respects_configured_unit() {
        let mut user = User::new("tester");
        let bonus = Bonus::new("Freeze", "", 80, BonusEffect::StreakFreeze { duration: 2 });

        let outcome = bonus.apply(&mut user, now(), FreezeDurationUnit::Days, &mut rng());
        assert_eq!(outcome, BonusOutcome::Applied { granted_coins: None });
        assert!(user.streak_freeze_active);
        assert_eq!(user.streak_freeze_until, Some(now() + Duration::days(2)));
    }

    #[test]
    fn streak_freeze_conflicts_when_already_frozen() {
        let mut user = User::new("tester");
        user.streak_freeze_active = true;
        let bonus = Bonus::new("Freeze", "", 80, BonusEffect::StreakFreeze { duration: 2 });
        assert_eq!(apply(&bonus, &mut user), BonusOutcome::AlreadyActive);
        assert_eq!(user.streak_freeze_until, None);
    }
}
