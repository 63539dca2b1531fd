//! Orchestration over the pure pieces.
//!
//! The completion state machine and the bonus engine never touch entities
//! they don't own; the functions here apply the cross-entity consequences
//! (streak updates, reward grants, coin debits) and talk to the stores.
//! Callers must serialize writes per entity id -- two racing completions
//! on one task are the embedding application's lock to take.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use tracing::{debug, warn};

use crate::bonus::{Bonus, BonusOutcome};
use crate::config::EngineConfig;
use crate::error::{CoreError, EntityKind, OracleError, Result, ValidationError};
use crate::events::Event;
use crate::oracle::RewardOracle;
use crate::period::Frequency;
use crate::progression::{LevelUpChoice, User};
use crate::store::{SpaceStore, TaskStore, UserStore};
use crate::task::{CompletionOutcome, Task};

/// Everything a response layer needs after a completion request.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CompletionReport {
    pub outcome: CompletionOutcome,
    pub xp_gained: u32,
    pub coins_gained: u32,
    pub streak: u32,
    pub level: u32,
    pub events: Vec<Event>,
}

/// Result of a shop purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PurchaseOutcome {
    Purchased { granted_coins: Option<u32> },
    NotAffordable,
    /// Another bonus of the same effect kind is still running.
    EffectConflict,
}

/// Fields a creation request provides; rewards come from the oracle.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub duration: String,
    pub frequency: Frequency,
    pub times: u32,
    pub deadline: Option<NaiveDate>,
    pub space_id: String,
}

fn not_found(kind: EntityKind, id: &str) -> CoreError {
    CoreError::NotFound { kind, id: id.to_string() }
}

/// Run a completion attempt and apply its consequences to the user.
///
/// The task is saved in every case -- a cooldown rejection still commits
/// the retention prune. The user is saved only on acceptance.
pub fn complete_task<S>(
    store: &mut S,
    task_id: &str,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<CompletionReport>
where
    S: TaskStore + UserStore,
{
    let mut task = store
        .task(task_id)?
        .ok_or_else(|| not_found(EntityKind::Task, task_id))?;
    let mut user = store
        .user(user_id)?
        .ok_or_else(|| not_found(EntityKind::User, user_id))?;

    let outcome = task.attempt_completion(user_id, now)?;
    let mut events = Vec::new();
    let mut xp_gained = 0;
    let mut coins_gained = 0;

    if let CompletionOutcome::Accepted { period_completed } = outcome {
        let level_before = user.level;
        xp_gained = user.add_xp(task.reward_xp);
        coins_gained = task.reward_coins;
        user.add_coins(coins_gained);

        if period_completed {
            user.streak_broken = false;
        }
        if task.frequency.is_recurring() && user.record_streak_activity(now.date_naive()) {
            events.push(Event::StreakIncremented {
                user_id: user.id.clone(),
                streak: user.streak,
                at: now,
            });
        }
        if user.level != level_before {
            events.push(Event::LevelChanged {
                user_id: user.id.clone(),
                from_level: level_before,
                to_level: user.level,
                at: now,
            });
        }
        events.push(Event::TaskCompleted {
            task_id: task.id.clone(),
            user_id: user.id.clone(),
            period_completed,
            xp_gained,
            coins_gained,
            at: now,
        });
    } else {
        debug!(task = %task.id, user = %user.id, "completion attempt on cooldown");
    }

    store.save_task(&task)?;
    if matches!(outcome, CompletionOutcome::Accepted { .. }) {
        store.save_user(&user)?;
    }

    Ok(CompletionReport {
        outcome,
        xp_gained,
        coins_gained,
        streak: user.streak,
        level: user.level,
        events,
    })
}

/// Sell a bonus to a user: affordability check, effect application,
/// debit on success. A conflicting effect leaves the user untouched.
pub fn purchase_bonus<S, R>(
    store: &mut S,
    bonus: &Bonus,
    user_id: &str,
    now: DateTime<Utc>,
    config: &EngineConfig,
    rng: &mut R,
) -> Result<(PurchaseOutcome, Vec<Event>)>
where
    S: UserStore,
    R: Rng + ?Sized,
{
    let mut user = store
        .user(user_id)?
        .ok_or_else(|| not_found(EntityKind::User, user_id))?;

    if !bonus.is_affordable(user.coins) {
        return Ok((PurchaseOutcome::NotAffordable, Vec::new()));
    }

    match bonus.apply(&mut user, now, config.freeze_duration_unit, rng) {
        BonusOutcome::AlreadyActive => Ok((PurchaseOutcome::EffectConflict, Vec::new())),
        BonusOutcome::Applied { granted_coins } => {
            user.coins = user.coins.saturating_sub(bonus.cost);
            user.bonus_ids.push(bonus.id.clone());
            store.save_user(&user)?;
            let events = vec![Event::BonusApplied {
                user_id: user.id.clone(),
                bonus_id: bonus.id.clone(),
                granted_coins,
                at: now,
            }];
            Ok((PurchaseOutcome::Purchased { granted_coins }, events))
        }
    }
}

/// Create a task, enforcing the owner's task limit and pricing it through
/// the oracle. A rate-limited oracle falls back to the configured default
/// reward; any other oracle failure aborts the creation.
pub fn create_task<S>(
    store: &mut S,
    oracle: &dyn RewardOracle,
    draft: TaskDraft,
    user_id: &str,
    config: &EngineConfig,
) -> Result<Task>
where
    S: TaskStore + UserStore + SpaceStore,
{
    let user = store
        .user(user_id)?
        .ok_or_else(|| not_found(EntityKind::User, user_id))?;
    if store.task_count_for(user_id)? >= user.task_limit as usize {
        return Err(ValidationError::TaskLimitReached { limit: user.task_limit }.into());
    }

    let mut task = Task::new(
        user_id,
        draft.title,
        draft.duration,
        draft.frequency,
        draft.times,
        draft.space_id,
    )?;
    task.deadline = draft.deadline;

    let space = store.space(&task.space_id)?;
    task.reward_xp = estimate_or_default(oracle.estimate_xp(&task, space.as_ref()), config)?;
    task.reward_coins = estimate_or_default(oracle.estimate_coins(&task, space.as_ref()), config)?;

    store.save_task(&task)?;
    if let Some(mut space) = space {
        space.attach_task(task.id.clone());
        store.save_space(&space)?;
    }
    Ok(task)
}

fn estimate_or_default(
    estimate: std::result::Result<u32, OracleError>,
    config: &EngineConfig,
) -> Result<u32> {
    match estimate {
        Ok(value) => Ok(value),
        Err(OracleError::RateLimited) => {
            warn!(default = config.default_reward, "reward oracle rate limited, using default");
            Ok(config.default_reward)
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a task and detach it from its space.
pub fn delete_task<S>(store: &mut S, task_id: &str) -> Result<()>
where
    S: TaskStore + SpaceStore,
{
    let Some(task) = store.task(task_id)? else {
        return Ok(());
    };
    if let Some(mut space) = store.space(&task.space_id)? {
        if space.detach_task(&task.id) {
            store.save_space(&space)?;
        }
    }
    store.delete_task(task_id)?;
    Ok(())
}

/// Cash in a level-up reward for a user.
pub fn level_up<S>(store: &mut S, user_id: &str, choice: LevelUpChoice) -> Result<User>
where
    S: UserStore,
{
    let mut user = store
        .user(user_id)?
        .ok_or_else(|| not_found(EntityKind::User, user_id))?;
    user.level_up_reward(choice);
    store.save_user(&user)?;
    Ok(user)
}
