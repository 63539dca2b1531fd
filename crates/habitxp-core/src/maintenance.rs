//! Periodic maintenance sweeps.
//!
//! Four independent, idempotent batch rules over the full user set. The
//! embedding application triggers them on its own timers (deadline and
//! effect-expiry hourly, the two penalty/flag rules daily); no ordering
//! between them is assumed. Sweeps are per-item isolated: a failure on one
//! user is logged and counted, never aborts the rest.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::period::Frequency;
use crate::progression::User;
use crate::store::{SpaceStore, TaskStore, UserStore};

/// Counters reported by a sweep, for the embedding scheduler's logs.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SweepStats {
    pub users_processed: usize,
    pub users_updated: usize,
    pub tasks_reset: usize,
    pub tasks_deleted: usize,
    pub streaks_broken: usize,
    pub failures: usize,
}

/// Hourly deadline & streak-break sweep.
///
/// Walks every user's spaces and tasks. A task whose deadline lies strictly
/// before today either proves activity (completed), gets deleted (one-shot,
/// uncompleted), or gets reset (recurring, uncompleted). A user with no
/// completed lapsed task and no active streak freeze loses the streak and
/// takes both penalties.
pub fn deadline_sweep<S>(store: &mut S, now: DateTime<Utc>) -> SweepStats
where
    S: TaskStore + UserStore + SpaceStore,
{
    let today = now.date_naive();
    let mut stats = SweepStats::default();

    let users = match store.users() {
        Ok(users) => users,
        Err(e) => {
            warn!(error = %e, "deadline sweep: listing users failed");
            stats.failures += 1;
            return stats;
        }
    };

    for mut user in users {
        stats.users_processed += 1;
        match sweep_user_deadlines(store, &mut user, today) {
            Ok(outcome) => {
                stats.tasks_reset += outcome.tasks_reset;
                stats.tasks_deleted += outcome.tasks_deleted;
                if outcome.streak_broken {
                    stats.streaks_broken += 1;
                    stats.users_updated += 1;
                }
            }
            Err(e) => {
                warn!(user = %user.id, error = %e, "deadline sweep: skipping user");
                stats.failures += 1;
            }
        }
    }
    stats
}

#[derive(Default)]
struct DeadlineOutcome {
    tasks_reset: usize,
    tasks_deleted: usize,
    streak_broken: bool,
}

fn sweep_user_deadlines<S>(
    store: &mut S,
    user: &mut User,
    today: NaiveDate,
) -> Result<DeadlineOutcome, StoreError>
where
    S: TaskStore + UserStore + SpaceStore,
{
    let mut outcome = DeadlineOutcome::default();
    let mut has_completed_activity = false;

    for mut space in store.spaces_by_ids(&user.space_ids)? {
        let mut space_changed = false;
        for mut task in store.tasks_by_ids(&space.task_ids)? {
            let Some(deadline) = task.deadline else { continue };
            if deadline >= today {
                continue;
            }

            if task.is_completed {
                has_completed_activity = true;
            } else if task.frequency == Frequency::None {
                space_changed |= space.detach_task(&task.id);
                store.delete_task(&task.id)?;
                outcome.tasks_deleted += 1;
                debug!(task = %task.id, "deadline sweep: deleted lapsed one-shot task");
            } else {
                task.reset();
                store.save_task(&task)?;
                outcome.tasks_reset += 1;
            }
        }
        if space_changed {
            store.save_space(&space)?;
        }
    }

    if !has_completed_activity && !user.streak_freeze_active {
        user.streak_broken = true;
        user.streak = 0;
        user.health_penalty();
        user.coin_penalty();
        store.save_user(user)?;
        outcome.streak_broken = true;
    }
    Ok(outcome)
}

/// Daily HP penalty: users at zero health bleed coins until they heal.
pub fn hp_penalty_sweep<S: UserStore>(store: &mut S) -> SweepStats {
    let mut stats = SweepStats::default();
    let users = match store.users() {
        Ok(users) => users,
        Err(e) => {
            warn!(error = %e, "hp penalty sweep: listing users failed");
            stats.failures += 1;
            return stats;
        }
    };

    for mut user in users {
        stats.users_processed += 1;
        if user.health > 0 {
            continue;
        }
        user.coin_penalty();
        if let Err(e) = store.save_user(&user) {
            warn!(user = %user.id, error = %e, "hp penalty sweep: save failed");
            stats.failures += 1;
        } else {
            stats.users_updated += 1;
        }
    }
    stats
}

/// Daily flag clear: `streak_broken` is a one-day marker, the zeroed streak
/// count itself stays.
pub fn clear_broken_streaks<S: UserStore>(store: &mut S) -> SweepStats {
    let mut stats = SweepStats::default();
    let users = match store.users() {
        Ok(users) => users,
        Err(e) => {
            warn!(error = %e, "streak flag sweep: listing users failed");
            stats.failures += 1;
            return stats;
        }
    };

    for mut user in users {
        stats.users_processed += 1;
        if !user.streak_broken {
            continue;
        }
        user.streak_broken = false;
        if let Err(e) = store.save_user(&user) {
            warn!(user = %user.id, error = %e, "streak flag sweep: save failed");
            stats.failures += 1;
        } else {
            stats.users_updated += 1;
        }
    }
    stats
}

/// Hourly expiry of timed effects. Both lazy resets run on every user;
/// the user is persisted only when one of them reports a change.
pub fn expire_timed_effects<S: UserStore>(store: &mut S, now: DateTime<Utc>) -> SweepStats {
    let mut stats = SweepStats::default();
    let users = match store.users() {
        Ok(users) => users,
        Err(e) => {
            warn!(error = %e, "effect expiry sweep: listing users failed");
            stats.failures += 1;
            return stats;
        }
    };

    for mut user in users {
        stats.users_processed += 1;
        let freeze_cleared = user.streak_freeze_reset(now);
        let boost_cleared = user.xp_factor_reset(now);
        if !(freeze_cleared || boost_cleared) {
            continue;
        }
        debug!(user = %user.id, freeze_cleared, boost_cleared, "timed effect expired");
        if let Err(e) = store.save_user(&user) {
            warn!(user = %user.id, error = %e, "effect expiry sweep: save failed");
            stats.failures += 1;
        } else {
            stats.users_updated += 1;
        }
    }
    stats
}
