//! Task entity and its completion state machine.
//!
//! A task owns its completion log and decides, from that log alone,
//! whether an attempt is accepted or still on cooldown and whether the
//! current period's repeat target has been met. All decisions take `now`
//! as an explicit input; nothing here reads a clock.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::duration::DurationSpec;
use crate::error::{Result, ValidationError};
use crate::period::Frequency;

/// Cooldown applied to non-time-based tasks on a DAILY frequency. Swallows
/// accidental double submissions rather than enforcing a real gap.
pub const DUPLICATE_GUARD_MINUTES: i64 = 1;

/// How long completion records are retained before pruning.
pub const RETENTION_DAYS: i64 = 90;

/// A single recorded completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub at: DateTime<Utc>,
    pub user_id: String,
    /// Canonical minutes of the task's duration at completion time.
    pub duration_minutes: u32,
}

/// Outcome of a completion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CompletionOutcome {
    /// The completion was recorded. `period_completed` is true when the
    /// current period's target is now met, which the orchestrator turns
    /// into a streak-break clear on the user.
    Accepted { period_completed: bool },
    /// A cooldown from an earlier completion by the same user is still
    /// active. Nothing was recorded; the retention prune still applies.
    OnCooldown,
}

/// A recurring (or one-shot) habit task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub title: String,
    /// Raw duration string as the user entered it (`"30min"`, `"2km"`, ...).
    pub duration: String,
    pub deadline: Option<NaiveDate>,
    /// Repeat target per period, always >= 1.
    pub times: u32,
    pub frequency: Frequency,
    /// Cached period-completion flag; always recomputable from the log.
    pub is_completed: bool,
    pub reward_xp: u32,
    pub reward_coins: u32,
    pub space_id: String,
    #[serde(default)]
    pub completions: Vec<Completion>,
}

impl Task {
    /// Create a task with an empty completion log.
    ///
    /// Validates the duration string and the `times >= 1` invariant so that
    /// every later computation may rely on both.
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        duration: impl Into<String>,
        frequency: Frequency,
        times: u32,
        space_id: impl Into<String>,
    ) -> Result<Self> {
        if times == 0 {
            return Err(ValidationError::InvalidValue {
                field: "times".to_string(),
                message: "repeat target must be at least 1".to_string(),
            }
            .into());
        }
        let duration = duration.into();
        DurationSpec::parse(&duration)?;

        Ok(Task {
            id: format!("task-{}", Uuid::new_v4()),
            user_id: user_id.into(),
            title: title.into(),
            duration,
            deadline: None,
            times,
            frequency,
            is_completed: false,
            reward_xp: 0,
            reward_coins: 0,
            space_id: space_id.into(),
            completions: Vec::new(),
        })
    }

    /// Change the user-editable fields, revalidating the duration.
    pub fn edit(
        &mut self,
        title: impl Into<String>,
        duration: impl Into<String>,
        frequency: Frequency,
    ) -> Result<()> {
        let duration = duration.into();
        DurationSpec::parse(&duration)?;
        self.title = title.into();
        self.duration = duration;
        self.frequency = frequency;
        Ok(())
    }

    // ── Completion state machine ─────────────────────────────────────

    /// Record a completion attempt by `user_id` at `now`.
    ///
    /// Completions older than the retention window are pruned first, and
    /// that prune holds even when the attempt lands on cooldown -- callers
    /// persist the task in both cases.
    pub fn attempt_completion(
        &mut self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<CompletionOutcome> {
        let spec = DurationSpec::parse(&self.duration)?;

        self.prune_old_completions(now);

        if let Some(last_at) = self.last_completion_for(user_id).map(|c| c.at) {
            if self.cooldown_active(last_at, spec, now) {
                return Ok(CompletionOutcome::OnCooldown);
            }
        }

        self.completions.push(Completion {
            at: now,
            user_id: user_id.to_string(),
            duration_minutes: spec.minutes(),
        });

        let period_completed = self.is_period_completed(now);
        if period_completed {
            self.is_completed = true;
        }
        Ok(CompletionOutcome::Accepted { period_completed })
    }

    /// Whether the current period's repeat target is met. No mutation.
    pub fn is_period_completed(&self, now: DateTime<Utc>) -> bool {
        self.current_period_count(now) >= self.times as usize
    }

    /// Completions still needed in the current period.
    pub fn remaining_completions(&self, now: DateTime<Utc>) -> u32 {
        if self.is_completed {
            return 0;
        }
        (self.times as usize).saturating_sub(self.current_period_count(now)) as u32
    }

    /// Re-derive the cached `is_completed` flag from the completion log.
    ///
    /// A most-recent completion outside the current period means the period
    /// rolled over since the flag was last written, so it is forced false.
    /// Idempotent.
    pub fn refresh_completion_status(&mut self, now: DateTime<Utc>) {
        // Ties on the timestamp resolve to the highest insertion index
        // (max_by_key keeps the last maximum).
        let Some(last_at) = self.completions.iter().max_by_key(|c| c.at).map(|c| c.at) else {
            self.is_completed = false;
            return;
        };

        if !self
            .frequency
            .same_period(now.date_naive(), last_at.date_naive())
        {
            self.is_completed = false;
        } else {
            self.is_completed = self.is_period_completed(now);
        }
    }

    /// Clear the completion log and the cached flag (deadline rollover).
    pub fn reset(&mut self) {
        self.completions.clear();
        self.is_completed = false;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn prune_old_completions(&mut self, now: DateTime<Utc>) {
        let cutoff = now - Duration::days(RETENTION_DAYS);
        self.completions.retain(|c| c.at > cutoff);
    }

    fn last_completion_for(&self, user_id: &str) -> Option<&Completion> {
        self.completions
            .iter()
            .filter(|c| c.user_id == user_id)
            .max_by_key(|c| c.at)
    }

    fn cooldown_active(&self, last_at: DateTime<Utc>, spec: DurationSpec, now: DateTime<Utc>) -> bool {
        match spec {
            DurationSpec::Minutes(m) => now < last_at + Duration::minutes(i64::from(m)),
            DurationSpec::NonTime => {
                if self.frequency == Frequency::Daily {
                    now < last_at + Duration::minutes(DUPLICATE_GUARD_MINUTES)
                } else {
                    // At most one completion per calendar day.
                    last_at.date_naive() == now.date_naive()
                }
            }
        }
    }

    fn current_period_count(&self, now: DateTime<Utc>) -> usize {
        let today = now.date_naive();
        self.completions
            .iter()
            .filter(|c| self.frequency.same_period(today, c.at.date_naive()))
            .count()
    }
}
