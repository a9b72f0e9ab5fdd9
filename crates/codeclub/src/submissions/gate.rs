use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Offset, TimeZone, Utc};
use serde::Serialize;

use crate::config::LimitsConfig;

use super::domain::{ProblemId, UserId};
use super::repository::{StoreError, SubmissionStore};

/// Quota and spacing rules applied to every submission attempt.
///
/// `day_offset` fixes the calendar-day boundary for the daily counters. The
/// platform runs all users on one configured offset; a per-user timezone
/// would be more correct for a multi-region user base but is a deliberate
/// deployment-level choice here.
#[derive(Debug, Clone)]
pub struct AdmissionPolicy {
    pub daily_limit: u32,
    pub per_problem_limit: u32,
    pub cooldown: Duration,
    pub day_offset: FixedOffset,
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self {
            daily_limit: 100,
            per_problem_limit: 50,
            cooldown: Duration::milliseconds(2000),
            day_offset: Utc.fix(),
        }
    }
}

impl AdmissionPolicy {
    pub fn from_config(config: &LimitsConfig) -> Self {
        Self {
            daily_limit: config.daily_limit,
            per_problem_limit: config.per_problem_limit,
            cooldown: Duration::milliseconds(config.cooldown_ms as i64),
            day_offset: config.day_offset,
        }
    }

    /// UTC instant of local midnight for the calendar day containing `now`.
    pub fn start_of_today(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local_midnight = now
            .with_timezone(&self.day_offset)
            .date_naive()
            .and_time(NaiveTime::MIN);
        let offset = Duration::seconds(i64::from(self.day_offset.local_minus_utc()));
        Utc.from_utc_datetime(&(local_midnight - offset))
    }

    /// Calendar date of `now` under the configured day boundary, as fed to
    /// the streak tracker.
    pub fn local_date(&self, now: DateTime<Utc>) -> chrono::NaiveDate {
        now.with_timezone(&self.day_offset).date_naive()
    }
}

/// Why an attempt was turned away. The HTTP layer owns the wire shape for
/// each reason, including its human-readable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionRejection {
    Cooldown { wait_seconds: u64 },
    DailyLimit { limit: u32 },
    ProblemLimit { limit: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    Allow,
    Reject(AdmissionRejection),
}

/// Read-only projection of the gate's checks for the limits endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitsView {
    pub remaining_daily: u32,
    pub daily_limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_problem: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem_limit: Option<u32>,
    pub can_submit_now: bool,
    pub cooldown_seconds_remaining: u64,
}

/// Decides whether a submission attempt may proceed.
///
/// The gate is a pure query over submission history: it never writes, and it
/// re-derives every count from the store so that multiple server instances
/// agree. Callers that need atomicity against concurrent attempts must hold
/// the per-user serialization lock around evaluate-then-append (the intake
/// service does).
pub struct AdmissionGate<S> {
    store: Arc<S>,
    policy: AdmissionPolicy,
}

impl<S: SubmissionStore> AdmissionGate<S> {
    pub fn new(store: Arc<S>, policy: AdmissionPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &AdmissionPolicy {
        &self.policy
    }

    /// Runs the three checks in order: cooldown, daily quota, per-problem
    /// quota. The first failing check becomes the rejection reason.
    pub fn evaluate(
        &self,
        user: &UserId,
        problem: &ProblemId,
        now: DateTime<Utc>,
    ) -> Result<AdmissionDecision, StoreError> {
        if let Some(wait_seconds) = self.cooldown_remaining(user, now)? {
            return Ok(AdmissionDecision::Reject(AdmissionRejection::Cooldown {
                wait_seconds,
            }));
        }

        let start_of_today = self.policy.start_of_today(now);

        let daily = self.store.count_for_user_since(user, start_of_today)?;
        if daily >= u64::from(self.policy.daily_limit) {
            return Ok(AdmissionDecision::Reject(AdmissionRejection::DailyLimit {
                limit: self.policy.daily_limit,
            }));
        }

        let per_problem = self
            .store
            .count_for_user_and_problem_since(user, problem, start_of_today)?;
        if per_problem >= u64::from(self.policy.per_problem_limit) {
            return Ok(AdmissionDecision::Reject(
                AdmissionRejection::ProblemLimit {
                    limit: self.policy.per_problem_limit,
                },
            ));
        }

        Ok(AdmissionDecision::Allow)
    }

    /// Side-effect-free snapshot of remaining quota for a user (and
    /// optionally one problem).
    pub fn limits(
        &self,
        user: &UserId,
        problem: Option<&ProblemId>,
        now: DateTime<Utc>,
    ) -> Result<LimitsView, StoreError> {
        let start_of_today = self.policy.start_of_today(now);
        let daily = self.store.count_for_user_since(user, start_of_today)?;
        let remaining_daily = u64::from(self.policy.daily_limit).saturating_sub(daily) as u32;

        let (remaining_problem, problem_limit) = match problem {
            Some(problem) => {
                let used = self
                    .store
                    .count_for_user_and_problem_since(user, problem, start_of_today)?;
                let remaining =
                    u64::from(self.policy.per_problem_limit).saturating_sub(used) as u32;
                (Some(remaining), Some(self.policy.per_problem_limit))
            }
            None => (None, None),
        };

        let cooldown_seconds_remaining = self.cooldown_remaining(user, now)?.unwrap_or(0);

        Ok(LimitsView {
            remaining_daily,
            daily_limit: self.policy.daily_limit,
            remaining_problem,
            problem_limit,
            can_submit_now: cooldown_seconds_remaining == 0,
            cooldown_seconds_remaining,
        })
    }

    /// Seconds (rounded up) until the cooldown clears, or `None` when the
    /// user may submit immediately. The most recent record is resolved by
    /// timestamp with ties broken by highest id (see `SubmissionStore`).
    fn cooldown_remaining(
        &self,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<u64>, StoreError> {
        let Some(latest) = self.store.latest_for_user(user)? else {
            return Ok(None);
        };

        let elapsed = now.signed_duration_since(latest.submitted_at);
        if elapsed >= self.policy.cooldown {
            return Ok(None);
        }

        let remaining_ms = (self.policy.cooldown - elapsed).num_milliseconds().max(0) as u64;
        Ok(Some(remaining_ms.div_ceil(1000)))
    }
}
