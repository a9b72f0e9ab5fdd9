use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::domain::{ProgressSnapshot, SubmissionEvent, SubmissionId, SubmissionRecord, UserId};
use super::gate::{AdmissionDecision, AdmissionGate, AdmissionPolicy, AdmissionRejection, LimitsView};
use super::ledger;
use super::repository::{ProblemCatalog, ProgressStore, StoreError, SubmissionStore};
use super::streak;
use super::verdict::Verdict;

/// Time source seam so tests can pin the clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

static SUBMISSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

// Padded to the full u64 width so lexicographic id order always matches
// issue order; the stores' timestamp tie-break relies on that.
fn next_submission_id() -> SubmissionId {
    let id = SUBMISSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SubmissionId(format!("sub-{id:020}"))
}

/// Per-user serialization point for check-then-act sequences.
///
/// The gate's quota checks and the subsequent record append race if two
/// attempts from one user interleave; holding this lock across
/// evaluate-then-append admits at most one of them.
#[derive(Default)]
struct UserLocks {
    inner: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl UserLocks {
    /// Hands out the lock for one user, evicting locks nobody holds so the
    /// registry stays bounded by the number of in-flight users.
    fn for_user(&self, user: &UserId) -> Arc<Mutex<()>> {
        let mut registry = self.inner.lock().expect("user lock registry poisoned");
        registry.retain(|_, lock| Arc::strong_count(lock) > 1);
        registry
            .entry(user.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Result of one admitted submission event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub submission: SubmissionRecord,
    pub progress: ProgressSnapshot,
}

/// Orchestrates one submission event: admission gate, verdict mapping,
/// record persistence, then streak and ledger updates.
pub struct SubmissionIntake<S, P, C> {
    gate: AdmissionGate<S>,
    submissions: Arc<S>,
    progress: Arc<P>,
    problems: Arc<C>,
    clock: Arc<dyn Clock>,
    locks: UserLocks,
}

impl<S, P, C> SubmissionIntake<S, P, C>
where
    S: SubmissionStore + 'static,
    P: ProgressStore + 'static,
    C: ProblemCatalog + 'static,
{
    pub fn new(
        submissions: Arc<S>,
        progress: Arc<P>,
        problems: Arc<C>,
        policy: AdmissionPolicy,
    ) -> Self {
        Self::with_clock(submissions, progress, problems, policy, Arc::new(SystemClock))
    }

    pub fn with_clock(
        submissions: Arc<S>,
        progress: Arc<P>,
        problems: Arc<C>,
        policy: AdmissionPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let gate = AdmissionGate::new(submissions.clone(), policy);
        Self {
            gate,
            submissions,
            progress,
            problems,
            clock,
            locks: UserLocks::default(),
        }
    }

    /// Runs the full intake sequence for one attempt. Either every step
    /// completes and the persisted record is returned, or the specific
    /// failure is reported with no ledger or streak mutation past it.
    pub fn submit(
        &self,
        user: UserId,
        event: SubmissionEvent,
    ) -> Result<SubmissionOutcome, IntakeError> {
        event.validate().map_err(IntakeError::Invalid)?;

        let lock = self.locks.for_user(&user);
        let _serialized = lock.lock().expect("user lock poisoned");

        let mut progress = self
            .progress
            .fetch(&user)?
            .ok_or_else(|| IntakeError::UserNotFound(user.clone()))?;
        let problem = self
            .problems
            .points_for(&event.problem_id)?
            .ok_or_else(|| IntakeError::ProblemNotFound(event.problem_id.clone()))?;

        let now = self.clock.now();
        match self.gate.evaluate(&user, &event.problem_id, now)? {
            AdmissionDecision::Allow => {}
            AdmissionDecision::Reject(rejection) => {
                debug!(user = %user.0, problem = %event.problem_id.0, ?rejection, "submission rejected");
                return Err(IntakeError::Rejected(rejection));
            }
        }

        let verdict = resolve_verdict(&event);
        let record = build_record(next_submission_id(), user.clone(), verdict, now, event);
        let record = self.submissions.append(record)?;

        let today = self.gate.policy().local_date(now);
        let streak_update = streak::advance(&mut progress, today);
        let awarded = verdict.is_accepted() && ledger::record_solve(&mut progress, &problem);
        self.progress.save(progress.clone())?;

        info!(
            user = %user.0,
            problem = %record.problem_id.0,
            verdict = verdict.label(),
            awarded,
            ?streak_update,
            "submission recorded"
        );

        Ok(SubmissionOutcome {
            submission: record,
            progress: progress.snapshot(),
        })
    }

    /// Remaining quota for a user, optionally scoped to one problem. Pure
    /// read; safe to call without affecting any counter.
    pub fn limits(
        &self,
        user: &UserId,
        problem: Option<&super::domain::ProblemId>,
    ) -> Result<LimitsView, IntakeError> {
        self.progress
            .fetch(user)?
            .ok_or_else(|| IntakeError::UserNotFound(user.clone()))?;
        Ok(self.gate.limits(user, problem, self.clock.now())?)
    }

    /// The user's most recent submissions, newest first, capped at `limit`.
    /// Diagnostic read for the history view; never consulted by the gate.
    pub fn recent(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<SubmissionRecord>, IntakeError> {
        self.progress
            .fetch(user)?
            .ok_or_else(|| IntakeError::UserNotFound(user.clone()))?;
        Ok(self.submissions.recent_for_user(user, limit)?)
    }

    /// Read-only progress snapshot for the stats collaborator.
    pub fn progress(&self, user: &UserId) -> Result<ProgressSnapshot, IntakeError> {
        let progress = self
            .progress
            .fetch(user)?
            .ok_or_else(|| IntakeError::UserNotFound(user.clone()))?;
        Ok(progress.snapshot())
    }
}

/// Verdict from the judge status code, falling back to the caller-supplied
/// label when the code is absent.
fn resolve_verdict(event: &SubmissionEvent) -> Verdict {
    match event.judge_status_code {
        Some(code) => Verdict::from_status(Some(code)),
        None => event
            .reported_verdict
            .as_deref()
            .and_then(Verdict::from_label)
            .unwrap_or(Verdict::Unknown),
    }
}

fn build_record(
    id: SubmissionId,
    user: UserId,
    verdict: Verdict,
    submitted_at: DateTime<Utc>,
    event: SubmissionEvent,
) -> SubmissionRecord {
    // Error text only makes sense for non-accepted outcomes.
    let error_text = if verdict.is_accepted() {
        None
    } else {
        event.error_text.or(event.stderr)
    };

    SubmissionRecord {
        id,
        user_id: user,
        problem_id: event.problem_id,
        language: event.language,
        verdict,
        submitted_at,
        runtime_ms: event.runtime_ms,
        memory_bytes: event.memory_bytes,
        passed_test_cases: event.passed_test_cases,
        total_test_cases: event.total_test_cases,
        output: event.output,
        error_text,
        execution_details: event.execution_details,
    }
}


/// Terminal failures for one submission event. None of these are swallowed;
/// the HTTP layer maps each to its own status code.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("user not found: {}", .0 .0)]
    UserNotFound(UserId),
    #[error("problem not found: {}", .0 .0)]
    ProblemNotFound(super::domain::ProblemId),
    #[error("submission rejected: {0:?}")]
    Rejected(AdmissionRejection),
    #[error("invalid submission: {0}")]
    Invalid(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
