use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::submissions::domain::{
    ProblemId, ProblemSummary, SubmissionEvent, SubmissionId, SubmissionRecord, UserId,
    UserProgress,
};
use crate::submissions::repository::{
    ProblemCatalog, ProgressStore, StoreError, SubmissionStore,
};
use crate::submissions::service::{Clock, SubmissionIntake};
use crate::submissions::verdict::Verdict;
use crate::submissions::AdmissionPolicy;

/// Fixed reference instant: mid-day so same-day seeds have room on both sides.
pub(super) fn base_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn user() -> UserId {
    UserId("user-1".to_string())
}

pub(super) fn problem() -> ProblemId {
    ProblemId("two-sum".to_string())
}

pub(super) fn accepted_event(problem_id: &str) -> SubmissionEvent {
    SubmissionEvent {
        problem_id: ProblemId(problem_id.to_string()),
        code: "fn main() {}".to_string(),
        language: "rust".to_string(),
        judge_status_code: Some(3),
        reported_verdict: None,
        output: Some("ok".to_string()),
        runtime_ms: Some(12),
        memory_bytes: Some(1024),
        error_text: None,
        stderr: None,
        passed_test_cases: Some(10),
        total_test_cases: Some(10),
        execution_details: None,
    }
}

pub(super) fn wrong_answer_event(problem_id: &str) -> SubmissionEvent {
    SubmissionEvent {
        judge_status_code: Some(4),
        passed_test_cases: Some(3),
        error_text: Some("expected 4, got 5".to_string()),
        ..accepted_event(problem_id)
    }
}

pub(super) fn record_at(
    user: &UserId,
    problem: &ProblemId,
    seq: u64,
    submitted_at: DateTime<Utc>,
) -> SubmissionRecord {
    SubmissionRecord {
        id: SubmissionId(format!("seed-{seq:08}")),
        user_id: user.clone(),
        problem_id: problem.clone(),
        language: "rust".to_string(),
        verdict: Verdict::WrongAnswer,
        submitted_at,
        runtime_ms: None,
        memory_bytes: None,
        passed_test_cases: None,
        total_test_cases: None,
        output: None,
        error_text: None,
        execution_details: None,
    }
}

#[derive(Default, Clone)]
pub(super) struct MemorySubmissionStore {
    records: Arc<Mutex<Vec<SubmissionRecord>>>,
}

impl MemorySubmissionStore {
    pub(super) fn all(&self) -> Vec<SubmissionRecord> {
        self.records.lock().expect("store mutex poisoned").clone()
    }

    pub(super) fn seed(&self, record: SubmissionRecord) {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .push(record);
    }
}

impl SubmissionStore for MemorySubmissionStore {
    fn append(&self, record: SubmissionRecord) -> Result<SubmissionRecord, StoreError> {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .push(record.clone());
        Ok(record)
    }

    fn latest_for_user(&self, user: &UserId) -> Result<Option<SubmissionRecord>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.user_id == user)
            .max_by(|a, b| {
                a.submitted_at
                    .cmp(&b.submitted_at)
                    .then_with(|| a.id.cmp(&b.id))
            })
            .cloned())
    }

    fn count_for_user_since(
        &self,
        user: &UserId,
        since: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.user_id == user && record.submitted_at >= since)
            .count() as u64)
    }

    fn count_for_user_and_problem_since(
        &self,
        user: &UserId,
        problem: &ProblemId,
        since: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| {
                &record.user_id == user
                    && &record.problem_id == problem
                    && record.submitted_at >= since
            })
            .count() as u64)
    }

    fn recent_for_user(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<SubmissionRecord>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        let mut matching: Vec<SubmissionRecord> = guard
            .iter()
            .filter(|record| &record.user_id == user)
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.submitted_at
                .cmp(&a.submitted_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        matching.truncate(limit);
        Ok(matching)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryProgressStore {
    rows: Arc<Mutex<HashMap<UserId, UserProgress>>>,
}

impl MemoryProgressStore {
    pub(super) fn seed_user(&self, user: &UserId) {
        self.rows
            .lock()
            .expect("progress mutex poisoned")
            .insert(user.clone(), UserProgress::new(user.clone()));
    }

    pub(super) fn get(&self, user: &UserId) -> Option<UserProgress> {
        self.rows
            .lock()
            .expect("progress mutex poisoned")
            .get(user)
            .cloned()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn fetch(&self, user: &UserId) -> Result<Option<UserProgress>, StoreError> {
        Ok(self
            .rows
            .lock()
            .expect("progress mutex poisoned")
            .get(user)
            .cloned())
    }

    fn save(&self, progress: UserProgress) -> Result<(), StoreError> {
        self.rows
            .lock()
            .expect("progress mutex poisoned")
            .insert(progress.user_id.clone(), progress);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryCatalog {
    problems: Arc<Mutex<HashMap<ProblemId, u32>>>,
}

impl MemoryCatalog {
    pub(super) fn seed_problem(&self, id: &str, points: u32) {
        self.problems
            .lock()
            .expect("catalog mutex poisoned")
            .insert(ProblemId(id.to_string()), points);
    }
}

impl ProblemCatalog for MemoryCatalog {
    fn points_for(&self, problem: &ProblemId) -> Result<Option<ProblemSummary>, StoreError> {
        Ok(self
            .problems
            .lock()
            .expect("catalog mutex poisoned")
            .get(problem)
            .map(|points| ProblemSummary {
                id: problem.clone(),
                points: *points,
            }))
    }
}

/// Submission store that fails every call, for persistence-error paths.
pub(super) struct UnavailableSubmissionStore;

impl SubmissionStore for UnavailableSubmissionStore {
    fn append(&self, _record: SubmissionRecord) -> Result<SubmissionRecord, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn latest_for_user(&self, _user: &UserId) -> Result<Option<SubmissionRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn count_for_user_since(
        &self,
        _user: &UserId,
        _since: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn count_for_user_and_problem_since(
        &self,
        _user: &UserId,
        _problem: &ProblemId,
        _since: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn recent_for_user(
        &self,
        _user: &UserId,
        _limit: usize,
    ) -> Result<Vec<SubmissionRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub(super) fn at(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub(super) fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().expect("clock mutex poisoned");
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

pub(super) struct Harness {
    pub(super) intake:
        SubmissionIntake<MemorySubmissionStore, MemoryProgressStore, MemoryCatalog>,
    pub(super) submissions: Arc<MemorySubmissionStore>,
    pub(super) progress: Arc<MemoryProgressStore>,
    pub(super) catalog: Arc<MemoryCatalog>,
    pub(super) clock: Arc<ManualClock>,
}

/// Full intake wired to in-memory stores, one seeded user, two seeded
/// problems, and a manual clock parked at [`base_instant`].
pub(super) fn harness() -> Harness {
    harness_with_policy(AdmissionPolicy::default())
}

pub(super) fn harness_with_policy(policy: AdmissionPolicy) -> Harness {
    let submissions = Arc::new(MemorySubmissionStore::default());
    let progress = Arc::new(MemoryProgressStore::default());
    let catalog = Arc::new(MemoryCatalog::default());
    let clock = Arc::new(ManualClock::at(base_instant()));

    progress.seed_user(&user());
    catalog.seed_problem("two-sum", 10);
    catalog.seed_problem("reverse-list", 25);

    let intake = SubmissionIntake::with_clock(
        submissions.clone(),
        progress.clone(),
        catalog.clone(),
        policy,
        clock.clone(),
    );

    Harness {
        intake,
        submissions,
        progress,
        catalog,
        clock,
    }
}
