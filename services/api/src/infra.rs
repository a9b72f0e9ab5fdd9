use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use codeclub::submissions::{
    ProblemCatalog, ProblemId, ProblemSummary, ProgressStore, StoreError, SubmissionRecord,
    SubmissionStore, UserId, UserProgress,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Append-only submission log backed by a mutex-guarded vector. The gate
/// only ever scans a single user's recent window, so a linear pass is fine
/// at this scale.
#[derive(Default, Clone)]
pub(crate) struct InMemorySubmissionStore {
    records: Arc<Mutex<Vec<SubmissionRecord>>>,
}

impl SubmissionStore for InMemorySubmissionStore {
    fn append(&self, record: SubmissionRecord) -> Result<SubmissionRecord, StoreError> {
        let mut guard = self.records.lock().expect("submission mutex poisoned");
        guard.push(record.clone());
        Ok(record)
    }

    fn latest_for_user(&self, user: &UserId) -> Result<Option<SubmissionRecord>, StoreError> {
        let guard = self.records.lock().expect("submission mutex poisoned");
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
        let guard = self.records.lock().expect("submission mutex poisoned");
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
        let guard = self.records.lock().expect("submission mutex poisoned");
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
        let guard = self.records.lock().expect("submission mutex poisoned");
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
pub(crate) struct InMemoryProgressStore {
    rows: Arc<Mutex<HashMap<UserId, UserProgress>>>,
}

impl InMemoryProgressStore {
    pub(crate) fn register(&self, user: &str) {
        let id = UserId(user.to_string());
        self.rows
            .lock()
            .expect("progress mutex poisoned")
            .insert(id.clone(), UserProgress::new(id));
    }
}

impl ProgressStore for InMemoryProgressStore {
    fn fetch(&self, user: &UserId) -> Result<Option<UserProgress>, StoreError> {
        let guard = self.rows.lock().expect("progress mutex poisoned");
        Ok(guard.get(user).cloned())
    }

    fn save(&self, progress: UserProgress) -> Result<(), StoreError> {
        let mut guard = self.rows.lock().expect("progress mutex poisoned");
        guard.insert(progress.user_id.clone(), progress);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryProblemCatalog {
    problems: Arc<Mutex<HashMap<ProblemId, u32>>>,
}

impl InMemoryProblemCatalog {
    pub(crate) fn publish(&self, slug: &str, points: u32) {
        self.problems
            .lock()
            .expect("catalog mutex poisoned")
            .insert(ProblemId(slug.to_string()), points);
    }
}

impl ProblemCatalog for InMemoryProblemCatalog {
    fn points_for(&self, problem: &ProblemId) -> Result<Option<ProblemSummary>, StoreError> {
        let guard = self.problems.lock().expect("catalog mutex poisoned");
        Ok(guard.get(problem).map(|points| ProblemSummary {
            id: problem.clone(),
            points: *points,
        }))
    }
}

/// Starter data so the service answers real requests out of the box. A
/// database-backed catalog replaces this wholesale once one is wired in.
pub(crate) fn seed_starter_data(
    progress: &InMemoryProgressStore,
    catalog: &InMemoryProblemCatalog,
) {
    for user in ["demo-user", "demo-admin"] {
        progress.register(user);
    }
    for (slug, points) in [
        ("two-sum", 10),
        ("valid-parentheses", 10),
        ("merge-intervals", 25),
        ("lru-cache", 40),
        ("word-ladder", 60),
    ] {
        catalog.publish(slug, points);
    }
}
