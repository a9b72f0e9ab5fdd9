use chrono::{DateTime, Utc};

use super::domain::{ProblemId, ProblemSummary, SubmissionRecord, UserId, UserProgress};

/// Append-only store of submission records, with the bounded range queries
/// the admission gate re-derives its counts from on every check.
pub trait SubmissionStore: Send + Sync {
    /// Persists a new record. Records are immutable once written; there is
    /// no update or delete.
    fn append(&self, record: SubmissionRecord) -> Result<SubmissionRecord, StoreError>;

    /// The user's single most recent record by timestamp. Implementations
    /// must break timestamp ties by highest id.
    fn latest_for_user(&self, user: &UserId) -> Result<Option<SubmissionRecord>, StoreError>;

    /// Count of the user's records with `submitted_at >= since`.
    fn count_for_user_since(&self, user: &UserId, since: DateTime<Utc>)
        -> Result<u64, StoreError>;

    /// Count of the user's records for one problem with `submitted_at >= since`.
    fn count_for_user_and_problem_since(
        &self,
        user: &UserId,
        problem: &ProblemId,
        since: DateTime<Utc>,
    ) -> Result<u64, StoreError>;

    /// Up to `limit` of the user's most recent records, newest first, with
    /// the same tie-break as [`Self::latest_for_user`].
    fn recent_for_user(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<SubmissionRecord>, StoreError>;
}

/// Storage for the per-user progress aggregate. A missing row means the user
/// is unknown to the platform; registration seeds an empty aggregate.
pub trait ProgressStore: Send + Sync {
    fn fetch(&self, user: &UserId) -> Result<Option<UserProgress>, StoreError>;
    fn save(&self, progress: UserProgress) -> Result<(), StoreError>;
}

/// Catalog lookup collaborator: resolves a problem id to its point value.
pub trait ProblemCatalog: Send + Sync {
    fn points_for(&self, problem: &ProblemId) -> Result<Option<ProblemSummary>, StoreError>;
}

/// Store failures. Read-side checks may be retried by the caller; the record
/// append must not be blindly retried, since submissions carry no idempotency
/// key and a retry after a timeout risks a duplicate record.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store call timed out: {0}")]
    Timeout(String),
}
