//! Submission admission control and progress ledger.
//!
//! One-way data flow per event: intake validation, gate check, verdict
//! classification, record append, ledger/streak update. Each component is
//! exercised in isolation against the store traits in `repository`.

pub mod domain;
pub mod gate;
pub mod ledger;
pub mod repository;
pub mod router;
pub mod service;
pub mod streak;
pub mod verdict;

#[cfg(test)]
mod tests;

pub use domain::{
    ProblemId, ProblemSummary, ProgressSnapshot, SubmissionEvent, SubmissionId, SubmissionRecord,
    UserId, UserProgress,
};
pub use gate::{AdmissionDecision, AdmissionGate, AdmissionPolicy, AdmissionRejection, LimitsView};
pub use repository::{ProblemCatalog, ProgressStore, StoreError, SubmissionStore};
pub use router::submission_router;
pub use service::{Clock, IntakeError, SubmissionIntake, SubmissionOutcome, SystemClock};
pub use verdict::Verdict;
