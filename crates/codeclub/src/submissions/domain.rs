use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for registered users.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Identifier wrapper for catalog problems.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProblemId(pub String);

/// Identifier wrapper for persisted submissions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub String);

/// Inbound solution attempt as reported by the caller after judging.
///
/// The judge's raw response blob travels in `execution_details` for
/// diagnostic display only; nothing in the core branches on its contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionEvent {
    pub problem_id: ProblemId,
    pub code: String,
    pub language: String,
    #[serde(default)]
    pub judge_status_code: Option<i32>,
    /// Caller-supplied verdict string, used only when the judge status code
    /// is absent.
    #[serde(default)]
    pub reported_verdict: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub runtime_ms: Option<u64>,
    #[serde(default)]
    pub memory_bytes: Option<u64>,
    #[serde(default)]
    pub error_text: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub passed_test_cases: Option<u32>,
    #[serde(default)]
    pub total_test_cases: Option<u32>,
    #[serde(default)]
    pub execution_details: Option<BTreeMap<String, serde_json::Value>>,
}

impl SubmissionEvent {
    /// Structural validation, performed before any store interaction.
    pub fn validate(&self) -> Result<(), String> {
        if self.problem_id.0.trim().is_empty() {
            return Err("problemId must not be empty".to_string());
        }
        if self.code.trim().is_empty() {
            return Err("code must not be empty".to_string());
        }
        if self.language.trim().is_empty() {
            return Err("language must not be empty".to_string());
        }
        if let (Some(passed), Some(total)) = (self.passed_test_cases, self.total_test_cases) {
            if passed > total {
                return Err(format!(
                    "passedTestCases ({passed}) must not exceed totalTestCases ({total})"
                ));
            }
        }
        Ok(())
    }
}

/// Persisted submission. Written exactly once per admitted attempt and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: SubmissionId,
    pub user_id: UserId,
    pub problem_id: ProblemId,
    pub language: String,
    pub verdict: super::verdict::Verdict,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passed_test_cases: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_test_cases: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_details: Option<BTreeMap<String, serde_json::Value>>,
}

/// Durable per-user aggregate. Mutated only through the streak tracker and
/// the progress ledger, and saved in a single write per intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub user_id: UserId,
    pub total_points: u32,
    pub problems_solved: u32,
    pub solved_problem_ids: BTreeSet<ProblemId>,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_active_date: Option<NaiveDate>,
}

impl UserProgress {
    /// Fresh aggregate for a newly registered user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            total_points: 0,
            problems_solved: 0,
            solved_problem_ids: BTreeSet::new(),
            current_streak: 0,
            longest_streak: 0,
            last_active_date: None,
        }
    }

    pub fn has_solved(&self, problem_id: &ProblemId) -> bool {
        self.solved_problem_ids.contains(problem_id)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            total_points: self.total_points,
            problems_solved: self.problems_solved,
            current_streak: self.current_streak,
            longest_streak: self.longest_streak,
        }
    }
}

/// Catalog view of a problem: just what the ledger needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemSummary {
    pub id: ProblemId,
    pub points: u32,
}

/// Read-only progress view handed to the stats collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub total_points: u32,
    pub problems_solved: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
}
