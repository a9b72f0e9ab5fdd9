use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ProblemId, SubmissionEvent, UserId};
use super::gate::AdmissionRejection;
use super::repository::{ProblemCatalog, ProgressStore, SubmissionStore};
use super::service::{IntakeError, SubmissionIntake};

/// Wire payload for a solution attempt. The caller's identity has already
/// been resolved upstream; it arrives here as a plain user id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSolutionRequest {
    pub user_id: String,
    pub problem_id: String,
    pub code: String,
    pub language: String,
    #[serde(default)]
    pub status_id: Option<i32>,
    /// Legacy caller-computed verdict, honored only when `status_id` is absent.
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub runtime: Option<u64>,
    #[serde(default)]
    pub memory: Option<u64>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub passed_test_cases: Option<u32>,
    #[serde(default)]
    pub total_test_cases: Option<u32>,
    #[serde(default)]
    pub execution_details: Option<BTreeMap<String, serde_json::Value>>,
}

impl SubmitSolutionRequest {
    fn into_parts(self) -> (UserId, SubmissionEvent) {
        let user = UserId(self.user_id);
        let event = SubmissionEvent {
            problem_id: ProblemId(self.problem_id),
            code: self.code,
            language: self.language,
            judge_status_code: self.status_id,
            reported_verdict: self.result,
            output: self.output,
            runtime_ms: self.runtime,
            memory_bytes: self.memory,
            error_text: self.error_message,
            stderr: self.stderr,
            passed_test_cases: self.passed_test_cases,
            total_test_cases: self.total_test_cases,
            execution_details: self.execution_details,
        };
        (user, event)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitsQuery {
    pub user_id: String,
    #[serde(default)]
    pub problem_id: Option<String>,
}

/// Caps the history read so a caller cannot request the whole log.
const MAX_HISTORY_LIMIT: usize = 100;
const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Router builder exposing the intake, limits-introspection, and progress
/// endpoints.
pub fn submission_router<S, P, C>(service: Arc<SubmissionIntake<S, P, C>>) -> Router
where
    S: SubmissionStore + 'static,
    P: ProgressStore + 'static,
    C: ProblemCatalog + 'static,
{
    Router::new()
        .route("/api/v1/submissions", post(submit_handler::<S, P, C>))
        .route(
            "/api/v1/submissions/limits",
            get(limits_handler::<S, P, C>),
        )
        .route(
            "/api/v1/users/:user_id/progress",
            get(progress_handler::<S, P, C>),
        )
        .route(
            "/api/v1/users/:user_id/submissions",
            get(history_handler::<S, P, C>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<S, P, C>(
    State(service): State<Arc<SubmissionIntake<S, P, C>>>,
    axum::Json(request): axum::Json<SubmitSolutionRequest>,
) -> Response
where
    S: SubmissionStore + 'static,
    P: ProgressStore + 'static,
    C: ProblemCatalog + 'static,
{
    let (user, event) = request.into_parts();
    match service.submit(user, event) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => intake_error_response(err),
    }
}

pub(crate) async fn limits_handler<S, P, C>(
    State(service): State<Arc<SubmissionIntake<S, P, C>>>,
    Query(query): Query<LimitsQuery>,
) -> Response
where
    S: SubmissionStore + 'static,
    P: ProgressStore + 'static,
    C: ProblemCatalog + 'static,
{
    let user = UserId(query.user_id);
    let problem = query.problem_id.map(ProblemId);
    match service.limits(&user, problem.as_ref()) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => intake_error_response(err),
    }
}

pub(crate) async fn progress_handler<S, P, C>(
    State(service): State<Arc<SubmissionIntake<S, P, C>>>,
    Path(user_id): Path<String>,
) -> Response
where
    S: SubmissionStore + 'static,
    P: ProgressStore + 'static,
    C: ProblemCatalog + 'static,
{
    match service.progress(&UserId(user_id)) {
        Ok(snapshot) => (StatusCode::OK, axum::Json(snapshot)).into_response(),
        Err(err) => intake_error_response(err),
    }
}

pub(crate) async fn history_handler<S, P, C>(
    State(service): State<Arc<SubmissionIntake<S, P, C>>>,
    Path(user_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Response
where
    S: SubmissionStore + 'static,
    P: ProgressStore + 'static,
    C: ProblemCatalog + 'static,
{
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(MAX_HISTORY_LIMIT);
    match service.recent(&UserId(user_id), limit) {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(err) => intake_error_response(err),
    }
}

fn intake_error_response(err: IntakeError) -> Response {
    match err {
        IntakeError::Rejected(rejection) => rejection_response(rejection),
        IntakeError::UserNotFound(_) | IntakeError::ProblemNotFound(_) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        IntakeError::Invalid(message) => {
            let payload = json!({ "error": message });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        IntakeError::Store(store) => {
            let payload = json!({ "error": store.to_string() });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
    }
}

fn rejection_response(rejection: AdmissionRejection) -> Response {
    let payload = match rejection {
        AdmissionRejection::Cooldown { wait_seconds } => json!({
            "error": "RATE_LIMIT_EXCEEDED",
            "message": "Please wait before submitting again.",
            "cooldownSeconds": wait_seconds,
        }),
        AdmissionRejection::DailyLimit { limit } => json!({
            "error": "DAILY_LIMIT_EXCEEDED",
            "message": "You have exceeded your daily submission limit.",
            "limit": limit,
        }),
        AdmissionRejection::ProblemLimit { limit } => json!({
            "error": "PROBLEM_LIMIT_EXCEEDED",
            "message": "You have exceeded your submission limit for this problem today.",
            "limit": limit,
        }),
    };
    (StatusCode::TOO_MANY_REQUESTS, axum::Json(payload)).into_response()
}
