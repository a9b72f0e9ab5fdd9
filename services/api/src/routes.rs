use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

use codeclub::submissions::{
    submission_router, ProblemCatalog, ProgressStore, SubmissionIntake, SubmissionStore,
};

pub(crate) fn with_submission_routes<S, P, C>(
    service: Arc<SubmissionIntake<S, P, C>>,
) -> axum::Router
where
    S: SubmissionStore + 'static,
    P: ProgressStore + 'static,
    C: ProblemCatalog + 'static,
{
    submission_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{
        seed_starter_data, InMemoryProblemCatalog, InMemoryProgressStore, InMemorySubmissionStore,
    };
    use axum::body::Body;
    use axum::http::Request;
    use codeclub::submissions::AdmissionPolicy;
    use tower::ServiceExt;

    fn test_router() -> axum::Router {
        let submissions = Arc::new(InMemorySubmissionStore::default());
        let progress = Arc::new(InMemoryProgressStore::default());
        let catalog = Arc::new(InMemoryProblemCatalog::default());
        seed_starter_data(&progress, &catalog);

        let intake = SubmissionIntake::new(
            submissions,
            progress,
            catalog,
            AdmissionPolicy::default(),
        );
        with_submission_routes(Arc::new(intake))
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let response = test_router()
            .oneshot(
                Request::get("/health")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn seeded_catalog_serves_submissions_end_to_end() {
        let payload = json!({
            "userId": "demo-user",
            "problemId": "two-sum",
            "code": "fn main() {}",
            "language": "rust",
            "statusId": 3,
        });

        let response = test_router()
            .oneshot(
                Request::post("/api/v1/submissions")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::to_vec(&payload).expect("serializes"),
                    ))
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
    }
}
