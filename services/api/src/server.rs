use crate::cli::ServeArgs;
use crate::infra::{
    seed_starter_data, AppState, InMemoryProblemCatalog, InMemoryProgressStore,
    InMemorySubmissionStore,
};
use crate::routes::with_submission_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use codeclub::config::AppConfig;
use codeclub::error::AppError;
use codeclub::submissions::{AdmissionPolicy, SubmissionIntake};
use codeclub::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let submissions = Arc::new(InMemorySubmissionStore::default());
    let progress = Arc::new(InMemoryProgressStore::default());
    let catalog = Arc::new(InMemoryProblemCatalog::default());
    seed_starter_data(&progress, &catalog);

    let intake = Arc::new(SubmissionIntake::new(
        submissions,
        progress,
        catalog,
        AdmissionPolicy::from_config(&config.limits),
    ));

    let app = with_submission_routes(intake)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "submission service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
