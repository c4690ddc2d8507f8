use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryCandidateRegistry, LoggingNotificationPublisher};
use crate::routes::with_pipeline_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use hireflow::config::AppConfig;
use hireflow::error::AppError;
use hireflow::telemetry;
use hireflow::workflows::candidates::ownership::{CandidateOwnershipService, ExpirySweeper};
use std::sync::atomic::Ordering;
use std::sync::Arc;
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

    let registry = Arc::new(InMemoryCandidateRegistry::default());
    let notifications = Arc::new(LoggingNotificationPublisher::default());
    let ownership_service = Arc::new(CandidateOwnershipService::new(
        registry.clone(),
        notifications,
    ));

    let sweeper = ExpirySweeper::new(registry, config.sweeper.interval());
    tokio::spawn(sweeper.run());

    let app = with_pipeline_routes(ownership_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "candidate ownership service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
