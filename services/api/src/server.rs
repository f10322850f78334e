use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;

use renthub::alerts::MatchDispatcher;
use renthub::config::AppConfig;
use renthub::error::AppError;
use renthub::telemetry;
use renthub::verification::VerificationService;

use crate::cli::ServeArgs;
use crate::infra::{
    default_trust_config, AppState, InMemoryAlertPublisher, InMemoryAuditTrail,
    InMemoryMatchRepository, InMemoryNoticePublisher, InMemoryPropertyCatalog,
    InMemoryReferenceRepository, InMemorySavedSearchRepository, InMemoryVerificationRepository,
};
use crate::routes::app_router;

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

    let verification = Arc::new(VerificationService::new(
        Arc::new(InMemoryVerificationRepository::default()),
        Arc::new(InMemoryReferenceRepository::default()),
        Arc::new(InMemoryAuditTrail::default()),
        Arc::new(InMemoryNoticePublisher::default()),
        default_trust_config(),
    ));
    let dispatcher = Arc::new(MatchDispatcher::new(
        Arc::new(InMemorySavedSearchRepository::default()),
        Arc::new(InMemoryMatchRepository::default()),
        Arc::new(InMemoryPropertyCatalog::default()),
        Arc::new(InMemoryAlertPublisher::default()),
    ));

    let app = app_router(verification, dispatcher)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "renthub core services ready");

    axum::serve(listener, app).await?;
    Ok(())
}
