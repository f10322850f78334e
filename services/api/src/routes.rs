use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;

use renthub::alerts::{
    alerts_router, AlertPublisher, MatchDispatcher, MatchRepository, PropertyCatalog,
    SavedSearchRepository,
};
use renthub::verification::{
    verification_router, AuditTrail, NotificationPublisher, ReferenceRepository,
    VerificationRepository, VerificationService,
};

use crate::infra::AppState;

/// Compose the two domain routers with the operational endpoints.
pub(crate) fn app_router<R, F, T, N, S, M, P, A>(
    verification: Arc<VerificationService<R, F, T, N>>,
    dispatcher: Arc<MatchDispatcher<S, M, P, A>>,
) -> axum::Router
where
    R: VerificationRepository + 'static,
    F: ReferenceRepository + 'static,
    T: AuditTrail + 'static,
    N: NotificationPublisher + 'static,
    S: SavedSearchRepository + 'static,
    M: MatchRepository + 'static,
    P: PropertyCatalog + 'static,
    A: AlertPublisher + 'static,
{
    verification_router(verification)
        .merge(alerts_router(dispatcher))
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
