use std::io::Cursor;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::catalog::{self, PropertyId};
use crate::verification::UserId;

use super::dispatcher::{DispatchError, MatchDispatcher};
use super::domain::{AlertFrequency, SavedSearch, SavedSearchId, SearchCriteria};
use super::repository::{
    AlertPublisher, MatchRepository, PropertyCatalog, RepositoryError, SavedSearchRepository,
};

/// Router builder for saved-search management and the dispatch entry points
/// the scheduler and domain-event hooks call.
pub fn alerts_router<S, M, P, A>(dispatcher: Arc<MatchDispatcher<S, M, P, A>>) -> Router
where
    S: SavedSearchRepository + 'static,
    M: MatchRepository + 'static,
    P: PropertyCatalog + 'static,
    A: AlertPublisher + 'static,
{
    Router::new()
        .route("/api/v1/alerts/searches", post(create_search_handler::<S, M, P, A>))
        .route(
            "/api/v1/alerts/searches/:search_id/refresh",
            post(refresh_search_handler::<S, M, P, A>),
        )
        .route(
            "/api/v1/alerts/searches/:search_id/matches",
            get(list_matches_handler::<S, M, P, A>),
        )
        .route(
            "/api/v1/alerts/properties/:property_id/changed",
            post(property_changed_handler::<S, M, P, A>),
        )
        .route(
            "/api/v1/alerts/digest/:frequency",
            post(digest_handler::<S, M, P, A>),
        )
        .route("/api/v1/catalog/feed", post(feed_import_handler::<S, M, P, A>))
        .with_state(dispatcher)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateSearchRequest {
    pub(crate) user_id: String,
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) criteria: SearchCriteria,
    pub(crate) frequency: AlertFrequency,
    #[serde(default = "default_true")]
    pub(crate) alerts_enabled: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct DigestRequest {
    /// Evaluation instant for the throttle; defaults to the current time.
    #[serde(default)]
    pub(crate) as_of: Option<DateTime<Utc>>,
}

pub(crate) async fn create_search_handler<S, M, P, A>(
    State(dispatcher): State<Arc<MatchDispatcher<S, M, P, A>>>,
    axum::Json(payload): axum::Json<CreateSearchRequest>,
) -> Response
where
    S: SavedSearchRepository + 'static,
    M: MatchRepository + 'static,
    P: PropertyCatalog + 'static,
    A: AlertPublisher + 'static,
{
    if payload.name.trim().is_empty() {
        let body = json!({ "error": "search name is required" });
        return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(body)).into_response();
    }

    let search = SavedSearch {
        id: SavedSearchId(Uuid::new_v4().to_string()),
        user_id: UserId(payload.user_id),
        name: payload.name,
        criteria: payload.criteria,
        frequency: payload.frequency,
        is_active: true,
        alerts_enabled: payload.alerts_enabled,
        last_alert_sent_at: None,
        notification_count: 0,
    };

    match dispatcher.create_search(search, Utc::now()) {
        Ok((stored, summary)) => {
            let body = json!({ "search": stored, "summary": summary });
            (StatusCode::CREATED, axum::Json(body)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn refresh_search_handler<S, M, P, A>(
    State(dispatcher): State<Arc<MatchDispatcher<S, M, P, A>>>,
    Path(search_id): Path<String>,
) -> Response
where
    S: SavedSearchRepository + 'static,
    M: MatchRepository + 'static,
    P: PropertyCatalog + 'static,
    A: AlertPublisher + 'static,
{
    match dispatcher.on_saved_search_changed(&SavedSearchId(search_id), Utc::now()) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_matches_handler<S, M, P, A>(
    State(dispatcher): State<Arc<MatchDispatcher<S, M, P, A>>>,
    Path(search_id): Path<String>,
) -> Response
where
    S: SavedSearchRepository + 'static,
    M: MatchRepository + 'static,
    P: PropertyCatalog + 'static,
    A: AlertPublisher + 'static,
{
    match dispatcher.matches_for(&SavedSearchId(search_id)) {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn property_changed_handler<S, M, P, A>(
    State(dispatcher): State<Arc<MatchDispatcher<S, M, P, A>>>,
    Path(property_id): Path<String>,
) -> Response
where
    S: SavedSearchRepository + 'static,
    M: MatchRepository + 'static,
    P: PropertyCatalog + 'static,
    A: AlertPublisher + 'static,
{
    match dispatcher.on_property_changed(&PropertyId(property_id), Utc::now()) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn digest_handler<S, M, P, A>(
    State(dispatcher): State<Arc<MatchDispatcher<S, M, P, A>>>,
    Path(frequency): Path<String>,
    payload: Option<axum::Json<DigestRequest>>,
) -> Response
where
    S: SavedSearchRepository + 'static,
    M: MatchRepository + 'static,
    P: PropertyCatalog + 'static,
    A: AlertPublisher + 'static,
{
    let Some(frequency) = AlertFrequency::parse(&frequency) else {
        let body = json!({ "error": format!("unknown alert frequency '{frequency}'") });
        return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(body)).into_response();
    };

    let as_of = payload
        .and_then(|axum::Json(request)| request.as_of)
        .unwrap_or_else(Utc::now);

    match dispatcher.on_scheduled_tick(frequency, as_of) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn feed_import_handler<S, M, P, A>(
    State(dispatcher): State<Arc<MatchDispatcher<S, M, P, A>>>,
    body: String,
) -> Response
where
    S: SavedSearchRepository + 'static,
    M: MatchRepository + 'static,
    P: PropertyCatalog + 'static,
    A: AlertPublisher + 'static,
{
    let snapshots = match catalog::parse_feed(Cursor::new(body.into_bytes())) {
        Ok(snapshots) => snapshots,
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
    };

    match dispatcher.ingest_properties(snapshots, Utc::now()) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) fn error_response(error: DispatchError) -> Response {
    let status = match &error {
        DispatchError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        DispatchError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        DispatchError::Repository(RepositoryError::Unavailable(_)) | DispatchError::Alert(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %error, "alert dispatch failed");
        "temporary failure, please try again".to_string()
    } else {
        error.to_string()
    };

    (status, axum::Json(json!({ "error": message }))).into_response()
}
