use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    AdminId, DocumentType, IdentitySubmission, ReferenceRequest, ReferenceType, UserId,
    VerificationId,
};
use super::repository::{
    AuditTrail, NotificationPublisher, ReferenceRepository, RepositoryError, VerificationRepository,
};
use super::service::{VerificationError, VerificationService};

/// Router builder exposing the guest verification endpoints. The reference
/// confirmation route is public; everything else is authenticated upstream.
pub fn verification_router<R, F, T, N>(
    service: Arc<VerificationService<R, F, T, N>>,
) -> Router
where
    R: VerificationRepository + 'static,
    F: ReferenceRepository + 'static,
    T: AuditTrail + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/verification/identity",
            post(submit_identity_handler::<R, F, T, N>),
        )
        .route(
            "/api/v1/verification/users/:user_id",
            get(status_handler::<R, F, T, N>),
        )
        .route(
            "/api/v1/verification/:verification_id/approve",
            post(approve_handler::<R, F, T, N>),
        )
        .route(
            "/api/v1/verification/:verification_id/reject",
            post(reject_handler::<R, F, T, N>),
        )
        .route(
            "/api/v1/verification/references",
            post(add_reference_handler::<R, F, T, N>),
        )
        .route(
            "/api/v1/verification/references/verify",
            post(verify_reference_handler::<R, F, T, N>),
        )
        .route(
            "/api/v1/verification/credit-check",
            post(credit_check_handler::<R, F, T, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitIdentityRequest {
    pub(crate) user_id: String,
    pub(crate) document_type: DocumentType,
    pub(crate) document_number: String,
    pub(crate) document_expiry_date: Option<NaiveDate>,
    pub(crate) front_image: Option<String>,
    pub(crate) back_image: Option<String>,
    pub(crate) selfie_image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AdminActionRequest {
    pub(crate) admin_id: String,
    #[serde(default)]
    pub(crate) reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddReferenceRequest {
    pub(crate) user_id: String,
    pub(crate) name: String,
    pub(crate) email: String,
    #[serde(default)]
    pub(crate) phone: Option<String>,
    pub(crate) reference_type: ReferenceType,
    pub(crate) relationship: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerifyReferenceRequest {
    pub(crate) token: String,
    pub(crate) rating: u8,
    #[serde(default)]
    pub(crate) comments: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreditCheckRequest {
    pub(crate) user_id: String,
}

pub(crate) async fn submit_identity_handler<R, F, T, N>(
    State(service): State<Arc<VerificationService<R, F, T, N>>>,
    axum::Json(payload): axum::Json<SubmitIdentityRequest>,
) -> Response
where
    R: VerificationRepository + 'static,
    F: ReferenceRepository + 'static,
    T: AuditTrail + 'static,
    N: NotificationPublisher + 'static,
{
    let submission = IdentitySubmission {
        document_type: payload.document_type,
        document_number: payload.document_number,
        document_expiry_date: payload.document_expiry_date,
        front_image: payload.front_image,
        back_image: payload.back_image,
        selfie_image: payload.selfie_image,
    };

    match service.submit_identity(&UserId(payload.user_id), submission) {
        Ok(record) => (StatusCode::ACCEPTED, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R, F, T, N>(
    State(service): State<Arc<VerificationService<R, F, T, N>>>,
    Path(user_id): Path<String>,
) -> Response
where
    R: VerificationRepository + 'static,
    F: ReferenceRepository + 'static,
    T: AuditTrail + 'static,
    N: NotificationPublisher + 'static,
{
    let user = UserId(user_id);
    match service.get_by_user(&user) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(VerificationError::Repository(RepositoryError::NotFound)) => {
            // Nothing on file yet: report the unverified baseline rather than
            // surfacing a 404 to the dashboard.
            let payload = json!({
                "user_id": user.0,
                "identity_status": "pending",
                "background_status": "pending",
                "credit_status": "not_requested",
                "trust_score": serde_json::Value::Null,
                "can_book": false,
                "badge": "unverified",
                "references_verified": 0,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn approve_handler<R, F, T, N>(
    State(service): State<Arc<VerificationService<R, F, T, N>>>,
    Path(verification_id): Path<String>,
    axum::Json(payload): axum::Json<AdminActionRequest>,
) -> Response
where
    R: VerificationRepository + 'static,
    F: ReferenceRepository + 'static,
    T: AuditTrail + 'static,
    N: NotificationPublisher + 'static,
{
    match service.approve_identity(
        &VerificationId(verification_id),
        &AdminId(payload.admin_id),
        Utc::now(),
    ) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reject_handler<R, F, T, N>(
    State(service): State<Arc<VerificationService<R, F, T, N>>>,
    Path(verification_id): Path<String>,
    axum::Json(payload): axum::Json<AdminActionRequest>,
) -> Response
where
    R: VerificationRepository + 'static,
    F: ReferenceRepository + 'static,
    T: AuditTrail + 'static,
    N: NotificationPublisher + 'static,
{
    let reason = payload.reason.unwrap_or_default();
    match service.reject_identity(
        &VerificationId(verification_id),
        &AdminId(payload.admin_id),
        &reason,
        Utc::now(),
    ) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn add_reference_handler<R, F, T, N>(
    State(service): State<Arc<VerificationService<R, F, T, N>>>,
    axum::Json(payload): axum::Json<AddReferenceRequest>,
) -> Response
where
    R: VerificationRepository + 'static,
    F: ReferenceRepository + 'static,
    T: AuditTrail + 'static,
    N: NotificationPublisher + 'static,
{
    let request = ReferenceRequest {
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        reference_type: payload.reference_type,
        relationship: payload.relationship,
    };

    match service.add_reference(&UserId(payload.user_id), request) {
        Ok(reference) => {
            // The token travels only to the referee; the API response carries
            // the tracking id and status.
            let body = json!({
                "reference_id": reference.id.0,
                "status": reference.status.label(),
                "reference_type": reference.reference_type.label(),
            });
            (StatusCode::ACCEPTED, axum::Json(body)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn verify_reference_handler<R, F, T, N>(
    State(service): State<Arc<VerificationService<R, F, T, N>>>,
    axum::Json(payload): axum::Json<VerifyReferenceRequest>,
) -> Response
where
    R: VerificationRepository + 'static,
    F: ReferenceRepository + 'static,
    T: AuditTrail + 'static,
    N: NotificationPublisher + 'static,
{
    match service.verify_reference(&payload.token, payload.rating, payload.comments, Utc::now()) {
        Ok(reference) => {
            let body = json!({
                "reference_id": reference.id.0,
                "status": reference.status.label(),
                "rating": reference.rating,
            });
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn credit_check_handler<R, F, T, N>(
    State(service): State<Arc<VerificationService<R, F, T, N>>>,
    axum::Json(payload): axum::Json<CreditCheckRequest>,
) -> Response
where
    R: VerificationRepository + 'static,
    F: ReferenceRepository + 'static,
    T: AuditTrail + 'static,
    N: NotificationPublisher + 'static,
{
    match service.request_credit_check(&UserId(payload.user_id)) {
        Ok(record) => (StatusCode::ACCEPTED, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

/// Map service errors onto the API contract: validation problems are 422,
/// unknown records and spent tokens are 404, state conflicts are 409, and
/// infrastructure failures collapse into a generic retryable 500.
pub(crate) fn error_response(error: VerificationError) -> Response {
    let status = match &error {
        VerificationError::MissingFrontImage
        | VerificationError::MissingSelfieImage
        | VerificationError::MissingExpiryDate
        | VerificationError::MissingRejectionReason
        | VerificationError::MissingReferenceName
        | VerificationError::MissingReferenceEmail
        | VerificationError::RatingOutOfRange(_)
        | VerificationError::MissingCreditScore
        | VerificationError::CreditScoreOutOfRange(_) => StatusCode::UNPROCESSABLE_ENTITY,
        VerificationError::InvalidToken => StatusCode::NOT_FOUND,
        VerificationError::IdentityNotPending { .. }
        | VerificationError::CreditCheckAlreadyRequested { .. }
        | VerificationError::CreditResultNotPending { .. } => StatusCode::CONFLICT,
        VerificationError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        VerificationError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        VerificationError::Repository(RepositoryError::Unavailable(_))
        | VerificationError::Audit(_)
        | VerificationError::Notification(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %error, "verification request failed");
        "temporary failure, please try again".to_string()
    } else {
        error.to_string()
    };

    (status, axum::Json(json!({ "error": message }))).into_response()
}
