use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::verification::domain::UserId;
use crate::verification::service::VerificationService;

async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

fn submit_payload() -> Value {
    json!({
        "user_id": "guest-42",
        "document_type": "passport",
        "document_number": "P1234567",
        "document_expiry_date": "2030-06-01",
        "front_image": "uploads/id-front.jpg",
        "selfie_image": "uploads/selfie.jpg",
    })
}

fn post(uri: &str, payload: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(payload).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn submit_route_accepts_identity_documents() {
    let (service, _, _, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post("/api/v1/verification/identity", &submit_payload()))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = read_json_body(response).await;
    assert_eq!(body["identity_status"], "pending");
    assert_eq!(body["can_book"], false);
    assert_eq!(body["badge"], "unverified");
}

#[tokio::test]
async fn submit_route_returns_unprocessable_for_missing_images() {
    let (service, _, _, _, _) = build_service();
    let router = router_with_service(service);

    let mut payload = submit_payload();
    payload.as_object_mut().unwrap().remove("selfie_image");

    let response = router
        .oneshot(post("/api/v1/verification/identity", &payload))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], "selfie image is required");
}

#[tokio::test]
async fn status_route_synthesizes_unverified_baseline() {
    let (service, _, _, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/verification/users/stranger")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["identity_status"], "pending");
    assert_eq!(body["badge"], "unverified");
    assert_eq!(body["trust_score"], Value::Null);
}

#[tokio::test]
async fn approve_route_flips_can_book() {
    let (service, _, _, _, _) = build_service();
    let record = service
        .submit_identity(&guest(), submission())
        .expect("submission accepted");
    let router = router_with_service(service);

    let response = router
        .oneshot(post(
            &format!("/api/v1/verification/{}/approve", record.id.0),
            &json!({ "admin_id": "admin-7" }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["identity_status"], "verified");
    assert_eq!(body["can_book"], true);
}

#[tokio::test]
async fn reject_route_without_reason_is_unprocessable() {
    let (service, _, _, _, _) = build_service();
    let record = service
        .submit_identity(&guest(), submission())
        .expect("submission accepted");
    let router = router_with_service(service);

    let response = router
        .oneshot(post(
            &format!("/api/v1/verification/{}/reject", record.id.0),
            &json!({ "admin_id": "admin-7" }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], "rejection reason is required");
}

#[tokio::test]
async fn approve_route_conflicts_on_second_attempt() {
    let (service, _, _, _, _) = build_service();
    let record = service
        .submit_identity(&guest(), submission())
        .expect("submission accepted");
    let router = router_with_service(service);

    let uri = format!("/api/v1/verification/{}/approve", record.id.0);
    let first = router
        .clone()
        .oneshot(post(&uri, &json!({ "admin_id": "admin-7" })))
        .await
        .expect("router responds");
    assert_eq!(first.status(), StatusCode::OK);

    let second = router
        .oneshot(post(&uri, &json!({ "admin_id": "admin-7" })))
        .await
        .expect("router responds");
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn verify_reference_route_consumes_the_token() {
    let (service, _, _, _, _) = build_service();
    let reference = service
        .add_reference(&guest(), reference_request())
        .expect("reference accepted");
    let token = reference.verification_token.clone();
    let router = router_with_service(service);

    let payload = json!({ "token": token, "rating": 5, "comments": "great tenant" });
    let first = router
        .clone()
        .oneshot(post("/api/v1/verification/references/verify", &payload))
        .await
        .expect("router responds");
    assert_eq!(first.status(), StatusCode::OK);
    let body = read_json_body(first).await;
    assert_eq!(body["status"], "verified");
    assert_eq!(body["rating"], 5);

    let second = router
        .oneshot(post("/api/v1/verification/references/verify", &payload))
        .await
        .expect("router responds");
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn add_reference_route_never_leaks_the_token() {
    let (service, _, _, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post(
            "/api/v1/verification/references",
            &json!({
                "user_id": "guest-42",
                "name": "Dana Whitfield",
                "email": "dana@riverfrontlofts.example",
                "reference_type": "previous_landlord",
                "relationship": "Landlord 2023-2025",
            }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "pending");
    assert!(body.get("verification_token").is_none());
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn infrastructure_failure_yields_generic_internal_error() {
    let references = Arc::new(MemoryReferences::default());
    let audit = Arc::new(MemoryAudit::default());
    let notices = Arc::new(MemoryNotices::default());
    let service = VerificationService::new(
        Arc::new(UnavailableVerifications),
        references,
        audit,
        notices,
        trust_config(),
    );

    let response = crate::verification::router::submit_identity_handler::<
        UnavailableVerifications,
        MemoryReferences,
        MemoryAudit,
        MemoryNotices,
    >(
        axum::extract::State(Arc::new(service)),
        axum::Json(crate::verification::router::SubmitIdentityRequest {
            user_id: "guest-42".to_string(),
            document_type: crate::verification::domain::DocumentType::Passport,
            document_number: "P1234567".to_string(),
            document_expiry_date: chrono::NaiveDate::from_ymd_opt(2030, 6, 1),
            front_image: Some("uploads/id-front.jpg".to_string()),
            back_image: None,
            selfie_image: Some("uploads/selfie.jpg".to_string()),
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], "temporary failure, please try again");
}

#[tokio::test]
async fn credit_check_route_reports_conflict_on_duplicate_request() {
    let (service, _, _, _, _) = build_service();
    service
        .request_credit_check(&UserId("guest-42".to_string()))
        .expect("first request accepted");
    let router = router_with_service(service);

    let response = router
        .oneshot(post(
            "/api/v1/verification/credit-check",
            &json!({ "user_id": "guest-42" }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[test]
fn status_view_reflects_score_and_badge() {
    let (service, _, _, _, _) = build_service();
    let record = service
        .submit_identity(&guest(), submission())
        .expect("submission accepted");
    let approved = service
        .approve_identity(&record.id, &crate::verification::domain::AdminId("admin-7".into()), Utc::now())
        .expect("approval succeeds");

    let view = approved.status_view();
    assert_eq!(view.identity_status, "verified");
    assert!(view.can_book);
    assert_eq!(view.badge, "identity_verified");
    assert_eq!(view.trust_score, 3.8);
}
