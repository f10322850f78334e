use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::verification::domain::{
    BackgroundStatus, CreditStatus, DocumentType, GuestReference, GuestVerification,
    IdentityStatus, IdentitySubmission, ReferenceId, ReferenceRequest, ReferenceType, TrustFacts,
    UserId, VerificationId,
};
use crate::verification::repository::{
    AuditEntry, AuditError, AuditTrail, NotificationPublisher, NotifyError, ReferenceRepository,
    RepositoryError, VerificationNotice, VerificationRepository,
};
use crate::verification::router::verification_router;
use crate::verification::service::VerificationService;
use crate::verification::trust::TrustScoreConfig;

pub(super) fn trust_config() -> TrustScoreConfig {
    TrustScoreConfig {
        base_score: 3.0,
        identity_verified_bonus: 0.8,
        background_clear_bonus: 0.4,
        credit_approved_bonus: 0.3,
        reference_bonus: 0.1,
        reference_bonus_cap: 0.5,
        completed_booking_bonus: 0.05,
        completed_booking_cap: 0.5,
        cancelled_booking_penalty: 0.2,
        positive_review_bonus: 0.05,
        positive_review_cap: 0.5,
        negative_review_penalty: 0.1,
    }
}

pub(super) fn baseline_facts() -> TrustFacts {
    TrustFacts {
        identity_status: IdentityStatus::Pending,
        background_status: BackgroundStatus::Pending,
        credit_check_enabled: false,
        credit_status: CreditStatus::NotRequested,
        completed_bookings: 0,
        cancelled_bookings: 0,
        positive_reviews: 0,
        negative_reviews: 0,
        references_verified: 0,
    }
}

pub(super) fn submission() -> IdentitySubmission {
    IdentitySubmission {
        document_type: DocumentType::Passport,
        document_number: "P1234567".to_string(),
        document_expiry_date: NaiveDate::from_ymd_opt(2030, 6, 1),
        front_image: Some("uploads/id-front.jpg".to_string()),
        back_image: None,
        selfie_image: Some("uploads/selfie.jpg".to_string()),
    }
}

pub(super) fn reference_request() -> ReferenceRequest {
    ReferenceRequest {
        name: "Dana Whitfield".to_string(),
        email: "dana@riverfrontlofts.example".to_string(),
        phone: Some("+1 515 555 0142".to_string()),
        reference_type: ReferenceType::PreviousLandlord,
        relationship: "Landlord 2023-2025".to_string(),
    }
}

pub(super) fn guest() -> UserId {
    UserId("guest-42".to_string())
}

pub(super) type TestService =
    VerificationService<MemoryVerifications, MemoryReferences, MemoryAudit, MemoryNotices>;

pub(super) fn build_service() -> (
    TestService,
    Arc<MemoryVerifications>,
    Arc<MemoryReferences>,
    Arc<MemoryAudit>,
    Arc<MemoryNotices>,
) {
    let verifications = Arc::new(MemoryVerifications::default());
    let references = Arc::new(MemoryReferences::default());
    let audit = Arc::new(MemoryAudit::default());
    let notices = Arc::new(MemoryNotices::default());
    let service = VerificationService::new(
        verifications.clone(),
        references.clone(),
        audit.clone(),
        notices.clone(),
        trust_config(),
    );
    (service, verifications, references, audit, notices)
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    verification_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryVerifications {
    records: Arc<Mutex<HashMap<VerificationId, GuestVerification>>>,
}

impl VerificationRepository for MemoryVerifications {
    fn insert(&self, record: GuestVerification) -> Result<GuestVerification, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id)
            || guard.values().any(|existing| existing.user_id == record.user_id)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: GuestVerification) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&record.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &VerificationId) -> Result<Option<GuestVerification>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn fetch_by_user(&self, user: &UserId) -> Result<Option<GuestVerification>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().find(|record| &record.user_id == user).cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryReferences {
    records: Arc<Mutex<HashMap<ReferenceId, GuestReference>>>,
}

impl ReferenceRepository for MemoryReferences {
    fn insert(&self, reference: GuestReference) -> Result<GuestReference, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&reference.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(reference.id.clone(), reference.clone());
        Ok(reference)
    }

    fn update(&self, reference: GuestReference) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&reference.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(reference.id.clone(), reference);
        Ok(())
    }

    fn fetch(&self, id: &ReferenceId) -> Result<Option<GuestReference>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn fetch_by_token(&self, token: &str) -> Result<Option<GuestReference>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .find(|reference| reference.verification_token == token)
            .cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryAudit {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl MemoryAudit {
    pub(super) fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().expect("audit mutex poisoned").clone()
    }
}

impl AuditTrail for MemoryAudit {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError> {
        self.entries.lock().expect("audit mutex poisoned").push(entry);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotices {
    events: Arc<Mutex<Vec<VerificationNotice>>>,
}

impl MemoryNotices {
    pub(super) fn events(&self) -> Vec<VerificationNotice> {
        self.events.lock().expect("notice mutex poisoned").clone()
    }
}

impl NotificationPublisher for MemoryNotices {
    fn publish(&self, notice: VerificationNotice) -> Result<(), NotifyError> {
        self.events.lock().expect("notice mutex poisoned").push(notice);
        Ok(())
    }
}

pub(super) struct UnavailableVerifications;

impl VerificationRepository for UnavailableVerifications {
    fn insert(&self, _record: GuestVerification) -> Result<GuestVerification, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: GuestVerification) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &VerificationId) -> Result<Option<GuestVerification>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_by_user(&self, _user: &UserId) -> Result<Option<GuestVerification>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
