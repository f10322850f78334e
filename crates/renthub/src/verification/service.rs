use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::domain::{
    AdminId, BackgroundStatus, BookingOutcome, CreditStatus, GuestReference, GuestVerification,
    IdentityStatus, IdentitySubmission, ReferenceId, ReferenceRequest, ReferenceStatus, ReviewKind,
    UserId, VerificationId,
};
use super::repository::{
    AuditEntry, AuditError, AuditTrail, NoticeRecipient, NotificationPublisher, NotifyError,
    ReferenceRepository, RepositoryError, VerificationNotice, VerificationRepository,
};
use super::trust::{TrustScoreConfig, TrustScoreEngine};

const MAX_CREDIT_SCORE: u16 = 850;

/// Service owning every mutation of verification state. Each mutation runs
/// through [`persist_rescored`](Self::persist_rescored) so the stored trust
/// score can never go stale relative to the facts it derives from.
pub struct VerificationService<R, F, T, N> {
    verifications: Arc<R>,
    references: Arc<F>,
    audit: Arc<T>,
    notices: Arc<N>,
    engine: Arc<TrustScoreEngine>,
}

impl<R, F, T, N> VerificationService<R, F, T, N>
where
    R: VerificationRepository + 'static,
    F: ReferenceRepository + 'static,
    T: AuditTrail + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(
        verifications: Arc<R>,
        references: Arc<F>,
        audit: Arc<T>,
        notices: Arc<N>,
        config: TrustScoreConfig,
    ) -> Self {
        Self {
            verifications,
            references,
            audit,
            notices,
            engine: Arc::new(TrustScoreEngine::new(config)),
        }
    }

    /// Guest submits identity documents for admin review. A fresh record is
    /// created on first contact; re-submission after a rejection or expiry
    /// resets the identity to pending.
    pub fn submit_identity(
        &self,
        user: &UserId,
        submission: IdentitySubmission,
    ) -> Result<GuestVerification, VerificationError> {
        let front_image = submission
            .front_image
            .filter(|reference| !reference.trim().is_empty())
            .ok_or(VerificationError::MissingFrontImage)?;
        let selfie_image = submission
            .selfie_image
            .filter(|reference| !reference.trim().is_empty())
            .ok_or(VerificationError::MissingSelfieImage)?;
        let expiry = submission
            .document_expiry_date
            .ok_or(VerificationError::MissingExpiryDate)?;

        let (mut record, is_new) = self.load_or_new(user)?;

        record.identity_status = IdentityStatus::Pending;
        record.document_type = Some(submission.document_type);
        record.document_number = Some(submission.document_number);
        record.document_expiry_date = Some(expiry);
        record.front_image = Some(front_image);
        record.back_image = submission.back_image;
        record.selfie_image = Some(selfie_image);
        record.identity_verified_at = None;
        record.identity_rejection_reason = None;
        record.verified_by = None;

        self.persist_rescored(record, is_new)
    }

    /// Admin approves a pending identity. Authorization is enforced upstream;
    /// the acting admin id is trusted here.
    pub fn approve_identity(
        &self,
        verification_id: &VerificationId,
        admin: &AdminId,
        now: DateTime<Utc>,
    ) -> Result<GuestVerification, VerificationError> {
        let mut record = self.load(verification_id)?;
        if record.identity_status != IdentityStatus::Pending {
            return Err(VerificationError::IdentityNotPending {
                found: record.identity_status.label(),
            });
        }

        record.identity_status = IdentityStatus::Verified;
        record.identity_verified_at = Some(now);
        record.identity_rejection_reason = None;
        record.verified_by = Some(admin.clone());

        let stored = self.persist_rescored(record, false)?;

        self.audit.record(AuditEntry {
            actor: admin.clone(),
            action: "identity_approved".to_string(),
            verification_id: stored.id.clone(),
            at: now,
            details: BTreeMap::new(),
        })?;
        self.notices.publish(VerificationNotice {
            template: "identity_approved".to_string(),
            recipient: NoticeRecipient::User(stored.user_id.clone()),
            details: BTreeMap::new(),
        })?;

        Ok(stored)
    }

    /// Admin rejects a pending identity; a non-empty reason is required so
    /// the guest receives an actionable message.
    pub fn reject_identity(
        &self,
        verification_id: &VerificationId,
        admin: &AdminId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<GuestVerification, VerificationError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(VerificationError::MissingRejectionReason);
        }

        let mut record = self.load(verification_id)?;
        if record.identity_status != IdentityStatus::Pending {
            return Err(VerificationError::IdentityNotPending {
                found: record.identity_status.label(),
            });
        }

        record.identity_status = IdentityStatus::Rejected;
        record.identity_rejection_reason = Some(reason.to_string());
        record.verified_by = Some(admin.clone());

        let stored = self.persist_rescored(record, false)?;

        let mut details = BTreeMap::new();
        details.insert("reason".to_string(), reason.to_string());
        self.audit.record(AuditEntry {
            actor: admin.clone(),
            action: "identity_rejected".to_string(),
            verification_id: stored.id.clone(),
            at: now,
            details,
        })?;

        Ok(stored)
    }

    /// Guest nominates a third-party reference. A fresh single-use token is
    /// minted and mailed to the referee.
    pub fn add_reference(
        &self,
        user: &UserId,
        request: ReferenceRequest,
    ) -> Result<GuestReference, VerificationError> {
        if request.name.trim().is_empty() {
            return Err(VerificationError::MissingReferenceName);
        }
        if request.email.trim().is_empty() {
            return Err(VerificationError::MissingReferenceEmail);
        }

        let (record, is_new) = self.load_or_new(user)?;
        let record = self.persist_rescored(record, is_new)?;

        let reference = GuestReference {
            id: ReferenceId(Uuid::new_v4().to_string()),
            verification_id: record.id.clone(),
            name: request.name,
            email: request.email.clone(),
            phone: request.phone,
            reference_type: request.reference_type,
            relationship: request.relationship,
            status: ReferenceStatus::Pending,
            verification_token: Uuid::new_v4().to_string(),
            rating: None,
            comments: None,
            verified_at: None,
        };

        let stored = self.references.insert(reference)?;

        let mut details = BTreeMap::new();
        details.insert("token".to_string(), stored.verification_token.clone());
        details.insert("reference_name".to_string(), stored.name.clone());
        self.notices.publish(VerificationNotice {
            template: "reference_request".to_string(),
            recipient: NoticeRecipient::Email(request.email),
            details,
        })?;

        Ok(stored)
    }

    /// Public, unauthenticated confirmation by the referee. Token possession
    /// is the sole credential and each token is consumed on first use.
    pub fn verify_reference(
        &self,
        token: &str,
        rating: u8,
        comments: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<GuestReference, VerificationError> {
        if !(1..=5).contains(&rating) {
            return Err(VerificationError::RatingOutOfRange(rating));
        }

        let mut reference = self
            .references
            .fetch_by_token(token)?
            .ok_or(VerificationError::InvalidToken)?;
        if reference.status == ReferenceStatus::Verified {
            return Err(VerificationError::InvalidToken);
        }

        reference.status = ReferenceStatus::Verified;
        reference.rating = Some(rating);
        reference.comments = comments;
        reference.verified_at = Some(now);
        self.references.update(reference.clone())?;

        let mut record = self.load(&reference.verification_id)?;
        record.references_verified += 1;
        self.persist_rescored(record, false)?;

        Ok(reference)
    }

    /// Guest opts into a credit check. The bureau result arrives
    /// asynchronously through [`apply_credit_result`](Self::apply_credit_result).
    pub fn request_credit_check(
        &self,
        user: &UserId,
    ) -> Result<GuestVerification, VerificationError> {
        let (mut record, is_new) = self.load_or_new(user)?;
        if record.credit_status != CreditStatus::NotRequested {
            return Err(VerificationError::CreditCheckAlreadyRequested {
                found: record.credit_status.label(),
            });
        }

        record.credit_check_enabled = true;
        record.credit_status = CreditStatus::Pending;
        let stored = self.persist_rescored(record, is_new)?;

        self.notices.publish(VerificationNotice {
            template: "credit_check_queued".to_string(),
            recipient: NoticeRecipient::User(stored.user_id.clone()),
            details: BTreeMap::new(),
        })?;

        Ok(stored)
    }

    /// Bureau result applied by the credit-check worker or an admin. An
    /// approval must carry the reported score.
    pub fn apply_credit_result(
        &self,
        verification_id: &VerificationId,
        approved: bool,
        credit_score: Option<u16>,
        now: DateTime<Utc>,
    ) -> Result<GuestVerification, VerificationError> {
        let mut record = self.load(verification_id)?;
        if record.credit_status != CreditStatus::Pending {
            return Err(VerificationError::CreditResultNotPending {
                found: record.credit_status.label(),
            });
        }

        if approved {
            let score = credit_score.ok_or(VerificationError::MissingCreditScore)?;
            if score > MAX_CREDIT_SCORE {
                return Err(VerificationError::CreditScoreOutOfRange(score));
            }
            record.credit_status = CreditStatus::Approved;
            record.credit_score = Some(score);
        } else {
            record.credit_status = CreditStatus::Rejected;
            record.credit_score = credit_score;
        }
        record.credit_checked_at = Some(now);

        self.persist_rescored(record, false)
    }

    /// Admin records the background screen outcome.
    pub fn update_background(
        &self,
        verification_id: &VerificationId,
        status: BackgroundStatus,
        admin: &AdminId,
        now: DateTime<Utc>,
    ) -> Result<GuestVerification, VerificationError> {
        let mut record = self.load(verification_id)?;
        record.background_status = status;
        record.background_checked_at = Some(now);
        let stored = self.persist_rescored(record, false)?;

        let mut details = BTreeMap::new();
        details.insert("status".to_string(), status.label().to_string());
        self.audit.record(AuditEntry {
            actor: admin.clone(),
            action: "background_updated".to_string(),
            verification_id: stored.id.clone(),
            at: now,
            details,
        })?;

        Ok(stored)
    }

    /// Counter entry point for the booking subsystem.
    pub fn record_booking_outcome(
        &self,
        user: &UserId,
        outcome: BookingOutcome,
    ) -> Result<GuestVerification, VerificationError> {
        let (mut record, is_new) = self.load_or_new(user)?;
        match outcome {
            BookingOutcome::Completed => record.completed_bookings += 1,
            BookingOutcome::Cancelled => record.cancelled_bookings += 1,
        }
        self.persist_rescored(record, is_new)
    }

    /// Counter entry point for the review subsystem.
    pub fn record_review(
        &self,
        user: &UserId,
        kind: ReviewKind,
    ) -> Result<GuestVerification, VerificationError> {
        let (mut record, is_new) = self.load_or_new(user)?;
        match kind {
            ReviewKind::Positive => record.positive_reviews += 1,
            ReviewKind::Negative => record.negative_reviews += 1,
        }
        self.persist_rescored(record, is_new)
    }

    /// Current record for dashboard/API reads.
    pub fn get_by_user(&self, user: &UserId) -> Result<GuestVerification, VerificationError> {
        self.verifications
            .fetch_by_user(user)?
            .ok_or(VerificationError::Repository(RepositoryError::NotFound))
    }

    fn load(&self, id: &VerificationId) -> Result<GuestVerification, VerificationError> {
        self.verifications
            .fetch(id)?
            .ok_or(VerificationError::Repository(RepositoryError::NotFound))
    }

    fn load_or_new(
        &self,
        user: &UserId,
    ) -> Result<(GuestVerification, bool), VerificationError> {
        match self.verifications.fetch_by_user(user)? {
            Some(record) => Ok((record, false)),
            None => Ok((
                GuestVerification::new(
                    VerificationId(Uuid::new_v4().to_string()),
                    user.clone(),
                ),
                true,
            )),
        }
    }

    /// Recompute the derived trust score from the mutated facts, then persist
    /// record and score in one write.
    fn persist_rescored(
        &self,
        mut record: GuestVerification,
        is_new: bool,
    ) -> Result<GuestVerification, VerificationError> {
        record.trust_score = self.engine.score(&record.facts()).score;
        if is_new {
            Ok(self.verifications.insert(record)?)
        } else {
            self.verifications.update(record.clone())?;
            Ok(record)
        }
    }
}

/// Error raised by the verification service.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("front document image is required")]
    MissingFrontImage,
    #[error("selfie image is required")]
    MissingSelfieImage,
    #[error("document expiry date is required")]
    MissingExpiryDate,
    #[error("rejection reason is required")]
    MissingRejectionReason,
    #[error("reference name is required")]
    MissingReferenceName,
    #[error("reference email is required")]
    MissingReferenceEmail,
    #[error("rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(u8),
    #[error("an approved credit check must include the reported score")]
    MissingCreditScore,
    #[error("credit score must be at most 850, got {0}")]
    CreditScoreOutOfRange(u16),
    #[error("verification token is invalid or already used")]
    InvalidToken,
    #[error("identity is not awaiting review (currently {found})")]
    IdentityNotPending { found: &'static str },
    #[error("credit check already {found}")]
    CreditCheckAlreadyRequested { found: &'static str },
    #[error("credit check is not pending (currently {found})")]
    CreditResultNotPending { found: &'static str },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error(transparent)]
    Notification(#[from] NotifyError),
}

impl VerificationError {
    /// Validation and precondition failures are client errors and must never
    /// be retried; repository/notification failures are retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VerificationError::Repository(RepositoryError::Unavailable(_))
                | VerificationError::Audit(_)
                | VerificationError::Notification(_)
        )
    }
}
