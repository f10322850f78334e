//! Guest verification: identity review, third-party references, credit
//! checks, and the trust score derived from them.
//!
//! The [`trust`] submodule is the pure scoring engine; [`service`] owns every
//! state mutation and recomputes the score before anything is persisted, so a
//! stored record's `trust_score` is always consistent with its facts.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod trust;

#[cfg(test)]
mod tests;

pub use domain::{
    AdminId, BackgroundStatus, BookingOutcome, CreditStatus, DocumentType, GuestReference,
    GuestVerification, IdentityStatus, IdentitySubmission, ReferenceId, ReferenceRequest,
    ReferenceStatus, ReferenceType, ReviewKind, TrustFacts, UserId, VerificationId,
};
pub use repository::{
    AuditEntry, AuditError, AuditTrail, NoticeRecipient, NotificationPublisher, NotifyError,
    ReferenceRepository, RepositoryError, VerificationNotice, VerificationRepository,
    VerificationStatusView,
};
pub use router::verification_router;
pub use service::{VerificationError, VerificationService};
pub use trust::{
    can_book, is_fully_verified, ScoreComponent, TrustScoreBreakdown, TrustScoreConfig,
    TrustScoreEngine, TrustSignal, VerificationBadge,
};
