use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    AdminId, GuestReference, GuestVerification, ReferenceId, UserId, VerificationId,
};
use super::trust::{can_book, VerificationBadge};

/// Storage abstraction for verification records so the service module can be
/// exercised in isolation. The backing store must keep at most one record per
/// user.
pub trait VerificationRepository: Send + Sync {
    fn insert(&self, record: GuestVerification) -> Result<GuestVerification, RepositoryError>;
    fn update(&self, record: GuestVerification) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &VerificationId) -> Result<Option<GuestVerification>, RepositoryError>;
    fn fetch_by_user(&self, user: &UserId) -> Result<Option<GuestVerification>, RepositoryError>;
}

/// Storage abstraction for guest references. Tokens are unique; lookup by
/// token is the only read path the public verify endpoint needs.
pub trait ReferenceRepository: Send + Sync {
    fn insert(&self, reference: GuestReference) -> Result<GuestReference, RepositoryError>;
    fn update(&self, reference: GuestReference) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ReferenceId) -> Result<Option<GuestReference>, RepositoryError>;
    fn fetch_by_token(&self, token: &str) -> Result<Option<GuestReference>, RepositoryError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Append-only trail of admin actions on verification records.
pub trait AuditTrail: Send + Sync {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub actor: AdminId,
    pub action: String,
    pub verification_id: VerificationId,
    pub at: DateTime<Utc>,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}

/// Outbound notification hook (email and in-app adapters live behind it).
/// Delivery is best-effort; the core only logs failures.
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notice: VerificationNotice) -> Result<(), NotifyError>;
}

/// Template-addressed notification payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationNotice {
    pub template: String,
    pub recipient: NoticeRecipient,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeRecipient {
    User(UserId),
    Email(String),
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Sanitized representation of a guest's verification standing for API
/// responses and the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationStatusView {
    pub user_id: UserId,
    pub identity_status: &'static str,
    pub background_status: &'static str,
    pub credit_status: &'static str,
    pub trust_score: f64,
    pub can_book: bool,
    pub badge: &'static str,
    pub references_verified: u32,
}

impl GuestVerification {
    pub fn status_view(&self) -> VerificationStatusView {
        let facts = self.facts();
        VerificationStatusView {
            user_id: self.user_id.clone(),
            identity_status: self.identity_status.label(),
            background_status: self.background_status.label(),
            credit_status: self.credit_status.label(),
            trust_score: self.trust_score,
            can_book: can_book(&facts),
            badge: VerificationBadge::for_facts(&facts).label(),
            references_verified: self.references_verified,
        }
    }
}
