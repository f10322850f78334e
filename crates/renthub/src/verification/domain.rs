use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for marketplace users (guests and hosts).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Identifier wrapper for verification records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerificationId(pub String);

/// Identifier wrapper for admin reviewers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdminId(pub String);

/// Identifier wrapper for guest references.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceId(pub String);

/// Review state of a guest's identity documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityStatus {
    Pending,
    Verified,
    Rejected,
    Expired,
}

impl IdentityStatus {
    pub const fn label(self) -> &'static str {
        match self {
            IdentityStatus::Pending => "pending",
            IdentityStatus::Verified => "verified",
            IdentityStatus::Rejected => "rejected",
            IdentityStatus::Expired => "expired",
        }
    }
}

/// Outcome of the background screen run for a guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundStatus {
    Pending,
    Clear,
    Flagged,
}

impl BackgroundStatus {
    pub const fn label(self) -> &'static str {
        match self {
            BackgroundStatus::Pending => "pending",
            BackgroundStatus::Clear => "clear",
            BackgroundStatus::Flagged => "flagged",
        }
    }
}

/// Progress of the optional credit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditStatus {
    NotRequested,
    Pending,
    Approved,
    Rejected,
}

impl CreditStatus {
    pub const fn label(self) -> &'static str {
        match self {
            CreditStatus::NotRequested => "not_requested",
            CreditStatus::Pending => "pending",
            CreditStatus::Approved => "approved",
            CreditStatus::Rejected => "rejected",
        }
    }
}

/// Identity documents accepted for review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Passport,
    DriversLicense,
    NationalId,
    ResidencePermit,
}

impl DocumentType {
    pub const fn label(self) -> &'static str {
        match self {
            DocumentType::Passport => "passport",
            DocumentType::DriversLicense => "drivers_license",
            DocumentType::NationalId => "national_id",
            DocumentType::ResidencePermit => "residence_permit",
        }
    }
}

/// Who the third-party reference is to the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    PreviousLandlord,
    Employer,
    Personal,
    Other,
}

impl ReferenceType {
    pub const fn label(self) -> &'static str {
        match self {
            ReferenceType::PreviousLandlord => "previous_landlord",
            ReferenceType::Employer => "employer",
            ReferenceType::Personal => "personal",
            ReferenceType::Other => "other",
        }
    }
}

/// Confirmation state of a guest reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceStatus {
    Pending,
    Verified,
}

impl ReferenceStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReferenceStatus::Pending => "pending",
            ReferenceStatus::Verified => "verified",
        }
    }
}

/// One-per-user verification record. `trust_score` is always derived from the
/// other fields by the trust engine and never accepted from callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestVerification {
    pub id: VerificationId,
    pub user_id: UserId,
    pub identity_status: IdentityStatus,
    pub document_type: Option<DocumentType>,
    pub document_number: Option<String>,
    pub document_expiry_date: Option<NaiveDate>,
    /// Storage references handed back by the upload service, never raw bytes.
    pub front_image: Option<String>,
    pub back_image: Option<String>,
    pub selfie_image: Option<String>,
    pub identity_verified_at: Option<DateTime<Utc>>,
    pub identity_rejection_reason: Option<String>,
    pub background_status: BackgroundStatus,
    pub background_checked_at: Option<DateTime<Utc>>,
    pub credit_check_enabled: bool,
    pub credit_status: CreditStatus,
    pub credit_score: Option<u16>,
    pub credit_checked_at: Option<DateTime<Utc>>,
    pub trust_score: f64,
    pub completed_bookings: u32,
    pub cancelled_bookings: u32,
    pub positive_reviews: u32,
    pub negative_reviews: u32,
    pub references_verified: u32,
    pub admin_notes: Option<String>,
    pub verified_by: Option<AdminId>,
}

impl GuestVerification {
    /// Baseline record created lazily the first time a user touches the
    /// verification flow. The trust score is recomputed by the service before
    /// the record is persisted.
    pub fn new(id: VerificationId, user_id: UserId) -> Self {
        Self {
            id,
            user_id,
            identity_status: IdentityStatus::Pending,
            document_type: None,
            document_number: None,
            document_expiry_date: None,
            front_image: None,
            back_image: None,
            selfie_image: None,
            identity_verified_at: None,
            identity_rejection_reason: None,
            background_status: BackgroundStatus::Pending,
            background_checked_at: None,
            credit_check_enabled: false,
            credit_status: CreditStatus::NotRequested,
            credit_score: None,
            credit_checked_at: None,
            trust_score: 0.0,
            completed_bookings: 0,
            cancelled_bookings: 0,
            positive_reviews: 0,
            negative_reviews: 0,
            references_verified: 0,
            admin_notes: None,
            verified_by: None,
        }
    }

    /// The facts the trust engine scores over.
    pub fn facts(&self) -> TrustFacts {
        TrustFacts {
            identity_status: self.identity_status,
            background_status: self.background_status,
            credit_check_enabled: self.credit_check_enabled,
            credit_status: self.credit_status,
            completed_bookings: self.completed_bookings,
            cancelled_bookings: self.cancelled_bookings,
            positive_reviews: self.positive_reviews,
            negative_reviews: self.negative_reviews,
            references_verified: self.references_verified,
        }
    }
}

/// The scoring inputs extracted from a verification record. Plain data so the
/// engine stays pure and deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustFacts {
    pub identity_status: IdentityStatus,
    pub background_status: BackgroundStatus,
    pub credit_check_enabled: bool,
    pub credit_status: CreditStatus,
    pub completed_bookings: u32,
    pub cancelled_bookings: u32,
    pub positive_reviews: u32,
    pub negative_reviews: u32,
    pub references_verified: u32,
}

/// Guest-supplied identity submission. Image fields hold storage references
/// from the upload service; the service layer enforces which are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentitySubmission {
    pub document_type: DocumentType,
    pub document_number: String,
    pub document_expiry_date: Option<NaiveDate>,
    pub front_image: Option<String>,
    pub back_image: Option<String>,
    pub selfie_image: Option<String>,
}

/// Details collected when a guest nominates a third-party reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub reference_type: ReferenceType,
    pub relationship: String,
}

/// A third party vouching for a guest, confirmed through a single-use token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestReference {
    pub id: ReferenceId,
    pub verification_id: VerificationId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub reference_type: ReferenceType,
    pub relationship: String,
    pub status: ReferenceStatus,
    /// Sole credential accepted by the public verify endpoint; consumed on
    /// first use.
    pub verification_token: String,
    pub rating: Option<u8>,
    pub comments: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
}

/// Booking outcomes reported by the booking subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingOutcome {
    Completed,
    Cancelled,
}

/// Review sentiment reported by the review subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewKind {
    Positive,
    Negative,
}
