use serde::{Deserialize, Serialize};

use super::super::domain::{BackgroundStatus, CreditStatus, IdentityStatus, TrustFacts};

/// Booking eligibility gate. Identity verification is the only hard bar;
/// background, credit, and references raise the score but never block a
/// booking.
pub fn can_book(facts: &TrustFacts) -> bool {
    facts.identity_status == IdentityStatus::Verified
}

/// Classification backing the "fully verified" badge: identity and background
/// in their positive terminal states, and the credit check approved whenever
/// the guest opted into one.
pub fn is_fully_verified(facts: &TrustFacts) -> bool {
    facts.identity_status == IdentityStatus::Verified
        && facts.background_status == BackgroundStatus::Clear
        && (!facts.credit_check_enabled || facts.credit_status == CreditStatus::Approved)
}

/// Dashboard badge derived from the two gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationBadge {
    Unverified,
    IdentityVerified,
    FullyVerified,
}

impl VerificationBadge {
    pub fn for_facts(facts: &TrustFacts) -> Self {
        if is_fully_verified(facts) {
            Self::FullyVerified
        } else if can_book(facts) {
            Self::IdentityVerified
        } else {
            Self::Unverified
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            VerificationBadge::Unverified => "unverified",
            VerificationBadge::IdentityVerified => "identity_verified",
            VerificationBadge::FullyVerified => "fully_verified",
        }
    }
}
