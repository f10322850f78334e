use super::super::domain::{BackgroundStatus, CreditStatus, IdentityStatus, TrustFacts};
use super::config::TrustScoreConfig;
use super::{ScoreComponent, TrustSignal};

pub(crate) fn score_facts(facts: &TrustFacts, config: &TrustScoreConfig) -> Vec<ScoreComponent> {
    let mut components = Vec::new();

    if facts.identity_status == IdentityStatus::Verified {
        components.push(ScoreComponent {
            signal: TrustSignal::Identity,
            delta: config.identity_verified_bonus,
            notes: "identity documents verified".to_string(),
        });
    }

    if facts.background_status == BackgroundStatus::Clear {
        components.push(ScoreComponent {
            signal: TrustSignal::Background,
            delta: config.background_clear_bonus,
            notes: "background check clear".to_string(),
        });
    }

    if facts.credit_check_enabled && facts.credit_status == CreditStatus::Approved {
        components.push(ScoreComponent {
            signal: TrustSignal::Credit,
            delta: config.credit_approved_bonus,
            notes: "credit check approved".to_string(),
        });
    }

    if facts.references_verified > 0 {
        let raw = facts.references_verified as f64 * config.reference_bonus;
        let delta = raw.min(config.reference_bonus_cap);
        components.push(ScoreComponent {
            signal: TrustSignal::References,
            delta,
            notes: format!("{} verified reference(s)", facts.references_verified),
        });
    }

    if facts.completed_bookings > 0 {
        // Diminishing: each stay adds a little until the cap absorbs the rest.
        let raw = facts.completed_bookings as f64 * config.completed_booking_bonus;
        let delta = raw.min(config.completed_booking_cap);
        components.push(ScoreComponent {
            signal: TrustSignal::CompletedBookings,
            delta,
            notes: format!("{} completed booking(s)", facts.completed_bookings),
        });
    }

    if facts.cancelled_bookings > 0 {
        components.push(ScoreComponent {
            signal: TrustSignal::CancelledBookings,
            delta: -(facts.cancelled_bookings as f64 * config.cancelled_booking_penalty),
            notes: format!("{} cancelled booking(s)", facts.cancelled_bookings),
        });
    }

    if facts.positive_reviews > 0 {
        let raw = facts.positive_reviews as f64 * config.positive_review_bonus;
        let delta = raw.min(config.positive_review_cap);
        components.push(ScoreComponent {
            signal: TrustSignal::PositiveReviews,
            delta,
            notes: format!("{} positive review(s)", facts.positive_reviews),
        });
    }

    if facts.negative_reviews > 0 {
        components.push(ScoreComponent {
            signal: TrustSignal::NegativeReviews,
            delta: -(facts.negative_reviews as f64 * config.negative_review_penalty),
            notes: format!("{} negative review(s)", facts.negative_reviews),
        });
    }

    components
}
