use serde::{Deserialize, Serialize};

/// Weights feeding the composite trust score. Injected at construction so
/// deployments and tests can tune the rubric without code changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustScoreConfig {
    /// Neutral starting point before any signal is applied.
    pub base_score: f64,
    pub identity_verified_bonus: f64,
    pub background_clear_bonus: f64,
    pub credit_approved_bonus: f64,
    pub reference_bonus: f64,
    pub reference_bonus_cap: f64,
    pub completed_booking_bonus: f64,
    pub completed_booking_cap: f64,
    pub cancelled_booking_penalty: f64,
    pub positive_review_bonus: f64,
    pub positive_review_cap: f64,
    pub negative_review_penalty: f64,
}
