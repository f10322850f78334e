mod config;
mod policy;
mod rules;

pub use config::TrustScoreConfig;
pub use policy::{can_book, is_fully_verified, VerificationBadge};

use super::domain::TrustFacts;
use serde::{Deserialize, Serialize};

const MIN_SCORE: f64 = 0.0;
const MAX_SCORE: f64 = 5.0;

/// Stateless scorer applying the configured rubric to verification facts.
/// Pure and deterministic: identical facts always yield identical output.
pub struct TrustScoreEngine {
    config: TrustScoreConfig,
}

impl TrustScoreEngine {
    pub fn new(config: TrustScoreConfig) -> Self {
        Self { config }
    }

    pub fn score(&self, facts: &TrustFacts) -> TrustScoreBreakdown {
        let components = rules::score_facts(facts, &self.config);
        let raw: f64 = self.config.base_score + components.iter().map(|c| c.delta).sum::<f64>();
        let score = round_half_up(raw.clamp(MIN_SCORE, MAX_SCORE));

        TrustScoreBreakdown { score, components }
    }
}

/// Discrete contribution to the composite score, kept for audit transparency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub signal: TrustSignal,
    pub delta: f64,
    pub notes: String,
}

/// Signals permitted in the trust rubric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustSignal {
    Identity,
    Background,
    Credit,
    References,
    CompletedBookings,
    CancelledBookings,
    PositiveReviews,
    NegativeReviews,
}

/// Bounded [0.00, 5.00] composite score with its contributing signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustScoreBreakdown {
    pub score: f64,
    pub components: Vec<ScoreComponent>,
}

fn round_half_up(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
