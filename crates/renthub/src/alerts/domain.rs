use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{PropertyId, PropertyType};
use crate::verification::UserId;

/// Identifier wrapper for saved searches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SavedSearchId(pub String);

/// How often batched alerts may go out for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertFrequency {
    Instant,
    Daily,
    Weekly,
}

impl AlertFrequency {
    pub const fn label(self) -> &'static str {
        match self {
            AlertFrequency::Instant => "instant",
            AlertFrequency::Daily => "daily",
            AlertFrequency::Weekly => "weekly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "instant" => Some(Self::Instant),
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            _ => None,
        }
    }

    /// Minimum gap between batched alerts for a search on this cadence.
    pub const fn min_hours_between_alerts(self) -> i64 {
        match self {
            AlertFrequency::Instant => 1,
            AlertFrequency::Daily => 24,
            AlertFrequency::Weekly => 168,
        }
    }
}

/// Stored filter criteria. Every field is optional: an absent field places no
/// constraint on candidates, which keeps the matcher total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub bedrooms: Option<u8>,
    #[serde(default)]
    pub bathrooms: Option<f32>,
    #[serde(default)]
    pub guests: Option<u8>,
    #[serde(default)]
    pub property_types: Vec<PropertyType>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

/// A user-stored search, optionally monitored for new matching listings.
///
/// Two flags gate processing: `is_active` controls whether the search
/// participates in matching at all, and `alerts_enabled` controls whether
/// recorded matches may produce notifications. Match records are written for
/// active searches even when alerts are muted, so re-enabling alerts picks up
/// the backlog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSearch {
    pub id: SavedSearchId,
    pub user_id: UserId,
    pub name: String,
    pub criteria: SearchCriteria,
    pub frequency: AlertFrequency,
    pub is_active: bool,
    pub alerts_enabled: bool,
    pub last_alert_sent_at: Option<DateTime<Utc>>,
    pub notification_count: u32,
}

impl SavedSearch {
    pub fn may_notify(&self) -> bool {
        self.is_active && self.alerts_enabled
    }
}

/// Recorded association between a saved search and a property that satisfied
/// its criteria. Unique per (search, property) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSearchMatch {
    pub search_id: SavedSearchId,
    pub property_id: PropertyId,
    pub matched_at: DateTime<Utc>,
    pub notified: bool,
    pub notified_at: Option<DateTime<Utc>>,
}

impl SavedSearchMatch {
    pub fn new(search_id: SavedSearchId, property_id: PropertyId, at: DateTime<Utc>) -> Self {
        Self {
            search_id,
            property_id,
            matched_at: at,
            notified: false,
            notified_at: None,
        }
    }
}
