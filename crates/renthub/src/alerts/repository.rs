use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{PropertyId, PropertySnapshot};
use crate::verification::UserId;

use super::domain::{AlertFrequency, SavedSearch, SavedSearchId, SavedSearchMatch};

/// Storage abstraction for saved searches.
pub trait SavedSearchRepository: Send + Sync {
    fn insert(&self, search: SavedSearch) -> Result<SavedSearch, RepositoryError>;
    fn update(&self, search: SavedSearch) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &SavedSearchId) -> Result<Option<SavedSearch>, RepositoryError>;
    /// All searches with `is_active = true`.
    fn active(&self) -> Result<Vec<SavedSearch>, RepositoryError>;
    /// Active, alert-enabled searches on the given cadence.
    fn active_with_frequency(
        &self,
        frequency: AlertFrequency,
    ) -> Result<Vec<SavedSearch>, RepositoryError>;
}

/// Storage abstraction for match records. Implementations must enforce
/// uniqueness on (search, property); `insert_if_absent` is the authoritative
/// dedup guard, application-level existence checks are only an optimization.
pub trait MatchRepository: Send + Sync {
    /// Returns `true` when the match was newly recorded, `false` when the
    /// pair already existed (not an error).
    fn insert_if_absent(&self, record: SavedSearchMatch) -> Result<bool, RepositoryError>;
    fn for_search(&self, search: &SavedSearchId) -> Result<Vec<SavedSearchMatch>, RepositoryError>;
    fn unnotified(&self, search: &SavedSearchId) -> Result<Vec<SavedSearchMatch>, RepositoryError>;
    fn mark_notified(
        &self,
        search: &SavedSearchId,
        properties: &[PropertyId],
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;
}

/// Read/write access to the property catalog as the matcher sees it.
pub trait PropertyCatalog: Send + Sync {
    fn fetch(&self, id: &PropertyId) -> Result<Option<PropertySnapshot>, RepositoryError>;
    /// All listings currently available for booking.
    fn available(&self) -> Result<Vec<PropertySnapshot>, RepositoryError>;
    fn upsert(&self, property: PropertySnapshot) -> Result<(), RepositoryError>;
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

/// Trait describing outbound alert delivery (email and in-app adapters).
pub trait AlertPublisher: Send + Sync {
    fn publish(&self, alert: SearchAlert) -> Result<(), AlertError>;
}

/// Alert payload handed to the delivery layer. `properties` carries every
/// listing covered by this (possibly batched) notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchAlert {
    pub template: String,
    pub search_id: SavedSearchId,
    pub user_id: UserId,
    pub properties: Vec<PropertyId>,
    pub details: BTreeMap<String, String>,
}

/// Alert dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("alert transport unavailable: {0}")]
    Transport(String),
}
