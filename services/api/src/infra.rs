use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;

use renthub::alerts::{
    AlertError, AlertFrequency, AlertPublisher, MatchRepository, PropertyCatalog,
    RepositoryError as AlertRepositoryError, SavedSearch, SavedSearchId, SavedSearchMatch,
    SavedSearchRepository, SearchAlert,
};
use renthub::catalog::{PropertyId, PropertySnapshot};
use renthub::verification::{
    AuditEntry, AuditError, AuditTrail, GuestReference, GuestVerification, NotificationPublisher,
    NotifyError, ReferenceId, ReferenceRepository, RepositoryError, TrustScoreConfig, UserId,
    VerificationId, VerificationNotice, VerificationRepository,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Baseline scoring weights. Identity carries the largest single bonus, the
/// activity counters cap out so volume alone cannot saturate the score.
pub(crate) fn default_trust_config() -> TrustScoreConfig {
    TrustScoreConfig {
        base_score: 3.0,
        identity_verified_bonus: 0.8,
        background_clear_bonus: 0.4,
        credit_approved_bonus: 0.3,
        reference_bonus: 0.1,
        reference_bonus_cap: 0.5,
        completed_booking_bonus: 0.05,
        completed_booking_cap: 0.5,
        cancelled_booking_penalty: 0.2,
        positive_review_bonus: 0.05,
        positive_review_cap: 0.5,
        negative_review_penalty: 0.1,
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryVerificationRepository {
    records: Arc<Mutex<HashMap<VerificationId, GuestVerification>>>,
}

impl VerificationRepository for InMemoryVerificationRepository {
    fn insert(&self, record: GuestVerification) -> Result<GuestVerification, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id)
            || guard.values().any(|existing| existing.user_id == record.user_id)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: GuestVerification) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&record.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &VerificationId) -> Result<Option<GuestVerification>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn fetch_by_user(&self, user: &UserId) -> Result<Option<GuestVerification>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().find(|record| &record.user_id == user).cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryReferenceRepository {
    records: Arc<Mutex<HashMap<ReferenceId, GuestReference>>>,
}

impl ReferenceRepository for InMemoryReferenceRepository {
    fn insert(&self, reference: GuestReference) -> Result<GuestReference, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&reference.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(reference.id.clone(), reference.clone());
        Ok(reference)
    }

    fn update(&self, reference: GuestReference) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&reference.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(reference.id.clone(), reference);
        Ok(())
    }

    fn fetch(&self, id: &ReferenceId) -> Result<Option<GuestReference>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn fetch_by_token(&self, token: &str) -> Result<Option<GuestReference>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .find(|reference| reference.verification_token == token)
            .cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAuditTrail {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl InMemoryAuditTrail {
    pub(crate) fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().expect("audit mutex poisoned").clone()
    }
}

impl AuditTrail for InMemoryAuditTrail {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError> {
        self.entries.lock().expect("audit mutex poisoned").push(entry);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryNoticePublisher {
    events: Arc<Mutex<Vec<VerificationNotice>>>,
}

impl InMemoryNoticePublisher {
    pub(crate) fn events(&self) -> Vec<VerificationNotice> {
        self.events.lock().expect("notice mutex poisoned").clone()
    }
}

impl NotificationPublisher for InMemoryNoticePublisher {
    fn publish(&self, notice: VerificationNotice) -> Result<(), NotifyError> {
        self.events.lock().expect("notice mutex poisoned").push(notice);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySavedSearchRepository {
    records: Arc<Mutex<HashMap<SavedSearchId, SavedSearch>>>,
}

impl SavedSearchRepository for InMemorySavedSearchRepository {
    fn insert(&self, search: SavedSearch) -> Result<SavedSearch, AlertRepositoryError> {
        let mut guard = self.records.lock().expect("search mutex poisoned");
        if guard.contains_key(&search.id) {
            return Err(AlertRepositoryError::Conflict);
        }
        guard.insert(search.id.clone(), search.clone());
        Ok(search)
    }

    fn update(&self, search: SavedSearch) -> Result<(), AlertRepositoryError> {
        let mut guard = self.records.lock().expect("search mutex poisoned");
        if !guard.contains_key(&search.id) {
            return Err(AlertRepositoryError::NotFound);
        }
        guard.insert(search.id.clone(), search);
        Ok(())
    }

    fn fetch(&self, id: &SavedSearchId) -> Result<Option<SavedSearch>, AlertRepositoryError> {
        let guard = self.records.lock().expect("search mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn active(&self) -> Result<Vec<SavedSearch>, AlertRepositoryError> {
        let guard = self.records.lock().expect("search mutex poisoned");
        Ok(guard.values().filter(|search| search.is_active).cloned().collect())
    }

    fn active_with_frequency(
        &self,
        frequency: AlertFrequency,
    ) -> Result<Vec<SavedSearch>, AlertRepositoryError> {
        let guard = self.records.lock().expect("search mutex poisoned");
        Ok(guard
            .values()
            .filter(|search| {
                search.is_active && search.alerts_enabled && search.frequency == frequency
            })
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryMatchRepository {
    records: Arc<Mutex<Vec<SavedSearchMatch>>>,
}

impl MatchRepository for InMemoryMatchRepository {
    fn insert_if_absent(&self, record: SavedSearchMatch) -> Result<bool, AlertRepositoryError> {
        let mut guard = self.records.lock().expect("match mutex poisoned");
        let exists = guard.iter().any(|existing| {
            existing.search_id == record.search_id && existing.property_id == record.property_id
        });
        if exists {
            return Ok(false);
        }
        guard.push(record);
        Ok(true)
    }

    fn for_search(
        &self,
        search: &SavedSearchId,
    ) -> Result<Vec<SavedSearchMatch>, AlertRepositoryError> {
        let guard = self.records.lock().expect("match mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.search_id == search)
            .cloned()
            .collect())
    }

    fn unnotified(
        &self,
        search: &SavedSearchId,
    ) -> Result<Vec<SavedSearchMatch>, AlertRepositoryError> {
        let guard = self.records.lock().expect("match mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.search_id == search && !record.notified)
            .cloned()
            .collect())
    }

    fn mark_notified(
        &self,
        search: &SavedSearchId,
        properties: &[PropertyId],
        at: DateTime<Utc>,
    ) -> Result<(), AlertRepositoryError> {
        let mut guard = self.records.lock().expect("match mutex poisoned");
        for record in guard.iter_mut() {
            if &record.search_id == search && properties.contains(&record.property_id) {
                record.notified = true;
                record.notified_at = Some(at);
            }
        }
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPropertyCatalog {
    records: Arc<Mutex<HashMap<PropertyId, PropertySnapshot>>>,
}

impl PropertyCatalog for InMemoryPropertyCatalog {
    fn fetch(&self, id: &PropertyId) -> Result<Option<PropertySnapshot>, AlertRepositoryError> {
        let guard = self.records.lock().expect("catalog mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn available(&self) -> Result<Vec<PropertySnapshot>, AlertRepositoryError> {
        let guard = self.records.lock().expect("catalog mutex poisoned");
        Ok(guard
            .values()
            .filter(|property| property.is_available())
            .cloned()
            .collect())
    }

    fn upsert(&self, property: PropertySnapshot) -> Result<(), AlertRepositoryError> {
        let mut guard = self.records.lock().expect("catalog mutex poisoned");
        guard.insert(property.id.clone(), property);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAlertPublisher {
    events: Arc<Mutex<Vec<SearchAlert>>>,
}

impl InMemoryAlertPublisher {
    pub(crate) fn events(&self) -> Vec<SearchAlert> {
        self.events.lock().expect("alert mutex poisoned").clone()
    }
}

impl AlertPublisher for InMemoryAlertPublisher {
    fn publish(&self, alert: SearchAlert) -> Result<(), AlertError> {
        self.events.lock().expect("alert mutex poisoned").push(alert);
        Ok(())
    }
}
