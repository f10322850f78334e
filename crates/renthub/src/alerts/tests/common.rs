use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use crate::alerts::domain::{
    AlertFrequency, SavedSearch, SavedSearchId, SavedSearchMatch, SearchCriteria,
};
use crate::alerts::dispatcher::MatchDispatcher;
use crate::alerts::repository::{
    AlertError, AlertPublisher, MatchRepository, PropertyCatalog, RepositoryError,
    SavedSearchRepository, SearchAlert,
};
use crate::alerts::router::alerts_router;
use crate::catalog::{PropertyId, PropertySnapshot, PropertyStatus, PropertyType};
use crate::verification::UserId;

pub(super) fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, hour, 0, 0).single().expect("valid timestamp")
}

pub(super) fn loft() -> PropertySnapshot {
    PropertySnapshot {
        id: PropertyId("prop-loft".to_string()),
        title: "Riverfront Loft".to_string(),
        city: "Des Moines".to_string(),
        property_type: PropertyType::Apartment,
        price_per_night: 140.0,
        bedrooms: 2,
        bathrooms: 1.5,
        max_guests: 4,
        amenities: vec!["WiFi".to_string(), "Washer / Dryer".to_string()],
        status: PropertyStatus::Available,
    }
}

pub(super) fn cabin() -> PropertySnapshot {
    PropertySnapshot {
        id: PropertyId("prop-cabin".to_string()),
        title: "Pine Ridge Cabin".to_string(),
        city: "Boone".to_string(),
        property_type: PropertyType::Cabin,
        price_per_night: 95.0,
        bedrooms: 1,
        bathrooms: 1.0,
        max_guests: 2,
        amenities: vec!["Fireplace".to_string()],
        status: PropertyStatus::Available,
    }
}

pub(super) fn search(id: &str, frequency: AlertFrequency) -> SavedSearch {
    SavedSearch {
        id: SavedSearchId(id.to_string()),
        user_id: UserId("guest-42".to_string()),
        name: format!("{id} watch"),
        criteria: SearchCriteria {
            location: Some("des moines".to_string()),
            max_price: Some(200.0),
            ..SearchCriteria::default()
        },
        frequency,
        is_active: true,
        alerts_enabled: true,
        last_alert_sent_at: None,
        notification_count: 0,
    }
}

pub(super) type TestDispatcher =
    MatchDispatcher<MemorySearches, MemoryMatches, MemoryCatalog, MemoryAlerts>;

pub(super) fn build_dispatcher() -> (
    TestDispatcher,
    Arc<MemorySearches>,
    Arc<MemoryMatches>,
    Arc<MemoryCatalog>,
    Arc<MemoryAlerts>,
) {
    let searches = Arc::new(MemorySearches::default());
    let matches = Arc::new(MemoryMatches::default());
    let catalog = Arc::new(MemoryCatalog::default());
    let alerts = Arc::new(MemoryAlerts::default());
    let dispatcher = MatchDispatcher::new(
        searches.clone(),
        matches.clone(),
        catalog.clone(),
        alerts.clone(),
    );
    (dispatcher, searches, matches, catalog, alerts)
}

pub(super) fn router_with_dispatcher(dispatcher: TestDispatcher) -> axum::Router {
    alerts_router(Arc::new(dispatcher))
}

#[derive(Default, Clone)]
pub(super) struct MemorySearches {
    records: Arc<Mutex<HashMap<SavedSearchId, SavedSearch>>>,
}

impl SavedSearchRepository for MemorySearches {
    fn insert(&self, search: SavedSearch) -> Result<SavedSearch, RepositoryError> {
        let mut guard = self.records.lock().expect("search mutex poisoned");
        if guard.contains_key(&search.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(search.id.clone(), search.clone());
        Ok(search)
    }

    fn update(&self, search: SavedSearch) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("search mutex poisoned");
        if !guard.contains_key(&search.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(search.id.clone(), search);
        Ok(())
    }

    fn fetch(&self, id: &SavedSearchId) -> Result<Option<SavedSearch>, RepositoryError> {
        let guard = self.records.lock().expect("search mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn active(&self) -> Result<Vec<SavedSearch>, RepositoryError> {
        let guard = self.records.lock().expect("search mutex poisoned");
        let mut active: Vec<SavedSearch> =
            guard.values().filter(|search| search.is_active).cloned().collect();
        active.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(active)
    }

    fn active_with_frequency(
        &self,
        frequency: AlertFrequency,
    ) -> Result<Vec<SavedSearch>, RepositoryError> {
        let guard = self.records.lock().expect("search mutex poisoned");
        let mut hits: Vec<SavedSearch> = guard
            .values()
            .filter(|search| {
                search.is_active && search.alerts_enabled && search.frequency == frequency
            })
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(hits)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryMatches {
    records: Arc<Mutex<Vec<SavedSearchMatch>>>,
}

impl MemoryMatches {
    pub(super) fn all(&self) -> Vec<SavedSearchMatch> {
        self.records.lock().expect("match mutex poisoned").clone()
    }
}

impl MatchRepository for MemoryMatches {
    fn insert_if_absent(&self, record: SavedSearchMatch) -> Result<bool, RepositoryError> {
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

    fn for_search(&self, search: &SavedSearchId) -> Result<Vec<SavedSearchMatch>, RepositoryError> {
        let guard = self.records.lock().expect("match mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.search_id == search)
            .cloned()
            .collect())
    }

    fn unnotified(&self, search: &SavedSearchId) -> Result<Vec<SavedSearchMatch>, RepositoryError> {
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
    ) -> Result<(), RepositoryError> {
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
pub(super) struct MemoryCatalog {
    records: Arc<Mutex<HashMap<PropertyId, PropertySnapshot>>>,
}

impl MemoryCatalog {
    pub(super) fn seed(&self, properties: impl IntoIterator<Item = PropertySnapshot>) {
        let mut guard = self.records.lock().expect("catalog mutex poisoned");
        for property in properties {
            guard.insert(property.id.clone(), property);
        }
    }
}

impl PropertyCatalog for MemoryCatalog {
    fn fetch(&self, id: &PropertyId) -> Result<Option<PropertySnapshot>, RepositoryError> {
        let guard = self.records.lock().expect("catalog mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn available(&self) -> Result<Vec<PropertySnapshot>, RepositoryError> {
        let guard = self.records.lock().expect("catalog mutex poisoned");
        let mut listings: Vec<PropertySnapshot> = guard
            .values()
            .filter(|property| property.is_available())
            .cloned()
            .collect();
        listings.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(listings)
    }

    fn upsert(&self, property: PropertySnapshot) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("catalog mutex poisoned");
        guard.insert(property.id.clone(), property);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryAlerts {
    events: Arc<Mutex<Vec<SearchAlert>>>,
}

impl MemoryAlerts {
    pub(super) fn events(&self) -> Vec<SearchAlert> {
        self.events.lock().expect("alert mutex poisoned").clone()
    }
}

impl AlertPublisher for MemoryAlerts {
    fn publish(&self, alert: SearchAlert) -> Result<(), AlertError> {
        self.events.lock().expect("alert mutex poisoned").push(alert);
        Ok(())
    }
}

/// Publisher that always fails, for exercising the per-item failure path.
pub(super) struct BrokenAlerts;

impl AlertPublisher for BrokenAlerts {
    fn publish(&self, _alert: SearchAlert) -> Result<(), AlertError> {
        Err(AlertError::Transport("smtp relay down".to_string()))
    }
}
