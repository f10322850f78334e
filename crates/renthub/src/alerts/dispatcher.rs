use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::{PropertyId, PropertySnapshot};

use super::domain::{AlertFrequency, SavedSearch, SavedSearchId, SavedSearchMatch};
use super::matcher;
use super::repository::{
    AlertError, AlertPublisher, MatchRepository, PropertyCatalog, RepositoryError,
    SavedSearchRepository, SearchAlert,
};

/// Orchestrates the matcher against the catalog and the stored searches, and
/// owns match dedup and notification throttling.
///
/// Every entry point is idempotent with respect to already-recorded matches:
/// re-running one produces no duplicate rows and no duplicate instant alerts.
/// A failure while processing one search or property is logged and does not
/// abort the rest of the batch.
pub struct MatchDispatcher<S, M, P, A> {
    searches: Arc<S>,
    matches: Arc<M>,
    catalog: Arc<P>,
    alerts: Arc<A>,
}

/// Per-invocation accounting, returned to callers and surfaced by the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub searches_evaluated: usize,
    pub new_matches: usize,
    pub alerts_sent: usize,
    pub failures: usize,
}

/// Error raised when an entry point cannot run at all. Per-item failures
/// inside a batch are counted in the summary instead.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Alert(#[from] AlertError),
}

/// Throttle rule for the scheduled/batch path: a search that has never been
/// notified is eligible immediately; otherwise the cadence's minimum gap must
/// have elapsed since the last alert.
pub fn should_send_alert(search: &SavedSearch, now: DateTime<Utc>) -> bool {
    match search.last_alert_sent_at {
        None => true,
        Some(last) => {
            let elapsed_hours = now.signed_duration_since(last).num_hours();
            elapsed_hours >= search.frequency.min_hours_between_alerts()
        }
    }
}

impl<S, M, P, A> MatchDispatcher<S, M, P, A>
where
    S: SavedSearchRepository + 'static,
    M: MatchRepository + 'static,
    P: PropertyCatalog + 'static,
    A: AlertPublisher + 'static,
{
    pub fn new(searches: Arc<S>, matches: Arc<M>, catalog: Arc<P>, alerts: Arc<A>) -> Self {
        Self {
            searches,
            matches,
            catalog,
            alerts,
        }
    }

    /// React to a property being created or updated: evaluate it against all
    /// active searches, record new matches, and deliver instant alerts.
    /// Unavailable or unknown properties are skipped without error.
    pub fn on_property_changed(
        &self,
        property_id: &PropertyId,
        now: DateTime<Utc>,
    ) -> Result<DispatchSummary, DispatchError> {
        let mut summary = DispatchSummary::default();

        let Some(property) = self.catalog.fetch(property_id)? else {
            debug!(property = %property_id.0, "property not in catalog, skipping");
            return Ok(summary);
        };
        if !property.is_available() {
            debug!(
                property = %property.id.0,
                status = property.status.label(),
                "property not available, skipping"
            );
            return Ok(summary);
        }

        for search in self.searches.active()? {
            summary.searches_evaluated += 1;
            if !matcher::matches(&property, &search.criteria) {
                continue;
            }

            match self.record_and_notify_instant(&search, &property, now) {
                Ok((new_match, alerted)) => {
                    summary.new_matches += usize::from(new_match);
                    summary.alerts_sent += usize::from(alerted);
                }
                Err(error) => {
                    warn!(
                        search = %search.id.0,
                        property = %property.id.0,
                        error = %error,
                        "failed to process match, continuing batch"
                    );
                    summary.failures += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Re-check one search against the whole available catalog, typically
    /// after the user created or edited it. New matches produce a single
    /// batch notification when alerts are enabled; the scheduled throttle
    /// does not apply to this direct path.
    pub fn on_saved_search_changed(
        &self,
        search_id: &SavedSearchId,
        now: DateTime<Utc>,
    ) -> Result<DispatchSummary, DispatchError> {
        let mut summary = DispatchSummary::default();

        let search = self
            .searches
            .fetch(search_id)?
            .ok_or(RepositoryError::NotFound)?;
        if !search.is_active {
            debug!(search = %search.id.0, "search inactive, skipping re-check");
            return Ok(summary);
        }
        summary.searches_evaluated = 1;

        let mut fresh = Vec::new();
        for property in self.catalog.available()? {
            if !matcher::matches(&property, &search.criteria) {
                continue;
            }
            let record = SavedSearchMatch::new(search.id.clone(), property.id.clone(), now);
            match self.matches.insert_if_absent(record) {
                Ok(true) => fresh.push(property.id.clone()),
                Ok(false) => {}
                Err(error) => {
                    warn!(
                        search = %search.id.0,
                        property = %property.id.0,
                        error = %error,
                        "failed to record match, continuing batch"
                    );
                    summary.failures += 1;
                }
            }
        }
        summary.new_matches = fresh.len();

        if !fresh.is_empty() && search.may_notify() {
            self.alerts.publish(batch_alert("saved_search_refreshed", &search, &fresh))?;
            self.matches.mark_notified(&search.id, &fresh, now)?;
            summary.alerts_sent = 1;
        }

        Ok(summary)
    }

    /// Scheduled sweep for one cadence: every active, alert-enabled search on
    /// that cadence gets at most one batch alert covering its unnotified
    /// matches, subject to [`should_send_alert`].
    pub fn on_scheduled_tick(
        &self,
        frequency: AlertFrequency,
        now: DateTime<Utc>,
    ) -> Result<DispatchSummary, DispatchError> {
        let mut summary = DispatchSummary::default();

        for search in self.searches.active_with_frequency(frequency)? {
            summary.searches_evaluated += 1;

            match self.flush_search(search, now) {
                Ok(Some(batch)) => {
                    summary.new_matches += batch;
                    summary.alerts_sent += 1;
                }
                Ok(None) => {}
                Err(error) => {
                    warn!(
                        frequency = frequency.label(),
                        error = %error,
                        "failed to flush search alerts, continuing batch"
                    );
                    summary.failures += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Persist a new search, then run the direct re-check for it.
    pub fn create_search(
        &self,
        search: SavedSearch,
        now: DateTime<Utc>,
    ) -> Result<(SavedSearch, DispatchSummary), DispatchError> {
        let stored = self.searches.insert(search)?;
        let summary = self.on_saved_search_changed(&stored.id, now)?;
        Ok((stored, summary))
    }

    /// Load feed snapshots into the catalog, firing the property-changed path
    /// for each. Per-property failures are counted, not fatal.
    pub fn ingest_properties(
        &self,
        properties: Vec<PropertySnapshot>,
        now: DateTime<Utc>,
    ) -> Result<DispatchSummary, DispatchError> {
        let mut summary = DispatchSummary::default();

        for property in properties {
            let property_id = property.id.clone();
            let outcome = self
                .catalog
                .upsert(property)
                .map_err(DispatchError::from)
                .and_then(|()| self.on_property_changed(&property_id, now));
            match outcome {
                Ok(partial) => {
                    summary.searches_evaluated += partial.searches_evaluated;
                    summary.new_matches += partial.new_matches;
                    summary.alerts_sent += partial.alerts_sent;
                    summary.failures += partial.failures;
                }
                Err(error) => {
                    warn!(property = %property_id.0, error = %error, "failed to ingest property");
                    summary.failures += 1;
                }
            }
        }

        Ok(summary)
    }

    /// All recorded matches for a search, for API listings.
    pub fn matches_for(
        &self,
        search_id: &SavedSearchId,
    ) -> Result<Vec<SavedSearchMatch>, DispatchError> {
        Ok(self.matches.for_search(search_id)?)
    }

    fn record_and_notify_instant(
        &self,
        search: &SavedSearch,
        property: &PropertySnapshot,
        now: DateTime<Utc>,
    ) -> Result<(bool, bool), DispatchError> {
        let record = SavedSearchMatch::new(search.id.clone(), property.id.clone(), now);
        let new_match = self.matches.insert_if_absent(record)?;
        if !new_match {
            return Ok((false, false));
        }

        if search.frequency == AlertFrequency::Instant && search.may_notify() {
            let mut details = BTreeMap::new();
            details.insert("property_title".to_string(), property.title.clone());
            details.insert("city".to_string(), property.city.clone());
            self.alerts.publish(SearchAlert {
                template: "instant_match".to_string(),
                search_id: search.id.clone(),
                user_id: search.user_id.clone(),
                properties: vec![property.id.clone()],
                details,
            })?;
            self.matches
                .mark_notified(&search.id, &[property.id.clone()], now)?;
            return Ok((true, true));
        }

        Ok((true, false))
    }

    /// Returns the batch size when an alert went out, `None` when the search
    /// was throttled or had nothing unnotified.
    fn flush_search(
        &self,
        mut search: SavedSearch,
        now: DateTime<Utc>,
    ) -> Result<Option<usize>, DispatchError> {
        if !should_send_alert(&search, now) {
            return Ok(None);
        }

        let pending = self.matches.unnotified(&search.id)?;
        if pending.is_empty() {
            return Ok(None);
        }

        let property_ids: Vec<PropertyId> =
            pending.iter().map(|record| record.property_id.clone()).collect();
        self.alerts
            .publish(batch_alert("scheduled_digest", &search, &property_ids))?;
        self.matches.mark_notified(&search.id, &property_ids, now)?;

        search.last_alert_sent_at = Some(now);
        search.notification_count += 1;
        self.searches.update(search)?;

        Ok(Some(property_ids.len()))
    }
}

fn batch_alert(template: &str, search: &SavedSearch, properties: &[PropertyId]) -> SearchAlert {
    let mut details = BTreeMap::new();
    details.insert("search_name".to_string(), search.name.clone());
    details.insert("match_count".to_string(), properties.len().to_string());
    SearchAlert {
        template: template.to_string(),
        search_id: search.id.clone(),
        user_id: search.user_id.clone(),
        properties: properties.to_vec(),
        details,
    }
}
