//! Saved-search alerting: criteria matching, deduplicated match records, and
//! throttled notification dispatch.
//!
//! [`matcher::matches`] is the pure predicate; [`dispatcher::MatchDispatcher`]
//! orchestrates it from the three entry points the scheduler and domain-event
//! hooks invoke.

pub mod dispatcher;
pub mod domain;
pub mod matcher;
pub mod repository;
pub mod router;

#[cfg(test)]
mod tests;

pub use dispatcher::{should_send_alert, DispatchError, DispatchSummary, MatchDispatcher};
pub use domain::{AlertFrequency, SavedSearch, SavedSearchId, SavedSearchMatch, SearchCriteria};
pub use matcher::matches;
pub use repository::{
    AlertError, AlertPublisher, MatchRepository, PropertyCatalog, RepositoryError,
    SavedSearchRepository, SearchAlert,
};
pub use router::alerts_router;
