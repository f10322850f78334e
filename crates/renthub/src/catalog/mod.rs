//! Property snapshots shared by the matching and alerting modules, plus the
//! CSV listing feed importer used to hydrate the catalog.

pub mod domain;
mod feed;

pub use domain::{normalize_amenity, PropertyId, PropertySnapshot, PropertyStatus, PropertyType};
pub use feed::{parse_feed, PropertyFeedError};
