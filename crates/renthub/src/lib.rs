//! Core services for the RentHub rental marketplace.
//!
//! The crate is organized around two business-rule engines: guest
//! verification (identity review, references, credit checks, and the derived
//! trust score) under [`verification`], and saved-search alerting (criteria
//! matching, match dedup, and throttled notification dispatch) under
//! [`alerts`]. The [`catalog`] module carries the property snapshot types
//! shared by both plus a CSV feed importer.

pub mod alerts;
pub mod catalog;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod verification;
