//! Catalog lifecycle, configuration, and logging for Longhaul.
//!
//! This crate provides:
//! - [`Catalog`] - The context owning the filter registry and every entity store
//! - [`CatalogConfig`] - Page sizes, range filter domains, and logging options
//! - [`TripIssue`] and [`FlightClash`] - Findings of the catalog's trip checks
//! - [`init_tracing`] - Installs the process-wide `tracing` subscriber

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod catalog;
pub mod config;
pub mod itinerary;
pub mod logging;

pub use catalog::{Catalog, ROUTE_COUNT_COLUMN};
pub use config::CatalogConfig;
pub use itinerary::{FlightClash, TripIssue};
pub use logging::{LogConfig, init_tracing};
