//! Filters for Longhaul.
//!
//! This crate provides:
//! - [`RangeFilter`] - Inclusive bounds over a numeric domain
//! - [`MultiSelectFilter`] - A selection drawn from a live option universe
//! - [`TextPredicate`] - Case-insensitive substring matching
//! - [`Predicate`] - Column conditions handed to the backing store
//! - [`FilterRegistry`] - One filter per field plus a change stream
//!
//! Filters know nothing about entities; stores bind them to columns through
//! [`FilterBinding`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod multi_select;
pub mod predicate;
pub mod range;
pub mod registry;
pub mod text;

pub use multi_select::{MultiSelectFilter, OptionsAdapter, OptionsUpdate};
pub use predicate::Predicate;
pub use range::{RangeDomain, RangeFilter};
pub use registry::{
    DEFAULT_ROUTE_COUNT_DOMAIN, Filter, FilterBinding, FilterKey, FilterRegistry,
};
pub use text::TextPredicate;
