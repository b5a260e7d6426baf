//! Backing stores and reactive entity stores for Longhaul.
//!
//! This crate provides:
//! - [`Backend`] - Keyed CRUD plus a page query primitive
//! - [`MemoryBackend`] - Persistent-map backend with fault injection
//! - [`PageQuery`] - Sort, predicates, limit and offset
//! - [`DerivedColumn`] - Columns computed from other collections
//! - [`EntityStore`] - One collection per entity kind, publishing changes

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod backend;
pub mod derived;
pub mod memory;
pub mod query;
pub mod store;

pub use backend::Backend;
pub use derived::DerivedColumn;
pub use longhaul_filter::Predicate;
pub use memory::{FaultSwitch, MemoryBackend};
pub use query::{PageQuery, SortDirection, SortOrder};
pub use store::{BatchReport, ChangeEvent, ChangeKind, EntityStore};
