//! Paged views for Longhaul.
//!
//! This crate provides:
//! - [`PagedView`] - A per-consumer cursor over a store's sorted, filtered records
//! - [`Transition`] - The navigation steps a view recomputes its window for
//! - [`PageEvent`] - Published to view listeners after each window change

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod paged;

pub use paged::{PageEvent, PagedView, Transition};
