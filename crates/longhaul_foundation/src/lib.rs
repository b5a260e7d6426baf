//! Core types, errors, values, and listener lists for Longhaul.
//!
//! This crate provides:
//! - [`Error`] - Error taxonomy with aggregated [`ValidationErrors`]
//! - [`EntityId`] - Identifiers assigned by the backing store
//! - [`Value`] - Column values with a total "nulls last" order
//! - [`Listeners`] - Snapshot-dispatched subscriber lists

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod entity;
pub mod error;
pub mod listener;
pub mod value;

pub use entity::EntityId;
pub use error::{
    Error, ErrorContext, ErrorKind, FieldKey, Result, StorageFault, ValidationErrors,
};
pub use listener::{Callback, ListenerFailure, ListenerId, Listeners};
pub use value::Value;
