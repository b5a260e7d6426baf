//! Validated aviation entities for Longhaul.
//!
//! This crate provides:
//! - [`validate`] - Pure field checks shared by every entity kind
//! - [`Airline`], [`Airport`], [`Route`], [`Trip`] - Stored entity kinds
//! - [`TripFlight`] - A leg of a trip
//! - [`Record`] - What an entity store needs from an entity kind
//!
//! Every entity is built from a draft and edited through setters. Each
//! mutation validates the whole candidate record and either commits every
//! change or returns every violated rule, leaving the entity untouched.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod airline;
pub mod airport;
pub mod dst;
pub mod record;
pub mod route;
pub mod trip;
pub mod validate;

pub use airline::{Airline, AirlineDraft};
pub use airport::{Airport, AirportDraft};
pub use dst::DstType;
pub use record::Record;
pub use route::{Route, RouteDraft, RouteKey};
pub use trip::{Trip, TripDraft, TripFlight, TripFlightDraft};
