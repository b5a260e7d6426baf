//! Longhaul - Validated aviation reference data with reactive, filtered pagination
//!
//! This crate re-exports all layers of the Longhaul system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 4: longhaul_runtime    - Catalog lifecycle, configuration, logging setup
//! Layer 3: longhaul_view       - Sentinel-row paged views
//! Layer 2: longhaul_storage    - Backends and reactive entity stores
//! Layer 1: longhaul_filter     - Range and multi-select filters, filter registry
//!          longhaul_model      - Validated airlines, airports, routes, trips
//! Layer 0: longhaul_foundation - Core types (Value, EntityId, Error, Listeners)
//! ```

pub use longhaul_filter as filter;
pub use longhaul_foundation as foundation;
pub use longhaul_model as model;
pub use longhaul_runtime as runtime;
pub use longhaul_storage as storage;
pub use longhaul_view as view;
