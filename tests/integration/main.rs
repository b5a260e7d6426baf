//! End-to-end integration tests
//!
//! Tests that exercise the catalog, its stores, the shared filters, and paged
//! views together.

mod trips;
