//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, EntityId, Error, ValidationErrors, and Listeners.

mod errors;
mod listeners;
mod values;
