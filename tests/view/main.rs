//! Integration tests for Layer 3: Views
//!
//! Tests for sentinel-row pagination and reactive refresh.

mod pagination;
