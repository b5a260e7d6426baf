//! Integration tests for range filters

use longhaul_filter::{Predicate, RangeFilter};
use longhaul_foundation::{ErrorKind, Value};

#[test]
fn inverted_domain_fails_construction() {
    let err = RangeFilter::new("By Price", 10.0, 9.0, 1.0).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidFilter(_)));
    assert!(RangeFilter::new("By Price", 5.0, 5.0, 1.0).is_err());
}

#[test]
fn bounds_inside_domain_accepted() {
    let mut filter = RangeFilter::new("By Price", 0.0, 100.0, 1.0).unwrap();
    assert!(filter.set_bounds(50.0, 75.0).unwrap());
    assert_eq!(filter.bounds(), (50.0, 75.0));
    assert!(filter.contains(60.0));
    assert!(!filter.contains(76.0));
}

#[test]
fn bounds_clamped_into_domain() {
    let mut filter = RangeFilter::new("By Price", 0.0, 100.0, 1.0).unwrap();
    filter.set_bounds(-20.0, 500.0).unwrap();
    assert_eq!(filter.bounds(), (0.0, 100.0));
    assert!(!filter.is_active());
}

#[test]
fn inverted_bounds_rejected_unchanged() {
    let mut filter = RangeFilter::new("By Price", 0.0, 100.0, 1.0).unwrap();
    filter.set_bounds(10.0, 20.0).unwrap();
    assert!(filter.set_bounds(30.0, 20.0).is_err());
    assert_eq!(filter.bounds(), (10.0, 20.0));
}

#[test]
fn edge_bound_is_open() {
    let mut filter = RangeFilter::new("By Price", 0.0, 100.0, 1.0).unwrap();
    assert!(filter.predicate("Price").is_none());

    filter.set_bounds(0.0, 40.0).unwrap();
    assert_eq!(filter.open_bounds(), (None, Some(40.0)));
    let predicate = filter.predicate("Price").unwrap();
    assert!(predicate.matches(&Value::Int(-5)));
    assert!(!predicate.matches(&Value::Int(41)));
    assert!(!predicate.matches(&Value::Null));
}

#[test]
fn reset_restores_domain() {
    let mut filter = RangeFilter::new("By Duration", 0.0, 1440.0, 5.0).unwrap();
    filter.set_bounds(60.0, 120.0).unwrap();
    assert!(filter.reset());
    assert!(!filter.reset());
    assert_eq!(filter.bounds(), (0.0, 1440.0));
    assert!((filter.step() - 5.0).abs() < f64::EPSILON);
}

#[test]
fn predicate_display() {
    let p = Predicate::between("Price", Some(10.0), Some(20.0));
    assert_eq!(p.to_string(), "10 <= Price <= 20");
}
