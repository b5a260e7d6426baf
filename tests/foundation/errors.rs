//! Integration tests for the error taxonomy
//!
//! Tests aggregated field errors and the distinct recoverable kinds.

use longhaul_foundation::{
    EntityId, Error, ErrorContext, ErrorKind, FieldKey, StorageFault, ValidationErrors,
};

// =============================================================================
// ValidationErrors
// =============================================================================

#[test]
fn collects_every_violation_in_order() {
    let mut errors = ValidationErrors::new();
    errors.insert("Name", "Name must be at least 3 characters long");
    errors.insert(FieldKey::element("TakeoffTimes", 2), "Duplicate takeoff time encountered");
    errors.insert("Country", "Country name cannot be empty");

    let keys: Vec<String> = errors.iter().map(|(k, _)| k.to_string()).collect();
    assert_eq!(keys, vec!["Name", "TakeoffTimes[2]", "Country"]);
    assert_eq!(errors.len(), 3);
}

#[test]
fn same_key_reasons_are_joined() {
    let mut errors = ValidationErrors::new();
    errors.insert("Name", "too short");
    errors.insert("Name", "contains ';'");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get("Name"), Some("too short AND contains ';'"));
}

#[test]
fn indexed_lookup_is_separate_from_field() {
    let mut errors = ValidationErrors::new();
    errors.insert(FieldKey::element("TakeoffTimes", 0), "null");
    assert!(errors.get("TakeoffTimes").is_none());
    assert_eq!(errors.get_indexed("TakeoffTimes", 0), Some("null"));
    assert!(errors.contains("TakeoffTimes"));
}

#[test]
fn empty_errors_pass_value_through() {
    assert_eq!(ValidationErrors::new().into_result(7).unwrap(), 7);

    let mut errors = ValidationErrors::new();
    errors.insert("Icao", "bad");
    let err = errors.into_result(7).unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("(1)"));
}

// =============================================================================
// Error kinds
// =============================================================================

#[test]
fn kinds_are_distinguishable() {
    let conflict = Error::uniqueness_conflict("airline", "Iata", "NZ");
    let storage = Error::storage(StorageFault::Unavailable);
    let validation = Error::invalid_field("Name", "too short");

    assert!(conflict.is_uniqueness_conflict() && !conflict.is_validation());
    assert!(storage.is_storage() && !storage.is_uniqueness_conflict());
    assert!(validation.is_validation() && !validation.is_storage());
}

#[test]
fn conflict_message_names_value() {
    let err = Error::uniqueness_conflict("airline", "Iata", "NZ");
    assert!(err.to_string().contains("'NZ'"));
    assert!(matches!(
        err.kind,
        ErrorKind::UniquenessConflict { field: "Iata", .. }
    ));
}

#[test]
fn context_is_displayed() {
    let err = Error::not_found("route", EntityId::new(3)).with_context(
        ErrorContext::new()
            .with_operation("delete")
            .with_entity("route")
            .with_id(EntityId::new(3)),
    );
    assert_eq!(err.to_string(), "route not found: #3 (in delete of route #3)");
    let context = err.context.map(|c| c.to_string()).unwrap_or_default();
    assert_eq!(context, "in delete of route #3");
}
