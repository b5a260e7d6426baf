//! Integration tests for airlines

use longhaul_model::airline::field;
use longhaul_model::{Airline, AirlineDraft, Record};
use longhaul_foundation::Value;
use proptest::prelude::*;

fn qantas() -> Airline {
    Airline::new(
        AirlineDraft::default()
            .with_name("Qantas")
            .with_callsign("QANTAS")
            .with_iata("qf")
            .with_icao("QFA")
            .with_country("Australia"),
    )
    .unwrap()
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn codes_are_upper_cased() {
    let airline = qantas();
    assert_eq!(airline.iata(), Some("QF"));
    assert_eq!(airline.code(), "QF");
    assert!(airline.is_memory_only());
}

#[test]
fn constructor_reports_every_violation() {
    let err = Airline::new(
        AirlineDraft::default()
            .with_name("Q;")
            .with_callsign("A;B")
            .with_iata("QFX")
            .with_icao("Q"),
    )
    .unwrap_err();
    let errors = err.validation_errors().unwrap();
    for name in [field::NAME, field::CALLSIGN, field::IATA, field::ICAO, field::COUNTRY] {
        assert!(errors.contains(name), "missing {name}");
    }
}

#[test]
fn placeholder_callsign_is_absent() {
    let airline = Airline::new(
        AirlineDraft::default()
            .with_name("Qantas")
            .with_callsign("\\N")
            .with_icao("QFA")
            .with_country("Australia"),
    )
    .unwrap();
    assert_eq!(airline.callsign(), None);
    assert_eq!(airline.code(), "QFA");
}

// =============================================================================
// Paired codes
// =============================================================================

#[test]
fn clearing_iata_needs_icao() {
    let mut airline = qantas();
    airline.set_iata(None).unwrap();
    assert_eq!(airline.code(), "QFA");

    let err = airline.set_icao(Some("")).unwrap_err();
    let errors = err.validation_errors().unwrap();
    assert!(errors.contains(field::ICAO));
    assert_eq!(airline.icao(), Some("QFA"));
}

#[test]
fn both_codes_blank_reports_both_fields() {
    let err = Airline::new(
        AirlineDraft::default()
            .with_name("Qantas")
            .with_country("Australia"),
    )
    .unwrap_err();
    let errors = err.validation_errors().unwrap();
    assert!(errors.contains(field::IATA));
    assert!(errors.contains(field::ICAO));
}

#[test]
fn rejected_edit_leaves_every_field() {
    let mut airline = qantas();
    let before = airline.clone();
    let err = airline
        .edit(|d| {
            d.name = Some("Qantas Airways".into());
            d.country = None;
        })
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(airline.name(), before.name());
    assert_eq!(airline.country(), before.country());
}

#[test]
fn columns_expose_values() {
    let airline = qantas();
    assert_eq!(airline.value(field::CODE), Value::text("QF"));
    assert!(airline.value("Nonexistent").is_null());
    assert!(airline.matches_key("qfa"));
}

proptest! {
    #[test]
    fn clearing_one_code_fails_iff_other_blank(
        iata in prop::option::of("[A-Z0-9]{2}"),
        icao in prop::option::of("[A-Z0-9]{3}"),
    ) {
        prop_assume!(iata.is_some() || icao.is_some());
        let mut draft = AirlineDraft::default().with_name("Test Air").with_country("Nowhere");
        draft.iata = iata.clone();
        draft.icao = icao.clone();
        let airline = Airline::new(draft).unwrap();

        let mut a = airline.clone();
        prop_assert_eq!(a.set_iata(None).is_err(), icao.is_none());
        let mut b = airline.clone();
        prop_assert_eq!(b.set_icao(None).is_err(), iata.is_none());
    }
}
