//! Integration tests for Value and EntityId

use longhaul_foundation::{EntityId, Value};
use proptest::prelude::*;

#[test]
fn numbers_compare_across_kinds() {
    assert!(Value::Int(2) < Value::Float(2.5));
    assert!(Value::Float(1.5) < Value::Int(2));
    assert_eq!(Value::Int(3), Value::Float(3.0));
}

#[test]
fn null_sorts_last() {
    let mut values = vec![Value::Null, Value::text("b"), Value::Int(1), Value::text("a")];
    values.sort();
    assert_eq!(
        values,
        vec![Value::Int(1), Value::text("a"), Value::text("b"), Value::Null]
    );
}

#[test]
fn text_order_is_case_sensitive() {
    assert!(Value::text("Zulu") < Value::text("alpha"));
}

#[test]
fn display_forms() {
    assert_eq!(Value::Null.to_string(), "");
    assert_eq!(Value::text("AKL").to_string(), "AKL");
    assert_eq!(Value::Int(42).to_string(), "42");
}

#[test]
fn option_converts_to_null() {
    assert!(Value::from(None::<&str>).is_null());
    assert_eq!(Value::from(Some("NZ")), Value::text("NZ"));
}

#[test]
fn entity_id_display() {
    let id = EntityId::new(42);
    assert_eq!(id.to_string(), "#42");
    assert_eq!(id.next().get(), 43);
}

proptest! {
    #[test]
    fn ordering_is_total(a in any::<i64>(), b in -1e9f64..1e9, s in "[a-zA-Z]{0,6}") {
        let values = [Value::Int(a), Value::Float(b), Value::text(&s), Value::Null];
        for x in &values {
            for y in &values {
                prop_assert_eq!(x.cmp(y), y.cmp(x).reverse());
            }
        }
    }
}
