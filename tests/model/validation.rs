//! Integration tests for the shared validators

use longhaul_model::validate::{
    check_code, check_plane_types, check_range, check_takeoff_times, normalize_text,
    split_plane_types,
};

#[test]
fn placeholders_normalize_to_none() {
    for raw in ["", "   ", "\"\"", "-", "N/A", "\\N"] {
        assert_eq!(normalize_text(Some(raw)), None, "{raw:?}");
    }
    assert_eq!(normalize_text(Some("  Qantas ")), Some("Qantas".to_string()));
    assert_eq!(normalize_text(None), None);
}

#[test]
fn codes() {
    assert_eq!(check_code(Some("akl"), 3..=3, "bad"), Ok(Some("AKL".to_string())));
    assert_eq!(check_code(Some("N/A"), 3..=3, "bad"), Ok(None));
    assert_eq!(check_code(Some("AK-L"), 3..=4, "bad"), Err("bad".to_string()));
}

#[test]
fn ranges_are_closed() {
    assert!(check_range(10, 0..=10, "r").is_ok());
    assert!(check_range(f64::NAN, -90.0..=90.0, "r").is_err());
}

#[test]
fn takeoff_list_none_is_one_failure() {
    let errors = check_takeoff_times("TakeoffTimes", None).unwrap_err();
    assert_eq!(errors.len(), 1);
}

#[test]
fn plane_type_list() {
    let types = split_plane_types("320  73H ATR");
    assert_eq!(types.len(), 3);
    assert_eq!(check_plane_types(types.as_slice()).unwrap(), vec!["320", "73H", "ATR"]);
    assert!(check_plane_types(["B7"].as_slice()).is_err());
}
