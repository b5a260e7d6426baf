//! Integration tests for routes

use longhaul_model::route::{self, field};
use longhaul_model::{Route, RouteDraft};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn draft() -> RouteDraft {
    RouteDraft::new("NZ", "AKL", "WLG")
        .with_plane_types(["320", "atr"])
        .with_price(120)
        .with_duration(60)
        .with_takeoff_times([900, 420])
}

#[test]
fn valid_route_sorted_schedule() {
    let route = Route::new(draft()).unwrap();
    assert_eq!(route.takeoff_times(), &[420, 900]);
    assert_eq!(route.plane_types(), &["320".to_string(), "ATR".to_string()]);
    assert_eq!(route.key().to_string(), "NZ AKL-WLG");
}

#[test]
fn schedule_errors_per_position() {
    let mut route = Route::new(draft()).unwrap();
    let err = route
        .set_takeoff_times(Some([Some(60), None, Some(60), Some(1440), Some(-1)].as_slice()))
        .unwrap_err();
    let errors = err.validation_errors().unwrap();
    assert_eq!(errors.len(), 4);
    assert!(errors.get_indexed(field::TAKEOFF_TIMES, 0).is_none());
    for index in 1..=4 {
        assert!(errors.get_indexed(field::TAKEOFF_TIMES, index).is_some());
    }
    assert_eq!(route.takeoff_times(), &[420, 900]);
}

#[test]
fn missing_schedule_is_single_error() {
    let mut route = Route::new(draft()).unwrap();
    let err = route.set_takeoff_times(None).unwrap_err();
    let errors = err.validation_errors().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors.get(field::TAKEOFF_TIMES).is_some());
}

#[test]
fn price_and_duration_limits() {
    let mut route = Route::new(draft()).unwrap();
    assert!(route.set_price(-1).is_err());
    assert!(route.set_duration(1440).is_err());
    assert!(route.set_duration(1439).is_ok());
    assert_eq!(route.price(), 120);
}

#[test]
fn bad_plane_types_rejected_together() {
    let err = Route::new(draft().with_plane_types(["A", "TOOLONG"])).unwrap_err();
    let reason = err.validation_errors().unwrap().get(field::PLANE_TYPES).unwrap().to_string();
    assert!(reason.contains(" AND "));
}

#[test]
fn estimates() {
    let km = route::distance_km((-37.008, 174.792), (-33.946, 151.177));
    assert!((2100.0..2200.0).contains(&km));
    let duration = route::generate_duration(km);
    assert!((130..150).contains(&duration));

    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let price = route::generate_price(duration, &mut rng);
    let base = f64::from(duration) / 60.0 * route::COST_PER_HOUR;
    assert!(f64::from(price) >= base * 0.89 && f64::from(price) <= base * 1.11);
}

proptest! {
    #[test]
    fn generated_schedules_validate(duration in 0i32..1440, seed in any::<u64>()) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let times = route::generate_takeoff_times(duration, &mut rng);
        prop_assert!(!times.is_empty());
        let route = Route::new(draft().with_takeoff_times(times.clone()));
        prop_assert!(route.is_ok());
    }

    #[test]
    fn one_error_per_bad_position(times in prop::collection::vec(prop::option::of(-5i32..1450), 0..12)) {
        let mut route = Route::new(draft()).unwrap();
        let bad = times.iter().enumerate().filter(|(i, t)| match t {
            None => true,
            Some(t) => times[..*i].contains(&Some(*t)) || !(0..1440).contains(t),
        }).count();
        match route.set_takeoff_times(Some(times.as_slice())) {
            Ok(()) => prop_assert_eq!(bad, 0),
            Err(err) => prop_assert_eq!(err.validation_errors().unwrap().len(), bad),
        }
    }
}
