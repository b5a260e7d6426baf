//! Integration tests for the in-memory backend and page queries

use longhaul_foundation::{EntityId, StorageFault, Value};
use longhaul_model::{Route, RouteDraft, RouteKey};
use longhaul_storage::{Backend, MemoryBackend, PageQuery, Predicate, SortOrder};

fn route(source: &str, destination: &str, price: i32) -> Route {
    Route::new(RouteDraft::new("NZ", source, destination).with_price(price)).unwrap()
}

fn filled() -> MemoryBackend<Route> {
    let mut backend = MemoryBackend::new();
    for (s, d, p) in [
        ("AKL", "WLG", 120),
        ("AKL", "CHC", 150),
        ("WLG", "AKL", 120),
        ("CHC", "AKL", 90),
        ("AKL", "SYD", 400),
    ] {
        backend.insert(route(s, d, p)).unwrap();
    }
    backend
}

#[test]
fn ids_assigned_in_order() {
    let backend = filled();
    let ids: Vec<u64> = backend
        .all()
        .unwrap()
        .iter()
        .filter_map(|r| longhaul_model::Record::id(r).map(EntityId::get))
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[test]
fn duplicate_route_key_conflicts() {
    let mut backend = filled();
    let err = backend.insert(route("akl", "wlg", 999)).unwrap_err();
    assert!(err.is_uniqueness_conflict());
    assert_eq!(backend.len().unwrap(), 5);
}

#[test]
fn find_by_route_key() {
    let backend = filled();
    let key = RouteKey {
        airline: "NZ".into(),
        source: "CHC".into(),
        destination: "AKL".into(),
    };
    assert_eq!(backend.find(&key).unwrap().unwrap().price(), 90);
}

#[test]
fn query_sorts_filters_and_pages() {
    let backend = filled();
    let query = PageQuery::new(2, 1)
        .sorted_by(SortOrder::descending("Price"))
        .with_predicates([Predicate::one_of("Source", [Value::text("AKL")])]);
    let page = backend.query(&query).unwrap();
    let prices: Vec<i32> = page.iter().map(Route::price).collect();
    assert_eq!(prices, vec![150, 120]);
}

#[test]
fn ties_break_by_id() {
    let backend = filled();
    let query = PageQuery::new(10, 0).sorted_by(SortOrder::ascending("Price"));
    let page = backend.query(&query).unwrap();
    let sources: Vec<&str> = page.iter().map(Route::source).collect();
    assert_eq!(sources, vec!["CHC", "AKL", "WLG", "AKL", "AKL"]);
}

#[test]
fn unknown_sort_column_rejected() {
    let backend = filled();
    let query = PageQuery::new(10, 0).sorted_by(SortOrder::ascending("Altitude"));
    assert!(backend.query(&query).is_err());
}

#[test]
fn count_and_distinct() {
    let backend = filled();
    assert_eq!(backend.count_eq("Source", &Value::text("AKL")).unwrap(), 3);
    let sources = backend.distinct("Source").unwrap();
    assert_eq!(sources.len(), 3);
}

#[test]
fn offline_backend_fails_every_call() {
    let mut backend = filled();
    backend.set_offline(true);
    assert!(backend.all().unwrap_err().is_storage());
    assert!(backend.insert(route("SYD", "MEL", 1)).unwrap_err().is_storage());
    assert!(backend.delete(EntityId::new(1)).unwrap_err().is_storage());

    let switch = backend.fault_switch();
    switch.fail_with(StorageFault::Corrupted("page checksum".into()));
    assert!(backend.get(EntityId::new(1)).unwrap_err().to_string().contains("checksum"));
    switch.restore();
    assert_eq!(backend.len().unwrap(), 5);
}
