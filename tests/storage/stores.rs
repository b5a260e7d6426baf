//! Integration tests for entity stores

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use longhaul_filter::{FilterBinding, FilterKey, FilterRegistry, RangeDomain};
use longhaul_foundation::Value;
use longhaul_model::{Airport, AirportDraft, Record, Route, RouteDraft};
use longhaul_storage::{ChangeKind, EntityStore, MemoryBackend, SortOrder};

fn registry() -> Rc<FilterRegistry> {
    Rc::new(
        FilterRegistry::with_defaults(
            RangeDomain::new(0.0, 5000.0, 10.0),
            RangeDomain::new(0.0, 50000.0, 100.0),
        )
        .unwrap(),
    )
}

fn route_store(registry: &Rc<FilterRegistry>) -> EntityStore<Route> {
    EntityStore::in_memory(
        Rc::clone(registry),
        vec![
            FilterBinding::new(FilterKey::RouteSource, "Source"),
            FilterBinding::new(FilterKey::RouteDestination, "Destination"),
            FilterBinding::new(FilterKey::RoutePrice, "Price"),
        ],
    )
}

fn route(source: &str, destination: &str, price: i32) -> Route {
    Route::new(RouteDraft::new("NZ", source, destination).with_price(price)).unwrap()
}

fn airport(name: &str, icao: &str) -> Airport {
    Airport::new(
        AirportDraft::default()
            .with_name(name)
            .with_city(name)
            .with_country("New Zealand")
            .with_icao(icao),
    )
    .unwrap()
}

#[test]
fn duplicate_natural_key_is_conflict_and_size_unchanged() {
    let r = registry();
    let store = EntityStore::in_memory(Rc::clone(&r), Vec::new());
    store.save(airport("Auckland", "NZAA")).unwrap();
    let err = store.save(airport("Auckland Two", "nzaa")).unwrap_err();
    assert!(err.is_uniqueness_conflict());
    assert!(!err.is_validation());
    assert_eq!(store.len().unwrap(), 1);
}

#[test]
fn universes_follow_data_and_notify_before_store_listeners() {
    let r = registry();
    let store = Rc::new(route_store(&r));
    let order = Rc::new(RefCell::new(Vec::new()));

    let o = Rc::clone(&order);
    r.register_listener(move || {
        o.borrow_mut().push("filters");
        Ok(())
    });
    let o = Rc::clone(&order);
    store.register_listener(move |event| {
        assert_eq!(event.kind, ChangeKind::Inserted);
        o.borrow_mut().push("data");
        Ok(())
    });

    store.save(route("AKL", "WLG", 100)).unwrap();
    assert_eq!(*order.borrow(), vec!["filters", "data"]);
    assert_eq!(r.options(FilterKey::RouteSource).unwrap().len(), 1);
}

#[test]
fn filtered_sorted_page() {
    let r = registry();
    let store = route_store(&r);
    store
        .save_all([
            route("AKL", "WLG", 120),
            route("AKL", "CHC", 150),
            route("WLG", "AKL", 120),
            route("AKL", "SYD", 400),
        ])
        .unwrap();

    r.select(FilterKey::RouteSource, &Value::text("AKL")).unwrap();
    r.set_range(FilterKey::RoutePrice, 100.0, 200.0).unwrap();
    let page = store
        .get_page(Some(&SortOrder::descending("Price")), 10, 0)
        .unwrap();
    let keys: Vec<String> = page.iter().map(|r| r.key().to_string()).collect();
    assert_eq!(keys, vec!["NZ AKL-CHC", "NZ AKL-WLG"]);
}

#[test]
fn batch_notifies_once_and_reports_conflicts() {
    let r = registry();
    let store = route_store(&r);
    let filter_calls = Rc::new(Cell::new(0));
    let f = Rc::clone(&filter_calls);
    r.register_listener(move || {
        f.set(f.get() + 1);
        Ok(())
    });

    let report = store
        .save_all([route("AKL", "WLG", 1), route("AKL", "WLG", 2), route("WLG", "AKL", 3)])
        .unwrap();
    assert_eq!(report.saved.len(), 2);
    assert_eq!(report.conflicts.len(), 1);
    assert!(report.conflicts[0].1.is_uniqueness_conflict());
    assert_eq!(filter_calls.get(), 1);
}

#[test]
fn storage_fault_mid_batch_keeps_saved_rows() {
    let r = registry();
    let backend = MemoryBackend::new();
    let switch = backend.fault_switch();
    let store = EntityStore::new(backend, Rc::clone(&r), Vec::new());
    store.save(route("AKL", "WLG", 1)).unwrap();

    switch.set_offline(true);
    assert!(store.save_all([route("WLG", "AKL", 1)]).unwrap_err().is_storage());
    switch.restore();
    assert_eq!(store.len().unwrap(), 1);
}

#[test]
fn update_keeps_identity() {
    let r = registry();
    let store = route_store(&r);
    let mut saved = store.save(route("AKL", "WLG", 100)).unwrap();
    saved.set_price(110).unwrap();
    let updated = store.save(saved.clone()).unwrap();
    assert_eq!(updated.id(), saved.id());
    assert_eq!(store.get_by_id(saved.id().unwrap()).unwrap().unwrap().price(), 110);
}

#[test]
fn delete_unknown_is_not_found() {
    let r = registry();
    let store = route_store(&r);
    let saved = store.save(route("AKL", "WLG", 100)).unwrap();
    let id = saved.id().unwrap();
    store.delete(id).unwrap();
    assert!(store.delete(id).is_err());
    assert!(r.options(FilterKey::RouteSource).unwrap().is_empty());
}
