//! Integration tests for paged views

use std::rc::Rc;

use longhaul_filter::{FilterBinding, FilterKey, FilterRegistry, RangeDomain};
use longhaul_model::{Route, RouteDraft};
use longhaul_storage::{EntityStore, MemoryBackend, SortOrder};
use longhaul_view::{PagedView, Transition};
use proptest::prelude::*;

fn registry() -> Rc<FilterRegistry> {
    Rc::new(
        FilterRegistry::with_defaults(
            RangeDomain::new(0.0, 5000.0, 10.0),
            RangeDomain::new(0.0, 50000.0, 100.0),
        )
        .unwrap(),
    )
}

fn bindings() -> Vec<FilterBinding> {
    vec![
        FilterBinding::new(FilterKey::RouteSource, "Source"),
        FilterBinding::new(FilterKey::RoutePrice, "Price"),
    ]
}

fn route(n: usize) -> Route {
    let source = if n % 3 == 0 { "AKL" } else { "WLG" };
    Route::new(
        RouteDraft::new("NZ", source, format!("D{n:03}"))
            .with_price(i32::try_from(n * 10).unwrap()),
    )
    .unwrap()
}

fn view(count: usize, page: usize) -> (Rc<FilterRegistry>, PagedView<Route>) {
    let r = registry();
    let store = Rc::new(EntityStore::in_memory(Rc::clone(&r), bindings()));
    store.save_all((0..count).map(route)).unwrap();
    let view = PagedView::attach(store, Rc::clone(&r), page).unwrap();
    view.set_sort(Some(SortOrder::ascending("Price"))).unwrap();
    (r, view)
}

fn prices(view: &PagedView<Route>) -> Vec<i32> {
    view.items().iter().map(Route::price).collect()
}

// =============================================================================
// Sentinel boundary
// =============================================================================

#[test]
fn five_of_five_has_no_next_page() {
    let (_r, v) = view(5, 5);
    assert_eq!(v.len(), 5);
    assert!(!v.can_page_forward());
}

#[test]
fn five_of_six_has_next_page() {
    let (_r, v) = view(6, 5);
    assert_eq!(v.len(), 5);
    assert!(v.can_page_forward());
}

#[test]
fn backward_disabled_at_zero() {
    let (_r, v) = view(12, 5);
    assert!(!v.can_page_backward());
    v.next().unwrap();
    assert!(v.can_page_backward());
}

// =============================================================================
// Transitions
// =============================================================================

#[test]
fn next_then_previous_returns_same_window() {
    let (_r, v) = view(23, 5);
    v.next().unwrap();
    v.next().unwrap();
    let third = prices(&v);
    v.next().unwrap();
    v.previous().unwrap();
    assert_eq!(prices(&v), third);
    assert_eq!(v.offset(), 10);
}

#[test]
fn explicit_update_follows_transition_rules() {
    let (_r, v) = view(20, 4);
    v.update(4, false, Transition::Next).unwrap();
    assert_eq!(v.offset(), 4);
    v.update(4, true, Transition::Next).unwrap();
    assert_eq!(v.offset(), 0);
    v.update(4, false, Transition::Previous).unwrap();
    assert_eq!(v.offset(), 0);
}

#[test]
fn range_filter_narrows_and_refreshes() {
    let (r, v) = view(30, 5);
    v.next().unwrap();
    r.set_range(FilterKey::RoutePrice, 0.0, 40.0).unwrap();
    assert_eq!(v.offset(), 0);
    assert_eq!(prices(&v), vec![0, 10, 20, 30, 40]);
    assert!(!v.can_page_forward());
}

#[test]
fn multi_select_filter_refreshes() {
    let (r, v) = view(9, 10);
    r.select(FilterKey::RouteSource, &longhaul_foundation::Value::text("AKL")).unwrap();
    assert_eq!(prices(&v), vec![0, 30, 60]);
    r.clear_selection(FilterKey::RouteSource).unwrap();
    assert_eq!(v.len(), 9);
}

#[test]
fn insert_refreshes_current_window() {
    let r = registry();
    let store = Rc::new(EntityStore::in_memory(Rc::clone(&r), bindings()));
    store.save_all((1..4).map(route)).unwrap();
    let v = PagedView::attach(Rc::clone(&store), Rc::clone(&r), 5).unwrap();
    v.set_sort(Some(SortOrder::ascending("Price"))).unwrap();

    store.save(route(0)).unwrap();
    assert_eq!(prices(&v), vec![0, 10, 20, 30]);
}

#[test]
fn failure_keeps_window_and_reports() {
    let r = registry();
    let backend = MemoryBackend::new();
    let switch = backend.fault_switch();
    let store = Rc::new(EntityStore::new(backend, Rc::clone(&r), bindings()));
    store.save_all((0..10).map(route)).unwrap();
    let v = PagedView::attach(store, Rc::clone(&r), 4).unwrap();
    v.load().unwrap();
    let before = v.items().len();

    switch.set_offline(true);
    assert!(v.refresh().unwrap_err().is_storage());
    assert!(v.set_sort(Some(SortOrder::descending("Price"))).is_err());
    assert_eq!(v.items().len(), before);
    assert!(v.last_error().is_some());
}

proptest! {
    #[test]
    fn forward_walk_reconstructs_collection(count in 6usize..40, page in 1usize..8) {
        prop_assume!(count > page);
        let (_r, v) = view(count, page);
        let mut all = prices(&v);
        let mut offsets = vec![v.offset()];
        while v.next().unwrap() {
            offsets.push(v.offset());
            all.extend(prices(&v));
        }
        let expected: Vec<i32> = (0..count).map(|n| i32::try_from(n * 10).unwrap()).collect();
        prop_assert_eq!(all, expected);
        prop_assert!(offsets.windows(2).all(|w| w[1] == w[0] + page));
    }

    #[test]
    fn previous_walk_never_negative(count in 1usize..30, page in 1usize..6, steps in 0usize..8) {
        let (_r, v) = view(count, page);
        for _ in 0..steps {
            v.next().unwrap();
        }
        let mut last = v.offset();
        while v.previous().unwrap() {
            prop_assert_eq!(v.offset(), last.saturating_sub(page));
            last = v.offset();
        }
        prop_assert_eq!(v.offset(), 0);
    }
}
