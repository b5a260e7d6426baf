//! Integration tests for multi-select filters

use std::cell::RefCell;
use std::rc::Rc;

use im::OrdSet;
use longhaul_filter::{MultiSelectFilter, OptionsAdapter, TextPredicate};
use longhaul_foundation::Value;
use proptest::prelude::*;

fn set(items: &[&str]) -> OrdSet<Value> {
    items.iter().map(Value::text).collect()
}

#[test]
fn shrinking_universe_drops_selection_for_good() {
    let mut filter = MultiSelectFilter::new("By Code", set(&["A", "B"]));
    filter.select(&Value::text("A"));

    filter.set_options(set(&["B"]));
    assert!(filter.selected().is_empty());

    filter.set_options(set(&["A", "B"]));
    assert!(filter.selected().is_empty());
}

#[test]
fn select_outside_universe_is_noop() {
    let mut filter = MultiSelectFilter::new("By Code", set(&["A"]));
    assert!(!filter.select(&Value::text("Z")));
    assert!(filter.selected().is_empty());
}

#[test]
fn selected_is_a_copy() {
    let mut filter = MultiSelectFilter::new("By Code", set(&["A", "B"]));
    filter.select(&Value::text("A"));
    let mut copy = filter.selected();
    copy.insert(Value::text("B"));
    assert_eq!(filter.selected(), set(&["A"]));
}

#[test]
fn empty_selection_has_no_predicate() {
    let mut filter = MultiSelectFilter::new("By Code", set(&["A", "B"]));
    assert!(filter.predicate("Code").is_none());
    filter.set_selected([Value::text("B")]);
    let predicate = filter.predicate("Code").unwrap();
    assert!(predicate.matches(&Value::text("B")));
    assert!(!predicate.matches(&Value::text("A")));
}

#[test]
fn search_is_case_insensitive() {
    let filter = MultiSelectFilter::new("By Country", set(&["New Zealand", "Australia", "Niue"]));
    let found = filter.search(&TextPredicate::new("NEW"));
    assert_eq!(found, vec![Value::text("New Zealand")]);
    assert_eq!(filter.search(&TextPredicate::new("")).len(), 3);
}

struct Recorder(RefCell<Vec<(usize, usize)>>);

impl OptionsAdapter for Recorder {
    fn options_changed(&self, options: &OrdSet<Value>, selected: &OrdSet<Value>) {
        self.0.borrow_mut().push((options.len(), selected.len()));
    }
}

#[test]
fn adapter_informed_synchronously() {
    let recorder = Rc::new(Recorder(RefCell::new(Vec::new())));
    let mut filter = MultiSelectFilter::new("By Code", set(&["A", "B"]));
    filter.select(&Value::text("A"));
    filter.bind_adapter(Rc::clone(&recorder) as Rc<dyn OptionsAdapter>);

    filter.set_options(set(&["A", "B", "C"]));
    assert_eq!(*recorder.0.borrow(), vec![(3, 1)]);

    filter.unbind_adapter();
    filter.set_options(set(&["C"]));
    assert_eq!(recorder.0.borrow().len(), 1);
}

proptest! {
    #[test]
    fn set_options_is_idempotent(
        universe in prop::collection::btree_set("[a-e]", 0..5),
        picks in prop::collection::vec("[a-e]", 0..5),
        next in prop::collection::btree_set("[a-e]", 0..5),
    ) {
        let mut filter = MultiSelectFilter::new("p", universe.iter().map(Value::text));
        filter.set_selected(picks.iter().map(Value::text));
        filter.set_options(next.iter().map(Value::text));
        let once = filter.selected();
        filter.set_options(next.iter().map(Value::text));
        prop_assert_eq!(filter.selected(), once.clone());
        prop_assert!(once.iter().all(|v| filter.options().contains(v)));
    }
}
