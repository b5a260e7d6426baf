//! Integration tests for the filter registry

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use im::OrdSet;
use longhaul_filter::{
    Filter, FilterBinding, FilterKey, FilterRegistry, OptionsAdapter, RangeDomain,
};
use longhaul_foundation::{Error, ErrorKind, Value};

fn registry() -> FilterRegistry {
    FilterRegistry::with_defaults(
        RangeDomain::new(0.0, 5000.0, 10.0),
        RangeDomain::new(0.0, 50000.0, 100.0),
    )
    .unwrap()
}

fn counter(registry: &FilterRegistry) -> Rc<Cell<u32>> {
    let count = Rc::new(Cell::new(0));
    let c = Rc::clone(&count);
    registry.register_listener(move || {
        c.set(c.get() + 1);
        Ok(())
    });
    count
}

fn codes(items: &[&str]) -> OrdSet<Value> {
    items.iter().map(Value::text).collect()
}

#[test]
fn one_filter_per_key() {
    let r = registry();
    for key in FilterKey::ALL {
        match r.filter(key).unwrap() {
            Filter::Range(_) => assert!(key.is_range()),
            Filter::MultiSelect(_) => assert!(!key.is_range()),
        }
    }
}

#[test]
fn wrong_shape_is_unknown_filter() {
    let r = registry();
    let err = r.set_range(FilterKey::AirportCode, 1.0, 2.0).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownFilter(_)));
    assert!(r.select(FilterKey::RoutePrice, &Value::Int(1)).is_err());
}

#[test]
fn changes_notify_and_no_ops_do_not() {
    let r = registry();
    let count = counter(&r);
    r.sync_universes(vec![(FilterKey::AirportCode, codes(&["AKL", "WLG"]))]);
    assert_eq!(count.get(), 0);

    assert!(r.select(FilterKey::AirportCode, &Value::text("AKL")).unwrap());
    assert!(!r.select(FilterKey::AirportCode, &Value::text("AKL")).unwrap());
    assert!(r.set_range(FilterKey::RoutePrice, 100.0, 200.0).unwrap());
    assert_eq!(count.get(), 2);

    assert!(r.reset_all());
    assert_eq!(count.get(), 3);
    assert!(r.selected(FilterKey::AirportCode).unwrap().is_empty());
    assert_eq!(r.bounds(FilterKey::RoutePrice).unwrap(), (0.0, 5000.0));
}

#[test]
fn failing_listener_isolated() {
    let r = registry();
    r.register_listener(|| Err(Error::listener("boom")));
    let count = counter(&r);
    let failures = r.notify_all();
    assert_eq!(failures.len(), 1);
    assert_eq!(count.get(), 1);
}

#[test]
fn listener_can_unregister_during_notify() {
    let r = Rc::new(registry());
    let weak = Rc::downgrade(&r);
    let slot = Rc::new(Cell::new(None));
    let s = Rc::clone(&slot);
    let id = r.register_listener(move || {
        if let (Some(r), Some(id)) = (weak.upgrade(), s.get()) {
            r.unregister_listener(id);
        }
        Ok(())
    });
    slot.set(Some(id));
    r.notify_all();
    assert_eq!(r.listener_count(), 0);
}

#[test]
fn predicates_follow_bindings() {
    let r = registry();
    r.sync_universes(vec![(FilterKey::RouteSource, codes(&["AKL", "WLG"]))]);
    r.select(FilterKey::RouteSource, &Value::text("WLG")).unwrap();
    r.set_range(FilterKey::RoutePrice, 0.0, 300.0).unwrap();

    let bindings = [
        FilterBinding::new(FilterKey::RouteSource, "Source"),
        FilterBinding::new(FilterKey::RouteDestination, "Destination"),
        FilterBinding::new(FilterKey::RoutePrice, "Price"),
        FilterBinding::new(FilterKey::RouteDuration, "Duration"),
    ];
    let predicates = r.predicates(&bindings);
    let columns: Vec<&str> = predicates.iter().map(|p| p.column()).collect();
    assert_eq!(columns, vec!["Source", "Price"]);
}

#[test]
fn sync_reports_changes_only() {
    let r = registry();
    assert!(r.sync_universes(vec![(FilterKey::AirlineCountry, codes(&["Chile"]))]));
    assert!(!r.sync_universes(vec![(FilterKey::AirlineCountry, codes(&["Chile"]))]));
    assert_eq!(r.options(FilterKey::AirlineCountry).unwrap(), codes(&["Chile"]));
}

struct SelectionEcho {
    registry: Weak<FilterRegistry>,
    echoed: RefCell<Vec<OrdSet<Value>>>,
}

impl OptionsAdapter for SelectionEcho {
    fn options_changed(&self, _options: &OrdSet<Value>, _selected: &OrdSet<Value>) {
        if let Some(registry) = self.registry.upgrade() {
            let selected = registry.selected(FilterKey::AirportCountry).unwrap();
            self.echoed.borrow_mut().push(selected);
        }
    }
}

#[test]
fn adapter_reads_registry_during_sync() {
    let r = Rc::new(registry());
    let echo = Rc::new(SelectionEcho {
        registry: Rc::downgrade(&r),
        echoed: RefCell::new(Vec::new()),
    });
    r.bind_adapter(FilterKey::AirportCountry, Rc::clone(&echo) as Rc<dyn OptionsAdapter>).unwrap();

    r.sync_universes(vec![(FilterKey::AirportCountry, codes(&["Chile", "Peru"]))]);
    r.select(FilterKey::AirportCountry, &Value::text("Peru")).unwrap();
    r.sync_universes(vec![
        (FilterKey::AirportCode, codes(&["SCL"])),
        (FilterKey::AirportCountry, codes(&["Chile"])),
    ]);

    assert_eq!(*echo.echoed.borrow(), vec![OrdSet::new(), OrdSet::new()]);
}

#[test]
fn route_count_filter_defaults() {
    let r = registry();
    assert!(FilterKey::AirportRouteCount.is_range());
    assert!(r.set_range(FilterKey::AirportRouteCount, 2.0, 10.0).unwrap());
    assert_eq!(r.bounds(FilterKey::AirportRouteCount).unwrap(), (2.0, 10.0));
    assert_eq!(
        r.domain(FilterKey::AirportRouteCount).unwrap(),
        longhaul_filter::DEFAULT_ROUTE_COUNT_DOMAIN
    );
}
