//! Integration tests for listener lists
//!
//! Tests snapshot dispatch, failure isolation, and re-entrant (un)registration.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use longhaul_foundation::{Error, ListenerId, Listeners};

#[test]
fn failing_listener_does_not_stop_the_rest() {
    let listeners: Listeners<u32> = Listeners::new();
    let sum = Rc::new(Cell::new(0));

    let s = Rc::clone(&sum);
    listeners.register(move |n| {
        s.set(s.get() + n);
        Ok(())
    });
    let bad = listeners.register(|_| Err(Error::listener("refused")));
    let s = Rc::clone(&sum);
    listeners.register(move |n| {
        s.set(s.get() + n * 10);
        Ok(())
    });

    let failures = listeners.dispatch(&2);
    assert_eq!(sum.get(), 22);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].id, bad);
}

#[test]
fn listener_may_unregister_itself() {
    let listeners = Rc::new(Listeners::<()>::new());
    let calls = Rc::new(Cell::new(0));
    let own_id: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));

    let weak = Rc::downgrade(&listeners);
    let (c, slot) = (Rc::clone(&calls), Rc::clone(&own_id));
    let id = listeners.register(move |()| {
        c.set(c.get() + 1);
        if let (Some(list), Some(id)) = (weak.upgrade(), slot.get()) {
            list.unregister(id);
        }
        Ok(())
    });
    own_id.set(Some(id));

    listeners.dispatch(&());
    listeners.dispatch(&());
    assert_eq!(calls.get(), 1);
    assert!(listeners.is_empty());
}

#[test]
fn listener_registered_during_dispatch_runs_next_time() {
    let listeners = Rc::new(Listeners::<()>::new());
    let log = Rc::new(RefCell::new(Vec::new()));

    let weak = Rc::downgrade(&listeners);
    let l = Rc::clone(&log);
    listeners.register(move |()| {
        l.borrow_mut().push("outer");
        if let Some(list) = weak.upgrade() {
            let inner = Rc::clone(&l);
            list.register(move |()| {
                inner.borrow_mut().push("inner");
                Ok(())
            });
        }
        Ok(())
    });

    listeners.dispatch(&());
    assert_eq!(*log.borrow(), vec!["outer"]);
    listeners.dispatch(&());
    assert_eq!(*log.borrow(), vec!["outer", "outer", "inner"]);
}
