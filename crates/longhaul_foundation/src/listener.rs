//! Explicit subscriber lists for publishers.
//!
//! A [`Listeners`] list is owned by each publisher (the filter registry, every
//! entity store). Dispatch iterates over a snapshot of the list taken before
//! the first callback runs, so callbacks may register or unregister listeners
//! on the same list without disturbing the iteration. A failing callback is
//! logged and recorded; the remaining callbacks still run.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};

/// Handle returned by [`Listeners::register`], used to unregister later.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// A registered callback receiving a reference to the published event.
pub type Callback<A> = Rc<dyn Fn(&A) -> Result<()>>;

/// A callback failure recorded during dispatch.
#[derive(Debug, Clone)]
pub struct ListenerFailure {
    /// The listener that failed.
    pub id: ListenerId,
    /// What it reported.
    pub error: Error,
}

/// An ordered list of subscriber callbacks.
///
/// All operations take `&self`; the list uses interior mutability so that it
/// can be shared behind an `Rc` and modified from within a callback.
pub struct Listeners<A: ?Sized> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(ListenerId, Callback<A>)>>,
}

impl<A: ?Sized> Listeners<A> {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            entries: RefCell::new(Vec::new()),
        }
    }

    /// Appends a callback and returns its handle.
    pub fn register<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&A) -> Result<()> + 'static,
    {
        self.register_shared(Rc::new(callback))
    }

    /// Appends an already shared callback and returns its handle.
    pub fn register_shared(&self, callback: Callback<A>) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push((id, callback));
        id
    }

    /// Removes a callback. Returns false if the handle was not registered.
    pub fn unregister(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        entries.len() != before
    }

    /// Returns true if the handle is currently registered.
    #[must_use]
    pub fn contains(&self, id: ListenerId) -> bool {
        self.entries.borrow().iter().any(|(entry, _)| *entry == id)
    }

    /// Returns the number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns true if no callbacks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Removes every callback.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    /// Invokes every callback in registration order.
    ///
    /// Callbacks registered during dispatch are not called until the next
    /// dispatch. Failures are isolated and returned.
    pub fn dispatch(&self, event: &A) -> Vec<ListenerFailure> {
        let snapshot: Vec<(ListenerId, Callback<A>)> = self.entries.borrow().clone();
        let mut failures = Vec::new();
        for (id, callback) in snapshot {
            if let Err(error) = callback(event) {
                tracing::warn!(listener = %id, %error, "listener failed");
                failures.push(ListenerFailure { id, error });
            }
        }
        failures
    }
}

impl<A: ?Sized> Default for Listeners<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized> fmt::Debug for Listeners<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
