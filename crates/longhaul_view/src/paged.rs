//! Sentinel-row pagination over an [`EntityStore`].
//!
//! A view never asks the store how many records match. Every fetch requests
//! one row more than the page size; that extra row only decides whether a
//! further page exists and is never displayed.
//!
//! A view subscribes to its store and to the filter registry when attached
//! and refreshes its window whenever either publishes. A store change that
//! already notified the view's registry is not fetched a second time.
//! Dropping the view unsubscribes both listeners.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use longhaul_filter::FilterRegistry;
use longhaul_foundation::{Error, ListenerId, Listeners, Result};
use longhaul_model::Record;
use longhaul_storage::{EntityStore, SortOrder};

/// A navigation step the window is recomputed for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transition {
    /// First load; the window starts at offset zero.
    Initial,
    /// Advance past the visible rows.
    Next,
    /// Retreat by one page, stopping at zero.
    Previous,
    /// Re-fetch the current window after a data or filter change.
    Refresh,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initial => "initial",
            Self::Next => "next",
            Self::Previous => "previous",
            Self::Refresh => "refresh",
        };
        f.write_str(name)
    }
}

/// Published to view listeners after the window changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageEvent {
    /// Rows requested per page.
    pub rows: usize,
    /// Whether this was a first load.
    pub initial: bool,
    /// The step that produced the window.
    pub transition: Transition,
    /// Offset of the first visible row.
    pub offset: usize,
    /// Number of visible rows.
    pub shown: usize,
}

struct Window<E> {
    page_size: usize,
    sort: Option<SortOrder>,
    offset: usize,
    items: Vec<E>,
    has_next: bool,
    loaded: bool,
    last_error: Option<Error>,
}

struct Pager<E: Record> {
    store: Rc<EntityStore<E>>,
    max_page_size: usize,
    window: RefCell<Window<E>>,
    listeners: Listeners<PageEvent>,
}

impl<E: Record> Pager<E> {
    fn update(&self, rows: usize, initial: bool, transition: Transition) -> Result<()> {
        check_page_size(rows, self.max_page_size)?;
        let (sort, start) = {
            let window = self.window.borrow();
            let start = match transition {
                _ if initial => 0,
                Transition::Next => window.offset.saturating_add(window.items.len()),
                Transition::Previous => window.offset.saturating_sub(rows),
                Transition::Refresh => window.offset,
                Transition::Initial => 0,
            };
            (window.sort.clone(), start)
        };

        let (offset, mut page) = match self.fetch(sort.as_ref(), rows, start) {
            Ok(fetched) => fetched,
            Err(err) => {
                tracing::warn!(
                    entity = E::KIND,
                    %transition,
                    offset = start,
                    error = %err,
                    "page not refreshed; keeping previous window"
                );
                self.window.borrow_mut().last_error = Some(err.clone());
                return Err(err);
            }
        };

        let has_next = page.len() > rows;
        page.truncate(rows);
        let shown = page.len();
        {
            let mut window = self.window.borrow_mut();
            window.page_size = rows;
            window.offset = offset;
            window.items = page;
            window.has_next = has_next;
            window.loaded = true;
            window.last_error = None;
        }
        tracing::debug!(entity = E::KIND, %transition, offset, shown, has_next, "window updated");

        self.listeners.dispatch(&PageEvent {
            rows,
            initial,
            transition,
            offset,
            shown,
        });
        Ok(())
    }

    /// Fetches `rows + 1` records from `offset`. A window that falls past the
    /// end of the collection steps back a page at a time until it holds rows
    /// or reaches zero.
    fn fetch(&self, sort: Option<&SortOrder>, rows: usize, mut offset: usize) -> Result<(usize, Vec<E>)> {
        let limit = rows.checked_add(1).ok_or_else(|| {
            Error::invalid_page(format!("page size {rows} leaves no room for the sentinel row"))
        })?;
        loop {
            let page = self.store.get_page(sort, limit, offset)?;
            if page.is_empty() && offset > 0 {
                offset = offset.saturating_sub(rows);
                continue;
            }
            return Ok((offset, page));
        }
    }

    fn refresh_if_loaded(&self) -> Result<()> {
        let (loaded, rows) = {
            let window = self.window.borrow();
            (window.loaded, window.page_size)
        };
        if loaded {
            self.update(rows, false, Transition::Refresh)
        } else {
            Ok(())
        }
    }
}

fn check_page_size(rows: usize, max: usize) -> Result<()> {
    if rows == 0 {
        return Err(Error::invalid_page("page size must be at least one"));
    }
    if rows > max {
        return Err(Error::invalid_page(format!(
            "page size {rows} exceeds the maximum of {max}"
        )));
    }
    Ok(())
}

fn refresh_weak<E: Record>(pager: &Weak<Pager<E>>) -> Result<()> {
    match pager.upgrade() {
        Some(pager) => pager.refresh_if_loaded(),
        None => Ok(()),
    }
}

/// A per-consumer cursor over a store's sorted, filtered records.
pub struct PagedView<E: Record> {
    pager: Rc<Pager<E>>,
    registry: Rc<FilterRegistry>,
    store_listener: ListenerId,
    registry_listener: ListenerId,
}

impl<E: Record> PagedView<E> {
    /// Attaches a view to `store` and `registry` without fetching.
    ///
    /// Call [`PagedView::load`] for the first window.
    ///
    /// # Errors
    ///
    /// Fails if `page_size` is zero.
    pub fn attach(
        store: Rc<EntityStore<E>>,
        registry: Rc<FilterRegistry>,
        page_size: usize,
    ) -> Result<Self> {
        Self::attach_with_limit(store, registry, page_size, usize::MAX)
    }

    /// Like [`PagedView::attach`], rejecting any page size above `max_page_size`
    /// for the life of the view.
    ///
    /// # Errors
    ///
    /// Fails if `page_size` is zero or above `max_page_size`.
    pub fn attach_with_limit(
        store: Rc<EntityStore<E>>,
        registry: Rc<FilterRegistry>,
        page_size: usize,
        max_page_size: usize,
    ) -> Result<Self> {
        check_page_size(page_size, max_page_size)?;
        let pager = Rc::new(Pager {
            store: Rc::clone(&store),
            max_page_size,
            window: RefCell::new(Window {
                page_size,
                sort: None,
                offset: 0,
                items: Vec::new(),
                has_next: false,
                loaded: false,
                last_error: None,
            }),
            listeners: Listeners::new(),
        });

        let shares_registry = Rc::ptr_eq(store.registry(), &registry);
        let weak = Rc::downgrade(&pager);
        let store_listener = store.register_listener(move |event| {
            if shares_registry && event.filters_notified {
                return Ok(());
            }
            refresh_weak(&weak)
        });
        let weak = Rc::downgrade(&pager);
        let registry_listener = registry.register_listener(move || refresh_weak(&weak));
        tracing::debug!(entity = E::KIND, page_size, "view attached");

        Ok(Self {
            pager,
            registry,
            store_listener,
            registry_listener,
        })
    }

    /// Recomputes the window for `transition`, fetching `rows` records.
    ///
    /// On failure the previous window stays displayed and the error is kept
    /// in [`PagedView::last_error`].
    ///
    /// # Errors
    ///
    /// Fails if `rows` is zero or above the view's maximum, a sort column is
    /// unknown, or the store is unreachable.
    pub fn update(&self, rows: usize, initial: bool, transition: Transition) -> Result<()> {
        self.pager.update(rows, initial, transition)
    }

    /// Loads the first page.
    ///
    /// # Errors
    ///
    /// See [`PagedView::update`].
    pub fn load(&self) -> Result<()> {
        self.pager.update(self.page_size(), true, Transition::Initial)
    }

    /// Advances one page. Returns false without fetching on the last page.
    ///
    /// # Errors
    ///
    /// See [`PagedView::update`].
    pub fn next(&self) -> Result<bool> {
        if !self.can_page_forward() {
            return Ok(false);
        }
        self.pager.update(self.page_size(), false, Transition::Next)?;
        Ok(true)
    }

    /// Retreats one page. Returns false without fetching at offset zero.
    ///
    /// # Errors
    ///
    /// See [`PagedView::update`].
    pub fn previous(&self) -> Result<bool> {
        if !self.can_page_backward() {
            return Ok(false);
        }
        self.pager.update(self.page_size(), false, Transition::Previous)?;
        Ok(true)
    }

    /// Re-fetches the current window.
    ///
    /// # Errors
    ///
    /// See [`PagedView::update`].
    pub fn refresh(&self) -> Result<()> {
        self.pager.update(self.page_size(), false, Transition::Refresh)
    }

    /// Changes the ordering and reloads from the first page.
    ///
    /// # Errors
    ///
    /// See [`PagedView::update`]. The new ordering is kept even if the reload fails.
    pub fn set_sort(&self, sort: Option<SortOrder>) -> Result<()> {
        self.pager.window.borrow_mut().sort = sort;
        self.load()
    }

    /// Changes the page size and reloads from the first page.
    ///
    /// # Errors
    ///
    /// See [`PagedView::update`].
    pub fn set_page_size(&self, page_size: usize) -> Result<()> {
        self.pager.update(page_size, true, Transition::Initial)
    }

    /// The visible rows, without the sentinel.
    #[must_use]
    pub fn items(&self) -> Vec<E> {
        self.pager.window.borrow().items.clone()
    }

    /// Number of visible rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pager.window.borrow().items.len()
    }

    /// Returns true if no rows are visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offset of the first visible row.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.pager.window.borrow().offset
    }

    /// Rows requested per page.
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.pager.window.borrow().page_size
    }

    /// Largest page size this view accepts.
    #[must_use]
    pub fn max_page_size(&self) -> usize {
        self.pager.max_page_size
    }

    /// The current ordering.
    #[must_use]
    pub fn sort(&self) -> Option<SortOrder> {
        self.pager.window.borrow().sort.clone()
    }

    /// Returns true if the last fetch found a row past the visible window.
    #[must_use]
    pub fn can_page_forward(&self) -> bool {
        self.pager.window.borrow().has_next
    }

    /// Returns true unless the window starts at offset zero.
    #[must_use]
    pub fn can_page_backward(&self) -> bool {
        self.pager.window.borrow().offset > 0
    }

    /// The failure of the most recent update, cleared by the next success.
    #[must_use]
    pub fn last_error(&self) -> Option<Error> {
        self.pager.window.borrow().last_error.clone()
    }

    /// The store this view pages over.
    #[must_use]
    pub fn store(&self) -> &Rc<EntityStore<E>> {
        &self.pager.store
    }

    /// Registers a window-change listener.
    pub fn register_listener<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&PageEvent) -> Result<()> + 'static,
    {
        self.pager.listeners.register(callback)
    }

    /// Unregisters a window-change listener. Returns false if it was not registered.
    pub fn unregister_listener(&self, id: ListenerId) -> bool {
        self.pager.listeners.unregister(id)
    }
}

impl<E: Record> Drop for PagedView<E> {
    fn drop(&mut self) {
        self.pager.store.unregister_listener(self.store_listener);
        self.registry.unregister_listener(self.registry_listener);
        tracing::debug!(entity = E::KIND, "view detached");
    }
}

impl<E: Record> fmt::Debug for PagedView<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let window = self.pager.window.borrow();
        f.debug_struct("PagedView")
            .field("kind", &E::KIND)
            .field("offset", &window.offset)
            .field("page_size", &window.page_size)
            .field("shown", &window.items.len())
            .field("has_next", &window.has_next)
            .finish_non_exhaustive()
    }
}
