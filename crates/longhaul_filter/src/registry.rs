//! The filter registry: one filter per filterable field, one change stream.
//!
//! Entity stores push option universes into the registry after each
//! mutation and read predicates out of it for each page query. Paged views
//! subscribe to its change stream.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use im::OrdSet;
use longhaul_foundation::{Error, ListenerFailure, ListenerId, Listeners, Result, Value};

use crate::multi_select::{MultiSelectFilter, OptionsAdapter, OptionsUpdate};
use crate::predicate::Predicate;
use crate::range::{RangeDomain, RangeFilter};
use crate::text::TextPredicate;

/// Domain of the airport route-count filter unless configured otherwise.
pub const DEFAULT_ROUTE_COUNT_DOMAIN: RangeDomain = RangeDomain::new(0.0, 5000.0, 1.0);

/// Every filterable field across the entity kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FilterKey {
    /// Airline names.
    AirlineName,
    /// Airline codes.
    AirlineCode,
    /// Airline countries.
    AirlineCountry,
    /// Airport names.
    AirportName,
    /// Airport codes.
    AirportCode,
    /// Airport countries.
    AirportCountry,
    /// Number of routes departing an airport.
    AirportRouteCount,
    /// Airline codes flying routes.
    RouteAirline,
    /// Route source airports.
    RouteSource,
    /// Route destination airports.
    RouteDestination,
    /// Route price range.
    RoutePrice,
    /// Route duration range.
    RouteDuration,
}

impl FilterKey {
    /// Every key.
    pub const ALL: [FilterKey; 12] = [
        Self::AirlineName,
        Self::AirlineCode,
        Self::AirlineCountry,
        Self::AirportName,
        Self::AirportCode,
        Self::AirportCountry,
        Self::AirportRouteCount,
        Self::RouteAirline,
        Self::RouteSource,
        Self::RouteDestination,
        Self::RoutePrice,
        Self::RouteDuration,
    ];

    /// Returns true for keys backed by a range filter.
    #[must_use]
    pub const fn is_range(self) -> bool {
        matches!(
            self,
            Self::AirportRouteCount | Self::RoutePrice | Self::RouteDuration
        )
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AirlineName => "By Airline Name",
            Self::AirlineCode => "By Airline Code",
            Self::AirlineCountry => "By Airline Country",
            Self::AirportName => "By Airport Name",
            Self::AirportCode => "By Airport Code",
            Self::AirportCountry => "By Airport Country",
            Self::AirportRouteCount => "By Number of Flights",
            Self::RouteAirline => "By Route Airline",
            Self::RouteSource => "By Starting Airport",
            Self::RouteDestination => "By Destination Airport",
            Self::RoutePrice => "By Price",
            Self::RouteDuration => "By Duration",
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ties a filter to the entity column it constrains.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterBinding {
    /// The filter.
    pub key: FilterKey,
    /// The column it reads.
    pub column: &'static str,
}

impl FilterBinding {
    /// Creates a binding.
    #[must_use]
    pub const fn new(key: FilterKey, column: &'static str) -> Self {
        Self { key, column }
    }
}

/// A registered filter of either shape.
#[derive(Clone, Debug)]
pub enum Filter {
    /// Numeric range.
    Range(RangeFilter),
    /// Option selection.
    MultiSelect(MultiSelectFilter),
}

impl Filter {
    fn predicate(&self, column: &str) -> Option<Predicate> {
        match self {
            Self::Range(f) => f.predicate(column),
            Self::MultiSelect(f) => f.predicate(column),
        }
    }
}

/// Owns exactly one filter per [`FilterKey`] and the filter-change listeners.
///
/// Methods take `&self`; the registry is shared behind an `Rc` by the stores
/// and views of one catalog. Selection and bound changes notify every
/// listener once, after the filter state has been released, so listeners may
/// read the registry.
pub struct FilterRegistry {
    filters: RefCell<BTreeMap<FilterKey, Filter>>,
    listeners: Listeners<()>,
}

impl FilterRegistry {
    /// Creates a registry with every filter, empty universes and the given
    /// price and duration domains. The route-count filter spans
    /// [`DEFAULT_ROUTE_COUNT_DOMAIN`].
    ///
    /// # Errors
    ///
    /// Fails if either domain is unusable.
    pub fn with_defaults(price: RangeDomain, duration: RangeDomain) -> Result<Self> {
        Self::with_domains(price, duration, DEFAULT_ROUTE_COUNT_DOMAIN)
    }

    /// Creates a registry with every filter, empty universes and the given range domains.
    ///
    /// # Errors
    ///
    /// Fails if any domain is unusable.
    pub fn with_domains(
        price: RangeDomain,
        duration: RangeDomain,
        route_count: RangeDomain,
    ) -> Result<Self> {
        let mut filters = BTreeMap::new();
        for key in FilterKey::ALL {
            let filter = match key {
                FilterKey::RoutePrice => Filter::Range(RangeFilter::with_domain(key.label(), price)?),
                FilterKey::RouteDuration => {
                    Filter::Range(RangeFilter::with_domain(key.label(), duration)?)
                }
                FilterKey::AirportRouteCount => {
                    Filter::Range(RangeFilter::with_domain(key.label(), route_count)?)
                }
                _ => Filter::MultiSelect(MultiSelectFilter::new(key.label(), std::iter::empty())),
            };
            filters.insert(key, filter);
        }
        Ok(Self {
            filters: RefCell::new(filters),
            listeners: Listeners::new(),
        })
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Registers a filter-change listener.
    pub fn register_listener<F>(&self, callback: F) -> ListenerId
    where
        F: Fn() -> Result<()> + 'static,
    {
        self.listeners.register(move |_| callback())
    }

    /// Unregisters a filter-change listener. Returns false if it was not registered.
    pub fn unregister_listener(&self, id: ListenerId) -> bool {
        self.listeners.unregister(id)
    }

    /// Number of registered filter-change listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Invokes every filter-change listener in registration order.
    ///
    /// A failing listener does not stop the others; failures are returned.
    pub fn notify_all(&self) -> Vec<ListenerFailure> {
        tracing::debug!(listeners = self.listeners.len(), "filters changed");
        self.listeners.dispatch(&())
    }

    /// Drops every listener.
    pub fn clear_listeners(&self) {
        self.listeners.clear();
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Selects an option. Notifies listeners if the selection changed.
    ///
    /// # Errors
    ///
    /// Fails if `key` is not a multi-select filter.
    pub fn select(&self, key: FilterKey, option: &Value) -> Result<bool> {
        self.update_multi(key, |f| f.select(option))
    }

    /// Deselects an option. Notifies listeners if the selection changed.
    ///
    /// # Errors
    ///
    /// Fails if `key` is not a multi-select filter.
    pub fn deselect(&self, key: FilterKey, option: &Value) -> Result<bool> {
        self.update_multi(key, |f| f.deselect(option))
    }

    /// Replaces a selection. Notifies listeners if it changed.
    ///
    /// # Errors
    ///
    /// Fails if `key` is not a multi-select filter.
    pub fn set_selected(
        &self,
        key: FilterKey,
        options: impl IntoIterator<Item = Value>,
    ) -> Result<bool> {
        self.update_multi(key, |f| f.set_selected(options))
    }

    /// Clears a selection. Notifies listeners if it changed.
    ///
    /// # Errors
    ///
    /// Fails if `key` is not a multi-select filter.
    pub fn clear_selection(&self, key: FilterKey) -> Result<bool> {
        self.update_multi(key, MultiSelectFilter::clear_selection)
    }

    /// Sets range bounds. Notifies listeners if they changed.
    ///
    /// # Errors
    ///
    /// Fails if `key` is not a range filter or the bounds are inverted.
    pub fn set_range(&self, key: FilterKey, lo: f64, hi: f64) -> Result<bool> {
        let changed = self.with_range(key, |f| f.set_bounds(lo, hi))??;
        self.after_change(key, changed);
        Ok(changed)
    }

    /// Resets range bounds to the domain. Notifies listeners if they changed.
    ///
    /// # Errors
    ///
    /// Fails if `key` is not a range filter.
    pub fn reset_range(&self, key: FilterKey) -> Result<bool> {
        let changed = self.with_range(key, RangeFilter::reset)?;
        self.after_change(key, changed);
        Ok(changed)
    }

    /// Clears every selection and resets every range, notifying once if anything changed.
    pub fn reset_all(&self) -> bool {
        let mut changed = false;
        for filter in self.filters.borrow_mut().values_mut() {
            changed |= match filter {
                Filter::Range(f) => f.reset(),
                Filter::MultiSelect(f) => f.clear_selection(),
            };
        }
        if changed {
            self.notify_all();
        }
        changed
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// A copy of a selection.
    ///
    /// # Errors
    ///
    /// Fails if `key` is not a multi-select filter.
    pub fn selected(&self, key: FilterKey) -> Result<OrdSet<Value>> {
        self.with_multi(key, MultiSelectFilter::selected)
    }

    /// A copy of an option universe.
    ///
    /// # Errors
    ///
    /// Fails if `key` is not a multi-select filter.
    pub fn options(&self, key: FilterKey) -> Result<OrdSet<Value>> {
        self.with_multi(key, MultiSelectFilter::options)
    }

    /// Options matching free text.
    ///
    /// # Errors
    ///
    /// Fails if `key` is not a multi-select filter.
    pub fn search(&self, key: FilterKey, text: &TextPredicate) -> Result<Vec<Value>> {
        self.with_multi(key, |f| f.search(text))
    }

    /// Current range bounds.
    ///
    /// # Errors
    ///
    /// Fails if `key` is not a range filter.
    pub fn bounds(&self, key: FilterKey) -> Result<(f64, f64)> {
        self.with_range(key, |f| f.bounds())
    }

    /// Range domain.
    ///
    /// # Errors
    ///
    /// Fails if `key` is not a range filter.
    pub fn domain(&self, key: FilterKey) -> Result<RangeDomain> {
        self.with_range(key, |f| f.domain())
    }

    /// A snapshot of one filter.
    #[must_use]
    pub fn filter(&self, key: FilterKey) -> Option<Filter> {
        self.filters.borrow().get(&key).cloned()
    }

    /// Binds a presentation adapter to a multi-select filter.
    ///
    /// # Errors
    ///
    /// Fails if `key` is not a multi-select filter.
    pub fn bind_adapter(&self, key: FilterKey, adapter: Rc<dyn OptionsAdapter>) -> Result<()> {
        self.with_multi_mut(key, |f| f.bind_adapter(adapter))
    }

    /// Unbinds the presentation adapter of a multi-select filter.
    ///
    /// # Errors
    ///
    /// Fails if `key` is not a multi-select filter.
    pub fn unbind_adapter(&self, key: FilterKey) -> Result<Option<Rc<dyn OptionsAdapter>>> {
        self.with_multi_mut(key, MultiSelectFilter::unbind_adapter)
    }

    // =========================================================================
    // Store hooks
    // =========================================================================

    /// Replaces option universes. Does not notify listeners.
    ///
    /// Bound adapters are informed after every universe has been replaced
    /// and the filters released. Returns true if any universe changed; the
    /// caller notifies once.
    pub fn sync_universes(&self, updates: Vec<(FilterKey, OrdSet<Value>)>) -> bool {
        let pending: Vec<OptionsUpdate> = {
            let mut filters = self.filters.borrow_mut();
            updates
                .into_iter()
                .filter_map(|(key, universe)| match filters.get_mut(&key) {
                    Some(Filter::MultiSelect(f)) => Some(f.replace_options(universe)),
                    _ => {
                        tracing::warn!(%key, "universe update for a non multi-select filter ignored");
                        None
                    }
                })
                .collect()
        };
        pending
            .into_iter()
            .fold(false, |changed, update| update.notify() | changed)
    }

    /// Predicates for every constraining filter among `bindings`.
    ///
    /// Unconstrained filters (empty selection, full range) contribute nothing.
    #[must_use]
    pub fn predicates(&self, bindings: &[FilterBinding]) -> Vec<Predicate> {
        let filters = self.filters.borrow();
        bindings
            .iter()
            .filter_map(|b| filters.get(&b.key).and_then(|f| f.predicate(b.column)))
            .collect()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn update_multi(
        &self,
        key: FilterKey,
        f: impl FnOnce(&mut MultiSelectFilter) -> bool,
    ) -> Result<bool> {
        let changed = self.with_multi_mut(key, f)?;
        self.after_change(key, changed);
        Ok(changed)
    }

    fn after_change(&self, key: FilterKey, changed: bool) {
        if changed {
            tracing::debug!(%key, "filter updated");
            self.notify_all();
        }
    }

    fn with_multi<T>(&self, key: FilterKey, f: impl FnOnce(&MultiSelectFilter) -> T) -> Result<T> {
        match self.filters.borrow().get(&key) {
            Some(Filter::MultiSelect(filter)) => Ok(f(filter)),
            _ => Err(Error::unknown_filter(format!("{key} is not a multi-select filter"))),
        }
    }

    fn with_multi_mut<T>(
        &self,
        key: FilterKey,
        f: impl FnOnce(&mut MultiSelectFilter) -> T,
    ) -> Result<T> {
        match self.filters.borrow_mut().get_mut(&key) {
            Some(Filter::MultiSelect(filter)) => Ok(f(filter)),
            _ => Err(Error::unknown_filter(format!("{key} is not a multi-select filter"))),
        }
    }

    fn with_range<T>(&self, key: FilterKey, f: impl FnOnce(&mut RangeFilter) -> T) -> Result<T> {
        match self.filters.borrow_mut().get_mut(&key) {
            Some(Filter::Range(filter)) => Ok(f(filter)),
            _ => Err(Error::unknown_filter(format!("{key} is not a range filter"))),
        }
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.filters.borrow().len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
