//! The catalog: one filter registry and one store per entity kind.
//!
//! A [`Catalog`] is constructed explicitly and passed to whatever needs it.
//! Each catalog has its own registry and stores, so tests get fresh state by
//! building a new one.
//!
//! Airports carry a computed [`ROUTE_COUNT_COLUMN`] counting the routes that
//! depart them. Any route change republishes the airport store so views
//! sorted or filtered on that column stay current.

use std::collections::HashMap;
use std::rc::Rc;

use rand::Rng;

use longhaul_filter::{FilterBinding, FilterKey, FilterRegistry};
use longhaul_foundation::{Result, ValidationErrors, Value};
use longhaul_model::route::{distance_km, generate_duration, generate_price, generate_takeoff_times};
use longhaul_model::{Airline, Airport, Record, Route, Trip, airline, airport, route};
use longhaul_storage::{Backend, DerivedColumn, EntityStore, MemoryBackend};
use longhaul_view::PagedView;

use crate::config::CatalogConfig;

/// Routes between airports closer than this get no generated statistics.
const MIN_GENERATED_DISTANCE_KM: f64 = 0.1;

/// Computed airport column holding the number of departing routes.
pub const ROUTE_COUNT_COLUMN: &str = "Routes";

/// Filters bound to airline columns.
#[must_use]
pub fn airline_bindings() -> Vec<FilterBinding> {
    vec![
        FilterBinding::new(FilterKey::AirlineName, airline::field::NAME),
        FilterBinding::new(FilterKey::AirlineCode, airline::field::CODE),
        FilterBinding::new(FilterKey::AirlineCountry, airline::field::COUNTRY),
    ]
}

/// Filters bound to airport columns.
#[must_use]
pub fn airport_bindings() -> Vec<FilterBinding> {
    vec![
        FilterBinding::new(FilterKey::AirportName, airport::field::NAME),
        FilterBinding::new(FilterKey::AirportCode, airport::field::CODE),
        FilterBinding::new(FilterKey::AirportCountry, airport::field::COUNTRY),
        FilterBinding::new(FilterKey::AirportRouteCount, ROUTE_COUNT_COLUMN),
    ]
}

/// Filters bound to route columns.
#[must_use]
pub fn route_bindings() -> Vec<FilterBinding> {
    vec![
        FilterBinding::new(FilterKey::RouteAirline, route::field::AIRLINE),
        FilterBinding::new(FilterKey::RouteSource, route::field::SOURCE),
        FilterBinding::new(FilterKey::RouteDestination, route::field::DESTINATION),
        FilterBinding::new(FilterKey::RoutePrice, route::field::PRICE),
        FilterBinding::new(FilterKey::RouteDuration, route::field::DURATION),
    ]
}

/// Counts routes by source code, matched against each airport's code.
struct RouteCounts {
    routes: Rc<EntityStore<Route>>,
}

impl DerivedColumn<Airport> for RouteCounts {
    fn column(&self) -> &'static str {
        ROUTE_COUNT_COLUMN
    }

    fn evaluate(&self, airports: &[Airport]) -> Result<Vec<Value>> {
        let mut departures: HashMap<String, i64> = HashMap::new();
        for route in self.routes.get_all()? {
            *departures.entry(route.source().to_string()).or_default() += 1;
        }
        Ok(airports
            .iter()
            .map(|a| Value::Int(departures.get(a.code()).copied().unwrap_or(0)))
            .collect())
    }
}

/// Owns the filter registry and the four entity stores.
pub struct Catalog {
    config: CatalogConfig,
    registry: Rc<FilterRegistry>,
    airlines: Rc<EntityStore<Airline>>,
    airports: Rc<EntityStore<Airport>>,
    routes: Rc<EntityStore<Route>>,
    trips: Rc<EntityStore<Trip>>,
}

impl Catalog {
    /// Creates a catalog over empty in-memory backends.
    ///
    /// # Errors
    ///
    /// Fails if `config` does not validate.
    pub fn new(config: CatalogConfig) -> Result<Self> {
        Self::with_backends(
            config,
            MemoryBackend::new(),
            MemoryBackend::new(),
            MemoryBackend::new(),
            MemoryBackend::new(),
        )
    }

    /// Creates a catalog with the default configuration over in-memory backends.
    ///
    /// # Errors
    ///
    /// Fails only if the default configuration is invalid.
    pub fn in_memory() -> Result<Self> {
        Self::new(CatalogConfig::default())
    }

    /// Creates a catalog over the given backends.
    ///
    /// # Errors
    ///
    /// Fails if `config` does not validate.
    pub fn with_backends(
        config: CatalogConfig,
        airlines: impl Backend<Airline> + 'static,
        airports: impl Backend<Airport> + 'static,
        routes: impl Backend<Route> + 'static,
        trips: impl Backend<Trip> + 'static,
    ) -> Result<Self> {
        config.validate()?;
        let registry = Rc::new(FilterRegistry::with_domains(
            config.price,
            config.duration,
            config.route_count,
        )?);

        let routes = Rc::new(EntityStore::new(routes, Rc::clone(&registry), route_bindings()));
        let airports = Rc::new(
            EntityStore::new(airports, Rc::clone(&registry), airport_bindings()).with_derived_column(
                Rc::new(RouteCounts {
                    routes: Rc::clone(&routes),
                }),
            ),
        );
        let weak_airports = Rc::downgrade(&airports);
        routes.register_listener(move |_| {
            if let Some(airports) = weak_airports.upgrade() {
                airports.publish_derived_change();
            }
            Ok(())
        });

        let catalog = Self {
            airlines: Rc::new(EntityStore::new(airlines, Rc::clone(&registry), airline_bindings())),
            airports,
            routes,
            trips: Rc::new(EntityStore::new(trips, Rc::clone(&registry), Vec::new())),
            registry,
            config,
        };
        catalog.airlines.refresh_universes()?;
        catalog.airports.refresh_universes()?;
        catalog.routes.refresh_universes()?;

        tracing::info!(
            page_size = catalog.config.default_page_size,
            "catalog ready"
        );
        Ok(catalog)
    }

    /// The configuration the catalog was built with.
    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// The shared filter registry.
    #[must_use]
    pub fn registry(&self) -> &Rc<FilterRegistry> {
        &self.registry
    }

    /// The airline store.
    #[must_use]
    pub fn airlines(&self) -> &Rc<EntityStore<Airline>> {
        &self.airlines
    }

    /// The airport store.
    #[must_use]
    pub fn airports(&self) -> &Rc<EntityStore<Airport>> {
        &self.airports
    }

    /// The route store.
    #[must_use]
    pub fn routes(&self) -> &Rc<EntityStore<Route>> {
        &self.routes
    }

    /// The trip store.
    #[must_use]
    pub fn trips(&self) -> &Rc<EntityStore<Trip>> {
        &self.trips
    }

    /// Opens a paged view over one of this catalog's stores.
    ///
    /// `page_size` defaults to the configured page size. The view is not
    /// loaded yet.
    ///
    /// # Errors
    ///
    /// Fails if the page size is zero or above the configured maximum. The
    /// view keeps rejecting later page sizes above that maximum.
    pub fn view<E: Record>(
        &self,
        store: &Rc<EntityStore<E>>,
        page_size: Option<usize>,
    ) -> Result<PagedView<E>> {
        let rows = page_size.unwrap_or(self.config.default_page_size);
        PagedView::attach_with_limit(
            Rc::clone(store),
            Rc::clone(&self.registry),
            rows,
            self.config.max_page_size,
        )
    }

    // =========================================================================
    // Cross-store operations
    // =========================================================================

    /// Checks that a route's airline and airports are in the catalog and that
    /// it does not start and end at the same airport.
    ///
    /// # Errors
    ///
    /// Returns every violation as a validation failure, or a storage failure
    /// if a lookup fails.
    pub fn route_sanity_check(&self, candidate: &Route) -> Result<()> {
        let mut errors = ValidationErrors::new();
        let source = self.airports.get_by_natural_key(candidate.source())?;
        let destination = self.airports.get_by_natural_key(candidate.destination())?;
        let operator = self.airlines.get_by_natural_key(candidate.airline())?;

        if source.is_none() {
            errors.insert(route::field::SOURCE, "Origin airport is not in the catalog");
        }
        if destination.is_none() {
            errors.insert(route::field::DESTINATION, "Destination airport is not in the catalog");
        }
        if operator.is_none() {
            errors.insert(route::field::AIRLINE, "Airline is not in the catalog");
        }
        if let (Some(source), Some(destination)) = (&source, &destination) {
            // The two codes may name one airport by IATA and ICAO.
            if source.id() == destination.id() {
                errors.insert(route::field::ROUTE, "Origin and destination airports are the same");
            }
        }
        errors.into_result(())
    }

    /// Counts routes departing from the airport with the given code.
    ///
    /// # Errors
    ///
    /// Fails if the route backend is unreachable.
    pub fn total_routes_from(&self, airport_code: &str) -> Result<usize> {
        let code = airport_code.trim().to_ascii_uppercase();
        self.routes.count_eq(route::field::SOURCE, &Value::text(code))
    }

    /// Fills in duration, price and takeoff times for unpriced routes whose
    /// airports are both known, and returns how many routes were updated.
    ///
    /// The same RNG state yields the same statistics.
    ///
    /// # Errors
    ///
    /// Fails if a backend is unreachable.
    pub fn fill_generated_route_stats<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<usize> {
        let mut generated = Vec::new();
        for mut pending in self.routes.get_all()? {
            if pending.price() != 0 {
                continue;
            }
            let source = self.airports.get_by_natural_key(pending.source())?;
            let destination = self.airports.get_by_natural_key(pending.destination())?;
            let (Some(source), Some(destination)) = (source, destination) else {
                continue;
            };
            let km = distance_km(
                (source.latitude(), source.longitude()),
                (destination.latitude(), destination.longitude()),
            );
            if km <= MIN_GENERATED_DISTANCE_KM {
                continue;
            }

            let duration = generate_duration(km);
            let price = generate_price(duration, rng);
            let times = generate_takeoff_times(duration, rng);
            pending.edit(|draft| {
                draft.duration = duration;
                draft.price = price;
                draft.takeoff_times = Some(times.into_iter().map(Some).collect());
            })?;
            generated.push(pending);
        }

        if generated.is_empty() {
            return Ok(0);
        }
        let report = self.routes.save_all(generated)?;
        tracing::info!(updated = report.saved.len(), "generated route statistics");
        Ok(report.saved.len())
    }

    /// Drops every listener and releases the stores.
    pub fn shutdown(self) {
        self.registry.clear_listeners();
        self.airlines.clear_listeners();
        self.airports.clear_listeners();
        self.routes.clear_listeners();
        self.trips.clear_listeners();
        tracing::info!("catalog shut down");
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
