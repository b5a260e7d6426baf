//! Trip checks against the catalog's routes and airports.
//!
//! A trip is checked leg by leg in its stored order. Each leg gets at most
//! one [`TripIssue`]. Errors mean the leg cannot be flown as entered;
//! warnings flag connections that are possible but unlikely.

use std::fmt;

use chrono::{Duration, NaiveDateTime};

use longhaul_foundation::{Error, Result};
use longhaul_model::route::distance_km;
use longhaul_model::validate::MINUTES_PER_DAY;
use longhaul_model::{Airport, Record, Route, RouteKey, Trip, TripFlight};

use crate::catalog::Catalog;

/// Shortest comfortable connection onto an international leg.
const INTERNATIONAL_LAYOVER_MINUTES: i64 = 120;

/// Shortest comfortable connection onto a domestic leg.
const DOMESTIC_LAYOVER_MINUTES: i64 = 30;

/// Layovers this long never suggest a missing connecting flight.
const OVERLAND_HORIZON_HOURS: i64 = 24;

/// Kilometres a traveller covers per hour between airports without flying.
const OVERLAND_KM_PER_HOUR: f64 = 100.0;

/// A problem with one leg of a trip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TripIssue {
    /// No route matches the leg's airline and airports.
    RouteMissing,
    /// The route's origin airport is unknown.
    OriginMissing {
        /// Origin code named by the route.
        code: String,
    },
    /// The route's destination airport is unknown.
    DestinationMissing {
        /// Destination code named by the route.
        code: String,
    },
    /// The route has no takeoff times.
    NoScheduledFlights,
    /// The leg departs at a time the route does not fly.
    TakeoffNotScheduled {
        /// Requested takeoff, minutes after midnight UTC.
        requested: i32,
        /// Nearest scheduled takeoff on the daily clock.
        closest: i32,
    },
    /// The leg departs before the previous leg lands.
    TakeoffBeforeLanding,
    /// Under two hours to connect onto an international leg.
    ShortInternationalLayover,
    /// Under thirty minutes to connect onto a domestic leg.
    ShortDomesticLayover,
    /// The leg departs from an airport too far from the previous arrival
    /// to reach in the layover without another flight.
    NoConnectingFlight {
        /// Name of the airport the previous leg landed at.
        from: String,
        /// Name of the airport this leg departs from.
        to: String,
        /// Distance between them, whole kilometres.
        km: i64,
    },
}

impl TripIssue {
    /// Returns true if the leg cannot be flown as entered.
    #[must_use]
    pub fn is_error(&self) -> bool {
        !matches!(
            self,
            Self::ShortInternationalLayover
                | Self::ShortDomesticLayover
                | Self::NoConnectingFlight { .. }
        )
    }
}

impl fmt::Display for TripIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RouteMissing => f.write_str("The route is not in the catalog"),
            Self::OriginMissing { code } => {
                write!(f, "The origin airport ({code}) is not in the catalog")
            }
            Self::DestinationMissing { code } => {
                write!(f, "The destination airport ({code}) is not in the catalog")
            }
            Self::NoScheduledFlights => f.write_str("The route has no scheduled flights"),
            Self::TakeoffNotScheduled { requested, closest } => write!(
                f,
                "The selected takeoff time, {} was not found in the route. Closest alternative: {}",
                clock(*requested),
                clock(*closest)
            ),
            Self::TakeoffBeforeLanding => f.write_str("The flight takes off before you land"),
            Self::ShortInternationalLayover => f.write_str(
                "You have less than 2 hours between connections for an international flight",
            ),
            Self::ShortDomesticLayover => f.write_str(
                "You have less than 30 minutes between connections for a domestic flight",
            ),
            Self::NoConnectingFlight { from, to, km } => write!(
                f,
                "No connecting flight between {from} and {to}, which are {km} km away"
            ),
        }
    }
}

/// An existing flight that a candidate would overlap in the air.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlightClash {
    /// Origin code of the existing flight.
    pub source: String,
    /// Destination code of the existing flight.
    pub destination: String,
    /// Takeoff of the existing flight, UTC.
    pub takeoff: NaiveDateTime,
}

impl fmt::Display for FlightClash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Clashes with flight {} -> {} ({})",
            self.source,
            self.destination,
            self.takeoff.format("%H:%M, %d/%m/%Y")
        )
    }
}

enum Leg {
    Rejected(TripIssue),
    Flown {
        landing: NaiveDateTime,
        destination: Airport,
        warning: Option<TripIssue>,
    },
}

impl Catalog {
    /// Checks every leg of `trip` in order.
    ///
    /// The result holds one entry per flight, `None` where the leg is fine.
    /// A rejected leg does not count as flown, so the next leg is compared
    /// with the last leg that was.
    ///
    /// # Errors
    ///
    /// Fails if a backend is unreachable.
    pub fn trip_sanity_check(&self, trip: &Trip) -> Result<Vec<Option<TripIssue>>> {
        let mut issues = Vec::with_capacity(trip.flights().len());
        let mut previous: Option<(NaiveDateTime, Airport)> = None;
        for flight in trip.flights() {
            let issue = match self.check_leg(flight, previous.as_ref())? {
                Leg::Rejected(issue) => Some(issue),
                Leg::Flown {
                    landing,
                    destination,
                    warning,
                } => {
                    previous = Some((landing, destination));
                    warning
                }
            };
            issues.push(issue);
        }
        let flagged = issues.iter().flatten().count();
        tracing::debug!(trip = trip.name(), legs = issues.len(), flagged, "trip checked");
        Ok(issues)
    }

    /// Finds an existing flight that `candidate` would overlap in the air.
    ///
    /// Flights touching end to end count as overlapping. A candidate with
    /// no route never clashes, and existing flights with no route are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Fails if the route backend is unreachable.
    pub fn flight_clash(
        &self,
        existing: &[TripFlight],
        candidate: &TripFlight,
    ) -> Result<Option<FlightClash>> {
        let Some(route) = self.route_for(candidate)? else {
            return Ok(None);
        };
        let (takeoff, landing) = airborne(candidate, &route);
        for flight in existing {
            let Some(other) = self.route_for(flight)? else {
                continue;
            };
            let (other_takeoff, other_landing) = airborne(flight, &other);
            if takeoff <= other_landing && landing >= other_takeoff {
                return Ok(Some(FlightClash {
                    source: flight.source().to_string(),
                    destination: flight.destination().to_string(),
                    takeoff: other_takeoff,
                }));
            }
        }
        Ok(None)
    }

    /// Landing instant of `flight`, UTC.
    ///
    /// # Errors
    ///
    /// Fails if no route matches the flight or the route backend is unreachable.
    pub fn utc_landing(&self, flight: &TripFlight) -> Result<NaiveDateTime> {
        let route = self.required_route(flight)?;
        Ok(airborne(flight, &route).1)
    }

    /// Price of `flight`, in whole dollars.
    ///
    /// # Errors
    ///
    /// Fails if no route matches the flight or the route backend is unreachable.
    pub fn flight_price(&self, flight: &TripFlight) -> Result<i32> {
        Ok(self.required_route(flight)?.price())
    }

    fn check_leg(
        &self,
        flight: &TripFlight,
        previous: Option<&(NaiveDateTime, Airport)>,
    ) -> Result<Leg> {
        let Some(route) = self.route_for(flight)? else {
            return Ok(Leg::Rejected(TripIssue::RouteMissing));
        };
        let Some(source) = self.airports().get_by_natural_key(route.source())? else {
            return Ok(Leg::Rejected(TripIssue::OriginMissing {
                code: route.source().to_string(),
            }));
        };
        let Some(destination) = self.airports().get_by_natural_key(route.destination())? else {
            return Ok(Leg::Rejected(TripIssue::DestinationMissing {
                code: route.destination().to_string(),
            }));
        };

        let requested = flight.takeoff_time();
        if !route.takeoff_times().contains(&requested) {
            let issue = match closest_takeoff(route.takeoff_times(), requested) {
                Some(closest) => TripIssue::TakeoffNotScheduled { requested, closest },
                None => TripIssue::NoScheduledFlights,
            };
            return Ok(Leg::Rejected(issue));
        }

        let (takeoff, landing) = airborne(flight, &route);
        let mut warning = None;
        if let Some((arrival, arrived_at)) = previous {
            let layover = takeoff - *arrival;
            if layover < Duration::zero() {
                return Ok(Leg::Rejected(TripIssue::TakeoffBeforeLanding));
            }
            let international = source.country() != destination.country();
            warning = if international && layover < Duration::minutes(INTERNATIONAL_LAYOVER_MINUTES) {
                Some(TripIssue::ShortInternationalLayover)
            } else if layover < Duration::minutes(DOMESTIC_LAYOVER_MINUTES) {
                Some(TripIssue::ShortDomesticLayover)
            } else {
                missing_connection(arrived_at, &source, layover)
            };
        }
        Ok(Leg::Flown {
            landing,
            destination,
            warning,
        })
    }

    fn route_for(&self, flight: &TripFlight) -> Result<Option<Route>> {
        self.routes().get_by_natural_key(&flight_key(flight))
    }

    fn required_route(&self, flight: &TripFlight) -> Result<Route> {
        let key = flight_key(flight);
        self.routes()
            .get_by_natural_key(&key)?
            .ok_or_else(|| Error::missing(Route::KIND, key.to_string()))
    }
}

fn flight_key(flight: &TripFlight) -> RouteKey {
    RouteKey::new(flight.airline(), flight.source(), flight.destination())
}

/// Takeoff and landing of `flight` on `route`, UTC.
fn airborne(flight: &TripFlight, route: &Route) -> (NaiveDateTime, NaiveDateTime) {
    let takeoff = flight.utc_takeoff();
    (takeoff, takeoff + Duration::minutes(i64::from(route.duration())))
}

/// Nearest scheduled time on the daily clock; the earliest wins a tie.
fn closest_takeoff(times: &[i32], requested: i32) -> Option<i32> {
    times.iter().copied().min_by_key(|time| {
        let gap = (time - requested).rem_euclid(MINUTES_PER_DAY);
        gap.min(MINUTES_PER_DAY - gap)
    })
}

#[allow(clippy::cast_possible_truncation)]
fn missing_connection(arrived_at: &Airport, departing: &Airport, layover: Duration) -> Option<TripIssue> {
    if arrived_at.id() == departing.id() || layover >= Duration::hours(OVERLAND_HORIZON_HOURS) {
        return None;
    }
    let km = distance_km(
        (arrived_at.latitude(), arrived_at.longitude()),
        (departing.latitude(), departing.longitude()),
    );
    let overland_hours = (km / OVERLAND_KM_PER_HOUR).floor() as i64;
    if km <= 0.0 || layover >= Duration::hours(overland_hours) {
        return None;
    }
    Some(TripIssue::NoConnectingFlight {
        from: arrived_at.name().to_string(),
        to: departing.name().to_string(),
        km: km as i64,
    })
}

fn clock(minute: i32) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}
