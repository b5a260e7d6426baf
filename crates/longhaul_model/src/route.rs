//! Routes flown by an airline between two airports.
//!
//! Besides validation this module holds the estimators used to fill in
//! missing route statistics: great-circle distance, flight duration at a
//! fixed cruise speed, a price proportional to duration, and a daily takeoff
//! schedule.

use std::fmt;

use rand::Rng;

use longhaul_foundation::{EntityId, Result, ValidationErrors, Value};

use crate::record::Record;
use crate::validate::{
    check_plane_types, check_range, check_required_code, check_takeoff_times, MINUTES_PER_DAY,
};

/// Column and field names.
pub mod field {
    /// Operating airline code.
    pub const AIRLINE: &str = "Airline";
    /// Source airport code.
    pub const SOURCE: &str = "Source";
    /// Destination airport code.
    pub const DESTINATION: &str = "Destination";
    /// Aircraft type codes.
    pub const PLANE_TYPES: &str = "Equipment";
    /// Ticket price.
    pub const PRICE: &str = "Price";
    /// Whether another airline operates the flight.
    pub const CODESHARE: &str = "Codeshare";
    /// Flight duration in minutes.
    pub const DURATION: &str = "Duration";
    /// Daily takeoff times in minutes after midnight UTC.
    pub const TAKEOFF_TIMES: &str = "TakeoffTimes";
    /// Reported on a duplicate airline/source/destination triple.
    pub const ROUTE: &str = "Route";
}

/// Mean earth radius used for great-circle distances, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Cruise speed assumed when estimating durations, in km/h.
pub const PLANE_SPEED_KMH: f64 = 900.0;

/// Price per hour of flight assumed when estimating prices.
pub const COST_PER_HOUR: f64 = 162.0;

/// Raw, unvalidated route input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteDraft {
    /// Airline code.
    pub airline: Option<String>,
    /// Source airport code.
    pub source: Option<String>,
    /// Destination airport code.
    pub destination: Option<String>,
    /// Aircraft type codes.
    pub plane_types: Vec<String>,
    /// Ticket price.
    pub price: i32,
    /// Codeshare flag.
    pub codeshare: bool,
    /// Duration in minutes.
    pub duration: i32,
    /// Daily takeoff times; `None` is rejected.
    pub takeoff_times: Option<Vec<Option<i32>>>,
}

impl RouteDraft {
    /// Starts a draft for the given airline and airport codes with an empty schedule.
    #[must_use]
    pub fn new(
        airline: impl Into<String>,
        source: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            airline: Some(airline.into()),
            source: Some(source.into()),
            destination: Some(destination.into()),
            takeoff_times: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// Sets the aircraft type codes.
    #[must_use]
    pub fn with_plane_types<S: Into<String>>(mut self, types: impl IntoIterator<Item = S>) -> Self {
        self.plane_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the price.
    #[must_use]
    pub fn with_price(mut self, price: i32) -> Self {
        self.price = price;
        self
    }

    /// Sets the codeshare flag.
    #[must_use]
    pub fn with_codeshare(mut self, codeshare: bool) -> Self {
        self.codeshare = codeshare;
        self
    }

    /// Sets the duration.
    #[must_use]
    pub fn with_duration(mut self, duration: i32) -> Self {
        self.duration = duration;
        self
    }

    /// Sets a schedule without null entries.
    #[must_use]
    pub fn with_takeoff_times(mut self, times: impl IntoIterator<Item = i32>) -> Self {
        self.takeoff_times = Some(times.into_iter().map(Some).collect());
        self
    }
}

/// Secondary key of a route: airline plus both airport codes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RouteKey {
    /// Airline code.
    pub airline: String,
    /// Source airport code.
    pub source: String,
    /// Destination airport code.
    pub destination: String,
}

impl RouteKey {
    /// Creates a key.
    #[must_use]
    pub fn new(
        airline: impl Into<String>,
        source: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            airline: airline.into(),
            source: source.into(),
            destination: destination.into(),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}-{}", self.airline, self.source, self.destination)
    }
}

/// A validated route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    id: Option<EntityId>,
    airline: String,
    source: String,
    destination: String,
    plane_types: Vec<String>,
    price: i32,
    codeshare: bool,
    duration: i32,
    takeoff_times: Vec<i32>,
}

impl Route {
    /// Validates a draft into a memory-only route.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing every rejected field and schedule entry.
    pub fn new(draft: RouteDraft) -> Result<Self> {
        validate(None, &draft)
    }

    /// Returns the current state as a draft.
    #[must_use]
    pub fn draft(&self) -> RouteDraft {
        RouteDraft {
            airline: Some(self.airline.clone()),
            source: Some(self.source.clone()),
            destination: Some(self.destination.clone()),
            plane_types: self.plane_types.clone(),
            price: self.price,
            codeshare: self.codeshare,
            duration: self.duration,
            takeoff_times: Some(self.takeoff_times.iter().copied().map(Some).collect()),
        }
    }

    /// Applies several field changes at once; on failure nothing changes.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing every rejected field.
    pub fn edit(&mut self, f: impl FnOnce(&mut RouteDraft)) -> Result<()> {
        let mut draft = self.draft();
        f(&mut draft);
        *self = validate(self.id, &draft)?;
        Ok(())
    }

    /// Sets the airline code.
    ///
    /// # Errors
    ///
    /// Fails unless the code is two or three alphanumeric characters.
    pub fn set_airline(&mut self, code: Option<&str>) -> Result<()> {
        self.edit(|d| d.airline = code.map(str::to_owned))
    }

    /// Sets the source airport code.
    ///
    /// # Errors
    ///
    /// Fails unless the code is three or four alphanumeric characters.
    pub fn set_source(&mut self, code: Option<&str>) -> Result<()> {
        self.edit(|d| d.source = code.map(str::to_owned))
    }

    /// Sets the destination airport code.
    ///
    /// # Errors
    ///
    /// Fails unless the code is three or four alphanumeric characters.
    pub fn set_destination(&mut self, code: Option<&str>) -> Result<()> {
        self.edit(|d| d.destination = code.map(str::to_owned))
    }

    /// Sets the aircraft type codes.
    ///
    /// # Errors
    ///
    /// Fails if any non-blank code is malformed.
    pub fn set_plane_types<S: AsRef<str>>(&mut self, types: &[S]) -> Result<()> {
        self.edit(|d| d.plane_types = types.iter().map(|t| t.as_ref().to_owned()).collect())
    }

    /// Sets the price.
    ///
    /// # Errors
    ///
    /// Fails if the price is negative.
    pub fn set_price(&mut self, price: i32) -> Result<()> {
        self.edit(|d| d.price = price)
    }

    /// Sets the codeshare flag.
    pub fn set_codeshare(&mut self, codeshare: bool) {
        self.codeshare = codeshare;
    }

    /// Sets the duration.
    ///
    /// # Errors
    ///
    /// Fails unless `0 <= duration < 1440`.
    pub fn set_duration(&mut self, duration: i32) -> Result<()> {
        self.edit(|d| d.duration = duration)
    }

    /// Replaces the takeoff schedule. The accepted schedule is stored sorted.
    ///
    /// # Errors
    ///
    /// A missing list fails once; otherwise each null, out-of-range or
    /// repeated entry fails at its own position.
    pub fn set_takeoff_times(&mut self, times: Option<&[Option<i32>]>) -> Result<()> {
        self.edit(|d| d.takeoff_times = times.map(<[Option<i32>]>::to_vec))
    }

    /// Operating airline code.
    #[must_use]
    pub fn airline(&self) -> &str {
        &self.airline
    }

    /// Source airport code.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Destination airport code.
    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Aircraft type codes.
    #[must_use]
    pub fn plane_types(&self) -> &[String] {
        &self.plane_types
    }

    /// Ticket price.
    #[must_use]
    pub fn price(&self) -> i32 {
        self.price
    }

    /// Whether another airline operates the flight.
    #[must_use]
    pub fn is_codeshare(&self) -> bool {
        self.codeshare
    }

    /// Duration in minutes.
    #[must_use]
    pub fn duration(&self) -> i32 {
        self.duration
    }

    /// Sorted daily takeoff times.
    #[must_use]
    pub fn takeoff_times(&self) -> &[i32] {
        &self.takeoff_times
    }

    /// Secondary key of this route.
    #[must_use]
    pub fn key(&self) -> RouteKey {
        RouteKey::new(&self.airline, &self.source, &self.destination)
    }
}

fn validate(id: Option<EntityId>, draft: &RouteDraft) -> Result<Route> {
    let mut errors = ValidationErrors::new();

    let airline = errors.check(
        field::AIRLINE,
        check_required_code(
            draft.airline.as_deref(),
            2..=3,
            "Airline must be a valid IATA or ICAO code",
        ),
    );
    let source = errors.check(
        field::SOURCE,
        check_required_code(
            draft.source.as_deref(),
            3..=4,
            "Airport IATA/ICAO code must be 3-4 characters long and be alphanumeric",
        ),
    );
    let destination = errors.check(
        field::DESTINATION,
        check_required_code(
            draft.destination.as_deref(),
            3..=4,
            "Airport IATA/ICAO code must be 3-4 characters long and be alphanumeric",
        ),
    );
    let plane_types = errors.check(
        field::PLANE_TYPES,
        check_plane_types(draft.plane_types.as_slice()),
    );
    let price = errors.check(
        field::PRICE,
        check_range(draft.price, 0.., "Price must be positive"),
    );
    let duration = errors.check(
        field::DURATION,
        check_range(
            draft.duration,
            0..MINUTES_PER_DAY,
            "Flight length (in minutes) must be positive and less than 24 hours long",
        ),
    );
    let takeoff_times =
        match check_takeoff_times(field::TAKEOFF_TIMES, draft.takeoff_times.as_deref()) {
            Ok(times) => Some(times),
            Err(schedule) => {
                errors.merge(schedule);
                None
            }
        };

    let (
        Some(airline),
        Some(source),
        Some(destination),
        Some(plane_types),
        Some(price),
        Some(duration),
        Some(takeoff_times),
    ) = (airline, source, destination, plane_types, price, duration, takeoff_times)
    else {
        return Err(errors.into());
    };

    Ok(Route {
        id,
        airline,
        source,
        destination,
        plane_types,
        price,
        codeshare: draft.codeshare,
        duration,
        takeoff_times,
    })
}

impl TryFrom<RouteDraft> for Route {
    type Error = longhaul_foundation::Error;

    fn try_from(draft: RouteDraft) -> Result<Self> {
        Self::new(draft)
    }
}

impl Record for Route {
    const KIND: &'static str = "route";
    const COLUMNS: &'static [&'static str] = &[
        field::AIRLINE,
        field::SOURCE,
        field::DESTINATION,
        field::PLANE_TYPES,
        field::PRICE,
        field::CODESHARE,
        field::DURATION,
        field::TAKEOFF_TIMES,
    ];
    type Key = RouteKey;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn with_id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }

    fn value(&self, column: &str) -> Value {
        match column {
            field::AIRLINE => Value::text(&self.airline),
            field::SOURCE => Value::text(&self.source),
            field::DESTINATION => Value::text(&self.destination),
            field::PLANE_TYPES => Value::text(self.plane_types.join(" ")),
            field::PRICE => Value::from(self.price),
            field::CODESHARE => Value::Bool(self.codeshare),
            field::DURATION => Value::from(self.duration),
            field::TAKEOFF_TIMES => Value::text(
                self.takeoff_times
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            _ => Value::Null,
        }
    }

    fn unique_keys(&self) -> Vec<(&'static str, Value)> {
        vec![(field::ROUTE, Value::text(self.key().to_string()))]
    }

    fn matches_key(&self, key: &RouteKey) -> bool {
        self.airline.eq_ignore_ascii_case(key.airline.trim())
            && self.source.eq_ignore_ascii_case(key.source.trim())
            && self.destination.eq_ignore_ascii_case(key.destination.trim())
    }
}

// =============================================================================
// Estimators
// =============================================================================

/// Great-circle distance between two points given in degrees, in kilometres.
#[must_use]
pub fn distance_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = from;
    let (lat2, lon2) = to;
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Minutes needed to fly `distance_km` at cruise speed, truncated.
///
/// The estimate is capped just below one day so it is always a valid duration.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn generate_duration(distance_km: f64) -> i32 {
    let minutes = (distance_km / PLANE_SPEED_KMH * 60.0) as i32;
    minutes.clamp(0, MINUTES_PER_DAY - 1)
}

/// Price for a flight of `duration` minutes, jittered by up to 10% either way.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn generate_price<R: Rng + ?Sized>(duration: i32, rng: &mut R) -> i32 {
    let base = f64::from(duration) / 60.0 * COST_PER_HOUR;
    let jitter = (2.0 * rng.r#gen::<f64>() - 1.0) * base * 0.1;
    ((base + jitter) as i32).max(0)
}

/// A daily schedule for a flight of `duration` minutes.
///
/// The first takeoff is a random quarter hour. Later takeoffs follow at a
/// fixed gap of at least thirty minutes, rounded to a quarter hour, until
/// midnight.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn generate_takeoff_times<R: Rng + ?Sized>(duration: i32, rng: &mut R) -> Vec<i32> {
    let mut time = rng.gen_range(0..MINUTES_PER_DAY) / 15 * 15;
    let gap = ((rng.r#gen::<f64>() + 0.8) * f64::from(duration)).max(30.0);
    let gap = ((gap / 15.0).round() as i32) * 15;

    let mut times = Vec::new();
    while time < MINUTES_PER_DAY {
        times.push(time);
        time += gap;
    }
    times
}
