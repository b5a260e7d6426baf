//! Trips: named, ordered itineraries of individual flights.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use longhaul_foundation::{EntityId, Result, ValidationErrors, Value};

use crate::record::Record;
use crate::validate::{check_name, check_range, check_required_code, normalize_text, MINUTES_PER_DAY};

/// Column and field names.
pub mod field {
    /// Trip name.
    pub const NAME: &str = "Name";
    /// Free-form comment.
    pub const COMMENT: &str = "Comment";
    /// Number of flights in the trip.
    pub const FLIGHTS: &str = "Flights";
    /// Flight source airport code.
    pub const SOURCE: &str = "Source";
    /// Flight destination airport code.
    pub const DESTINATION: &str = "Destination";
    /// Flight airline code.
    pub const AIRLINE: &str = "Airline";
    /// Flight takeoff minute, UTC.
    pub const TAKEOFF_TIME: &str = "FlightTakeoff";
    /// Flight takeoff date, UTC.
    pub const TAKEOFF_DATE: &str = "FlightDate";
}

// =============================================================================
// TripFlight
// =============================================================================

/// Raw, unvalidated flight input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TripFlightDraft {
    /// Source airport code.
    pub source: Option<String>,
    /// Destination airport code.
    pub destination: Option<String>,
    /// Airline code.
    pub airline: Option<String>,
    /// Takeoff minute after midnight UTC.
    pub takeoff_time: i32,
    /// Takeoff date, UTC.
    pub takeoff_date: Option<NaiveDate>,
    /// Free-form comment.
    pub comment: Option<String>,
}

impl TripFlightDraft {
    /// Starts a draft for a flight between two airports on one airline.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        airline: impl Into<String>,
    ) -> Self {
        Self {
            source: Some(source.into()),
            destination: Some(destination.into()),
            airline: Some(airline.into()),
            ..Self::default()
        }
    }

    /// Sets the takeoff date and minute.
    #[must_use]
    pub fn departing(mut self, date: NaiveDate, minute: i32) -> Self {
        self.takeoff_date = Some(date);
        self.takeoff_time = minute;
        self
    }

    /// Sets the comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// One validated leg of a trip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TripFlight {
    source: String,
    destination: String,
    airline: String,
    takeoff_time: i32,
    takeoff_date: NaiveDate,
    comment: Option<String>,
}

impl TripFlight {
    /// Validates a draft into a flight.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing every rejected field.
    pub fn new(draft: TripFlightDraft) -> Result<Self> {
        validate_flight(&draft)
    }

    /// Returns the current state as a draft.
    #[must_use]
    pub fn draft(&self) -> TripFlightDraft {
        TripFlightDraft {
            source: Some(self.source.clone()),
            destination: Some(self.destination.clone()),
            airline: Some(self.airline.clone()),
            takeoff_time: self.takeoff_time,
            takeoff_date: Some(self.takeoff_date),
            comment: self.comment.clone(),
        }
    }

    /// Applies several field changes at once; on failure nothing changes.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing every rejected field.
    pub fn edit(&mut self, f: impl FnOnce(&mut TripFlightDraft)) -> Result<()> {
        let mut draft = self.draft();
        f(&mut draft);
        *self = validate_flight(&draft)?;
        Ok(())
    }

    /// Sets the takeoff minute.
    ///
    /// # Errors
    ///
    /// Fails unless `0 <= minute < 1440`.
    pub fn set_takeoff_time(&mut self, minute: i32) -> Result<()> {
        self.edit(|d| d.takeoff_time = minute)
    }

    /// Sets the comment. Blank clears it.
    pub fn set_comment(&mut self, comment: Option<&str>) {
        self.comment = normalize_text(comment);
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

    /// Airline code.
    #[must_use]
    pub fn airline(&self) -> &str {
        &self.airline
    }

    /// Takeoff minute after midnight UTC.
    #[must_use]
    pub fn takeoff_time(&self) -> i32 {
        self.takeoff_time
    }

    /// Takeoff date, UTC.
    #[must_use]
    pub fn takeoff_date(&self) -> NaiveDate {
        self.takeoff_date
    }

    /// Free-form comment.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Takeoff instant, UTC.
    #[must_use]
    pub fn utc_takeoff(&self) -> NaiveDateTime {
        self.takeoff_date.and_time(NaiveTime::default())
            + Duration::minutes(i64::from(self.takeoff_time))
    }
}

fn validate_flight(draft: &TripFlightDraft) -> Result<TripFlight> {
    let mut errors = ValidationErrors::new();

    let source = errors.check(
        field::SOURCE,
        check_required_code(
            draft.source.as_deref(),
            3..=4,
            "Source airport code must be an IATA or ICAO code",
        ),
    );
    let destination = errors.check(
        field::DESTINATION,
        check_required_code(
            draft.destination.as_deref(),
            3..=4,
            "Destination airport code must be an IATA or ICAO code",
        ),
    );
    let airline = errors.check(
        field::AIRLINE,
        check_required_code(
            draft.airline.as_deref(),
            2..=3,
            "The airline code must be an IATA or ICAO code",
        ),
    );
    let takeoff_time = errors.check(
        field::TAKEOFF_TIME,
        check_range(
            draft.takeoff_time,
            0..MINUTES_PER_DAY,
            "Takeoff time (in minutes) must be positive and less than 24 hours long",
        ),
    );
    let takeoff_date = errors.check(
        field::TAKEOFF_DATE,
        draft
            .takeoff_date
            .ok_or_else(|| "Takeoff date must not be empty".to_owned()),
    );

    let (Some(source), Some(destination), Some(airline), Some(takeoff_time), Some(takeoff_date)) =
        (source, destination, airline, takeoff_time, takeoff_date)
    else {
        return Err(errors.into());
    };

    Ok(TripFlight {
        source,
        destination,
        airline,
        takeoff_time,
        takeoff_date,
        comment: normalize_text(draft.comment.as_deref()),
    })
}

// =============================================================================
// Trip
// =============================================================================

/// Raw, unvalidated trip input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TripDraft {
    /// Trip name.
    pub name: Option<String>,
    /// Free-form comment.
    pub comment: Option<String>,
}

impl TripDraft {
    /// Starts a draft with a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            comment: None,
        }
    }

    /// Sets the comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// A validated trip. Flights are kept in order of UTC takeoff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trip {
    id: Option<EntityId>,
    name: String,
    comment: Option<String>,
    flights: Vec<TripFlight>,
}

impl Trip {
    /// Validates a draft into a memory-only trip with no flights.
    ///
    /// # Errors
    ///
    /// Fails if the name is rejected.
    pub fn new(draft: TripDraft) -> Result<Self> {
        let mut errors = ValidationErrors::new();
        let name = errors.check(field::NAME, check_name(draft.name.as_deref()));
        let Some(name) = name else {
            return Err(errors.into());
        };
        Ok(Self {
            id: None,
            name,
            comment: normalize_text(draft.comment.as_deref()),
            flights: Vec::new(),
        })
    }

    /// Sets the name.
    ///
    /// # Errors
    ///
    /// Fails if the name is shorter than three characters or has a semicolon.
    pub fn set_name(&mut self, name: Option<&str>) -> Result<()> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = errors.check(field::NAME, check_name(name)) {
            self.name = name;
        }
        errors.into_result(())
    }

    /// Sets the comment. Blank clears it.
    pub fn set_comment(&mut self, comment: Option<&str>) {
        self.comment = normalize_text(comment);
    }

    /// Adds a flight at its place in takeoff order.
    pub fn add_flight(&mut self, flight: TripFlight) {
        let at = self
            .flights
            .partition_point(|f| f.utc_takeoff() <= flight.utc_takeoff());
        self.flights.insert(at, flight);
    }

    /// Adds several flights.
    pub fn add_flights(&mut self, flights: impl IntoIterator<Item = TripFlight>) {
        for flight in flights {
            self.add_flight(flight);
        }
    }

    /// Replaces every flight.
    pub fn set_flights(&mut self, flights: Vec<TripFlight>) {
        self.flights = flights;
        self.flights.sort_by_key(TripFlight::utc_takeoff);
    }

    /// Removes the flight at `index` in takeoff order.
    pub fn remove_flight(&mut self, index: usize) -> Option<TripFlight> {
        (index < self.flights.len()).then(|| self.flights.remove(index))
    }

    /// Trip name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-form comment.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Flights in takeoff order.
    #[must_use]
    pub fn flights(&self) -> &[TripFlight] {
        &self.flights
    }
}

impl Record for Trip {
    const KIND: &'static str = "trip";
    const COLUMNS: &'static [&'static str] = &[field::NAME, field::COMMENT, field::FLIGHTS];
    type Key = str;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn with_id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }

    fn value(&self, column: &str) -> Value {
        match column {
            field::NAME => Value::text(&self.name),
            field::COMMENT => self.comment.as_deref().into(),
            field::FLIGHTS => Value::Int(i64::try_from(self.flights.len()).unwrap_or(i64::MAX)),
            _ => Value::Null,
        }
    }

    fn unique_keys(&self) -> Vec<(&'static str, Value)> {
        vec![(field::NAME, Value::text(&self.name))]
    }

    fn matches_key(&self, name: &str) -> bool {
        self.name == name.trim()
    }
}
