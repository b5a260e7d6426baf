//! Airports with their location and daylight saving schedule.

use longhaul_foundation::{EntityId, Result, ValidationErrors, Value};

use crate::dst::DstType;
use crate::record::Record;
use crate::validate::{
    check_code, check_name, check_no_semicolon, check_range, check_required,
    check_required_code, LATITUDE, LONGITUDE, MIN_ALTITUDE, TIMEZONE,
};

/// Column and field names.
pub mod field {
    /// Airport name.
    pub const NAME: &str = "Name";
    /// City served.
    pub const CITY: &str = "City";
    /// Country.
    pub const COUNTRY: &str = "Country";
    /// Three-character IATA code.
    pub const IATA: &str = "Iata";
    /// Four-character ICAO code.
    pub const ICAO: &str = "Icao";
    /// Latitude in degrees.
    pub const LATITUDE: &str = "Latitude";
    /// Longitude in degrees.
    pub const LONGITUDE: &str = "Longitude";
    /// Altitude in feet.
    pub const ALTITUDE: &str = "Altitude";
    /// UTC offset in hours.
    pub const TIMEZONE: &str = "Timezone";
    /// Daylight saving code.
    pub const DST: &str = "Dst";
    /// IATA if present, otherwise ICAO.
    pub const CODE: &str = "Code";
}

/// Raw, unvalidated airport input.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AirportDraft {
    /// Airport name.
    pub name: Option<String>,
    /// City served.
    pub city: Option<String>,
    /// Country.
    pub country: Option<String>,
    /// IATA code.
    pub iata: Option<String>,
    /// ICAO code.
    pub icao: Option<String>,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Altitude in feet.
    pub altitude: i32,
    /// UTC offset in hours.
    pub timezone: f64,
    /// Daylight saving code.
    pub dst: char,
}

impl Default for AirportDraft {
    fn default() -> Self {
        Self {
            name: None,
            city: None,
            country: None,
            iata: None,
            icao: None,
            latitude: 0.0,
            longitude: 0.0,
            altitude: 0,
            timezone: 0.0,
            dst: DstType::Unknown.to_code(),
        }
    }
}

impl AirportDraft {
    /// Sets the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the city.
    #[must_use]
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Sets the country.
    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Sets the IATA code.
    #[must_use]
    pub fn with_iata(mut self, iata: impl Into<String>) -> Self {
        self.iata = Some(iata.into());
        self
    }

    /// Sets the ICAO code.
    #[must_use]
    pub fn with_icao(mut self, icao: impl Into<String>) -> Self {
        self.icao = Some(icao.into());
        self
    }

    /// Sets latitude and longitude.
    #[must_use]
    pub fn with_position(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = latitude;
        self.longitude = longitude;
        self
    }

    /// Sets the altitude.
    #[must_use]
    pub fn with_altitude(mut self, altitude: i32) -> Self {
        self.altitude = altitude;
        self
    }

    /// Sets the UTC offset.
    #[must_use]
    pub fn with_timezone(mut self, timezone: f64) -> Self {
        self.timezone = timezone;
        self
    }

    /// Sets the daylight saving code.
    #[must_use]
    pub fn with_dst(mut self, dst: char) -> Self {
        self.dst = dst;
        self
    }
}

/// A validated airport.
#[derive(Clone, Debug, PartialEq)]
pub struct Airport {
    id: Option<EntityId>,
    name: String,
    city: String,
    country: String,
    iata: Option<String>,
    icao: String,
    latitude: f64,
    longitude: f64,
    altitude: i32,
    timezone: f64,
    dst: DstType,
}

impl Airport {
    /// Validates a draft into a memory-only airport.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing every rejected field.
    pub fn new(draft: AirportDraft) -> Result<Self> {
        validate(None, &draft)
    }

    /// Returns the current state as a draft.
    #[must_use]
    pub fn draft(&self) -> AirportDraft {
        AirportDraft {
            name: Some(self.name.clone()),
            city: Some(self.city.clone()),
            country: Some(self.country.clone()),
            iata: self.iata.clone(),
            icao: Some(self.icao.clone()),
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude,
            timezone: self.timezone,
            dst: self.dst.to_code(),
        }
    }

    /// Applies several field changes at once; on failure nothing changes.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing every rejected field.
    pub fn edit(&mut self, f: impl FnOnce(&mut AirportDraft)) -> Result<()> {
        let mut draft = self.draft();
        f(&mut draft);
        *self = validate(self.id, &draft)?;
        Ok(())
    }

    /// Sets the name.
    ///
    /// # Errors
    ///
    /// Fails if the name is shorter than three characters or has a semicolon.
    pub fn set_name(&mut self, name: Option<&str>) -> Result<()> {
        self.edit(|d| d.name = name.map(str::to_owned))
    }

    /// Sets the city.
    ///
    /// # Errors
    ///
    /// Fails if the city is blank or has a semicolon.
    pub fn set_city(&mut self, city: Option<&str>) -> Result<()> {
        self.edit(|d| d.city = city.map(str::to_owned))
    }

    /// Sets the country.
    ///
    /// # Errors
    ///
    /// Fails if the country is blank.
    pub fn set_country(&mut self, country: Option<&str>) -> Result<()> {
        self.edit(|d| d.country = country.map(str::to_owned))
    }

    /// Sets the optional IATA code.
    ///
    /// # Errors
    ///
    /// Fails if the code is present but not three alphanumeric characters.
    pub fn set_iata(&mut self, iata: Option<&str>) -> Result<()> {
        self.edit(|d| d.iata = iata.map(str::to_owned))
    }

    /// Sets the ICAO code.
    ///
    /// # Errors
    ///
    /// Fails if the code is not four alphanumeric characters.
    pub fn set_icao(&mut self, icao: Option<&str>) -> Result<()> {
        self.edit(|d| d.icao = icao.map(str::to_owned))
    }

    /// Sets the latitude.
    ///
    /// # Errors
    ///
    /// Fails outside -90..=90.
    pub fn set_latitude(&mut self, latitude: f64) -> Result<()> {
        self.edit(|d| d.latitude = latitude)
    }

    /// Sets the longitude.
    ///
    /// # Errors
    ///
    /// Fails outside -180..=180.
    pub fn set_longitude(&mut self, longitude: f64) -> Result<()> {
        self.edit(|d| d.longitude = longitude)
    }

    /// Sets the altitude.
    ///
    /// # Errors
    ///
    /// Fails below -1240 ft.
    pub fn set_altitude(&mut self, altitude: i32) -> Result<()> {
        self.edit(|d| d.altitude = altitude)
    }

    /// Sets the UTC offset.
    ///
    /// # Errors
    ///
    /// Fails outside -12..=14.
    pub fn set_timezone(&mut self, timezone: f64) -> Result<()> {
        self.edit(|d| d.timezone = timezone)
    }

    /// Sets the daylight saving code.
    ///
    /// # Errors
    ///
    /// Fails if the character names no schedule.
    pub fn set_dst(&mut self, code: char) -> Result<()> {
        self.edit(|d| d.dst = code)
    }

    /// Airport name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// City served.
    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Country.
    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }

    /// IATA code.
    #[must_use]
    pub fn iata(&self) -> Option<&str> {
        self.iata.as_deref()
    }

    /// ICAO code.
    #[must_use]
    pub fn icao(&self) -> &str {
        &self.icao
    }

    /// Latitude in degrees.
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Altitude in feet.
    #[must_use]
    pub fn altitude(&self) -> i32 {
        self.altitude
    }

    /// UTC offset in hours.
    #[must_use]
    pub fn timezone(&self) -> f64 {
        self.timezone
    }

    /// Daylight saving schedule.
    #[must_use]
    pub fn dst(&self) -> DstType {
        self.dst
    }

    /// The code routes refer to this airport by: IATA if present, otherwise ICAO.
    #[must_use]
    pub fn code(&self) -> &str {
        self.iata.as_deref().unwrap_or(&self.icao)
    }
}

fn validate(id: Option<EntityId>, draft: &AirportDraft) -> Result<Airport> {
    let mut errors = ValidationErrors::new();

    let name = errors.check(field::NAME, check_name(draft.name.as_deref()));
    let city = errors.check(
        field::CITY,
        check_required(draft.city.as_deref(), "City cannot be empty")
            .and_then(|c| check_no_semicolon(c, "City")),
    );
    let country = errors.check(
        field::COUNTRY,
        check_required(draft.country.as_deref(), "Country cannot be empty"),
    );
    let iata = errors.check(
        field::IATA,
        check_code(
            draft.iata.as_deref(),
            3..=3,
            "IATA must be a three-character alphanumeric code",
        ),
    );
    let icao = errors.check(
        field::ICAO,
        check_required_code(
            draft.icao.as_deref(),
            4..=4,
            "ICAO must be a four-character alphanumeric code",
        ),
    );
    let latitude = errors.check(
        field::LATITUDE,
        check_range(draft.latitude, LATITUDE, "Latitude must be between -90 and 90"),
    );
    let longitude = errors.check(
        field::LONGITUDE,
        check_range(draft.longitude, LONGITUDE, "Longitude must be between -180 and 180"),
    );
    let altitude = errors.check(
        field::ALTITUDE,
        check_range(draft.altitude, MIN_ALTITUDE.., "Altitude cannot be below -1240ft"),
    );
    let timezone = errors.check(
        field::TIMEZONE,
        check_range(draft.timezone, TIMEZONE, "Timezone UTC offset must be between -12 and 14"),
    );
    let dst = errors.check(
        field::DST,
        DstType::from_code(draft.dst)
            .ok_or_else(|| format!("'{}' is not a daylight saving code", draft.dst)),
    );

    let (
        Some(name),
        Some(city),
        Some(country),
        Some(iata),
        Some(icao),
        Some(latitude),
        Some(longitude),
        Some(altitude),
        Some(timezone),
        Some(dst),
    ) = (name, city, country, iata, icao, latitude, longitude, altitude, timezone, dst)
    else {
        return Err(errors.into());
    };

    Ok(Airport {
        id,
        name,
        city,
        country,
        iata,
        icao,
        latitude,
        longitude,
        altitude,
        timezone,
        dst,
    })
}

impl TryFrom<AirportDraft> for Airport {
    type Error = longhaul_foundation::Error;

    fn try_from(draft: AirportDraft) -> Result<Self> {
        Self::new(draft)
    }
}

impl Record for Airport {
    const KIND: &'static str = "airport";
    const COLUMNS: &'static [&'static str] = &[
        field::NAME,
        field::CITY,
        field::COUNTRY,
        field::IATA,
        field::ICAO,
        field::LATITUDE,
        field::LONGITUDE,
        field::ALTITUDE,
        field::TIMEZONE,
        field::DST,
        field::CODE,
    ];
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
            field::CITY => Value::text(&self.city),
            field::COUNTRY => Value::text(&self.country),
            field::IATA => self.iata.as_deref().into(),
            field::ICAO => Value::text(&self.icao),
            field::LATITUDE => Value::Float(self.latitude),
            field::LONGITUDE => Value::Float(self.longitude),
            field::ALTITUDE => Value::from(self.altitude),
            field::TIMEZONE => Value::Float(self.timezone),
            field::DST => Value::text(self.dst.to_code().to_string()),
            field::CODE => Value::text(self.code()),
            _ => Value::Null,
        }
    }

    fn unique_keys(&self) -> Vec<(&'static str, Value)> {
        let mut keys = vec![(field::ICAO, Value::text(&self.icao))];
        if let Some(iata) = &self.iata {
            keys.push((field::IATA, Value::text(iata)));
        }
        keys
    }

    fn matches_key(&self, code: &str) -> bool {
        let code = code.trim();
        self.icao.eq_ignore_ascii_case(code)
            || self.iata.as_deref().is_some_and(|c| c.eq_ignore_ascii_case(code))
    }
}
