//! Airlines, identified by an IATA and/or ICAO code.

use longhaul_foundation::{EntityId, Result, ValidationErrors, Value};

use crate::record::Record;
use crate::validate::{check_code, check_name, check_no_semicolon, check_required, normalize_text};

/// Column and field names.
pub mod field {
    /// Airline name.
    pub const NAME: &str = "Name";
    /// Radio callsign.
    pub const CALLSIGN: &str = "Callsign";
    /// Two-character IATA code.
    pub const IATA: &str = "Iata";
    /// Three-character ICAO code.
    pub const ICAO: &str = "Icao";
    /// Country of registration.
    pub const COUNTRY: &str = "Country";
    /// IATA if present, otherwise ICAO.
    pub const CODE: &str = "Code";
}

/// Raw, unvalidated airline input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AirlineDraft {
    /// Airline name.
    pub name: Option<String>,
    /// Radio callsign.
    pub callsign: Option<String>,
    /// IATA code.
    pub iata: Option<String>,
    /// ICAO code.
    pub icao: Option<String>,
    /// Country of registration.
    pub country: Option<String>,
}

impl AirlineDraft {
    /// Sets the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the callsign.
    #[must_use]
    pub fn with_callsign(mut self, callsign: impl Into<String>) -> Self {
        self.callsign = Some(callsign.into());
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

    /// Sets the country.
    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }
}

/// A validated airline.
///
/// At least one of the IATA and ICAO codes is always present.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Airline {
    id: Option<EntityId>,
    name: String,
    callsign: Option<String>,
    iata: Option<String>,
    icao: Option<String>,
    country: String,
}

impl Airline {
    /// Validates a draft into a memory-only airline.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing every rejected field.
    pub fn new(draft: AirlineDraft) -> Result<Self> {
        validate(None, &draft)
    }

    /// Returns the current state as a draft.
    #[must_use]
    pub fn draft(&self) -> AirlineDraft {
        AirlineDraft {
            name: Some(self.name.clone()),
            callsign: self.callsign.clone(),
            iata: self.iata.clone(),
            icao: self.icao.clone(),
            country: Some(self.country.clone()),
        }
    }

    /// Applies several field changes at once.
    ///
    /// The edited draft is validated as a whole; on failure nothing changes.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing every rejected field.
    pub fn edit(&mut self, f: impl FnOnce(&mut AirlineDraft)) -> Result<()> {
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

    /// Sets the callsign.
    ///
    /// # Errors
    ///
    /// Fails if the callsign has a semicolon.
    pub fn set_callsign(&mut self, callsign: Option<&str>) -> Result<()> {
        self.edit(|d| d.callsign = callsign.map(str::to_owned))
    }

    /// Sets the IATA code. Blank is accepted only while an ICAO code is present.
    ///
    /// # Errors
    ///
    /// Fails if the code is malformed or both codes would be blank.
    pub fn set_iata(&mut self, iata: Option<&str>) -> Result<()> {
        self.edit(|d| d.iata = iata.map(str::to_owned))
    }

    /// Sets the ICAO code. Blank is accepted only while an IATA code is present.
    ///
    /// # Errors
    ///
    /// Fails if the code is malformed or both codes would be blank.
    pub fn set_icao(&mut self, icao: Option<&str>) -> Result<()> {
        self.edit(|d| d.icao = icao.map(str::to_owned))
    }

    /// Sets both codes together.
    ///
    /// # Errors
    ///
    /// Fails if either code is malformed or both are blank.
    pub fn set_codes(&mut self, iata: Option<&str>, icao: Option<&str>) -> Result<()> {
        self.edit(|d| {
            d.iata = iata.map(str::to_owned);
            d.icao = icao.map(str::to_owned);
        })
    }

    /// Sets the country.
    ///
    /// # Errors
    ///
    /// Fails if the country is blank.
    pub fn set_country(&mut self, country: Option<&str>) -> Result<()> {
        self.edit(|d| d.country = country.map(str::to_owned))
    }

    /// Airline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Radio callsign.
    #[must_use]
    pub fn callsign(&self) -> Option<&str> {
        self.callsign.as_deref()
    }

    /// IATA code.
    #[must_use]
    pub fn iata(&self) -> Option<&str> {
        self.iata.as_deref()
    }

    /// ICAO code.
    #[must_use]
    pub fn icao(&self) -> Option<&str> {
        self.icao.as_deref()
    }

    /// Country of registration.
    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }

    /// The code routes refer to this airline by: IATA if present, otherwise ICAO.
    #[must_use]
    pub fn code(&self) -> &str {
        self.iata
            .as_deref()
            .or(self.icao.as_deref())
            .unwrap_or_default()
    }
}

/// Checks a whole candidate airline, reporting every violation.
fn validate(id: Option<EntityId>, draft: &AirlineDraft) -> Result<Airline> {
    let mut errors = ValidationErrors::new();

    let name = errors.check(field::NAME, check_name(draft.name.as_deref()));
    let callsign = errors.check(
        field::CALLSIGN,
        normalize_text(draft.callsign.as_deref())
            .map(|c| check_no_semicolon(c, "Callsign"))
            .transpose(),
    );
    let iata = errors.check(
        field::IATA,
        check_code(
            draft.iata.as_deref(),
            2..=2,
            "IATA must be a two-character alphanumeric code",
        ),
    );
    let icao = errors.check(
        field::ICAO,
        check_code(
            draft.icao.as_deref(),
            3..=3,
            "ICAO must be a three-character alphanumeric code",
        ),
    );
    if normalize_text(draft.iata.as_deref()).is_none()
        && normalize_text(draft.icao.as_deref()).is_none()
    {
        errors.insert(field::IATA, "IATA cannot be empty if ICAO is also empty");
        errors.insert(field::ICAO, "ICAO cannot be empty if IATA is also empty");
    }
    let country = errors.check(
        field::COUNTRY,
        check_required(draft.country.as_deref(), "Country name cannot be empty"),
    );

    match (name, callsign, iata, icao, country) {
        (Some(name), Some(callsign), Some(iata), Some(icao), Some(country)) if errors.is_empty() => {
            Ok(Airline {
                id,
                name,
                callsign,
                iata,
                icao,
                country,
            })
        }
        _ => Err(errors.into()),
    }
}

impl TryFrom<AirlineDraft> for Airline {
    type Error = longhaul_foundation::Error;

    fn try_from(draft: AirlineDraft) -> Result<Self> {
        Self::new(draft)
    }
}

impl Record for Airline {
    const KIND: &'static str = "airline";
    const COLUMNS: &'static [&'static str] = &[
        field::NAME,
        field::CALLSIGN,
        field::IATA,
        field::ICAO,
        field::COUNTRY,
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
            field::CALLSIGN => self.callsign.as_deref().into(),
            field::IATA => self.iata.as_deref().into(),
            field::ICAO => self.icao.as_deref().into(),
            field::COUNTRY => Value::text(&self.country),
            field::CODE => Value::text(self.code()),
            _ => Value::Null,
        }
    }

    fn unique_keys(&self) -> Vec<(&'static str, Value)> {
        let mut keys = vec![(field::NAME, Value::text(&self.name))];
        if let Some(iata) = &self.iata {
            keys.push((field::IATA, Value::text(iata)));
        }
        if let Some(icao) = &self.icao {
            keys.push((field::ICAO, Value::text(icao)));
        }
        keys
    }

    fn matches_key(&self, code: &str) -> bool {
        let code = code.trim();
        self.iata.as_deref().is_some_and(|c| c.eq_ignore_ascii_case(code))
            || self.icao.as_deref().is_some_and(|c| c.eq_ignore_ascii_case(code))
    }
}
