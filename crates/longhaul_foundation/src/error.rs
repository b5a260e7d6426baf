//! Error types for the Longhaul system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//!
//! Three failure kinds are recoverable at the call site and must stay
//! distinguishable: field validation ([`ErrorKind::Validation`]), collection-wide
//! key collisions ([`ErrorKind::UniquenessConflict`]) and backing store faults
//! ([`ErrorKind::Storage`]).

use std::fmt;

use thiserror::Error;

use crate::entity::EntityId;

/// The main error type for Longhaul operations.
#[derive(Clone, Debug, Error)]
#[error("{kind}{}", context_suffix(.context))]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error, replacing any earlier context.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a missing related record error.
    #[must_use]
    pub fn missing(entity: &'static str, key: impl Into<String>) -> Self {
        Self::new(ErrorKind::Missing {
            entity,
            key: key.into(),
        })
    }

    /// Creates a field validation error.
    #[must_use]
    pub fn validation(errors: ValidationErrors) -> Self {
        Self::new(ErrorKind::Validation(errors))
    }

    /// Creates a validation error for a single field.
    #[must_use]
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.insert(field, reason);
        Self::validation(errors)
    }

    /// Creates a uniqueness conflict error.
    #[must_use]
    pub fn uniqueness_conflict(
        entity: &'static str,
        field: &'static str,
        value: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::UniquenessConflict {
            entity,
            field,
            value: value.into(),
        })
    }

    /// Creates a storage failure error.
    #[must_use]
    pub fn storage(fault: StorageFault) -> Self {
        Self::new(ErrorKind::Storage(fault))
    }

    /// Creates an entity not found error.
    #[must_use]
    pub fn not_found(entity: &'static str, id: EntityId) -> Self {
        Self::new(ErrorKind::NotFound { entity, id })
    }

    /// Creates an invalid filter definition error.
    #[must_use]
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidFilter(message.into()))
    }

    /// Creates an unknown filter error.
    #[must_use]
    pub fn unknown_filter(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownFilter(name.into()))
    }

    /// Creates an unknown column error.
    #[must_use]
    pub fn unknown_column(entity: &'static str, column: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownColumn {
            entity,
            column: column.into(),
        })
    }

    /// Creates an invalid page request error.
    #[must_use]
    pub fn invalid_page(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidPage(message.into()))
    }

    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidConfig(message.into()))
    }

    /// Creates a listener failure error.
    #[must_use]
    pub fn listener(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Listener(message.into()))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Returns the validation errors if this is a validation failure.
    #[must_use]
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match &self.kind {
            ErrorKind::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Returns true if this is a field validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self.kind, ErrorKind::Validation(_))
    }

    /// Returns true if this is a uniqueness conflict.
    #[must_use]
    pub fn is_uniqueness_conflict(&self) -> bool {
        matches!(self.kind, ErrorKind::UniquenessConflict { .. })
    }

    /// Returns true if this is a backing store failure.
    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(self.kind, ErrorKind::Storage(_))
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Self::validation(errors)
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Clone, Debug, Error)]
pub enum ErrorKind {
    /// One or more fields were rejected by a mutation attempt.
    #[error("{0}")]
    Validation(ValidationErrors),

    /// A save would duplicate a key that must be unique across the collection.
    #[error("the value '{value}' for the {entity} {field} must be unique")]
    UniquenessConflict {
        /// The entity kind being saved.
        entity: &'static str,
        /// The field whose value collided.
        field: &'static str,
        /// The colliding value.
        value: String,
    },

    /// The backing store is unreachable or corrupted.
    #[error("storage failure: {0}")]
    Storage(StorageFault),

    /// Entity was not found in the backing store.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The entity kind that was looked up.
        entity: &'static str,
        /// The identifier that was looked up.
        id: EntityId,
    },

    /// A record referenced by natural key does not exist.
    #[error("no {entity} for {key}")]
    Missing {
        /// The entity kind that was looked up.
        entity: &'static str,
        /// The natural key that was looked up.
        key: String,
    },

    /// A filter was declared with an impossible domain or bounds.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// A filter was addressed that the registry does not hold, or holds with another shape.
    #[error("unknown filter: {0}")]
    UnknownFilter(String),

    /// A sort or predicate named a column the entity kind does not have.
    #[error("{entity} has no column '{column}'")]
    UnknownColumn {
        /// The entity kind queried.
        entity: &'static str,
        /// The column that was named.
        column: String,
    },

    /// A page was requested with an unusable size.
    #[error("invalid page request: {0}")]
    InvalidPage(String),

    /// Configuration values are unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A change listener reported a failure.
    #[error("listener failed: {0}")]
    Listener(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Backing store failures, distinct from constraint violations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StorageFault {
    /// The store could not be reached.
    #[error("backing store unavailable")]
    Unavailable,
    /// The store returned data that could not be interpreted.
    #[error("backing store corrupted: {0}")]
    Corrupted(String),
    /// Any other I/O level failure.
    #[error("{0}")]
    Io(String),
}

/// Identifies the field a validation failure belongs to.
///
/// List-valued fields report one failure per offending element, so a key may
/// carry the element position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldKey {
    /// Field name, e.g. `Iata`.
    pub name: &'static str,
    /// Element position for list-valued fields.
    pub index: Option<usize>,
}

impl FieldKey {
    /// Key for a whole field.
    #[must_use]
    pub const fn field(name: &'static str) -> Self {
        Self { name, index: None }
    }

    /// Key for one element of a list-valued field.
    #[must_use]
    pub const fn element(name: &'static str, index: usize) -> Self {
        Self {
            name,
            index: Some(index),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{index}]", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl From<&'static str> for FieldKey {
    fn from(name: &'static str) -> Self {
        Self::field(name)
    }
}

/// Aggregated field validation failures from a single mutation attempt.
///
/// Entries keep insertion order, so element failures of a list field appear
/// in input order. Reasons reported twice for the same key are joined with
/// `" AND "`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    entries: Vec<(FieldKey, String)>,
}

impl ValidationErrors {
    /// Creates an empty set of failures.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Records a failure for a field, merging with any existing reason.
    pub fn insert(&mut self, key: impl Into<FieldKey>, reason: impl Into<String>) {
        let key = key.into();
        let reason = reason.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => {
                existing.push_str(" AND ");
                existing.push_str(&reason);
            }
            None => self.entries.push((key, reason)),
        }
    }

    /// Merges every failure of `other` into this set.
    pub fn merge(&mut self, other: ValidationErrors) {
        for (key, reason) in other.entries {
            self.insert(key, reason);
        }
    }

    /// Records the outcome of a single field check, returning the accepted value.
    pub fn check<T>(
        &mut self,
        key: impl Into<FieldKey>,
        outcome: std::result::Result<T, String>,
    ) -> Option<T> {
        match outcome {
            Ok(value) => Some(value),
            Err(reason) => {
                self.insert(key, reason);
                None
            }
        }
    }

    /// Returns the reason recorded for a whole field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.name == name && k.index.is_none())
            .map(|(_, reason)| reason.as_str())
    }

    /// Returns the reason recorded for one element of a list field.
    #[must_use]
    pub fn get_indexed(&self, name: &str, index: usize) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.name == name && k.index == Some(index))
            .map(|(_, reason)| reason.as_str())
    }

    /// Returns true if any failure was recorded against the named field.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k.name == name)
    }

    /// Returns the number of distinct keys with failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over failures in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &str)> {
        self.entries.iter().map(|(k, r)| (k, r.as_str()))
    }

    /// Converts into `Ok(value)` if nothing failed, otherwise a validation error.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Validation`] carrying every recorded failure.
    pub fn into_result<T>(self, value: T) -> Result<T> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(Error::validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "the following data constraints ({}) were violated:",
            self.entries.len()
        )?;
        for (key, reason) in &self.entries {
            write!(f, "\n'{key}': {reason}")?;
        }
        Ok(())
    }
}

/// Context about where an error occurred.
#[derive(Clone, Debug, Default)]
pub struct ErrorContext {
    /// Operation that failed, e.g. `save`.
    pub operation: Option<String>,
    /// Entity kind involved.
    pub entity: Option<&'static str>,
    /// Identifier of the entity involved.
    pub id: Option<EntityId>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the failing operation.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Sets the entity kind.
    #[must_use]
    pub fn with_entity(mut self, entity: &'static str) -> Self {
        self.entity = Some(entity);
        self
    }

    /// Sets the entity identifier.
    #[must_use]
    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(operation) = &self.operation {
            write!(f, "in {operation}")?;
        }
        if let Some(entity) = self.entity {
            write!(f, " of {entity}")?;
        }
        if let Some(id) = self.id {
            write!(f, " {id}")?;
        }
        Ok(())
    }
}

fn context_suffix(context: &Option<ErrorContext>) -> String {
    context.as_ref().map(|c| format!(" ({c})")).unwrap_or_default()
}

/// Result alias used throughout Longhaul.
pub type Result<T> = std::result::Result<T, Error>;
