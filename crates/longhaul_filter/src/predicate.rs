//! Column predicates handed to the backing store.

use std::fmt;

use im::OrdSet;
use longhaul_foundation::Value;

use crate::text::TextPredicate;

/// A single condition on one column.
///
/// A query matches a record when every predicate matches (AND across
/// predicates). [`Predicate::OneOf`] matches when the column equals any of its
/// values (OR within the set).
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    /// Column value is one of the given values.
    OneOf {
        /// Column name.
        column: String,
        /// Accepted values.
        values: OrdSet<Value>,
    },
    /// Numeric column value within optional inclusive bounds.
    Between {
        /// Column name.
        column: String,
        /// Lower bound, `None` when open.
        min: Option<f64>,
        /// Upper bound, `None` when open.
        max: Option<f64>,
    },
    /// Display form of the column value contains a substring.
    Contains {
        /// Column name.
        column: String,
        /// Substring to look for.
        text: TextPredicate,
    },
}

impl Predicate {
    /// Creates a set-membership predicate.
    #[must_use]
    pub fn one_of(column: impl Into<String>, values: impl IntoIterator<Item = Value>) -> Self {
        Self::OneOf {
            column: column.into(),
            values: values.into_iter().collect(),
        }
    }

    /// Creates a range predicate.
    #[must_use]
    pub fn between(column: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        Self::Between {
            column: column.into(),
            min,
            max,
        }
    }

    /// Creates a substring predicate.
    #[must_use]
    pub fn contains(column: impl Into<String>, text: impl AsRef<str>) -> Self {
        Self::Contains {
            column: column.into(),
            text: TextPredicate::new(text),
        }
    }

    /// Returns the column this predicate reads.
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Self::OneOf { column, .. }
            | Self::Between { column, .. }
            | Self::Contains { column, .. } => column,
        }
    }

    /// Tests a column value.
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::OneOf { values, .. } => values.contains(value),
            Self::Between { min, max, .. } => {
                if min.is_none() && max.is_none() {
                    return true;
                }
                value.as_f64().is_some_and(|v| {
                    min.is_none_or(|lo| v >= lo) && max.is_none_or(|hi| v <= hi)
                })
            }
            Self::Contains { text, .. } => text.matches_value(value),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneOf { column, values } => write!(f, "{column} in {values:?}"),
            Self::Between { column, min, max } => match (min, max) {
                (Some(lo), Some(hi)) => write!(f, "{lo} <= {column} <= {hi}"),
                (Some(lo), None) => write!(f, "{column} >= {lo}"),
                (None, Some(hi)) => write!(f, "{column} <= {hi}"),
                (None, None) => write!(f, "{column} is any"),
            },
            Self::Contains { column, text } => write!(f, "{column} contains {:?}", text.as_str()),
        }
    }
}
