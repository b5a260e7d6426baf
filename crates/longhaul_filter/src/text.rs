//! Free-text matching.

use longhaul_foundation::Value;

/// Case-insensitive substring containment.
///
/// An empty needle matches everything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextPredicate {
    needle: String,
}

impl TextPredicate {
    /// Creates a predicate for the given substring.
    #[must_use]
    pub fn new(substring: impl AsRef<str>) -> Self {
        Self {
            needle: substring.as_ref().to_lowercase(),
        }
    }

    /// Returns the lower-cased needle.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.needle
    }

    /// Returns true if this predicate matches everything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// Tests a candidate string.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        self.needle.is_empty() || candidate.to_lowercase().contains(&self.needle)
    }

    /// Tests the display form of a value.
    #[must_use]
    pub fn matches_value(&self, value: &Value) -> bool {
        self.needle.is_empty() || self.matches(&value.to_string())
    }
}
