//! The capability set every stored entity kind provides.

use std::fmt;

use longhaul_foundation::{EntityId, Value};

/// A uniquely identified, validated record that an entity store can hold.
///
/// Columns are addressed by name. The names double as the field names used
/// in validation failures, so a rejected column and a sortable column read
/// the same.
pub trait Record: Clone + fmt::Debug + 'static {
    /// Human-readable kind name, e.g. `airline`.
    const KIND: &'static str;

    /// Every column [`Record::value`] understands.
    const COLUMNS: &'static [&'static str];

    /// Secondary lookup key, e.g. an airport code.
    type Key: ?Sized + fmt::Debug;

    /// Returns the identifier, or `None` for a memory-only record.
    fn id(&self) -> Option<EntityId>;

    /// Returns this record tagged with a store-assigned identifier.
    #[must_use]
    fn with_id(self, id: EntityId) -> Self;

    /// Reads one column. Unknown columns read as [`Value::Null`].
    fn value(&self, column: &str) -> Value;

    /// Returns every present value that must be unique across the collection,
    /// keyed by the name reported on conflict.
    fn unique_keys(&self) -> Vec<(&'static str, Value)>;

    /// Returns true if this record is found by the secondary key.
    fn matches_key(&self, key: &Self::Key) -> bool;

    /// Returns true if this record has never been saved.
    fn is_memory_only(&self) -> bool {
        self.id().is_none()
    }

    /// Returns true if `column` is one of [`Record::COLUMNS`].
    #[must_use]
    fn has_column(column: &str) -> bool {
        Self::COLUMNS.contains(&column)
    }
}
