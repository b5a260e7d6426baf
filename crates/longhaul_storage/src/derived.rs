//! Columns computed from other collections rather than stored on a record.

use longhaul_foundation::{Result, Value};
use longhaul_model::Record;

/// A sortable, filterable column whose values a store computes on demand.
///
/// The store asks for values only when a page query names the column.
pub trait DerivedColumn<E: Record> {
    /// Column name used by sorts and filter bindings.
    fn column(&self) -> &'static str;

    /// Computes one value per record, aligned with `records`.
    ///
    /// # Errors
    ///
    /// Fails if the source of the values is unreachable.
    fn evaluate(&self, records: &[E]) -> Result<Vec<Value>>;
}
