//! The backing store contract.

use im::OrdSet;
use longhaul_foundation::{EntityId, Result, Value};
use longhaul_model::Record;

use crate::query::PageQuery;

/// Keyed CRUD plus a filtered, sorted, paginated query primitive.
///
/// Implementations report collisions on unique keys as
/// [`longhaul_foundation::ErrorKind::UniquenessConflict`] and I/O level faults
/// as [`longhaul_foundation::ErrorKind::Storage`]. Calls may be slow but
/// are synchronous.
pub trait Backend<E: Record> {
    /// Stores a memory-only record and returns it with its new identifier.
    ///
    /// # Errors
    ///
    /// Fails on a unique key collision or a storage fault.
    fn insert(&mut self, record: E) -> Result<E>;

    /// Replaces a stored record with the same identifier.
    ///
    /// # Errors
    ///
    /// Fails if the record is unknown, on a unique key collision, or on a storage fault.
    fn update(&mut self, record: E) -> Result<E>;

    /// Removes a record, returning it.
    ///
    /// # Errors
    ///
    /// Fails if the record is unknown or on a storage fault.
    fn delete(&mut self, id: EntityId) -> Result<E>;

    /// Fetches one record by identifier.
    ///
    /// # Errors
    ///
    /// Fails on a storage fault.
    fn get(&self, id: EntityId) -> Result<Option<E>>;

    /// Fetches every record in identifier order.
    ///
    /// # Errors
    ///
    /// Fails on a storage fault.
    fn all(&self) -> Result<Vec<E>>;

    /// Fetches the first record matching a secondary key.
    ///
    /// # Errors
    ///
    /// Fails on a storage fault.
    fn find(&self, key: &E::Key) -> Result<Option<E>>;

    /// Runs a page query.
    ///
    /// # Errors
    ///
    /// Fails on an unknown column or a storage fault.
    fn query(&self, query: &PageQuery) -> Result<Vec<E>>;

    /// Counts records whose `column` equals `value`.
    ///
    /// # Errors
    ///
    /// Fails on an unknown column or a storage fault.
    fn count_eq(&self, column: &str, value: &Value) -> Result<usize>;

    /// Distinct non-null values of `column`.
    ///
    /// # Errors
    ///
    /// Fails on an unknown column or a storage fault.
    fn distinct(&self, column: &str) -> Result<OrdSet<Value>>;

    /// Number of stored records.
    ///
    /// # Errors
    ///
    /// Fails on a storage fault.
    fn len(&self) -> Result<usize>;
}
