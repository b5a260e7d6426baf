//! Entity stores: the authoritative collection of one entity kind.
//!
//! Every successful mutation runs the same sequence before returning:
//! refresh the option universes of the store's multi-select filters, notify
//! the filter registry once if any universe changed, then notify the store's
//! own listeners. No backend borrow is held while listeners run, so a
//! listener may read the store.
//!
//! Failed mutations and page reads carry an [`ErrorContext`] naming the
//! operation, the entity kind and, when known, the record identifier.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use longhaul_filter::{FilterBinding, FilterRegistry, Predicate};
use longhaul_foundation::{EntityId, Error, ErrorContext, ListenerId, Listeners, Result, Value};
use longhaul_model::Record;

use crate::backend::Backend;
use crate::derived::DerivedColumn;
use crate::memory::MemoryBackend;
use crate::query::{PageQuery, SortOrder};

/// What a mutation did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// A record was inserted.
    Inserted,
    /// A record was replaced.
    Updated,
    /// A record was removed.
    Deleted,
    /// Several records were saved at once.
    Batch,
    /// No record changed, but a derived column's values did.
    Recomputed,
}

/// Published to store listeners after each successful mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Entity kind of the store.
    pub entity: &'static str,
    /// What happened.
    pub kind: ChangeKind,
    /// Identifiers touched.
    pub ids: Vec<EntityId>,
    /// True if the filter registry was already notified for this change
    /// because an option universe moved.
    pub filters_notified: bool,
}

/// Outcome of [`EntityStore::save_all`].
#[derive(Debug)]
pub struct BatchReport<E> {
    /// Records stored, with their identifiers.
    pub saved: Vec<E>,
    /// Records skipped because a unique key collided.
    pub conflicts: Vec<(E, Error)>,
}

/// The authoritative collection of one entity kind.
pub struct EntityStore<E: Record> {
    backend: RefCell<Box<dyn Backend<E>>>,
    registry: Rc<FilterRegistry>,
    bindings: Vec<FilterBinding>,
    derived: Vec<Rc<dyn DerivedColumn<E>>>,
    listeners: Listeners<ChangeEvent>,
}

impl<E: Record> EntityStore<E> {
    /// Creates a store over `backend`, with filters bound to columns.
    pub fn new(
        backend: impl Backend<E> + 'static,
        registry: Rc<FilterRegistry>,
        bindings: Vec<FilterBinding>,
    ) -> Self {
        Self {
            backend: RefCell::new(Box::new(backend)),
            registry,
            bindings,
            derived: Vec::new(),
            listeners: Listeners::new(),
        }
    }

    /// Adds a computed column that sorts and filters can name.
    #[must_use]
    pub fn with_derived_column(mut self, column: Rc<dyn DerivedColumn<E>>) -> Self {
        tracing::debug!(entity = E::KIND, column = column.column(), "derived column added");
        self.derived.push(column);
        self
    }

    /// Creates a store over an empty [`MemoryBackend`].
    pub fn in_memory(registry: Rc<FilterRegistry>, bindings: Vec<FilterBinding>) -> Self {
        Self::new(MemoryBackend::new(), registry, bindings)
    }

    /// The filter registry this store reads selections from.
    #[must_use]
    pub fn registry(&self) -> &Rc<FilterRegistry> {
        &self.registry
    }

    /// The filters bound to this store's columns.
    #[must_use]
    pub fn bindings(&self) -> &[FilterBinding] {
        &self.bindings
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Inserts a memory-only record, or updates a stored one by identifier.
    ///
    /// Returns the stored record.
    ///
    /// # Errors
    ///
    /// Fails with a uniqueness conflict if a unique key collides, or a storage
    /// failure if the backend is unreachable. Nothing is stored or published.
    pub fn save(&self, record: E) -> Result<E> {
        let id = record.id();
        let stored = {
            let mut backend = self.backend.borrow_mut();
            if record.is_memory_only() {
                backend.insert(record).map(|saved| (saved, ChangeKind::Inserted))
            } else {
                backend.update(record).map(|saved| (saved, ChangeKind::Updated))
            }
        };
        let (saved, kind) = stored.map_err(|err| err.with_context(Self::context("save", id)))?;
        tracing::debug!(entity = E::KIND, id = ?saved.id(), ?kind, "saved");
        self.publish(kind, saved.id().into_iter().collect());
        Ok(saved)
    }

    /// Saves several records, skipping those whose unique keys collide.
    ///
    /// Memory-only records are inserted and stored ones updated. Listeners
    /// are notified once for the whole batch.
    ///
    /// # Errors
    ///
    /// A storage failure stops the batch. Records stored before it remain
    /// stored and are published.
    pub fn save_all(&self, records: impl IntoIterator<Item = E>) -> Result<BatchReport<E>> {
        let mut report = BatchReport {
            saved: Vec::new(),
            conflicts: Vec::new(),
        };
        let mut failure = None;
        {
            let mut backend = self.backend.borrow_mut();
            for record in records {
                let stored = if record.is_memory_only() {
                    backend.insert(record.clone())
                } else {
                    backend.update(record.clone())
                };
                match stored {
                    Ok(saved) => report.saved.push(saved),
                    Err(err) if err.is_uniqueness_conflict() => {
                        tracing::debug!(entity = E::KIND, error = %err, "skipped in batch");
                        report.conflicts.push((record, err));
                    }
                    Err(err) => {
                        failure = Some(err);
                        break;
                    }
                }
            }
        }

        if !report.saved.is_empty() {
            tracing::debug!(
                entity = E::KIND,
                saved = report.saved.len(),
                skipped = report.conflicts.len(),
                "batch saved"
            );
            let ids = report.saved.iter().filter_map(Record::id).collect();
            self.publish(ChangeKind::Batch, ids);
        }
        match failure {
            Some(err) => Err(err.with_context(Self::context("batch save", None))),
            None => Ok(report),
        }
    }

    /// Removes a record, returning it.
    ///
    /// # Errors
    ///
    /// Fails if the record is unknown or the backend is unreachable.
    pub fn delete(&self, id: EntityId) -> Result<E> {
        let removed = self
            .backend
            .borrow_mut()
            .delete(id)
            .map_err(|err| err.with_context(Self::context("delete", Some(id))))?;
        tracing::debug!(entity = E::KIND, %id, "deleted");
        self.publish(ChangeKind::Deleted, vec![id]);
        Ok(removed)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Fetches one record.
    ///
    /// # Errors
    ///
    /// Fails if the backend is unreachable.
    pub fn get_by_id(&self, id: EntityId) -> Result<Option<E>> {
        self.backend.borrow().get(id)
    }

    /// Fetches a record by its secondary key.
    ///
    /// # Errors
    ///
    /// Fails if the backend is unreachable.
    pub fn get_by_natural_key(&self, key: &E::Key) -> Result<Option<E>> {
        self.backend.borrow().find(key)
    }

    /// Fetches every record, unfiltered.
    ///
    /// # Errors
    ///
    /// Fails if the backend is unreachable.
    pub fn get_all(&self) -> Result<Vec<E>> {
        self.backend.borrow().all()
    }

    /// Number of stored records, unfiltered.
    ///
    /// # Errors
    ///
    /// Fails if the backend is unreachable.
    pub fn len(&self) -> Result<usize> {
        self.backend.borrow().len()
    }

    /// Returns true if nothing is stored.
    ///
    /// # Errors
    ///
    /// Fails if the backend is unreachable.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Up to `limit` records from `offset`, in `sort` order, meeting every
    /// active filter bound to this store.
    ///
    /// Sorting or filtering on a derived column computes it over the whole
    /// collection.
    ///
    /// # Errors
    ///
    /// Fails on an unknown sort column or if the backend is unreachable.
    pub fn get_page(&self, sort: Option<&SortOrder>, limit: usize, offset: usize) -> Result<Vec<E>> {
        self.get_sorted_filtered_entities(sort, limit, offset, &[])
    }

    /// Like [`EntityStore::get_page`] with additional caller predicates.
    ///
    /// # Errors
    ///
    /// Fails on an unknown column or if the backend is unreachable.
    pub fn get_sorted_filtered_entities(
        &self,
        sort: Option<&SortOrder>,
        limit: usize,
        offset: usize,
        extra: &[Predicate],
    ) -> Result<Vec<E>> {
        let query = PageQuery::new(limit, offset)
            .with_sort(sort.cloned())
            .with_predicates(self.registry.predicates(&self.bindings))
            .with_predicates(extra.iter().cloned());
        let derived: Vec<&dyn DerivedColumn<E>> = self
            .derived
            .iter()
            .map(|d| &**d)
            .filter(|d| query.touches(d.column()))
            .collect();
        let rows = if derived.is_empty() {
            self.backend.borrow().query(&query)
        } else {
            self.query_derived(&query, &derived)
        }
        .map_err(|err| err.with_context(Self::context("page", None)));
        match &rows {
            Ok(rows) => tracing::debug!(
                entity = E::KIND,
                limit,
                offset,
                predicates = query.predicates.len(),
                returned = rows.len(),
                "page fetched"
            ),
            Err(err) => tracing::warn!(entity = E::KIND, error = %err, "page fetch failed"),
        }
        rows
    }

    fn query_derived(&self, query: &PageQuery, derived: &[&dyn DerivedColumn<E>]) -> Result<Vec<E>> {
        let records = self.backend.borrow().all()?;
        let mut computed: BTreeMap<EntityId, Vec<Value>> = BTreeMap::new();
        for column in derived {
            let values = column.evaluate(&records)?;
            if values.len() != records.len() {
                return Err(Error::internal(format!(
                    "derived column '{}' returned {} values for {} records",
                    column.column(),
                    values.len(),
                    records.len()
                )));
            }
            for (record, value) in records.iter().zip(values) {
                if let Some(id) = record.id() {
                    computed.entry(id).or_default().push(value);
                }
            }
        }

        let names: Vec<&str> = derived.iter().map(|d| d.column()).collect();
        query.apply_with(&records, &names, |record, column| {
            match names.iter().position(|name| *name == column) {
                Some(i) => record
                    .id()
                    .and_then(|id| computed.get(&id))
                    .and_then(|values| values.get(i))
                    .cloned()
                    .unwrap_or(Value::Null),
                None => record.value(column),
            }
        })
    }

    /// Counts records whose `column` equals `value`, unfiltered.
    ///
    /// # Errors
    ///
    /// Fails on an unknown column or if the backend is unreachable.
    pub fn count_eq(&self, column: &str, value: &Value) -> Result<usize> {
        self.backend.borrow().count_eq(column, value)
    }

    // =========================================================================
    // Listeners and universes
    // =========================================================================

    /// Registers a data-change listener.
    pub fn register_listener<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&ChangeEvent) -> Result<()> + 'static,
    {
        self.listeners.register(callback)
    }

    /// Unregisters a data-change listener. Returns false if it was not registered.
    pub fn unregister_listener(&self, id: ListenerId) -> bool {
        self.listeners.unregister(id)
    }

    /// Number of registered data-change listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Drops every data-change listener.
    pub fn clear_listeners(&self) {
        self.listeners.clear();
    }

    /// Recomputes the option universes of bound multi-select filters.
    ///
    /// Notifies the registry once if any universe changed and returns whether
    /// one did.
    ///
    /// # Errors
    ///
    /// Fails if the backend is unreachable; no universe changes.
    pub fn refresh_universes(&self) -> Result<bool> {
        let updates = {
            let backend = self.backend.borrow();
            self.bindings
                .iter()
                .filter(|b| !b.key.is_range())
                .map(|b| backend.distinct(b.column).map(|values| (b.key, values)))
                .collect::<Result<Vec<_>>>()?
        };
        let changed = self.registry.sync_universes(updates);
        if changed {
            self.registry.notify_all();
        }
        Ok(changed)
    }

    /// Tells listeners that a derived column changed although no record of
    /// this store did.
    pub fn publish_derived_change(&self) {
        tracing::debug!(entity = E::KIND, "derived columns recomputed");
        self.publish(ChangeKind::Recomputed, Vec::new());
    }

    fn publish(&self, kind: ChangeKind, ids: Vec<EntityId>) {
        let filters_notified = self.refresh_universes().unwrap_or_else(|err| {
            tracing::warn!(entity = E::KIND, error = %err, "filter options not refreshed");
            false
        });
        let event = ChangeEvent {
            entity: E::KIND,
            kind,
            ids,
            filters_notified,
        };
        self.listeners.dispatch(&event);
    }

    fn context(operation: &str, id: Option<EntityId>) -> ErrorContext {
        let context = ErrorContext::new()
            .with_operation(operation)
            .with_entity(E::KIND);
        match id {
            Some(id) => context.with_id(id),
            None => context,
        }
    }
}

impl<E: Record> fmt::Debug for EntityStore<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStore")
            .field("kind", &E::KIND)
            .field("bindings", &self.bindings)
            .field("derived", &self.derived.len())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
