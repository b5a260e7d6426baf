//! An in-memory backend built on persistent maps.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use im::{OrdMap, OrdSet};
use longhaul_foundation::{EntityId, Error, Result, StorageFault, Value};
use longhaul_model::Record;

use crate::backend::Backend;
use crate::query::PageQuery;

/// Shared handle that injects storage faults into a [`MemoryBackend`].
///
/// Clones control the same backend, so a test can keep a handle after the
/// backend moves into a store.
#[derive(Clone, Debug, Default)]
pub struct FaultSwitch(Rc<RefCell<Option<StorageFault>>>);

impl FaultSwitch {
    /// Makes every call fail with `fault`.
    pub fn fail_with(&self, fault: StorageFault) {
        *self.0.borrow_mut() = Some(fault);
    }

    /// Makes every call fail as unavailable, or restores service.
    pub fn set_offline(&self, offline: bool) {
        *self.0.borrow_mut() = offline.then_some(StorageFault::Unavailable);
    }

    /// Restores service.
    pub fn restore(&self) {
        *self.0.borrow_mut() = None;
    }

    /// Returns true while faults are injected.
    #[must_use]
    pub fn is_failing(&self) -> bool {
        self.0.borrow().is_some()
    }

    fn check(&self) -> Result<()> {
        match &*self.0.borrow() {
            Some(fault) => Err(Error::storage(fault.clone())),
            None => Ok(()),
        }
    }
}

/// Records held in identifier order with a unique key index.
#[derive(Clone)]
pub struct MemoryBackend<E: Record> {
    rows: OrdMap<EntityId, E>,
    unique: OrdMap<(&'static str, Value), EntityId>,
    next_id: EntityId,
    faults: FaultSwitch,
}

impl<E: Record> MemoryBackend<E> {
    /// Creates an empty backend. Identifiers start at 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: OrdMap::new(),
            unique: OrdMap::new(),
            next_id: EntityId::new(1),
            faults: FaultSwitch::default(),
        }
    }

    /// Returns a handle controlling fault injection.
    #[must_use]
    pub fn fault_switch(&self) -> FaultSwitch {
        self.faults.clone()
    }

    /// Makes every call fail as unavailable, or restores service.
    pub fn set_offline(&self, offline: bool) {
        self.faults.set_offline(offline);
    }

    fn check_unique(&self, record: &E, own: Option<EntityId>) -> Result<()> {
        for (field, value) in record.unique_keys() {
            match self.unique.get(&(field, value.clone())) {
                Some(holder) if Some(*holder) != own => {
                    return Err(Error::uniqueness_conflict(E::KIND, field, value.to_string()));
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn index(&mut self, id: EntityId, record: &E) {
        for key in record.unique_keys() {
            self.unique.insert(key, id);
        }
    }

    fn unindex(&mut self, record: &E) {
        for key in record.unique_keys() {
            self.unique.remove(&key);
        }
    }

    fn check_column(column: &str) -> Result<()> {
        if E::has_column(column) {
            Ok(())
        } else {
            Err(Error::unknown_column(E::KIND, column))
        }
    }
}

impl<E: Record> Default for MemoryBackend<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Record> fmt::Debug for MemoryBackend<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("kind", &E::KIND)
            .field("rows", &self.rows.len())
            .field("next_id", &self.next_id)
            .field("faults", &self.faults.is_failing())
            .finish()
    }
}

impl<E: Record> Backend<E> for MemoryBackend<E> {
    fn insert(&mut self, record: E) -> Result<E> {
        self.faults.check()?;
        self.check_unique(&record, None)?;
        let id = self.next_id;
        self.next_id = id.next();
        let record = record.with_id(id);
        self.index(id, &record);
        self.rows.insert(id, record.clone());
        Ok(record)
    }

    fn update(&mut self, record: E) -> Result<E> {
        self.faults.check()?;
        let Some(id) = record.id() else {
            return Err(Error::internal(format!(
                "cannot update a memory-only {}",
                E::KIND
            )));
        };
        let Some(previous) = self.rows.get(&id).cloned() else {
            return Err(Error::not_found(E::KIND, id));
        };
        self.check_unique(&record, Some(id))?;
        self.unindex(&previous);
        self.index(id, &record);
        self.rows.insert(id, record.clone());
        Ok(record)
    }

    fn delete(&mut self, id: EntityId) -> Result<E> {
        self.faults.check()?;
        let record = self
            .rows
            .remove(&id)
            .ok_or_else(|| Error::not_found(E::KIND, id))?;
        self.unindex(&record);
        Ok(record)
    }

    fn get(&self, id: EntityId) -> Result<Option<E>> {
        self.faults.check()?;
        Ok(self.rows.get(&id).cloned())
    }

    fn all(&self) -> Result<Vec<E>> {
        self.faults.check()?;
        Ok(self.rows.values().cloned().collect())
    }

    fn find(&self, key: &E::Key) -> Result<Option<E>> {
        self.faults.check()?;
        Ok(self.rows.values().find(|r| r.matches_key(key)).cloned())
    }

    fn query(&self, query: &PageQuery) -> Result<Vec<E>> {
        self.faults.check()?;
        query.apply(self.rows.values())
    }

    fn count_eq(&self, column: &str, value: &Value) -> Result<usize> {
        self.faults.check()?;
        Self::check_column(column)?;
        Ok(self
            .rows
            .values()
            .filter(|r| r.value(column) == *value)
            .count())
    }

    fn distinct(&self, column: &str) -> Result<OrdSet<Value>> {
        self.faults.check()?;
        Self::check_column(column)?;
        Ok(self
            .rows
            .values()
            .map(|r| r.value(column))
            .filter(|v| !v.is_null())
            .collect())
    }

    fn len(&self) -> Result<usize> {
        self.faults.check()?;
        Ok(self.rows.len())
    }
}
