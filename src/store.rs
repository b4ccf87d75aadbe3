//! EntryStore: the owning container for `Entry` records.
//!
//! Ids are assigned sequentially at creation and never reused. Listing is
//! insertion-ordered. All operations are atomic per entry; the store takes
//! its own lock per call so a shared reference can serve parallel
//! resolutions without the caller holding anything across an attempt.
use std::collections::HashMap;
use std::sync::RwLock;

use crate::entry::{Entry, EntryError};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("entry {0} not found")]
    NotFound(u64),
    #[error("invalid entry: {0}")]
    Invalid(#[from] EntryError),
}

#[derive(Debug, Default)]
struct Shelves {
    next_id: u64,
    order: Vec<u64>,
    entries: HashMap<u64, Entry>,
}

#[derive(Debug, Default)]
pub struct EntryStore {
    inner: RwLock<Shelves>,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and insert an entry, returning its assigned id.
    pub fn create(&self, entry: Entry) -> Result<u64, StoreError> {
        entry.validate()?;
        let mut inner = self.inner.write().expect("entry store lock poisoned");
        Ok(Self::insert(&mut inner, entry))
    }

    /// Insert a batch under one lock acquisition. The whole batch is
    /// validated up front so a bad record cannot leave a partial insert.
    pub fn create_batch(&self, entries: Vec<Entry>) -> Result<Vec<u64>, StoreError> {
        for e in &entries {
            e.validate()?;
        }
        let mut inner = self.inner.write().expect("entry store lock poisoned");
        Ok(entries
            .into_iter()
            .map(|e| Self::insert(&mut inner, e))
            .collect())
    }

    fn insert(inner: &mut Shelves, mut entry: Entry) -> u64 {
        inner.next_id += 1;
        let id = inner.next_id;
        entry.id = id;
        inner.order.push(id);
        inner.entries.insert(id, entry);
        id
    }

    pub fn get(&self, id: u64) -> Result<Entry, StoreError> {
        let inner = self.inner.read().expect("entry store lock poisoned");
        inner
            .entries
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// Apply a mutation to one entry and return the updated record.
    pub fn update<F>(&self, id: u64, mutate: F) -> Result<Entry, StoreError>
    where
        F: FnOnce(&mut Entry),
    {
        let mut inner = self.inner.write().expect("entry store lock poisoned");
        let entry = inner.entries.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        mutate(entry);
        // the id is the map key; a mutation cannot move an entry
        entry.id = id;
        Ok(entry.clone())
    }

    pub fn delete(&self, id: u64) -> Result<(), StoreError> {
        let mut inner = self.inner.write().expect("entry store lock poisoned");
        if inner.entries.remove(&id).is_none() {
            return Err(StoreError::NotFound(id));
        }
        inner.order.retain(|&other| other != id);
        Ok(())
    }

    /// Snapshot of all entries in insertion order.
    pub fn list(&self) -> Vec<Entry> {
        let inner = self.inner.read().expect("entry store lock poisoned");
        inner
            .order
            .iter()
            .filter_map(|id| inner.entries.get(id))
            .cloned()
            .collect()
    }

    /// One page of entries, 1-based. Pages past the end are empty.
    pub fn list_page(&self, page: usize, per_page: usize) -> Vec<Entry> {
        let offset = page.saturating_sub(1).saturating_mul(per_page);
        let inner = self.inner.read().expect("entry store lock poisoned");
        inner
            .order
            .iter()
            .skip(offset)
            .take(per_page)
            .filter_map(|id| inner.entries.get(id))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .expect("entry store lock poisoned")
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
