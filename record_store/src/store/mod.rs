//! Record repository - the shared, ordered collection of all records.

mod memory;

pub use memory::*;

use crate::error::StoreError;
use crate::record::{Record, RecordId};

/// Repository of records.
///
/// Iteration order (`all`) is the store order: components that pick "the
/// first match" rely on it being stable between calls.
pub trait RecordStore {
    /// Get a record by handle.
    fn find(&self, id: RecordId) -> Option<&Record>;

    /// Get a mutable record by handle.
    fn find_mut(&mut self, id: RecordId) -> Option<&mut Record>;

    /// Append a record to the end of the store.
    fn add(&mut self, record: Record) -> RecordId;

    /// Remove a record, returning it if it existed.
    fn remove(&mut self, id: RecordId) -> Option<Record>;

    /// All records in store order.
    fn all(&self) -> Vec<&Record>;

    /// Move a record to the front of the store. Returns false if absent.
    fn move_to_front(&mut self, id: RecordId) -> bool;

    /// First record with exactly this title.
    fn find_by_title(&self, title: &str) -> Option<&Record> {
        self.all().into_iter().find(|r| r.title == title)
    }

    /// Get a record or fail with [`StoreError::NotFound`].
    fn get(&self, id: RecordId) -> Result<&Record, StoreError> {
        self.find(id).ok_or(StoreError::NotFound(id))
    }

    /// Get a mutable record or fail with [`StoreError::NotFound`].
    fn get_mut(&mut self, id: RecordId) -> Result<&mut Record, StoreError> {
        self.find_mut(id).ok_or(StoreError::NotFound(id))
    }

    /// Handles of all records in store order.
    fn ids(&self) -> Vec<RecordId> {
        self.all().iter().map(|r| r.id).collect()
    }

    /// Number of records.
    fn len(&self) -> usize {
        self.all().len()
    }

    /// Whether the store holds no records.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
