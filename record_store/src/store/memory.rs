//! In-memory record store backed by an ordered vector.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::RecordStore;
use crate::error::StoreError;
use crate::record::{Record, RecordId};

/// Record store that keeps records in insertion order.
///
/// Snapshots are a plain JSON array of records, the shape a host hands over
/// when it passes its record collection in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryRecordStore {
    records: Vec<Record>,
}

impl MemoryRecordStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given records in order.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        Self {
            records: records.into_iter().collect(),
        }
    }

    /// Restore a store from a JSON snapshot.
    pub fn from_json(snapshot: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(snapshot)?)
    }

    /// Restore a store from a JSON snapshot, falling back to an empty store
    /// when the snapshot is absent or malformed.
    pub fn from_json_or_default(snapshot: Option<&str>) -> Self {
        match snapshot.map(Self::from_json) {
            Some(Ok(store)) => store,
            Some(Err(err)) => {
                warn!(error = %err, "malformed record snapshot, starting with an empty store");
                Self::default()
            }
            None => Self::default(),
        }
    }

    /// Serialize the store to a JSON snapshot.
    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn position(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }
}

impl RecordStore for MemoryRecordStore {
    fn find(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    fn find_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    fn add(&mut self, record: Record) -> RecordId {
        let id = record.id;
        self.records.push(record);
        id
    }

    fn remove(&mut self, id: RecordId) -> Option<Record> {
        self.position(id).map(|index| self.records.remove(index))
    }

    fn all(&self) -> Vec<&Record> {
        self.records.iter().collect()
    }

    fn move_to_front(&mut self, id: RecordId) -> bool {
        match self.position(id) {
            Some(index) => {
                let record = self.records.remove(index);
                self.records.insert(0, record);
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
