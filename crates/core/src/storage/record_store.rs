use std::sync::Arc;

use tracing::debug;

use crate::errors::CoreError;
use crate::models::collection::Snapshot;
use crate::models::Record;

/// In-memory holder of the latest snapshot of one collection.
///
/// Every snapshot swaps the whole record set. Records are never patched in
/// place, so a reader holding `shared()` keeps a consistent view.
#[derive(Debug, Clone)]
pub struct RecordStore<T: Record> {
    records: Arc<[T]>,
    revision: u64,
}

impl<T: Record> RecordStore<T> {
    pub fn new() -> Self {
        Self {
            records: Arc::from(Vec::new()),
            revision: 0,
        }
    }

    /// Replace the entire record set with the snapshot's documents.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), CoreError> {
        if snapshot.collection != T::COLLECTION {
            return Err(CoreError::CollectionMismatch {
                expected: T::COLLECTION,
                actual: snapshot.collection,
            });
        }

        let records: Vec<T> = snapshot.documents.iter().map(T::from_document).collect();
        self.records = Arc::from(records);
        self.revision += 1;
        debug!(
            collection = %T::COLLECTION,
            records = self.records.len(),
            revision = self.revision,
            "Applied snapshot"
        );
        Ok(())
    }

    /// Current records in snapshot order.
    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Cheap handle on the current record set.
    pub fn shared(&self) -> Arc<[T]> {
        Arc::clone(&self.records)
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of snapshots applied so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl<T: Record> Default for RecordStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
