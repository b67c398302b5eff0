//! EventStore -- the engine's only external collaborator.
//!
//! The engine treats the document store as a batched write sink and a
//! query-by-field source, nothing more. The load-bearing part of the
//! contract is atomicity: a batch write or delete lands whole or not at
//! all, so readers never observe a half-materialized or half-deleted
//! series. Stores that cannot fit a batch must reject it outright rather
//! than split it.

use crate::error::{EngineError, Result};
use crate::event::{EventId, EventRecord};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Maximum documents per atomic batch. An oversized batch fails whole with
/// `BatchWriteFailed`; splitting it silently would reintroduce the
/// partial-visibility hazard the contract exists to prevent.
pub const MAX_BATCH_SIZE: usize = 500;

/// Batched document store the engine writes series into.
///
/// Implementations must be safe to share across threads; the engine itself
/// is stateless and materializations for different series may run in
/// parallel.
pub trait EventStore: Send + Sync {
    /// Allocate a fresh record id. Ids are opaque and usable before any
    /// write -- the materializer pre-allocates every instance id so the
    /// whole series lands in one batch.
    fn allocate_id(&self) -> EventId;

    /// Fetch one record by id.
    fn get(&self, id: &EventId) -> Result<Option<EventRecord>>;

    /// Equality query: all records in `owner`'s collection whose
    /// `original_event_id` equals `original_id`.
    fn find_by_original(&self, owner: &str, original_id: &EventId) -> Result<Vec<EventRecord>>;

    /// Atomically persist every record or none of them.
    ///
    /// # Errors
    /// `EngineError::BatchWriteFailed` on rejection (e.g., batch too
    /// large), with the guarantee that nothing was persisted.
    fn write_batch(&self, records: Vec<EventRecord>) -> Result<()>;

    /// Atomically delete every id or none of them. Ids that do not exist
    /// are skipped rather than failing the batch; returns the number of
    /// records actually removed.
    fn delete_batch(&self, ids: &[EventId]) -> Result<usize>;
}

/// In-memory `EventStore` used by unit tests and the CLI's file-backed
/// snapshot. Atomicity is trivial under the single mutex: every batch
/// validates first and mutates second.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<EventId, EventRecord>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from previously persisted records, e.g., a file
    /// snapshot. The id counter resumes past any numeric suffix already in
    /// use so re-allocated ids never collide.
    pub fn from_records(records: Vec<EventRecord>) -> Self {
        let max_seen = records
            .iter()
            .filter_map(|r| r.id.strip_prefix("evt-"))
            .filter_map(|n| n.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        let map = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        Self {
            records: Mutex::new(map),
            next_id: AtomicU64::new(max_seen),
        }
    }

    /// Snapshot every record, sorted by start instant then id for stable
    /// output.
    pub fn dump(&self) -> Vec<EventRecord> {
        let guard = self.records.lock().expect("store mutex poisoned");
        let mut all: Vec<EventRecord> = guard.values().cloned().collect();
        all.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        all
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("store mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventStore for MemoryStore {
    fn allocate_id(&self) -> EventId {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        format!("evt-{}", n)
    }

    fn get(&self, id: &EventId) -> Result<Option<EventRecord>> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_by_original(&self, owner: &str, original_id: &EventId) -> Result<Vec<EventRecord>> {
        let guard = self.records.lock().expect("store mutex poisoned");
        let mut hits: Vec<EventRecord> = guard
            .values()
            .filter(|r| {
                r.owner_id == owner && r.original_event_id.as_ref() == Some(original_id)
            })
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.start.cmp(&b.start));
        Ok(hits)
    }

    fn write_batch(&self, records: Vec<EventRecord>) -> Result<()> {
        if records.len() > MAX_BATCH_SIZE {
            return Err(EngineError::BatchWriteFailed(format!(
                "batch of {} exceeds the {}-document limit",
                records.len(),
                MAX_BATCH_SIZE
            )));
        }
        let mut guard = self.records.lock().expect("store mutex poisoned");
        for record in records {
            guard.insert(record.id.clone(), record);
        }
        Ok(())
    }

    fn delete_batch(&self, ids: &[EventId]) -> Result<usize> {
        if ids.len() > MAX_BATCH_SIZE {
            return Err(EngineError::BatchWriteFailed(format!(
                "batch of {} exceeds the {}-document limit",
                ids.len(),
                MAX_BATCH_SIZE
            )));
        }
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let mut removed = 0;
        for id in ids {
            if guard.remove(id).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
