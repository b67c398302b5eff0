//! Detect time overlaps between a candidate record list and existing
//! records.
//!
//! Advisory only: the materialization write path never reads the store, so
//! overlap checks run as a separate step before or after a write, never
//! inside one. Adjacent records (one ends exactly when the other starts)
//! are NOT overlaps.

use crate::event::EventRecord;

/// A detected overlap between a candidate and an existing record.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlap {
    pub candidate_id: String,
    pub existing_id: String,
    pub overlap_minutes: i64,
}

/// Find all pairwise overlaps between `candidates` and `existing`.
///
/// Two records overlap when `a.start < b.end && b.start < a.end`; the
/// overlap duration is `min(a.end, b.end) - max(a.start, b.start)`. The
/// bounded series sizes here (human schedules) make the pairwise scan
/// cheap enough that no sweep structure is warranted.
pub fn find_overlaps(candidates: &[EventRecord], existing: &[EventRecord]) -> Vec<Overlap> {
    let mut overlaps = Vec::new();

    for candidate in candidates {
        for record in existing {
            // Strict inequalities exclude the adjacent case.
            if candidate.start < record.end && record.start < candidate.end {
                let overlap_start = candidate.start.max(record.start);
                let overlap_end = candidate.end.min(record.end);
                overlaps.push(Overlap {
                    candidate_id: candidate.id.clone(),
                    existing_id: record.id.clone(),
                    overlap_minutes: (overlap_end - overlap_start).num_minutes(),
                });
            }
        }
    }

    overlaps
}
