//! Series resolution -- maps any single record id back to the full member
//! set of its series, and applies cascade deletes across that set.
//!
//! Resolution relies only on the persisted back-reference
//! (`original_event_id` on instances); no expansion logic runs here. When
//! the back-reference cannot be followed -- an original deleted
//! out-of-band leaving orphans -- resolution degrades to the single queried
//! record rather than failing, so cascade-delete still makes forward
//! progress on the record the user actually clicked.

use crate::error::{EngineError, Result};
use crate::event::{EventId, EventRecord};
use crate::store::EventStore;

/// All members of the series containing `id`: the original plus every
/// instance, regardless of which member was queried.
///
/// # Errors
/// `EngineError::NotFound` if `id` does not exist at all. An unresolvable
/// back-reference is *not* an error; see the module docs.
pub fn members_of<S: EventStore + ?Sized>(store: &S, id: &EventId) -> Result<Vec<EventRecord>> {
    let record = store
        .get(id)?
        .ok_or_else(|| EngineError::NotFound(id.clone()))?;

    if !record.is_instance {
        // Queried the original: it plus everything pointing back at it.
        let mut members = vec![record.clone()];
        members.extend(store.find_by_original(&record.owner_id, id)?);
        return Ok(members);
    }

    let original_id = match &record.original_event_id {
        Some(original_id) => original_id.clone(),
        None => {
            // Malformed instance with no back-reference. Degrade to the
            // singleton so the caller can still act on it.
            log::warn!("instance {} has no original back-reference", id);
            return Ok(vec![record]);
        }
    };

    match store.get(&original_id)? {
        Some(original) => {
            let mut members = vec![original];
            members.extend(store.find_by_original(&record.owner_id, &original_id)?);
            Ok(members)
        }
        None => {
            // Orphaned instance: the original was deleted out-of-band.
            log::warn!(
                "original {} for instance {} is gone; resolving as singleton",
                original_id,
                id
            );
            Ok(vec![record])
        }
    }
}

/// Resolve the series containing `id` and delete every member in one
/// atomic batch. Returns the number of records removed.
///
/// # Errors
/// `EngineError::NotFound` if `id` does not exist; `BatchWriteFailed` on
/// store rejection, with no partial deletion.
pub fn delete_series<S: EventStore + ?Sized>(store: &S, id: &EventId) -> Result<usize> {
    let members = members_of(store, id)?;
    let ids: Vec<EventId> = members.into_iter().map(|r| r.id).collect();
    let removed = store.delete_batch(&ids)?;
    log::info!("deleted series via {}: {} records removed", id, removed);
    Ok(removed)
}

/// Delete exactly one record, independent of series membership. Used when
/// the caller explicitly chose "this occurrence only"; the original and
/// sibling instances are untouched.
///
/// # Errors
/// `EngineError::NotFound` if `id` does not exist.
pub fn delete_single<S: EventStore + ?Sized>(store: &S, id: &EventId) -> Result<()> {
    if store.get(id)?.is_none() {
        return Err(EngineError::NotFound(id.clone()));
    }
    store.delete_batch(std::slice::from_ref(id))?;
    log::info!("deleted single occurrence {}", id);
    Ok(())
}
