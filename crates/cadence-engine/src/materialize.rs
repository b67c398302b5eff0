//! Instance materialization -- orchestrates expansion into one atomic
//! batch of persistable records: the series original plus every
//! non-duplicate instance.
//!
//! All computation up to the final batch write is pure and in-memory; the
//! store is touched exactly once, so a failed materialization leaves no
//! trace and a retry is always safe.

use crate::clock;
use crate::error::{EngineError, Result};
use crate::event::{EventId, EventRecord, Payload, RecurrenceMeta, RecurrenceRequest};
use crate::expand;
use crate::store::EventStore;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::collections::BTreeMap;

/// Result of a successful materialization.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MaterializeOutcome {
    /// Id of the created series original.
    pub original_id: EventId,
    /// Number of instance records created, excluding the original.
    pub instances: usize,
}

/// Expand a recurrence request and persist the whole series in one batch.
///
/// The caller-supplied anchor is aligned forward onto an allowed weekday;
/// the original record is built from the aligned anchor; every other
/// occurrence becomes an instance pointing back at the original. An
/// occurrence whose start instant equals the original's *is* the original
/// and is skipped, never duplicated.
///
/// # Errors
/// Propagates `InvalidZone`, `InvalidTimeOfDay`, `EmptyWeekdaySet`, and
/// `InvertedHorizon` unchanged from the resolution/expansion steps, before
/// any write. `InvalidPayload` if the wall-clock window is empty or
/// inverted. `BatchWriteFailed` if the store rejects the batch; nothing is
/// persisted in that case.
pub fn materialize<S: EventStore + ?Sized>(
    store: &S,
    owner: &str,
    request: &RecurrenceRequest,
) -> Result<MaterializeOutcome> {
    let zone = clock::resolve_zone(&request.time_zone)?;
    let start_time = clock::parse_time_of_day(&request.start_time)?;
    let end_time = clock::parse_time_of_day(&request.end_time)?;
    if end_time <= start_time {
        return Err(EngineError::InvalidPayload(
            "end time must be after start time".to_string(),
        ));
    }

    let expansion = expand::expand(
        request.anchor_date,
        &request.days_of_week,
        request.recurrence_start,
        request.recurrence_end,
        zone,
    )?;

    let original_id = store.allocate_id();
    let (original_start, original_end) =
        clock::resolve_window(expansion.aligned_anchor, start_time, end_time, zone);

    let mut instances: Vec<EventRecord> = Vec::with_capacity(expansion.dates.len());
    let mut instance_index: BTreeMap<i64, EventId> = BTreeMap::new();

    for date in &expansion.dates {
        let (start, end) = clock::resolve_window(*date, start_time, end_time, zone);
        // The anchor occurrence is represented by the original itself.
        if start == original_start {
            continue;
        }
        let id = store.allocate_id();
        instance_index.insert(start.timestamp(), id.clone());
        instances.push(build_record(
            id,
            owner,
            request,
            zone,
            start,
            end,
            Some(original_id.clone()),
            None,
            None,
        ));
    }

    let meta = RecurrenceMeta {
        days_of_week: request.days_of_week.clone(),
        recurrence_start: request.recurrence_start,
        recurrence_end: request.recurrence_end,
        time_zone: request.time_zone.clone(),
        rule: expansion.rule.clone(),
    };
    let original = build_record(
        original_id.clone(),
        owner,
        request,
        zone,
        original_start,
        original_end,
        None,
        Some(meta),
        Some(instance_index),
    );

    let instance_count = instances.len();
    let mut batch = Vec::with_capacity(instance_count + 1);
    batch.push(original);
    batch.extend(instances);
    store.write_batch(batch)?;

    log::info!(
        "materialized {} series {} with {} instances for owner {}",
        request.payload.kind_name(),
        original_id,
        instance_count,
        owner
    );

    Ok(MaterializeOutcome {
        original_id,
        instances: instance_count,
    })
}

/// Entry point for the availability form. The payload must be
/// `Payload::Availability`; the materialization core itself is
/// kind-agnostic.
pub fn create_availability<S: EventStore + ?Sized>(
    store: &S,
    owner: &str,
    request: &RecurrenceRequest,
) -> Result<MaterializeOutcome> {
    if request.payload.is_booking() {
        return Err(EngineError::InvalidPayload(
            "availability entry point received a booking payload".to_string(),
        ));
    }
    materialize(store, owner, request)
}

/// Entry point for the booking form. Requires a non-empty client reference
/// and a non-negative fee.
pub fn create_booking<S: EventStore + ?Sized>(
    store: &S,
    owner: &str,
    request: &RecurrenceRequest,
) -> Result<MaterializeOutcome> {
    match &request.payload {
        Payload::Booking {
            client_id,
            fee_cents,
        } => {
            if client_id.trim().is_empty() {
                return Err(EngineError::InvalidPayload(
                    "booking requires a client reference".to_string(),
                ));
            }
            if *fee_cents < 0 {
                return Err(EngineError::InvalidPayload(
                    "booking fee must not be negative".to_string(),
                ));
            }
        }
        Payload::Availability => {
            return Err(EngineError::InvalidPayload(
                "booking entry point received an availability payload".to_string(),
            ));
        }
    }
    materialize(store, owner, request)
}

/// Expand a request without touching the store. Used by the read-only
/// `expand` surface and by overlap pre-checks that want candidate records
/// before anything is written.
pub fn dry_run(owner: &str, request: &RecurrenceRequest) -> Result<Vec<EventRecord>> {
    let zone = clock::resolve_zone(&request.time_zone)?;
    let start_time = clock::parse_time_of_day(&request.start_time)?;
    let end_time = clock::parse_time_of_day(&request.end_time)?;
    if end_time <= start_time {
        return Err(EngineError::InvalidPayload(
            "end time must be after start time".to_string(),
        ));
    }

    let expansion = expand::expand(
        request.anchor_date,
        &request.days_of_week,
        request.recurrence_start,
        request.recurrence_end,
        zone,
    )?;

    let mut records = Vec::with_capacity(expansion.dates.len() + 1);
    for date in occurrence_dates(&expansion.aligned_anchor, &expansion.dates) {
        let (start, end) = clock::resolve_window(date, start_time, end_time, zone);
        records.push(build_record(
            String::new(),
            owner,
            request,
            zone,
            start,
            end,
            None,
            None,
            None,
        ));
    }
    Ok(records)
}

/// The aligned anchor followed by every expanded date, without repeating
/// the anchor itself.
fn occurrence_dates(aligned_anchor: &NaiveDate, dates: &[NaiveDate]) -> Vec<NaiveDate> {
    let mut all = Vec::with_capacity(dates.len() + 1);
    all.push(*aligned_anchor);
    for d in dates {
        if d != aligned_anchor {
            all.push(*d);
        }
    }
    all
}

#[allow(clippy::too_many_arguments)]
fn build_record(
    id: EventId,
    owner: &str,
    request: &RecurrenceRequest,
    zone: Tz,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    original_event_id: Option<EventId>,
    recurrence: Option<RecurrenceMeta>,
    instance_index: Option<BTreeMap<i64, EventId>>,
) -> EventRecord {
    let is_instance = original_event_id.is_some();
    EventRecord {
        id,
        owner_id: owner.to_string(),
        title: request.title.clone(),
        description: request.description.clone(),
        payload: request.payload.clone(),
        start,
        end,
        start_weekday: clock::weekday_name(clock::weekday_in_zone(start, zone)).to_string(),
        end_weekday: clock::weekday_name(clock::weekday_in_zone(end, zone)).to_string(),
        time_zone: request.time_zone.clone(),
        is_instance,
        original_event_id,
        recurrence,
        instance_index,
    }
}
