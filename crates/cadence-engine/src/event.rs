//! Persisted and wire-level data shapes for recurring events.
//!
//! A *series* is one original record (`is_instance = false`, sole holder of
//! [`RecurrenceMeta`]) plus zero or more instance records that point back at
//! it through `original_event_id`. The two event kinds -- non-blocking
//! availability windows and fee-bearing bookings -- share one record shape
//! and differ only in payload; the expansion and materialization paths are
//! kind-agnostic.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Opaque, store-assigned record identifier.
pub type EventId = String;

/// Kind-specific payload. The serde tag doubles as the persisted `kind`
/// field, so the wire shape carries `"kind": "availability"` or
/// `"kind": "booking"` alongside the variant's own fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    /// A non-blocking availability window. Carries no extra fields.
    Availability,
    /// A fee-bearing booking tied to a specific client.
    Booking {
        /// Opaque reference to the booked client.
        client_id: String,
        /// Session fee in cents. Fixed for the whole series.
        fee_cents: i64,
    },
}

impl Payload {
    /// Human-readable kind name, matching the serde tag.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Payload::Availability => "availability",
            Payload::Booking { .. } => "booking",
        }
    }

    pub fn is_booking(&self) -> bool {
        matches!(self, Payload::Booking { .. })
    }
}

/// Inbound request to create a recurring series. Not persisted -- this is
/// the JSON wire shape posted by the booking and availability forms, with
/// simple fields already validated by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrenceRequest {
    /// Display title. Opaque to the engine.
    pub title: String,
    /// Display description. Opaque to the engine.
    #[serde(default)]
    pub description: String,
    /// Preferred first occurrence date, subject to forward alignment onto
    /// an allowed weekday.
    pub anchor_date: NaiveDate,
    /// Wall-clock start time, "HH:MM" or "HH:MM:SS", no date.
    pub start_time: String,
    /// Wall-clock end time, same formats as `start_time`.
    pub end_time: String,
    /// Allowed weekdays, Sunday=0 through Saturday=6.
    pub days_of_week: BTreeSet<u8>,
    /// First calendar date of the recurrence window.
    pub recurrence_start: NaiveDate,
    /// Last calendar date of the recurrence window, inclusive.
    pub recurrence_end: NaiveDate,
    /// IANA zone name the wall-clock times are expressed in.
    pub time_zone: String,
    /// Kind tag plus kind-specific fields, flattened into the payload.
    #[serde(flatten)]
    pub payload: Payload,
}

/// Recurrence metadata, stored only on the original record of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceMeta {
    /// Allowed weekdays, Sunday=0.
    pub days_of_week: BTreeSet<u8>,
    pub recurrence_start: NaiveDate,
    /// Inclusive end bound as supplied by the caller, before horizon
    /// adjustment.
    pub recurrence_end: NaiveDate,
    pub time_zone: String,
    /// Canonical RRULE text the series was expanded from. Audit/debugging
    /// only -- never re-parsed on the read path.
    pub rule: String,
}

/// A persisted event record: either a series original or one instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    /// Owning coach. All queries are scoped to one owner's collection.
    pub owner_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub payload: Payload,
    /// Absolute start instant.
    pub start: DateTime<Utc>,
    /// Absolute end instant. Always strictly after `start`.
    pub end: DateTime<Utc>,
    /// Local weekday of `start` in `time_zone`. Display only, not
    /// authoritative.
    pub start_weekday: String,
    /// Local weekday of `end` in `time_zone`. Display only.
    pub end_weekday: String,
    /// IANA zone the series' wall-clock times are anchored to.
    pub time_zone: String,
    /// False on the series original, true on every generated instance.
    pub is_instance: bool,
    /// Back-reference to the series original. Present iff `is_instance`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_event_id: Option<EventId>,
    /// Present only on the original.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceMeta>,
    /// Start instant (unix seconds) -> instance id, for every generated
    /// instance. Original only. A lookup convenience, not load-bearing for
    /// correctness.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_index: Option<BTreeMap<i64, EventId>>,
}

impl EventRecord {
    /// Duration of this occurrence. Identical across all members of a
    /// series.
    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}
