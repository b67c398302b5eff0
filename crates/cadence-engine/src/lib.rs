//! # cadence-engine
//!
//! Recurring-event materialization engine for coaching schedules.
//!
//! Turns a compact weekly recurrence request (anchor date, wall-clock
//! window, weekday set, horizon, IANA zone) into a persisted *series*: one
//! original record plus dated, timezoned instance records, written in a
//! single atomic batch. The inverse direction resolves any member of a
//! series back to the whole set for cascade edits and deletes.
//!
//! ## Modules
//!
//! - [`clock`] — local date/time + zone → absolute instant, DST-correct
//! - [`expand`] — weekly recurrence rule → ordered occurrence dates
//! - [`materialize`] — request → original + instances, one batch write
//! - [`series`] — any member id → full series; cascade/single delete
//! - [`store`] — the batched document-store contract + in-memory store
//! - [`event`] — wire and persisted data shapes
//! - [`overlap`] — advisory overlap detection between record lists
//! - [`error`] — error types

pub mod clock;
pub mod error;
pub mod event;
pub mod expand;
pub mod materialize;
pub mod overlap;
pub mod series;
pub mod store;

pub use error::{EngineError, Result};
pub use event::{EventId, EventRecord, Payload, RecurrenceMeta, RecurrenceRequest};
pub use expand::{align_anchor, expand, Expansion};
pub use materialize::{
    create_availability, create_booking, dry_run, materialize, MaterializeOutcome,
};
pub use overlap::{find_overlaps, Overlap};
pub use series::{delete_series, delete_single, members_of};
pub use store::{EventStore, MemoryStore, MAX_BATCH_SIZE};
