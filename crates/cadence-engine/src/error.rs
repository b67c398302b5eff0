//! Error types for engine operations.

use thiserror::Error;

/// Errors surfaced by expansion, materialization, and series resolution.
///
/// The first five variants are input-validation failures detected before any
/// write is attempted; the caller can correct the request and retry freely.
/// `BatchWriteFailed` guarantees no partial persistence, so retrying the
/// whole request is always safe.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The time zone name is not a resolvable IANA identifier.
    #[error("invalid time zone: {0}")]
    InvalidZone(String),

    /// A wall-clock time string could not be parsed into hour/minute.
    #[error("invalid time of day: {0}")]
    InvalidTimeOfDay(String),

    /// The weekday set contains no usable weekday (0..=6, Sunday=0).
    #[error("weekday set is empty")]
    EmptyWeekdaySet,

    /// The recurrence end bound precedes the start bound after horizon
    /// adjustment.
    #[error("recurrence end {end} precedes start {start}")]
    InvertedHorizon {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    /// A kind-specific entry point received the wrong or an incomplete
    /// payload (e.g., a booking with no client reference).
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The generated recurrence rule text failed to parse. The engine only
    /// builds rules from validated inputs, so this indicates a bug rather
    /// than bad caller input.
    #[error("recurrence rule error: {0}")]
    InvalidRule(String),

    /// The store rejected the batched write/delete. Nothing was persisted.
    #[error("batch write failed: {0}")]
    BatchWriteFailed(String),

    /// The target record does not exist.
    #[error("event not found: {0}")]
    NotFound(String),
}

/// Convenience alias used throughout cadence-engine.
pub type Result<T> = std::result::Result<T, EngineError>;
