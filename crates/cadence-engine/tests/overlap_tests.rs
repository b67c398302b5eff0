//! Tests for advisory overlap detection between candidate and existing
//! records.

use cadence_engine::{dry_run, find_overlaps, materialize, MemoryStore, Payload, RecurrenceRequest};
use chrono::NaiveDate;
use std::collections::BTreeSet;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn request(start_time: &str, end_time: &str) -> RecurrenceRequest {
    RecurrenceRequest {
        title: "session".to_string(),
        description: String::new(),
        anchor_date: date(2026, 3, 4),
        start_time: start_time.to_string(),
        end_time: end_time.to_string(),
        days_of_week: BTreeSet::from([3]),
        recurrence_start: date(2026, 3, 4),
        recurrence_end: date(2026, 3, 18),
        time_zone: "UTC".to_string(),
        payload: Payload::Availability,
    }
}

#[test]
fn overlapping_series_are_reported_with_minutes() {
    let store = MemoryStore::new();
    materialize(&store, "coach-1", &request("09:00", "10:00")).unwrap();

    // Same Wednesdays, half-hour collision from 09:30.
    let candidates = dry_run("coach-1", &request("09:30", "10:30")).unwrap();
    let overlaps = find_overlaps(&candidates, &store.dump());

    // Three Wednesdays in the window, each colliding once.
    assert_eq!(overlaps.len(), 3);
    for overlap in &overlaps {
        assert_eq!(overlap.overlap_minutes, 30);
    }
}

#[test]
fn adjacent_series_do_not_overlap() {
    let store = MemoryStore::new();
    materialize(&store, "coach-1", &request("09:00", "10:00")).unwrap();

    // Back-to-back: starts exactly when the existing records end.
    let candidates = dry_run("coach-1", &request("10:00", "11:00")).unwrap();
    assert!(find_overlaps(&candidates, &store.dump()).is_empty());
}

#[test]
fn disjoint_series_do_not_overlap() {
    let store = MemoryStore::new();
    materialize(&store, "coach-1", &request("09:00", "10:00")).unwrap();

    let candidates = dry_run("coach-1", &request("14:00", "15:00")).unwrap();
    assert!(find_overlaps(&candidates, &store.dump()).is_empty());
}
