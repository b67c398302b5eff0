//! Time resolution -- composes local dates and wall-clock times in a named
//! zone into absolute instants, and reads weekdays back out in-zone.
//!
//! All functions are pure. DST is handled per zone rules on the specific
//! date: an ambiguous local time (fall-back) resolves to the earlier
//! offset, and a time inside a spring-forward gap shifts forward to the
//! first valid wall-clock time.

use crate::error::{EngineError, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Display names for weekday indices, Sunday=0 through Saturday=6.
const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Resolve an IANA zone name (e.g., "America/Los_Angeles").
///
/// # Errors
/// Returns `EngineError::InvalidZone` if the name is not a valid IANA
/// identifier.
pub fn resolve_zone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| EngineError::InvalidZone(name.to_string()))
}

/// Parse a wall-clock time string, "HH:MM" or "HH:MM:SS".
///
/// # Errors
/// Returns `EngineError::InvalidTimeOfDay` if the string cannot be parsed
/// into hour/minute.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| EngineError::InvalidTimeOfDay(raw.to_string()))
}

/// Compose a local date and wall-clock time in `zone` into a UTC instant,
/// using the zone's offset on that specific date.
pub fn to_instant(date: NaiveDate, time: NaiveTime, zone: Tz) -> DateTime<Utc> {
    let mut local = date.and_time(time);

    // Resolve against the zone. Gap times (spring forward) do not exist as
    // local times; walk forward in 15-minute steps until one does. Gaps are
    // at most a few hours in every real zone, so the walk terminates fast.
    loop {
        match zone.from_local_datetime(&local) {
            chrono::LocalResult::Single(dt) => return dt.with_timezone(&Utc),
            chrono::LocalResult::Ambiguous(earlier, _later) => {
                return earlier.with_timezone(&Utc)
            }
            chrono::LocalResult::None => {
                local += chrono::Duration::minutes(15);
            }
        }
    }
}

/// Compose a wall-clock window on `date` into a pair of UTC instants.
///
/// A window lying inside a spring-forward gap would otherwise collapse:
/// both endpoints shift forward to the same first valid instant. When that
/// happens the end is pushed out by the wall-clock width instead, so the
/// window keeps its duration and `start < end` holds for every resolvable
/// window. Callers must pass `start_time < end_time`.
pub fn resolve_window(
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    zone: Tz,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = to_instant(date, start_time, zone);
    let mut end = to_instant(date, end_time, zone);
    if end <= start {
        end = start + (end_time - start_time);
    }
    (start, end)
}

/// Local weekday of an instant as observed in `zone`, Sunday=0.
pub fn weekday_in_zone(instant: DateTime<Utc>, zone: Tz) -> u8 {
    instant.with_timezone(&zone).weekday().num_days_from_sunday() as u8
}

/// Weekday index of a calendar date, Sunday=0. Calendar dates carry their
/// weekday independent of zone.
pub fn weekday_of_date(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Display name for a weekday index, Sunday=0. Out-of-range indices map to
/// an empty string rather than panicking; the display fields are
/// informational only.
pub fn weekday_name(index: u8) -> &'static str {
    WEEKDAY_NAMES.get(index as usize).copied().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn gap_time_shifts_forward() {
        // 2026-03-08 02:30 does not exist in America/New_York (spring forward
        // jumps 02:00 -> 03:00). Expect the first valid time at/after the gap.
        let zone: Tz = "America/New_York".parse().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        let time = NaiveTime::from_hms_opt(2, 30, 0).unwrap();
        let instant = to_instant(date, time, zone);
        let local = instant.with_timezone(&zone);
        assert_eq!(local.hour(), 3);
        assert_eq!(local.minute(), 0);
    }

    #[test]
    fn gap_window_keeps_its_wall_clock_width() {
        // 02:00-03:00 on 2026-03-08 sits exactly inside the New York gap:
        // both endpoints resolve to 03:00 EDT (07:00 UTC). The window must
        // not collapse to zero width.
        let zone: Tz = "America/New_York".parse().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        let start_time = NaiveTime::from_hms_opt(2, 0, 0).unwrap();
        let end_time = NaiveTime::from_hms_opt(3, 0, 0).unwrap();
        let (start, end) = resolve_window(date, start_time, end_time, zone);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 8, 7, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 3, 8, 8, 0, 0).unwrap());
    }

    #[test]
    fn normal_window_resolves_both_endpoints_in_zone() {
        let zone: Tz = "America/New_York".parse().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let start_time = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let end_time = NaiveTime::from_hms_opt(10, 30, 0).unwrap();
        let (start, end) = resolve_window(date, start_time, end_time, zone);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 9, 13, 0, 0).unwrap());
        assert_eq!(end - start, chrono::Duration::minutes(90));
    }

    #[test]
    fn ambiguous_time_takes_earlier_offset() {
        // 2026-11-01 01:30 occurs twice in America/New_York (fall back).
        // The earlier occurrence is still EDT (UTC-4) -> 05:30 UTC.
        let zone: Tz = "America/New_York".parse().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 11, 1).unwrap();
        let time = NaiveTime::from_hms_opt(1, 30, 0).unwrap();
        let instant = to_instant(date, time, zone);
        assert_eq!(instant, Utc.with_ymd_and_hms(2026, 11, 1, 5, 30, 0).unwrap());
    }
}
