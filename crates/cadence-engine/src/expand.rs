//! Weekly recurrence expansion -- turns an anchor date, a weekday set, and
//! a bounded horizon into the ordered sequence of occurrence dates.
//!
//! The weekly rule itself is evaluated by the `rrule` crate (v0.13): the
//! expander builds canonical iCalendar text (`DTSTART;TZID=...` plus
//! `RRULE:FREQ=WEEKLY;BYDAY=...;UNTIL=...`), parses it into an `RRuleSet`,
//! and reads the dates back out. Anchor alignment and horizon adjustment
//! happen before rule construction, in plain date arithmetic.

use crate::clock;
use crate::error::{EngineError, Result};
use chrono::{Datelike, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use rrule::RRuleSet;
use std::collections::BTreeSet;

/// iCalendar BYDAY codes indexed by weekday number, Sunday=0.
const BYDAY_CODES: [&str; 7] = ["SU", "MO", "TU", "WE", "TH", "FR", "SA"];

/// Hard cap on occurrences per expansion. Horizons are human schedules (a
/// few hundred occurrences at most); hitting this cap means the request is
/// malformed, not that the series should be truncated.
const MAX_OCCURRENCES: u16 = 1000;

/// Result of expanding one recurrence window.
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    /// The anchor after forward alignment onto an allowed weekday.
    pub aligned_anchor: NaiveDate,
    /// Sorted, duplicate-free occurrence dates, always beginning with the
    /// aligned anchor. When the anchor aligns past the adjusted horizon the
    /// anchor is the sole element.
    pub dates: Vec<NaiveDate>,
    /// Canonical RRULE text the dates were produced from, for audit.
    pub rule: String,
}

/// Keep only weekday numbers in 0..=6. Out-of-range values are dropped; an
/// empty remainder is the caller's error.
fn usable_days(days: &BTreeSet<u8>) -> Result<BTreeSet<u8>> {
    let usable: BTreeSet<u8> = days.iter().copied().filter(|d| *d <= 6).collect();
    if usable.is_empty() {
        return Err(EngineError::EmptyWeekdaySet);
    }
    Ok(usable)
}

/// Snap the caller-supplied anchor forward onto the first allowed weekday.
///
/// The anchor is a *preferred* start, not an authoritative one: the engine
/// advances forward one day at a time, never backward, and never more than
/// six days.
///
/// # Errors
/// Returns `EngineError::EmptyWeekdaySet` if no usable weekday remains.
pub fn align_anchor(anchor: NaiveDate, days: &BTreeSet<u8>) -> Result<NaiveDate> {
    let usable = usable_days(days)?;
    let mut date = anchor;
    for _ in 0..7 {
        if usable.contains(&clock::weekday_of_date(date)) {
            return Ok(date);
        }
        date = date
            .succ_opt()
            .ok_or_else(|| EngineError::InvalidRule("calendar date overflow".to_string()))?;
    }
    // A non-empty weekday set is hit within seven steps.
    Err(EngineError::EmptyWeekdaySet)
}

/// Expand a weekly recurrence into its occurrence dates.
///
/// Steps, in order:
/// 1. Align `anchor` forward onto an allowed weekday.
/// 2. Adjust the horizon: the caller's `recurrence_end` is inclusive
///    through 23:59:59 local. When all seven weekdays are selected the
///    literal boundary day is excluded instead -- the every-day case
///    otherwise overruns by one day. (Intentional, inherited behavior;
///    see DESIGN.md before treating it as load-bearing.)
/// 3. Evaluate the weekly BYDAY rule between the aligned anchor and the
///    adjusted horizon, inclusive.
///
/// # Errors
/// - `EngineError::EmptyWeekdaySet` if `days` has no usable weekday.
/// - `EngineError::InvertedHorizon` if the adjusted end precedes
///   `recurrence_start`.
/// - `EngineError::InvalidRule` if the generated rule text fails to parse
///   or the expansion overruns [`MAX_OCCURRENCES`] (both indicate a bug or
///   a malformed request, not a user-correctable field).
pub fn expand(
    anchor: NaiveDate,
    days: &BTreeSet<u8>,
    recurrence_start: NaiveDate,
    recurrence_end: NaiveDate,
    zone: Tz,
) -> Result<Expansion> {
    let usable = usable_days(days)?;
    let aligned_anchor = align_anchor(anchor, &usable)?;

    // Horizon adjustment. The every-day case treats the boundary day as
    // already covered by the day before it.
    let every_day = usable.len() == 7;
    let until = if every_day {
        recurrence_end
            .pred_opt()
            .ok_or_else(|| EngineError::InvalidRule("calendar date underflow".to_string()))?
    } else {
        recurrence_end
    };
    if until < recurrence_start {
        return Err(EngineError::InvertedHorizon {
            start: recurrence_start,
            end: until,
        });
    }

    let rule = build_rule(&usable, until, zone);

    // Anchor aligned past the horizon: nothing recurs beyond the anchor
    // itself, which stays in the output as the sole occurrence.
    if aligned_anchor > until {
        log::debug!(
            "aligned anchor {} is past adjusted horizon {}; anchor-only expansion",
            aligned_anchor,
            until
        );
        return Ok(Expansion {
            aligned_anchor,
            dates: vec![aligned_anchor],
            rule,
        });
    }

    // Expansion runs at local noon: only the dates matter here, and noon
    // never lands inside a DST gap.
    let rule_text = format!(
        "DTSTART;TZID={}:{:04}{:02}{:02}T120000\nRRULE:{}",
        zone.name(),
        aligned_anchor.year(),
        aligned_anchor.month(),
        aligned_anchor.day(),
        rule,
    );

    let rule_set: RRuleSet = rule_text
        .parse()
        .map_err(|e| EngineError::InvalidRule(format!("{}", e)))?;

    let outcome = rule_set.all(MAX_OCCURRENCES);
    if outcome.limited {
        return Err(EngineError::InvalidRule(format!(
            "expansion exceeded {} occurrences",
            MAX_OCCURRENCES
        )));
    }

    let mut dates: Vec<NaiveDate> = outcome.dates.into_iter().map(|dt| dt.date_naive()).collect();
    dates.dedup();

    log::debug!(
        "expanded {} occurrence dates from {} through {} ({})",
        dates.len(),
        aligned_anchor,
        until,
        rule
    );

    Ok(Expansion {
        aligned_anchor,
        dates,
        rule,
    })
}

/// Canonical RRULE content (without the `RRULE:` prefix) for a weekly
/// BYDAY recurrence bounded by `until`, inclusive through the zone's local
/// end of day. `rrule` only accepts a UTC `UNTIL` when `DTSTART` carries a
/// TZID, so the local 23:59:59 bound is converted through the zone.
fn build_rule(days: &BTreeSet<u8>, until: NaiveDate, zone: Tz) -> String {
    let byday: Vec<&str> = days.iter().map(|d| BYDAY_CODES[*d as usize]).collect();
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).expect("23:59:59 is a valid time");
    let until_utc = clock::to_instant(until, end_of_day, zone);
    format!(
        "FREQ=WEEKLY;WKST=SU;BYDAY={};UNTIL={}",
        byday.join(","),
        until_utc.format("%Y%m%dT%H%M%SZ"),
    )
}
