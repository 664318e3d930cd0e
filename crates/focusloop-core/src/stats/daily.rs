//! Per-day aggregation: counts, streaks, best day and moving averages.

use std::collections::{BTreeMap, HashSet};

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::rates::one_decimal;
use crate::storage::SessionRecord;

/// Trailing window used by [`moving_average`].
pub const MOVING_AVERAGE_WINDOW: usize = 7;

/// Qualifying sessions finished on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCount {
    pub date: NaiveDate,
    pub sessions: u32,
    pub minutes: u32,
}

/// One entry per day from `start` to `end` inclusive, zero-filled.
pub fn daily_counts(records: &[SessionRecord], start: NaiveDate, end: NaiveDate) -> Vec<DayCount> {
    let mut by_day: BTreeMap<NaiveDate, (u32, u32)> = BTreeMap::new();
    for r in records.iter().filter(|r| r.is_qualifying()) {
        let entry = by_day.entry(r.date).or_default();
        entry.0 += 1;
        entry.1 = entry.1.saturating_add(r.duration);
    }

    start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|date| {
            let (sessions, minutes) = by_day.get(&date).copied().unwrap_or_default();
            DayCount {
                date,
                sessions,
                minutes,
            }
        })
        .collect()
}

/// Consecutive days ending today with at least one qualifying session.
///
/// Zero when today has none, even if yesterday was active.
pub fn streak(records: &[SessionRecord], today: NaiveDate) -> u32 {
    let active: HashSet<NaiveDate> = records
        .iter()
        .filter(|r| r.is_qualifying())
        .map(|r| r.date)
        .collect();

    let mut count = 0;
    let mut day = today;
    while active.contains(&day) {
        count += 1;
        match day.checked_sub_days(Days::new(1)) {
            Some(prev) => day = prev,
            None => break,
        }
    }
    count
}

/// The busiest day; the earliest wins a tie.
pub fn best_day(days: &[DayCount]) -> Option<DayCount> {
    days.iter().copied().reduce(|best, day| {
        if day.sessions > best.sessions {
            day
        } else {
            best
        }
    })
}

/// Trailing mean of session counts per day over up to `window` days,
/// rounded to one decimal.
pub fn moving_average(days: &[DayCount], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..days.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &days[start..=i];
            let total: u64 = slice.iter().map(|d| u64::from(d.sessions)).sum();
            one_decimal(total, slice.len() as u64)
        })
        .collect()
}
