//! Percentages and averages over session records.
//!
//! Rounding is half-up and done in integer arithmetic so that values such
//! as 12.5 never land on the wrong side because of float error.

use chrono::NaiveDate;

use crate::clock::days_before;
use crate::storage::SessionRecord;

/// Days looked at by [`consistency_percentage`].
pub const CONSISTENCY_WINDOW_DAYS: u32 = 30;

/// `round(num / den)` with halves rounded up. `den` must be non-zero.
pub(crate) fn round_div(num: u64, den: u64) -> u64 {
    (2 * num + den) / (2 * den)
}

/// `num / den` rounded half-up to one decimal place.
pub(crate) fn one_decimal(num: u64, den: u64) -> f64 {
    if den == 0 {
        return 0.0;
    }
    round_div(num * 10, den) as f64 / 10.0
}

/// Minutes as hours, one decimal.
pub fn hours(minutes: u64) -> f64 {
    one_decimal(minutes, 60)
}

fn percent(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    u32::try_from(round_div(100 * part, whole)).unwrap_or(u32::MAX)
}

/// Share of the last 30 days (today included) with at least one
/// qualifying session.
pub fn consistency_percentage(records: &[SessionRecord], today: NaiveDate) -> u32 {
    let first = days_before(today, u64::from(CONSISTENCY_WINDOW_DAYS - 1));
    let mut active: Vec<NaiveDate> = records
        .iter()
        .filter(|r| r.is_qualifying() && r.date >= first && r.date <= today)
        .map(|r| r.date)
        .collect();
    active.sort_unstable();
    active.dedup();
    percent(active.len() as u64, u64::from(CONSISTENCY_WINDOW_DAYS))
}

/// Completed share of work records; breaks are ignored. 0 when there is no
/// work at all.
pub fn completion_rate(records: &[SessionRecord]) -> u32 {
    let (completed, total) = records
        .iter()
        .filter(|r| r.session_type.is_work())
        .fold((0u64, 0u64), |(c, t), r| (c + u64::from(r.was_completed), t + 1));
    percent(completed, total)
}

/// Mean length in whole minutes of qualifying sessions, 0 when none.
pub fn average_session_length(records: &[SessionRecord]) -> u32 {
    let (minutes, count) = records
        .iter()
        .filter(|r| r.is_qualifying())
        .fold((0u64, 0u64), |(m, c), r| (m + u64::from(r.duration), c + 1));
    if count == 0 {
        return 0;
    }
    u32::try_from(round_div(minutes, count)).unwrap_or(u32::MAX)
}

/// Percent of the daily goal reached, capped at 100. A goal of zero counts
/// as met.
pub fn goal_progress(today_count: u32, daily_goal: u32) -> u32 {
    if daily_goal == 0 {
        return 100;
    }
    percent(u64::from(today_count), u64::from(daily_goal)).min(100)
}
