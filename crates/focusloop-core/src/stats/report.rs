//! Summaries shown on the statistics screens.
//!
//! Each builder takes whatever records the caller fetched plus "today" and
//! picks its own window out of them; records outside the window are ignored.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::daily::{best_day, daily_counts, moving_average, streak, DayCount, MOVING_AVERAGE_WINDOW};
use super::rates::{average_session_length, consistency_percentage, goal_progress, hours, one_decimal};
use crate::clock::{days_before, week_start};
use crate::storage::SessionRecord;
use crate::timer::Phase;

/// Days covered by [`MonthlySummary`], today included.
pub const MONTH_WINDOW_DAYS: u32 = 30;

/// Totals over a run of days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: Vec<DayCount>,
    pub total_sessions: u32,
    pub total_minutes: u32,
    pub total_hours: f64,
    pub avg_per_day: f64,
}

impl PeriodSummary {
    pub fn new(records: &[SessionRecord], start: NaiveDate, end: NaiveDate) -> Self {
        let days = daily_counts(records, start, end);
        let total_sessions: u32 = days.iter().map(|d| d.sessions).sum();
        let total_minutes: u32 = days.iter().map(|d| d.minutes).sum();
        Self {
            start,
            end,
            total_hours: hours(u64::from(total_minutes)),
            avg_per_day: one_decimal(u64::from(total_sessions), days.len() as u64),
            total_sessions,
            total_minutes,
            days,
        }
    }
}

/// The Sunday-to-Saturday week containing `today`.
pub fn weekly_summary(records: &[SessionRecord], today: NaiveDate) -> PeriodSummary {
    let start = week_start(today);
    let end = start.checked_add_days(Days::new(6)).unwrap_or(today);
    PeriodSummary::new(records, start, end)
}

/// The last thirty days with trend figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    #[serde(flatten)]
    pub period: PeriodSummary,
    pub streak: u32,
    pub best_day: Option<DayCount>,
    /// Seven-day moving average, aligned with `period.days`.
    pub moving_average: Vec<f64>,
}

pub fn monthly_summary(records: &[SessionRecord], today: NaiveDate) -> MonthlySummary {
    let start = days_before(today, u64::from(MONTH_WINDOW_DAYS - 1));
    let period = PeriodSummary::new(records, start, today);
    MonthlySummary {
        streak: streak(records, today),
        best_day: best_day(&period.days),
        moving_average: moving_average(&period.days, MOVING_AVERAGE_WINDOW),
        period,
    }
}

/// Headline numbers for the insights panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub today_sessions: u32,
    /// Today minus yesterday.
    pub daily_change: i64,
    /// This week minus last week, Sunday-start weeks.
    pub weekly_change: i64,
    /// Hours of qualifying sessions in the last thirty days.
    pub total_hours: f64,
    pub avg_session_length: u32,
    pub consistency: u32,
    pub best_weekday: Weekday,
    pub best_weekday_sessions: u32,
    pub daily_goal: u32,
    pub goal_progress: u32,
}

fn qualifying_between(records: &[SessionRecord], start: NaiveDate, end: NaiveDate) -> u32 {
    let n = records
        .iter()
        .filter(|r| r.is_qualifying() && r.date >= start && r.date <= end)
        .count();
    u32::try_from(n).unwrap_or(u32::MAX)
}

pub fn insights(records: &[SessionRecord], today: NaiveDate, daily_goal: u32) -> Insights {
    let yesterday = days_before(today, 1);
    let this_week = week_start(today);
    let last_week = days_before(this_week, 7);
    let last_week_end = days_before(this_week, 1);
    let this_week_end = this_week.checked_add_days(Days::new(6)).unwrap_or(today);

    let today_sessions = qualifying_between(records, today, today);
    let yesterday_sessions = qualifying_between(records, yesterday, yesterday);
    let this_week_sessions = qualifying_between(records, this_week, this_week_end);
    let last_week_sessions = qualifying_between(records, last_week, last_week_end);

    let recent_start = days_before(today, u64::from(MONTH_WINDOW_DAYS - 1));
    let recent: Vec<SessionRecord> = records
        .iter()
        .filter(|r| r.is_qualifying() && r.date >= recent_start && r.date <= today)
        .cloned()
        .collect();
    let recent_minutes: u64 = recent.iter().map(|r| u64::from(r.duration)).sum();

    let mut per_weekday = [0u32; 7];
    for r in records.iter().filter(|r| r.is_qualifying()) {
        per_weekday[r.date.weekday().num_days_from_sunday() as usize] += 1;
    }
    let (best_index, best_count) = per_weekday
        .iter()
        .copied()
        .enumerate()
        .fold((0, 0), |best, (i, n)| if n > best.1 { (i, n) } else { best });

    Insights {
        today_sessions,
        daily_change: i64::from(today_sessions) - i64::from(yesterday_sessions),
        weekly_change: i64::from(this_week_sessions) - i64::from(last_week_sessions),
        total_hours: hours(recent_minutes),
        avg_session_length: average_session_length(&recent),
        consistency: consistency_percentage(records, today),
        best_weekday: weekday_from_sunday(best_index),
        best_weekday_sessions: best_count,
        daily_goal,
        goal_progress: goal_progress(today_sessions, daily_goal),
    }
}

fn weekday_from_sunday(index: usize) -> Weekday {
    let mut day = Weekday::Sun;
    for _ in 0..index {
        day = day.succ();
    }
    day
}

/// Completed sessions and time spent, per session type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeBreakdown {
    pub session_type: Phase,
    pub completed: u32,
    pub minutes: u32,
    pub hours: f64,
}

/// One row per session type, in cycle order, zero rows included.
pub fn type_breakdown(records: &[SessionRecord]) -> Vec<TypeBreakdown> {
    Phase::ALL
        .iter()
        .map(|&phase| {
            let (completed, minutes) = records
                .iter()
                .filter(|r| r.session_type == phase && r.was_completed)
                .fold((0u32, 0u32), |(c, m), r| (c + 1, m.saturating_add(r.duration)));
            TypeBreakdown {
                session_type: phase,
                completed,
                minutes,
                hours: hours(u64::from(minutes)),
            }
        })
        .collect()
}
