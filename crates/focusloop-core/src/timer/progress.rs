use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Today's completion counters, persisted alongside the calendar date they
/// belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub date: NaiveDate,
    /// Completed work phases; drives long-break placement.
    pub completed_work_sessions: u32,
    /// Counted against the daily goal.
    pub total_completed: u32,
}

impl DailyProgress {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            completed_work_sessions: 0,
            total_completed: 0,
        }
    }

    /// Carry counters forward when `today` is still the stored date,
    /// start from zero otherwise.
    pub fn for_today(stored: Option<DailyProgress>, today: NaiveDate) -> Self {
        match stored {
            Some(p) if p.date == today => p,
            _ => Self::new(today),
        }
    }

    /// Percentage of `daily_goal` reached, capped at 100.
    pub fn goal_progress(&self, daily_goal: u32) -> u32 {
        crate::stats::goal_progress(self.total_completed, daily_goal)
    }
}
