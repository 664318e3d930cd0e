//! Statistics over stored sessions.
//!
//! Everything here is a pure function of a record list and "today". Only
//! qualifying sessions (completed work) count toward streaks, goals and
//! daily totals; completion rate is the one figure that looks at skipped
//! work as well.

mod daily;
mod rates;
mod report;

pub use daily::{best_day, daily_counts, moving_average, streak, DayCount, MOVING_AVERAGE_WINDOW};
pub use rates::{
    average_session_length, completion_rate, consistency_percentage, goal_progress, hours,
    CONSISTENCY_WINDOW_DAYS,
};
pub use report::{
    insights, monthly_summary, type_breakdown, weekly_summary, Insights, MonthlySummary,
    PeriodSummary, TypeBreakdown, MONTH_WINDOW_DAYS,
};
