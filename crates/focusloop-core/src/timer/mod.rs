mod controller;
mod engine;
mod phase;
mod progress;
mod settings;
mod ticker;

pub use controller::{FocusController, SessionSink};
pub use engine::{AppState, TimerEngine};
pub use phase::Phase;
pub use progress::DailyProgress;
pub use settings::{
    TimerSettings, BREAK_MINUTES_RANGE, DAILY_GOAL_RANGE, LONG_BREAK_INTERVAL,
    LONG_BREAK_MINUTES_RANGE, WORK_MINUTES_RANGE,
};
pub use ticker::{IntervalTicker, TickSource};
