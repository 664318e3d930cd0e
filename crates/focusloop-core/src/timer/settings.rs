use serde::{Deserialize, Serialize};

use super::Phase;
use crate::error::ConfigError;

/// Work sessions per cycle; the last one is followed by a long break.
pub const LONG_BREAK_INTERVAL: u32 = 4;

pub const WORK_MINUTES_RANGE: (u32, u32) = (1, 60);
pub const BREAK_MINUTES_RANGE: (u32, u32) = (1, 30);
pub const LONG_BREAK_MINUTES_RANGE: (u32, u32) = (5, 60);
pub const DAILY_GOAL_RANGE: (u32, u32) = (1, 20);

/// User-controlled timer configuration.
///
/// Replaced wholesale on save; the engine never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u32,
    #[serde(default = "default_daily_goal")]
    pub daily_goal: u32,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    /// Start the next phase immediately after one completes.
    #[serde(default)]
    pub auto_start_next: bool,
}

fn default_work_minutes() -> u32 {
    25
}
fn default_break_minutes() -> u32 {
    5
}
fn default_long_break_minutes() -> u32 {
    15
}
fn default_daily_goal() -> u32 {
    8
}
fn default_true() -> bool {
    true
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            break_minutes: default_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            daily_goal: default_daily_goal(),
            sound_enabled: true,
            auto_start_next: false,
        }
    }
}

impl TimerSettings {
    /// Configured length of `phase` in minutes.
    pub fn minutes_for(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Work => self.work_minutes,
            Phase::Break => self.break_minutes,
            Phase::LongBreak => self.long_break_minutes,
        }
    }

    pub fn seconds_for(&self, phase: Phase) -> u32 {
        self.minutes_for(phase).saturating_mul(60)
    }

    fn bounded_fields(&self) -> [(&'static str, u32, (u32, u32)); 4] {
        [
            ("work_minutes", self.work_minutes, WORK_MINUTES_RANGE),
            ("break_minutes", self.break_minutes, BREAK_MINUTES_RANGE),
            ("long_break_minutes", self.long_break_minutes, LONG_BREAK_MINUTES_RANGE),
            ("daily_goal", self.daily_goal, DAILY_GOAL_RANGE),
        ]
    }

    /// Reject any value outside its practical range.
    ///
    /// # Errors
    /// Returns `ConfigError::OutOfRange` for the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value, (min, max)) in self.bounded_fields() {
            if value < min || value > max {
                return Err(ConfigError::OutOfRange {
                    key: key.to_string(),
                    value,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }

    /// Copy with every numeric field clamped into range.
    pub fn clamped(&self) -> Self {
        let clamp = |v: u32, (min, max): (u32, u32)| v.clamp(min, max);
        Self {
            work_minutes: clamp(self.work_minutes, WORK_MINUTES_RANGE),
            break_minutes: clamp(self.break_minutes, BREAK_MINUTES_RANGE),
            long_break_minutes: clamp(self.long_break_minutes, LONG_BREAK_MINUTES_RANGE),
            daily_goal: clamp(self.daily_goal, DAILY_GOAL_RANGE),
            ..self.clone()
        }
    }
}
