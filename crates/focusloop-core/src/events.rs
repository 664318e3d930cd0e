use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::NewSession;
use crate::timer::Phase;

/// Every state change of the engine produces an Event.
/// The presentation layer renders them; the controller routes completions
/// to the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    SessionCompleted(Completion),
    SettingsApplied {
        phase: Phase,
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        is_running: bool,
        seconds_remaining: u32,
        total_seconds: u32,
        /// 0.0 .. 1.0 progress within the current phase.
        phase_progress: f64,
        completed_work_sessions: u32,
        total_completed: u32,
        daily_goal: u32,
        goal_progress_pct: u32,
        at: DateTime<Utc>,
    },
}

/// A phase that ended, either by running out or by being skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub phase: Phase,
    pub duration_min: u32,
    pub was_completed: bool,
    pub date: NaiveDate,
    pub next_phase: Phase,
    pub at: DateTime<Utc>,
}

impl Completion {
    /// Whether the phase that just ended was a work phase.
    pub fn was_work(&self) -> bool {
        self.phase.is_work()
    }

    /// Payload to hand to a session store.
    pub fn to_new_session(&self) -> NewSession {
        NewSession {
            session_type: self.phase,
            duration: i64::from(self.duration_min),
            was_completed: Some(self.was_completed),
            date: self.date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_maps_to_store_payload() {
        let c = Completion {
            phase: Phase::Work,
            duration_min: 25,
            was_completed: true,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            next_phase: Phase::Break,
            at: Utc::now(),
        };
        assert!(c.was_work());
        let s = c.to_new_session();
        assert_eq!(s.session_type, Phase::Work);
        assert_eq!(s.duration, 25);
        assert_eq!(s.was_completed, Some(true));
    }

    #[test]
    fn events_are_tagged() {
        let e = Event::TimerReset {
            seconds_remaining: 1500,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["type"], "TimerReset");
    }
}
