//! Timer engine implementation.
//!
//! The engine is a tick-driven state machine. It owns no thread and reads no
//! wall clock: the caller delivers one `tick()` per elapsed second and passes
//! in today's date where a completion needs it.
//!
//! ## Phase cycle
//!
//! ```text
//! Work -> Break -> Work -> Break -> Work -> Break -> Work -> LongBreak -> Work ...
//! ```
//!
//! Every phase that reaches zero yields exactly one
//! [`Event::SessionCompleted`]. After a completion the engine stops unless
//! `auto_start_next` is set.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(AppState::fresh(settings, today));
//! engine.start();
//! // once per second:
//! if let Some(Event::SessionCompleted(c)) = engine.tick(today) { /* persist */ }
//! ```

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::progress::DailyProgress;
use super::settings::{TimerSettings, LONG_BREAK_INTERVAL};
use super::Phase;
use crate::events::{Completion, Event};

/// Everything the engine needs to come up: the user's settings and today's
/// counters as last persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub settings: TimerSettings,
    pub progress: DailyProgress,
}

impl AppState {
    pub fn fresh(settings: TimerSettings, today: NaiveDate) -> Self {
        Self {
            settings,
            progress: DailyProgress::new(today),
        }
    }
}

/// Core timer engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    settings: TimerSettings,
    phase: Phase,
    seconds_remaining: u32,
    is_running: bool,
    progress: DailyProgress,
}

impl TimerEngine {
    /// Create an engine at the start of a work phase, paused.
    pub fn new(state: AppState) -> Self {
        let seconds_remaining = state.settings.seconds_for(Phase::Work);
        Self {
            settings: state.settings,
            phase: Phase::Work,
            seconds_remaining,
            is_running: false,
            progress: state.progress,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn progress(&self) -> &DailyProgress {
        &self.progress
    }

    /// Configured length of the current phase in seconds.
    pub fn total_seconds(&self) -> u32 {
        self.settings.seconds_for(self.phase)
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn phase_progress(&self) -> f64 {
        let total = self.total_seconds();
        if total == 0 {
            return 0.0;
        }
        1.0 - (f64::from(self.seconds_remaining) / f64::from(total))
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            is_running: self.is_running,
            seconds_remaining: self.seconds_remaining,
            total_seconds: self.total_seconds(),
            phase_progress: self.phase_progress(),
            completed_work_sessions: self.progress.completed_work_sessions,
            total_completed: self.progress.total_completed,
            daily_goal: self.settings.daily_goal,
            goal_progress_pct: self.progress.goal_progress(self.settings.daily_goal),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Returns `None` when already running.
    pub fn start(&mut self) -> Option<Event> {
        if self.is_running {
            return None;
        }
        self.is_running = true;
        Some(Event::TimerStarted {
            phase: self.phase,
            seconds_remaining: self.seconds_remaining,
            at: Utc::now(),
        })
    }

    /// Returns `None` when already paused.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.is_running {
            return None;
        }
        self.is_running = false;
        Some(Event::TimerPaused {
            phase: self.phase,
            seconds_remaining: self.seconds_remaining,
            at: Utc::now(),
        })
    }

    /// Back to a paused, full-length work phase. The abandoned phase is not
    /// recorded.
    pub fn reset(&mut self) -> Event {
        self.is_running = false;
        self.enter(Phase::Work);
        Event::TimerReset {
            seconds_remaining: self.seconds_remaining,
            at: Utc::now(),
        }
    }

    /// Advance the countdown by one second.
    ///
    /// Returns the completion event when this tick brought the phase to zero.
    /// Does nothing while paused.
    pub fn tick(&mut self, today: NaiveDate) -> Option<Event> {
        if !self.is_running {
            return None;
        }
        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        if self.seconds_remaining == 0 {
            return Some(self.complete_phase(today));
        }
        None
    }

    /// Finish the current phase and move to the next one.
    pub fn complete_phase(&mut self, today: NaiveDate) -> Event {
        let finished = self.phase;
        let duration_min = self.settings.minutes_for(finished);

        let next = if finished.is_work() {
            self.progress.completed_work_sessions += 1;
            self.progress.total_completed += 1;
            if self.progress.completed_work_sessions % LONG_BREAK_INTERVAL == 0 {
                Phase::LongBreak
            } else {
                Phase::Break
            }
        } else {
            Phase::Work
        };

        self.enter(next);
        self.is_running = self.settings.auto_start_next;
        tracing::debug!(from = %finished, to = %next, "phase completed");

        Event::SessionCompleted(Completion {
            phase: finished,
            duration_min,
            was_completed: true,
            date: today,
            next_phase: next,
            at: Utc::now(),
        })
    }

    /// Abandon the current phase, recording it as not completed.
    ///
    /// The recorded duration is the elapsed time rounded up to whole minutes.
    /// Skipped work never counts toward the cycle, so it is always followed
    /// by a short break.
    pub fn skip(&mut self, today: NaiveDate) -> Event {
        let finished = self.phase;
        let elapsed = self.total_seconds().saturating_sub(self.seconds_remaining);
        let duration_min = elapsed.div_ceil(60).max(1);

        let next = if finished.is_work() {
            Phase::Break
        } else {
            Phase::Work
        };
        self.enter(next);
        self.is_running = false;

        Event::SessionCompleted(Completion {
            phase: finished,
            duration_min,
            was_completed: false,
            date: today,
            next_phase: next,
            at: Utc::now(),
        })
    }

    /// Replace the configuration.
    ///
    /// While paused the current phase is reloaded at its new length. While
    /// running the in-flight countdown continues, capped at the new length.
    pub fn apply_settings(&mut self, settings: TimerSettings) -> Event {
        self.settings = settings;
        let total = self.total_seconds();
        self.seconds_remaining = if self.is_running {
            self.seconds_remaining.min(total)
        } else {
            total
        };
        Event::SettingsApplied {
            phase: self.phase,
            seconds_remaining: self.seconds_remaining,
            at: Utc::now(),
        }
    }

    /// Zero the daily counters when `today` is past the stored date.
    /// Returns true if a rollover happened.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        let rolled = DailyProgress::for_today(Some(self.progress), today);
        let changed = rolled != self.progress;
        self.progress = rolled;
        changed
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.seconds_remaining = self.settings.seconds_for(phase);
    }
}
