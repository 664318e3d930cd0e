//! Glue between the engine and the outside world.
//!
//! The controller feeds commands and ticks into a [`TimerEngine`] and routes
//! what comes out: completions go to a [`SessionSink`] and a [`Notifier`].
//! A failed save is logged and reported, never fatal; the engine has already
//! moved on by the time the sink sees the session.

use std::sync::Arc;

use super::engine::TimerEngine;
use super::progress::DailyProgress;
use super::settings::TimerSettings;
use super::ticker::TickSource;
use crate::clock::Clock;
use crate::error::Result;
use crate::events::{Completion, Event};
use crate::notify::{Cue, Notifier};
use crate::storage::{NewSession, ProgressStore, SessionStore};

/// Where finished sessions and today's counters are written.
pub trait SessionSink {
    fn record_session(&mut self, session: NewSession) -> Result<()>;

    fn record_progress(&mut self, progress: &DailyProgress) -> Result<()>;
}

impl<T: SessionStore + ProgressStore> SessionSink for T {
    fn record_session(&mut self, session: NewSession) -> Result<()> {
        self.create_session(session).map(|_| ())
    }

    fn record_progress(&mut self, progress: &DailyProgress) -> Result<()> {
        self.save_progress(progress)
    }
}

pub struct FocusController<S, N> {
    engine: TimerEngine,
    sink: S,
    notifier: N,
    clock: Arc<dyn Clock>,
}

impl<S: SessionSink, N: Notifier> FocusController<S, N> {
    pub fn new(engine: TimerEngine, sink: S, notifier: N, clock: Arc<dyn Clock>) -> Self {
        Self {
            engine,
            sink,
            notifier,
            clock,
        }
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_parts(self) -> (TimerEngine, S) {
        (self.engine, self.sink)
    }

    pub fn start(&mut self) -> Option<Event> {
        self.engine.start()
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.engine.pause()
    }

    pub fn reset(&mut self) -> Event {
        self.engine.reset()
    }

    pub fn apply_settings(&mut self, settings: TimerSettings) -> Event {
        self.engine.apply_settings(settings)
    }

    pub fn skip(&mut self) -> Event {
        let event = self.engine.skip(self.clock.today());
        self.route(&event);
        event
    }

    /// Deliver one elapsed second.
    pub fn tick(&mut self) -> Option<Event> {
        let event = self.engine.tick(self.clock.today())?;
        self.route(&event);
        Some(event)
    }

    /// Tick until the engine stops, returning every phase that ended.
    ///
    /// Returns immediately if the engine is paused. With `auto_start_next`
    /// set this only ends when the caller drops the future.
    pub async fn run_until_idle<T: TickSource>(&mut self, ticker: &mut T) -> Vec<Completion> {
        let mut finished = Vec::new();
        while self.engine.is_running() {
            ticker.next_tick().await;
            if let Some(Event::SessionCompleted(completion)) = self.tick() {
                finished.push(completion);
            }
        }
        finished
    }

    fn route(&mut self, event: &Event) {
        let Event::SessionCompleted(completion) = event else {
            return;
        };

        tracing::info!(
            phase = %completion.phase,
            minutes = completion.duration_min,
            completed = completion.was_completed,
            next = %completion.next_phase,
            "session finished"
        );

        if let Err(e) = self.sink.record_session(completion.to_new_session()) {
            tracing::warn!("failed to save session: {e}");
            self.notifier
                .notice(&format!("Could not save {} session: {e}", completion.phase.label()));
        }
        if let Err(e) = self.sink.record_progress(self.engine.progress()) {
            tracing::warn!("failed to save daily progress: {e}");
        }

        let cue = Cue::for_completion(completion, self.engine.settings().sound_enabled);
        self.notifier.cue(&cue);
    }
}
