//! # Focusloop Core Library
//!
//! This library provides the core logic for the Focusloop focus timer. The
//! CLI and the HTTP backend are thin layers over the same crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a tick-driven state machine cycling work, break and
//!   long-break phases; the caller delivers one `tick()` per second
//! - **Controller**: routes engine completions to a session sink and a notifier
//! - **Storage**: SQLite and in-memory session stores, TOML configuration
//! - **Statistics**: streaks, moving averages and rates over stored sessions
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`FocusController`]: Engine plus persistence and notification
//! - [`SessionStore`]: Append-only session log
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod notify;
pub mod stats;
pub mod storage;
pub mod timer;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::{Completion, Event};
pub use notify::{Cue, LogNotifier, Notifier, Tone};
pub use storage::{
    Config, Database, MemoryStore, NewSession, ProgressStore, ServerConfig, SessionRecord,
    SessionStore,
};
pub use timer::{
    AppState, DailyProgress, FocusController, IntervalTicker, Phase, SessionSink, TickSource,
    TimerEngine, TimerSettings,
};
