mod config;
pub mod database;
pub mod memory;
pub mod migrations;
mod record;

pub use config::{Config, ServerConfig};
pub use database::Database;
pub use memory::MemoryStore;
pub use record::{NewSession, SessionRecord};

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::clock::{days_before, week_start};
use crate::error::Result;
use crate::timer::DailyProgress;

/// Append-only log of finished sessions.
///
/// Range queries are inclusive on both ends and return the most recently
/// completed record first.
pub trait SessionStore {
    /// Validate and persist a session.
    ///
    /// # Errors
    /// `CoreError::Validation` for a bad payload, `CoreError::Database` when
    /// the write fails.
    fn create_session(&mut self, session: NewSession) -> Result<SessionRecord>;

    fn sessions_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<SessionRecord>>;

    fn sessions_by_date(&self, date: NaiveDate) -> Result<Vec<SessionRecord>> {
        self.sessions_by_date_range(date, date)
    }

    /// `today` and the thirty days before it.
    fn sessions_last_30_days(&self, today: NaiveDate) -> Result<Vec<SessionRecord>> {
        self.sessions_by_date_range(days_before(today, 30), today)
    }

    /// Sunday of the current week through `today`.
    fn sessions_this_week(&self, today: NaiveDate) -> Result<Vec<SessionRecord>> {
        self.sessions_by_date_range(week_start(today), today)
    }
}

/// Where today's counters survive between runs.
pub trait ProgressStore {
    fn load_progress(&self) -> Result<Option<DailyProgress>>;

    fn save_progress(&mut self, progress: &DailyProgress) -> Result<()>;
}

/// Returns `~/.config/focusloop[-dev]/` based on FOCUSLOOP_ENV.
///
/// Set FOCUSLOOP_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSLOOP_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focusloop-dev")
    } else {
        base_dir.join("focusloop")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
