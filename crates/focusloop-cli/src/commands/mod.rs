pub mod config;
pub mod sessions;
pub mod stats;
pub mod timer;

use chrono::NaiveDate;
use focusloop_core::storage::Database;
use focusloop_core::{SessionRecord, SessionStore};
use serde::Serialize;

use crate::client::{ApiClient, Window};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Read sessions from `server` if given, from the local database otherwise.
pub async fn fetch_sessions(
    server: Option<&str>,
    window: Window,
    today: NaiveDate,
) -> CliResult<Vec<SessionRecord>> {
    if let Some(base) = server {
        return ApiClient::new(base)?.sessions(window).await;
    }

    let db = Database::open()?;
    let records = match window {
        Window::Today => db.sessions_by_date(today)?,
        Window::Week => db.sessions_this_week(today)?,
        Window::Month => db.sessions_last_30_days(today)?,
        Window::Range(start, end) => db.sessions_by_date_range(start, end)?,
    };
    Ok(records)
}
