use chrono::NaiveDate;
use clap::{Args, Subcommand};
use focusloop_core::clock::parse_date;
use focusloop_core::storage::Database;
use focusloop_core::{Clock, NewSession, Phase, SessionStore, SystemClock};

use super::{fetch_sessions, print_json, CliResult};
use crate::client::{ApiClient, Window};

#[derive(Subcommand)]
pub enum SessionsAction {
    /// Record a finished session by hand
    Add {
        /// work, break or long_break
        #[arg(long = "type", value_parser = parse_phase)]
        session_type: Phase,
        /// Length in minutes
        #[arg(long, allow_negative_numbers = true)]
        duration: i64,
        /// Mark the session as abandoned
        #[arg(long)]
        skipped: bool,
        /// Calendar day (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
        /// Send to this server instead of the local database
        #[arg(long)]
        server: Option<String>,
    },
    /// List sessions, newest first
    List {
        #[command(flatten)]
        window: WindowArgs,
        /// Read from this server instead of the local database
        #[arg(long)]
        server: Option<String>,
    },
}

/// Which days to look at. Defaults to today.
#[derive(Args, Debug, Default)]
pub struct WindowArgs {
    /// Sunday of this week through today
    #[arg(long, conflicts_with_all = ["month", "from", "to"])]
    pub week: bool,
    /// The last thirty days and today
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub month: bool,
    /// First day of a custom range (YYYY-MM-DD)
    #[arg(long, requires = "to", value_parser = parse_date_arg)]
    pub from: Option<NaiveDate>,
    /// Last day of a custom range (YYYY-MM-DD)
    #[arg(long, requires = "from", value_parser = parse_date_arg)]
    pub to: Option<NaiveDate>,
}

impl WindowArgs {
    pub fn window(&self) -> Window {
        match (self.from, self.to) {
            (Some(start), Some(end)) => Window::Range(start, end),
            _ if self.week => Window::Week,
            _ if self.month => Window::Month,
            _ => Window::Today,
        }
    }
}

pub(crate) fn parse_phase(s: &str) -> Result<Phase, String> {
    s.parse::<Phase>().map_err(|e| e.to_string())
}

pub(crate) fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

pub async fn run(action: SessionsAction) -> CliResult {
    let today = SystemClock.today();

    match action {
        SessionsAction::Add {
            session_type,
            duration,
            skipped,
            date,
            server,
        } => {
            let session = NewSession {
                session_type,
                duration,
                was_completed: Some(!skipped),
                date: date.unwrap_or(today),
            };
            let record = match server {
                Some(base) => ApiClient::new(&base)?.create_session(&session).await?,
                None => Database::open()?.create_session(session)?,
            };
            print_json(&record)?;
        }
        SessionsAction::List { window, server } => {
            let records = fetch_sessions(server.as_deref(), window.window(), today).await?;
            print_json(&records)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, day).unwrap()
    }

    #[test]
    fn window_defaults_to_today() {
        assert_eq!(WindowArgs::default().window(), Window::Today);
    }

    #[test]
    fn explicit_range_wins() {
        let args = WindowArgs {
            from: Some(d(1)),
            to: Some(d(3)),
            ..WindowArgs::default()
        };
        assert_eq!(args.window(), Window::Range(d(1), d(3)));
    }

    #[test]
    fn phase_and_date_parsers() {
        assert_eq!(parse_phase("long_break"), Ok(Phase::LongBreak));
        assert!(parse_phase("nap").is_err());
        assert_eq!(parse_date_arg("2024-08-02"), Ok(d(2)));
        assert!(parse_date_arg("08/02/2024").is_err());
    }
}
