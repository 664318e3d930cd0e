use chrono::NaiveDate;
use clap::Subcommand;
use focusloop_core::stats;
use focusloop_core::{Clock, Config, SessionRecord, SystemClock};
use serde::Serialize;

use super::{fetch_sessions, print_json, CliResult};
use crate::client::{ApiClient, Window};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's sessions against the daily goal
    Today {
        #[arg(long)]
        server: Option<String>,
    },
    /// This week, Sunday to Saturday
    Week {
        #[arg(long)]
        server: Option<String>,
    },
    /// The last thirty days with streak and moving average
    Month {
        #[arg(long)]
        server: Option<String>,
    },
    /// Trends, consistency and best weekday
    Insights {
        /// Overrides the configured daily goal
        #[arg(long)]
        goal: Option<u32>,
        #[arg(long)]
        server: Option<String>,
    },
    /// Consecutive active days ending today
    Streak {
        #[arg(long)]
        server: Option<String>,
    },
    /// Time spent per session type over the last thirty days
    Breakdown {
        #[arg(long)]
        server: Option<String>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TodayStats {
    date: NaiveDate,
    sessions: u32,
    minutes: u32,
    daily_goal: u32,
    goal_progress: u32,
    completion_rate: u32,
}

fn today_stats(records: &[SessionRecord], today: NaiveDate, daily_goal: u32) -> TodayStats {
    let day = stats::daily_counts(records, today, today)
        .into_iter()
        .next()
        .unwrap_or(stats::DayCount {
            date: today,
            sessions: 0,
            minutes: 0,
        });
    TodayStats {
        date: today,
        sessions: day.sessions,
        minutes: day.minutes,
        daily_goal,
        goal_progress: stats::goal_progress(day.sessions, daily_goal),
        completion_rate: stats::completion_rate(records),
    }
}

pub async fn run(action: StatsAction) -> CliResult {
    let today = SystemClock.today();
    let config = Config::load_or_default();

    match action {
        StatsAction::Today { server } => {
            let records = fetch_sessions(server.as_deref(), Window::Today, today).await?;
            print_json(&today_stats(&records, today, config.timer.daily_goal))?;
        }
        StatsAction::Week { server } => {
            let records = fetch_sessions(server.as_deref(), Window::Week, today).await?;
            print_json(&stats::weekly_summary(&records, today))?;
        }
        StatsAction::Month { server } => {
            let records = fetch_sessions(server.as_deref(), Window::Month, today).await?;
            print_json(&stats::monthly_summary(&records, today))?;
        }
        StatsAction::Insights { goal, server } => {
            let daily_goal = goal.unwrap_or(config.timer.daily_goal);
            let insights = match server {
                Some(base) => ApiClient::new(&base)?.insights(daily_goal).await?,
                None => {
                    let records = fetch_sessions(None, Window::Month, today).await?;
                    stats::insights(&records, today, daily_goal)
                }
            };
            print_json(&insights)?;
        }
        StatsAction::Streak { server } => {
            let records = fetch_sessions(server.as_deref(), Window::Month, today).await?;
            println!("{}", stats::streak(&records, today));
        }
        StatsAction::Breakdown { server } => {
            let records = fetch_sessions(server.as_deref(), Window::Month, today).await?;
            print_json(&stats::type_breakdown(&records))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use focusloop_core::{NewSession, Phase};

    #[test]
    fn today_stats_counts_qualifying_work() {
        let today = NaiveDate::from_ymd_opt(2024, 9, 3).unwrap();
        let mut skipped = NewSession::completed(Phase::Work, 10, today)
            .into_record(Utc::now())
            .unwrap();
        skipped.was_completed = false;
        let records: Vec<SessionRecord> = (0..4)
            .map(|_| {
                NewSession::completed(Phase::Work, 25, today)
                    .into_record(Utc::now())
                    .unwrap()
            })
            .chain([skipped])
            .collect();

        let s = today_stats(&records, today, 8);
        assert_eq!(s.sessions, 4);
        assert_eq!(s.minutes, 100);
        assert_eq!(s.goal_progress, 50);
        assert_eq!(s.completion_rate, 80);
    }
}
