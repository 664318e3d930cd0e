use std::io::Write;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::Subcommand;
use focusloop_core::storage::Database;
use focusloop_core::{
    AppState, Clock, Config, Cue, DailyProgress, Event, FocusController, IntervalTicker, Notifier,
    ProgressStore, SystemClock, TickSource, TimerEngine,
};
use serde::{Deserialize, Serialize};

use super::{print_json, CliResult};
use crate::client::{ApiClient, RemoteSink};

const ENGINE_KEY: &str = "timer_engine";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run the countdown in the foreground until the current phase ends
    Run {
        /// Also send finished sessions to this server
        #[arg(long)]
        server: Option<String>,
    },
    /// Start or resume the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Abandon the current phase and move on
    Skip,
    /// Back to the start of a work phase
    Reset,
    /// Print current timer state as JSON
    Status,
}

/// Engine state kept between invocations.
///
/// While running, `last_tick_at` marks the instant the engine was last
/// brought up to date; the seconds since then are replayed as ticks on the
/// next invocation.
#[derive(Serialize, Deserialize)]
struct SavedTimer {
    engine: TimerEngine,
    last_tick_at: Option<DateTime<Utc>>,
}

/// Prints cues to stderr, keeping stdout for JSON, and rings the bell for
/// tones.
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn cue(&self, cue: &Cue) {
        let bell = if cue.tone.is_some() { "\x07" } else { "" };
        eprintln!("\n{bell}{}", cue.message);
    }

    fn notice(&self, message: &str) {
        eprintln!("warning: {message}");
    }
}

fn load_timer(db: &Database, config: &Config, today: NaiveDate) -> SavedTimer {
    let saved = db
        .kv_get(ENGINE_KEY)
        .ok()
        .flatten()
        .and_then(|json| match serde_json::from_str::<SavedTimer>(&json) {
            Ok(saved) => Some(saved),
            Err(e) => {
                tracing::warn!("discarding unreadable timer state: {e}");
                None
            }
        });

    match saved {
        Some(mut saved) => {
            if saved.engine.roll_over(today) {
                tracing::debug!("new day, daily counters reset");
            }
            if saved.engine.settings() != &config.timer {
                saved.engine.apply_settings(config.timer.clone());
            }
            saved
        }
        None => {
            let stored = db.load_progress().unwrap_or_else(|e| {
                tracing::warn!("failed to load daily progress: {e}");
                None
            });
            let state = AppState {
                settings: config.timer.clone(),
                progress: DailyProgress::for_today(stored, today),
            };
            SavedTimer {
                engine: TimerEngine::new(state),
                last_tick_at: None,
            }
        }
    }
}

fn save_timer(db: &Database, engine: &TimerEngine, last_tick_at: Option<DateTime<Utc>>) -> CliResult {
    let saved = SavedTimer {
        engine: engine.clone(),
        last_tick_at: last_tick_at.filter(|_| engine.is_running()),
    };
    db.kv_set(ENGINE_KEY, &serde_json::to_string(&saved)?)?;
    Ok(())
}

/// Replay the seconds that passed while no process was ticking.
///
/// Returns the instant the engine is now current to.
fn catch_up<N: Notifier>(
    controller: &mut FocusController<RemoteSink, N>,
    since: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    let Some(since) = since else {
        return now;
    };
    let elapsed = (now - since).num_seconds().max(0);
    let mut replayed = 0;
    while replayed < elapsed && controller.engine().is_running() {
        controller.tick();
        replayed += 1;
    }
    since + Duration::seconds(replayed)
}

/// Start the countdown. An already running timer keeps its catch-up anchor.
fn start_timer<N: Notifier>(
    controller: &mut FocusController<RemoteSink, N>,
    last_tick_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> (Option<Event>, DateTime<Utc>) {
    match controller.start() {
        Some(event) => (Some(event), now),
        None => (None, last_tick_at),
    }
}

fn render(engine: &TimerEngine) {
    let secs = engine.seconds_remaining();
    print!(
        "\r{:<12} {:02}:{:02}  ({}/{} today)",
        engine.phase().label(),
        secs / 60,
        secs % 60,
        engine.progress().total_completed,
        engine.settings().daily_goal,
    );
    let _ = std::io::stdout().flush();
}

async fn run_foreground<T: TickSource>(
    controller: &mut FocusController<RemoteSink, TerminalNotifier>,
    ticker: &mut T,
) {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    render(controller.engine());
    loop {
        tokio::select! {
            _ = ticker.next_tick() => {
                controller.tick();
                render(controller.engine());
                if !controller.engine().is_running() {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                controller.pause();
                println!("\npaused");
                break;
            }
        }
    }
}

pub async fn run(action: TimerAction) -> CliResult {
    let clock = Arc::new(SystemClock);
    let today = clock.today();
    let config = Config::load_or_default();
    let db = Database::open()?;
    let saved = load_timer(&db, &config, today);

    let remote = match &action {
        TimerAction::Run { server: Some(base) } => Some(ApiClient::new(base)?),
        _ => None,
    };
    let mut controller = FocusController::new(
        saved.engine,
        RemoteSink::new(db, remote),
        TerminalNotifier,
        clock.clone(),
    );
    let mut last_tick_at = catch_up(&mut controller, saved.last_tick_at, clock.now());

    match action {
        TimerAction::Run { .. } => {
            controller.start();
            run_foreground(&mut controller, &mut IntervalTicker::new()).await;
            last_tick_at = clock.now();
        }
        TimerAction::Start => {
            let (event, anchor) = start_timer(&mut controller, last_tick_at, clock.now());
            if let Some(event) = event {
                print_json(&event)?;
            }
            last_tick_at = anchor;
        }
        TimerAction::Pause => {
            if let Some(event) = controller.pause() {
                print_json(&event)?;
            }
        }
        TimerAction::Skip => {
            let event = controller.skip();
            print_json(&event)?;
        }
        TimerAction::Reset => {
            let event = controller.reset();
            print_json(&event)?;
        }
        TimerAction::Status => {
            print_json(&controller.engine().snapshot())?;
        }
    }

    let (engine, mut sink) = controller.into_parts();
    sink.flush().await;
    save_timer(sink.db(), &engine, Some(last_tick_at))?;
    Ok(())
}
