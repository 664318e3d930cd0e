use std::future::Future;
use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Something that paces the engine.
pub trait TickSource {
    /// Resolve when the next second has elapsed.
    fn next_tick(&mut self) -> impl Future<Output = ()> + Send;
}

/// Real-time ticks, one per second.
///
/// A late tick pushes the schedule back instead of firing a burst, so a
/// suspended process resumes where it left off.
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new() -> Self {
        Self::every(Duration::from_secs(1))
    }

    pub fn every(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

impl Default for IntervalTicker {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for IntervalTicker {
    async fn next_tick(&mut self) {
        self.interval.tick().await;
    }
}
