//! Tick scheduling.

use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// Source of simulation ticks.
pub trait Ticker: Send {
    /// Wait for the next tick. `false` means no more ticks will come.
    fn tick(&mut self) -> impl Future<Output = bool> + Send;
}

/// Real-time ticker at a fixed period.
///
/// An overrunning tick delays the next one; missed ticks are never replayed.
#[derive(Debug)]
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }
}

impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// Ticker driven by a [`ManualClock`].
#[derive(Debug)]
pub struct ManualTicker {
    rx: mpsc::UnboundedReceiver<()>,
}

/// Virtual clock: each `advance` releases exactly one tick.
#[derive(Debug, Clone)]
pub struct ManualClock {
    tx: mpsc::UnboundedSender<()>,
}

/// Create a linked clock and ticker. Dropping every clock ends the ticker.
pub fn manual() -> (ManualClock, ManualTicker) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ManualClock { tx }, ManualTicker { rx })
}

impl ManualClock {
    /// Release one tick. Returns `false` if the ticker is gone.
    pub fn advance(&self) -> bool {
        self.tx.send(()).is_ok()
    }

    /// Release `n` ticks.
    pub fn advance_by(&self, n: usize) -> bool {
        (0..n).all(|_| self.advance())
    }
}

impl Ticker for ManualTicker {
    async fn tick(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_manual_ticks_are_counted() {
        let (clock, mut ticker) = manual();
        assert!(clock.advance_by(2));
        assert!(ticker.tick().await);
        assert!(ticker.tick().await);
        drop(clock);
        assert!(!ticker.tick().await);
    }

    #[tokio::test]
    async fn test_clock_reports_dropped_ticker() {
        let (clock, ticker) = manual();
        drop(ticker);
        assert!(!clock.advance());
    }

    #[tokio::test]
    async fn test_interval_ticker_waits_one_period() {
        let period = Duration::from_millis(16);
        let start = Instant::now();
        let mut ticker = IntervalTicker::new(period);
        assert_eq!(ticker.period(), period);
        assert!(ticker.tick().await);
        assert!(start.elapsed() >= period);
    }
}
