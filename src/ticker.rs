//! # Periodic Ticker
//!
//! A cancellable periodic task for the cooperative event loop.
//!
//! A [`Ticker`] is polled from a `tokio::select!` branch. While active it
//! completes once per period; once cancelled its `tick()` never completes, so
//! the branch stops firing without any other bookkeeping.
//!
//! ## Usage
//!
//! ```no_run
//! use ground_station::ticker::Ticker;
//! use std::time::Duration;
//!
//! # async fn run() {
//! let mut telemetry = Ticker::every(Duration::from_millis(100));
//! let mut frames = Ticker::idle();
//!
//! loop {
//!     tokio::select! {
//!         _ = telemetry.tick() => { /* poll telemetry */ }
//!         _ = frames.tick() => { /* show a frame */ }
//!     }
//! }
//! # }
//! ```

use std::future;
use std::time::Duration;
use tokio::time::{interval, Instant, Interval, MissedTickBehavior};

/// Periodic timer that can be stopped and restarted
#[derive(Debug, Default)]
pub struct Ticker {
    interval: Option<Interval>,
}

impl Ticker {
    /// A ticker that is not scheduled.
    #[must_use]
    pub fn idle() -> Self {
        Self { interval: None }
    }

    /// A ticker firing immediately and then every `period`.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn every(period: Duration) -> Self {
        let mut ticker = Self::idle();
        ticker.start(period);
        ticker
    }

    /// (Re)start the ticker with `period`, replacing any previous schedule.
    ///
    /// Ticks missed while the loop was busy are skipped rather than burst.
    pub fn start(&mut self, period: Duration) {
        let mut timer = interval(period.max(Duration::from_millis(1)));
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.interval = Some(timer);
    }

    /// Stop scheduling further ticks.
    pub fn cancel(&mut self) {
        self.interval = None;
    }

    /// Whether the ticker is scheduled.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.interval.is_some()
    }

    /// Wait for the next tick. Never completes while cancelled.
    pub async fn tick(&mut self) -> Instant {
        match self.interval.as_mut() {
            Some(timer) => timer.tick().await,
            None => future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, timeout};

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_is_immediate() {
        let mut ticker = Ticker::every(Duration::from_millis(100));
        let start = Instant::now();
        ticker.tick().await;
        assert_eq!(Instant::now() - start, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_at_period() {
        let mut ticker = Ticker::every(Duration::from_millis(100));
        let start = Instant::now();
        for _ in 0..4 {
            ticker.tick().await;
        }
        assert_eq!(Instant::now() - start, Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_ticker_never_fires() {
        let mut ticker = Ticker::idle();
        assert!(!ticker.is_active());
        let result = timeout(Duration::from_secs(10), ticker.tick()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_idle_tick_is_pending() {
        let mut ticker = Ticker::idle();
        let mut tick = tokio_test::task::spawn(ticker.tick());
        tokio_test::assert_pending!(tick.poll());
        tokio_test::assert_pending!(tick.poll());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks() {
        let mut ticker = Ticker::every(Duration::from_millis(10));
        ticker.tick().await;
        ticker.cancel();
        assert!(!ticker.is_active());

        let result = timeout(Duration::from_secs(1), ticker.tick()).await;
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_cancel() {
        let mut ticker = Ticker::every(Duration::from_millis(10));
        ticker.cancel();
        ticker.start(Duration::from_millis(50));
        assert!(ticker.is_active());

        let start = Instant::now();
        ticker.tick().await;
        ticker.tick().await;
        assert_eq!(Instant::now() - start, Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missed_ticks_are_skipped() {
        let mut ticker = Ticker::every(Duration::from_millis(10));
        ticker.tick().await;
        sleep(Duration::from_millis(35)).await;

        // One overdue tick fires at once, then the schedule realigns
        let before = Instant::now();
        ticker.tick().await;
        assert_eq!(Instant::now(), before);
        ticker.tick().await;
        assert_eq!(Instant::now() - before, Duration::from_millis(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_only_fires_active_ticker() {
        let mut active = Ticker::every(Duration::from_millis(10));
        let mut cancelled = Ticker::idle();

        for _ in 0..5 {
            tokio::select! {
                _ = active.tick() => {}
                _ = cancelled.tick() => panic!("cancelled ticker fired"),
            }
        }
    }
}
