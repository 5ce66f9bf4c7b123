//! Async owner of a timer session and its ticker.
//!
//! The driver keeps one invariant: a [`Ticker`] exists exactly while the
//! session is running. Every command re-checks it before returning, so a
//! pause, reset or save stops the tick task immediately and a restored
//! running session starts ticking without an explicit start.

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::session::TimerSession;
use super::ticker::{Ticker, TICK_PERIOD};
use crate::error::Result;
use crate::events::Event;
use crate::storage::KvStore;

/// Wall-clock source.
pub type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct TimerDriver<K: KvStore> {
    session: TimerSession<K>,
    ticker: Option<Ticker>,
    period: Duration,
    clock: Clock,
}

impl<K: KvStore> TimerDriver<K> {
    /// Drive `session` with a one-second ticker and the system clock.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(session: TimerSession<K>) -> Self {
        Self::with_clock(session, TICK_PERIOD, Box::new(Utc::now))
    }

    pub fn with_clock(session: TimerSession<K>, period: Duration, clock: Clock) -> Self {
        let mut driver = Self {
            session,
            ticker: None,
            period,
            clock,
        };
        driver.sync_ticker();
        driver
    }

    pub fn session(&self) -> &TimerSession<K> {
        &self.session
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.session.elapsed_seconds_at(self.now())
    }

    pub fn snapshot(&self) -> Event {
        self.session.snapshot_at(self.now())
    }

    pub fn into_session(mut self) -> TimerSession<K> {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop();
        }
        self.session
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Result<Option<Event>> {
        let now = self.now();
        let result = self.session.start_at(now);
        self.sync_ticker();
        result
    }

    pub fn pause(&mut self) -> Result<Option<Event>> {
        let now = self.now();
        let result = self.session.pause_at(now);
        self.sync_ticker();
        result
    }

    pub fn reset(&mut self) -> Result<Event> {
        let now = self.now();
        let result = self.session.reset_at(now);
        self.sync_ticker();
        result
    }

    pub fn save_session(&mut self, note: &str) -> Result<Option<Event>> {
        let now = self.now();
        let result = self.session.save_session_at(now, note);
        self.sync_ticker();
        result
    }

    /// Wait for the next tick and apply it.
    ///
    /// Never completes while the session is not running, which makes it safe
    /// to use as a `tokio::select!` branch. Returns `None` for a tick the
    /// engine ignored.
    pub async fn next_tick(&mut self) -> Option<Event> {
        let Some(ticker) = self.ticker.as_mut() else {
            return std::future::pending().await;
        };
        ticker.tick().await?;
        let now = (self.clock)();
        self.session.tick_at(now)
    }

    fn sync_ticker(&mut self) {
        let running = self.session.engine().is_running();
        match (running, self.ticker.is_some()) {
            (true, false) => {
                self.ticker = Some(Ticker::spawn(self.period));
            }
            (false, true) => {
                if let Some(ticker) = self.ticker.take() {
                    ticker.stop();
                }
            }
            _ => {}
        }
    }
}
