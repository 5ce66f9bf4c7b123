//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based elapsed-time counter. It does not
//! use internal threads: a [`Ticker`](super::Ticker) (or any caller) invokes
//! `tick()` once per second while running.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running ...
//!   ^________________|__________|   (reset / save session)
//! ```
//!
//! While running, the true elapsed time is always
//! `accumulated_seconds + (now - run_start)`. Ticks move one second from the
//! second term into the first, so missed or late ticks never lose time, and
//! the same formula reconciles time that passed while no process was running.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// Persisted form of the timer.
///
/// `run_start_wall_clock` is present exactly when `is_running` is true.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerRecord {
    #[serde(default)]
    pub accumulated_seconds: u64,
    #[serde(default)]
    pub is_running: bool,
    #[serde(default)]
    pub run_start_wall_clock: Option<DateTime<Utc>>,
}

/// Core timer engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerEngine {
    accumulated_seconds: u64,
    /// Wall-clock anchor; `Some` exactly while running.
    run_start: Option<DateTime<Utc>>,
}

impl TimerEngine {
    /// Create an idle timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the engine from a persisted record, reconciling elapsed wall
    /// time if the record was running.
    ///
    /// Returns the engine and the number of seconds recovered. A running
    /// record without an anchor is repaired to paused. A wall clock that went
    /// backwards recovers nothing.
    pub fn restore_at(record: &TimerRecord, now: DateTime<Utc>) -> (Self, u64) {
        match (record.is_running, record.run_start_wall_clock) {
            (true, Some(anchor)) => {
                let mut engine = Self {
                    accumulated_seconds: record.accumulated_seconds,
                    run_start: Some(anchor),
                };
                if now < anchor {
                    tracing::warn!(%anchor, %now, "wall clock moved backwards, nothing recovered");
                }
                let recovered = engine.fold_at(now);
                (engine, recovered)
            }
            (true, None) => {
                tracing::warn!("running timer record without start time, restoring as paused");
                (
                    Self {
                        accumulated_seconds: record.accumulated_seconds,
                        run_start: None,
                    },
                    0,
                )
            }
            (false, _) => (
                Self {
                    accumulated_seconds: record.accumulated_seconds,
                    run_start: None,
                },
                0,
            ),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        match (self.run_start, self.accumulated_seconds) {
            (Some(_), _) => TimerState::Running,
            (None, 0) => TimerState::Idle,
            (None, _) => TimerState::Paused,
        }
    }

    pub fn is_running(&self) -> bool {
        self.run_start.is_some()
    }

    /// Seconds counted so far, excluding the part of the current run that has
    /// not been ticked or folded in yet.
    pub fn accumulated_seconds(&self) -> u64 {
        self.accumulated_seconds
    }

    pub fn run_start(&self) -> Option<DateTime<Utc>> {
        self.run_start
    }

    /// Total elapsed seconds as of `now`.
    pub fn elapsed_seconds_at(&self, now: DateTime<Utc>) -> u64 {
        self.accumulated_seconds + self.pending_seconds(now)
    }

    pub fn record(&self) -> TimerRecord {
        TimerRecord {
            accumulated_seconds: self.accumulated_seconds,
            is_running: self.run_start.is_some(),
            run_start_wall_clock: self.run_start,
        }
    }

    pub fn snapshot_at(&self, now: DateTime<Utc>, history_len: usize) -> Event {
        Event::StateSnapshot {
            state: self.state(),
            elapsed_seconds: self.elapsed_seconds_at(now),
            history_len,
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.run_start.is_some() {
            return None; // Already running.
        }
        self.run_start = Some(now);
        Some(Event::TimerStarted {
            accumulated_seconds: self.accumulated_seconds,
            at: now,
        })
    }

    pub fn pause_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.run_start.is_none() {
            return None;
        }
        self.fold_at(now);
        self.run_start = None;
        Some(Event::TimerPaused {
            accumulated_seconds: self.accumulated_seconds,
            at: now,
        })
    }

    pub fn reset_at(&mut self, now: DateTime<Utc>) -> Event {
        self.accumulated_seconds = 0;
        self.run_start = None;
        Event::TimerReset { at: now }
    }

    /// Count one second of running time.
    ///
    /// No effect unless running with at least one whole second since the
    /// anchor, so ticks that arrive late, early or after a pause are harmless.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let anchor = self.run_start?;
        if now - anchor < Duration::seconds(1) {
            return None;
        }
        self.accumulated_seconds += 1;
        self.run_start = Some(anchor + Duration::seconds(1));
        Some(Event::TimerTicked {
            accumulated_seconds: self.accumulated_seconds,
            at: now,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Whole seconds between the anchor and `now`, clamped at zero.
    fn pending_seconds(&self, now: DateTime<Utc>) -> u64 {
        self.run_start
            .map(|anchor| u64::try_from((now - anchor).num_seconds()).unwrap_or(0))
            .unwrap_or(0)
    }

    /// Move whole elapsed seconds into `accumulated_seconds`, keeping the
    /// sub-second remainder on the anchor. Returns the seconds moved.
    pub(crate) fn fold_at(&mut self, now: DateTime<Utc>) -> u64 {
        let Some(anchor) = self.run_start else {
            return 0;
        };
        if now < anchor {
            // Never decrement; re-anchor so later ticks measure from here.
            self.run_start = Some(now);
            return 0;
        }
        let whole = self.pending_seconds(now);
        self.accumulated_seconds += whole;
        self.run_start = Some(anchor + Duration::seconds(whole as i64));
        whole
    }
}
