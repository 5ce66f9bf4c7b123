use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerState;

/// Every timer state change produces an Event.
/// Front ends print or render them; nothing in the core stores them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        accumulated_seconds: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        accumulated_seconds: u64,
        at: DateTime<Utc>,
    },
    /// One second of running time was counted.
    TimerTicked {
        accumulated_seconds: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    /// Persisted state was reconciled with the wall clock on startup.
    TimerRestored {
        state: TimerState,
        accumulated_seconds: u64,
        /// Seconds that passed while no process was counting.
        recovered_seconds: u64,
        at: DateTime<Utc>,
    },
    SessionSaved {
        entry_id: String,
        duration_seconds: u64,
        saved_at_date: NaiveDate,
        at: DateTime<Utc>,
    },
    HistoryEntryDeleted {
        entry_id: String,
        at: DateTime<Utc>,
    },
    HistoryNoteEdited {
        entry_id: String,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        elapsed_seconds: u64,
        history_len: usize,
        at: DateTime<Utc>,
    },
}
