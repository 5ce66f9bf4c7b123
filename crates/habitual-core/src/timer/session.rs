//! Timer engine plus history, bound to a storage port.
//!
//! Start and pause write the timer record and reset erases it. Saving a
//! session writes the history and then resets. In-memory state only changes
//! after the matching write succeeded. Ticks are not written: the persisted
//! `(accumulated, anchor)` pair already describes the same total.

use chrono::{DateTime, Utc};

use super::engine::{TimerEngine, TimerRecord, TimerState};
use super::history::{HistoryEntry, TimerHistory};
use crate::calendar::Calendar;
use crate::error::{Result, StorageError};
use crate::events::Event;
use crate::storage::{KvStore, TIMER_KEY};

pub struct TimerSession<K: KvStore> {
    kv: K,
    engine: TimerEngine,
    history: TimerHistory,
    calendar: Calendar,
}

impl<K: KvStore> TimerSession<K> {
    /// Restore timer state and history from `kv` as of now.
    pub fn open(kv: K, calendar: Calendar) -> (Self, Event) {
        Self::open_at(kv, calendar, Utc::now())
    }

    /// Restore as of `now`.
    ///
    /// A running record is reconciled with the wall clock. Missing or corrupt
    /// records restore as idle.
    pub fn open_at(kv: K, calendar: Calendar, now: DateTime<Utc>) -> (Self, Event) {
        let record = load_record(&kv);
        let (engine, recovered_seconds) = TimerEngine::restore_at(&record, now);
        let history = TimerHistory::load(&kv);
        if recovered_seconds > 0 {
            tracing::info!(recovered_seconds, "reconciled running timer after restart");
        }
        let event = Event::TimerRestored {
            state: engine.state(),
            accumulated_seconds: engine.accumulated_seconds(),
            recovered_seconds,
            at: now,
        };
        (
            Self {
                kv,
                engine,
                history,
                calendar,
            },
            event,
        )
    }

    pub fn state(&self) -> TimerState {
        self.engine.state()
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn elapsed_seconds_at(&self, now: DateTime<Utc>) -> u64 {
        self.engine.elapsed_seconds_at(now)
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.history.entries()
    }

    pub fn snapshot_at(&self, now: DateTime<Utc>) -> Event {
        self.engine.snapshot_at(now, self.history.len())
    }

    pub fn into_inner(self) -> K {
        self.kv
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start_at(&mut self, now: DateTime<Utc>) -> Result<Option<Event>> {
        let mut next = self.engine.clone();
        let Some(event) = next.start_at(now) else {
            return Ok(None);
        };
        self.commit_engine(next)?;
        tracing::info!(accumulated = self.engine.accumulated_seconds(), "timer started");
        Ok(Some(event))
    }

    pub fn pause_at(&mut self, now: DateTime<Utc>) -> Result<Option<Event>> {
        let mut next = self.engine.clone();
        let Some(event) = next.pause_at(now) else {
            return Ok(None);
        };
        self.commit_engine(next)?;
        tracing::info!(accumulated = self.engine.accumulated_seconds(), "timer paused");
        Ok(Some(event))
    }

    pub fn reset_at(&mut self, now: DateTime<Utc>) -> Result<Event> {
        self.kv.remove(TIMER_KEY)?;
        let event = self.engine.reset_at(now);
        tracing::info!("timer reset");
        Ok(event)
    }

    /// Count one second while running. Not persisted.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.engine.tick_at(now)
    }

    /// Record the counted time as a history entry and reset.
    ///
    /// No-op returning `None` when nothing has been counted. If the history
    /// write fails nothing changes. Once it succeeds the in-memory timer is
    /// reset even when erasing the stored record fails, so a retry cannot
    /// record the same time twice.
    pub fn save_session_at(&mut self, now: DateTime<Utc>, note: &str) -> Result<Option<Event>> {
        let mut folded = self.engine.clone();
        folded.fold_at(now);
        let duration_seconds = folded.accumulated_seconds();
        if duration_seconds == 0 {
            return Ok(None);
        }

        let entry = HistoryEntry::new(
            duration_seconds,
            now,
            self.calendar.today_at(now),
            note.trim().to_string(),
        );
        let event = Event::SessionSaved {
            entry_id: entry.id.clone(),
            duration_seconds,
            saved_at_date: entry.saved_at_date,
            at: now,
        };
        let mut history = self.history.clone();
        history.push(entry);
        history.save(&mut self.kv)?;
        self.history = history;

        let erased = self.kv.remove(TIMER_KEY);
        self.engine.reset_at(now);
        if let Err(e) = erased {
            tracing::warn!(error = %e, "session saved but timer record not erased");
            return Err(e.into());
        }
        tracing::info!(duration_seconds, "timer session saved");
        Ok(Some(event))
    }

    pub fn delete_entry_at(&mut self, id: &str, now: DateTime<Utc>) -> Result<Option<Event>> {
        let mut history = self.history.clone();
        if !history.delete(id) {
            return Ok(None);
        }
        history.save(&mut self.kv)?;
        self.history = history;
        Ok(Some(Event::HistoryEntryDeleted {
            entry_id: id.to_string(),
            at: now,
        }))
    }

    pub fn set_note_at(&mut self, id: &str, note: &str, now: DateTime<Utc>) -> Result<Option<Event>> {
        let mut history = self.history.clone();
        if !history.set_note(id, note) {
            return Ok(None);
        }
        history.save(&mut self.kv)?;
        self.history = history;
        Ok(Some(Event::HistoryNoteEdited {
            entry_id: id.to_string(),
            at: now,
        }))
    }

    // ── Wall-clock conveniences ──────────────────────────────────────

    pub fn start(&mut self) -> Result<Option<Event>> {
        self.start_at(Utc::now())
    }

    pub fn pause(&mut self) -> Result<Option<Event>> {
        self.pause_at(Utc::now())
    }

    pub fn reset(&mut self) -> Result<Event> {
        self.reset_at(Utc::now())
    }

    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(Utc::now())
    }

    pub fn save_session(&mut self, note: &str) -> Result<Option<Event>> {
        self.save_session_at(Utc::now(), note)
    }

    pub fn delete_entry(&mut self, id: &str) -> Result<Option<Event>> {
        self.delete_entry_at(id, Utc::now())
    }

    pub fn set_note(&mut self, id: &str, note: &str) -> Result<Option<Event>> {
        self.set_note_at(id, note, Utc::now())
    }

    /// Persist `next` and adopt it only once the write succeeded.
    fn commit_engine(&mut self, next: TimerEngine) -> Result<(), StorageError> {
        let json = serde_json::to_string(&next.record())
            .map_err(|e| StorageError::QueryFailed(format!("serialize timer record: {e}")))?;
        self.kv.write(TIMER_KEY, &json)?;
        self.engine = next;
        Ok(())
    }
}

fn load_record<K: KvStore + ?Sized>(kv: &K) -> TimerRecord {
    match kv.read(TIMER_KEY) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "corrupt timer record, restoring idle");
            TimerRecord::default()
        }),
        Ok(None) => TimerRecord::default(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read timer record, restoring idle");
            TimerRecord::default()
        }
    }
}
