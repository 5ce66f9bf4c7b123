//! Saved timer sessions, most recent first, capped at [`HISTORY_LIMIT`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StorageError;
use crate::storage::{KvStore, TIMER_HISTORY_KEY};

/// Maximum number of sessions kept.
pub const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub duration_seconds: u64,
    pub saved_at_instant: DateTime<Utc>,
    pub saved_at_date: NaiveDate,
    #[serde(default)]
    pub note: String,
}

impl HistoryEntry {
    pub fn new(
        duration_seconds: u64,
        saved_at_instant: DateTime<Utc>,
        saved_at_date: NaiveDate,
        note: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            duration_seconds,
            saved_at_instant,
            saved_at_date,
            note,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerHistory {
    entries: Vec<HistoryEntry>,
}

impl TimerHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `kv`. Missing or corrupt history reads as empty.
    pub fn load<K: KvStore + ?Sized>(kv: &K) -> Self {
        let raw = match kv.read(TIMER_HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read timer history, starting empty");
                return Self::new();
            }
        };
        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(mut entries) => {
                entries.retain(|e| e.duration_seconds > 0);
                entries.truncate(HISTORY_LIMIT);
                Self { entries }
            }
            Err(e) => {
                tracing::warn!(error = %e, "corrupt timer history, starting empty");
                Self::new()
            }
        }
    }

    pub fn save<K: KvStore + ?Sized>(&self, kv: &mut K) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.entries)
            .map_err(|e| StorageError::QueryFailed(format!("serialize timer history: {e}")))?;
        kv.write(TIMER_HISTORY_KEY, &json)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prepend `entry`, dropping whatever falls past the limit.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_LIMIT);
    }

    /// Remove the entry with `id`. Returns whether one was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Replace the note of entry `id`, nothing else.
    pub fn set_note(&mut self, id: &str, note: &str) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.note = note.to_string();
                true
            }
            None => false,
        }
    }
}
