//! Persisted store shape, load-with-migration and save.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{starter_habits, Habit};
use crate::error::StorageError;
use crate::storage::{KvStore, STORE_KEY};

/// Per-date set of completed habit ids.
///
/// Dates whose set would be empty are removed, so an absent date and an empty
/// date are the same thing. Ids of deleted habits stay in the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: BTreeMap<NaiveDate, BTreeSet<String>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `habit_id` is marked done on `date`.
    pub fn contains(&self, date: NaiveDate, habit_id: &str) -> bool {
        self.entries
            .get(&date)
            .is_some_and(|ids| ids.contains(habit_id))
    }

    /// Ids marked done on `date`, possibly including deleted habits.
    pub fn ids_on(&self, date: NaiveDate) -> impl Iterator<Item = &str> {
        self.entries
            .get(&date)
            .into_iter()
            .flat_map(|ids| ids.iter().map(String::as_str))
    }

    /// Flip membership of `habit_id` on `date`; returns the new membership.
    pub fn toggle(&mut self, date: NaiveDate, habit_id: &str) -> bool {
        let ids = self.entries.entry(date).or_default();
        let done = if ids.remove(habit_id) {
            false
        } else {
            ids.insert(habit_id.to_string());
            true
        };
        if ids.is_empty() {
            self.entries.remove(&date);
        }
        done
    }

    /// Drop every completion on `date`.
    pub fn clear(&mut self, date: NaiveDate) {
        self.entries.remove(&date);
    }

    /// Dates with at least one completion, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.entries.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn from_raw(raw: BTreeMap<NaiveDate, Vec<String>>) -> Self {
        let entries = raw
            .into_iter()
            .map(|(date, ids)| (date, ids.into_iter().collect::<BTreeSet<_>>()))
            .filter(|(_, ids)| !ids.is_empty())
            .collect();
        Self { entries }
    }
}

/// Habits plus the completion ledger; the unit of persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Store {
    /// Sorted by `order`.
    pub habits: Vec<Habit>,
    pub completions: Ledger,
}

impl Store {
    /// The default store handed out when nothing usable is persisted.
    pub fn seeded(today: NaiveDate, palette: &[String], with_starters: bool) -> Self {
        let habits = if with_starters {
            starter_habits(today, palette)
        } else {
            Vec::new()
        };
        Self {
            habits,
            completions: Ledger::new(),
        }
    }

    pub fn habit(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    pub(crate) fn position(&self, id: &str) -> Option<usize> {
        self.habits.iter().position(|h| h.id == id)
    }

    /// Whether `habit_id` is marked done on `date`.
    pub fn has_completion(&self, date: NaiveDate, habit_id: &str) -> bool {
        self.completions.contains(date, habit_id)
    }
}

/// On-disk habit record. Older records may lack `order` or `archived`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredHabit {
    id: String,
    name: String,
    #[serde(default)]
    color: String,
    #[serde(default)]
    icon: String,
    #[serde(default)]
    repeat_days: Vec<i64>,
    created_at: NaiveDate,
    #[serde(default)]
    order: Option<u32>,
    #[serde(default)]
    archived: bool,
}

#[derive(Deserialize)]
struct StoredStore {
    #[serde(default)]
    habits: Vec<StoredHabit>,
    #[serde(default)]
    completions: BTreeMap<NaiveDate, Vec<String>>,
}

impl StoredStore {
    fn migrate(self) -> Store {
        let mut habits: Vec<Habit> = self
            .habits
            .into_iter()
            .enumerate()
            .map(|(position, h)| Habit {
                id: h.id,
                name: h.name,
                color: h.color,
                icon: h.icon,
                repeat_days: h
                    .repeat_days
                    .into_iter()
                    .filter_map(|d| u8::try_from(d).ok().filter(|d| *d <= 6))
                    .collect(),
                created_at: h.created_at,
                // Explicit values win even when they collide; mutations
                // re-densify.
                order: h.order.unwrap_or(position as u32),
                archived: h.archived,
            })
            .collect();
        habits.sort_by_key(|h| h.order);
        Store {
            habits,
            completions: Ledger::from_raw(self.completions),
        }
    }
}

/// Parse a persisted store document.
pub(crate) fn decode(raw: &str) -> Result<Store, serde_json::Error> {
    serde_json::from_str::<StoredStore>(raw).map(StoredStore::migrate)
}

/// Load the habit store.
///
/// A missing, unreadable or corrupt record is not an error: the seeded
/// default store is returned instead.
pub fn load<K: KvStore + ?Sized>(
    kv: &K,
    today: NaiveDate,
    palette: &[String],
    with_starters: bool,
) -> Store {
    let raw = match kv.read(STORE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            tracing::debug!("no persisted habit store, seeding defaults");
            return Store::seeded(today, palette, with_starters);
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to read habit store, seeding defaults");
            return Store::seeded(today, palette, with_starters);
        }
    };

    match decode(&raw) {
        Ok(store) => {
            tracing::debug!(habits = store.habits.len(), "loaded habit store");
            store
        }
        Err(e) => {
            tracing::warn!(error = %e, "corrupt habit store, seeding defaults");
            Store::seeded(today, palette, with_starters)
        }
    }
}

/// Persist the whole store in a single write.
pub fn save<K: KvStore + ?Sized>(kv: &mut K, store: &Store) -> Result<(), StorageError> {
    let json = serde_json::to_string(store)
        .map_err(|e| StorageError::QueryFailed(format!("serialize habit store: {e}")))?;
    kv.write(STORE_KEY, &json)
}
