//! A habit store bound to its storage port.
//!
//! Every mutation is applied to a copy of the [`Store`], written back in full,
//! and only then adopted, so a later `load` always sees a complete snapshot
//! and a failed write leaves the tracker as it was.

use chrono::NaiveDate;

use super::{load, longest_streak, pick_color, save, streak, Habit, Store};
use crate::calendar::Calendar;
use crate::error::{Result, ValidationError};
use crate::storage::{HabitsConfig, KvStore, STORE_KEY};
use crate::views::{self, DayProgress, VisibleWindow};

pub struct HabitTracker<K: KvStore> {
    kv: K,
    store: Store,
    calendar: Calendar,
    defaults: HabitsConfig,
}

impl<K: KvStore> HabitTracker<K> {
    /// Load the store from `kv`, seeding defaults if nothing usable is there.
    ///
    /// Freshly seeded starter habits are written back right away so their ids
    /// stay stable across opens.
    pub fn open(kv: K, calendar: Calendar, defaults: HabitsConfig) -> Self {
        let first_run = matches!(kv.read(STORE_KEY), Ok(None));
        let store = load(
            &kv,
            calendar.today(),
            &defaults.palette,
            defaults.seed_starter,
        );
        let mut tracker = Self {
            kv,
            store,
            calendar,
            defaults,
        };
        if first_run && !tracker.store.habits.is_empty() {
            if let Err(e) = tracker.persist() {
                tracing::warn!(error = %e, "failed to persist seeded habit store");
            }
        }
        tracker
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn habit(&self, id: &str) -> Option<&Habit> {
        self.store.habit(id)
    }

    /// Give back the storage port.
    pub fn into_inner(self) -> K {
        self.kv
    }

    fn persist(&mut self) -> Result<()> {
        save(&mut self.kv, &self.store)?;
        Ok(())
    }

    /// Run `op` on a copy of the store, write the copy, then adopt it.
    ///
    /// The in-memory store only changes once the write has succeeded, so a
    /// failed call can be retried without applying the mutation twice.
    fn apply<T, F>(&mut self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Store) -> Result<T, ValidationError>,
    {
        let mut next = self.store.clone();
        let out = op(&mut next)?;
        save(&mut self.kv, &next)?;
        self.store = next;
        Ok(out)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Flip a completion and persist. Returns the new membership.
    pub fn toggle_completion(&mut self, date: NaiveDate, habit_id: &str) -> Result<bool> {
        let done = self.apply(|store| Ok(store.toggle_completion(date, habit_id)))?;
        tracing::info!(%date, habit_id, done, "toggled completion");
        Ok(done)
    }

    /// A new unsaved habit. Nothing is stored until [`save_habit`](Self::save_habit).
    pub fn create_draft(&self) -> Habit {
        Habit::draft(
            pick_color(&self.defaults.palette, self.store.habits.iter()),
            self.defaults.default_icon.clone(),
            self.calendar.today(),
            self.store.habits.len() as u32,
        )
    }

    /// Validate, insert or replace, persist.
    pub fn save_habit(&mut self, habit: Habit) -> Result<()> {
        let id = habit.id.clone();
        self.apply(|store| store.save_habit(habit))?;
        tracing::info!(habit_id = %id, "saved habit");
        Ok(())
    }

    /// Delete and persist. Unknown ids are a no-op returning `false`.
    pub fn delete_habit(&mut self, id: &str) -> Result<bool> {
        if self.store.habit(id).is_none() {
            tracing::debug!(habit_id = id, "delete of unknown habit ignored");
            return Ok(false);
        }
        self.apply(|store| Ok(store.delete_habit(id)))?;
        tracing::info!(habit_id = id, "deleted habit");
        Ok(true)
    }

    /// Archive or restore and persist. Unknown ids are a no-op returning `false`.
    pub fn set_archived(&mut self, id: &str, archived: bool) -> Result<bool> {
        if self.store.habit(id).is_none() {
            tracing::debug!(habit_id = id, "archive of unknown habit ignored");
            return Ok(false);
        }
        self.apply(|store| Ok(store.set_archived(id, archived)))?;
        tracing::info!(habit_id = id, archived, "set archived");
        Ok(true)
    }

    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        self.apply(|store| store.reorder(from, to))?;
        tracing::info!(from, to, "reordered habits");
        Ok(())
    }

    pub fn clear_day(&mut self, date: NaiveDate) -> Result<()> {
        self.apply(|store| {
            store.clear_day(date);
            Ok(())
        })?;
        tracing::info!(%date, "cleared day");
        Ok(())
    }

    // ── Derived views ────────────────────────────────────────────────

    pub fn due_today(&self) -> Vec<&Habit> {
        views::due_on(&self.store, self.calendar.today())
    }

    pub fn due_on(&self, date: NaiveDate) -> Vec<&Habit> {
        views::due_on(&self.store, date)
    }

    pub fn day_progress(&self, date: NaiveDate) -> DayProgress {
        views::day_progress(&self.store, date)
    }

    /// Current streak of habit `id` as of `date`; `None` for unknown ids.
    pub fn streak(&self, id: &str, date: NaiveDate) -> Option<u32> {
        self.store.habit(id).map(|h| streak(&self.store, h, date))
    }

    pub fn longest_streak(&self, id: &str, through: NaiveDate) -> Option<u32> {
        self.store
            .habit(id)
            .map(|h| longest_streak(&self.store, h, through))
    }

    pub fn visible_days(&self, window: VisibleWindow) -> Vec<NaiveDate> {
        views::visible_days(window, &self.calendar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, ValidationError};
    use crate::storage::MemoryKv;

    fn tracker(kv: MemoryKv) -> HabitTracker<MemoryKv> {
        let defaults = HabitsConfig {
            seed_starter: false,
            ..HabitsConfig::default()
        };
        HabitTracker::open(kv, Calendar::default(), defaults)
    }

    #[test]
    fn draft_is_not_persisted_until_saved() {
        let mut t = tracker(MemoryKv::new());
        let mut draft = t.create_draft();
        assert_eq!(draft.order, 0);
        assert!(t.store().habits.is_empty());
        assert!(!t.kv.contains_key(STORE_KEY));

        draft.name = "Walk".into();
        t.save_habit(draft.clone()).unwrap();
        let reopened = tracker(t.into_inner());
        assert_eq!(reopened.habit(&draft.id).unwrap().name, "Walk");
    }

    #[test]
    fn seeded_starters_keep_their_ids() {
        let t = HabitTracker::open(MemoryKv::new(), Calendar::default(), HabitsConfig::default());
        let ids: Vec<String> = t.store().habits.iter().map(|h| h.id.clone()).collect();
        assert_eq!(ids.len(), 4);
        let reopened = HabitTracker::open(t.into_inner(), Calendar::default(), HabitsConfig::default());
        let again: Vec<String> = reopened.store().habits.iter().map(|h| h.id.clone()).collect();
        assert_eq!(ids, again);
    }

    #[test]
    fn drafts_get_distinct_colors() {
        let mut t = tracker(MemoryKv::new());
        let mut first = t.create_draft();
        first.name = "One".into();
        t.save_habit(first.clone()).unwrap();
        let second = t.create_draft();
        assert_ne!(first.color, second.color);
        assert_eq!(second.order, 1);
    }

    #[test]
    fn rejected_save_writes_nothing() {
        let mut t = tracker(MemoryKv::new());
        let draft = t.create_draft();
        let err = t.save_habit(draft).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::EmptyName)
        ));
        assert!(!t.kv.contains_key(STORE_KEY));
    }

    #[test]
    fn every_mutation_is_persisted() {
        let mut t = tracker(MemoryKv::new());
        for name in ["A", "B", "C"] {
            let mut h = t.create_draft();
            h.name = name.into();
            t.save_habit(h).unwrap();
        }
        let date = t.calendar().today();
        let a = t.store().habits[0].id.clone();
        t.toggle_completion(date, &a).unwrap();
        t.reorder(0, 2).unwrap();
        t.set_archived(&a, true).unwrap();

        let reopened = tracker(t.into_inner());
        let names: Vec<&str> = reopened
            .store()
            .habits
            .iter()
            .map(|h| h.name.as_str())
            .collect();
        assert_eq!(names, vec!["B", "C", "A"]);
        assert!(reopened.habit(&a).unwrap().archived);
        assert!(reopened.store().has_completion(date, &a));
    }

    #[test]
    fn unknown_ids_are_noops() {
        let mut t = tracker(MemoryKv::new());
        assert!(!t.delete_habit("ghost").unwrap());
        assert!(!t.set_archived("ghost", true).unwrap());
        assert_eq!(t.streak("ghost", t.calendar().today()), None);
    }

    #[test]
    fn failed_write_leaves_store_unchanged() {
        use crate::storage::memory::FlakyKv;

        let defaults = HabitsConfig {
            seed_starter: false,
            ..HabitsConfig::default()
        };
        let mut t = HabitTracker::open(FlakyKv::default(), Calendar::default(), defaults);
        let mut h = t.create_draft();
        h.name = "Walk".into();
        let id = h.id.clone();
        t.save_habit(h).unwrap();
        let date = t.calendar().today();
        let before = t.store().clone();

        t.kv.fail_writes = true;
        assert!(matches!(
            t.toggle_completion(date, &id),
            Err(CoreError::Storage(_))
        ));
        assert!(t.delete_habit(&id).is_err());
        let mut extra = t.create_draft();
        extra.name = "Run".into();
        assert!(t.save_habit(extra).is_err());
        assert_eq!(t.store(), &before);

        // Retrying once storage recovers applies the toggle exactly once.
        t.kv.fail_writes = false;
        assert!(t.toggle_completion(date, &id).unwrap());
        assert!(t.store().has_completion(date, &id));
    }

    #[test]
    fn saved_habit_lands_after_gapped_loaded_orders() {
        let mut kv = MemoryKv::new();
        kv.write(
            STORE_KEY,
            r#"{"habits":[
                {"id":"a","name":"A","color":"c","icon":"i","repeatDays":[0],"createdAt":"2024-01-01","order":0},
                {"id":"b","name":"B","color":"c","icon":"i","repeatDays":[0],"createdAt":"2024-01-01","order":0},
                {"id":"c","name":"C","color":"c","icon":"i","repeatDays":[0],"createdAt":"2024-01-01","order":7}
            ],"completions":{}}"#,
        )
        .unwrap();
        let mut t = tracker(kv);
        let mut h = t.create_draft();
        h.name = "New".into();
        t.save_habit(h).unwrap();
        let names: Vec<&str> = t.store().habits.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C", "New"]);
    }
}
