//! In-memory mutation operations on a [`Store`].
//!
//! Each operation leaves `order` dense (`0..N-1`). Persistence is the
//! caller's job; see [`HabitTracker`](super::HabitTracker).

use chrono::NaiveDate;

use super::{Habit, Store};
use crate::error::ValidationError;

impl Store {
    /// Flip `habit_id`'s completion on `date`. Returns the new membership.
    pub fn toggle_completion(&mut self, date: NaiveDate, habit_id: &str) -> bool {
        let done = self.completions.toggle(date, habit_id);
        self.normalize_order();
        done
    }

    /// Insert or replace a habit.
    ///
    /// A known id is replaced in place, keeping its position and its original
    /// `created_at`. An unknown id is appended at the end. The name is stored
    /// trimmed.
    pub fn save_habit(&mut self, mut habit: Habit) -> Result<(), ValidationError> {
        habit.validate()?;
        habit.name = habit.name.trim().to_string();

        match self.position(&habit.id) {
            Some(idx) => {
                let existing = &self.habits[idx];
                habit.created_at = existing.created_at;
                habit.order = existing.order;
                self.habits[idx] = habit;
            }
            None => {
                // Loaded orders may be gapped or colliding; densify first so
                // `len` is past every existing order.
                self.normalize_order();
                habit.order = self.habits.len() as u32;
                self.habits.push(habit);
            }
        }
        self.normalize_order();
        Ok(())
    }

    /// Remove a habit. Its ledger entries are kept.
    ///
    /// Returns `false` (and changes nothing) for an unknown id.
    pub fn delete_habit(&mut self, id: &str) -> bool {
        let Some(idx) = self.position(id) else {
            return false;
        };
        self.habits.remove(idx);
        self.normalize_order();
        true
    }

    /// Set the archived flag. Returns `false` for an unknown id.
    pub fn set_archived(&mut self, id: &str, archived: bool) -> bool {
        let Some(idx) = self.position(id) else {
            return false;
        };
        self.habits[idx].archived = archived;
        self.normalize_order();
        true
    }

    /// Move the habit at `from` to `to` (positions in `order` sequence).
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), ValidationError> {
        let len = self.habits.len();
        for index in [from, to] {
            if index >= len {
                return Err(ValidationError::OutOfBounds {
                    collection: "habits".into(),
                    index,
                    len,
                });
            }
        }
        self.normalize_order();
        let habit = self.habits.remove(from);
        self.habits.insert(to, habit);
        self.reindex();
        Ok(())
    }

    /// Mark every habit incomplete on `date`.
    pub fn clear_day(&mut self, date: NaiveDate) {
        self.completions.clear(date);
        self.normalize_order();
    }

    /// Sort by `order` (ties keep their current relative position), then
    /// rewrite `order` as the position.
    pub(crate) fn normalize_order(&mut self) {
        self.habits.sort_by_key(|h| h.order);
        self.reindex();
    }

    fn reindex(&mut self) {
        for (position, habit) in self.habits.iter_mut().enumerate() {
            habit.order = position as u32;
        }
    }
}
