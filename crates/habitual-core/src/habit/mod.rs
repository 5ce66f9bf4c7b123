//! Habits, the completion ledger and everything computed from them.
//!
//! - [`Habit`] and the scheduling predicate live here.
//! - [`Store`] is the persisted unit (habits + [`Ledger`]); `store` handles
//!   load-with-migration and save, `ops` the mutation operations.
//! - [`HabitTracker`] binds a store to a [`KvStore`](crate::storage::KvStore)
//!   so that every mutation is immediately persisted.
//! - `streak` holds the backward streak walk.

mod ops;
mod store;
mod streak;
mod tracker;

pub use store::{load, save, Ledger, Store};
pub use streak::{longest_streak, streak, STREAK_LIMIT};
pub use tracker::HabitTracker;

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::weekday_index;
use crate::error::ValidationError;

/// A recurring habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub color: String,
    pub icon: String,
    /// Weekdays the habit is due, 0 = Sunday .. 6 = Saturday.
    pub repeat_days: BTreeSet<u8>,
    pub created_at: NaiveDate,
    pub order: u32,
    #[serde(default)]
    pub archived: bool,
}

impl Habit {
    /// A new unsaved habit: empty name, due every day.
    pub fn draft(color: String, icon: String, created_at: NaiveDate, order: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: String::new(),
            color,
            icon,
            repeat_days: every_day(),
            created_at,
            order,
            archived: false,
        }
    }

    /// Whether the habit is due on `date`.
    ///
    /// Archived habits are never due.
    pub fn is_scheduled(&self, date: NaiveDate) -> bool {
        !self.archived && self.repeat_days.contains(&weekday_index(date))
    }

    /// Check the fields a save must not accept.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if let Some(&day) = self.repeat_days.iter().find(|&&d| d > 6) {
            return Err(ValidationError::InvalidWeekday(day));
        }
        Ok(())
    }
}

/// Scheduling predicate: is `habit` due on `date`.
pub fn is_scheduled(habit: &Habit, date: NaiveDate) -> bool {
    habit.is_scheduled(date)
}

/// All seven weekdays.
pub fn every_day() -> BTreeSet<u8> {
    (0..=6).collect()
}

/// Monday through Friday.
pub fn weekdays() -> BTreeSet<u8> {
    (1..=5).collect()
}

/// Pick a color for a new habit.
///
/// The first palette color no existing habit uses, otherwise the palette
/// cycled by habit count.
pub fn pick_color<'a, I>(palette: &[String], existing: I) -> String
where
    I: IntoIterator<Item = &'a Habit>,
{
    let used: Vec<&str> = existing.into_iter().map(|h| h.color.as_str()).collect();
    if palette.is_empty() {
        return String::new();
    }
    palette
        .iter()
        .find(|c| !used.contains(&c.as_str()))
        .unwrap_or(&palette[used.len() % palette.len()])
        .clone()
}

/// The habits a fresh store starts with.
pub fn starter_habits(today: NaiveDate, palette: &[String]) -> Vec<Habit> {
    const STARTERS: [(&str, &str); 4] = [
        ("Drink water", "💧"),
        ("Read", "📖"),
        ("Exercise", "🏃"),
        ("Meditate", "🧘"),
    ];

    let mut habits: Vec<Habit> = Vec::with_capacity(STARTERS.len());
    for (order, (name, icon)) in STARTERS.iter().enumerate() {
        let color = pick_color(palette, habits.iter());
        let mut habit = Habit::draft(color, (*icon).to_string(), today, order as u32);
        habit.name = (*name).to_string();
        habits.push(habit);
    }
    habits
}
