//! Read-side views over a [`Store`].
//!
//! Everything here is recomputed from the store on each call and never
//! written back, so a view can't go stale after a mutation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{month_range, Calendar};
use crate::habit::{Habit, Store};

/// Completion numbers for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayProgress {
    pub date: NaiveDate,
    /// Habits due that day.
    pub due: usize,
    /// Due habits marked done.
    pub completed: usize,
    /// `completed / due` as a rounded percentage, 0 when nothing is due.
    pub percentage: u8,
}

/// Which days a calendar view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibleWindow {
    /// The month containing the date.
    Month(NaiveDate),
    /// The week containing the date, starting on the calendar's week start.
    Week(NaiveDate),
}

/// Habits due on `date`, in display order.
pub fn due_on(store: &Store, date: NaiveDate) -> Vec<&Habit> {
    store
        .habits
        .iter()
        .filter(|h| h.is_scheduled(date))
        .collect()
}

/// Habits that are not archived, in display order.
pub fn active_habits(store: &Store) -> Vec<&Habit> {
    store.habits.iter().filter(|h| !h.archived).collect()
}

/// Due/completed counts for `date`.
///
/// Ledger entries for deleted habits and for habits not due that day are
/// ignored.
pub fn day_progress(store: &Store, date: NaiveDate) -> DayProgress {
    let due = due_on(store, date);
    let completed = due
        .iter()
        .filter(|h| store.has_completion(date, &h.id))
        .count();
    let percentage = if due.is_empty() {
        0
    } else {
        ((completed as f64 / due.len() as f64) * 100.0).round() as u8
    };
    DayProgress {
        date,
        due: due.len(),
        completed,
        percentage,
    }
}

/// The dates a month or week view shows, in order.
pub fn visible_days(window: VisibleWindow, calendar: &Calendar) -> Vec<NaiveDate> {
    match window {
        VisibleWindow::Month(date) => month_range(date),
        VisibleWindow::Week(date) => calendar.week_range(date),
    }
}
