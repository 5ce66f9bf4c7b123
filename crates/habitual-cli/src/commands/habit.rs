//! Habit management commands for CLI.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use clap::Subcommand;
use habitual_core::habit::{every_day, weekdays};
use habitual_core::storage::Database;
use habitual_core::{Habit, HabitTracker};
use serde::Serialize;

use super::{open_tracker, parse_date_arg, print_json, CliResult};

#[derive(Subcommand)]
pub enum HabitAction {
    /// List habits in display order
    List {
        /// Include archived habits
        #[arg(long)]
        all: bool,
    },
    /// Create a new habit
    Add {
        /// Habit name
        name: String,
        /// Icon (emoji or short text)
        #[arg(long)]
        icon: Option<String>,
        /// Color token (default: first unused palette color)
        #[arg(long)]
        color: Option<String>,
        /// Repeat days: "daily", "weekdays", "weekends" or a list like "mon,wed,fri" / "1,3,5"
        #[arg(long, value_parser = parse_repeat_days)]
        days: Option<BTreeSet<u8>>,
    },
    /// Update a habit
    Edit {
        /// Habit ID (or unique prefix)
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New icon
        #[arg(long)]
        icon: Option<String>,
        /// New color token
        #[arg(long)]
        color: Option<String>,
        /// New repeat days
        #[arg(long, value_parser = parse_repeat_days)]
        days: Option<BTreeSet<u8>>,
    },
    /// Delete a habit (its past completions are kept)
    Delete {
        /// Habit ID (or unique prefix)
        id: String,
    },
    /// Hide a habit from due lists without deleting it
    Archive {
        /// Habit ID (or unique prefix)
        id: String,
    },
    /// Restore an archived habit
    Unarchive {
        /// Habit ID (or unique prefix)
        id: String,
    },
    /// Move a habit from one position to another
    Move {
        /// Current position (0-based)
        from: usize,
        /// New position (0-based)
        to: usize,
    },
    /// Toggle completion of a habit on a day
    Done {
        /// Habit ID (or unique prefix)
        id: String,
        /// Date (YYYY-MM-DD, default: today)
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },
    /// Remove every completion recorded on a day
    Clear {
        /// Date (YYYY-MM-DD, default: today)
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },
    /// Current and longest streak of a habit
    Streak {
        /// Habit ID (or unique prefix)
        id: String,
        /// Date to count back from (YYYY-MM-DD, default: today)
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HabitRow<'a> {
    #[serde(flatten)]
    habit: &'a Habit,
    due_today: bool,
    done_today: bool,
    streak: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StreakReport<'a> {
    habit_id: &'a str,
    date: NaiveDate,
    current: u32,
    longest: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToggleReport<'a> {
    habit_id: &'a str,
    date: NaiveDate,
    done: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangeReport<'a> {
    habit_id: &'a str,
    changed: bool,
}

pub fn run(action: HabitAction) -> CliResult {
    let mut tracker = open_tracker()?;
    let today = tracker.calendar().today();

    match action {
        HabitAction::List { all } => {
            let store = tracker.store();
            let rows: Vec<HabitRow> = store
                .habits
                .iter()
                .filter(|h| all || !h.archived)
                .map(|habit| HabitRow {
                    habit,
                    due_today: habit.is_scheduled(today),
                    done_today: store.has_completion(today, &habit.id),
                    streak: tracker.streak(&habit.id, today).unwrap_or(0),
                })
                .collect();
            print_json(&rows)?;
        }
        HabitAction::Add {
            name,
            icon,
            color,
            days,
        } => {
            let mut habit = tracker.create_draft();
            habit.name = name;
            if let Some(icon) = icon {
                habit.icon = icon;
            }
            if let Some(color) = color {
                habit.color = color;
            }
            if let Some(days) = days {
                habit.repeat_days = days;
            }
            let id = habit.id.clone();
            tracker.save_habit(habit)?;
            print_json(&tracker.habit(&id))?;
        }
        HabitAction::Edit {
            id,
            name,
            icon,
            color,
            days,
        } => {
            let id = resolve_id(&tracker, &id)?;
            let mut habit = tracker
                .habit(&id)
                .cloned()
                .ok_or_else(|| format!("habit not found: {id}"))?;
            if let Some(name) = name {
                habit.name = name;
            }
            if let Some(icon) = icon {
                habit.icon = icon;
            }
            if let Some(color) = color {
                habit.color = color;
            }
            if let Some(days) = days {
                habit.repeat_days = days;
            }
            tracker.save_habit(habit)?;
            print_json(&tracker.habit(&id))?;
        }
        HabitAction::Delete { id } => {
            let id = resolve_id(&tracker, &id)?;
            let deleted = tracker.delete_habit(&id)?;
            print_json(&ChangeReport { habit_id: &id, changed: deleted })?;
        }
        HabitAction::Archive { id } => {
            let id = resolve_id(&tracker, &id)?;
            tracker.set_archived(&id, true)?;
            print_json(&tracker.habit(&id))?;
        }
        HabitAction::Unarchive { id } => {
            let id = resolve_id(&tracker, &id)?;
            tracker.set_archived(&id, false)?;
            print_json(&tracker.habit(&id))?;
        }
        HabitAction::Move { from, to } => {
            tracker.reorder(from, to)?;
            let names: Vec<&str> = tracker.store().habits.iter().map(|h| h.name.as_str()).collect();
            print_json(&names)?;
        }
        HabitAction::Done { id, date } => {
            let id = resolve_id(&tracker, &id)?;
            let date = date.unwrap_or(today);
            let done = tracker.toggle_completion(date, &id)?;
            print_json(&ToggleReport {
                habit_id: &id,
                date,
                done,
            })?;
        }
        HabitAction::Clear { date } => {
            let date = date.unwrap_or(today);
            tracker.clear_day(date)?;
            print_json(&tracker.day_progress(date))?;
        }
        HabitAction::Streak { id, date } => {
            let id = resolve_id(&tracker, &id)?;
            let date = date.unwrap_or(today);
            let current = tracker.streak(&id, date).unwrap_or(0);
            let longest = tracker.longest_streak(&id, date).unwrap_or(0);
            print_json(&StreakReport {
                habit_id: &id,
                date,
                current,
                longest,
            })?;
        }
    }
    Ok(())
}

/// Resolve a full habit id or an unambiguous prefix of one.
fn resolve_id(tracker: &HabitTracker<Database>, needle: &str) -> Result<String, String> {
    if tracker.habit(needle).is_some() {
        return Ok(needle.to_string());
    }
    let matches: Vec<&Habit> = tracker
        .store()
        .habits
        .iter()
        .filter(|h| h.id.starts_with(needle))
        .collect();
    match matches.as_slice() {
        [one] => Ok(one.id.clone()),
        [] => Err(format!("habit not found: {needle}")),
        _ => Err(format!("ambiguous habit id prefix: {needle}")),
    }
}

/// Parse a repeat-day spec into weekday indices (0 = Sunday).
fn parse_repeat_days(s: &str) -> Result<BTreeSet<u8>, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "daily" | "every" => return Ok(every_day()),
        "weekdays" => return Ok(weekdays()),
        "weekends" => return Ok(BTreeSet::from([0, 6])),
        _ => {}
    }

    let mut days = BTreeSet::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let day = match part.to_ascii_lowercase().as_str() {
            "sun" | "sunday" => 0,
            "mon" | "monday" => 1,
            "tue" | "tuesday" => 2,
            "wed" | "wednesday" => 3,
            "thu" | "thursday" => 4,
            "fri" | "friday" => 5,
            "sat" | "saturday" => 6,
            other => match other.parse::<u8>() {
                Ok(n) if n <= 6 => n,
                _ => return Err(format!("invalid weekday '{part}'")),
            },
        };
        days.insert(day);
    }
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_day_keywords() {
        assert_eq!(parse_repeat_days("daily").unwrap().len(), 7);
        assert_eq!(parse_repeat_days("Weekdays").unwrap(), weekdays());
        assert_eq!(parse_repeat_days("weekends").unwrap(), BTreeSet::from([0, 6]));
    }

    #[test]
    fn repeat_day_lists() {
        assert_eq!(
            parse_repeat_days("mon, wed,fri").unwrap(),
            BTreeSet::from([1, 3, 5])
        );
        assert_eq!(parse_repeat_days("0,6,6").unwrap(), BTreeSet::from([0, 6]));
        assert!(parse_repeat_days("7").is_err());
        assert!(parse_repeat_days("funday").is_err());
        assert!(parse_repeat_days("").unwrap().is_empty());
    }
}
