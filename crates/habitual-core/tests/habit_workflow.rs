//! Integration tests for the habit store on a SQLite database.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use habitual_core::calendar::{add_days, parse_date};
use habitual_core::habit::weekdays;
use habitual_core::storage::{HabitsConfig, STORE_KEY};
use habitual_core::{Calendar, CoreError, Database, HabitTracker, KvStore, ValidationError};
use tempfile::TempDir;

fn d(s: &str) -> NaiveDate {
    parse_date(s).unwrap()
}

fn empty_defaults() -> HabitsConfig {
    HabitsConfig {
        seed_starter: false,
        ..HabitsConfig::default()
    }
}

fn open(dir: &TempDir) -> HabitTracker<Database> {
    let db = Database::open_at(&dir.path().join("habitual.db")).unwrap();
    HabitTracker::open(db, Calendar::default(), empty_defaults())
}

fn add(tracker: &mut HabitTracker<Database>, name: &str, created: NaiveDate) -> String {
    let mut habit = tracker.create_draft();
    habit.name = name.to_string();
    habit.created_at = created;
    let id = habit.id.clone();
    tracker.save_habit(habit).unwrap();
    id
}

#[test]
fn test_mutations_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let mut tracker = open(&dir);
    let read = add(&mut tracker, "Read", d("2024-01-01"));
    let run = add(&mut tracker, "Run", d("2024-01-01"));

    for day in ["2024-01-08", "2024-01-09", "2024-01-10"] {
        tracker.toggle_completion(d(day), &read).unwrap();
    }
    tracker.toggle_completion(d("2024-01-10"), &run).unwrap();
    tracker.reorder(1, 0).unwrap();
    tracker.set_archived(&run, true).unwrap();
    drop(tracker);

    let tracker = open(&dir);
    let names: Vec<&str> = tracker.store().habits.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(names, ["Run", "Read"]);
    assert!(tracker.habit(&run).unwrap().archived);
    assert_eq!(tracker.streak(&read, d("2024-01-10")), Some(3));
    assert!(tracker.store().has_completion(d("2024-01-10"), &run));
}

#[test]
fn test_weekday_streak_skips_weekends() {
    let dir = TempDir::new().unwrap();
    let mut tracker = open(&dir);
    let id = add(&mut tracker, "Standup", d("2024-01-01"));
    let mut habit = tracker.habit(&id).unwrap().clone();
    habit.repeat_days = weekdays();
    tracker.save_habit(habit).unwrap();

    // Mon 2024-01-08 .. Fri 2024-01-12
    for offset in 0..5 {
        tracker
            .toggle_completion(add_days(d("2024-01-08"), offset), &id)
            .unwrap();
    }
    // Sunday: not due, walk continues back through the weekend.
    assert_eq!(tracker.streak(&id, d("2024-01-14")), Some(5));
    // Monday after, not yet done.
    assert_eq!(tracker.streak(&id, d("2024-01-15")), Some(0));
    tracker.toggle_completion(d("2024-01-15"), &id).unwrap();
    assert_eq!(tracker.streak(&id, d("2024-01-15")), Some(6));
}

#[test]
fn test_deleted_habit_leaves_views_consistent() {
    let dir = TempDir::new().unwrap();
    let mut tracker = open(&dir);
    let keep = add(&mut tracker, "Keep", d("2024-01-01"));
    let gone = add(&mut tracker, "Gone", d("2024-01-01"));
    tracker.toggle_completion(d("2024-01-03"), &gone).unwrap();
    tracker.toggle_completion(d("2024-01-03"), &keep).unwrap();

    assert!(tracker.delete_habit(&gone).unwrap());
    assert!(!tracker.delete_habit(&gone).unwrap());
    drop(tracker);

    let tracker = open(&dir);
    assert_eq!(tracker.streak(&gone, d("2024-01-03")), None);
    assert!(tracker.store().has_completion(d("2024-01-03"), &gone));
    let progress = tracker.day_progress(d("2024-01-03"));
    assert_eq!((progress.due, progress.completed, progress.percentage), (1, 1, 100));
    let orders: Vec<u32> = tracker.store().habits.iter().map(|h| h.order).collect();
    assert_eq!(orders, [0]);
}

#[test]
fn test_refused_mutations_leave_storage_untouched() {
    let dir = TempDir::new().unwrap();
    let mut tracker = open(&dir);
    add(&mut tracker, "Only", d("2024-01-01"));
    let before = tracker.into_inner().read(STORE_KEY).unwrap();

    let mut tracker = open(&dir);
    let mut blank = tracker.create_draft();
    blank.name = "   ".into();
    assert!(matches!(
        tracker.save_habit(blank),
        Err(CoreError::Validation(ValidationError::EmptyName))
    ));
    assert!(matches!(
        tracker.reorder(0, 5),
        Err(CoreError::Validation(ValidationError::OutOfBounds { .. }))
    ));
    assert_eq!(tracker.into_inner().read(STORE_KEY).unwrap(), before);
}

#[test]
fn test_legacy_record_is_migrated_on_load() {
    let dir = TempDir::new().unwrap();
    let mut db = Database::open_at(&dir.path().join("habitual.db")).unwrap();
    db.write(
        STORE_KEY,
        r#"{
            "habits": [
                {"id": "b", "name": "B", "color": "sky", "icon": "x",
                 "repeatDays": [0, 1, 9], "createdAt": "2024-01-01"},
                {"id": "a", "name": "A", "color": "amber", "icon": "y",
                 "repeatDays": [2], "createdAt": "2024-01-01"}
            ],
            "completions": {"2024-01-02": ["a"], "2024-01-03": []}
        }"#,
    )
    .unwrap();

    let tracker = HabitTracker::open(db, Calendar::default(), empty_defaults());
    let store = tracker.store();
    let ids: Vec<&str> = store.habits.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, ["b", "a"]);
    assert_eq!(store.habits[1].order, 1);
    assert!(!store.habits[0].archived);
    assert_eq!(store.habits[0].repeat_days, BTreeSet::from([0, 1]));
    assert_eq!(store.completions.dates().count(), 1);
}

#[test]
fn test_corrupt_record_seeds_starters() {
    let dir = TempDir::new().unwrap();
    let mut db = Database::open_at(&dir.path().join("habitual.db")).unwrap();
    db.write(STORE_KEY, "not json").unwrap();
    let tracker = HabitTracker::open(db, Calendar::default(), HabitsConfig::default());
    assert_eq!(tracker.store().habits.len(), 4);
    assert!(tracker.store().completions.is_empty());
}

#[test]
fn test_day_progress_counts_only_due_habits() {
    let dir = TempDir::new().unwrap();
    let mut tracker = open(&dir);
    let daily = add(&mut tracker, "Daily", d("2024-01-01"));
    let weekday = add(&mut tracker, "Weekday", d("2024-01-01"));
    let mut habit = tracker.habit(&weekday).unwrap().clone();
    habit.repeat_days = weekdays();
    tracker.save_habit(habit).unwrap();

    // Saturday: only the daily habit is due.
    let saturday = d("2024-01-13");
    tracker.toggle_completion(saturday, &weekday).unwrap();
    let progress = tracker.day_progress(saturday);
    assert_eq!((progress.due, progress.completed, progress.percentage), (1, 0, 0));

    tracker.toggle_completion(saturday, &daily).unwrap();
    assert_eq!(tracker.day_progress(saturday).percentage, 100);

    tracker.clear_day(saturday).unwrap();
    assert_eq!(tracker.day_progress(saturday).completed, 0);
}
