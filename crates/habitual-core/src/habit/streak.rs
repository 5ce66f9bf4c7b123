//! Streak computation.
//!
//! Only days on which a habit is due count. Days it is not due are
//! transparent: they neither extend nor break a streak.

use chrono::NaiveDate;

use super::{Habit, Store};

/// Walks stop once the count exceeds this (about ten years of days).
pub const STREAK_LIMIT: u32 = 3650;

/// Current streak of `habit` as of `from`.
///
/// Walks backward one day at a time from `from`. A due and completed day
/// counts; a due and missed day ends the walk; other days are skipped. The
/// first day before `created_at` is still evaluated, then the walk stops.
pub fn streak(store: &Store, habit: &Habit, from: NaiveDate) -> u32 {
    let mut count = 0u32;
    let mut day = from;

    loop {
        if habit.is_scheduled(day) {
            if store.has_completion(day, &habit.id) {
                count += 1;
            } else {
                break;
            }
        }

        if day < habit.created_at || count > STREAK_LIMIT {
            break;
        }

        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }

    count
}

/// Longest run of consecutive due-and-completed days from `created_at`
/// through `through`, inclusive.
pub fn longest_streak(store: &Store, habit: &Habit, through: NaiveDate) -> u32 {
    let mut best = 0u32;
    let mut run = 0u32;

    for day in habit.created_at.iter_days().take_while(|d| *d <= through) {
        if !habit.is_scheduled(day) {
            continue;
        }
        if store.has_completion(day, &habit.id) {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{add_days, parse_date};
    use crate::habit::{every_day, weekdays};

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn fixture(repeat: std::collections::BTreeSet<u8>, done: &[&str]) -> (Store, Habit) {
        let habit = Habit {
            id: "h".into(),
            name: "Habit".into(),
            color: "red".into(),
            icon: "✓".into(),
            repeat_days: repeat,
            created_at: d("2024-01-01"),
            order: 0,
            archived: false,
        };
        let mut store = Store {
            habits: vec![habit.clone()],
            ..Store::default()
        };
        for date in done {
            store.toggle_completion(d(date), "h");
        }
        (store, habit)
    }

    #[test]
    fn daily_streak_stops_at_first_miss() {
        let (store, habit) = fixture(every_day(), &["2024-01-05", "2024-01-04", "2024-01-03"]);
        assert_eq!(streak(&store, &habit, d("2024-01-05")), 3);
    }

    #[test]
    fn today_not_done_breaks_streak() {
        let (store, habit) = fixture(every_day(), &["2024-01-04", "2024-01-03"]);
        assert_eq!(streak(&store, &habit, d("2024-01-05")), 0);
        assert_eq!(streak(&store, &habit, d("2024-01-04")), 2);
    }

    #[test]
    fn weekend_days_are_transparent() {
        let done = ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05"];
        let (store, habit) = fixture(weekdays(), &done);
        // Monday 2024-01-08 is due and not done yet.
        assert_eq!(streak(&store, &habit, d("2024-01-08")), 0);
        assert_eq!(streak(&store, &habit, d("2024-01-05")), 5);
        // Saturday and Sunday are skipped on the way back to Friday.
        assert_eq!(streak(&store, &habit, d("2024-01-07")), 5);
    }

    #[test]
    fn empty_schedule_has_no_streak() {
        let (store, habit) = fixture(Default::default(), &["2024-01-01", "2024-01-02"]);
        for offset in 0..10 {
            assert_eq!(streak(&store, &habit, add_days(d("2024-01-01"), offset)), 0);
        }
    }

    #[test]
    fn archived_habit_has_no_streak() {
        let (store, mut habit) = fixture(every_day(), &["2024-01-01", "2024-01-02"]);
        habit.archived = true;
        assert_eq!(streak(&store, &habit, d("2024-01-02")), 0);
    }

    #[test]
    fn day_before_creation_still_counts_once() {
        let (store, habit) = fixture(
            every_day(),
            &["2023-12-30", "2023-12-31", "2024-01-01", "2024-01-02"],
        );
        // 01-02, 01-01, then 12-31 is evaluated and ends the walk.
        assert_eq!(streak(&store, &habit, d("2024-01-02")), 3);
    }

    #[test]
    fn streak_is_capped() {
        let mut habit = fixture(every_day(), &[]).1;
        habit.created_at = d("2000-01-01");
        let mut store = Store {
            habits: vec![habit.clone()],
            ..Store::default()
        };
        let from = d("2020-01-01");
        for offset in 0..4000 {
            store.completions.toggle(add_days(from, -offset), "h");
        }
        assert_eq!(streak(&store, &habit, from), STREAK_LIMIT + 1);
    }

    #[test]
    fn deleted_habit_streak_does_not_panic() {
        let (mut store, habit) = fixture(every_day(), &["2024-01-01", "2024-01-02"]);
        store.delete_habit("h");
        assert_eq!(streak(&store, &habit, d("2024-01-02")), 2);
    }

    #[test]
    fn longest_streak_finds_best_run() {
        let (store, habit) = fixture(
            weekdays(),
            &[
                "2024-01-01", "2024-01-02", // run of 2
                "2024-01-04", "2024-01-05", "2024-01-08", "2024-01-09", // run of 4 across a weekend
            ],
        );
        assert_eq!(longest_streak(&store, &habit, d("2024-01-31")), 4);
        assert_eq!(longest_streak(&store, &habit, d("2024-01-02")), 2);
        assert_eq!(longest_streak(&store, &habit, d("2023-12-01")), 0);
    }
}
