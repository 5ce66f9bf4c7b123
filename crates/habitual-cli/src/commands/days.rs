//! Day views: today's checklist and month/week progress.

use chrono::NaiveDate;
use clap::Args;
use habitual_core::{DayProgress, VisibleWindow};
use serde::Serialize;

use super::{open_tracker, parse_date_arg, print_json, CliResult};

#[derive(Args)]
pub struct DaysArgs {
    /// Show the month containing the date (default)
    #[arg(long, conflicts_with = "week")]
    month: bool,
    /// Show the week containing the date
    #[arg(long)]
    week: bool,
    /// Anchor date (YYYY-MM-DD, default: today)
    #[arg(long, value_parser = parse_date_arg)]
    date: Option<NaiveDate>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TodayItem<'a> {
    id: &'a str,
    name: &'a str,
    icon: &'a str,
    color: &'a str,
    done: bool,
    streak: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TodayReport<'a> {
    progress: DayProgress,
    habits: Vec<TodayItem<'a>>,
}

pub fn today() -> CliResult {
    let tracker = open_tracker()?;
    let today = tracker.calendar().today();
    let habits = tracker
        .due_today()
        .into_iter()
        .map(|h| TodayItem {
            id: &h.id,
            name: &h.name,
            icon: &h.icon,
            color: &h.color,
            done: tracker.store().has_completion(today, &h.id),
            streak: tracker.streak(&h.id, today).unwrap_or(0),
        })
        .collect();
    print_json(&TodayReport {
        progress: tracker.day_progress(today),
        habits,
    })
}

pub fn run(args: DaysArgs) -> CliResult {
    let tracker = open_tracker()?;
    let anchor = args.date.unwrap_or_else(|| tracker.calendar().today());
    let window = match (args.month, args.week) {
        (false, true) => VisibleWindow::Week(anchor),
        _ => VisibleWindow::Month(anchor),
    };
    let days: Vec<DayProgress> = tracker
        .visible_days(window)
        .into_iter()
        .map(|date| tracker.day_progress(date))
        .collect();
    print_json(&days)
}
