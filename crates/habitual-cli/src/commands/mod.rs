pub mod config;
pub mod days;
pub mod habit;
pub mod theme;
pub mod timer;

use chrono::NaiveDate;
use habitual_core::calendar::parse_date;
use habitual_core::storage::Database;
use habitual_core::{Calendar, Config, HabitTracker};
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Load the config, falling back to defaults when it can't be read.
pub fn load_config() -> Config {
    Config::load_or_default()
}

pub fn calendar() -> Calendar {
    load_config().calendar()
}

/// Open the habit tracker on the default database.
pub fn open_tracker() -> Result<HabitTracker<Database>, Box<dyn std::error::Error>> {
    let config = load_config();
    let db = Database::open()?;
    Ok(HabitTracker::open(db, config.calendar(), config.habits))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// clap value parser for `YYYY-MM-DD` arguments.
pub fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}
