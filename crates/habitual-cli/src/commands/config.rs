//! `habitual config`: read and edit `config.toml`.

use clap::Subcommand;
use habitual_core::Config;
use serde::Serialize;

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting as a bare value
    ///
    /// Keys: calendar.timezone, calendar.week_start, habits.palette,
    /// habits.default_icon, habits.seed_starter
    Get {
        /// Dotted key, e.g. "calendar.week_start"
        key: String,
    },
    /// Change one setting and save it
    ///
    /// Week start is 0 (Sunday) to 6 (Saturday). An empty timezone falls back
    /// to TZ, then UTC. The palette is a comma-separated list of color tokens.
    Set {
        /// Dotted key, e.g. "habits.default_icon"
        key: String,
        /// New value
        value: String,
    },
    /// Print every setting as JSON
    List,
    /// Restore calendar and habit defaults, then print them
    Reset,
    /// Print where config.toml lives
    Path,
}

#[derive(Serialize)]
struct SettingReport<'a> {
    key: &'a str,
    value: String,
}

pub fn run(action: ConfigAction) -> CliResult {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config
                .get(&key)
                .ok_or_else(|| format!("unknown config key: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            tracing::info!(key = %key, "config updated");
            print_json(&SettingReport {
                value: config.get(&key).unwrap_or(value),
                key: &key,
            })?;
        }
        ConfigAction::List => {
            print_json(&Config::load()?)?;
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            print_json(&config)?;
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
    }
    Ok(())
}
