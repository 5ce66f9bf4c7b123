use clap::Subcommand;
use habitual_core::storage::Database;
use habitual_core::{TimerDriver, TimerSession, TimerState};

use super::{calendar, print_json, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume counting
    Start,
    /// Pause counting
    Pause,
    /// Discard the counted time and return to idle
    Reset,
    /// Record the counted time in history and reset
    Save {
        /// Optional note for the history entry
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Print current timer state as JSON
    Status,
    /// Follow a running timer, printing one event per second until Ctrl-C
    Watch,
    /// Saved sessions
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List saved sessions, most recent first
    List,
    /// Delete a saved session
    Delete {
        /// History entry ID
        id: String,
    },
    /// Replace the note of a saved session
    Note {
        /// History entry ID
        id: String,
        /// New note
        note: String,
    },
}

fn open_session() -> Result<TimerSession<Database>, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let (session, restored) = TimerSession::open(db, calendar());
    tracing::debug!(?restored, "timer session opened");
    Ok(session)
}

pub fn run(action: TimerAction) -> CliResult {
    let mut session = open_session()?;

    match action {
        TimerAction::Watch => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            return runtime.block_on(watch(session));
        }
        TimerAction::Start => match session.start()? {
            Some(event) => print_json(&event)?,
            None => print_json(&session.snapshot_at(chrono::Utc::now()))?,
        },
        TimerAction::Pause => match session.pause()? {
            Some(event) => print_json(&event)?,
            None => print_json(&session.snapshot_at(chrono::Utc::now()))?,
        },
        TimerAction::Reset => {
            let event = session.reset()?;
            print_json(&event)?;
        }
        TimerAction::Save { note } => match session.save_session(&note)? {
            Some(event) => print_json(&event)?,
            None => return Err("nothing to save: no time counted".into()),
        },
        TimerAction::Status => {
            print_json(&session.snapshot_at(chrono::Utc::now()))?;
        }
        TimerAction::History { action } => match action {
            HistoryAction::List => print_json(session.history())?,
            HistoryAction::Delete { id } => match session.delete_entry(&id)? {
                Some(event) => print_json(&event)?,
                None => return Err(format!("history entry not found: {id}").into()),
            },
            HistoryAction::Note { id, note } => match session.set_note(&id, &note)? {
                Some(event) => print_json(&event)?,
                None => return Err(format!("history entry not found: {id}").into()),
            },
        },
    }
    Ok(())
}

async fn watch(session: TimerSession<Database>) -> CliResult {
    let mut driver = TimerDriver::new(session);
    print_json(&driver.snapshot())?;
    if driver.session().state() != TimerState::Running {
        return Ok(());
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = driver.next_tick() => {
                if let Some(event) = event {
                    println!("{}", serde_json::to_string(&event)?);
                }
            }
        }
    }
    Ok(())
}
