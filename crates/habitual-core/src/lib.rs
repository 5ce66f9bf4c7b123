//! # Habitual Core Library
//!
//! This library provides the core logic for the Habitual habit tracker: the
//! habit store and its completion ledger, streaks, and a stopwatch-style focus
//! timer. All operations are available through the standalone `habitual` CLI,
//! which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Calendar**: `NaiveDate` arithmetic plus a reference timezone used only
//!   to decide what "today" is
//! - **Habits**: the persisted [`Store`] (habits + completion ledger) with its
//!   mutation operations, load-time migration and the streak walk
//! - **Timer**: a wall-clock-based state machine that requires the caller to
//!   periodically invoke `tick()`; [`TimerDriver`] does that on a tokio task
//! - **Storage**: a string key-value port ([`KvStore`]) backed by SQLite, and
//!   TOML-based configuration
//!
//! ## Key Components
//!
//! - [`HabitTracker`]: habit store bound to storage, persisting every mutation
//! - [`TimerSession`]: timer engine and session history bound to storage
//! - [`Database`]: SQLite key-value persistence
//! - [`Config`]: application configuration management

pub mod calendar;
pub mod error;
pub mod events;
pub mod habit;
pub mod storage;
pub mod theme;
pub mod timer;
pub mod views;

pub use calendar::Calendar;
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use habit::{Habit, HabitTracker, Ledger, Store};
pub use storage::{Config, Database, KvStore, MemoryKv};
pub use theme::Theme;
pub use timer::{HistoryEntry, TimerDriver, TimerEngine, TimerSession, TimerState};
pub use views::{DayProgress, VisibleWindow};
