//! Light/dark preference, persisted under its own key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{StorageError, ValidationError};
use crate::storage::{KvStore, THEME_KEY};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Read the stored preference. Missing or unrecognized values read as dark.
    pub fn load<K: KvStore + ?Sized>(kv: &K) -> Self {
        match kv.read(THEME_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|_| {
                tracing::debug!(value = %raw, "unknown theme value, using dark");
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read theme, using dark");
                Theme::default()
            }
        }
    }

    pub fn save<K: KvStore + ?Sized>(self, kv: &mut K) -> Result<(), StorageError> {
        kv.write(THEME_KEY, self.as_str())
    }

    /// Flip the stored preference and return the new value.
    pub fn toggle<K: KvStore + ?Sized>(kv: &mut K) -> Result<Self, StorageError> {
        let next = Self::load(kv).toggled();
        next.save(kv)?;
        Ok(next)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ValidationError::InvalidTheme(other.to_string())),
        }
    }
}
