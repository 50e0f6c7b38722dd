//! Persisted session state and the user-visible session log.

use std::collections::{BTreeSet, VecDeque};
use std::fmt::Display;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::PipelineError;

/// Number of entries the session log keeps.
pub const LOG_CAPACITY: usize = 100;

/// Bounded log of session events, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SessionLog {
    entries: VecDeque<String>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, evicting the oldest past [`LOG_CAPACITY`].
    pub fn push(&mut self, entry: impl Into<String>) {
        self.entries.push_back(entry.into());
        while self.entries.len() > LOG_CAPACITY {
            self.entries.pop_front();
        }
    }

    /// Append a timestamped entry when `enabled` is set.
    pub fn debug(&mut self, enabled: bool, message: impl Display) {
        if enabled {
            let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            self.push(format!("[{timestamp}] {message}"));
        }
    }

    /// Append an error entry. Always recorded.
    pub fn error(&mut self, message: impl Display, cause: impl Display) {
        self.push(format!("ERROR: {message} - {cause}"));
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl From<Vec<String>> for SessionLog {
    fn from(entries: Vec<String>) -> Self {
        let mut log = Self::new();
        for entry in entries {
            log.push(entry);
        }
        log
    }
}

impl From<SessionLog> for Vec<String> {
    fn from(log: SessionLog) -> Self {
        log.entries.into()
    }
}

fn no_action() -> i64 {
    -1
}

/// Everything the session persists between host calls.
///
/// The seen-annotation and created-profile sets serialize as sorted arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub config: Config,

    #[serde(default = "no_action")]
    pub last_processed_action: i64,

    #[serde(default)]
    pub processed_markers: BTreeSet<String>,

    #[serde(default, rename = "createdCharacters")]
    pub created_profiles: BTreeSet<String>,

    #[serde(default, rename = "initializedFromCharacterSheet")]
    pub initialized_from_sheet: bool,

    #[serde(default)]
    pub logs: SessionLog,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            config: Config::default(),
            last_processed_action: no_action(),
            processed_markers: BTreeSet::new(),
            created_profiles: BTreeSet::new(),
            initialized_from_sheet: false,
            logs: SessionLog::new(),
        }
    }
}

impl SessionState {
    /// Decode a saved state. Fails unless `config` is present as an object.
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, PipelineError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Log a debug entry if debug mode is on.
    pub fn log_debug(&mut self, message: impl Display) {
        self.logs.debug(self.config.debug, message);
    }

    /// Restore defaults and forget everything seen so far.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
