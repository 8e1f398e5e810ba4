//! Persisted timer state.
//!
//! The watcher saves the counters of every timer periodically and on
//! shutdown, so that a restart does not forget how long the user has been
//! working. The file is plain text:
//!
//! ```text
//! RestiveState 2
//! saved_at 1741600000
//! micro_pause 120 0 0 0 0 - -
//! rest_break 1520 0 0 0 0 - -
//! daily_limit 9200 0 0 0 0 - 1741579200
//! ```
//!
//! The header carries the layout version handed to
//! [`Timer::deserialize_state`]. Time between `saved_at` and the restore
//! is treated as idle time, so a long absence clears the timers exactly as
//! it would have with the watcher running.

use crate::libs::coordinator::BreakCoordinator;
use crate::libs::data_storage::DataStorage;
use crate::libs::error::{CoreError, CoreResult};
use crate::libs::timer::{Timer, STATE_VERSION};
use anyhow::Result;
use chrono::{DateTime, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};

pub const STATE_FILE_NAME: &str = "state.txt";

const HEADER: &str = "RestiveState";
const SAVED_AT: &str = "saved_at";

/// Contents of a state file.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedState {
    pub version: u32,
    pub saved_at: NaiveDateTime,
    entries: Vec<String>,
}

impl SavedState {
    /// Captures every timer of the coordinator.
    pub fn capture(coordinator: &BreakCoordinator, saved_at: NaiveDateTime) -> Self {
        Self {
            version: STATE_VERSION,
            saved_at,
            entries: coordinator.breaks().iter().map(|b| b.timer().serialize_state()).collect(),
        }
    }

    /// Parses the text form.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DeserializationFailed`] when the header or the
    /// save time is missing or malformed.
    pub fn parse(contents: &str) -> CoreResult<Self> {
        let mut lines = contents.lines().filter(|l| !l.trim().is_empty());

        let version = lines
            .next()
            .and_then(|l| l.strip_prefix(HEADER))
            .and_then(|v| v.trim().parse::<u32>().ok())
            .ok_or_else(|| CoreError::DeserializationFailed("missing state header".into()))?;

        let saved_at = lines
            .next()
            .and_then(|l| l.strip_prefix(SAVED_AT))
            .and_then(|v| v.trim().parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|t| t.naive_utc())
            .ok_or_else(|| CoreError::DeserializationFailed("missing save time".into()))?;

        Ok(Self {
            version,
            saved_at,
            entries: lines.map(|l| l.trim().to_string()).collect(),
        })
    }

    pub fn render(&self) -> String {
        let mut out = format!("{} {}\n{} {}\n", HEADER, self.version, SAVED_AT, self.saved_at.and_utc().timestamp());
        for entry in &self.entries {
            out.push_str(entry);
            out.push('\n');
        }
        out
    }

    /// Restores `timer` from its saved line, if any, and counts the time
    /// since the save as idle.
    ///
    /// Returns whether a line for this timer was found.
    pub fn apply_to(&self, timer: &mut Timer, now: NaiveDateTime) -> CoreResult<bool> {
        let Some(entry) = self.entry_for(timer) else {
            return Ok(false);
        };
        timer.deserialize_state(entry, self.version)?;

        let away = (now - self.saved_at).num_seconds();
        if away > 0 {
            timer.apply_idle_gap(away as u64);
        }
        Ok(true)
    }

    fn entry_for(&self, timer: &Timer) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.split_whitespace().next() == Some(timer.id()))
            .map(String::as_str)
    }

    /// Restores every timer of the coordinator.
    ///
    /// All lines are checked first; on error no timer has been touched.
    pub fn restore(&self, coordinator: &mut BreakCoordinator, now: NaiveDateTime) -> CoreResult<usize> {
        for control in coordinator.breaks() {
            if let Some(entry) = self.entry_for(control.timer()) {
                control.timer().check_state(entry, self.version)?;
            }
        }

        let ids: Vec<_> = coordinator.breaks().iter().map(|b| b.id()).collect();
        let mut restored = 0;
        for id in ids {
            if let Some(timer) = coordinator.timer_mut(id) {
                if self.apply_to(timer, now)? {
                    restored += 1;
                }
            }
        }
        Ok(restored)
    }
}

/// The state file in the data directory.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: DataStorage::new().get_path(STATE_FILE_NAME)?,
        })
    }

    pub fn at(path: &Path) -> Self {
        Self { path: path.to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the state file. `Ok(None)` means nothing was saved yet.
    pub fn read(&self) -> Result<Option<SavedState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        Ok(Some(SavedState::parse(&contents)?))
    }

    pub fn save(&self, coordinator: &BreakCoordinator, now: NaiveDateTime) -> Result<()> {
        fs::write(&self.path, SavedState::capture(coordinator, now).render())?;
        Ok(())
    }

    /// Restores the coordinator from the state file. Returns the number of
    /// timers restored.
    pub fn load(&self, coordinator: &mut BreakCoordinator, now: NaiveDateTime) -> Result<usize> {
        match self.read()? {
            Some(state) => Ok(state.restore(coordinator, now)?),
            None => Ok(0),
        }
    }
}
