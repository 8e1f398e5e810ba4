//! Daily break statistics.
//!
//! Every break keeps a small set of counters per day: how often it was
//! prompted, taken, skipped or postponed, and how much active time ran past
//! its limit. When a new day starts the current counters move into a bounded
//! history.
//!
//! ## Storage
//!
//! Statistics are stored as pretty-printed JSON next to the configuration
//! file. A missing file is not an error; a fresh day is started instead.

use crate::libs::break_control::BreakId;
use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fs::{self, File};
use std::path::Path;

pub const STATISTICS_FILE_NAME: &str = "statistics.json";

/// Number of archived days kept.
pub const HISTORY_DAYS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakValue {
    Prompted,
    UniqueBreaks,
    Taken,
    NaturalTaken,
    Skipped,
    Postponed,
    TotalOverdue,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BreakCounters {
    pub prompted: u64,
    pub unique_breaks: u64,
    pub taken: u64,
    pub natural_taken: u64,
    pub skipped: u64,
    pub postponed: u64,
    pub total_overdue: u64,
}

impl BreakCounters {
    pub fn get(&self, value: BreakValue) -> u64 {
        match value {
            BreakValue::Prompted => self.prompted,
            BreakValue::UniqueBreaks => self.unique_breaks,
            BreakValue::Taken => self.taken,
            BreakValue::NaturalTaken => self.natural_taken,
            BreakValue::Skipped => self.skipped,
            BreakValue::Postponed => self.postponed,
            BreakValue::TotalOverdue => self.total_overdue,
        }
    }

    fn slot(&mut self, value: BreakValue) -> &mut u64 {
        match value {
            BreakValue::Prompted => &mut self.prompted,
            BreakValue::UniqueBreaks => &mut self.unique_breaks,
            BreakValue::Taken => &mut self.taken,
            BreakValue::NaturalTaken => &mut self.natural_taken,
            BreakValue::Skipped => &mut self.skipped,
            BreakValue::Postponed => &mut self.postponed,
            BreakValue::TotalOverdue => &mut self.total_overdue,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub breaks: BTreeMap<BreakId, BreakCounters>,
}

impl DailyStats {
    fn new(date: NaiveDate) -> Self {
        Self { date, breaks: BTreeMap::new() }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Statistics {
    current: DailyStats,
    history: VecDeque<DailyStats>,
}

impl Statistics {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            current: DailyStats::new(date),
            history: VecDeque::new(),
        }
    }

    /// Reads statistics from `path`, or starts a new day at `today` when the
    /// file does not exist.
    pub fn load(path: &Path, today: NaiveDate) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new(today));
        }
        let stats_str = fs::read_to_string(path)?;
        let stats: Statistics = serde_json::from_str(&stats_str)?;
        Ok(stats)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let stats_file = File::create(path)?;
        serde_json::to_writer_pretty(&stats_file, &self)?;
        Ok(())
    }

    pub fn increment_break_counter(&mut self, id: BreakId, value: BreakValue) {
        *self.current.breaks.entry(id).or_default().slot(value) += 1;
    }

    pub fn set_break_counter(&mut self, id: BreakId, value: BreakValue, count: u64) {
        *self.current.breaks.entry(id).or_default().slot(value) = count;
    }

    pub fn get(&self, id: BreakId, value: BreakValue) -> u64 {
        self.current.breaks.get(&id).map_or(0, |c| c.get(value))
    }

    /// Archives the current day and starts counting for `date`.
    ///
    /// Calling this again for the day already being counted does nothing.
    pub fn start_new_day(&mut self, date: NaiveDate) {
        if self.current.date == date {
            return;
        }
        let finished = std::mem::replace(&mut self.current, DailyStats::new(date));
        self.history.push_front(finished);
        self.history.truncate(HISTORY_DAYS);
    }

    pub fn current(&self) -> &DailyStats {
        &self.current
    }

    /// Archived days, most recent first.
    pub fn history(&self) -> impl Iterator<Item = &DailyStats> {
        self.history.iter()
    }
}
