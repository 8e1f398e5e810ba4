//! Reset predicates for timers that roll over on the wall clock.
//!
//! A timer normally resets itself after enough idle time. The daily limit
//! timer is different: its counters roll over once per day at a fixed time
//! of day, no matter how the user behaves. That rule is expressed as a
//! [`TimePredicate`], which answers a single question: given the moment of
//! the last reset, when is the next one due?
//!
//! ## Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use restive::libs::time_pred::{DailyPredicate, TimePredicate};
//!
//! let predicate = DailyPredicate::parse("day/04:00").unwrap();
//! let last = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap().and_hms_opt(10, 0, 0).unwrap();
//! let next = predicate.next_reset_after(last);
//! assert_eq!(next, NaiveDate::from_ymd_opt(2025, 3, 2).unwrap().and_hms_opt(4, 0, 0).unwrap());
//! ```

use crate::libs::error::{CoreError, CoreResult};
use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use std::fmt;

const DAILY_PREFIX: &str = "day/";

/// Computes the next point in time at which a timer should reset.
pub trait TimePredicate: fmt::Debug + Send {
    /// Returns the first reset instant strictly after `last`.
    fn next_reset_after(&self, last: NaiveDateTime) -> NaiveDateTime;

    /// Textual form accepted by the configuration file.
    fn describe(&self) -> String;
}

/// Fires once per day at a fixed local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyPredicate {
    at: NaiveTime,
}

impl DailyPredicate {
    pub fn new(at: NaiveTime) -> Self {
        Self { at }
    }

    /// Parses a `day/HH:MM` expression.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfiguration`] when the prefix is missing
    /// or the time of day cannot be parsed.
    pub fn parse(expr: &str) -> CoreResult<Self> {
        let time = expr
            .trim()
            .strip_prefix(DAILY_PREFIX)
            .ok_or_else(|| CoreError::InvalidConfiguration(format!("unsupported reset predicate '{}'", expr)))?;

        let at = NaiveTime::parse_from_str(time, "%H:%M")
            .map_err(|e| CoreError::InvalidConfiguration(format!("bad time of day in '{}': {}", expr, e)))?;

        Ok(Self { at })
    }

    pub fn at(&self) -> NaiveTime {
        self.at
    }
}

impl TimePredicate for DailyPredicate {
    fn next_reset_after(&self, last: NaiveDateTime) -> NaiveDateTime {
        let same_day = last.date().and_time(self.at);
        if same_day > last {
            same_day
        } else {
            same_day + TimeDelta::days(1)
        }
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DailyPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", DAILY_PREFIX, self.at.format("%H:%M"))
    }
}
