//! Activity timer: the per-break clock of the reminder engine.
//!
//! A [`Timer`] is fed one `active` flag per second and keeps the accounting
//! that decides when a break is due:
//!
//! - **Elapsed active time**: seconds of activity since the last reset
//! - **Elapsed idle time**: consecutive idle seconds since the user stopped
//! - **Overdue time**: active seconds spent beyond the limit since the last
//!   daily reset
//!
//! ## Events
//!
//! Each call to [`Timer::process`] returns a [`TimerEvent`]:
//!
//! - `LimitReached` when the limit is hit, repeated at most once per snooze
//!   interval while the user stays active
//! - `NaturalReset` when idle time reaches the auto-reset threshold before the
//!   timer went overdue
//! - `Reset` for the same threshold crossed while overdue, or when a daily
//!   reset predicate fires
//!
//! ## Clock Control
//!
//! The clock can be stalled in two ways. A *disabled* timer ignores ticks
//! completely. A *frozen* timer (used while a break insists on being taken)
//! counts neither active nor idle time, but a limit that is already due is
//! still reported and its excess still counts as overdue.
//!
//! ## Usage
//!
//! ```rust
//! use restive::libs::timer::{Timer, TimerConfig, TimerEvent};
//!
//! let config = TimerConfig {
//!     limit: 100,
//!     limit_enabled: true,
//!     auto_reset: 20,
//!     auto_reset_enabled: true,
//!     snooze: 50,
//!     daily_reset: None,
//! };
//! let mut timer = Timer::new("rest_break", &config).unwrap();
//!
//! for _ in 0..99 {
//!     assert_eq!(timer.process(true), TimerEvent::None);
//! }
//! assert_eq!(timer.process(true), TimerEvent::LimitReached);
//! ```

use crate::libs::error::{CoreError, CoreResult};
use crate::libs::time_pred::{DailyPredicate, TimePredicate};
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Version written by [`Timer::serialize_state`].
pub const STATE_VERSION: u32 = 2;

const NONE_MARK: &str = "-";

/// Outcome of a single [`Timer::process`] tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    None,
    LimitReached,
    Reset,
    NaturalReset,
}

/// Thresholds of a timer, in seconds.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TimerConfig {
    /// Active seconds after which the break is due.
    pub limit: u64,
    pub limit_enabled: bool,
    /// Idle seconds after which elapsed time clears.
    pub auto_reset: u64,
    pub auto_reset_enabled: bool,
    /// Minimum spacing between repeated limit notifications.
    pub snooze: u64,
    /// Optional wall-clock reset rule, e.g. `day/04:00`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_reset: Option<String>,
}

impl TimerConfig {
    /// Checks every threshold rule without building a timer.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfiguration`] when an enabled threshold
    /// is zero, the snooze is zero or the reset predicate cannot be parsed.
    pub fn validate(&self) -> CoreResult<()> {
        check_limit(self.limit, self.limit_enabled)?;
        check_auto_reset(self.auto_reset, self.auto_reset_enabled)?;
        check_snooze(self.snooze)?;
        if let Some(expr) = &self.daily_reset {
            DailyPredicate::parse(expr)?;
        }
        Ok(())
    }
}

/// Counter values of a timer at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimerSnapshot {
    pub elapsed_active: u64,
    pub elapsed_idle: u64,
    pub total_overdue: u64,
    pub last_limit_notify_at: Option<u64>,
    pub snooze_inhibited: bool,
}

#[derive(Debug)]
pub struct Timer {
    id: String,

    limit: u64,
    limit_enabled: bool,
    auto_reset: u64,
    auto_reset_enabled: bool,
    snooze: u64,

    enabled: bool,
    frozen: bool,
    running: bool,

    elapsed_active: u64,
    elapsed_idle: u64,
    total_overdue: u64,
    // Part of the current excess over the limit already added to total_overdue.
    counted_excess: u64,
    last_limit_notify_at: Option<u64>,
    snooze_inhibited: bool,
    // Auto-reset fires once per idle period.
    idle_reset_done: bool,

    daily_reset: Option<Box<dyn TimePredicate>>,
    last_daily_reset: Option<NaiveDateTime>,
}

impl Timer {
    /// Creates an enabled, idle timer.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfiguration`] if the configuration breaks
    /// one of the threshold rules (see [`TimerConfig::validate`]).
    pub fn new(id: &str, config: &TimerConfig) -> CoreResult<Self> {
        config.validate()?;

        let daily_reset = match &config.daily_reset {
            Some(expr) => Some(Box::new(DailyPredicate::parse(expr)?) as Box<dyn TimePredicate>),
            None => None,
        };

        Ok(Self {
            id: id.to_string(),
            limit: config.limit,
            limit_enabled: config.limit_enabled,
            auto_reset: config.auto_reset,
            auto_reset_enabled: config.auto_reset_enabled,
            snooze: config.snooze,
            enabled: true,
            frozen: false,
            running: false,
            elapsed_active: 0,
            elapsed_idle: 0,
            total_overdue: 0,
            counted_excess: 0,
            last_limit_notify_at: None,
            snooze_inhibited: false,
            idle_reset_done: true,
            daily_reset,
            last_daily_reset: None,
        })
    }

    /// Advances the clock by one second.
    ///
    /// Never fails: every combination of flags and counters yields a defined
    /// event, so the heartbeat can call this unconditionally.
    pub fn process(&mut self, active: bool) -> TimerEvent {
        if !self.enabled {
            return TimerEvent::None;
        }

        if self.frozen {
            // Stalled clock: counters stay put, pending limits still count.
            self.running = active;
            self.account_overdue();
            if active && self.limit_due() {
                self.last_limit_notify_at = Some(self.elapsed_active);
                return TimerEvent::LimitReached;
            }
            return TimerEvent::None;
        }

        if active {
            self.running = true;
            self.elapsed_idle = 0;
            self.idle_reset_done = false;
            self.elapsed_active += 1;
            self.account_overdue();

            if self.limit_due() {
                self.last_limit_notify_at = Some(self.elapsed_active);
                return TimerEvent::LimitReached;
            }
            TimerEvent::None
        } else {
            self.running = false;
            self.elapsed_idle += 1;
            self.account_overdue();

            if self.auto_reset_enabled && self.auto_reset > 0 && self.elapsed_idle >= self.auto_reset && !self.idle_reset_done {
                let overdue = self.is_overdue();
                self.clear_elapsed();
                self.idle_reset_done = true;
                return if overdue { TimerEvent::Reset } else { TimerEvent::NaturalReset };
            }
            TimerEvent::None
        }
    }

    fn account_overdue(&mut self) {
        if !self.limit_enabled || self.elapsed_active <= self.limit {
            return;
        }
        let excess = self.elapsed_active - self.limit;
        if excess > self.counted_excess {
            self.total_overdue += excess - self.counted_excess;
            self.counted_excess = excess;
        }
    }

    fn limit_due(&self) -> bool {
        if !self.limit_enabled || self.limit == 0 || self.snooze_inhibited || self.elapsed_active < self.limit {
            return false;
        }
        match self.last_limit_notify_at {
            None => true,
            Some(at) => self.elapsed_active >= at.saturating_add(self.snooze),
        }
    }

    fn clear_elapsed(&mut self) {
        self.elapsed_active = 0;
        self.counted_excess = 0;
        self.last_limit_notify_at = None;
        self.snooze_inhibited = false;
    }

    /// Marks the user as having stopped right now.
    ///
    /// Counters are kept; idle time starts over from this instant.
    pub fn stop_timer(&mut self) {
        if self.running {
            self.running = false;
            self.elapsed_idle = 0;
        }
    }

    /// Clears the elapsed active time and re-arms notifications.
    ///
    /// Overdue and idle time are left alone.
    pub fn reset_timer(&mut self) {
        self.clear_elapsed();
        self.idle_reset_done = true;
    }

    /// Delays the next limit notification by a full snooze interval.
    pub fn snooze_timer(&mut self) {
        self.last_limit_notify_at = Some(self.elapsed_active);
    }

    /// Silences limit notifications until the next reset.
    pub fn inhibit_snooze(&mut self) {
        self.snooze_inhibited = true;
    }

    /// Stalls or restarts the clock. See the module docs for what a frozen
    /// timer still does.
    pub fn freeze_timer(&mut self, freeze: bool) {
        self.frozen = freeze;
    }

    /// Clears the overdue total at the start of a new day.
    pub fn daily_reset(&mut self) {
        self.total_overdue = 0;
    }

    /// Resumes counting from where the timer was disabled.
    pub fn enable(&mut self) {
        if self.enabled {
            return;
        }
        self.enabled = true;
        if self.is_overdue() {
            // An overdue timer waits a snooze interval before nagging again.
            self.last_limit_notify_at = Some(self.elapsed_active);
        }
    }

    /// Stops all accounting. Counters keep their values.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.running = false;
    }

    /// Adds an idle gap observed outside of the heartbeat (e.g. while the
    /// process was not running). Resets elapsed time silently when the gap
    /// reaches the auto-reset threshold.
    pub fn apply_idle_gap(&mut self, seconds: u64) {
        self.running = false;
        self.elapsed_idle = self.elapsed_idle.saturating_add(seconds);
        if self.auto_reset_enabled && self.auto_reset > 0 && self.elapsed_idle >= self.auto_reset && !self.idle_reset_done {
            self.reset_timer();
        }
    }

    /// Changes the limit. The new value applies from the next tick on; a
    /// limit below the elapsed time makes the excess count as overdue then.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfiguration`] for a zero limit while the
    /// limit is enabled. The timer is left unchanged.
    pub fn set_limit(&mut self, limit: u64) -> CoreResult<()> {
        check_limit(limit, self.limit_enabled)?;
        self.limit = limit;
        self.clamp_counted_excess();
        if self.elapsed_active < limit {
            self.last_limit_notify_at = None;
        }
        Ok(())
    }

    /// Turns limit notifications and overdue accounting on or off.
    pub fn set_limit_enabled(&mut self, enabled: bool) -> CoreResult<()> {
        check_limit(self.limit, enabled)?;
        self.limit_enabled = enabled;
        self.clamp_counted_excess();
        Ok(())
    }

    // A raised limit shrinks the excess; only seconds past the new excess
    // count again.
    fn clamp_counted_excess(&mut self) {
        let excess = if self.limit_enabled { self.elapsed_active.saturating_sub(self.limit) } else { 0 };
        self.counted_excess = self.counted_excess.min(excess);
    }

    /// Changes the idle time that clears the timer. Raising it lifts a
    /// snooze inhibition left by a skipped break.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfiguration`] for zero while auto-reset
    /// is enabled.
    pub fn set_auto_reset(&mut self, auto_reset: u64) -> CoreResult<()> {
        check_auto_reset(auto_reset, self.auto_reset_enabled)?;
        if auto_reset > self.auto_reset {
            self.snooze_inhibited = false;
        }
        self.auto_reset = auto_reset;
        Ok(())
    }

    /// Turns idle auto-reset on or off.
    pub fn set_auto_reset_enabled(&mut self, enabled: bool) -> CoreResult<()> {
        check_auto_reset(self.auto_reset, enabled)?;
        self.auto_reset_enabled = enabled;
        Ok(())
    }

    /// Changes the spacing of repeated limit notifications.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfiguration`] for zero.
    pub fn set_snooze(&mut self, snooze: u64) -> CoreResult<()> {
        check_snooze(snooze)?;
        self.snooze = snooze;
        Ok(())
    }

    /// Installs a wall-clock reset rule.
    ///
    /// The rule is anchored at `now` if it has never fired before.
    pub fn set_daily_reset(&mut self, predicate: Box<dyn TimePredicate>, now: NaiveDateTime) {
        self.daily_reset = Some(predicate);
        if self.last_daily_reset.is_none() {
            self.last_daily_reset = Some(now);
        }
    }

    /// Checks the daily reset rule against `now`.
    ///
    /// Returns `true` when a reset is due. The caller decides what the reset
    /// means; this method only records `now` as the last reset instant.
    pub fn poll_daily_reset(&mut self, now: NaiveDateTime) -> bool {
        let Some(predicate) = &self.daily_reset else {
            return false;
        };
        let Some(last) = self.last_daily_reset else {
            self.last_daily_reset = Some(now);
            return false;
        };
        if now >= predicate.next_reset_after(last) {
            self.last_daily_reset = Some(now);
            return true;
        }
        false
    }

    /// Active seconds left until the next `LimitReached`, if one can occur.
    pub fn seconds_until_limit(&self) -> Option<u64> {
        if !self.enabled || !self.limit_enabled || self.snooze_inhibited {
            return None;
        }
        let target = match self.last_limit_notify_at {
            None => self.limit,
            Some(at) => at.saturating_add(self.snooze),
        };
        Some(target.saturating_sub(self.elapsed_active))
    }

    /// True once elapsed time was cleared for the current idle period.
    ///
    /// Such a timer has nothing left to reset, so it will not report another
    /// `NaturalReset` until the user has been active again.
    pub fn is_idle_reset_done(&self) -> bool {
        self.idle_reset_done
    }

    /// True while elapsed active time is past an enabled limit.
    pub fn is_overdue(&self) -> bool {
        self.limit_enabled && self.elapsed_active > self.limit
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn is_limit_enabled(&self) -> bool {
        self.limit_enabled
    }

    pub fn auto_reset(&self) -> u64 {
        self.auto_reset
    }

    pub fn is_auto_reset_enabled(&self) -> bool {
        self.auto_reset_enabled
    }

    pub fn snooze(&self) -> u64 {
        self.snooze
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed_active(&self) -> u64 {
        self.elapsed_active
    }

    pub fn elapsed_idle(&self) -> u64 {
        self.elapsed_idle
    }

    pub fn total_overdue(&self) -> u64 {
        self.total_overdue
    }

    pub fn last_limit_notify_at(&self) -> Option<u64> {
        self.last_limit_notify_at
    }

    pub fn is_snooze_inhibited(&self) -> bool {
        self.snooze_inhibited
    }

    pub fn last_daily_reset(&self) -> Option<NaiveDateTime> {
        self.last_daily_reset
    }

    /// Text form of the daily reset rule, e.g. `day/04:00`.
    pub fn daily_reset_rule(&self) -> Option<String> {
        self.daily_reset.as_ref().map(|p| p.describe())
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            elapsed_active: self.elapsed_active,
            elapsed_idle: self.elapsed_idle,
            total_overdue: self.total_overdue,
            last_limit_notify_at: self.last_limit_notify_at,
            snooze_inhibited: self.snooze_inhibited,
        }
    }

    /// Encodes the counters as a single line of text, in the layout of
    /// [`STATE_VERSION`].
    ///
    /// Fields are space separated: id, elapsed active, elapsed idle, total
    /// overdue, counted excess, snooze inhibited flag, last notification mark
    /// and last daily reset (unix seconds). Absent values are written as `-`.
    pub fn serialize_state(&self) -> String {
        format!(
            "{} {} {} {} {} {} {} {}",
            self.id,
            self.elapsed_active,
            self.elapsed_idle,
            self.total_overdue,
            self.counted_excess,
            u8::from(self.snooze_inhibited),
            optional(self.last_limit_notify_at),
            optional(self.last_daily_reset.map(|t| t.and_utc().timestamp())),
        )
    }

    /// Restores counters written by [`Timer::serialize_state`].
    ///
    /// Version 1 lines carry `id elapsed overdue inhibited notify`; version 2
    /// lines carry the full layout. Nothing is modified unless the whole line
    /// parses.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DeserializationFailed`] for an unknown version, a
    /// line that belongs to another timer, or any malformed field.
    pub fn deserialize_state(&mut self, state: &str, version: u32) -> CoreResult<()> {
        let restored = self.parse_state(state, version)?;

        self.elapsed_active = restored.elapsed_active;
        self.elapsed_idle = restored.elapsed_idle;
        self.total_overdue = restored.total_overdue;
        self.counted_excess = restored.counted_excess;
        self.snooze_inhibited = restored.snooze_inhibited;
        self.last_limit_notify_at = restored.last_limit_notify_at;
        self.last_daily_reset = restored.last_daily_reset;
        self.idle_reset_done = self.elapsed_active == 0;
        self.running = false;
        Ok(())
    }

    /// Checks that [`Timer::deserialize_state`] would accept `state` without
    /// touching the counters.
    pub fn check_state(&self, state: &str, version: u32) -> CoreResult<()> {
        self.parse_state(state, version).map(|_| ())
    }

    fn parse_state(&self, state: &str, version: u32) -> CoreResult<Restored> {
        let fields: Vec<&str> = state.split_whitespace().collect();
        let expected = match version {
            1 => 5,
            2 => 8,
            other => return Err(CoreError::DeserializationFailed(format!("unsupported state version {}", other))),
        };
        if fields.len() != expected {
            return Err(CoreError::DeserializationFailed(format!(
                "expected {} fields for version {}, found {}",
                expected,
                version,
                fields.len()
            )));
        }
        if fields[0] != self.id {
            return Err(CoreError::DeserializationFailed(format!("state belongs to '{}', not '{}'", fields[0], self.id)));
        }

        let restored = if version == 1 {
            let elapsed_active = number(fields[1])?;
            Restored {
                elapsed_active,
                elapsed_idle: 0,
                total_overdue: number(fields[2])?,
                counted_excess: if self.limit_enabled { elapsed_active.saturating_sub(self.limit) } else { 0 },
                snooze_inhibited: flag(fields[3])?,
                last_limit_notify_at: optional_number(fields[4])?,
                last_daily_reset: self.last_daily_reset,
            }
        } else {
            Restored {
                elapsed_active: number(fields[1])?,
                elapsed_idle: number(fields[2])?,
                total_overdue: number(fields[3])?,
                counted_excess: number(fields[4])?,
                snooze_inhibited: flag(fields[5])?,
                last_limit_notify_at: optional_number(fields[6])?,
                last_daily_reset: match optional_number(fields[7])? {
                    Some(secs) => Some(timestamp(secs)?),
                    None => None,
                },
            }
        };
        Ok(restored)
    }
}

struct Restored {
    elapsed_active: u64,
    elapsed_idle: u64,
    total_overdue: u64,
    counted_excess: u64,
    snooze_inhibited: bool,
    last_limit_notify_at: Option<u64>,
    last_daily_reset: Option<NaiveDateTime>,
}

fn check_limit(limit: u64, enabled: bool) -> CoreResult<()> {
    if enabled && limit == 0 {
        return Err(CoreError::InvalidConfiguration("limit must be greater than zero".into()));
    }
    Ok(())
}

fn check_auto_reset(auto_reset: u64, enabled: bool) -> CoreResult<()> {
    if enabled && auto_reset == 0 {
        return Err(CoreError::InvalidConfiguration("auto reset must be greater than zero".into()));
    }
    Ok(())
}

fn check_snooze(snooze: u64) -> CoreResult<()> {
    if snooze == 0 {
        return Err(CoreError::InvalidConfiguration("snooze must be greater than zero".into()));
    }
    Ok(())
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| NONE_MARK.to_string(), |v| v.to_string())
}

fn number(field: &str) -> CoreResult<u64> {
    field
        .parse()
        .map_err(|_| CoreError::DeserializationFailed(format!("'{}' is not a counter value", field)))
}

fn optional_number<T: std::str::FromStr>(field: &str) -> CoreResult<Option<T>> {
    if field == NONE_MARK {
        return Ok(None);
    }
    field
        .parse()
        .map(Some)
        .map_err(|_| CoreError::DeserializationFailed(format!("'{}' is not a number", field)))
}

fn flag(field: &str) -> CoreResult<bool> {
    match field {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(CoreError::DeserializationFailed(format!("'{}' is not a flag", other))),
    }
}

fn timestamp(secs: i64) -> CoreResult<NaiveDateTime> {
    DateTime::from_timestamp(secs, 0)
        .map(|t| t.naive_utc())
        .ok_or_else(|| CoreError::DeserializationFailed(format!("timestamp {} out of range", secs)))
}
