//! Break lifecycle state machine.
//!
//! A [`BreakControl`] owns the [`Timer`] of one break kind and decides what
//! the user sees when that timer says the break is due.
//!
//! ## Stages
//!
//! ```text
//!            LimitReached                idle >= 10s
//!   None ───────────────────▶ Prelude ──────────────────▶ Taking
//!    ▲                          │  ▲                         │
//!    │                 active   │  │  active, not insisting  │
//!    │                  30s     ▼  └─────────────────────────┤
//!    │                       Snoozed                         │
//!    └───────────── stop / postpone / skip ◀─────────────────┘
//! ```
//!
//! - **Prelude**: a short warning. The user gets the chance to stop working
//!   on their own; going idle for ten seconds turns the prelude into the break.
//! - **Taking**: the break itself. It ends when the timer reports an
//!   auto-reset (the coordinator stops the break) or when the user postpones
//!   or skips it.
//! - **Snoozed**: the prelude was ignored; the break comes back on the next
//!   `LimitReached`, after the timer's snooze interval.
//!
//! After `max_preludes` ignored preludes the break is either forced
//! (`force_after_preludes`) or left snoozed.
//!
//! ## Insist Policy
//!
//! While an insisting break is being taken, the [`InsistPolicy`] decides how
//! the rest of the engine is held back. `Halt` freezes every timer (the break
//! then times its idle period itself), `Suspend`
//! (and its older name `Ignore`) silences the activity monitor and `Reset`
//! lets activity simply restart the break's idle countdown. The policy that
//! was applied is remembered so it is undone correctly even when the
//! configured policy changes mid-break.
//!
//! ## Collaborators
//!
//! The monitor, the window sink, the statistics and the event queue are
//! owned by the coordinator and lent to each call through a
//! [`BreakContext`]. A request to freeze or thaw all timers is returned in
//! [`BreakContext::freeze_request`], because only the coordinator can reach
//! every timer.

use crate::libs::activity::ActivityMonitor;
use crate::libs::config::BreakConfig;
use crate::libs::error::{CoreError, CoreResult};
use crate::libs::presentation::{PreludeProgressText, PreludeStage, PresentationSink};
use crate::libs::statistics::{BreakValue, Statistics};
use crate::libs::timer::Timer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Seconds shown on the prelude progress bar.
const PRELUDE_DURATION: u64 = 29;
/// An idle user turns the prelude into the break after this many seconds.
const PRELUDE_IDLE_TAKES_BREAK: u64 = 10;
/// An active user ends the prelude after this many seconds.
const PRELUDE_TIMEOUT: u64 = 30;
const PRELUDE_ALERT_AT: u64 = 20;
const PRELUDE_WARN_AT: u64 = 10;
const PRELUDE_MOVE_OUT_AT: u64 = 4;

/// The break kinds, shortest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BreakId {
    #[serde(rename = "micro_pause")]
    MicroBreak,
    #[serde(rename = "rest_break")]
    RestBreak,
    #[serde(rename = "daily_limit")]
    DailyLimit,
}

impl BreakId {
    pub const ALL: [BreakId; 3] = [BreakId::MicroBreak, BreakId::RestBreak, BreakId::DailyLimit];

    pub fn name(self) -> &'static str {
        match self {
            BreakId::MicroBreak => "micro_pause",
            BreakId::RestBreak => "rest_break",
            BreakId::DailyLimit => "daily_limit",
        }
    }
}

impl fmt::Display for BreakId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BreakId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BreakId::ALL
            .into_iter()
            .find(|id| id.name() == s)
            .ok_or_else(|| CoreError::InvalidConfiguration(format!("unknown break '{}'", s)))
    }
}

/// Why a break window is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakHint {
    Normal,
    UserInitiated,
    NaturalBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakStage {
    None,
    Snoozed,
    Prelude,
    Taking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakState {
    Active,
    Inactive,
    Suspended,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum InsistPolicy {
    Halt,
    #[default]
    Reset,
    Suspend,
    Ignore,
}

/// Notable moments in a break's life, drained by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakEvent {
    ShowPrelude,
    ShowBreak,
    ShowBreakForced,
    BreakIgnored,
    BreakTaken,
    BreakIdle,
    BreakPostponed,
    BreakSkipped,
    BreakStop,
}

/// The window a break currently has open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakWindow {
    Prelude,
    Break,
}

/// Collaborators lent to a [`BreakControl`] for one call.
pub struct BreakContext<'a> {
    pub monitor: &'a mut dyn ActivityMonitor,
    pub sink: &'a mut dyn PresentationSink,
    pub statistics: &'a mut Statistics,
    pub events: &'a mut Vec<(BreakId, BreakEvent)>,
    /// Set to `Some(true)` to freeze every timer, `Some(false)` to thaw them.
    pub freeze_request: Option<bool>,
}

impl<'a> BreakContext<'a> {
    pub fn new(
        monitor: &'a mut dyn ActivityMonitor,
        sink: &'a mut dyn PresentationSink,
        statistics: &'a mut Statistics,
        events: &'a mut Vec<(BreakId, BreakEvent)>,
    ) -> Self {
        Self {
            monitor,
            sink,
            statistics,
            events,
            freeze_request: None,
        }
    }
}

pub struct BreakControl {
    id: BreakId,
    timer: Timer,
    stage: BreakStage,
    window: Option<BreakWindow>,

    prelude_count: u32,
    prelude_time: u64,
    max_preludes: Option<u32>,
    force_after_preludes: bool,
    final_prelude: bool,

    hint: BreakHint,
    forced: bool,
    user_initiated: bool,
    user_abort: bool,
    fake_break: bool,
    fake_break_count: u64,
    // Idle seconds seen by the break itself while every timer is halted.
    halt_idle: u64,

    insist_break: bool,
    ignorable: bool,
    insist_policy: InsistPolicy,
    active_insist_policy: Option<InsistPolicy>,
}

impl BreakControl {
    pub fn new(id: BreakId, timer: Timer) -> Self {
        Self {
            id,
            timer,
            stage: BreakStage::None,
            window: None,
            prelude_count: 0,
            prelude_time: 0,
            max_preludes: None,
            force_after_preludes: false,
            final_prelude: false,
            hint: BreakHint::Normal,
            forced: false,
            user_initiated: false,
            user_abort: false,
            fake_break: false,
            fake_break_count: 0,
            halt_idle: 0,
            insist_break: true,
            ignorable: true,
            insist_policy: InsistPolicy::default(),
            active_insist_policy: None,
        }
    }

    /// Builds the timer and the state machine of one configured break.
    pub fn from_config(id: BreakId, config: &BreakConfig) -> CoreResult<Self> {
        let mut timer = Timer::new(id.name(), &config.timer)?;
        if !config.enabled {
            timer.disable();
        }
        let mut control = Self::new(id, timer);
        control.set_max_preludes(config.max_preludes);
        control.set_force_after_preludes(config.force_after_preludes);
        control.set_insist_break(config.insist_break);
        control.set_ignorable_break(config.ignorable);
        Ok(control)
    }

    /// Advances an active prelude or break by one second.
    pub fn heartbeat(&mut self, user_active: bool, ctx: &mut BreakContext) {
        self.prelude_time += 1;

        match self.stage {
            BreakStage::None | BreakStage::Snoozed => {}
            BreakStage::Prelude => {
                ctx.sink.set_break_progress(self.prelude_time, PRELUDE_DURATION);
                ctx.sink.refresh_break_window();

                if !user_active {
                    if self.prelude_time >= PRELUDE_IDLE_TAKES_BREAK {
                        self.goto_stage(BreakStage::Taking, ctx);
                    }
                } else if self.prelude_time >= PRELUDE_TIMEOUT {
                    if self.final_prelude && self.force_after_preludes {
                        self.goto_stage(BreakStage::Taking, ctx);
                    } else {
                        self.goto_stage(BreakStage::Snoozed, ctx);
                    }
                } else if self.prelude_time == PRELUDE_ALERT_AT {
                    ctx.sink.set_prelude_stage(PreludeStage::Alert);
                    ctx.sink.refresh_break_window();
                } else if self.prelude_time == PRELUDE_WARN_AT {
                    ctx.sink.set_prelude_stage(PreludeStage::Warn);
                    ctx.sink.refresh_break_window();
                }

                if self.stage == BreakStage::Prelude && self.prelude_time == PRELUDE_MOVE_OUT_AT {
                    ctx.sink.set_prelude_stage(PreludeStage::MoveOut);
                }
            }
            BreakStage::Taking => {
                if user_active && !self.forced && !self.final_prelude && !self.insist_break && !self.fake_break {
                    debug!(break_id = %self.id, "activity during break, back to prelude");
                    self.goto_stage(BreakStage::Prelude, ctx);
                } else if self.advance_break_window(user_active, ctx) {
                    ctx.sink.refresh_break_window();
                }
            }
        }
    }

    /// Starts the prelude of a break that just became due.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PreconditionViolated`] if a prelude or break is
    /// already shown.
    pub fn start_break(&mut self, ctx: &mut BreakContext) -> CoreResult<()> {
        if self.is_active() {
            return Err(self.violation("start_break while a break is active"));
        }

        self.hint = BreakHint::Normal;
        self.forced = false;
        self.user_initiated = false;
        self.fake_break = false;
        self.prelude_time = 0;
        self.user_abort = false;

        self.final_prelude = self.max_preludes.is_some_and(|max| self.prelude_count + 1 >= max);

        if self.max_preludes.is_some_and(|max| self.prelude_count >= max) {
            if self.force_after_preludes {
                self.goto_stage(BreakStage::Taking, ctx);
            } else {
                self.goto_stage(BreakStage::Snoozed, ctx);
            }
            return Ok(());
        }

        // Idle until proven otherwise.
        ctx.monitor.force_idle();
        self.timer.stop_timer();

        ctx.statistics.increment_break_counter(self.id, BreakValue::Prompted);
        if self.prelude_count == 0 {
            ctx.statistics.increment_break_counter(self.id, BreakValue::UniqueBreaks);
        }

        self.goto_stage(BreakStage::Prelude, ctx);
        Ok(())
    }

    /// Opens the break window right away, skipping the prelude.
    ///
    /// If the timer cannot reset on its own any more (the user has already
    /// been idle for the full auto-reset period, elapsed time was just
    /// cleared, or the timer is disabled) the break runs as a self-timed
    /// countdown.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PreconditionViolated`] if the break is already
    /// being taken.
    pub fn force_start_break(&mut self, hint: BreakHint, ctx: &mut BreakContext) -> CoreResult<()> {
        if self.stage == BreakStage::Taking {
            return Err(self.violation("force_start_break while taking"));
        }

        self.hint = hint;
        self.forced = true;
        self.user_initiated = hint == BreakHint::UserInitiated;
        self.prelude_time = 0;
        self.user_abort = false;
        self.fake_break = false;

        let nothing_to_reset = self.timer.elapsed_idle() >= self.timer.auto_reset() || self.timer.is_idle_reset_done() || !self.timer.is_enabled();
        if self.timer.is_auto_reset_enabled() && nothing_to_reset {
            self.fake_break = true;
            self.fake_break_count = self.timer.auto_reset();
        }

        self.goto_stage(BreakStage::Taking, ctx);
        Ok(())
    }

    /// Ends the break and clears the prelude count. Does nothing when no
    /// break is in progress.
    pub fn stop_break(&mut self, ctx: &mut BreakContext) {
        if self.stage == BreakStage::None {
            return;
        }
        self.hint = BreakHint::Normal;
        self.goto_stage(BreakStage::None, ctx);
        self.prelude_count = 0;
        ctx.events.push((self.id, BreakEvent::BreakStop));
    }

    /// Closes the break and lets it come back after the snooze interval.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PreconditionViolated`] for a break that may not
    /// be ignored.
    pub fn postpone_break(&mut self, ctx: &mut BreakContext) -> CoreResult<()> {
        if !self.is_active() {
            return Ok(());
        }
        if !self.ignorable {
            return Err(self.violation("postpone_break on a break that cannot be ignored"));
        }

        if !self.forced {
            if !self.fake_break {
                self.timer.snooze_timer();
            }
            ctx.statistics.increment_break_counter(self.id, BreakValue::Postponed);
            ctx.events.push((self.id, BreakEvent::BreakPostponed));
        }

        self.user_abort = true;
        self.stop_break(ctx);
        Ok(())
    }

    /// Closes the break and counts it as done.
    ///
    /// Breaks without auto-reset (the daily limit) stay silent until their
    /// next reset instead.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PreconditionViolated`] for a break that may not
    /// be ignored.
    pub fn skip_break(&mut self, ctx: &mut BreakContext) -> CoreResult<()> {
        if !self.is_active() {
            return Ok(());
        }
        if !self.ignorable {
            return Err(self.violation("skip_break on a break that cannot be ignored"));
        }

        self.user_abort = true;

        if self.timer.is_auto_reset_enabled() {
            self.timer.reset_timer();
        } else {
            self.timer.inhibit_snooze();
        }

        ctx.statistics.increment_break_counter(self.id, BreakValue::Skipped);
        ctx.events.push((self.id, BreakEvent::BreakSkipped));

        self.stop_break(ctx);
        Ok(())
    }

    fn goto_stage(&mut self, stage: BreakStage, ctx: &mut BreakContext) {
        debug!(break_id = %self.id, from = ?self.stage, to = ?stage, "break stage change");

        match stage {
            BreakStage::None => {
                let taken = self.stage == BreakStage::Taking
                    && !self.fake_break
                    && !self.user_abort
                    && self.timer.is_auto_reset_enabled()
                    && self.break_idle() >= self.timer.auto_reset();
                if taken && self.is_halted() {
                    // A frozen timer never saw the idle period.
                    self.timer.reset_timer();
                }

                self.close_window(ctx);
                self.defrost(ctx);

                if self.stage == BreakStage::Prelude && !self.forced {
                    ctx.events.push((self.id, BreakEvent::BreakIgnored));
                }

                if taken {
                    ctx.statistics.increment_break_counter(self.id, BreakValue::Taken);
                    ctx.events.push((self.id, BreakEvent::BreakTaken));
                }

                ctx.events.push((self.id, BreakEvent::BreakIdle));
            }
            BreakStage::Snoozed => {
                self.close_window(ctx);
                if !self.forced {
                    ctx.events.push((self.id, BreakEvent::BreakIgnored));
                }
                ctx.events.push((self.id, BreakEvent::BreakIdle));
                self.defrost(ctx);
            }
            BreakStage::Prelude => {
                self.prelude_count += 1;
                self.prelude_time = 0;
                self.close_window(ctx);

                ctx.sink.create_prelude_window(self.id);
                ctx.sink.set_prelude_stage(PreludeStage::Initial);
                ctx.sink.set_prelude_progress_text(if self.final_prelude {
                    PreludeProgressText::BreakIn
                } else {
                    PreludeProgressText::DisappearsIn
                });
                ctx.sink.set_break_progress(self.prelude_time, PRELUDE_DURATION);
                ctx.sink.show_break_window();
                ctx.sink.refresh_break_window();
                self.window = Some(BreakWindow::Prelude);

                ctx.events.push((self.id, BreakEvent::ShowPrelude));
            }
            BreakStage::Taking => {
                self.close_window(ctx);
                self.halt_idle = 0;

                ctx.monitor.force_idle();
                self.timer.stop_timer();

                ctx.sink.create_break_window(self.id, self.hint);
                self.show_break_progress(ctx);
                ctx.sink.show_break_window();
                self.window = Some(BreakWindow::Break);

                let event = if self.forced { BreakEvent::ShowBreakForced } else { BreakEvent::ShowBreak };
                ctx.events.push((self.id, event));

                if self.insist_break {
                    self.freeze(ctx);
                }
            }
        }

        self.stage = stage;
    }

    fn close_window(&mut self, ctx: &mut BreakContext) {
        ctx.sink.hide_break_window();
        self.window = None;
    }

    fn show_break_progress(&self, ctx: &mut BreakContext) {
        let duration = self.timer.auto_reset();
        let idle = if self.fake_break {
            duration.saturating_sub(self.fake_break_count)
        } else {
            self.break_idle()
        };
        ctx.sink.set_break_progress(idle.min(duration), duration);
    }

    /// Updates the break progress for one heartbeat. Returns `false` when a
    /// self-timed or halted break ran out and was stopped.
    fn advance_break_window(&mut self, user_active: bool, ctx: &mut BreakContext) -> bool {
        if self.fake_break {
            if self.fake_break_count == 0 {
                self.stop_break(ctx);
                return false;
            }
            self.fake_break_count -= 1;
        } else if self.is_halted() {
            self.halt_idle = if user_active { 0 } else { self.halt_idle + 1 };
            if self.timer.is_auto_reset_enabled() && self.halt_idle >= self.timer.auto_reset() {
                self.stop_break(ctx);
                return false;
            }
        }
        self.show_break_progress(ctx);
        true
    }

    fn is_halted(&self) -> bool {
        self.active_insist_policy == Some(InsistPolicy::Halt)
    }

    /// Idle seconds that count toward finishing the break.
    fn break_idle(&self) -> u64 {
        if self.is_halted() {
            self.halt_idle
        } else {
            self.timer.elapsed_idle()
        }
    }

    fn freeze(&mut self, ctx: &mut BreakContext) {
        if self.active_insist_policy.is_some() {
            return;
        }
        match self.insist_policy {
            InsistPolicy::Halt => ctx.freeze_request = Some(true),
            InsistPolicy::Suspend | InsistPolicy::Ignore => ctx.monitor.suspend(),
            InsistPolicy::Reset => {}
        }
        self.active_insist_policy = Some(self.insist_policy);
    }

    fn defrost(&mut self, ctx: &mut BreakContext) {
        match self.active_insist_policy.take() {
            Some(InsistPolicy::Halt) => ctx.freeze_request = Some(false),
            Some(InsistPolicy::Suspend | InsistPolicy::Ignore) => ctx.monitor.resume(),
            Some(InsistPolicy::Reset) | None => {}
        }
    }

    fn violation(&self, what: &str) -> CoreError {
        CoreError::PreconditionViolated(format!("{}: {} (stage {:?})", self.id, what, self.stage))
    }

    /// Limits how many preludes are shown before the break gives up or is
    /// forced. `None` keeps prompting forever.
    pub fn set_max_preludes(&mut self, max: Option<u32>) {
        self.max_preludes = max;
    }

    /// When set, the last allowed prelude turns into the break itself
    /// instead of being dismissed.
    pub fn set_force_after_preludes(&mut self, force: bool) {
        self.force_after_preludes = force;
    }

    /// An insisting break stays on screen while the user is active and
    /// holds the engine back according to the insist policy.
    pub fn set_insist_break(&mut self, insist: bool) {
        self.insist_break = insist;
    }

    /// Controls whether the user may postpone or skip the break.
    pub fn set_ignorable_break(&mut self, ignorable: bool) {
        self.ignorable = ignorable;
    }

    /// Changes the insist policy. A policy already in force is undone and the
    /// new one applied in its place.
    pub fn set_insist_policy(&mut self, policy: InsistPolicy, ctx: &mut BreakContext) {
        match self.active_insist_policy {
            Some(active) if active != policy => {
                self.defrost(ctx);
                self.insist_policy = policy;
                self.freeze(ctx);
            }
            _ => self.insist_policy = policy,
        }
    }

    /// Coarse state for the outside world. A disabled timer reports
    /// `Suspended` whatever the stage.
    pub fn get_break_state(&self) -> BreakState {
        if !self.timer.is_enabled() {
            return BreakState::Suspended;
        }
        match self.stage {
            BreakStage::None | BreakStage::Snoozed => BreakState::Inactive,
            BreakStage::Prelude | BreakStage::Taking => BreakState::Active,
        }
    }

    /// True while a prelude or break window is open.
    pub fn need_heartbeat(&self) -> bool {
        matches!(self.stage, BreakStage::Prelude | BreakStage::Taking)
    }

    pub fn is_active(&self) -> bool {
        self.need_heartbeat()
    }

    pub fn id(&self) -> BreakId {
        self.id
    }

    pub fn stage(&self) -> BreakStage {
        self.stage
    }

    pub fn window(&self) -> Option<BreakWindow> {
        self.window
    }

    pub fn prelude_count(&self) -> u32 {
        self.prelude_count
    }

    pub fn prelude_time(&self) -> u64 {
        self.prelude_time
    }

    pub fn max_preludes(&self) -> Option<u32> {
        self.max_preludes
    }

    pub fn is_forced(&self) -> bool {
        self.forced
    }

    pub fn is_user_initiated(&self) -> bool {
        self.user_initiated
    }

    /// True for a forced break that times itself instead of waiting for
    /// the timer to auto-reset.
    pub fn is_fake_break(&self) -> bool {
        self.fake_break
    }

    pub fn is_ignorable(&self) -> bool {
        self.ignorable
    }

    pub fn insist_policy(&self) -> InsistPolicy {
        self.insist_policy
    }

    /// The policy currently holding the engine back, if any. It can differ
    /// from [`BreakControl::insist_policy`] only until the next change is
    /// applied.
    pub fn active_insist_policy(&self) -> Option<InsistPolicy> {
        self.active_insist_policy
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut Timer {
        &mut self.timer
    }
}
