//! The break coordinator: one heartbeat for all breaks.
//!
//! [`BreakCoordinator`] owns every [`BreakControl`] (and through them every
//! timer) together with the shared collaborators: the activity monitor, the
//! presentation sink and the statistics. Once per second the host calls
//! [`BreakCoordinator::heartbeat`], which:
//!
//! 1. samples the activity monitor,
//! 2. polls the daily reset rules,
//! 3. advances every timer (shortest break first),
//! 4. reacts to the timer events (longest break first, so a break that
//!    starts is visible when shorter breaks are considered),
//! 5. advances every prelude or break on screen.
//!
//! ## Arbitration
//!
//! At most one break is shown at a time. A break that becomes due is held
//! back while it or any longer break is active, and a starting break closes
//! any shorter one. A micro pause that falls due shortly before a rest break
//! is absorbed by it: the rest break starts early instead.
//!
//! ## Operation Modes
//!
//! - **Normal**: breaks are prompted as usual
//! - **Quiet**: timers keep counting but no break is prompted
//! - **Suspended**: the monitor is suspended and every tick counts as idle
//!
//! ## Failure Handling
//!
//! Requests that make no sense in the current stage (postponing a break that
//! cannot be ignored, forcing a break that is already shown) are logged and
//! dropped. `heartbeat` never fails.

use crate::libs::activity::{ActivityMonitor, AlwaysActiveMonitor};
use crate::libs::break_control::{BreakContext, BreakControl, BreakEvent, BreakHint, BreakId, BreakStage, InsistPolicy};
use crate::libs::config::Config;
use crate::libs::error::{CoreError, CoreResult};
use crate::libs::messages::Message;
use crate::libs::presentation::PresentationSink;
use crate::libs::statistics::{BreakValue, Statistics};
use crate::libs::timer::{Timer, TimerEvent};
use crate::msg_warning;
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

/// Extra seconds of slack when deciding that a rest break absorbs a micro
/// pause.
const REST_ABSORBS_MICRO_MARGIN: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationMode {
    #[default]
    Normal,
    Quiet,
    Suspended,
}

pub struct BreakCoordinator {
    breaks: Vec<BreakControl>,
    monitor: Box<dyn ActivityMonitor>,
    sink: Box<dyn PresentationSink>,
    statistics: Statistics,
    events: Vec<(BreakId, BreakEvent)>,
    mode: OperationMode,
    user_active: bool,
}

impl BreakCoordinator {
    /// Takes ownership of the breaks and collaborators.
    ///
    /// Without a monitor every tick is treated as active.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfiguration`] when two breaks share an id.
    pub fn new(
        mut breaks: Vec<BreakControl>,
        monitor: Option<Box<dyn ActivityMonitor>>,
        sink: Box<dyn PresentationSink>,
        statistics: Statistics,
    ) -> CoreResult<Self> {
        breaks.sort_by_key(|b| b.id());
        if breaks.windows(2).any(|pair| pair[0].id() == pair[1].id()) {
            return Err(CoreError::InvalidConfiguration("each break kind may be configured once".into()));
        }

        let monitor = monitor.unwrap_or_else(|| {
            msg_warning!(Message::MonitorFallbackAlwaysActive);
            Box::new(AlwaysActiveMonitor::default())
        });

        Ok(Self {
            breaks,
            monitor,
            sink,
            statistics,
            events: Vec::new(),
            mode: OperationMode::Normal,
            user_active: false,
        })
    }

    /// Builds all three breaks from the configuration.
    pub fn from_config(
        config: &Config,
        monitor: Option<Box<dyn ActivityMonitor>>,
        sink: Box<dyn PresentationSink>,
        statistics: Statistics,
    ) -> CoreResult<Self> {
        let breaks = BreakId::ALL
            .into_iter()
            .map(|id| BreakControl::from_config(id, &config.break_config(id)))
            .collect::<CoreResult<Vec<_>>>()?;

        let mut coordinator = Self::new(breaks, monitor, sink, statistics)?;
        coordinator.set_insist_policy(config.insist_policy());
        Ok(coordinator)
    }

    /// Runs one second of the engine.
    pub fn heartbeat(&mut self, now: NaiveDateTime) {
        let active = match self.mode {
            OperationMode::Suspended => false,
            _ => self.monitor.is_active(),
        };
        self.user_active = active;

        let mut timer_events = vec![TimerEvent::None; self.breaks.len()];

        let mut day_rolled = false;
        for (event, control) in timer_events.iter_mut().zip(self.breaks.iter_mut()) {
            if control.timer_mut().poll_daily_reset(now) {
                control.timer_mut().reset_timer();
                *event = TimerEvent::Reset;
                day_rolled = true;
            }
        }
        if day_rolled {
            self.daily_reset(now.date());
        }

        for (event, control) in timer_events.iter_mut().zip(self.breaks.iter_mut()) {
            let processed = control.timer_mut().process(active);
            if *event == TimerEvent::None {
                *event = processed;
            }
        }

        for index in (0..self.breaks.len()).rev() {
            let id = self.breaks[index].id();
            self.timer_action(id, timer_events[index]);
        }

        for index in 0..self.breaks.len() {
            if self.breaks[index].need_heartbeat() {
                self.with_break(index, |control, ctx| control.heartbeat(active, ctx));
            }
        }
    }

    fn timer_action(&mut self, id: BreakId, event: TimerEvent) {
        match event {
            TimerEvent::None => {}
            TimerEvent::LimitReached => {
                if self.mode == OperationMode::Normal {
                    self.start_break(id);
                }
            }
            TimerEvent::NaturalReset => {
                self.statistics.increment_break_counter(id, BreakValue::NaturalTaken);
                self.stop_if_running(id);
            }
            TimerEvent::Reset => self.stop_if_running(id),
        }
    }

    fn stop_if_running(&mut self, id: BreakId) {
        if let Some(index) = self.index_of(id) {
            if self.breaks[index].stage() != BreakStage::None {
                self.with_break(index, |control, ctx| control.stop_break(ctx));
            }
        }
    }

    fn start_break(&mut self, id: BreakId) {
        let Some(index) = self.index_of(id) else {
            return;
        };

        if self.breaks[index..].iter().any(|b| b.is_active()) {
            debug!(break_id = %id, "break due but this or a longer break is active");
            return;
        }

        if id == BreakId::MicroBreak {
            if let Some(rest) = self.index_of(BreakId::RestBreak) {
                let micro_reset = self.breaks[index].timer().auto_reset();
                let rest_remaining = self.breaks[rest].timer().seconds_until_limit();
                if rest_remaining.is_some_and(|remaining| remaining <= micro_reset + REST_ABSORBS_MICRO_MARGIN) {
                    debug!(remaining = ?rest_remaining, "rest break absorbs micro pause");
                    self.breaks[rest].timer_mut().snooze_timer();
                    self.start_break(BreakId::RestBreak);
                    return;
                }
            }
        }

        for shorter in 0..index {
            if self.breaks[shorter].is_active() {
                self.with_break(shorter, |control, ctx| control.stop_break(ctx));
            }
        }

        let result = self.with_break(index, |control, ctx| control.start_break(ctx));
        report_ignored(result);
    }

    /// Shows a break right away, closing any other break on screen.
    pub fn force_break(&mut self, id: BreakId, hint: BreakHint) {
        let Some(index) = self.index_of(id) else {
            warn!(break_id = %id, "cannot force a break that is not configured");
            return;
        };

        for other in 0..self.breaks.len() {
            if other != index && self.breaks[other].is_active() {
                self.with_break(other, |control, ctx| control.stop_break(ctx));
            }
        }

        let result = self.with_break(index, |control, ctx| control.force_start_break(hint, ctx));
        report_ignored(result);
    }

    /// Postpones a break on screen. The reminder returns after the break's
    /// snooze interval.
    ///
    /// Errors from the break (for example a break that cannot be ignored)
    /// are logged and otherwise ignored.
    pub fn postpone_break(&mut self, id: BreakId) {
        if let Some(index) = self.index_of(id) {
            let result = self.with_break(index, |control, ctx| control.postpone_break(ctx));
            report_ignored(result);
        }
    }

    /// Skips a break on screen and counts it as skipped. See
    /// [`BreakControl::skip_break`] for what happens to the timer.
    pub fn skip_break(&mut self, id: BreakId) {
        if let Some(index) = self.index_of(id) {
            let result = self.with_break(index, |control, ctx| control.skip_break(ctx));
            report_ignored(result);
        }
    }

    /// Closes every break window.
    pub fn stop_all_breaks(&mut self) {
        for index in 0..self.breaks.len() {
            self.with_break(index, |control, ctx| control.stop_break(ctx));
        }
    }

    /// Applies `policy` to every break. A break that is currently insisting
    /// swaps its hold on the engine right away.
    pub fn set_insist_policy(&mut self, policy: InsistPolicy) {
        for index in 0..self.breaks.len() {
            self.with_break(index, |control, ctx| control.set_insist_policy(policy, ctx));
        }
    }

    /// Switches between normal, quiet and suspended operation.
    ///
    /// Leaving `Normal` closes any break on screen. `Suspended` also stops
    /// the activity monitor until another mode is chosen.
    pub fn set_operation_mode(&mut self, mode: OperationMode) {
        if mode == self.mode {
            return;
        }
        info!(from = ?self.mode, to = ?mode, "operation mode change");

        let previous = std::mem::replace(&mut self.mode, mode);
        match mode {
            OperationMode::Suspended => {
                self.stop_all_breaks();
                self.monitor.suspend();
                for control in &mut self.breaks {
                    control.timer_mut().stop_timer();
                }
            }
            OperationMode::Quiet => {
                self.stop_all_breaks();
                if previous == OperationMode::Suspended {
                    self.monitor.resume();
                }
            }
            OperationMode::Normal => {
                if previous == OperationMode::Suspended {
                    self.monitor.resume();
                }
            }
        }
    }

    /// Ends the current day: archives the statistics and clears overdue
    /// time on every timer.
    pub fn daily_reset(&mut self, date: NaiveDate) {
        info!(%date, "daily reset");
        self.sync_statistics();
        self.statistics.start_new_day(date);
        for control in &mut self.breaks {
            control.timer_mut().daily_reset();
        }
    }

    /// Copies the overdue totals of the timers into today's statistics.
    pub fn sync_statistics(&mut self) {
        for control in &self.breaks {
            self.statistics
                .set_break_counter(control.id(), BreakValue::TotalOverdue, control.timer().total_overdue());
        }
    }

    /// Drains the break events produced since the last call.
    pub fn take_events(&mut self) -> Vec<(BreakId, BreakEvent)> {
        std::mem::take(&mut self.events)
    }

    fn with_break<R>(&mut self, index: usize, f: impl FnOnce(&mut BreakControl, &mut BreakContext) -> R) -> R {
        let mut ctx = BreakContext::new(self.monitor.as_mut(), self.sink.as_mut(), &mut self.statistics, &mut self.events);
        let result = f(&mut self.breaks[index], &mut ctx);
        let freeze = ctx.freeze_request;

        if let Some(frozen) = freeze {
            debug!(frozen, "freezing all timers");
            for control in &mut self.breaks {
                control.timer_mut().freeze_timer(frozen);
            }
        }
        result
    }

    fn index_of(&self, id: BreakId) -> Option<usize> {
        self.breaks.iter().position(|b| b.id() == id)
    }

    /// Breaks in id order, shortest first.
    pub fn breaks(&self) -> &[BreakControl] {
        &self.breaks
    }

    pub fn break_control(&self, id: BreakId) -> Option<&BreakControl> {
        self.breaks.iter().find(|b| b.id() == id)
    }

    pub fn timer(&self, id: BreakId) -> Option<&Timer> {
        self.break_control(id).map(|b| b.timer())
    }

    pub fn timer_mut(&mut self, id: BreakId) -> Option<&mut Timer> {
        self.breaks.iter_mut().find(|b| b.id() == id).map(|b| b.timer_mut())
    }

    /// The break currently in prelude or being taken.
    pub fn active_break(&self) -> Option<BreakId> {
        self.breaks.iter().find(|b| b.is_active()).map(|b| b.id())
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn operation_mode(&self) -> OperationMode {
        self.mode
    }

    /// Activity sampled by the last heartbeat.
    pub fn user_active(&self) -> bool {
        self.user_active
    }
}

fn report_ignored(result: CoreResult<()>) {
    if let Err(e) = result {
        warn!(error = %e, "break request ignored");
    }
}
