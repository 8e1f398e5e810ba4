#![allow(dead_code)]

use parking_lot::Mutex;
use restive::libs::activity::ActivityMonitor;
use restive::libs::break_control::{BreakHint, BreakId};
use restive::libs::presentation::{PreludeProgressText, PreludeStage, PresentationSink};
use restive::libs::timer::TimerConfig;
use std::sync::Arc;

pub fn timer_config(limit: u64, auto_reset: u64, snooze: u64) -> TimerConfig {
    TimerConfig {
        limit,
        limit_enabled: true,
        auto_reset,
        auto_reset_enabled: true,
        snooze,
        daily_reset: None,
    }
}

#[derive(Debug, Default)]
pub struct MonitorState {
    pub active: bool,
    pub suspended: bool,
    pub force_idle_calls: u32,
}

/// Activity source whose answer is set by the test.
#[derive(Debug, Clone, Default)]
pub struct ScriptedMonitor {
    pub state: Arc<Mutex<MonitorState>>,
}

impl ScriptedMonitor {
    pub fn set_active(&self, active: bool) {
        self.state.lock().active = active;
    }

    pub fn is_suspended(&self) -> bool {
        self.state.lock().suspended
    }

    pub fn force_idle_calls(&self) -> u32 {
        self.state.lock().force_idle_calls
    }
}

impl ActivityMonitor for ScriptedMonitor {
    fn is_active(&self) -> bool {
        let state = self.state.lock();
        state.active && !state.suspended
    }

    fn force_idle(&mut self) {
        self.state.lock().force_idle_calls += 1;
    }

    fn suspend(&mut self) {
        self.state.lock().suspended = true;
    }

    fn resume(&mut self) {
        self.state.lock().suspended = false;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    CreatePrelude(BreakId),
    CreateBreak(BreakId, BreakHint),
    Hide,
    Show,
    Refresh,
    Progress(u64, u64),
    Stage(PreludeStage),
    Text(PreludeProgressText),
}

/// Presentation sink that records every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub calls: Arc<Mutex<Vec<SinkCall>>>,
}

impl RecordingSink {
    pub fn take(&self) -> Vec<SinkCall> {
        std::mem::take(&mut *self.calls.lock())
    }

    pub fn contains(&self, call: &SinkCall) -> bool {
        self.calls.lock().contains(call)
    }

    pub fn last_progress(&self) -> Option<(u64, u64)> {
        self.calls.lock().iter().rev().find_map(|c| match c {
            SinkCall::Progress(value, max) => Some((*value, *max)),
            _ => None,
        })
    }
}

impl PresentationSink for RecordingSink {
    fn create_prelude_window(&mut self, id: BreakId) {
        self.calls.lock().push(SinkCall::CreatePrelude(id));
    }

    fn create_break_window(&mut self, id: BreakId, hint: BreakHint) {
        self.calls.lock().push(SinkCall::CreateBreak(id, hint));
    }

    fn hide_break_window(&mut self) {
        self.calls.lock().push(SinkCall::Hide);
    }

    fn show_break_window(&mut self) {
        self.calls.lock().push(SinkCall::Show);
    }

    fn refresh_break_window(&mut self) {
        self.calls.lock().push(SinkCall::Refresh);
    }

    fn set_break_progress(&mut self, value: u64, max: u64) {
        self.calls.lock().push(SinkCall::Progress(value, max));
    }

    fn set_prelude_stage(&mut self, stage: PreludeStage) {
        self.calls.lock().push(SinkCall::Stage(stage));
    }

    fn set_prelude_progress_text(&mut self, text: PreludeProgressText) {
        self.calls.lock().push(SinkCall::Text(text));
    }
}

static ENV_LOCK: Mutex<()> = parking_lot::const_mutex(());

/// Points the data directory at a fresh temporary directory.
///
/// Tests in one binary share the process environment, so the context holds a
/// lock for its whole lifetime.
pub struct DataDirContext {
    pub temp_dir: tempfile::TempDir,
    _env: parking_lot::MutexGuard<'static, ()>,
}

impl test_context::TestContext for DataDirContext {
    fn setup() -> Self {
        let env = ENV_LOCK.lock();
        let temp_dir = tempfile::tempdir().unwrap();
        std::env::set_var("HOME", temp_dir.path());
        std::env::set_var("LOCALAPPDATA", temp_dir.path());
        DataDirContext { temp_dir, _env: env }
    }
}
