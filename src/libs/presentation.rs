//! Break window presentation.
//!
//! The engine never draws anything itself. It drives a [`PresentationSink`]
//! with fire-and-forget calls: create a prelude or break window, show it,
//! update its progress, hide it. A desktop front end would map these to real
//! windows; [`ConsoleSink`] maps them to terminal output through the
//! `msg_*` macros.

use crate::libs::break_control::{BreakHint, BreakId};
use crate::libs::formatter::format_seconds;
use crate::libs::messages::Message;
use crate::{msg_debug, msg_info, msg_print, msg_warning};

/// Escalation level of a prelude window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreludeStage {
    Initial,
    MoveOut,
    Warn,
    Alert,
}

/// Caption shown next to the prelude countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreludeProgressText {
    /// The prelude goes away on its own when the countdown ends.
    DisappearsIn,
    /// The break is forced when the countdown ends.
    BreakIn,
}

pub trait PresentationSink: Send {
    fn create_prelude_window(&mut self, id: BreakId);
    fn create_break_window(&mut self, id: BreakId, hint: BreakHint);
    fn hide_break_window(&mut self);
    fn show_break_window(&mut self);
    fn refresh_break_window(&mut self);
    fn set_break_progress(&mut self, value: u64, max: u64);
    fn set_prelude_stage(&mut self, stage: PreludeStage);
    fn set_prelude_progress_text(&mut self, text: PreludeProgressText);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Window {
    Prelude(BreakId),
    Break(BreakId),
}

/// Progress is echoed to the terminal every this many seconds.
const REFRESH_EVERY: u64 = 10;

/// Terminal front end.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    window: Option<Window>,
    visible: bool,
    progress: (u64, u64),
    text: Option<PreludeProgressText>,
    last_printed: Option<u64>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresentationSink for ConsoleSink {
    fn create_prelude_window(&mut self, id: BreakId) {
        self.window = Some(Window::Prelude(id));
        self.visible = false;
        self.last_printed = None;
    }

    fn create_break_window(&mut self, id: BreakId, hint: BreakHint) {
        msg_debug!(format!("break window for {} ({:?})", id, hint));
        self.window = Some(Window::Break(id));
        self.visible = false;
        self.last_printed = None;
    }

    fn hide_break_window(&mut self) {
        if self.visible {
            if let Some(Window::Break(id)) = self.window {
                msg_info!(Message::BreakWindowClosed(id.to_string()));
            }
        }
        self.window = None;
        self.visible = false;
    }

    fn show_break_window(&mut self) {
        self.visible = true;
        match self.window {
            Some(Window::Prelude(id)) => msg_warning!(Message::PreludeShown(id.to_string())),
            Some(Window::Break(id)) => msg_info!(Message::BreakShown(id.to_string())),
            None => {}
        }
    }

    fn refresh_break_window(&mut self) {
        if !self.visible || self.last_printed == Some(self.progress.0) || self.progress.0 % REFRESH_EVERY != 0 {
            return;
        }
        self.last_printed = Some(self.progress.0);
        let (value, max) = self.progress;
        match self.window {
            Some(Window::Prelude(_)) => {
                let remaining = format_seconds(max.saturating_sub(value));
                match self.text {
                    Some(PreludeProgressText::BreakIn) => msg_print!(Message::PreludeBreakIn(remaining)),
                    _ => msg_print!(Message::PreludeDisappearsIn(remaining)),
                }
            }
            Some(Window::Break(_)) => msg_print!(Message::BreakProgress(format_seconds(value), format_seconds(max))),
            None => {}
        }
    }

    fn set_break_progress(&mut self, value: u64, max: u64) {
        self.progress = (value, max);
    }

    fn set_prelude_stage(&mut self, stage: PreludeStage) {
        match stage {
            PreludeStage::Warn | PreludeStage::Alert if self.visible => msg_warning!(Message::PreludeEscalated),
            _ => {}
        }
    }

    fn set_prelude_progress_text(&mut self, text: PreludeProgressText) {
        self.text = Some(text);
    }
}
