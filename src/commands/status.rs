//! Saved timer status command.
//!
//! Shows each configured timer as the watcher would restore it at this
//! moment: the saved counters plus the time since the save counted as idle.

use crate::libs::break_control::BreakId;
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::libs::state_store::StateStore;
use crate::libs::timer::Timer;
use crate::libs::view::View;
use crate::{msg_info, msg_print};
use anyhow::Result;
use chrono::Local;

/// Prints the timers as they would be restored right now.
///
/// # Returns
///
/// Returns `Ok(())` when there is nothing saved yet. Fails if the
/// configuration or the state file cannot be read.
pub fn cmd() -> Result<()> {
    let config = Config::read()?;
    let Some(state) = StateStore::new()?.read()? else {
        msg_info!(Message::NoSavedState);
        return Ok(());
    };

    let now = Local::now().naive_local();
    let mut timers = Vec::new();
    for id in BreakId::ALL {
        let break_config = config.break_config(id);
        let mut timer = Timer::new(id.name(), &break_config.timer)?;
        if !break_config.enabled {
            timer.disable();
        }
        state.apply_to(&mut timer, now)?;
        timers.push(timer);
    }

    msg_print!(Message::StatusHeader, true);
    View::timers(&timers)?;
    msg_print!(Message::StatusSavedAt(state.saved_at.format("%Y-%m-%d %H:%M:%S").to_string()));
    Ok(())
}
