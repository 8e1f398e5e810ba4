//! Text of every [`Message`].
//!
//! All wording is kept in this one `match`, so a new message cannot be added
//! without deciding how it reads.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigModuleMicroBreak => "Micro pause settings".to_string(),
            Message::ConfigModuleRestBreak => "Rest break settings".to_string(),
            Message::ConfigModuleDailyLimit => "Daily limit settings".to_string(),
            Message::ConfigModuleMonitor => "Monitor settings".to_string(),
            Message::ConfigModuleInsistPolicy => "Insist policy".to_string(),
            Message::PromptSelectModules => "Select sections to configure (space to select, enter to confirm)".to_string(),
            Message::PromptBreakEnabled => "Enable this break?".to_string(),
            Message::PromptLimit => "Active time before the break is due (seconds)".to_string(),
            Message::PromptAutoReset => "Idle time that counts as the break (seconds, 0 to disable)".to_string(),
            Message::PromptSnooze => "Delay before reminding again (seconds)".to_string(),
            Message::PromptMaxPreludes => "Reminders before giving up or forcing (0 for unlimited)".to_string(),
            Message::PromptForceAfterPreludes => "Force the break after the last reminder?".to_string(),
            Message::PromptInsistBreak => "Insist on the break once it is shown?".to_string(),
            Message::PromptIgnorable => "Allow postponing and skipping?".to_string(),
            Message::PromptDailyReset => "Daily reset time (day/HH:MM)".to_string(),
            Message::PromptActivityThreshold => "Seconds a key press or mouse event keeps you active".to_string(),
            Message::PromptSaveInterval => "Seconds between state saves".to_string(),
            Message::PromptInsistPolicy => "While a break insists".to_string(),
            Message::ValueMustBePositive => "Value must be greater than zero".to_string(),

            // === MONITOR MESSAGES ===
            Message::InputListenerStarted => "Listening for keyboard and mouse activity".to_string(),
            Message::InputListenerFailed(reason) => format!("Input listener failed to start: {}", reason),
            Message::InputMonitoringUnavailable(reason) => format!("Input monitoring unavailable: {}", reason),
            Message::MonitorFallbackAlwaysActive => {
                "No activity monitor, every second counts as active. Breaks will only end when postponed or skipped.".to_string()
            }

            // === BREAK WINDOW MESSAGES ===
            Message::PreludeShown(name) => format!("Time for a {}! Please stop working for a moment.", readable(name)),
            Message::PreludeEscalated => "Still busy? Please take your break.".to_string(),
            Message::PreludeDisappearsIn(remaining) => format!("Reminder disappears in {}", remaining),
            Message::PreludeBreakIn(remaining) => format!("Break starts in {}", remaining),
            Message::BreakShown(name) => format!("{} started. Relax and look away from the screen.", capitalized(name)),
            Message::BreakProgress(done, total) => format!("Break progress: {} / {}", done, total),
            Message::BreakWindowClosed(name) => format!("{} closed", capitalized(name)),

            // === BREAK OUTCOME MESSAGES ===
            Message::BreakTaken(name) => format!("{} taken. Well done!", capitalized(name)),
            Message::BreakSkipped(name) => format!("{} skipped", capitalized(name)),
            Message::BreakPostponed(name) => format!("{} postponed", capitalized(name)),
            Message::BreakIgnored(name) => format!("{} reminder ignored", capitalized(name)),
            Message::ForcedBreakStarting(name) => format!("Starting a {} now. Press Ctrl+C to postpone it.", readable(name)),
            Message::ForcedBreakFinished(name) => format!("{} finished", capitalized(name)),

            // === WATCHER MESSAGES ===
            Message::WatcherStarted => "Watching activity. Press Ctrl+C to stop.".to_string(),
            Message::WatcherShuttingDown => "Saving state and shutting down".to_string(),
            Message::WatcherReceivedSigterm => "Received SIGTERM".to_string(),
            Message::WatcherReceivedSigint => "Received SIGINT".to_string(),
            Message::WatcherReceivedCtrlC => "Received Ctrl+C".to_string(),
            Message::WatcherSignalHandlingFailed(error) => format!("Signal handling failed: {}", error),

            // === STATE MESSAGES ===
            Message::StateRestored(count) => format!("Restored {} timer(s) from the previous session", count),
            Message::StateNotFound => "No previous session found".to_string(),
            Message::StateRestoreFailed(error) => format!("Could not restore the previous session, starting fresh: {}", error),
            Message::StateSaveFailed(error) => format!("Failed to save timer state: {}", error),
            Message::StatisticsLoadFailed(error) => format!("Could not read statistics, starting a new day: {}", error),

            // === REPORT MESSAGES ===
            Message::StatusHeader => "Timers".to_string(),
            Message::StatusSavedAt(time) => format!("Last saved at {}", time),
            Message::StatsHeader(date) => format!("Breaks on {}", date),
            Message::NoSavedState => "No saved timers yet. Run `restive watch` first.".to_string(),
        };
        write!(f, "{}", text)
    }
}

fn readable(name: &str) -> String {
    name.replace('_', " ")
}

fn capitalized(name: &str) -> String {
    let readable = readable(name);
    let mut chars = readable.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => readable,
    }
}
