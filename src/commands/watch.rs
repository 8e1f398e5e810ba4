//! Foreground watcher command.
//!
//! Monitors keyboard and mouse activity and shows break reminders on the
//! console until the process receives Ctrl+C or SIGTERM.

use crate::libs::daemon;
use crate::libs::presentation::ConsoleSink;
use anyhow::Result;

/// Runs the break reminder until interrupted.
///
/// State and statistics are saved on the way out.
pub async fn cmd() -> Result<()> {
    daemon::run_with_signal_handling(Box::new(ConsoleSink::new())).await
}
