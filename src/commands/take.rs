//! Forced break command.
//!
//! Starts one break immediately, without a prelude, and waits until it is
//! over. Pressing Ctrl+C postpones the break and exits.

use crate::libs::break_control::BreakId;
use crate::libs::daemon;
use crate::libs::messages::Message;
use crate::libs::presentation::ConsoleSink;
use crate::{msg_info, msg_success};
use anyhow::Result;
use clap::Args;

/// Command-line arguments for the forced break command.
#[derive(Debug, Args)]
pub struct TakeArgs {
    /// Break to take: micro_pause, rest_break or daily_limit
    ///
    /// A break the user has not been active for since its last reset runs
    /// as a countdown of its idle period.
    #[arg(default_value = "rest_break")]
    id: BreakId,
}

/// Executes the forced break command.
///
/// # Arguments
///
/// * `args` - Parsed command-line arguments with the break to take
pub async fn cmd(args: TakeArgs) -> Result<()> {
    msg_info!(Message::ForcedBreakStarting(args.id.to_string()));
    daemon::run_forced_break(args.id, Box::new(ConsoleSink::new())).await?;
    msg_success!(Message::ForcedBreakFinished(args.id.to_string()));
    Ok(())
}
