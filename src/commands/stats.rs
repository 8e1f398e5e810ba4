//! Break statistics command.
//!
//! Prints the counters recorded by the watcher for today and, on request,
//! for the archived days before it.

use crate::libs::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::libs::statistics::{Statistics, STATISTICS_FILE_NAME};
use crate::libs::view::View;
use crate::msg_print;
use anyhow::Result;
use chrono::Local;
use clap::Args;

/// Command-line arguments for the statistics command.
#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Also show this many previous days
    ///
    /// History is kept for a limited number of days; asking for more simply
    /// shows everything there is.
    #[arg(short = 'n', long, default_value_t = 0)]
    days: usize,
}

/// Executes the statistics command.
///
/// Reads the statistics file from the data directory. A missing file shows
/// an empty day rather than failing.
pub fn cmd(args: StatsArgs) -> Result<()> {
    let path = DataStorage::new().get_path(STATISTICS_FILE_NAME)?;
    let statistics = Statistics::load(&path, Local::now().date_naive())?;

    let days = std::iter::once(statistics.current()).chain(statistics.history().take(args.days));
    for day in days {
        msg_print!(Message::StatsHeader(day.date.format("%Y-%m-%d").to_string()), true);
        View::statistics(day)?;
    }
    Ok(())
}
