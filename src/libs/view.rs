//! Terminal tables for the `status` and `stats` commands.

use crate::libs::break_control::BreakId;
use crate::libs::formatter::{format_optional_seconds, format_seconds};
use crate::libs::statistics::DailyStats;
use crate::libs::timer::Timer;
use anyhow::Result;
use prettytable::{row, Table};

pub struct View {}

impl View {
    /// One row per timer with its counters and thresholds.
    pub fn timers(timers: &[Timer]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["BREAK", "ACTIVE", "IDLE", "LIMIT", "NEXT IN", "OVERDUE", "ENABLED"]);
        for timer in timers {
            let limit = if timer.is_limit_enabled() { format_seconds(timer.limit()) } else { "-".to_string() };
            let enabled = if timer.is_enabled() { "yes" } else { "no" };
            table.add_row(row![
                timer.id(),
                format_seconds(timer.elapsed_active()),
                format_seconds(timer.elapsed_idle()),
                limit,
                format_optional_seconds(timer.seconds_until_limit()),
                format_seconds(timer.total_overdue()),
                enabled
            ]);
        }
        table.printstd();

        Ok(())
    }

    /// Counters of one day, one row per break.
    pub fn statistics(day: &DailyStats) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["BREAK", "PROMPTED", "UNIQUE", "TAKEN", "NATURAL", "SKIPPED", "POSTPONED", "OVERDUE"]);
        for id in BreakId::ALL {
            let counters = day.breaks.get(&id).copied().unwrap_or_default();
            table.add_row(row![
                id,
                counters.prompted,
                counters.unique_breaks,
                counters.taken,
                counters.natural_taken,
                counters.skipped,
                counters.postponed,
                format_seconds(counters.total_overdue)
            ]);
        }
        table.printstd();

        Ok(())
    }
}
