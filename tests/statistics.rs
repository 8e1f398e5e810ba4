#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeDelta};
    use restive::libs::break_control::BreakId;
    use restive::libs::statistics::{BreakValue, Statistics, HISTORY_DAYS, STATISTICS_FILE_NAME};

    fn day(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap() + TimeDelta::days(n)
    }

    #[test]
    fn test_counters_start_at_zero() {
        let stats = Statistics::new(day(0));
        assert_eq!(stats.get(BreakId::RestBreak, BreakValue::Taken), 0);
        assert!(stats.current().breaks.is_empty());
    }

    #[test]
    fn test_increment_and_set_counters() {
        let mut stats = Statistics::new(day(0));

        stats.increment_break_counter(BreakId::MicroBreak, BreakValue::Prompted);
        stats.increment_break_counter(BreakId::MicroBreak, BreakValue::Prompted);
        stats.set_break_counter(BreakId::MicroBreak, BreakValue::TotalOverdue, 75);

        assert_eq!(stats.get(BreakId::MicroBreak, BreakValue::Prompted), 2);
        assert_eq!(stats.get(BreakId::MicroBreak, BreakValue::TotalOverdue), 75);
        assert_eq!(stats.get(BreakId::RestBreak, BreakValue::Prompted), 0);
    }

    #[test]
    fn test_new_day_archives_current() {
        let mut stats = Statistics::new(day(0));
        stats.increment_break_counter(BreakId::RestBreak, BreakValue::Skipped);

        stats.start_new_day(day(1));

        assert_eq!(stats.current().date, day(1));
        assert_eq!(stats.get(BreakId::RestBreak, BreakValue::Skipped), 0);
        let archived: Vec<_> = stats.history().collect();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].date, day(0));
        assert_eq!(archived[0].breaks[&BreakId::RestBreak].skipped, 1);
    }

    #[test]
    fn test_same_day_does_not_archive() {
        let mut stats = Statistics::new(day(0));
        stats.increment_break_counter(BreakId::MicroBreak, BreakValue::Taken);

        stats.start_new_day(day(0));

        assert_eq!(stats.history().count(), 0);
        assert_eq!(stats.get(BreakId::MicroBreak, BreakValue::Taken), 1);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut stats = Statistics::new(day(0));
        for n in 1..=40 {
            stats.start_new_day(day(n));
        }

        assert_eq!(stats.history().count(), HISTORY_DAYS);
        assert_eq!(stats.history().next().unwrap().date, day(39));
        assert_eq!(stats.history().last().unwrap().date, day(10));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STATISTICS_FILE_NAME);
        let mut stats = Statistics::new(day(0));
        stats.increment_break_counter(BreakId::DailyLimit, BreakValue::Postponed);
        stats.start_new_day(day(1));
        stats.increment_break_counter(BreakId::MicroBreak, BreakValue::NaturalTaken);

        stats.save(&path).unwrap();
        let loaded = Statistics::load(&path, day(5)).unwrap();

        assert_eq!(loaded, stats);
        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"micro_pause\""));
        assert!(json.contains("\"daily_limit\""));
    }

    #[test]
    fn test_load_missing_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();

        let stats = Statistics::load(&dir.path().join(STATISTICS_FILE_NAME), day(3)).unwrap();

        assert_eq!(stats, Statistics::new(day(3)));
    }
}
