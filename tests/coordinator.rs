mod common;

#[cfg(test)]
mod tests {
    use crate::common::{timer_config, RecordingSink, ScriptedMonitor};
    use chrono::{NaiveDate, NaiveDateTime};
    use restive::libs::break_control::{BreakControl, BreakEvent, BreakHint, BreakId, BreakStage, InsistPolicy};
    use restive::libs::coordinator::{BreakCoordinator, OperationMode};
    use restive::libs::error::CoreError;
    use restive::libs::statistics::{BreakValue, Statistics};
    use restive::libs::timer::{Timer, TimerConfig};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn at(hour: u32, min: u32, sec: u32) -> NaiveDateTime {
        day().and_hms_opt(hour, min, sec).unwrap()
    }

    fn control(id: BreakId, config: TimerConfig) -> BreakControl {
        BreakControl::new(id, Timer::new(id.name(), &config).unwrap())
    }

    struct Setup {
        coordinator: BreakCoordinator,
        monitor: ScriptedMonitor,
        sink: RecordingSink,
    }

    impl Setup {
        fn new(breaks: Vec<BreakControl>) -> Self {
            let monitor = ScriptedMonitor::default();
            monitor.set_active(true);
            let sink = RecordingSink::default();
            let coordinator = BreakCoordinator::new(
                breaks,
                Some(Box::new(monitor.clone())),
                Box::new(sink.clone()),
                Statistics::new(day()),
            )
            .unwrap();
            Self { coordinator, monitor, sink }
        }

        /// Micro pause every 10s (5s reset) and rest break every `rest_limit`
        /// seconds (30s reset).
        fn two_breaks(rest_limit: u64) -> Self {
            Self::new(vec![
                control(BreakId::MicroBreak, timer_config(10, 5, 20)),
                control(BreakId::RestBreak, timer_config(rest_limit, 30, 50)),
            ])
        }

        fn run(&mut self, ticks: u32) {
            for _ in 0..ticks {
                self.coordinator.heartbeat(at(9, 0, 0));
            }
        }

        fn stage(&self, id: BreakId) -> BreakStage {
            self.coordinator.break_control(id).unwrap().stage()
        }
    }

    #[test]
    fn test_breaks_are_kept_shortest_first() {
        let setup = Setup::new(vec![
            control(BreakId::DailyLimit, timer_config(1000, 60, 60)),
            control(BreakId::MicroBreak, timer_config(10, 5, 20)),
            control(BreakId::RestBreak, timer_config(100, 30, 50)),
        ]);

        let ids: Vec<_> = setup.coordinator.breaks().iter().map(|b| b.id()).collect();

        assert_eq!(ids, vec![BreakId::MicroBreak, BreakId::RestBreak, BreakId::DailyLimit]);
    }

    #[test]
    fn test_duplicate_break_is_rejected() {
        let result = BreakCoordinator::new(
            vec![
                control(BreakId::MicroBreak, timer_config(10, 5, 20)),
                control(BreakId::MicroBreak, timer_config(20, 5, 20)),
            ],
            None,
            Box::new(RecordingSink::default()),
            Statistics::new(day()),
        );

        assert!(matches!(result, Err(CoreError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_missing_monitor_counts_every_tick_as_active() {
        let mut coordinator = BreakCoordinator::new(
            vec![control(BreakId::MicroBreak, timer_config(100, 5, 20))],
            None,
            Box::new(RecordingSink::default()),
            Statistics::new(day()),
        )
        .unwrap();

        for _ in 0..3 {
            coordinator.heartbeat(at(9, 0, 0));
        }

        assert!(coordinator.user_active());
        assert_eq!(coordinator.timer(BreakId::MicroBreak).unwrap().elapsed_active(), 3);
    }

    #[test]
    fn test_due_break_shows_prelude() {
        let mut setup = Setup::two_breaks(100);

        setup.run(9);
        assert_eq!(setup.coordinator.active_break(), None);

        setup.run(1);
        assert_eq!(setup.coordinator.active_break(), Some(BreakId::MicroBreak));
        assert_eq!(setup.stage(BreakId::MicroBreak), BreakStage::Prelude);
        assert_eq!(setup.coordinator.break_control(BreakId::MicroBreak).unwrap().prelude_time(), 1);
        assert!(setup
            .coordinator
            .take_events()
            .contains(&(BreakId::MicroBreak, BreakEvent::ShowPrelude)));
    }

    #[test]
    fn test_rest_break_absorbs_imminent_micro_pause() {
        let mut setup = Setup::two_breaks(40);

        setup.run(10);

        assert_eq!(setup.coordinator.active_break(), Some(BreakId::RestBreak));
        assert_eq!(setup.stage(BreakId::RestBreak), BreakStage::Prelude);
        assert_eq!(setup.stage(BreakId::MicroBreak), BreakStage::None);
    }

    #[test]
    fn test_distant_rest_break_does_not_absorb() {
        let mut setup = Setup::two_breaks(100);

        setup.run(10);

        assert_eq!(setup.stage(BreakId::MicroBreak), BreakStage::Prelude);
        assert_eq!(setup.stage(BreakId::RestBreak), BreakStage::None);
    }

    #[test]
    fn test_longer_break_replaces_shorter_one() {
        let mut setup = Setup::two_breaks(20);
        setup.coordinator.force_break(BreakId::MicroBreak, BreakHint::Normal);
        assert_eq!(setup.stage(BreakId::MicroBreak), BreakStage::Taking);

        setup.run(20);

        assert_eq!(setup.stage(BreakId::MicroBreak), BreakStage::None);
        assert_eq!(setup.stage(BreakId::RestBreak), BreakStage::Prelude);
        assert_eq!(setup.coordinator.active_break(), Some(BreakId::RestBreak));
        assert!(setup
            .coordinator
            .take_events()
            .contains(&(BreakId::MicroBreak, BreakEvent::BreakStop)));
    }

    #[test]
    fn test_force_break_closes_other_breaks() {
        let mut setup = Setup::two_breaks(100);
        setup.run(10);
        assert_eq!(setup.stage(BreakId::MicroBreak), BreakStage::Prelude);

        setup.coordinator.force_break(BreakId::RestBreak, BreakHint::UserInitiated);

        assert_eq!(setup.stage(BreakId::MicroBreak), BreakStage::None);
        assert_eq!(setup.stage(BreakId::RestBreak), BreakStage::Taking);
        let rest = setup.coordinator.break_control(BreakId::RestBreak).unwrap();
        assert!(rest.is_forced());
        assert!(rest.is_user_initiated());
    }

    #[test]
    fn test_natural_break_is_counted() {
        let mut setup = Setup::two_breaks(100);
        setup.run(3);

        setup.monitor.set_active(false);
        setup.run(5);

        let stats = setup.coordinator.statistics();
        assert_eq!(stats.get(BreakId::MicroBreak, BreakValue::NaturalTaken), 1);
        assert_eq!(stats.get(BreakId::RestBreak, BreakValue::NaturalTaken), 0);
        assert_eq!(setup.coordinator.timer(BreakId::MicroBreak).unwrap().elapsed_active(), 0);
    }

    #[test]
    fn test_break_ends_when_idle_period_completes() {
        let mut setup = Setup::new(vec![
            control(BreakId::MicroBreak, timer_config(10, 15, 20)),
            control(BreakId::RestBreak, timer_config(100, 30, 50)),
        ]);
        setup.run(10);
        setup.monitor.set_active(false);

        setup.run(9);
        assert_eq!(setup.stage(BreakId::MicroBreak), BreakStage::Taking);

        setup.run(6);
        assert_eq!(setup.stage(BreakId::MicroBreak), BreakStage::None);
        assert_eq!(setup.coordinator.statistics().get(BreakId::MicroBreak, BreakValue::Taken), 1);
        assert!(setup
            .coordinator
            .take_events()
            .contains(&(BreakId::MicroBreak, BreakEvent::BreakTaken)));
    }

    #[test]
    fn test_halt_policy_freezes_every_timer() {
        let mut setup = Setup::two_breaks(100);
        setup.coordinator.set_insist_policy(InsistPolicy::Halt);
        setup.coordinator.force_break(BreakId::RestBreak, BreakHint::Normal);

        assert!(setup.coordinator.timer(BreakId::MicroBreak).unwrap().is_frozen());
        setup.run(5);
        assert_eq!(setup.coordinator.timer(BreakId::MicroBreak).unwrap().elapsed_active(), 0);

        setup.coordinator.postpone_break(BreakId::RestBreak);

        assert_eq!(setup.stage(BreakId::RestBreak), BreakStage::None);
        assert!(!setup.coordinator.timer(BreakId::MicroBreak).unwrap().is_frozen());
        assert!(!setup.coordinator.timer(BreakId::RestBreak).unwrap().is_frozen());
    }

    #[test]
    fn test_halted_break_completes_on_its_own_idle_count() {
        let mut setup = Setup::new(vec![
            control(BreakId::MicroBreak, timer_config(10, 15, 20)),
            control(BreakId::RestBreak, timer_config(100, 30, 50)),
        ]);
        setup.coordinator.set_insist_policy(InsistPolicy::Halt);
        setup.run(10);
        setup.monitor.set_active(false);

        setup.run(9);
        assert_eq!(setup.stage(BreakId::MicroBreak), BreakStage::Taking);
        assert!(setup.coordinator.timer(BreakId::RestBreak).unwrap().is_frozen());

        setup.run(14);
        assert_eq!(setup.stage(BreakId::MicroBreak), BreakStage::Taking);
        assert_eq!(setup.coordinator.timer(BreakId::MicroBreak).unwrap().elapsed_idle(), 9);

        setup.run(1);
        assert_eq!(setup.stage(BreakId::MicroBreak), BreakStage::None);
        assert_eq!(setup.coordinator.statistics().get(BreakId::MicroBreak, BreakValue::Taken), 1);
        let micro = setup.coordinator.timer(BreakId::MicroBreak).unwrap();
        assert!(!micro.is_frozen());
        assert_eq!(micro.elapsed_active(), 0);
        assert!(!setup.coordinator.timer(BreakId::RestBreak).unwrap().is_frozen());
    }

    #[test]
    fn test_forced_break_on_fresh_timer_ends_by_itself() {
        let mut setup = Setup::new(vec![control(BreakId::MicroBreak, timer_config(180, 30, 150))]);
        setup.monitor.set_active(false);

        setup.coordinator.force_break(BreakId::MicroBreak, BreakHint::UserInitiated);
        setup.run(30);
        assert_eq!(setup.stage(BreakId::MicroBreak), BreakStage::Taking);

        setup.run(1);
        assert_eq!(setup.stage(BreakId::MicroBreak), BreakStage::None);
        assert!(setup
            .coordinator
            .take_events()
            .contains(&(BreakId::MicroBreak, BreakEvent::BreakStop)));
    }

    #[test]
    fn test_forced_break_after_skip_ends_by_itself() {
        let mut setup = Setup::new(vec![control(BreakId::MicroBreak, timer_config(180, 30, 150))]);
        setup.run(180);
        setup.coordinator.skip_break(BreakId::MicroBreak);
        setup.monitor.set_active(false);

        setup.coordinator.force_break(BreakId::MicroBreak, BreakHint::UserInitiated);
        setup.run(31);

        assert_eq!(setup.stage(BreakId::MicroBreak), BreakStage::None);
        assert_eq!(setup.coordinator.active_break(), None);
    }

    #[test]
    fn test_forced_break_ends_on_natural_reset() {
        let mut setup = Setup::two_breaks(100);
        setup.coordinator.set_insist_policy(InsistPolicy::Reset);
        setup.run(3);

        setup.coordinator.force_break(BreakId::MicroBreak, BreakHint::UserInitiated);
        assert!(!setup.coordinator.break_control(BreakId::MicroBreak).unwrap().is_fake_break());
        setup.monitor.set_active(false);

        setup.run(4);
        assert_eq!(setup.stage(BreakId::MicroBreak), BreakStage::Taking);

        setup.run(1);
        assert_eq!(setup.stage(BreakId::MicroBreak), BreakStage::None);
        let stats = setup.coordinator.statistics();
        assert_eq!(stats.get(BreakId::MicroBreak, BreakValue::NaturalTaken), 1);
        assert_eq!(stats.get(BreakId::MicroBreak, BreakValue::Taken), 1);
    }

    #[test]
    fn test_skip_break_through_coordinator() {
        let mut setup = Setup::two_breaks(100);
        setup.run(10);

        setup.coordinator.skip_break(BreakId::MicroBreak);

        assert_eq!(setup.stage(BreakId::MicroBreak), BreakStage::None);
        assert_eq!(setup.coordinator.statistics().get(BreakId::MicroBreak, BreakValue::Skipped), 1);
        assert_eq!(setup.coordinator.timer(BreakId::MicroBreak).unwrap().elapsed_active(), 0);
    }

    #[test]
    fn test_quiet_mode_counts_but_never_prompts() {
        let mut setup = Setup::two_breaks(100);
        setup.run(10);
        assert_eq!(setup.stage(BreakId::MicroBreak), BreakStage::Prelude);

        setup.coordinator.set_operation_mode(OperationMode::Quiet);
        assert_eq!(setup.stage(BreakId::MicroBreak), BreakStage::None);

        setup.run(40);
        assert_eq!(setup.coordinator.active_break(), None);
        assert_eq!(setup.coordinator.timer(BreakId::MicroBreak).unwrap().elapsed_active(), 50);
        assert_eq!(setup.coordinator.operation_mode(), OperationMode::Quiet);
    }

    #[test]
    fn test_suspended_mode_treats_user_as_idle() {
        let mut setup = Setup::two_breaks(100);
        setup.run(3);

        setup.coordinator.set_operation_mode(OperationMode::Suspended);
        assert!(setup.monitor.is_suspended());
        setup.run(2);
        assert!(!setup.coordinator.user_active());
        assert_eq!(setup.coordinator.timer(BreakId::MicroBreak).unwrap().elapsed_active(), 3);

        setup.coordinator.set_operation_mode(OperationMode::Normal);
        assert!(!setup.monitor.is_suspended());
        setup.run(1);
        assert!(setup.coordinator.user_active());
    }

    #[test]
    fn test_daily_rule_resets_timer_and_rolls_statistics() {
        let monitor = ScriptedMonitor::default();
        monitor.set_active(true);
        let daily = TimerConfig {
            daily_reset: Some("day/04:00".to_string()),
            auto_reset_enabled: false,
            ..timer_config(1000, 60, 60)
        };
        let yesterday = day().pred_opt().unwrap();
        let mut coordinator = BreakCoordinator::new(
            vec![control(BreakId::DailyLimit, daily)],
            Some(Box::new(monitor.clone())),
            Box::new(RecordingSink::default()),
            Statistics::new(yesterday),
        )
        .unwrap();

        coordinator.heartbeat(at(3, 59, 58));
        coordinator.heartbeat(at(3, 59, 59));
        assert_eq!(coordinator.timer(BreakId::DailyLimit).unwrap().elapsed_active(), 2);

        monitor.set_active(false);
        coordinator.heartbeat(at(4, 0, 0));

        assert_eq!(coordinator.timer(BreakId::DailyLimit).unwrap().elapsed_active(), 0);
        assert_eq!(coordinator.statistics().current().date, day());
        assert_eq!(coordinator.statistics().history().count(), 1);

        coordinator.heartbeat(at(4, 0, 1));
        assert_eq!(coordinator.statistics().history().count(), 1);
    }

    #[test]
    fn test_daily_reset_clears_overdue_and_archives_totals() {
        let mut setup = Setup::new(vec![control(BreakId::MicroBreak, timer_config(10, 5, 100))]);
        setup.coordinator.set_operation_mode(OperationMode::Quiet);
        setup.run(15);
        assert_eq!(setup.coordinator.timer(BreakId::MicroBreak).unwrap().total_overdue(), 5);

        let tomorrow = day().succ_opt().unwrap();
        setup.coordinator.daily_reset(tomorrow);

        let stats = setup.coordinator.statistics();
        assert_eq!(stats.current().date, tomorrow);
        let archived = stats.history().next().unwrap();
        assert_eq!(archived.breaks[&BreakId::MicroBreak].total_overdue, 5);
        assert_eq!(setup.coordinator.timer(BreakId::MicroBreak).unwrap().total_overdue(), 0);
    }

    #[test]
    fn test_stop_all_breaks_closes_windows() {
        let mut setup = Setup::two_breaks(100);
        setup.run(10);
        setup.sink.take();

        setup.coordinator.stop_all_breaks();

        assert_eq!(setup.coordinator.active_break(), None);
        assert!(setup.sink.contains(&crate::common::SinkCall::Hide));
    }
}
