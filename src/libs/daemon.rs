//! Foreground watcher: drives the coordinator once per second.
//!
//! The watcher wires the engine to the outside world:
//!
//! - starts input monitoring, falling back to "always active" when the
//!   platform refuses it
//! - restores timer state and statistics from the data directory
//! - ticks the [`BreakCoordinator`] on a one second `tokio` interval
//! - reports break outcomes on the console
//! - saves state every few minutes and on shutdown
//!
//! ## Signal Handling
//!
//! On Unix the loop stops on SIGTERM or SIGINT, on Windows on Ctrl+C. State
//! is saved before returning in both cases.

use crate::libs::activity::{ActivityMonitor, InputActivityMonitor};
use crate::libs::break_control::{BreakEvent, BreakHint, BreakId, BreakStage};
use crate::libs::config::Config;
use crate::libs::coordinator::BreakCoordinator;
use crate::libs::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::libs::presentation::PresentationSink;
use crate::libs::state_store::StateStore;
use crate::libs::statistics::{Statistics, STATISTICS_FILE_NAME};
use crate::{msg_debug, msg_info, msg_success, msg_warning};
use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use std::path::PathBuf;
use std::time::Duration;

pub struct Watcher {
    coordinator: BreakCoordinator,
    store: StateStore,
    statistics_path: PathBuf,
    save_interval: u64,
    ticks: u64,
}

impl Watcher {
    /// Builds the engine from the saved configuration and restores the
    /// previous session, if any.
    pub fn new(config: &Config, sink: Box<dyn PresentationSink>, now: NaiveDateTime) -> Result<Self> {
        config.validate()?;
        let monitor_config = config.monitor_config();

        let monitor: Option<Box<dyn ActivityMonitor>> =
            match InputActivityMonitor::start(Duration::from_secs(monitor_config.activity_threshold)) {
                Ok(monitor) => Some(Box::new(monitor)),
                Err(e) => {
                    msg_warning!(Message::InputMonitoringUnavailable(e.to_string()));
                    None
                }
            };

        let statistics_path = DataStorage::new().get_path(STATISTICS_FILE_NAME)?;
        let mut statistics = Statistics::load(&statistics_path, now.date()).unwrap_or_else(|e| {
            msg_warning!(Message::StatisticsLoadFailed(e.to_string()));
            Statistics::new(now.date())
        });
        statistics.start_new_day(now.date());

        let mut coordinator = BreakCoordinator::from_config(config, monitor, sink, statistics)?;

        let store = StateStore::new()?;
        match store.load(&mut coordinator, now) {
            Ok(0) => msg_debug!(Message::StateNotFound),
            Ok(count) => msg_debug!(Message::StateRestored(count)),
            Err(e) => msg_warning!(Message::StateRestoreFailed(e.to_string())),
        }

        Ok(Self {
            coordinator,
            store,
            statistics_path,
            save_interval: monitor_config.save_interval.max(1),
            ticks: 0,
        })
    }

    /// One heartbeat.
    pub fn tick(&mut self, now: NaiveDateTime) {
        self.coordinator.heartbeat(now);
        self.report_events();

        self.ticks += 1;
        if self.ticks % self.save_interval == 0 {
            if let Err(e) = self.save(now) {
                msg_warning!(Message::StateSaveFailed(e.to_string()));
            }
        }
    }

    fn report_events(&mut self) {
        for (id, event) in self.coordinator.take_events() {
            let name = id.to_string();
            match event {
                BreakEvent::BreakTaken => msg_success!(Message::BreakTaken(name)),
                BreakEvent::BreakSkipped => msg_info!(Message::BreakSkipped(name)),
                BreakEvent::BreakPostponed => msg_info!(Message::BreakPostponed(name)),
                BreakEvent::BreakIgnored => msg_info!(Message::BreakIgnored(name)),
                other => msg_debug!(format!("{}: {:?}", name, other)),
            }
        }
    }

    /// Writes timer state and statistics.
    pub fn save(&mut self, now: NaiveDateTime) -> Result<()> {
        self.coordinator.sync_statistics();
        self.store.save(&self.coordinator, now)?;
        self.coordinator.statistics().save(&self.statistics_path)?;
        Ok(())
    }

    pub fn coordinator(&self) -> &BreakCoordinator {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut BreakCoordinator {
        &mut self.coordinator
    }
}

/// Resolves when the process is asked to stop.
pub async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => msg_info!(Message::WatcherReceivedSigterm),
            _ = sigint.recv() => msg_info!(Message::WatcherReceivedSigint),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        msg_info!(Message::WatcherReceivedCtrlC);
    }

    Ok(())
}

/// Runs the watcher until a shutdown signal arrives.
pub async fn run_with_signal_handling(sink: Box<dyn PresentationSink>) -> Result<()> {
    let config = Config::read()?;
    let mut watcher = Watcher::new(&config, sink, now())?;
    msg_info!(Message::WatcherStarted);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = ticker.tick() => watcher.tick(now()),
            result = &mut shutdown => {
                if let Err(e) = result {
                    msg_warning!(Message::WatcherSignalHandlingFailed(e.to_string()));
                }
                break;
            }
        }
    }

    msg_info!(Message::WatcherShuttingDown);
    watcher.save(now())?;
    Ok(())
}

/// Shows one break immediately and returns once it is over.
pub async fn run_forced_break(id: BreakId, sink: Box<dyn PresentationSink>) -> Result<()> {
    let config = Config::read()?;
    let mut watcher = Watcher::new(&config, sink, now())?;
    watcher.coordinator_mut().force_break(id, BreakHint::UserInitiated);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        let running = watcher
            .coordinator()
            .break_control(id)
            .is_some_and(|b| b.stage() != BreakStage::None);
        if !running {
            break;
        }
        tokio::select! {
            _ = ticker.tick() => watcher.tick(now()),
            _ = &mut shutdown => {
                watcher.coordinator_mut().postpone_break(id);
                break;
            }
        }
    }

    watcher.save(now())?;
    Ok(())
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
