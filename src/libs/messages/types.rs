//! Every user-facing message of restive.
//!
//! Messages are grouped by the part of the application that emits them.
//! Their text lives in [`super::display`].

#[derive(Debug, Clone)]
pub enum Message {
    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigModuleMicroBreak,
    ConfigModuleRestBreak,
    ConfigModuleDailyLimit,
    ConfigModuleMonitor,
    ConfigModuleInsistPolicy,
    PromptSelectModules,
    PromptBreakEnabled,
    PromptLimit,
    PromptAutoReset,
    PromptSnooze,
    PromptMaxPreludes,
    PromptForceAfterPreludes,
    PromptInsistBreak,
    PromptIgnorable,
    PromptDailyReset,
    PromptActivityThreshold,
    PromptSaveInterval,
    PromptInsistPolicy,
    ValueMustBePositive,

    // === MONITOR MESSAGES ===
    InputListenerStarted,
    InputListenerFailed(String),        // reason
    InputMonitoringUnavailable(String), // reason
    MonitorFallbackAlwaysActive,

    // === BREAK WINDOW MESSAGES ===
    PreludeShown(String), // break name
    PreludeEscalated,
    PreludeDisappearsIn(String), // remaining
    PreludeBreakIn(String),      // remaining
    BreakShown(String),          // break name
    BreakProgress(String, String),
    BreakWindowClosed(String),

    // === BREAK OUTCOME MESSAGES ===
    BreakTaken(String),
    BreakSkipped(String),
    BreakPostponed(String),
    BreakIgnored(String),
    ForcedBreakStarting(String),
    ForcedBreakFinished(String),

    // === WATCHER MESSAGES ===
    WatcherStarted,
    WatcherShuttingDown,
    WatcherReceivedSigterm,
    WatcherReceivedSigint,
    WatcherReceivedCtrlC,
    WatcherSignalHandlingFailed(String),

    // === STATE MESSAGES ===
    StateRestored(usize), // timers
    StateNotFound,
    StateRestoreFailed(String),
    StateSaveFailed(String),
    StatisticsLoadFailed(String),

    // === REPORT MESSAGES ===
    StatusHeader,
    StatusSavedAt(String),
    StatsHeader(String), // date
    NoSavedState,
}
