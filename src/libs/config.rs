//! Application configuration.
//!
//! Configuration lives in a single JSON file in the application data
//! directory (see [`DataStorage`]). Every section is optional; a missing
//! section, or a missing file, means "use the built-in defaults".
//!
//! ## Sections
//!
//! - **`micro_pause`**, **`rest_break`**, **`daily_limit`**: thresholds and
//!   prelude behaviour of each break ([`BreakConfig`])
//! - **`monitor`**: activity detection and persistence cadence
//!   ([`MonitorConfig`])
//! - **`insist_policy`**: what happens to the rest of the engine while an
//!   insisting break is taken
//!
//! ## Example
//!
//! ```json
//! {
//!   "micro_pause": {
//!     "enabled": true,
//!     "limit": 180,
//!     "limit_enabled": true,
//!     "auto_reset": 30,
//!     "auto_reset_enabled": true,
//!     "snooze": 150,
//!     "max_preludes": 3,
//!     "force_after_preludes": false,
//!     "insist_break": true,
//!     "ignorable": true
//!   },
//!   "insist_policy": "halt"
//! }
//! ```
//!
//! Durations are whole seconds. Negative values are rejected by the parser;
//! zero values where a positive one is required are rejected by
//! [`Config::validate`].

use super::data_storage::DataStorage;
use crate::libs::break_control::{BreakId, InsistPolicy};
use crate::libs::error::CoreResult;
use crate::libs::messages::Message;
use crate::libs::time_pred::DailyPredicate;
use crate::libs::timer::TimerConfig;
use crate::msg_print;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect, Select};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};

pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BreakConfig {
    pub enabled: bool,

    #[serde(flatten)]
    pub timer: TimerConfig,

    /// Number of preludes before the break gives up or forces itself.
    /// `None` keeps prompting forever.
    #[serde(default)]
    pub max_preludes: Option<u32>,

    #[serde(default)]
    pub force_after_preludes: bool,

    #[serde(default = "default_true")]
    pub insist_break: bool,

    #[serde(default = "default_true")]
    pub ignorable: bool,
}

fn default_true() -> bool {
    true
}

impl BreakConfig {
    /// Built-in settings of each break kind.
    pub fn default_for(id: BreakId) -> Self {
        let (limit, auto_reset, auto_reset_enabled, snooze, daily_reset) = match id {
            BreakId::MicroBreak => (180, 30, true, 150, None),
            BreakId::RestBreak => (2700, 600, true, 180, None),
            BreakId::DailyLimit => (14400, 0, false, 1200, Some("day/04:00".to_string())),
        };
        Self {
            enabled: true,
            timer: TimerConfig {
                limit,
                limit_enabled: true,
                auto_reset,
                auto_reset_enabled,
                snooze,
                daily_reset,
            },
            max_preludes: Some(3),
            force_after_preludes: false,
            insist_break: true,
            ignorable: true,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MonitorConfig {
    /// Seconds a single input event keeps the user active.
    pub activity_threshold: u64,

    /// Heartbeats between two saves of the timer state.
    pub save_interval: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            activity_threshold: 2,
            save_interval: 60,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub micro_pause: Option<BreakConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_break: Option<BreakConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_limit: Option<BreakConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor: Option<MonitorConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub insist_policy: Option<InsistPolicy>,
}

impl Config {
    /// Reads the configuration file, falling back to defaults when it does
    /// not exist yet.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors and on JSON that does not match the schema.
    pub fn read() -> Result<Config> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;

        if !config_file_path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(config_file_path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;

        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Effective settings of a break, defaults included.
    pub fn break_config(&self, id: BreakId) -> BreakConfig {
        let section = match id {
            BreakId::MicroBreak => &self.micro_pause,
            BreakId::RestBreak => &self.rest_break,
            BreakId::DailyLimit => &self.daily_limit,
        };
        section.clone().unwrap_or_else(|| BreakConfig::default_for(id))
    }

    fn break_section_mut(&mut self, id: BreakId) -> &mut Option<BreakConfig> {
        match id {
            BreakId::MicroBreak => &mut self.micro_pause,
            BreakId::RestBreak => &mut self.rest_break,
            BreakId::DailyLimit => &mut self.daily_limit,
        }
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        self.monitor.clone().unwrap_or_default()
    }

    pub fn insist_policy(&self) -> InsistPolicy {
        self.insist_policy.unwrap_or_default()
    }

    /// Checks every break section.
    ///
    /// # Errors
    ///
    /// Returns the first [`crate::libs::error::CoreError::InvalidConfiguration`]
    /// found.
    pub fn validate(&self) -> CoreResult<()> {
        for id in BreakId::ALL {
            self.break_config(id).timer.validate()?;
        }
        Ok(())
    }

    /// Interactive configuration wizard.
    ///
    /// Starts from the current configuration and lets the user pick which
    /// sections to edit.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        let modules = [
            Message::ConfigModuleMicroBreak,
            Message::ConfigModuleRestBreak,
            Message::ConfigModuleDailyLimit,
            Message::ConfigModuleMonitor,
            Message::ConfigModuleInsistPolicy,
        ];

        let selected = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSelectModules.to_string())
            .items(&modules.iter().map(|m| m.to_string()).collect::<Vec<_>>())
            .interact()?;

        for selection in selected {
            match selection {
                0..=2 => {
                    let id = BreakId::ALL[selection];
                    msg_print!(modules[selection]);
                    let edited = Self::init_break(&config.break_config(id))?;
                    *config.break_section_mut(id) = Some(edited);
                }
                3 => {
                    let default = config.monitor_config();
                    msg_print!(Message::ConfigModuleMonitor);
                    config.monitor = Some(MonitorConfig {
                        activity_threshold: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptActivityThreshold.to_string())
                            .default(default.activity_threshold)
                            .interact_text()?,
                        save_interval: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptSaveInterval.to_string())
                            .default(default.save_interval)
                            .interact_text()?,
                    });
                }
                _ => {
                    let policies = [InsistPolicy::Halt, InsistPolicy::Reset, InsistPolicy::Suspend];
                    let current = policies.iter().position(|p| *p == config.insist_policy()).unwrap_or(1);
                    let choice = Select::with_theme(&ColorfulTheme::default())
                        .with_prompt(Message::PromptInsistPolicy.to_string())
                        .items(&policies.iter().map(|p| format!("{:?}", p)).collect::<Vec<_>>())
                        .default(current)
                        .interact()?;
                    config.insist_policy = Some(policies[choice]);
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    fn init_break(default: &BreakConfig) -> Result<BreakConfig> {
        let theme = ColorfulTheme::default();

        let enabled = Confirm::with_theme(&theme)
            .with_prompt(Message::PromptBreakEnabled.to_string())
            .default(default.enabled)
            .interact()?;
        let limit: u64 = Input::with_theme(&theme)
            .with_prompt(Message::PromptLimit.to_string())
            .default(default.timer.limit)
            .interact_text()?;
        let auto_reset: u64 = Input::with_theme(&theme)
            .with_prompt(Message::PromptAutoReset.to_string())
            .default(default.timer.auto_reset)
            .interact_text()?;
        let snooze: u64 = Input::with_theme(&theme)
            .with_prompt(Message::PromptSnooze.to_string())
            .default(default.timer.snooze)
            .validate_with(|value: &u64| if *value > 0 { Ok(()) } else { Err(Message::ValueMustBePositive.to_string()) })
            .interact_text()?;
        let max_preludes: u32 = Input::with_theme(&theme)
            .with_prompt(Message::PromptMaxPreludes.to_string())
            .default(default.max_preludes.unwrap_or(0))
            .interact_text()?;
        let force_after_preludes = Confirm::with_theme(&theme)
            .with_prompt(Message::PromptForceAfterPreludes.to_string())
            .default(default.force_after_preludes)
            .interact()?;
        let insist_break = Confirm::with_theme(&theme)
            .with_prompt(Message::PromptInsistBreak.to_string())
            .default(default.insist_break)
            .interact()?;
        let ignorable = Confirm::with_theme(&theme)
            .with_prompt(Message::PromptIgnorable.to_string())
            .default(default.ignorable)
            .interact()?;

        let daily_reset = match &default.timer.daily_reset {
            Some(current) => {
                let expr: String = Input::with_theme(&theme)
                    .with_prompt(Message::PromptDailyReset.to_string())
                    .default(current.clone())
                    .validate_with(|expr: &String| DailyPredicate::parse(expr).map(|_| ()).map_err(|e| e.to_string()))
                    .interact_text()?;
                Some(expr)
            }
            None => None,
        };

        Ok(BreakConfig {
            enabled,
            timer: TimerConfig {
                limit,
                limit_enabled: limit > 0,
                auto_reset,
                auto_reset_enabled: auto_reset > 0,
                snooze,
                daily_reset,
            },
            max_preludes: (max_preludes > 0).then_some(max_preludes),
            force_after_preludes,
            insist_break,
            ignorable,
        })
    }
}
