//! Library modules of restive.
//!
//! ## Engine
//!
//! - [`timer`]: per-break activity clock
//! - [`break_control`]: prelude and break state machine
//! - [`coordinator`]: heartbeat and arbitration between breaks
//! - [`time_pred`]: wall-clock reset rules
//!
//! ## Collaborators
//!
//! - [`activity`]: keyboard and mouse activity detection
//! - [`presentation`]: break window front ends
//! - [`statistics`]: daily break counters
//! - [`state_store`]: timer state kept across restarts
//!
//! ## Application
//!
//! - [`config`], [`data_storage`], [`daemon`], [`messages`], [`view`],
//!   [`formatter`], [`error`]
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chrono::Local;
//! use restive::libs::config::Config;
//! use restive::libs::coordinator::BreakCoordinator;
//! use restive::libs::presentation::ConsoleSink;
//! use restive::libs::statistics::Statistics;
//!
//! let now = Local::now().naive_local();
//! let mut coordinator =
//!     BreakCoordinator::from_config(&Config::default(), None, Box::new(ConsoleSink::new()), Statistics::new(now.date()))?;
//! coordinator.heartbeat(now);
//! # Ok::<(), restive::libs::error::CoreError>(())
//! ```

pub mod activity;
pub mod break_control;
pub mod config;
pub mod coordinator;
pub mod daemon;
pub mod data_storage;
pub mod error;
pub mod formatter;
pub mod messages;
pub mod presentation;
pub mod state_store;
pub mod statistics;
pub mod time_pred;
pub mod timer;
pub mod view;
