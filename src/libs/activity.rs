//! User activity detection.
//!
//! The break engine needs one answer per second: is the user at the keyboard
//! right now? [`ActivityMonitor`] is that seam. Two implementations ship with
//! the crate:
//!
//! - [`InputActivityMonitor`] listens to global keyboard, mouse and wheel
//!   events through `rdev` on a dedicated thread
//! - [`AlwaysActiveMonitor`] is the fallback when the platform refuses input
//!   monitoring; every tick counts as active
//!
//! ## Monitor Control
//!
//! Breaks steer the monitor while they are shown:
//!
//! - `force_idle` forgets activity seen so far, so the user is considered idle
//!   until the next real input event
//! - `suspend` makes the monitor report idle unconditionally
//! - `resume` undoes `suspend`

use crate::libs::messages::Message;
use crate::{msg_debug, msg_error_anyhow};
use anyhow::Result;
use parking_lot::Mutex;
use rdev::{listen, Event, EventType};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long [`InputActivityMonitor::start`] waits for the listener to fail
/// before assuming it runs.
const LISTENER_GRACE: Duration = Duration::from_millis(500);

pub trait ActivityMonitor: Send {
    fn is_active(&self) -> bool;
    fn force_idle(&mut self);
    fn suspend(&mut self);
    fn resume(&mut self);
}

/// Activity source backed by global input events.
pub struct InputActivityMonitor {
    last_input: Arc<Mutex<Option<Instant>>>,
    activity_threshold: Duration,
    forced_idle_at: Option<Instant>,
    suspended: bool,
}

impl InputActivityMonitor {
    /// Starts listening for input events.
    ///
    /// `activity_threshold` is how long a single input event keeps the user
    /// "active".
    ///
    /// # Errors
    ///
    /// Fails when the platform rejects the listener (no display server,
    /// missing accessibility permission) within the start-up grace period.
    pub fn start(activity_threshold: Duration) -> Result<Self> {
        let last_input = Arc::new(Mutex::new(None));
        let (error_tx, error_rx) = mpsc::channel();

        let shared_last_input = last_input.clone();
        std::thread::spawn(move || {
            let result = listen(move |event: Event| match event.event_type {
                EventType::KeyPress(_) | EventType::ButtonPress(_) | EventType::MouseMove { .. } | EventType::Wheel { .. } => {
                    *shared_last_input.lock() = Some(Instant::now());
                }
                _ => {}
            });
            if let Err(e) = result {
                let _ = error_tx.send(format!("{:?}", e));
            }
        });

        match error_rx.recv_timeout(LISTENER_GRACE) {
            Ok(reason) => Err(msg_error_anyhow!(Message::InputListenerFailed(reason))),
            Err(_) => {
                msg_debug!(Message::InputListenerStarted);
                Ok(Self {
                    last_input,
                    activity_threshold,
                    forced_idle_at: None,
                    suspended: false,
                })
            }
        }
    }
}

impl ActivityMonitor for InputActivityMonitor {
    fn is_active(&self) -> bool {
        if self.suspended {
            return false;
        }
        let Some(last) = *self.last_input.lock() else {
            return false;
        };
        if self.forced_idle_at.is_some_and(|forced| last <= forced) {
            return false;
        }
        last.elapsed() < self.activity_threshold
    }

    fn force_idle(&mut self) {
        self.forced_idle_at = Some(Instant::now());
    }

    fn suspend(&mut self) {
        self.suspended = true;
    }

    fn resume(&mut self) {
        self.suspended = false;
    }
}

/// Reports activity on every tick unless suspended.
#[derive(Debug, Default)]
pub struct AlwaysActiveMonitor {
    suspended: bool,
}

impl ActivityMonitor for AlwaysActiveMonitor {
    fn is_active(&self) -> bool {
        !self.suspended
    }

    fn force_idle(&mut self) {}

    fn suspend(&mut self) {
        self.suspended = true;
    }

    fn resume(&mut self) {
        self.suspended = false;
    }
}
